//! Sidecar descriptor parser.
//!
//! A descriptor lists the textures and materials used to rebind a scene:
//!
//! ```xml
//! <root>
//!   <textureList>
//!     <Texture><fileName>tex/wood.png</fileName></Texture>
//!   </textureList>
//!   <materialList>
//!     <Material><nameJp>Wood</nameJp><textureID>0</textureID></Material>
//!   </materialList>
//! </root>
//! ```
//!
//! `textureList` and `materialList` are recognised at any depth. `Texture` and
//! `Material` must be direct children of their list, and their fields direct
//! children of the entry. Everything else is ignored.
//!
//! # Example
//!
//! ```ignore
//! use rebind_core::descriptor;
//!
//! let catalog = descriptor::load_or_default("scene.xml");
//! println!("{} textures, {} materials", catalog.textures.len(), catalog.materials.len());
//! ```

use std::fs;
use std::path::Path;

use log::{info, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::catalog::{AssetCatalog, MaterialEntry, TextureEntry};
use crate::error::{Error, Result};

const TEXTURE_LIST: &[u8] = b"textureList";
const MATERIAL_LIST: &[u8] = b"materialList";
const TEXTURE: &[u8] = b"Texture";
const MATERIAL: &[u8] = b"Material";
const FILE_NAME: &[u8] = b"fileName";
const NAME_JP: &[u8] = b"nameJp";
const TEXTURE_ID: &[u8] = b"textureID";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read and parse a descriptor file.
///
/// A file that cannot be read is reported as [`Error::DescriptorMissing`].
pub fn read_descriptor<P: AsRef<Path>>(path: P) -> Result<AssetCatalog> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::DescriptorMissing {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&data)
}

/// How a descriptor load went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorStatus {
    Loaded,
    /// The file could not be opened or read.
    Missing,
    /// The file was read but is not a valid descriptor.
    Malformed { message: String },
}

impl DescriptorStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, DescriptorStatus::Loaded)
    }
}

/// Read a descriptor, falling back to empty catalogs.
///
/// Descriptors are optional, so a missing file is only logged. A malformed
/// one is logged as a warning and treated the same way.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> AssetCatalog {
    load_with_status(path).0
}

/// Like [`load_or_default`], also telling why the catalogs are empty.
pub fn load_with_status<P: AsRef<Path>>(path: P) -> (AssetCatalog, DescriptorStatus) {
    let path = path.as_ref();
    match read_descriptor(path) {
        Ok(catalog) => {
            info!(
                "Descriptor {}: {} textures, {} materials",
                path.display(),
                catalog.textures.len(),
                catalog.materials.len()
            );
            (catalog, DescriptorStatus::Loaded)
        }
        Err(err @ Error::DescriptorMissing { .. }) => {
            info!("{}; no materials will be rebound", err);
            (AssetCatalog::default(), DescriptorStatus::Missing)
        }
        Err(err) => {
            warn!("{}: {}; no materials will be rebound", path.display(), err);
            let status = DescriptorStatus::Malformed {
                message: err.to_string(),
            };
            (AssetCatalog::default(), status)
        }
    }
}

/// Parse descriptor bytes. The input must be UTF-8, with or without a BOM.
pub fn parse_bytes(data: &[u8]) -> Result<AssetCatalog> {
    let (data, skipped) = match data.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, UTF8_BOM.len()),
        None => (data, 0),
    };
    let text = std::str::from_utf8(data).map_err(|e| Error::DescriptorParse {
        message: format!("invalid UTF-8: {}", e),
        offset: skipped + e.valid_up_to(),
    })?;
    parse_str(text).map_err(|err| match err {
        Error::DescriptorParse { message, offset } => Error::DescriptorParse {
            message,
            offset: offset + skipped,
        },
        other => other,
    })
}

/// Parse descriptor text.
pub fn parse_str(text: &str) -> Result<AssetCatalog> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut state = ParseState::default();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error(e.to_string(), reader.buffer_position()))?;
        match event {
            Event::Start(e) => state.open(e.name().as_ref()),
            Event::Empty(e) => {
                state.open(e.name().as_ref());
                state.close(e.name().as_ref(), reader.buffer_position())?;
            }
            Event::End(e) => state.close(e.name().as_ref(), reader.buffer_position())?,
            Event::Text(e) => {
                if state.capturing() {
                    let text = e
                        .unescape()
                        .map_err(|e| parse_error(e.to_string(), reader.buffer_position()))?;
                    state.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if state.capturing() {
                    state.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = state.stack.last() {
        return Err(parse_error(
            format!("unexpected end of document, <{}> is not closed", open),
            reader.buffer_position(),
        ));
    }

    Ok(state.catalog)
}

fn parse_error(message: String, offset: usize) -> Error {
    Error::DescriptorParse { message, offset }
}

/// Parse the text of a `textureID` field.
///
/// Anything other than a base-10 integer means "no texture".
fn parse_texture_id(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Ignoring non-numeric textureID '{}'", text);
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FileName,
    NameJp,
    TextureId,
}

#[derive(Debug)]
enum Entry {
    Texture(TextureEntry),
    Material(MaterialEntry),
}

#[derive(Debug, Default)]
struct ParseState {
    /// Names of the currently open elements.
    stack: Vec<String>,
    /// Entry being built and the stack depth of its element.
    entry: Option<(Entry, usize)>,
    /// Field being captured and the stack depth of its element.
    field: Option<(Field, usize)>,
    text: String,
    catalog: AssetCatalog,
}

impl ParseState {
    fn capturing(&self) -> bool {
        matches!(self.field, Some((_, depth)) if depth == self.stack.len())
    }

    fn parent_is(&self, name: &[u8]) -> bool {
        self.stack
            .last()
            .map_or(false, |parent| parent.as_bytes() == name)
    }

    fn open(&mut self, name: &[u8]) {
        let depth = self.stack.len() + 1;
        let current = self
            .entry
            .as_ref()
            .map(|(entry, entry_depth)| (matches!(entry, Entry::Texture(_)), *entry_depth));
        match current {
            None => {
                if name == TEXTURE && self.parent_is(TEXTURE_LIST) {
                    self.entry = Some((Entry::Texture(TextureEntry::default()), depth));
                } else if name == MATERIAL && self.parent_is(MATERIAL_LIST) {
                    self.entry = Some((Entry::Material(MaterialEntry::default()), depth));
                }
            }
            Some((is_texture, entry_depth)) if depth == entry_depth + 1 && self.field.is_none() => {
                let field = if is_texture && name == FILE_NAME {
                    Some(Field::FileName)
                } else if !is_texture && name == NAME_JP {
                    Some(Field::NameJp)
                } else if !is_texture && name == TEXTURE_ID {
                    Some(Field::TextureId)
                } else {
                    None
                };
                if let Some(field) = field {
                    self.field = Some((field, depth));
                    self.text.clear();
                }
            }
            Some(_) => {}
        }
        self.stack.push(String::from_utf8_lossy(name).into_owned());
    }

    fn close(&mut self, name: &[u8], offset: usize) -> Result<()> {
        let depth = self.stack.len();
        match self.stack.last() {
            Some(open) if open.as_bytes() == name => {}
            Some(open) => {
                return Err(parse_error(
                    format!(
                        "expected </{}>, found </{}>",
                        open,
                        String::from_utf8_lossy(name)
                    ),
                    offset,
                ))
            }
            None => {
                return Err(parse_error(
                    format!("unexpected closing tag </{}>", String::from_utf8_lossy(name)),
                    offset,
                ))
            }
        }

        if let Some((field, field_depth)) = self.field {
            if field_depth == depth {
                self.finish_field(field);
                self.field = None;
            }
        }

        if matches!(self.entry, Some((_, entry_depth)) if entry_depth == depth) {
            if let Some((entry, _)) = self.entry.take() {
                match entry {
                    Entry::Texture(texture) => self.catalog.textures.push(texture),
                    Entry::Material(material) => self.catalog.materials.push(material),
                }
            }
        }

        self.stack.pop();
        Ok(())
    }

    fn finish_field(&mut self, field: Field) {
        let value = self.text.trim().to_string();
        self.text.clear();
        match (&mut self.entry, field) {
            (Some((Entry::Texture(texture), _)), Field::FileName) => texture.filename = value,
            (Some((Entry::Material(material), _)), Field::NameJp) => material.name = value,
            (Some((Entry::Material(material), _)), Field::TextureId) => {
                material.texture_id = parse_texture_id(&value)
            }
            _ => {}
        }
    }
}
