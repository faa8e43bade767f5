//! Texture and material catalogs built from a descriptor file.
//!
//! Material entries refer to textures by their position in the texture
//! catalog. The reference is only resolved when a material is rebound, and
//! resolution is always bounds-checked through [`TextureCatalog::resolve`].

use crate::error::{Error, Result};

/// One `Texture` element of the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureEntry {
    pub filename: String,
}

impl TextureEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

/// One `Material` element of the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialEntry {
    pub name: String,
    /// Position in the texture catalog, `None` when the descriptor gives none.
    pub texture_id: Option<i64>,
}

impl MaterialEntry {
    pub fn new(name: impl Into<String>, texture_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            texture_id,
        }
    }
}

/// Ordered texture list. Identity of an entry is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureCatalog {
    entries: Vec<TextureEntry>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TextureEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextureEntry> {
        self.entries.iter()
    }

    /// Get the entry at `id`, or `None` if `id` is negative or out of range.
    pub fn get(&self, id: i64) -> Option<&TextureEntry> {
        usize::try_from(id).ok().and_then(|i| self.entries.get(i))
    }

    /// Resolve a material's texture reference.
    ///
    /// Returns [`Error::CatalogLookup`] naming `material` when `id` does not
    /// address an entry.
    pub fn resolve(&self, material: &str, id: i64) -> Result<&TextureEntry> {
        self.get(id).ok_or_else(|| Error::CatalogLookup {
            material: material.to_string(),
            texture_id: id,
            catalog_len: self.entries.len(),
        })
    }
}

impl FromIterator<TextureEntry> for TextureCatalog {
    fn from_iter<I: IntoIterator<Item = TextureEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Ordered material list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialCatalog {
    entries: Vec<MaterialEntry>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MaterialEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MaterialEntry> {
        self.entries.iter()
    }

    /// First entry whose name equals `name` (exact, case-sensitive).
    pub fn find(&self, name: &str) -> Option<&MaterialEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl FromIterator<MaterialEntry> for MaterialCatalog {
    fn from_iter<I: IntoIterator<Item = MaterialEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Both catalogs of one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCatalog {
    pub textures: TextureCatalog,
    pub materials: MaterialCatalog,
}

impl AssetCatalog {
    pub fn new(textures: TextureCatalog, materials: MaterialCatalog) -> Self {
        Self {
            textures,
            materials,
        }
    }

    /// True when neither catalog has entries.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.materials.is_empty()
    }
}
