//! FBX binary format writer.
//!
//! Writes an [`FbxDocument`] back to disk:
//! - 32-bit record headers below version 7500, 64-bit from 7500
//! - All property types the reader understands
//! - Optional zlib compression for arrays (with the `compression` feature)
//! - The standard binary footer
//!
//! # Example
//!
//! ```ignore
//! use rebind_io::fbx_writer::FbxWriter;
//!
//! let writer = FbxWriter::new().with_compression(true);
//! writer.write(&document, "output.fbx")?;
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::document::{FbxDocument, FbxNode, FbxProperty, FBX_MAGIC};

/// Size of a null record for 64-bit FBX
const NULL_RECORD_SIZE_64: usize = 25;

/// Size of a null record for 32-bit FBX
const NULL_RECORD_SIZE_32: usize = 13;

/// Footer id written after the top-level null record.
const FOOTER_ID: [u8; 16] = [
    0xFA, 0xBC, 0xAB, 0x09, 0xD0, 0xC8, 0xD4, 0x66, 0xB1, 0x76, 0xFB, 0x83, 0x1C, 0xF7, 0x26, 0x7E,
];

/// Magic closing every binary FBX file.
const FOOTER_MAGIC: [u8; 16] = [
    0xF8, 0x5A, 0x8C, 0x6A, 0xDE, 0xF5, 0xD9, 0x7E, 0xEC, 0xE9, 0x0C, 0xE3, 0x75, 0x8F, 0x29, 0x0B,
];

/// FBX binary format writer.
///
/// # Example
///
/// ```ignore
/// use rebind_io::fbx_writer::FbxWriter;
///
/// let writer = FbxWriter::new()
///     .with_compression(true)
///     .with_compression_threshold(64);
/// writer.write(&document, "output.fbx")?;
/// ```
#[derive(Debug, Clone)]
pub struct FbxWriter {
    /// Whether to compress arrays using zlib (requires `compression` feature).
    compress: bool,
    /// Minimum array size (in bytes) to consider for compression.
    compression_threshold: usize,
}

impl Default for FbxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FbxWriter {
    /// Create a new FBX writer. Compression is on when the feature is enabled.
    pub fn new() -> Self {
        Self {
            compress: cfg!(feature = "compression"),
            compression_threshold: 128,
        }
    }

    /// Enable or disable zlib compression for arrays.
    ///
    /// Compression is only applied if the `compression` feature is enabled
    /// and the array size exceeds the compression threshold.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the minimum byte size for arrays to be compressed.
    ///
    /// Default is 128 bytes.
    pub fn with_compression_threshold(mut self, threshold: usize) -> Self {
        self.compression_threshold = threshold;
        self
    }

    /// Check if compression is enabled.
    pub fn is_compression_enabled(&self) -> bool {
        self.compress
    }

    /// Write the document to the given path.
    pub fn write<P: AsRef<Path>>(&self, document: &FbxDocument, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(document, &mut writer)?;
        writer.flush()
    }

    /// Write the document to a writer.
    pub fn write_to<W: Write + Seek>(
        &self,
        document: &FbxDocument,
        writer: &mut W,
    ) -> io::Result<()> {
        let is_64 = document.is_64bit();

        writer.write_all(FBX_MAGIC)?;
        writer.write_all(&[0x1A, 0x00])?; // Reserved bytes
        writer.write_u32::<LittleEndian>(document.version)?;

        for node in &document.nodes {
            write_node(writer, node, is_64, self)?;
        }

        // NULL record marks end of top-level nodes
        write_null_record(writer, is_64)?;

        write_footer(writer, document.version)
    }
}

/// Write a document to a binary FBX file with default settings.
pub fn write_fbx_document<P: AsRef<Path>>(document: &FbxDocument, path: P) -> io::Result<()> {
    FbxWriter::new().write(document, path)
}

// ============================================================================
// Node Writing Infrastructure
// ============================================================================

/// Helper struct for writing FBX nodes.
struct NodeWriter<'a, W: Write + Seek> {
    writer: &'a mut W,
    start_pos: u64,
    properties_start: u64,
    num_properties: u64,
    is_64: bool,
}

impl<'a, W: Write + Seek> NodeWriter<'a, W> {
    fn start(writer: &'a mut W, name: &str, is_64: bool) -> io::Result<Self> {
        if name.len() > u8::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Node name too long: {}", name),
            ));
        }
        let start_pos = writer.stream_position()?;

        // Placeholder for end offset, num properties, property list len
        let header_size = if is_64 { 24 } else { 12 };
        writer.write_all(&vec![0u8; header_size])?;

        writer.write_u8(name.len() as u8)?;
        writer.write_all(name.as_bytes())?;

        let properties_start = writer.stream_position()?;

        Ok(Self {
            writer,
            start_pos,
            properties_start,
            num_properties: 0,
            is_64,
        })
    }

    fn write_property(&mut self, property: &FbxProperty, options: &FbxWriter) -> io::Result<()> {
        let w = &mut *self.writer;
        match property {
            FbxProperty::Bool(v) => {
                w.write_u8(b'C')?;
                w.write_u8(u8::from(*v))?;
            }
            FbxProperty::I16(v) => {
                w.write_u8(b'Y')?;
                w.write_i16::<LittleEndian>(*v)?;
            }
            FbxProperty::I32(v) => {
                w.write_u8(b'I')?;
                w.write_i32::<LittleEndian>(*v)?;
            }
            FbxProperty::I64(v) => {
                w.write_u8(b'L')?;
                w.write_i64::<LittleEndian>(*v)?;
            }
            FbxProperty::F32(v) => {
                w.write_u8(b'F')?;
                w.write_f32::<LittleEndian>(*v)?;
            }
            FbxProperty::F64(v) => {
                w.write_u8(b'D')?;
                w.write_f64::<LittleEndian>(*v)?;
            }
            FbxProperty::String(s) => write_blob(w, b'S', s.as_bytes())?,
            FbxProperty::Raw(data) => write_blob(w, b'R', data)?,
            FbxProperty::BoolArray(values) => {
                let raw: Vec<u8> = values.iter().map(|&b| u8::from(b)).collect();
                write_array(w, b'b', values.len(), raw, options)?;
            }
            FbxProperty::I32Array(values) => {
                let mut raw = Vec::with_capacity(values.len() * 4);
                for &v in values {
                    raw.write_i32::<LittleEndian>(v)?;
                }
                write_array(w, b'i', values.len(), raw, options)?;
            }
            FbxProperty::I64Array(values) => {
                let mut raw = Vec::with_capacity(values.len() * 8);
                for &v in values {
                    raw.write_i64::<LittleEndian>(v)?;
                }
                write_array(w, b'l', values.len(), raw, options)?;
            }
            FbxProperty::F32Array(values) => {
                let mut raw = Vec::with_capacity(values.len() * 4);
                for &v in values {
                    raw.write_f32::<LittleEndian>(v)?;
                }
                write_array(w, b'f', values.len(), raw, options)?;
            }
            FbxProperty::F64Array(values) => {
                let mut raw = Vec::with_capacity(values.len() * 8);
                for &v in values {
                    raw.write_f64::<LittleEndian>(v)?;
                }
                write_array(w, b'd', values.len(), raw, options)?;
            }
        }
        self.num_properties += 1;
        Ok(())
    }

    /// Write children (if any), the closing null record, and patch the header.
    fn finish_with_children<F>(self, has_children: bool, write_children: F) -> io::Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let properties_end = self.writer.stream_position()?;
        let property_list_len = properties_end - self.properties_start;

        write_children(self.writer)?;

        // Childless nodes only get a null record when they have no properties either
        if has_children || self.num_properties == 0 {
            write_null_record(self.writer, self.is_64)?;
        }

        let end_pos = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.start_pos))?;
        if self.is_64 {
            self.writer.write_u64::<LittleEndian>(end_pos)?;
            self.writer.write_u64::<LittleEndian>(self.num_properties)?;
            self.writer.write_u64::<LittleEndian>(property_list_len)?;
        } else {
            self.writer.write_u32::<LittleEndian>(to_u32(end_pos)?)?;
            self.writer.write_u32::<LittleEndian>(to_u32(self.num_properties)?)?;
            self.writer.write_u32::<LittleEndian>(to_u32(property_list_len)?)?;
        }

        // Seek back to end
        self.writer.seek(SeekFrom::Start(end_pos))?;
        Ok(())
    }
}

fn write_node<W: Write + Seek>(
    writer: &mut W,
    node: &FbxNode,
    is_64: bool,
    options: &FbxWriter,
) -> io::Result<()> {
    let mut record = NodeWriter::start(writer, &node.name, is_64)?;
    for property in &node.properties {
        record.write_property(property, options)?;
    }
    record.finish_with_children(!node.children.is_empty(), |w| {
        for child in &node.children {
            write_node(w, child, is_64, options)?;
        }
        Ok(())
    })
}

fn write_blob<W: Write>(writer: &mut W, type_code: u8, data: &[u8]) -> io::Result<()> {
    writer.write_u8(type_code)?;
    writer.write_u32::<LittleEndian>(to_u32(data.len() as u64)?)?;
    writer.write_all(data)
}

fn write_array<W: Write>(
    writer: &mut W,
    type_code: u8,
    count: usize,
    raw_data: Vec<u8>,
    options: &FbxWriter,
) -> io::Result<()> {
    writer.write_u8(type_code)?;
    writer.write_u32::<LittleEndian>(to_u32(count as u64)?)?;

    let raw_size = raw_data.len();
    if options.compress && raw_size >= options.compression_threshold {
        // Only use compression if it actually saves space
        if let Some(compressed) = deflate(&raw_data).filter(|c| c.len() < raw_size) {
            writer.write_u32::<LittleEndian>(1)?; // encoding = 1 (zlib)
            writer.write_u32::<LittleEndian>(to_u32(compressed.len() as u64)?)?;
            return writer.write_all(&compressed);
        }
    }

    writer.write_u32::<LittleEndian>(0)?; // encoding = 0 (uncompressed)
    writer.write_u32::<LittleEndian>(to_u32(raw_size as u64)?)?;
    writer.write_all(&raw_data)
}

#[cfg(feature = "compression")]
fn deflate(data: &[u8]) -> Option<Vec<u8>> {
    Some(miniz_oxide::deflate::compress_to_vec_zlib(data, 6))
}

#[cfg(not(feature = "compression"))]
fn deflate(_data: &[u8]) -> Option<Vec<u8>> {
    None
}

fn write_null_record<W: Write>(writer: &mut W, is_64: bool) -> io::Result<()> {
    let size = if is_64 { NULL_RECORD_SIZE_64 } else { NULL_RECORD_SIZE_32 };
    writer.write_all(&vec![0u8; size])
}

fn write_footer<W: Write + Seek>(writer: &mut W, version: u32) -> io::Result<()> {
    writer.write_all(&FOOTER_ID)?;
    writer.write_all(&[0u8; 4])?;

    // Pad to a 16-byte boundary; an aligned position still gets a full block
    let pos = writer.stream_position()?;
    let mut padding = (16 - (pos % 16)) % 16;
    if padding == 0 {
        padding = 16;
    }
    writer.write_all(&vec![0u8; padding as usize])?;

    writer.write_u32::<LittleEndian>(version)?;
    writer.write_all(&[0u8; 120])?;
    writer.write_all(&FOOTER_MAGIC)
}

fn to_u32(value: u64) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Value {} does not fit a 32-bit FBX field", value),
        )
    })
}

// ============================================================================
// Tests
// ============================================================================
