//! FBX binary format reader.
//!
//! Supports reading:
//! - Binary FBX format (versions 7.x, 32-bit and 64-bit record headers)
//! - All scalar, string, raw and array property types
//! - zlib-compressed arrays (with the `compression` feature)
//!
//! # Example
//!
//! ```ignore
//! use rebind_io::fbx_reader::FbxReader;
//!
//! let mut reader = FbxReader::open("model.fbx")?;
//! let document = reader.read_document()?;
//! for node in &document.nodes {
//!     println!("{} ({} children)", node.name, node.children.len());
//! }
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::document::{FbxDocument, FbxNode, FbxProperty, FBX_MAGIC};

/// Size of the file header: magic, two reserved bytes, version.
pub(crate) const HEADER_SIZE: u64 = 27;

/// FBX reader for binary FBX files.
pub struct FbxReader<R: Read + Seek> {
    reader: R,
    version: u32,
}

impl FbxReader<BufReader<File>> {
    /// Open an FBX file from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::new(reader)
    }
}

impl<R: Read + Seek> FbxReader<R> {
    /// Create a new FBX reader from a reader.
    pub fn new(mut reader: R) -> io::Result<Self> {
        let mut magic = [0u8; 21];
        reader.read_exact(&mut magic).map_err(|_| not_binary_fbx())?;
        if &magic != FBX_MAGIC {
            return Err(not_binary_fbx());
        }

        // Skip 2 unknown bytes
        reader.seek(SeekFrom::Current(2))?;

        let version = reader.read_u32::<LittleEndian>()?;

        Ok(Self { reader, version })
    }

    /// Get the FBX file version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Check if this is FBX 7.5+ (uses 64-bit offsets).
    fn is_64bit(&self) -> bool {
        self.version >= 7500
    }

    /// Read the whole node tree.
    pub fn read_document(&mut self) -> io::Result<FbxDocument> {
        let nodes = self.read_nodes()?;
        Ok(FbxDocument {
            version: self.version,
            nodes,
        })
    }

    /// Read all top-level nodes.
    pub fn read_nodes(&mut self) -> io::Result<Vec<FbxNode>> {
        self.reader.seek(SeekFrom::Start(HEADER_SIZE))?;

        let mut nodes = Vec::new();
        while let Some(node) = self.read_node()? {
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Read a node record. Returns `None` for the NULL record.
    fn read_node(&mut self) -> io::Result<Option<FbxNode>> {
        let (end_offset, num_properties, property_list_len) = if self.is_64bit() {
            (
                self.reader.read_u64::<LittleEndian>()?,
                self.reader.read_u64::<LittleEndian>()?,
                self.reader.read_u64::<LittleEndian>()?,
            )
        } else {
            (
                u64::from(self.reader.read_u32::<LittleEndian>()?),
                u64::from(self.reader.read_u32::<LittleEndian>()?),
                u64::from(self.reader.read_u32::<LittleEndian>()?),
            )
        };
        let name_len = self.reader.read_u8()?;

        // NULL record marks end of children
        if end_offset == 0 {
            return Ok(None);
        }

        let mut name_bytes = vec![0u8; name_len as usize];
        self.reader.read_exact(&mut name_bytes)?;
        let name = String::from_utf8_lossy(&name_bytes).to_string();

        let properties_start = self.reader.stream_position()?;
        if end_offset < properties_start {
            return Err(invalid_data(format!(
                "Node '{}' ends at {} before its properties start at {}",
                name, end_offset, properties_start
            )));
        }

        let mut properties = Vec::new();
        for _ in 0..num_properties {
            properties.push(self.read_property()?);
        }

        let properties_end = self.reader.stream_position()?;
        if properties_end - properties_start != property_list_len {
            return Err(invalid_data(format!(
                "Node '{}' property list is {} bytes, header says {}",
                name,
                properties_end - properties_start,
                property_list_len
            )));
        }

        let mut children = Vec::new();
        while self.reader.stream_position()? < end_offset {
            match self.read_node()? {
                Some(child) => children.push(child),
                None => break,
            }
        }

        // Seek to end offset to be safe
        self.reader.seek(SeekFrom::Start(end_offset))?;

        Ok(Some(FbxNode {
            name,
            properties,
            children,
        }))
    }

    /// Read a property.
    fn read_property(&mut self) -> io::Result<FbxProperty> {
        let type_code = self.reader.read_u8()?;

        match type_code {
            b'C' => Ok(FbxProperty::Bool(self.reader.read_u8()? != 0)),
            b'Y' => Ok(FbxProperty::I16(self.reader.read_i16::<LittleEndian>()?)),
            b'I' => Ok(FbxProperty::I32(self.reader.read_i32::<LittleEndian>()?)),
            b'L' => Ok(FbxProperty::I64(self.reader.read_i64::<LittleEndian>()?)),
            b'F' => Ok(FbxProperty::F32(self.reader.read_f32::<LittleEndian>()?)),
            b'D' => Ok(FbxProperty::F64(self.reader.read_f64::<LittleEndian>()?)),
            b'S' | b'R' => {
                let len = self.reader.read_u32::<LittleEndian>()? as usize;
                let mut data = vec![0u8; len];
                self.reader.read_exact(&mut data)?;
                if type_code == b'S' {
                    Ok(FbxProperty::String(String::from_utf8_lossy(&data).to_string()))
                } else {
                    Ok(FbxProperty::Raw(data))
                }
            }
            b'b' => Ok(FbxProperty::BoolArray(self.read_array_bool()?)),
            b'i' => Ok(FbxProperty::I32Array(self.read_array_i32()?)),
            b'l' => Ok(FbxProperty::I64Array(self.read_array_i64()?)),
            b'f' => Ok(FbxProperty::F32Array(self.read_array_f32()?)),
            b'd' => Ok(FbxProperty::F64Array(self.read_array_f64()?)),
            other => Err(invalid_data(format!(
                "Unknown property type: {}",
                other as char
            ))),
        }
    }

    /// Read array header and return (length, encoding, compressed_length).
    fn read_array_header(&mut self) -> io::Result<(u32, u32, u32)> {
        let array_len = self.reader.read_u32::<LittleEndian>()?;
        let encoding = self.reader.read_u32::<LittleEndian>()?;
        let compressed_len = self.reader.read_u32::<LittleEndian>()?;
        Ok((array_len, encoding, compressed_len))
    }

    /// Read array data (handles compression).
    fn read_array_data(&mut self, element_size: usize) -> io::Result<Vec<u8>> {
        let (len, encoding, compressed_len) = self.read_array_header()?;
        let uncompressed_size = len as usize * element_size;

        let data = match encoding {
            0 => {
                let mut data = vec![0u8; uncompressed_size];
                self.reader.read_exact(&mut data)?;
                data
            }
            1 => {
                let mut compressed = vec![0u8; compressed_len as usize];
                self.reader.read_exact(&mut compressed)?;
                inflate(&compressed)?
            }
            other => {
                return Err(invalid_data(format!("Unknown array encoding: {}", other)));
            }
        };

        if data.len() != uncompressed_size {
            return Err(invalid_data(format!(
                "Array holds {} bytes, expected {}",
                data.len(),
                uncompressed_size
            )));
        }
        Ok(data)
    }

    fn read_array_bool(&mut self) -> io::Result<Vec<bool>> {
        let data = self.read_array_data(1)?;
        Ok(data.into_iter().map(|b| b != 0).collect())
    }

    fn read_array_i32(&mut self) -> io::Result<Vec<i32>> {
        let data = self.read_array_data(4)?;
        let mut values = vec![0i32; data.len() / 4];
        (&data[..]).read_i32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    fn read_array_i64(&mut self) -> io::Result<Vec<i64>> {
        let data = self.read_array_data(8)?;
        let mut values = vec![0i64; data.len() / 8];
        (&data[..]).read_i64_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    fn read_array_f32(&mut self) -> io::Result<Vec<f32>> {
        let data = self.read_array_data(4)?;
        let mut values = vec![0f32; data.len() / 4];
        (&data[..]).read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    fn read_array_f64(&mut self) -> io::Result<Vec<f64>> {
        let data = self.read_array_data(8)?;
        let mut values = vec![0f64; data.len() / 8];
        (&data[..]).read_f64_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }
}

/// Read a whole binary FBX file.
pub fn read_fbx_document<P: AsRef<Path>>(path: P) -> io::Result<FbxDocument> {
    FbxReader::open(path)?.read_document()
}

#[cfg(feature = "compression")]
fn inflate(compressed: &[u8]) -> io::Result<Vec<u8>> {
    use miniz_oxide::inflate::decompress_to_vec_zlib;
    decompress_to_vec_zlib(compressed)
        .map_err(|e| invalid_data(format!("Decompression error: {:?}", e)))
}

#[cfg(not(feature = "compression"))]
fn inflate(_compressed: &[u8]) -> io::Result<Vec<u8>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "FBX array compression not supported (enable 'compression' feature)",
    ))
}

fn not_binary_fbx() -> io::Error {
    invalid_data("Not a valid binary FBX file".to_string())
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
