//! Rebind I/O Library
//!
//! Binary FBX document reading and writing, and [`FbxScene`], the FBX
//! backend for the `rebind-core` scene traits.
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | FBX (binary 7.x) | ✅ | ✅ | 32/64-bit records, zlib arrays with `compression` |
//! | FBX (ASCII) | ❌ | ❌ | Rejected as a load error |
//!
//! # Example
//!
//! ```ignore
//! use rebind_core::{SceneFile, SceneGraph};
//! use rebind_io::FbxScene;
//!
//! let scene = FbxScene::load("model.fbx")?;
//! for material in scene.materials() {
//!     println!("{}", scene.material_name(material)?);
//! }
//! ```

pub mod document;
pub mod fbx_reader;
pub mod fbx_writer;
pub mod scene;

pub use document::{FbxDocument, FbxNode, FbxProperty};
pub use fbx_reader::{read_fbx_document, FbxReader};
pub use fbx_writer::{write_fbx_document, FbxWriter};
pub use scene::{FbxScene, ObjectId};
