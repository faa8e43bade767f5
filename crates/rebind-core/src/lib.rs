//! Rebind Core Library
//!
//! Parses sidecar asset descriptors into texture and material catalogs and
//! applies them to the materials of a scene.
//!
//! # Overview
//!
//! 1. [`descriptor`] turns a descriptor file into an [`AssetCatalog`].
//! 2. [`MaterialRebinder`] walks a scene through the [`SceneGraph`] trait and
//!    either binds a catalog texture to materials with an empty diffuse
//!    channel, or strips directories from the filenames already bound.
//!
//! Scene backends implement [`SceneGraph`] and [`SceneFile`]. The
//! `rebind-io` crate provides one for binary FBX files; [`MemoryScene`] keeps
//! everything in memory.
//!
//! ```ignore
//! use rebind_core::{descriptor, MaterialRebinder, SceneFile};
//! use rebind_io::FbxScene;
//!
//! let catalog = descriptor::load_or_default("model.xml");
//! let mut scene = FbxScene::load("model.fbx")?;
//! let report = MaterialRebinder::new(&catalog).rebind(&mut scene)?;
//! scene.export("model_rename.fbx")?;
//! ```

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod memory_scene;
pub mod rebinder;
pub mod scene;

pub use catalog::{AssetCatalog, MaterialCatalog, MaterialEntry, TextureCatalog, TextureEntry};
pub use descriptor::DescriptorStatus;
pub use error::{Error, Result};
pub use memory_scene::MemoryScene;
pub use rebinder::{
    normalize_file_name, strip_namespace, MaterialOutcome, MaterialRebinder, RebindOptions,
    RebindReport, Rename,
};
pub use scene::{
    MappingType, MaterialUse, SceneFile, SceneGraph, TextureKind, TextureMapping, TextureUse,
};
