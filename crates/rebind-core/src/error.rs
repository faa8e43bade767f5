//! Error handling for rebind operations.
//!
//! Descriptor and catalog errors are recoverable: the pipeline logs them and
//! carries on without rebinding the affected item. Scene load and export
//! errors end the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor file could not be opened or read.
    #[error("Descriptor not found: {}", path.display())]
    DescriptorMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The descriptor is not well-formed markup.
    #[error("Descriptor parse error at byte {offset}: {message}")]
    DescriptorParse { message: String, offset: usize },

    /// A material entry points past the end of the texture catalog.
    #[error(
        "Material '{material}' references texture {texture_id}, \
         but the catalog holds {catalog_len} textures"
    )]
    CatalogLookup {
        material: String,
        texture_id: i64,
        catalog_len: usize,
    },

    #[error("Failed to load scene {}: {source}", path.display())]
    SceneLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to export scene {}: {source}", path.display())]
    SceneExport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The scene graph rejected a query or mutation (stale handle, wrong object kind).
    #[error("Scene error: {0}")]
    Scene(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SceneLoad { .. } | Error::SceneExport { .. } | Error::Scene(_)
        )
    }

    /// Process exit code for this error.
    ///
    /// Code 2 is left to the argument parser for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SceneLoad { .. } => 3,
            Error::SceneExport { .. } => 4,
            _ => 1,
        }
    }

    pub fn scene(message: impl Into<String>) -> Self {
        Error::Scene(message.into())
    }
}
