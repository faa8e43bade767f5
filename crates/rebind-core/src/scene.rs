//! Scene capability interface consumed by the rebinder.
//!
//! A scene backend exposes only what rebinding needs: material enumeration,
//! the diffuse channel's texture bindings, file-texture filenames, and the
//! ability to create and bind a new file texture.
//!
//! # Usage
//!
//! ```ignore
//! use rebind_core::{SceneFile, SceneGraph};
//!
//! fn list_materials<S: SceneFile>(path: &str) -> rebind_core::Result<()> {
//!     let scene = S::load(path)?;
//!     for material in scene.materials() {
//!         println!("{} ({})", scene.material_name(material)?, scene.shading_model(material)?);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;
use std::path::Path;

use crate::error::Result;

/// How a texture is used by the material it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureUse {
    #[default]
    Standard,
    ShadowMap,
    LightMap,
    SphericalReflectionMap,
    SphereReflectionMap,
    BumpNormalMap,
}

/// How texture coordinates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingType {
    Null,
    Planar,
    Spherical,
    Cylindrical,
    Box,
    Face,
    #[default]
    Uv,
    Environment,
}

/// Whether the texture takes its material from the model or the texture itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialUse {
    #[default]
    ModelMaterial,
    DefaultMaterial,
}

/// Placement settings for a newly created file texture.
///
/// The default is a standard UV-mapped texture with identity placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureMapping {
    pub texture_use: TextureUse,
    pub mapping_type: MappingType,
    pub material_use: MaterialUse,
    pub swap_uv: bool,
    pub translation: [f64; 2],
    pub rotation: [f64; 2],
    pub scale: [f64; 2],
}

impl Default for TextureMapping {
    fn default() -> Self {
        Self {
            texture_use: TextureUse::Standard,
            mapping_type: MappingType::Uv,
            material_use: MaterialUse::ModelMaterial,
            swap_uv: false,
            translation: [0.0, 0.0],
            rotation: [0.0, 0.0],
            scale: [1.0, 1.0],
        }
    }
}

/// What kind of object a texture binding points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureKind {
    /// Backed by an image file path.
    File,
    /// Layered, procedural or any other non-file texture.
    Other { class: String },
}

impl TextureKind {
    pub fn is_file(&self) -> bool {
        matches!(self, TextureKind::File)
    }
}

/// Read/write access to a scene's materials and their diffuse textures.
///
/// Handles are cheap copies that stay valid for the lifetime of the scene.
pub trait SceneGraph {
    type MaterialHandle: Copy + Debug;
    type TextureHandle: Copy + Debug;

    /// All materials, in enumeration order.
    fn materials(&self) -> Vec<Self::MaterialHandle>;

    fn material_name(&self, material: Self::MaterialHandle) -> Result<String>;

    /// Shading model tag such as `lambert` or `phong`.
    fn shading_model(&self, material: Self::MaterialHandle) -> Result<String>;

    /// True if the material is implemented by a hardware shader (HLSL, CgFX).
    fn is_hardware_shaded(&self, material: Self::MaterialHandle) -> Result<bool>;

    /// Textures bound to the material's diffuse channel, in binding order.
    fn diffuse_textures(&self, material: Self::MaterialHandle) -> Result<Vec<Self::TextureHandle>>;

    fn texture_kind(&self, texture: Self::TextureHandle) -> Result<TextureKind>;

    fn texture_name(&self, texture: Self::TextureHandle) -> Result<String>;

    /// Stored filename of a file texture, `None` for other kinds.
    fn file_name(&self, texture: Self::TextureHandle) -> Result<Option<String>>;

    /// Replace the stored filename of a file texture.
    fn set_file_name(&mut self, texture: Self::TextureHandle, file_name: &str) -> Result<()>;

    /// Create a file texture object. It is not bound to anything yet.
    fn create_file_texture(
        &mut self,
        name: &str,
        file_name: &str,
        mapping: &TextureMapping,
    ) -> Result<Self::TextureHandle>;

    /// Attach a texture to the material's diffuse channel.
    fn bind_diffuse_texture(
        &mut self,
        material: Self::MaterialHandle,
        texture: Self::TextureHandle,
    ) -> Result<()>;
}

/// A scene that can be loaded from and written to a file.
pub trait SceneFile: SceneGraph + Sized {
    /// Load a scene. Failures are [`crate::Error::SceneLoad`].
    fn load<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Write the scene. Failures are [`crate::Error::SceneExport`].
    fn export<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Enable or disable output compression for later exports.
    ///
    /// Backends without a compressed encoding ignore it.
    fn set_compression(&mut self, _enabled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let mapping = TextureMapping::default();
        assert_eq!(mapping.texture_use, TextureUse::Standard);
        assert_eq!(mapping.mapping_type, MappingType::Uv);
        assert_eq!(mapping.material_use, MaterialUse::ModelMaterial);
        assert!(!mapping.swap_uv);
        assert_eq!(mapping.translation, [0.0, 0.0]);
        assert_eq!(mapping.rotation, [0.0, 0.0]);
        assert_eq!(mapping.scale, [1.0, 1.0]);
    }

    #[test]
    fn test_texture_kind() {
        assert!(TextureKind::File.is_file());
        assert!(!TextureKind::Other {
            class: "LayeredTexture".to_string()
        }
        .is_file());
    }
}
