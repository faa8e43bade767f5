//! In-memory scene graph.
//!
//! Useful for driving [`crate::MaterialRebinder`] without a scene file.

use crate::error::{Error, Result};
use crate::scene::{SceneGraph, TextureKind, TextureMapping};

/// Index of a material in a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Index of a texture in a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMaterial {
    pub name: String,
    pub shading_model: String,
    pub hardware_shaded: bool,
    pub diffuse: Vec<TextureId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTexture {
    pub name: String,
    pub kind: TextureKind,
    pub file_name: Option<String>,
    pub mapping: Option<TextureMapping>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryScene {
    materials: Vec<MemoryMaterial>,
    textures: Vec<MemoryTexture>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `lambert` material with an empty diffuse channel.
    pub fn add_material(&mut self, name: &str) -> MaterialId {
        self.materials.push(MemoryMaterial {
            name: name.to_string(),
            shading_model: "lambert".to_string(),
            hardware_shaded: false,
            diffuse: Vec::new(),
        });
        MaterialId(self.materials.len() - 1)
    }

    /// Add a material implemented by a hardware shader.
    pub fn add_hardware_material(&mut self, name: &str) -> MaterialId {
        let id = self.add_material(name);
        self.materials[id.0].hardware_shaded = true;
        id
    }

    pub fn add_file_texture(&mut self, name: &str, file_name: &str) -> TextureId {
        self.textures.push(MemoryTexture {
            name: name.to_string(),
            kind: TextureKind::File,
            file_name: Some(file_name.to_string()),
            mapping: None,
        });
        TextureId(self.textures.len() - 1)
    }

    pub fn add_other_texture(&mut self, name: &str, class: &str) -> TextureId {
        self.textures.push(MemoryTexture {
            name: name.to_string(),
            kind: TextureKind::Other {
                class: class.to_string(),
            },
            file_name: None,
            mapping: None,
        });
        TextureId(self.textures.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&MemoryMaterial> {
        self.materials.get(id.0)
    }

    pub fn texture(&self, id: TextureId) -> Option<&MemoryTexture> {
        self.textures.get(id.0)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn material_ref(&self, id: MaterialId) -> Result<&MemoryMaterial> {
        self.materials
            .get(id.0)
            .ok_or_else(|| Error::scene(format!("unknown material {}", id.0)))
    }

    fn texture_ref(&self, id: TextureId) -> Result<&MemoryTexture> {
        self.textures
            .get(id.0)
            .ok_or_else(|| Error::scene(format!("unknown texture {}", id.0)))
    }
}

impl SceneGraph for MemoryScene {
    type MaterialHandle = MaterialId;
    type TextureHandle = TextureId;

    fn materials(&self) -> Vec<MaterialId> {
        (0..self.materials.len()).map(MaterialId).collect()
    }

    fn material_name(&self, material: MaterialId) -> Result<String> {
        Ok(self.material_ref(material)?.name.clone())
    }

    fn shading_model(&self, material: MaterialId) -> Result<String> {
        Ok(self.material_ref(material)?.shading_model.clone())
    }

    fn is_hardware_shaded(&self, material: MaterialId) -> Result<bool> {
        Ok(self.material_ref(material)?.hardware_shaded)
    }

    fn diffuse_textures(&self, material: MaterialId) -> Result<Vec<TextureId>> {
        Ok(self.material_ref(material)?.diffuse.clone())
    }

    fn texture_kind(&self, texture: TextureId) -> Result<TextureKind> {
        Ok(self.texture_ref(texture)?.kind.clone())
    }

    fn texture_name(&self, texture: TextureId) -> Result<String> {
        Ok(self.texture_ref(texture)?.name.clone())
    }

    fn file_name(&self, texture: TextureId) -> Result<Option<String>> {
        Ok(self.texture_ref(texture)?.file_name.clone())
    }

    fn set_file_name(&mut self, texture: TextureId, file_name: &str) -> Result<()> {
        let tex = self
            .textures
            .get_mut(texture.0)
            .ok_or_else(|| Error::scene(format!("unknown texture {}", texture.0)))?;
        if !tex.kind.is_file() {
            return Err(Error::scene(format!("texture '{}' is not a file texture", tex.name)));
        }
        tex.file_name = Some(file_name.to_string());
        Ok(())
    }

    fn create_file_texture(
        &mut self,
        name: &str,
        file_name: &str,
        mapping: &TextureMapping,
    ) -> Result<TextureId> {
        let id = self.add_file_texture(name, file_name);
        self.textures[id.0].mapping = Some(*mapping);
        Ok(id)
    }

    fn bind_diffuse_texture(&mut self, material: MaterialId, texture: TextureId) -> Result<()> {
        self.texture_ref(texture)?;
        let mat = self
            .materials
            .get_mut(material.0)
            .ok_or_else(|| Error::scene(format!("unknown material {}", material.0)))?;
        mat.diffuse.push(texture);
        Ok(())
    }
}
