//! FBX scene backend.
//!
//! [`FbxScene`] exposes the materials and textures of a binary FBX document
//! through [`SceneGraph`]. Objects live under the top-level `Objects` node and
//! are addressed by their 64-bit id; relations are `C` records under
//! `Connections`:
//!
//! - `C "OO" child parent` links two objects
//! - `C "OP" child parent "Property"` links an object to a property, e.g. a
//!   texture to a material's `DiffuseColor`

use std::path::Path;

use log::{debug, info};
use rebind_core::{
    Error, MappingType, MaterialUse, Result, SceneFile, SceneGraph, TextureKind, TextureMapping,
    TextureUse,
};

use crate::document::{join_object_name, FbxDocument, FbxNode, FbxProperty};
use crate::fbx_reader::read_fbx_document;
use crate::fbx_writer::FbxWriter;

/// Material properties that hold the diffuse texture.
const DIFFUSE_PROPERTIES: [&str; 2] = ["DiffuseColor", "Diffuse"];

/// Shader languages that mark a material as hardware shaded.
const HARDWARE_SHADER_LANGUAGES: [&str; 2] = ["HLSL", "CGFX"];

/// Id of an object under `Objects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub i64);

/// One `C` record.
#[derive(Debug, Clone, PartialEq)]
struct Connection<'a> {
    kind: &'a str,
    child: i64,
    parent: i64,
    property: Option<&'a str>,
}

impl<'a> Connection<'a> {
    fn parse(node: &'a FbxNode) -> Option<Self> {
        if node.name != "C" {
            return None;
        }
        Some(Self {
            kind: node.str_property(0)?,
            child: node.properties.get(1)?.as_i64()?,
            parent: node.properties.get(2)?.as_i64()?,
            property: node.str_property(3),
        })
    }
}

/// A binary FBX scene held in memory.
#[derive(Debug, Clone)]
pub struct FbxScene {
    document: FbxDocument,
    writer: FbxWriter,
}

impl FbxScene {
    pub fn from_document(document: FbxDocument) -> Self {
        Self {
            document,
            writer: FbxWriter::new(),
        }
    }

    /// Builder: writer used by [`SceneFile::export`].
    pub fn with_writer(mut self, writer: FbxWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn document(&self) -> &FbxDocument {
        &self.document
    }

    pub fn into_document(self) -> FbxDocument {
        self.document
    }

    /// Object with the given id.
    pub fn object(&self, id: ObjectId) -> Option<&FbxNode> {
        self.document
            .node("Objects")?
            .children
            .iter()
            .find(|n| n.id() == Some(id.0))
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut FbxNode> {
        self.document
            .node_mut("Objects")?
            .children
            .iter_mut()
            .find(|n| n.id() == Some(id.0))
    }

    fn object_ref(&self, id: ObjectId, class: &str) -> Result<&FbxNode> {
        self.object(id)
            .ok_or_else(|| Error::scene(format!("No {} object with id {}", class, id.0)))
    }

    fn material_ref(&self, id: ObjectId) -> Result<&FbxNode> {
        let node = self.object_ref(id, "Material")?;
        if node.name != "Material" {
            return Err(Error::scene(format!(
                "Object {} is a {}, not a Material",
                id.0, node.name
            )));
        }
        Ok(node)
    }

    fn connections(&self) -> impl Iterator<Item = Connection<'_>> {
        self.document
            .node("Connections")
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(Connection::parse)
    }

    /// Ids of objects connected to `parent` with an object-object link.
    fn object_children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.connections()
            .filter(|c| c.kind == "OO" && c.parent == parent.0)
            .map(|c| ObjectId(c.child))
            .collect()
    }

    /// Two unused consecutive ids, above every object and document id.
    fn allocate_id_pair(&self) -> Result<(i64, i64)> {
        let max = ["Objects", "Documents"]
            .iter()
            .filter_map(|name| self.document.node(name))
            .flat_map(|n| n.children.iter())
            .filter_map(FbxNode::id)
            .max()
            .unwrap_or(0)
            .max(0);
        match (max.checked_add(1), max.checked_add(2)) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(Error::scene(format!(
                "No free object id above {} for a new texture",
                max
            ))),
        }
    }

    fn connect(&mut self, connection: FbxNode) {
        self.document
            .node_or_insert("Connections")
            .children
            .push(connection);
    }

    /// Add `delta` to the `Definitions` count of `object_type`, creating the
    /// entry if needed.
    fn bump_definition(&mut self, object_type: &str, delta: i32) {
        let definitions = self.document.node_or_insert("Definitions");
        add_to_count(definitions, delta);

        let position = definitions
            .children
            .iter()
            .position(|n| n.name == "ObjectType" && n.str_property(0) == Some(object_type));
        match position {
            Some(index) => add_to_count(&mut definitions.children[index], delta),
            None => definitions.children.push(
                FbxNode::new("ObjectType")
                    .with_property(object_type)
                    .with_child(FbxNode::new("Count").with_property(delta)),
            ),
        }
    }
}

impl SceneGraph for FbxScene {
    type MaterialHandle = ObjectId;
    type TextureHandle = ObjectId;

    fn materials(&self) -> Vec<ObjectId> {
        self.document
            .node("Objects")
            .into_iter()
            .flat_map(|n| n.children_named("Material"))
            .filter_map(FbxNode::id)
            .map(ObjectId)
            .collect()
    }

    fn material_name(&self, material: ObjectId) -> Result<String> {
        let node = self.material_ref(material)?;
        Ok(node.object_name().unwrap_or_default().to_string())
    }

    fn shading_model(&self, material: ObjectId) -> Result<String> {
        let node = self.material_ref(material)?;
        Ok(node.child_str("ShadingModel").unwrap_or("unknown").to_string())
    }

    fn is_hardware_shaded(&self, material: ObjectId) -> Result<bool> {
        self.material_ref(material)?;
        let hardware = self
            .object_children(material)
            .into_iter()
            .filter_map(|id| self.object(id))
            .filter(|n| n.name == "Implementation")
            .any(|n| {
                n.property70("ShaderLanguage")
                    .and_then(|p| p.str_property(4))
                    .map_or(false, |lang| {
                        HARDWARE_SHADER_LANGUAGES
                            .iter()
                            .any(|h| h.eq_ignore_ascii_case(lang))
                    })
            });
        Ok(hardware)
    }

    fn diffuse_textures(&self, material: ObjectId) -> Result<Vec<ObjectId>> {
        self.material_ref(material)?;
        let textures = self
            .connections()
            .filter(|c| {
                c.kind == "OP"
                    && c.parent == material.0
                    && c.property.map_or(false, |p| DIFFUSE_PROPERTIES.contains(&p))
            })
            .map(|c| ObjectId(c.child))
            .filter(|&id| self.object(id).is_some())
            .collect();
        Ok(textures)
    }

    fn texture_kind(&self, texture: ObjectId) -> Result<TextureKind> {
        let node = self.object_ref(texture, "Texture")?;
        if node.name == "Texture" {
            Ok(TextureKind::File)
        } else {
            Ok(TextureKind::Other {
                class: node.name.clone(),
            })
        }
    }

    fn texture_name(&self, texture: ObjectId) -> Result<String> {
        let node = self.object_ref(texture, "Texture")?;
        Ok(node.object_name().unwrap_or_default().to_string())
    }

    fn file_name(&self, texture: ObjectId) -> Result<Option<String>> {
        let node = self.object_ref(texture, "Texture")?;
        if node.name != "Texture" {
            return Ok(None);
        }
        Ok(node.child_str("FileName").map(str::to_string))
    }

    fn set_file_name(&mut self, texture: ObjectId, file_name: &str) -> Result<()> {
        if !self.texture_kind(texture)?.is_file() {
            return Err(Error::scene(format!(
                "Object {} is not a file texture",
                texture.0
            )));
        }
        let videos: Vec<ObjectId> = self
            .object_children(texture)
            .into_iter()
            .filter(|&id| self.object(id).map_or(false, |n| n.name == "Video"))
            .collect();

        if let Some(node) = self.object_mut(texture) {
            node.set_child_str("FileName", file_name);
            node.set_child_str("RelativeFilename", file_name);
        }
        for video in videos {
            if let Some(node) = self.object_mut(video) {
                node.set_child_str("Filename", file_name);
                node.set_child_str("RelativeFilename", file_name);
                if let Some(path) = node.property70_mut("Path") {
                    if let Some(value) = path.properties.get_mut(4) {
                        *value = FbxProperty::from(file_name);
                    }
                }
            }
        }
        Ok(())
    }

    fn create_file_texture(
        &mut self,
        name: &str,
        file_name: &str,
        mapping: &TextureMapping,
    ) -> Result<ObjectId> {
        let (texture_id, video_id) = self.allocate_id_pair()?;

        let objects = self.document.node_or_insert("Objects");
        objects
            .children
            .push(texture_node(texture_id, name, file_name, mapping));
        objects.children.push(video_node(video_id, name, file_name));

        self.connect(
            FbxNode::new("C")
                .with_property("OO")
                .with_property(video_id)
                .with_property(texture_id),
        );
        self.bump_definition("Texture", 1);
        self.bump_definition("Video", 1);

        debug!("Created texture {} ({}) for {}", texture_id, name, file_name);
        Ok(ObjectId(texture_id))
    }

    fn bind_diffuse_texture(&mut self, material: ObjectId, texture: ObjectId) -> Result<()> {
        self.material_ref(material)?;
        self.object_ref(texture, "Texture")?;
        self.connect(
            FbxNode::new("C")
                .with_property("OP")
                .with_property(texture.0)
                .with_property(material.0)
                .with_property(DIFFUSE_PROPERTIES[0]),
        );
        Ok(())
    }
}

impl SceneFile for FbxScene {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = read_fbx_document(path).map_err(|source| Error::SceneLoad {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Loaded {} (FBX {}, {} top-level nodes)",
            path.display(),
            document.version,
            document.nodes.len()
        );
        Ok(Self::from_document(document))
    }

    fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.writer
            .write(&self.document, path)
            .map_err(|source| Error::SceneExport {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Exported {}", path.display());
        Ok(())
    }

    fn set_compression(&mut self, enabled: bool) {
        self.writer = self.writer.clone().with_compression(enabled);
    }
}

fn add_to_count(node: &mut FbxNode, delta: i32) {
    match node.child_mut("Count") {
        Some(count) => {
            let current = count.properties.first().and_then(FbxProperty::as_i64).unwrap_or(0);
            let updated = i32::try_from(current + i64::from(delta)).unwrap_or(i32::MAX);
            count.properties = vec![FbxProperty::I32(updated)];
        }
        None => node.children.push(FbxNode::new("Count").with_property(delta)),
    }
}

fn texture_use_code(value: TextureUse) -> i32 {
    match value {
        TextureUse::Standard => 0,
        TextureUse::ShadowMap => 1,
        TextureUse::LightMap => 2,
        TextureUse::SphericalReflectionMap => 3,
        TextureUse::SphereReflectionMap => 4,
        TextureUse::BumpNormalMap => 5,
    }
}

fn mapping_type_code(value: MappingType) -> i32 {
    match value {
        MappingType::Null => 0,
        MappingType::Planar => 1,
        MappingType::Spherical => 2,
        MappingType::Cylindrical => 3,
        MappingType::Box => 4,
        MappingType::Face => 5,
        MappingType::Uv => 6,
        MappingType::Environment => 7,
    }
}

fn material_use_code(value: MaterialUse) -> i32 {
    match value {
        MaterialUse::ModelMaterial => 0,
        MaterialUse::DefaultMaterial => 1,
    }
}

/// `P` record: name, type, label, flags, values.
fn p_record(name: &str, kind: &str, label: &str, flags: &str, values: Vec<FbxProperty>) -> FbxNode {
    let mut node = FbxNode::new("P")
        .with_property(name)
        .with_property(kind)
        .with_property(label)
        .with_property(flags);
    node.properties.extend(values);
    node
}

fn vector_record(name: &str, x: f64, y: f64, z: f64) -> FbxNode {
    p_record(
        name,
        "Vector",
        "",
        "A",
        vec![FbxProperty::F64(x), FbxProperty::F64(y), FbxProperty::F64(z)],
    )
}

fn texture_node(id: i64, name: &str, file_name: &str, mapping: &TextureMapping) -> FbxNode {
    let properties = FbxNode::new("Properties70")
        .with_child(p_record(
            "TextureTypeUse",
            "enum",
            "",
            "",
            vec![texture_use_code(mapping.texture_use).into()],
        ))
        .with_child(p_record(
            "CurrentMappingType",
            "enum",
            "",
            "",
            vec![mapping_type_code(mapping.mapping_type).into()],
        ))
        .with_child(p_record(
            "UseMaterial",
            "bool",
            "",
            "",
            vec![material_use_code(mapping.material_use).into()],
        ))
        .with_child(p_record(
            "UVSwap",
            "bool",
            "",
            "",
            vec![i32::from(mapping.swap_uv).into()],
        ))
        .with_child(vector_record(
            "Translation",
            mapping.translation[0],
            mapping.translation[1],
            0.0,
        ))
        .with_child(vector_record(
            "Rotation",
            mapping.rotation[0],
            mapping.rotation[1],
            0.0,
        ))
        .with_child(vector_record("Scaling", mapping.scale[0], mapping.scale[1], 1.0));

    FbxNode::new("Texture")
        .with_property(id)
        .with_property(join_object_name(name, "Texture"))
        .with_property("")
        .with_child(FbxNode::new("Type").with_property("TextureVideoClip"))
        .with_child(FbxNode::new("Version").with_property(202))
        .with_child(FbxNode::new("TextureName").with_property(join_object_name(name, "Texture")))
        .with_child(properties)
        .with_child(FbxNode::new("Media").with_property(join_object_name(name, "Video")))
        .with_child(FbxNode::new("FileName").with_property(file_name))
        .with_child(FbxNode::new("RelativeFilename").with_property(file_name))
        .with_child(
            FbxNode::new("ModelUVTranslation")
                .with_property(0.0)
                .with_property(0.0),
        )
        .with_child(
            FbxNode::new("ModelUVScaling")
                .with_property(1.0)
                .with_property(1.0),
        )
        .with_child(FbxNode::new("Texture_Alpha_Source").with_property("None"))
}

fn video_node(id: i64, name: &str, file_name: &str) -> FbxNode {
    FbxNode::new("Video")
        .with_property(id)
        .with_property(join_object_name(name, "Video"))
        .with_property("Clip")
        .with_child(FbxNode::new("Type").with_property("Clip"))
        .with_child(FbxNode::new("Properties70").with_child(p_record(
            "Path",
            "KString",
            "XRefUrl",
            "",
            vec![file_name.into()],
        )))
        .with_child(FbxNode::new("UseMipMap").with_property(0))
        .with_child(FbxNode::new("Filename").with_property(file_name))
        .with_child(FbxNode::new("RelativeFilename").with_property(file_name))
}
