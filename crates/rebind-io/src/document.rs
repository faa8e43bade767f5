//! In-memory FBX node tree.
//!
//! A binary FBX file is a tree of named records, each with a list of typed
//! properties. [`FbxDocument`] keeps the whole tree so it can be edited and
//! written back unchanged apart from the edits.

/// FBX file magic: "Kaydara FBX Binary  \0"
pub const FBX_MAGIC: &[u8; 21] = b"Kaydara FBX Binary  \0";

/// Separator between object name and class in binary FBX name properties.
pub const NAME_CLASS_SEPARATOR: &str = "\x00\x01";

/// A parsed FBX file.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    pub version: u32,
    pub nodes: Vec<FbxNode>,
}

/// An FBX node with properties and children.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxNode {
    pub name: String,
    pub properties: Vec<FbxProperty>,
    pub children: Vec<FbxNode>,
}

/// FBX property value.
#[derive(Debug, Clone, PartialEq)]
pub enum FbxProperty {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Raw(Vec<u8>),
    BoolArray(Vec<bool>),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
}

impl FbxProperty {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FbxProperty::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FbxProperty::I64(v) => Some(*v),
            FbxProperty::I32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

impl From<&str> for FbxProperty {
    fn from(value: &str) -> Self {
        FbxProperty::String(value.to_string())
    }
}

impl From<String> for FbxProperty {
    fn from(value: String) -> Self {
        FbxProperty::String(value)
    }
}

impl From<i32> for FbxProperty {
    fn from(value: i32) -> Self {
        FbxProperty::I32(value)
    }
}

impl From<i64> for FbxProperty {
    fn from(value: i64) -> Self {
        FbxProperty::I64(value)
    }
}

impl From<f64> for FbxProperty {
    fn from(value: f64) -> Self {
        FbxProperty::F64(value)
    }
}

impl FbxNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: append a property.
    pub fn with_property(mut self, property: impl Into<FbxProperty>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: FbxNode) -> Self {
        self.children.push(child);
        self
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut FbxNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Object id: the first property of every `Objects` child.
    pub fn id(&self) -> Option<i64> {
        self.properties.first().and_then(FbxProperty::as_i64)
    }

    /// String value of property `index`.
    pub fn str_property(&self, index: usize) -> Option<&str> {
        self.properties.get(index).and_then(FbxProperty::as_str)
    }

    /// String value of the first property of child `name`.
    pub fn child_str(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.str_property(0))
    }

    /// Set the first property of child `name` to a string, creating the
    /// child if needed.
    pub fn set_child_str(&mut self, name: &str, value: &str) {
        match self.child_mut(name) {
            Some(child) => {
                if child.properties.is_empty() {
                    child.properties.push(FbxProperty::from(value));
                } else {
                    child.properties[0] = FbxProperty::from(value);
                }
            }
            None => self
                .children
                .push(FbxNode::new(name).with_property(value)),
        }
    }

    /// Object name without its class, from the second property.
    ///
    /// Binary files store `Name\0\x01Class`; ASCII-derived names use
    /// `Class::Name`.
    pub fn object_name(&self) -> Option<&str> {
        self.str_property(1).map(split_object_name)
    }

    /// `P` record named `name` under `Properties70`.
    pub fn property70(&self, name: &str) -> Option<&FbxNode> {
        self.child("Properties70")?
            .children_named("P")
            .find(|p| p.str_property(0) == Some(name))
    }

    pub fn property70_mut(&mut self, name: &str) -> Option<&mut FbxNode> {
        self.child_mut("Properties70")?
            .children
            .iter_mut()
            .find(|p| p.name == "P" && p.str_property(0) == Some(name))
    }
}

/// Strip the class part from an FBX object name.
pub fn split_object_name(full: &str) -> &str {
    if let Some(pos) = full.find(NAME_CLASS_SEPARATOR) {
        return &full[..pos];
    }
    if let Some(pos) = full.find("::") {
        return &full[pos + 2..];
    }
    full
}

/// Build the binary `Name\0\x01Class` form.
pub fn join_object_name(name: &str, class: &str) -> String {
    format!("{}{}{}", name, NAME_CLASS_SEPARATOR, class)
}

impl FbxDocument {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            nodes: Vec::new(),
        }
    }

    /// First top-level node with the given name.
    pub fn node(&self, name: &str) -> Option<&FbxNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut FbxNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Top-level node `name`, appended empty if missing.
    pub fn node_or_insert(&mut self, name: &str) -> &mut FbxNode {
        let index = match self.nodes.iter().position(|n| n.name == name) {
            Some(index) => index,
            None => {
                self.nodes.push(FbxNode::new(name));
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[index]
    }

    /// Uses 64-bit record headers (FBX 7.5+).
    pub fn is_64bit(&self) -> bool {
        self.version >= 7500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_names() {
        assert_eq!(split_object_name("Wood\x00\x01Material"), "Wood");
        assert_eq!(split_object_name("Material::Wood"), "Wood");
        assert_eq!(split_object_name("Wood"), "Wood");
        assert_eq!(join_object_name("Wood", "Material"), "Wood\x00\x01Material");
    }

    #[test]
    fn test_node_helpers() {
        let mut node = FbxNode::new("Material")
            .with_property(42i64)
            .with_property(join_object_name("ns.Wood", "Material"))
            .with_property("")
            .with_child(FbxNode::new("ShadingModel").with_property("phong"))
            .with_child(
                FbxNode::new("Properties70").with_child(
                    FbxNode::new("P")
                        .with_property("DiffuseColor")
                        .with_property("Color")
                        .with_property("")
                        .with_property("A")
                        .with_property(0.5)
                        .with_property(0.5)
                        .with_property(0.5),
                ),
            );

        assert_eq!(node.id(), Some(42));
        assert_eq!(node.object_name(), Some("ns.Wood"));
        assert_eq!(node.child_str("ShadingModel"), Some("phong"));
        assert!(node.property70("DiffuseColor").is_some());
        assert!(node.property70("Emissive").is_none());

        node.set_child_str("ShadingModel", "lambert");
        node.set_child_str("MultiLayer", "0");
        assert_eq!(node.child_str("ShadingModel"), Some("lambert"));
        assert_eq!(node.child_str("MultiLayer"), Some("0"));
    }

    #[test]
    fn test_node_or_insert() {
        let mut doc = FbxDocument::new(7400);
        assert!(!doc.is_64bit());
        doc.node_or_insert("Objects").children.push(FbxNode::new("Material"));
        doc.node_or_insert("Objects").children.push(FbxNode::new("Texture"));
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.node("Objects").unwrap().children.len(), 2);
    }
}
