//! Material texture rebinding.
//!
//! For every material of a scene, [`MaterialRebinder`] either attaches the
//! texture named by the descriptor (when the diffuse channel is empty) or
//! strips directories from the filenames already bound there.
//!
//! # Example
//!
//! ```ignore
//! use rebind_core::{descriptor, MaterialRebinder};
//!
//! let catalog = descriptor::load_or_default("scene.xml");
//! let report = MaterialRebinder::new(&catalog).rebind(&mut scene)?;
//! println!("{} bound, {} normalized", report.bound_count(), report.normalized_count());
//! ```

use log::{debug, info, warn};

use crate::catalog::AssetCatalog;
use crate::error::{Error, Result};
use crate::scene::{SceneGraph, TextureMapping};

/// Name given to texture objects created by the rebinder.
pub const DEFAULT_TEXTURE_NAME: &str = "Diffuse Texture";

/// Options for a rebinding pass.
#[derive(Debug, Clone)]
pub struct RebindOptions {
    texture_name: String,
    mapping: TextureMapping,
}

impl Default for RebindOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RebindOptions {
    pub fn new() -> Self {
        Self {
            texture_name: DEFAULT_TEXTURE_NAME.to_string(),
            mapping: TextureMapping::default(),
        }
    }

    /// Set the object name of created textures.
    pub fn with_texture_name(mut self, name: impl Into<String>) -> Self {
        self.texture_name = name.into();
        self
    }

    /// Set the mapping of created textures.
    pub fn with_mapping(mut self, mapping: TextureMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn texture_name(&self) -> &str {
        &self.texture_name
    }

    pub fn mapping(&self) -> &TextureMapping {
        &self.mapping
    }
}

/// A filename rewrite made on the cleanup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub texture: String,
    pub from: String,
    pub to: String,
}

/// What happened to one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialOutcome {
    /// Hardware-shaded material, left alone.
    SkippedHardwareShader { material: String },
    /// No bindings and no descriptor entry matched.
    Unmatched { material: String, key: String },
    /// Matched a descriptor entry that names no texture.
    NoTextureId { material: String },
    /// Matched an entry whose texture id is outside the texture catalog.
    LookupFailed { material: String, texture_id: i64 },
    /// A new file texture was created and bound.
    Bound { material: String, file_name: String },
    /// Existing bindings were inspected; `renamed` lists the rewrites.
    Normalized {
        material: String,
        bindings: usize,
        renamed: Vec<Rename>,
    },
}

impl MaterialOutcome {
    pub fn material(&self) -> &str {
        match self {
            MaterialOutcome::SkippedHardwareShader { material }
            | MaterialOutcome::Unmatched { material, .. }
            | MaterialOutcome::NoTextureId { material }
            | MaterialOutcome::LookupFailed { material, .. }
            | MaterialOutcome::Bound { material, .. }
            | MaterialOutcome::Normalized { material, .. } => material,
        }
    }
}

/// Result of a rebinding pass.
#[derive(Debug, Default)]
pub struct RebindReport {
    pub outcomes: Vec<MaterialOutcome>,
    /// Non-fatal errors, one per affected material.
    pub errors: Vec<Error>,
}

impl RebindReport {
    pub fn bound_count(&self) -> usize {
        self.count(|o| matches!(o, MaterialOutcome::Bound { .. }))
    }

    /// Number of filenames rewritten on the cleanup path.
    pub fn normalized_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                MaterialOutcome::Normalized { renamed, .. } => renamed.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, MaterialOutcome::SkippedHardwareShader { .. }))
    }

    pub fn unmatched_count(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                MaterialOutcome::Unmatched { .. } | MaterialOutcome::NoTextureId { .. }
            )
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn count(&self, pred: impl Fn(&MaterialOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Descriptor lookup key for a scene material name.
///
/// Drops everything up to and including the last `.`, so `ns.Wood` and
/// `Wood` both give `Wood`.
pub fn strip_namespace(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Keep only the last segment of a stored texture path.
///
/// Both `\` and `/` separate segments. Returns the input unchanged when it
/// has no separator.
pub fn normalize_file_name(path: &str) -> &str {
    match path.rfind(|c| c == '\\' || c == '/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Applies an [`AssetCatalog`] to a scene's materials.
#[derive(Debug, Clone)]
pub struct MaterialRebinder<'a> {
    catalog: &'a AssetCatalog,
    options: RebindOptions,
}

impl<'a> MaterialRebinder<'a> {
    pub fn new(catalog: &'a AssetCatalog) -> Self {
        Self {
            catalog,
            options: RebindOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RebindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RebindOptions {
        &self.options
    }

    /// Run the pass over every material of `scene`.
    ///
    /// Descriptor problems are collected in the report. Errors from the scene
    /// itself abort the pass.
    pub fn rebind<S: SceneGraph>(&self, scene: &mut S) -> Result<RebindReport> {
        let mut report = RebindReport::default();

        for material in scene.materials() {
            let name = scene.material_name(material)?;

            if scene.is_hardware_shaded(material)? {
                debug!("{}: hardware shader, skipped", name);
                report
                    .outcomes
                    .push(MaterialOutcome::SkippedHardwareShader { material: name });
                continue;
            }

            let bindings = scene.diffuse_textures(material)?;
            let outcome = if bindings.is_empty() {
                self.bind_from_catalog(scene, material, name, &mut report)?
            } else {
                Self::normalize_bindings(scene, &bindings, name)?
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Rebind pass: {} materials, {} bound, {} renamed, {} skipped, {} errors",
            report.outcomes.len(),
            report.bound_count(),
            report.normalized_count(),
            report.skipped_count(),
            report.errors.len()
        );
        Ok(report)
    }

    fn bind_from_catalog<S: SceneGraph>(
        &self,
        scene: &mut S,
        material: S::MaterialHandle,
        name: String,
        report: &mut RebindReport,
    ) -> Result<MaterialOutcome> {
        let key = strip_namespace(&name).to_string();

        let Some(entry) = self.catalog.materials.find(&key) else {
            debug!("{}: no descriptor entry for '{}'", name, key);
            return Ok(MaterialOutcome::Unmatched {
                material: name,
                key,
            });
        };

        let Some(texture_id) = entry.texture_id else {
            debug!("{}: descriptor entry has no textureID", name);
            return Ok(MaterialOutcome::NoTextureId { material: name });
        };

        let file_name = match self.catalog.textures.resolve(&name, texture_id) {
            Ok(texture) => texture.filename.clone(),
            Err(err) => {
                warn!("{}", err);
                report.errors.push(err);
                return Ok(MaterialOutcome::LookupFailed {
                    material: name,
                    texture_id,
                });
            }
        };

        let texture = scene.create_file_texture(
            self.options.texture_name(),
            &file_name,
            self.options.mapping(),
        )?;
        scene.bind_diffuse_texture(material, texture)?;
        debug!("{}: bound {}", name, file_name);

        Ok(MaterialOutcome::Bound {
            material: name,
            file_name,
        })
    }

    fn normalize_bindings<S: SceneGraph>(
        scene: &mut S,
        bindings: &[S::TextureHandle],
        name: String,
    ) -> Result<MaterialOutcome> {
        let mut renamed = Vec::new();

        for &texture in bindings {
            if !scene.texture_kind(texture)?.is_file() {
                continue;
            }
            let Some(current) = scene.file_name(texture)? else {
                continue;
            };
            let normalized = normalize_file_name(&current);
            if normalized != current {
                let normalized = normalized.to_string();
                scene.set_file_name(texture, &normalized)?;
                debug!("{}: {} -> {}", name, current, normalized);
                renamed.push(Rename {
                    texture: scene.texture_name(texture)?,
                    from: current,
                    to: normalized,
                });
            }
        }

        Ok(MaterialOutcome::Normalized {
            material: name,
            bindings: bindings.len(),
            renamed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_namespace() {
        assert_eq!(strip_namespace("ns.Foo"), "Foo");
        assert_eq!(strip_namespace("a.b.Foo"), "Foo");
        assert_eq!(strip_namespace("Foo"), "Foo");
        assert_eq!(strip_namespace("Foo."), "");
        assert_eq!(strip_namespace(""), "");
    }

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name(r"C:\assets\tex\wood.png"), "wood.png");
        assert_eq!(normalize_file_name("/home/me/tex/wood.png"), "wood.png");
        assert_eq!(normalize_file_name(r"tex/sub\wood.png"), "wood.png");
        assert_eq!(normalize_file_name("wood.png"), "wood.png");
        assert_eq!(normalize_file_name(r"dir\"), "");
    }

    #[test]
    fn test_options_builder() {
        let mapping = TextureMapping {
            swap_uv: true,
            ..TextureMapping::default()
        };
        let options = RebindOptions::new()
            .with_texture_name("Albedo")
            .with_mapping(mapping);
        assert_eq!(options.texture_name(), "Albedo");
        assert!(options.mapping().swap_uv);
        assert_eq!(RebindOptions::default().texture_name(), DEFAULT_TEXTURE_NAME);
    }
}
