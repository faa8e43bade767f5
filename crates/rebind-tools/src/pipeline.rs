//! Load → rebind → export.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use log::info;
use rebind_core::{
    descriptor, DescriptorStatus, MaterialRebinder, RebindOptions, RebindReport, Result, SceneFile,
};

/// Suffix appended to the scene's file stem for the exported copy.
pub const OUTPUT_SUFFIX: &str = "_rename";

/// Extension used when the input scene has none.
const DEFAULT_SCENE_EXTENSION: &str = "fbx";

/// Descriptor that sits next to `scene`: same path, `xml` extension.
pub fn descriptor_path_for(scene: &Path) -> PathBuf {
    scene.with_extension("xml")
}

/// `<stem>_rename.<ext>` in the scene's directory.
pub fn output_path_for(scene: &Path) -> PathBuf {
    let mut name = scene
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(
        scene
            .extension()
            .unwrap_or_else(|| OsStr::new(DEFAULT_SCENE_EXTENSION)),
    );
    scene.with_file_name(name)
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    scene: PathBuf,
    descriptor: Option<PathBuf>,
    output: Option<PathBuf>,
    compress: bool,
    rebind: RebindOptions,
}

impl RunConfig {
    pub fn new(scene: impl Into<PathBuf>) -> Self {
        Self {
            scene: scene.into(),
            descriptor: None,
            output: None,
            compress: true,
            rebind: RebindOptions::default(),
        }
    }

    /// Use this descriptor instead of the one next to the scene.
    pub fn with_descriptor(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptor = Some(path.into());
        self
    }

    /// Write the result here instead of `<stem>_rename.<ext>`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_rebind_options(mut self, options: RebindOptions) -> Self {
        self.rebind = options;
        self
    }

    pub fn scene_path(&self) -> &Path {
        &self.scene
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.descriptor
            .clone()
            .unwrap_or_else(|| descriptor_path_for(&self.scene))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| output_path_for(&self.scene))
    }

    pub fn compression(&self) -> bool {
        self.compress
    }
}

/// A scene material as it was before the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSummary {
    pub name: String,
    pub shading_model: String,
}

/// What a run did.
#[derive(Debug)]
pub struct RunSummary {
    pub scene_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub descriptor_status: DescriptorStatus,
    pub catalog_textures: usize,
    pub catalog_materials: usize,
    /// In scene enumeration order, matching `report.outcomes`.
    pub materials: Vec<MaterialSummary>,
    pub report: RebindReport,
    pub output_path: PathBuf,
}

/// Run the whole pipeline with scene backend `S`.
///
/// A missing or malformed descriptor only means nothing gets bound. Scene
/// load and export failures are returned.
pub fn run<S: SceneFile>(config: &RunConfig) -> Result<RunSummary> {
    let descriptor_path = config.descriptor_path();
    let (catalog, descriptor_status) = descriptor::load_with_status(&descriptor_path);

    let mut scene = S::load(config.scene_path())?;
    scene.set_compression(config.compression());

    let materials = scene
        .materials()
        .into_iter()
        .map(|m| {
            Ok(MaterialSummary {
                name: scene.material_name(m)?,
                shading_model: scene.shading_model(m)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = MaterialRebinder::new(&catalog)
        .with_options(config.rebind.clone())
        .rebind(&mut scene)?;

    let output_path = config.output_path();
    scene.export(&output_path)?;
    info!("Wrote {}", output_path.display());

    Ok(RunSummary {
        scene_path: config.scene_path().to_path_buf(),
        descriptor_path,
        descriptor_status,
        catalog_textures: catalog.textures.len(),
        catalog_materials: catalog.materials.len(),
        materials,
        report,
        output_path,
    })
}
