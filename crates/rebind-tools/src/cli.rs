//! Command-line surface of `fbx-rebind`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::pipeline::RunConfig;

/// Rebind material diffuse textures of an FBX scene from its XML descriptor.
#[derive(Parser, Debug)]
#[command(
    name = "fbx-rebind",
    version,
    about = "Rebind FBX material textures from a sidecar descriptor",
    long_about = "Reads <scene>.xml next to the scene, binds the listed texture to every \
                  material whose diffuse channel is empty, strips directories from the \
                  filenames already bound, and writes <scene>_rename.<ext>."
)]
pub struct Cli {
    /// FBX scene to process.
    pub scene: PathBuf,

    /// Quiet mode: skip the per-material report (also accepted as `-test`).
    #[arg(long)]
    pub test: bool,

    /// Descriptor to use instead of the `.xml` next to the scene.
    #[arg(long)]
    pub descriptor: Option<PathBuf>,

    /// Output path instead of `<stem>_rename.<ext>`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write arrays uncompressed.
    #[arg(long)]
    pub no_compression: bool,
}

impl Cli {
    /// Parse arguments, accepting the legacy single-dash `-test` flag.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(args.into_iter().map(|arg| {
            let arg = arg.into();
            if arg == "-test" {
                OsString::from("--test")
            } else {
                arg
            }
        }))
    }

    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.scene).with_compression(!self.no_compression);
        if let Some(descriptor) = &self.descriptor {
            config = config.with_descriptor(descriptor);
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }
        config
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.test {
            "warn"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_test_flag() {
        let cli = Cli::parse_args(["fbx-rebind", "model.fbx", "-test"]).unwrap();
        assert!(cli.test);
        assert_eq!(cli.default_log_filter(), "warn");

        let cli = Cli::parse_args(["fbx-rebind", "--test", "model.fbx"]).unwrap();
        assert!(cli.test);

        let cli = Cli::parse_args(["fbx-rebind", "model.fbx"]).unwrap();
        assert!(!cli.test);
        assert_eq!(cli.default_log_filter(), "info");
    }

    #[test]
    fn test_run_config() {
        let cli = Cli::parse_args([
            "fbx-rebind",
            "in/model.fbx",
            "--descriptor",
            "names.xml",
            "-o",
            "out.fbx",
            "--no-compression",
        ])
        .unwrap();
        let config = cli.run_config();
        assert_eq!(config.descriptor_path(), PathBuf::from("names.xml"));
        assert_eq!(config.output_path(), PathBuf::from("out.fbx"));
        assert!(!config.compression());

        let config = Cli::parse_args(["fbx-rebind", "in/model.fbx"])
            .unwrap()
            .run_config();
        assert_eq!(config.descriptor_path(), PathBuf::from("in/model.xml"));
        assert_eq!(config.output_path(), PathBuf::from("in/model_rename.fbx"));
    }

    #[test]
    fn test_missing_scene_is_usage_error() {
        let err = Cli::parse_args(["fbx-rebind"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
