//! Human-readable run report.

use std::io::{self, Write};

use rebind_core::{DescriptorStatus, MaterialOutcome};

use crate::pipeline::RunSummary;

/// Write the per-material report for a finished run.
pub fn write_report<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "File: {}", summary.scene_path.display())?;
    let descriptor = summary.descriptor_path.display();
    match &summary.descriptor_status {
        DescriptorStatus::Loaded => writeln!(
            out,
            "Descriptor: {} ({} textures, {} materials)",
            descriptor, summary.catalog_textures, summary.catalog_materials
        )?,
        DescriptorStatus::Missing => writeln!(out, "Descriptor: {} (not found)", descriptor)?,
        DescriptorStatus::Malformed { message } => {
            writeln!(out, "Descriptor: {} (unreadable: {})", descriptor, message)?
        }
    }

    writeln!(out)?;
    writeln!(out, "Materials")?;
    writeln!(out, "---------")?;
    for (index, outcome) in summary.report.outcomes.iter().enumerate() {
        let shading = summary
            .materials
            .get(index)
            .map_or("?", |m| m.shading_model.as_str());
        writeln!(out, "{:<10} {}", shading, outcome.material())?;
        write_outcome(out, outcome)?;
    }

    if !summary.report.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Errors")?;
        writeln!(out, "------")?;
        for err in &summary.report.errors {
            writeln!(out, "  {}", err)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} bound, {} renamed, {} skipped, {} unmatched",
        summary.report.bound_count(),
        summary.report.normalized_count(),
        summary.report.skipped_count(),
        summary.report.unmatched_count()
    )?;
    writeln!(out, "Output: {}", summary.output_path.display())
}

fn write_outcome<W: Write>(out: &mut W, outcome: &MaterialOutcome) -> io::Result<()> {
    match outcome {
        MaterialOutcome::SkippedHardwareShader { .. } => {
            writeln!(out, "    hardware shader, skipped")
        }
        MaterialOutcome::Unmatched { key, .. } => {
            writeln!(out, "    no descriptor entry for '{}'", key)
        }
        MaterialOutcome::NoTextureId { .. } => writeln!(out, "    descriptor entry has no texture"),
        MaterialOutcome::LookupFailed { texture_id, .. } => {
            writeln!(out, "    texture {} not in catalog", texture_id)
        }
        MaterialOutcome::Bound { file_name, .. } => writeln!(out, "    bound {}", file_name),
        MaterialOutcome::Normalized {
            bindings, renamed, ..
        } => {
            if renamed.is_empty() {
                return writeln!(out, "    {} bindings, filenames already bare", bindings);
            }
            for rename in renamed {
                writeln!(out, "    {}: {} -> {}", rename.texture, rename.from, rename.to)?;
            }
            Ok(())
        }
    }
}
