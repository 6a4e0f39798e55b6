//! Execute command handler: preview, confirm, apply.

use std::collections::HashSet;
use std::fmt::Write;

use tidyhaus_core::{DeviceSelection, ExecuteReport, ExecuteSelection};

use crate::cli::{ExecuteArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Engine, preview, util};

fn format_report(report: &ExecuteReport) -> String {
    let mut out = String::new();

    for device in &report.device_success {
        let _ = writeln!(out, "✓ device {} -> \"{}\"", device.device_id, device.new_name);
    }
    for item in &report.device_failed {
        let _ = writeln!(out, "✗ device {}: {}", item.id, item.error);
    }
    for entity in &report.success {
        let _ = writeln!(
            out,
            "✓ {} -> {}  \"{}\"",
            entity.old_id, entity.new_id, entity.new_name
        );
    }
    for item in &report.failed {
        let _ = writeln!(out, "✗ {}: {}", item.id, item.error);
    }
    for item in &report.skipped {
        let _ = writeln!(out, "- {}: {}", item.id, item.reason);
    }
    for warning in &report.dependency_warnings {
        let _ = writeln!(out, "! {warning}");
    }

    let _ = write!(
        out,
        "\n{} renamed, {} failed, {} skipped",
        report.success.len() + report.device_success.len(),
        report.failed.len() + report.device_failed.len(),
        report.skipped.len()
    );
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(engine: &Engine, args: ExecuteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let options = preview::options_from(&args.selection);
    let result = engine.preview(&options).await?;

    if result.is_empty() {
        if !global.quiet {
            eprintln!(
                "No entities matched area '{}' and domain '{}'",
                options.area, options.domain
            );
        }
        return Ok(());
    }

    // Show the plan before asking for anything.
    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!("{}\n", preview::format_preview(&result, color));
    }

    if args.dry_run {
        if !global.quiet {
            eprintln!("Dry run: nothing applied");
        }
        return Ok(());
    }

    // Entities: an explicit --entity list, validated against the
    // preview, or every proposed rename.
    let available: HashSet<&str> = result
        .groups
        .iter()
        .flat_map(|g| &g.entities)
        .map(|e| e.old_id.as_str())
        .collect();
    let entities: Vec<String> = if args.entities.is_empty() {
        result
            .groups
            .iter()
            .flat_map(|g| &g.entities)
            .filter(|e| e.needs_rename)
            .map(|e| e.old_id.clone())
            .collect()
    } else {
        for id in &args.entities {
            if !available.contains(id.as_str()) {
                return Err(CliError::Validation {
                    field: "entity".into(),
                    reason: format!("'{id}' is not part of this preview"),
                });
            }
        }
        args.entities
    };

    let devices: Vec<DeviceSelection> = if args.rename_devices {
        result
            .groups
            .iter()
            .filter(|g| g.device_needs_rename)
            .filter_map(|g| {
                Some(DeviceSelection {
                    device_id: g.device_id.clone()?,
                    new_name: g.suggested_device_name.clone()?,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    if entities.is_empty() && devices.is_empty() {
        if !global.quiet {
            eprintln!("Everything already matches the convention");
        }
        return Ok(());
    }

    let prompt = format!(
        "Apply {} entity and {} device renames in '{}'?",
        entities.len(),
        devices.len(),
        result.area
    );
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    let enable_disabled =
        args.enable_disabled || tidyhaus_config::load_config_or_default().defaults.enable_disabled;
    let selection = ExecuteSelection {
        preview_id: result.preview_id.clone(),
        entities,
        devices,
        enable_disabled,
    };

    let report = engine.execute(&selection).await?;
    let out = output::render_single(&global.output, &report, format_report, |r| {
        format!("{}/{}", r.success.len(), r.failed.len())
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
