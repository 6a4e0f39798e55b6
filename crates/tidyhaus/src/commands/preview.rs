//! Preview command handler and the shared plan formatter.

use std::fmt::Write;

use owo_colors::OwoColorize;
use tidyhaus_core::{PreviewOptions, PreviewResult};

use crate::cli::{GlobalOpts, PreviewArgs, SelectionArgs};
use crate::error::CliError;
use crate::output;

use super::Engine;

/// Translate the shared selection flags into core preview options.
pub fn options_from(selection: &SelectionArgs) -> PreviewOptions {
    PreviewOptions {
        area: selection.area.clone(),
        domain: selection.domain.clone(),
        skip_reviewed: selection.skip_reviewed,
        only_changes: selection.only_changes,
        show_disabled: selection.show_disabled,
    }
}

/// Human-readable rendering of a preview, grouped by device.
///
/// Also used by `execute` to show the plan before confirmation.
pub fn format_preview(result: &PreviewResult, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Preview {} — area '{}', domain '{}': {} entities, {} renames",
        result.preview_id,
        result.area,
        result.domain,
        result.total_entities(),
        result.total_renames()
    );

    for group in &result.groups {
        let _ = writeln!(out);
        match (&group.device_name, &group.suggested_device_name) {
            (Some(current), Some(suggested)) if group.device_needs_rename => {
                let header = format!("{current} -> {suggested}");
                if color {
                    let _ = writeln!(out, "{}", header.bold());
                } else {
                    let _ = writeln!(out, "{header}");
                }
            }
            (Some(current), _) => {
                if color {
                    let _ = writeln!(out, "{}", current.bold());
                } else {
                    let _ = writeln!(out, "{current}");
                }
            }
            _ => {
                let _ = writeln!(out, "(no device)");
            }
        }

        for change in &group.entities {
            let marker = if change.needs_rename { "~" } else { " " };
            let disabled = if change.disabled_by.is_some() {
                " [disabled]"
            } else {
                ""
            };
            let line = if change.needs_rename {
                format!(
                    "  {marker} {} -> {}  \"{}\" -> \"{}\"{disabled}",
                    change.old_id, change.new_id, change.current_name, change.new_name
                )
            } else {
                format!(
                    "  {marker} {}  \"{}\"{disabled}",
                    change.old_id, change.current_name
                )
            };
            if color && change.needs_rename {
                let _ = writeln!(out, "{}", line.green());
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
    }
    out.trim_end().to_string()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(engine: &Engine, args: &PreviewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let options = options_from(&args.selection);
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

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &result,
        |r| format_preview(r, color),
        |r| r.preview_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
