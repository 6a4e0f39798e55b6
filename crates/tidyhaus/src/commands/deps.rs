//! Dependency inspection command handler.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{DepsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Engine;

#[derive(Serialize, Tabled)]
struct ReferenceRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Holder")]
    holder: String,
}

pub async fn handle(engine: &Engine, args: &DepsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let references = engine.dependencies(&args.entity_id).await?;

    let rows: Vec<ReferenceRow> = references
        .iter()
        .flat_map(|(kind, holders)| {
            holders.iter().map(|holder| ReferenceRow {
                kind: kind.to_string(),
                holder: holder.clone(),
            })
        })
        .collect();

    if rows.is_empty() {
        if !global.quiet {
            eprintln!("No references to '{}' found", args.entity_id);
        }
        return Ok(());
    }

    let out = output::render_list(&global.output, &rows, |r| ReferenceRow {
        kind: r.kind.clone(),
        holder: r.holder.clone(),
    }, |r| r.holder.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
