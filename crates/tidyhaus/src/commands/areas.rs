//! Areas command handler.

use tabled::Tabled;
use tidyhaus_core::AreaSummary;

use crate::cli::{AreasArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Engine;

#[derive(Tabled)]
struct AreaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Entities")]
    entities: usize,
    #[tabled(rename = "Domains")]
    domains: String,
}

impl From<&AreaSummary> for AreaRow {
    fn from(a: &AreaSummary) -> Self {
        let mut name = a.display_name.clone();
        if a.display_name != a.name {
            name.push_str(&format!(" ({})", a.name));
        }
        Self {
            id: a.id.clone().unwrap_or_else(|| "-".into()),
            name,
            entities: a.entity_count,
            domains: a
                .domains
                .iter()
                .map(|(domain, count)| format!("{domain}:{count}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

pub async fn handle(engine: &Engine, args: AreasArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut summaries = engine.areas().await?;
    if args.non_empty {
        summaries.retain(|a| a.entity_count > 0);
    }

    let out = output::render_list(
        &global.output,
        &summaries,
        |a| AreaRow::from(a),
        |a| a.id.clone().unwrap_or_else(|| a.name.clone()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
