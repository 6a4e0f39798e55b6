//! Registry statistics handler.

use std::fmt::Write;

use tidyhaus_core::StatsSummary;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Engine;

fn detail(stats: &StatsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Entities: {}", stats.total_entities);
    let _ = writeln!(out, "Areas:    {}", stats.area_count);
    let _ = writeln!(out, "Domains:");
    for (domain, count) in &stats.domains {
        let _ = writeln!(out, "  {domain:<20} {count}");
    }
    out.trim_end().to_string()
}

pub async fn handle(engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = engine.stats().await?;
    let out = output::render_single(&global.output, &stats, detail, |s| {
        s.total_entities.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
