//! Override management handlers.

use serde::Serialize;
use tabled::Tabled;
use tidyhaus_core::{OverrideScope, OverrideStore};

use crate::cli::{GlobalOpts, OverrideCommand, OverrideScopeArg};
use crate::error::CliError;
use crate::output;

use super::Engine;

#[derive(Serialize, Tabled)]
struct OverrideRow {
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(
    engine: &Engine,
    cmd: OverrideCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        OverrideCommand::Area { area_id, name } => {
            engine.set_area_override(&area_id, &name)?;
            if !global.quiet {
                eprintln!("✓ Area '{area_id}' will display as \"{name}\"");
            }
            Ok(())
        }

        OverrideCommand::Device { device_id, name } => {
            let suggested = engine.set_device_override(&device_id, &name).await?;
            if !global.quiet {
                eprintln!("✓ Device override stored; suggested name: \"{suggested}\"");
            }
            Ok(())
        }

        OverrideCommand::Entity { entity_id, name } => {
            let new_name = engine.set_entity_override(&entity_id, &name).await?;
            if !global.quiet {
                eprintln!("✓ {entity_id} now displays as \"{new_name}\"");
            }
            Ok(())
        }

        OverrideCommand::Remove { scope, id } => {
            let removed = match scope {
                OverrideScopeArg::Area => engine.remove_area_override(&id)?,
                OverrideScopeArg::Device => engine.remove_device_override(&id)?,
                // Resolves the entity id to its registry id first.
                OverrideScopeArg::Entity => engine.remove_entity_override(&id).await?,
            };
            if !global.quiet {
                if removed {
                    eprintln!("✓ Override removed");
                } else {
                    eprintln!("No override stored for '{id}'");
                }
            }
            Ok(())
        }

        OverrideCommand::List => {
            let store = engine.overrides();
            let mut rows = Vec::new();
            for scope in [
                OverrideScope::Area,
                OverrideScope::Device,
                OverrideScope::Entity,
            ] {
                for (id, name) in store.all(scope) {
                    rows.push(OverrideRow {
                        scope: scope.to_string(),
                        id,
                        name,
                    });
                }
            }

            if rows.is_empty() {
                if !global.quiet {
                    eprintln!("No overrides stored");
                }
                return Ok(());
            }

            let out = output::render_list(
                &global.output,
                &rows,
                |r| OverrideRow {
                    scope: r.scope.clone(),
                    id: r.id.clone(),
                    name: r.name.clone(),
                },
                |r| format!("{}:{}", r.scope, r.id),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
