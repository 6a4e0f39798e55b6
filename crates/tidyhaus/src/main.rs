mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tidyhaus_core::{HomeAssistantBackend, JsonOverrideStore, Restructurer};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "tidyhaus", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to a Home Assistant instance
        cmd => {
            let engine = connect(&cli.global).await?;
            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &engine, &cli.global).await;
            engine.backend().close().await;
            result
        }
    }
}

/// Build the engine from the config file, profile, and CLI overrides.
async fn connect(
    global: &cli::GlobalOpts,
) -> Result<Restructurer<HomeAssistantBackend, JsonOverrideStore>, CliError> {
    let (backend_config, overrides_path) = commands::util::resolve_backend(global)?;
    let backend = HomeAssistantBackend::connect(&backend_config).await?;
    let overrides = JsonOverrideStore::open(overrides_path)?;
    Ok(Restructurer::new(backend, overrides))
}
