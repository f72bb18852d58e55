mod cli;
mod commands;
mod config;
mod error;
mod fetch;
mod logging;
mod render;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 ChemTools CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let interactive = matches!(cli.command, Commands::Browse(_));
    let config = &cli.config;
    let command_result = match cli.command {
        Commands::Browse(args) => {
            info!("Dispatching to 'browse' command.");
            commands::browse::run(args, config).await
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::calc::run_convert(args)
        }
        Commands::Ic50(args) => {
            info!("Dispatching to 'ic50' command.");
            commands::calc::run_ic50(args)
        }
        Commands::Pic50(args) => {
            info!("Dispatching to 'pic50' command.");
            commands::calc::run_pic50(args)
        }
        Commands::Fold(args) => {
            info!("Dispatching to 'fold' command.");
            commands::calc::run_fold(args)
        }
        Commands::Dose(args) => {
            info!("Dispatching to 'dose' command.");
            commands::calc::run_dose(args, config)
        }
        Commands::Lle(args) => {
            info!("Dispatching to 'lle' command.");
            commands::calc::run_lle(args)
        }
        Commands::Le(args) => {
            info!("Dispatching to 'le' command.");
            commands::calc::run_le(args)
        }
        Commands::Ge(args) => {
            info!("Dispatching to 'ge' command.");
            commands::calc::run_ge(args)
        }
        Commands::HeavyAtoms(args) => {
            info!("Dispatching to 'heavy-atoms' command.");
            commands::calc::run_heavy_atoms(args)
        }
        Commands::Selection(args) => {
            info!("Dispatching to 'selection' command.");
            commands::calc::run_selection(args)
        }
        Commands::Link(args) => {
            info!("Dispatching to 'link' command.");
            commands::link::run(args, config)
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            if interactive {
                println!("✅ Session ended.");
            }
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
        }
    }

    command_result
}
