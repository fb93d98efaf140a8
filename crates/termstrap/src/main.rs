mod app;
mod cli;
mod error;
mod logging;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use termstrap_platform::HostEnvironment;

use crate::app::App;
use crate::cli::{Cli, Commands};
use crate::error::AppError;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings_path = Settings::path(cli.settings.as_deref());
    let settings = settings_path
        .as_deref()
        .map(Settings::load_from)
        .unwrap_or_default();

    logging::init_logging(cli.verbose, settings.max_log_size_bytes);
    log::debug!("termstrap {} starting", app::VERSION);

    match run(cli.command_or_default(), settings, settings_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::debug!("Run failed: {error:?}");
            eprintln!("termstrap: {error}");
            error.into()
        }
    }
}

async fn run(
    command: Commands,
    settings: Settings,
    settings_path: Option<std::path::PathBuf>,
) -> Result<(), AppError> {
    let env = HostEnvironment::detect().map_err(AppError::environment_unavailable)?;

    match command {
        Commands::Install(args) => {
            if !args.dry_run
                && let Some(path) = settings_path.filter(|path| !path.exists())
            {
                match settings.save_to(&path) {
                    Ok(()) => log::info!("Wrote default settings to {}", path.display()),
                    Err(error) => log::warn!("Could not write {}: {error}", path.display()),
                }
            }

            let report = App::new(env, settings).install(&args).await?;
            print!("{report}");
        }
        Commands::Uninstall(args) => {
            let report = App::new(env, settings).uninstall(&args)?;
            print!("{report}");
        }
        Commands::Status => {
            let report = App::new(env, settings).status().await;
            print!("{report}");
        }
    }

    Ok(())
}
