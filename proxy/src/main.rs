//! Command Center Proxy - Entry Point
//!
//! Serves the deploy, status and logs endpoints of the AI Command Center
//! dashboard and forwards them to the Vercel REST API.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::process::ExitCode;

use ccproxy::app::run::run;
use ccproxy::app::settings::Settings;
use ccproxy::logs::init_logging;
use ccproxy::utils::version_info;

use tracing::{error, info};

fn parse_args() -> HashMap<String, String> {
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // --key=value
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    cli_args
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_args();

    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let mut settings = match cli_args.get("config") {
        Some(path) => match Settings::load(Path::new(path)).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    let overrides = settings
        .apply_env(|key| env::var(key).ok())
        .and_then(|_| settings.apply_args(&cli_args));
    if let Err(e) = overrides {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = init_logging(&settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("Running ccproxy {} ({})", version.version, version.git_hash);
    let options = match settings.into_options(|key| env::var(key).ok()) {
        Ok(options) => options,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match run(options, await_shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to run the proxy: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                error!("Unable to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
