//! stackctl - Entry Point
//!
//! Submits an infrastructure stack to the orchestration service and waits
//! until it succeeds, fails or runs out of time.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};

use stackctl::app::cli::{ApplyArgs, Cli, Commands};
use stackctl::app::options::AppOptions;
use stackctl::app::run::{run, Report};
use stackctl::http::client::HttpClient;
use stackctl::logs::init_logging;
use stackctl::options::processor::OptionProcessor;
use stackctl::shutdown::Shutdown;
use stackctl::storage::settings::Settings;
use stackctl::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => {
                println!("{}", version);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Apply(args) => apply(*args).await,
    }
}

async fn apply(args: ApplyArgs) -> ExitCode {
    // Installed first so a signal at any later point yields a report
    let shutdown = listen_for_shutdown();
    let stack_name = args.stack_name.clone();

    let settings = match Settings::load(args.settings.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => return print_report(Report::new(&stack_name, Err(e))),
    };

    let options = match AppOptions::resolve(args, settings) {
        Ok(options) => options,
        Err(e) => return print_report(Report::new(&stack_name, Err(e))),
    };

    if let Err(e) = init_logging(options.log.clone()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let api = match HttpClient::new(&options.endpoint, options.request_timeout) {
        Ok(api) => api,
        Err(e) => return print_report(Report::new(&stack_name, Err(e))),
    };

    info!("Using orchestration service at {}", api.base_url());
    let result = run(
        &OptionProcessor::new(),
        &options.deploy,
        &api,
        tokio::time::sleep,
        shutdown,
    )
    .await;

    print_report(Report::new(options.deploy.stack_name(), result))
}

fn print_report(report: Report) -> ExitCode {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if report.success {
        println!("{}", report.summary.green());
    } else {
        println!("{}", report.summary.red());
    }
    report.exit_code()
}

/// Register signal handlers now and fire the returned observer on the first
/// SIGTERM or SIGINT
#[cfg(unix)]
fn listen_for_shutdown() -> Shutdown {
    use tokio::signal::unix::{signal, SignalKind};

    let (trigger, shutdown) = Shutdown::channel();
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => info!("SIGTERM received, stopping..."),
                    _ = sigint.recv() => info!("SIGINT received, stopping..."),
                }
                trigger.fire();
            });
        }
        (Err(e), _) | (_, Err(e)) => warn!("Unable to listen for shutdown signals: {}", e),
    }
    shutdown
}

#[cfg(not(unix))]
fn listen_for_shutdown() -> Shutdown {
    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, stopping...");
                trigger.fire();
            }
            Err(e) => warn!("Unable to listen for Ctrl+C: {}", e),
        }
    });
    shutdown
}
