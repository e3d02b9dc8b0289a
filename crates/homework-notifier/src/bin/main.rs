//! Homework Notifier entry point
//!
//! Watches the homework review status and relays changes to Telegram.

use clap::{Parser, Subcommand};
use colored::Colorize;
use homework_notifier::client::{PracticumClient, TelegramNotifier};
use homework_notifier::engine::{PollLoop, VerdictCatalog};
use homework_notifier::settings::{self, Credentials, Settings};
use homework_notifier::{telemetry, CycleReport};

#[derive(Parser)]
#[command(name = "homework-notifier")]
#[command(about = "Homework Notifier - relays homework review status changes to Telegram")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll forever (default)
    Run,

    /// Run a single poll cycle and print its report
    Once,

    /// Check that the required settings are present
    CheckConfig,
}

fn build_loop(
    settings: &Settings,
    credentials: &Credentials,
) -> anyhow::Result<PollLoop<PracticumClient, TelegramNotifier>> {
    let source = PracticumClient::new(
        &settings.endpoint,
        &credentials.practicum_token,
        settings.http_timeout(),
    )?;
    let sink = TelegramNotifier::new(
        &settings.telegram_api_url,
        &credentials.telegram_token,
        &credentials.chat_id,
        settings.http_timeout(),
    )?;

    Ok(PollLoop::new(
        source,
        sink,
        VerdictCatalog::default(),
        settings.retry_period(),
    ))
}

/// Credential gate; a fatal failure is also echoed to stderr
fn gate(settings: &Settings) -> anyhow::Result<Credentials> {
    settings.credentials().map_err(|e| {
        if e.is_fatal() {
            eprintln!("{} {}", "fatal:".red().bold(), e);
        }
        e.into()
    })
}

fn print_report(report: &CycleReport) -> anyhow::Result<()> {
    let label = match report {
        CycleReport::NoChange { .. } => "no change".dimmed(),
        CycleReport::StatusChanged { .. } => "status changed".green(),
        CycleReport::Failed { .. } => "failed".red(),
    };
    eprintln!("{} {}", "cycle:".bold(), label);

    if let Some(dispatch) = report.dispatch() {
        let sink = if dispatch.attempted() {
            "handed to Telegram".normal()
        } else {
            "suppressed as duplicate".dimmed()
        };
        eprintln!("{} {}", "notification:".bold(), sink);
    }

    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Seed the environment before clap reads it and before any worker
    // thread exists
    let dotenv = settings::load_dotenv(".env");

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(cli, dotenv))
}

async fn run(cli: Cli, dotenv: std::io::Result<usize>) -> anyhow::Result<()> {
    telemetry::init(&cli.settings.log_file)?;

    match dotenv {
        Ok(0) => {}
        Ok(applied) => tracing::debug!(applied, "Loaded variables from .env"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let credentials = gate(&cli.settings)?;
            let mut poll = build_loop(&cli.settings, &credentials)?;
            poll.run().await;
        }

        Commands::Once => {
            let credentials = gate(&cli.settings)?;
            let mut poll = build_loop(&cli.settings, &credentials)?;
            let report = poll.run_cycle().await;
            print_report(&report)?;
        }

        Commands::CheckConfig => {
            let mut complete = true;
            for (name, present) in cli.settings.required() {
                let mark = if present { "set".green() } else { "missing".red() };
                println!("{:<16} {}", name, mark);
                complete &= present;
            }

            if !complete {
                // Logs the critical event
                gate(&cli.settings)?;
            }
        }
    }

    Ok(())
}
