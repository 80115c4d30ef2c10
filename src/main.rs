//! CLI for PetNet
//!
//! Subcommands:
//! - `fetch`: wait for one message on a topic, print it and exit
//! - `console`: interactive session that keeps the last result around

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use petnet::config::{Settings, load_config};
use petnet::dashboard::console::{self, Console, Setting};
use petnet::dashboard::{exit_code, render, render_config_error};
use petnet::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "petnet", about = "Fetch one MQTT message and show it as metrics")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe, wait for one message, print it and exit
    Fetch(FetchArgs),
    /// Start the interactive console
    Console,
}

#[derive(Args)]
struct FetchArgs {
    /// Broker address
    #[arg(long)]
    broker: Option<String>,
    /// Broker port
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,
    /// Topic to read
    #[arg(long)]
    topic: Option<String>,
    /// Client identifier (generated when omitted)
    #[arg(long)]
    client_id: Option<String>,
    /// Seconds to wait for a message
    #[arg(long)]
    timeout: Option<f64>,
    /// Also print the full payload
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(cli.log_level.as_deref().unwrap_or(&settings.logging.level));

    match cli.command {
        Command::Fetch(args) => run_fetch(args, &settings).await,
        Command::Console => match run_console(&settings).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Console failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_fetch(args: FetchArgs, settings: &Settings) -> ExitCode {
    let mut console = Console::from_settings(settings);

    let overrides = [
        args.broker.map(Setting::Broker),
        args.port.map(Setting::Port),
        args.topic.map(Setting::Topic),
        args.client_id.map(|id| Setting::ClientId(Some(id))),
    ];
    for setting in overrides.into_iter().flatten() {
        console.apply(setting);
    }
    if let Some(secs) = args.timeout {
        match Duration::try_from_secs_f64(secs) {
            Ok(timeout) if !timeout.is_zero() => {
                console.apply(Setting::Timeout(timeout));
            }
            _ => {
                eprintln!("CONFIG ERROR: invalid timeout {secs}");
                return ExitCode::FAILURE;
            }
        }
    }

    match console.fetch().await {
        Ok(snapshot) => {
            println!("{}", render(&snapshot.result, args.raw));
            ExitCode::from(exit_code(&snapshot.result))
        }
        Err(e) => {
            eprintln!("{}", render_config_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run_console(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = Console::from_settings(settings);
    info!(
        broker = %settings.broker.host,
        port = settings.broker.port,
        topic = %settings.broker.topic,
        "console started"
    );
    println!("{}", console::HELP);

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    console::run(&mut console, input, tokio::io::stdout()).await?;
    Ok(())
}
