pub mod commands;

use clap::{Parser, Subcommand};
use noforma_core::config::{AppConfig, LoadOptions};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "noforma",
    about = "NoForma agent plan configurator",
    long_about = "Browse the agent catalog, price monthly plans and replay onboarding sessions.",
    after_help = "Examples:\n  noforma catalog\n  noforma quote --limit 150 --concurrency 2 \
                  --with-estimation\n  noforma simulate --action toggle:estimation --action next"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the available agent types with pricing and allowances")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Price a monthly plan anchored on the required agent")]
    Quote {
        #[arg(long, help = "Monthly limit for the required agent (parsed leniently)")]
        limit: Option<String>,
        #[arg(long, help = "Concurrent clients for the required agent (parsed leniently)")]
        concurrency: Option<String>,
        #[arg(long, help = "Enable the estimation agent")]
        with_estimation: bool,
        #[arg(long = "with", value_name = "AGENT_ID", help = "Enable an optional agent by id")]
        with_agents: Vec<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Replay a scripted configurator session and print the final view")]
    Simulate {
        #[arg(
            long = "action",
            value_name = "ACTION",
            help = "Action such as next, toggle:estimation, limit:conversational=150"
        )]
        actions: Vec<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog, and pricing readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging(config: &AppConfig) {
    use noforma_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // try_init: a subscriber may already be installed when embedded in tests.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Quote { limit, concurrency, with_estimation, with_agents, json } => {
            commands::quote::run(commands::quote::QuoteArgs {
                limit,
                concurrency,
                with_estimation,
                with_agents,
                json,
            })
        }
        Command::Simulate { actions, json } => commands::simulate::run(&actions, json),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::CommandResult::text(commands::doctor::run(json)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
