// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remindr - appointment reminder delivery engine.
//!
//! This is the binary entry point: `serve` runs the HTTP gateway, every other
//! subcommand runs one engine operation and prints JSON.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod serve;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use remindr_core::types::SessionStatus;

use crate::commands::Operation;

/// Remindr - appointment reminder delivery engine.
#[derive(Parser, Debug)]
#[command(name = "remindr", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway.
    Serve,
    /// Discover due appointments and create a session.
    Prepare {
        /// Target date (YYYY-MM-DD); defaults to today + reminders.days_ahead.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Process the next batch of a session.
    Process {
        session_id: String,
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Prepare when no session is given, otherwise process one batch.
    Step {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show a session with its statistics and clients.
    Status { session_id: String },
    /// List past sessions, newest first.
    History {
        #[arg(long)]
        status: Option<SessionStatus>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Rewrite legacy calendar titles to "service | client".
    MigrateTitles {
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Normalize a phone number and print the result.
    Normalize {
        phone: String,
        /// Region code overriding phone.home_region.
        #[arg(long)]
        region: Option<String>,
    },
    /// Print the effective configuration (secrets redacted).
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => remindr_config::load_and_validate_path(path),
        None => remindr_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            remindr_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let Some(command) = cli.command else {
        println!("remindr: use --help for available commands");
        return;
    };

    let result = match command {
        Commands::Serve => serve::run_serve(config).await.map(|()| None),
        Commands::Normalize { phone, region } => {
            commands::run_normalize(&config, &phone, region.as_deref()).map(Some)
        }
        Commands::Config => commands::run_show_config(&config).map(Some),
        other => match operation(other) {
            Some(op) => commands::run_operation(&config, op).await.map(Some),
            None => Ok(None),
        },
    };

    match result {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Maps the engine subcommands to their operation.
fn operation(command: Commands) -> Option<Operation> {
    Some(match command {
        Commands::Prepare { date } => Operation::Prepare { date },
        Commands::Process {
            session_id,
            batch_size,
        } => Operation::Process {
            session_id,
            batch_size,
        },
        Commands::Step {
            session_id,
            batch_size,
            date,
        } => Operation::Step {
            session_id,
            batch_size,
            date,
        },
        Commands::Status { session_id } => Operation::Status { session_id },
        Commands::History {
            status,
            date,
            page,
            per_page,
        } => Operation::History {
            status,
            date,
            page,
            per_page,
        },
        Commands::MigrateTitles { offset, limit } => Operation::MigrateTitles { offset, limit },
        Commands::Serve | Commands::Normalize { .. } | Commands::Config => return None,
    })
}

/// Installs the tracing subscriber on stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("remindr={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
