// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rubric - automated QA grading for closed helpdesk tickets.
//!
//! Binary entry point: serves the gateway, runs worker batches, and hosts
//! the backfill and prune maintenance commands.

mod backfill;

use chrono::{Duration, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use rubric_anthropic::AnthropicClient;
use rubric_config::RubricConfig;
use rubric_core::RubricError;
use rubric_gateway::{GatewayState, QueuePolicy, ServerConfig};
use rubric_grading::{Grader, Worker};
use rubric_helpdesk::HelpdeskClient;
use rubric_storage::Database;

/// Rubric - automated QA grading for closed helpdesk tickets.
#[derive(Parser, Debug)]
#[command(name = "rubric", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve,
    /// Run one worker batch and exit.
    Process,
    /// Queue ungraded closed tickets from a historical window.
    Backfill {
        /// Earliest close date to consider (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        since: String,
    },
    /// Delete completed/failed queue rows older than the retention window.
    Prune {
        /// Retention in days.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match rubric_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rubric_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("rubric: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: RubricConfig) -> Result<(), RubricError> {
    match cli.command {
        Some(Commands::Serve) => serve(&config).await,
        Some(Commands::Process) => process(&config).await,
        Some(Commands::Backfill { since }) => run_backfill(&config, &since).await,
        Some(Commands::Prune { days }) => prune(&config, days).await,
        None => {
            println!("rubric: use --help for available commands");
            Ok(())
        }
    }
}

async fn serve(config: &RubricConfig) -> Result<(), RubricError> {
    let db = open_database(config).await?;
    let helpdesk = require_helpdesk(config)?;
    let worker = build_worker(config, db.clone(), helpdesk.clone())?;

    let state = GatewayState {
        db,
        helpdesk: Some(helpdesk),
        worker,
        policy: QueuePolicy {
            delay_hours: config.queue.delay_hours,
            recent_window_days: config.queue.recent_window_days,
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        cron_secret: config.gateway.cron_secret.clone(),
    };
    rubric_gateway::start_server(&server_config, state).await
}

async fn process(config: &RubricConfig) -> Result<(), RubricError> {
    let db = open_database(config).await?;
    let helpdesk = require_helpdesk(config)?;
    let worker = build_worker(config, db.clone(), helpdesk)?;

    let summary = worker.run_once().await?;
    let rendered = serde_json::to_string_pretty(&summary)
        .map_err(|e| RubricError::Internal(format!("serializing batch summary: {e}")))?;
    println!("{rendered}");
    db.close().await
}

async fn run_backfill(config: &RubricConfig, since: &str) -> Result<(), RubricError> {
    let db = open_database(config).await?;
    let helpdesk = require_helpdesk(config)?;

    let report = backfill::run_backfill(&db, &helpdesk, since).await?;
    println!(
        "backfill: {} closed tickets in window, {} queued, {} skipped ({} pages scanned)",
        report.closed_found, report.queued, report.skipped, report.pages_scanned
    );
    if report.queued > 0 {
        println!(
            "the worker drains {} per run; trigger /process or wait for the scheduler",
            config.queue.batch_size
        );
    }
    db.close().await
}

async fn prune(config: &RubricConfig, days: u32) -> Result<(), RubricError> {
    let db = open_database(config).await?;
    let cutoff =
        (Utc::now() - Duration::days(i64::from(days))).to_rfc3339_opts(SecondsFormat::Millis, true);
    let deleted = rubric_storage::queries::queue::prune_terminal(&db, &cutoff).await?;
    println!("prune: removed {deleted} terminal queue rows older than {days} day(s)");
    db.close().await
}

async fn open_database(config: &RubricConfig) -> Result<Database, RubricError> {
    Database::open_with_options(&config.storage.database_path, config.storage.wal_mode).await
}

fn require_helpdesk(config: &RubricConfig) -> Result<HelpdeskClient, RubricError> {
    match (
        &config.helpdesk.domain,
        &config.helpdesk.email,
        &config.helpdesk.api_key,
    ) {
        (Some(domain), Some(email), Some(api_key)) => {
            HelpdeskClient::new(domain, email, api_key)
        }
        _ => Err(RubricError::Config(
            "helpdesk.domain, helpdesk.email, and helpdesk.api_key must be configured".to_string(),
        )),
    }
}

fn build_worker(
    config: &RubricConfig,
    db: Database,
    helpdesk: HelpdeskClient,
) -> Result<Worker, RubricError> {
    let api_key = config.anthropic.api_key.clone().ok_or_else(|| {
        RubricError::Config("anthropic.api_key must be configured".to_string())
    })?;
    let llm = AnthropicClient::new(
        api_key,
        config.anthropic.api_version.clone(),
        config.anthropic.model.clone(),
    )?;
    let domain = config
        .helpdesk
        .domain
        .clone()
        .unwrap_or_default();
    let grader = Grader::new(
        db.clone(),
        helpdesk,
        llm,
        domain,
        config.anthropic.max_tokens,
    );
    Ok(Worker::new(db, grader, config.queue.batch_size))
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
