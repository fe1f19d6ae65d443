//! `jobfan` -- bounded-concurrency batch job dispatcher.
//!
//! Lists work items from the job-queue service, submits one analysis job
//! per item under a concurrency cap, optionally waits for every job to
//! settle, and prints a summary of both phases.
//!
//! # Environment variables
//!
//! | Variable               | Default                        | Description                              |
//! |------------------------|--------------------------------|------------------------------------------|
//! | `API_BASE_URL`         | `http://localhost:3000/api/v1` | Job-queue service root                   |
//! | `API_TOKEN`            | --                             | Bearer token, if the service needs one   |
//! | `DISPATCH_CONCURRENCY` | `4`                            | Max simultaneous create-job calls        |
//! | `POLL_CONCURRENCY`     | `4`                            | Max jobs watched at once                 |
//! | `ITEM_LIMIT`           | `0`                            | Cap on items processed (0 = all)         |
//! | `DRY_RUN`              | `false`                        | Skip create-job calls                    |
//! | `WAIT`                 | `false`                        | Poll jobs until they finish              |
//! | `POLL_INTERVAL_MS`     | `2000`                         | Delay between status checks (min 250)    |
//! | `POLL_TIMEOUT_MS`      | `600000`                       | Per-job deadline (min 1000)              |
//! | `REQUEST_TIMEOUT_SECS` | `30`                           | Per HTTP request timeout                 |
//! | `OUTPUT_FORMAT`        | `text`                         | Final report as `text` or `json`         |
//! | `LOG_FORMAT`           | `text`                         | `json` for structured log lines          |
//!
//! Logs go to stderr; the report goes to stdout.

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobfan_client::JobQueueClient;
use jobfan_core::config::{DispatchConfig, OutputFormat};
use jobfan_dispatch::runner;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = DispatchConfig::from_env().context("Invalid configuration")?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        dispatch_concurrency = config.dispatch_concurrency,
        poll_concurrency = config.poll_concurrency,
        item_limit = config.item_limit,
        dry_run = config.dry_run,
        wait = config.wait,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        poll_timeout_ms = config.poll_timeout.as_millis() as u64,
        "Starting jobfan",
    );

    let client = JobQueueClient::from_config(&config).context("Failed to build HTTP client")?;
    let report = runner::run(&client, &config).await?;

    match config.output_format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        ),
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jobfan=info,jobfan_dispatch=info,jobfan_client=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
