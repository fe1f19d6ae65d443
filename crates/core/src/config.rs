use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Lower bound on the delay between two status calls for one job.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Lower bound on the per-job polling deadline.
pub const MIN_POLL_TIMEOUT_MS: u64 = 1_000;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/v1";
const DEFAULT_DISPATCH_CONCURRENCY: usize = 4;
const DEFAULT_POLL_CONCURRENCY: usize = 4;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_POLL_TIMEOUT_MS: u64 = 600_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How the final run report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Dispatcher configuration loaded from environment variables.
///
/// Every option has a default suitable for a local job-queue service.
/// Concurrency and timing values are clamped to their floors here, so
/// downstream code can rely on them being usable as-is.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Root URL for list/create/status calls, without trailing slash.
    pub api_base_url: String,
    /// Optional bearer token sent with every request.
    pub api_token: Option<String>,
    /// Timeout applied to each individual HTTP request.
    pub request_timeout: Duration,
    /// Max simultaneous create-job calls (at least 1).
    pub dispatch_concurrency: usize,
    /// Max simultaneous job watchers (at least 1, at most `dispatch_concurrency`).
    pub poll_concurrency: usize,
    /// Cap on work items processed; `0` means unlimited.
    pub item_limit: usize,
    /// Skip create-job calls and synthesize successes.
    pub dry_run: bool,
    /// Poll every created job until it settles.
    pub wait: bool,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub output_format: OutputFormat,
}

impl DispatchConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                         |
    /// |------------------------|---------------------------------|
    /// | `API_BASE_URL`         | `http://localhost:3000/api/v1`  |
    /// | `API_TOKEN`            | unset                           |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                            |
    /// | `DISPATCH_CONCURRENCY` | `4` (floor 1)                   |
    /// | `POLL_CONCURRENCY`     | `4` (floor 1, capped at dispatch) |
    /// | `ITEM_LIMIT`           | `0` (unlimited)                 |
    /// | `DRY_RUN`              | `false`                         |
    /// | `WAIT`                 | `false`                         |
    /// | `POLL_INTERVAL_MS`     | `2000` (floor 250)              |
    /// | `POLL_TIMEOUT_MS`      | `600000` (floor 1000)           |
    /// | `OUTPUT_FORMAT`        | `text`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = get("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let api_token = get("API_TOKEN");

        let request_timeout_secs: u64 = parse_number(
            "REQUEST_TIMEOUT_SECS",
            get("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let dispatch_concurrency: usize = parse_number(
            "DISPATCH_CONCURRENCY",
            get("DISPATCH_CONCURRENCY"),
            DEFAULT_DISPATCH_CONCURRENCY,
        )?
        .max(1);

        let poll_concurrency: usize = parse_number(
            "POLL_CONCURRENCY",
            get("POLL_CONCURRENCY"),
            DEFAULT_POLL_CONCURRENCY,
        )?
        .clamp(1, dispatch_concurrency);

        let item_limit: usize = parse_number("ITEM_LIMIT", get("ITEM_LIMIT"), 0)?;

        let dry_run = parse_bool("DRY_RUN", get("DRY_RUN"))?;
        let wait = parse_bool("WAIT", get("WAIT"))?;

        let poll_interval_ms: u64 = parse_number(
            "POLL_INTERVAL_MS",
            get("POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?
        .max(MIN_POLL_INTERVAL_MS);

        let poll_timeout_ms: u64 = parse_number(
            "POLL_TIMEOUT_MS",
            get("POLL_TIMEOUT_MS"),
            DEFAULT_POLL_TIMEOUT_MS,
        )?
        .max(MIN_POLL_TIMEOUT_MS);

        let output_format = match get("OUTPUT_FORMAT") {
            None => OutputFormat::Text,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "text" => OutputFormat::Text,
                "json" => OutputFormat::Json,
                _ => return Err(ConfigError::InvalidOutputFormat(v)),
            },
        };

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout: Duration::from_secs(request_timeout_secs),
            dispatch_concurrency,
            poll_concurrency,
            item_limit,
            dry_run,
            wait,
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_timeout: Duration::from_millis(poll_timeout_ms),
            output_format,
        })
    }
}

fn parse_number<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: v }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(false);
    };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value: v }),
    }
}
