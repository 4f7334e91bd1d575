//! signal-fetch command line.
//!
//! Sends one HTTP request with a deadline, optional self-aborting signals
//! and Ctrl-C merged into a single cancellation signal.
//!
//! ```text
//! signal-fetch https://example.com --timeout 500 --strategy timer
//! signal-fetch https://example.com --abort-after 100 --abort-after 250 --json
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use signal_fetch::config::{load_config, Config};
use signal_fetch::lifecycle::ctrl_c_signal;
use signal_fetch::observability::logging::init_logging;
use signal_fetch::{
    AbortKind, AbortReason, AbortSignal, FetchOptions, SignalClient, TimeoutStrategy,
};

#[derive(Parser)]
#[command(name = "signal-fetch")]
#[command(about = "Fetch a URL with a timeout and multiple abort signals", long_about = None)]
struct Cli {
    /// URL to request
    url: Url,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Abort after this many milliseconds (overrides the configured default)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Deadline strategy: signal or timer
    #[arg(short, long)]
    strategy: Option<TimeoutStrategy>,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Add a signal that aborts itself after this many milliseconds (repeatable)
    #[arg(long = "abort-after")]
    abort_after: Vec<u64>,

    /// Print a JSON summary instead of the status line
    #[arg(long)]
    json: bool,
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), Box<dyn std::error::Error>> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{}' is not in 'Name: value' form", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())?;
    let value = HeaderValue::from_str(value.trim())?;
    Ok((name, value))
}

fn build_options(cli: &Cli) -> Result<FetchOptions, Box<dyn std::error::Error>> {
    let mut options = FetchOptions::default().method(Method::from_bytes(cli.method.as_bytes())?);
    for raw in &cli.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }
    if let Some(timeout) = cli.timeout {
        options = options.timeout_millis(timeout);
    }
    for millis in &cli.abort_after {
        let reason = AbortReason::new(AbortKind::Abort, format!("aborted after {}ms", millis));
        options = options.with_signal(AbortSignal::after(Duration::from_millis(*millis), reason));
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.client.strategy = strategy;
    }

    init_logging(&config.observability);

    tracing::debug!(
        strategy = %config.client.strategy,
        default_timeout_millis = config.client.default_timeout_millis,
        "Configuration loaded"
    );

    let client = SignalClient::from_settings(config.client.clone())?;
    let interrupt = ctrl_c_signal();
    let options = build_options(&cli)?.signal(interrupt.signal());

    let started = Instant::now();
    let result = client.fetch(&cli.url, Some(options)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            let status = response.status();
            if cli.json {
                let summary = serde_json::json!({
                    "url": cli.url.as_str(),
                    "status": status.as_u16(),
                    "elapsed_ms": elapsed_ms,
                    "strategy": config.client.strategy,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} {} ({}ms)", status.as_u16(), cli.url, elapsed_ms);
            }
            Ok(())
        }
        Err(e) => {
            if cli.json {
                let summary = serde_json::json!({
                    "url": cli.url.as_str(),
                    "error": e.to_string(),
                    "timed_out": e.is_timeout(),
                    "elapsed_ms": elapsed_ms,
                    "strategy": config.client.strategy,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            tracing::error!(url = %cli.url, error = %e, elapsed_ms, "Request failed");
            Err(e.into())
        }
    }
}
