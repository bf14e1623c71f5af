//! closetrack CLI — refresh one symbol's daily close history.
//!
//! ```text
//! closetrack <ticker> [market=US] [lookback_days=60]
//! ```
//!
//! Exit codes: `0` updated or already up to date, `1` setup/config
//! failure, `2` invalid input, `3` no data available, `4` write failed.

use anyhow::{Context, Result};
use clap::Parser;
use closetrack_core::data::{IndexFile, JsonFileStore, YahooProvider};
use closetrack_core::{refresh, Config, RefreshError, RefreshOutcome, RefreshRequest};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "closetrack.toml";

#[derive(Parser)]
#[command(
    name = "closetrack",
    about = "Incrementally refresh a symbol's daily closing prices into data/<market>/<SYMBOL>.json"
)]
struct Cli {
    /// Ticker, e.g. AAPL, 005930 or 035720.KQ.
    ticker: String,

    /// Market code: US or KR.
    #[arg(default_value = "US")]
    market: String,

    /// Days fetched when no usable history is stored. Defaults to the config value (60).
    lookback_days: Option<u32>,

    /// TOML config file. Defaults to ./closetrack.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot root directory (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Index file path (overrides config).
    #[arg(long)]
    index_path: Option<PathBuf>,

    /// Skip updating the index file.
    #[arg(long, default_value_t = false)]
    no_index: bool,
}

/// Why a run ended unsuccessfully.
enum Failure {
    Setup(anyhow::Error),
    Refresh(RefreshError),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Setup(_) => 1,
            Failure::Refresh(e) => u8::try_from(e.exit_code()).unwrap_or(1),
        }
    }
}

impl From<RefreshError> for Failure {
    fn from(e: RefreshError) -> Self {
        Failure::Refresh(e)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            match &failure {
                Failure::Setup(e) => {
                    error!(error = %e, "setup failed");
                    eprintln!("error: {e:#}");
                }
                Failure::Refresh(e) => {
                    error!(error = %e, "refresh failed");
                    eprintln!("error: {e}");
                }
            }
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("closetrack=info,closetrack_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<RefreshOutcome, Failure> {
    let config = load_config(cli.config.as_deref()).map_err(Failure::Setup)?;

    let lookback_days = cli.lookback_days.unwrap_or(config.lookback_days);
    let as_of = chrono::Local::now().naive_local();
    let request = RefreshRequest::new(&cli.ticker, &cli.market, lookback_days, as_of)?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());
    let store = JsonFileStore::new(data_dir);
    let provider = YahooProvider::new(config.request_timeout(), &config.user_agent)
        .context("create quote provider")
        .map_err(Failure::Setup)?;

    let outcome = refresh(&provider, &store, &request)?;

    if config.index.enabled && !cli.no_index {
        let index_path = cli.index_path.unwrap_or_else(|| config.index.path.clone());
        let index = IndexFile::new(index_path, config.index.base_url.clone());
        let url = index
            .upsert(outcome.symbol(), outcome.market())
            .map_err(RefreshError::from)?;
        info!(symbol = outcome.symbol(), %url, path = %index.path().display(), "index updated");
    }

    Ok(outcome)
}

/// Explicit `--config` must load; the default file is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("load config {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                Config::from_file(default)
                    .with_context(|| format!("load config {}", default.display()))
            } else {
                Ok(Config::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_defaults() {
        let cli = Cli::try_parse_from(["closetrack", "AAPL"]).unwrap();
        assert_eq!(cli.ticker, "AAPL");
        assert_eq!(cli.market, "US");
        assert_eq!(cli.lookback_days, None);
        assert!(!cli.no_index);
    }

    #[test]
    fn positional_overrides() {
        let cli = Cli::try_parse_from(["closetrack", "005930", "KR", "120", "--no-index"]).unwrap();
        assert_eq!(cli.market, "KR");
        assert_eq!(cli.lookback_days, Some(120));
        assert!(cli.no_index);
    }

    #[test]
    fn non_numeric_lookback_is_rejected() {
        assert!(Cli::try_parse_from(["closetrack", "AAPL", "US", "sixty"]).is_err());
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let validation = Failure::Refresh(RefreshError::Validation("bad".into()));
        assert_eq!(validation.exit_code(), 2);
        let setup = Failure::Setup(anyhow::anyhow!("boom"));
        assert_eq!(setup.exit_code(), 1);
    }

    #[test]
    fn missing_explicit_config_fails() {
        assert!(load_config(Some(Path::new("/nonexistent/closetrack.toml"))).is_err());
    }
}
