//! Command-line interface parsing for farmlog
//!
//! Every connection setting can come from a flag or from the environment, so
//! a farm's location and API key can live in the shell profile.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PROBE_ADDR, DEFAULT_TIMEOUT_SECS};
use crate::weather::source::OPEN_WEATHER_BASE_URL;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// `categorize` was given only whitespace
    #[error("Transaction description is empty")]
    EmptyDescription,
}

/// farmlog - offline-first farm records: weather advice and transaction categories
#[derive(Parser, Debug)]
#[command(name = "farmlog")]
#[command(about = "Offline-first farm weather advice and transaction categorization")]
#[command(version)]
pub struct Cli {
    /// Farm latitude in decimal degrees
    #[arg(long, env = "FARMLOG_LAT", default_value_t = DEFAULT_LATITUDE, global = true, allow_negative_numbers = true)]
    pub lat: f64,

    /// Farm longitude in decimal degrees
    #[arg(long, env = "FARMLOG_LON", default_value_t = DEFAULT_LONGITUDE, global = true, allow_negative_numbers = true)]
    pub lon: f64,

    /// Farm's offset from UTC in hours, e.g. 3 or -5.5 (defaults to this machine's)
    #[arg(long, env = "FARMLOG_UTC_OFFSET", global = true, allow_negative_numbers = true)]
    pub utc_offset: Option<f64>,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Forecast endpoint
    #[arg(long, env = "FARMLOG_WEATHER_URL", default_value = OPEN_WEATHER_BASE_URL, global = true)]
    pub base_url: String,

    /// Directory for the weather cache (defaults to the XDG cache dir)
    #[arg(long, env = "FARMLOG_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Network timeout in seconds
    #[arg(long, env = "FARMLOG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Never touch the network; serve cached or placeholder weather
    #[arg(long, global = true)]
    pub offline: bool,

    /// host:port probed to decide whether the network is reachable
    #[arg(long, env = "FARMLOG_PROBE_ADDR", default_value = DEFAULT_PROBE_ADDR, global = true)]
    pub probe_addr: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show current weather, the 7-day forecast and today's advice
    Weather {
        /// Print the raw payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show only today's farming advice
    Advice,
    /// Suggest income/expense and category for a transaction description
    ///
    /// Examples:
    ///   farmlog categorize Bought 2 bags of fertilizer
    ///   farmlog categorize "Sold maize at market"
    Categorize {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
}

/// Joins the words of a `categorize` description
///
/// # Returns
/// * `Ok(String)` with words separated by single spaces
/// * `Err(CliError::EmptyDescription)` if nothing but whitespace was given
pub fn join_description(words: &[String]) -> Result<String, CliError> {
    let joined = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return Err(CliError::EmptyDescription);
    }
    Ok(joined)
}
