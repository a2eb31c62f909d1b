//! Integration tests for the farmlog binary
//!
//! Weather runs use `--offline` and a throwaway cache directory so they never
//! touch the network or the user's real cache.

use std::path::Path;
use std::process::Command;

use farmlog::weather::CachedPayload;
use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_farmlog"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("OPENWEATHER_API_KEY")
        .output()
        .expect("Failed to execute farmlog")
}

fn run_offline(cache_dir: &Path, args: &[&str]) -> std::process::Output {
    let dir = cache_dir.to_str().expect("utf-8 temp path");
    let mut argv = vec!["--offline", "--cache-dir", dir];
    argv.extend_from_slice(args);
    run_cli(&argv)
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("farmlog"), "Help should mention farmlog");
    assert!(stdout.contains("weather"), "Help should list the weather command");
    assert!(stdout.contains("categorize"), "Help should list the categorize command");
}

#[test]
fn test_categorize_prints_kind_and_category() {
    let output = run_cli(&["categorize", "Sold", "maize", "at", "market"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "income/sales");

    let output = run_cli(&["categorize", "Bought fertilizer"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "expense/inputs");
}

#[test]
fn test_categorize_blank_description_fails() {
    let output = run_cli(&["categorize", "   "]);
    assert!(!output.status.success(), "Blank description should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty") || stderr.contains("Empty"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_latitude_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_offline(temp_dir.path(), &["--lat", "120", "advice"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Latitude"));
}

#[test]
fn test_offline_weather_json_is_a_full_week() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_offline(temp_dir.path(), &["weather", "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let payload: CachedPayload =
        serde_json::from_slice(&output.stdout).expect("stdout should be a payload");
    assert_eq!(payload.daily.len(), 7);
    assert!(payload.is_valid());

    // placeholder data is not written to the cache
    assert!(!temp_dir.path().join("farm_weather_cache.json").exists());
}

#[test]
fn test_offline_weather_serves_persisted_payload() {
    let temp_dir = TempDir::new().unwrap();
    let old = r#"{
        "current": { "temp": 19.0, "condition": "cloudy", "humidity": 80, "windSpeed": 5.0 },
        "daily": [
            { "date": "2020-03-01", "temp": { "min": 12.0, "max": 20.0 }, "condition": "rain",
              "description": "light rain", "rainChance": 90 },
            { "date": "2020-03-02", "temp": { "min": 12.0, "max": 21.0 }, "condition": "cloudy",
              "description": "overcast clouds", "rainChance": 30 }
        ],
        "fetchedAtEpochMillis": 1583020800000
    }"#;
    std::fs::write(temp_dir.path().join("farm_weather_cache.json"), old).unwrap();

    let output = run_offline(temp_dir.path(), &["weather"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Weather data is old"));
    assert!(stdout.contains("light rain"));
    assert!(stdout.contains("indoor tasks"));

    let output = run_offline(temp_dir.path(), &["advice"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Avoid spraying pesticides"));
}

#[cfg(test)]
mod unit_tests {
    //! CLI parsing checks that don't require running the binary

    use clap::Parser;
    use farmlog::cli::{Cli, Command};
    use farmlog::config::Settings;

    #[test]
    fn test_settings_follow_flags() {
        let cli = Cli::parse_from(["farmlog", "--offline", "--timeout", "4", "advice"]);
        assert_eq!(cli.command, Command::Advice);

        let settings = Settings::from_cli(&cli).unwrap();
        assert!(settings.offline);
        assert_eq!(settings.timeout.as_secs(), 4);
    }
}
