//! CLI argument definitions for the `gias` front end.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Give-It-A-Summary: stage a paper and a request for the summarization assistant.
#[derive(Parser, Debug)]
#[command(name = "gias", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Delay before the assistant acknowledges a request, in milliseconds.
    #[arg(long = "ack-delay-ms")]
    pub ack_delay_ms: Option<u64>,

    /// Start without the assistant's greeting.
    #[arg(long = "no-greeting")]
    pub no_greeting: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > GIAS_CONFIG env var > ~/.gias/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("GIAS_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".gias").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".gias").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::parse_from([
            "gias",
            "--config",
            "/tmp/gias.toml",
            "--log-level",
            "debug",
            "--ack-delay-ms",
            "250",
            "--no-greeting",
            "--init-config",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/gias.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.ack_delay_ms, Some(250));
        assert!(args.no_greeting);
        assert!(args.init_config);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["gias"]);
        assert!(args.config.is_none());
        assert!(args.ack_delay_ms.is_none());
        assert!(!args.no_greeting);
        assert!(!args.init_config);
        assert_eq!(args.resolve_log_level("warn"), "warn");
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs::parse_from(["gias", "-c", "custom.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_log_level_flag_wins() {
        let args = CliArgs::parse_from(["gias", "-l", "trace"]);
        assert_eq!(args.resolve_log_level("info"), "trace");
    }

    #[test]
    fn test_rejects_non_numeric_delay() {
        assert!(CliArgs::try_parse_from(["gias", "--ack-delay-ms", "soon"]).is_err());
    }
}
