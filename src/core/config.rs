//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.keyteleop/config.toml`. If missing on first run, a
//! commented-out default is generated so operators can discover all options.
//!
//! Speed limits are special: they come as a *pair*. Two positional values on
//! the command line win; anything else that isn't exactly a valid pair is
//! ignored with a warning. Teleoperation is never blocked by a bad number.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::SinkKind;
use crate::core::state::Speeds;
use crate::transport::udp::{DEFAULT_ADDRESS, DEFAULT_BIND, DEFAULT_TOPIC};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TeleopConfig {
    #[serde(default)]
    pub speeds: SpeedsConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeedsConfig {
    pub max_linear: Option<f64>,
    pub max_angular: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SinkConfig {
    pub kind: Option<SinkKind>,
    pub address: Option<String>,
    pub bind: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "keyteleop.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub speeds: Speeds,
    pub sink: SinkKind,
    pub address: String,
    pub bind: String,
    pub topic: String,
    pub log_level: LevelFilter,
}

/// Values taken from the command line. `None` / empty = not specified.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub speeds: &'a [String],
    pub sink: Option<SinkKind>,
    pub address: Option<&'a str>,
    pub verbose: bool,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A malformed or partial speed specification. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidConfiguration(pub String);

impl fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for InvalidConfiguration {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.keyteleop/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".keyteleop").join("config.toml"))
}

/// Load config from `explicit`, or from `~/.keyteleop/config.toml`.
///
/// A missing default file is generated and `TeleopConfig::default()` is
/// returned. A missing explicit file is an error. A malformed file returns
/// `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<TeleopConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(TeleopConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TeleopConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: TeleopConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# keyteleop configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [speeds]
# max_linear = 1.0                  # m/s, used when no speeds are given on the command line
# max_angular = 0.5                 # rad/s, must be set together with max_linear

# [sink]
# kind = "udp"                      # "udp" or "log"
# address = "127.0.0.1:9870"        # Or set KEYTELEOP_SINK_ADDR env var
# bind = "0.0.0.0:0"
# topic = "cmd_vel"

# [logging]
# level = "info"                    # "error", "warn", "info", "debug", "trace"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Speeds
// ============================================================================

fn parse_speed(name: &str, raw: &str) -> Result<f64, InvalidConfiguration> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| InvalidConfiguration(format!("{name} speed {raw:?} is not a number")))?;
    check_speed(name, value)
}

fn check_speed(name: &str, value: f64) -> Result<f64, InvalidConfiguration> {
    // Negative limits are passed through: they flip the key's direction
    if !value.is_finite() {
        return Err(InvalidConfiguration(format!("{name} speed {value} is not finite")));
    }
    Ok(value)
}

/// Parses the positional speed pair.
///
/// `Ok(None)` when nothing was given. Exactly two values are required.
pub fn parse_speeds(args: &[String]) -> Result<Option<Speeds>, InvalidConfiguration> {
    match args {
        [] => Ok(None),
        [linear, angular] => Ok(Some(Speeds {
            max_linear: parse_speed("linear", linear)?,
            max_angular: parse_speed("angular", angular)?,
        })),
        _ => Err(InvalidConfiguration(format!(
            "expected 0 or 2 speed values, got {}",
            args.len()
        ))),
    }
}

fn config_speeds(config: &SpeedsConfig) -> Result<Option<Speeds>, InvalidConfiguration> {
    match (config.max_linear, config.max_angular) {
        (None, None) => Ok(None),
        (Some(linear), Some(angular)) => Ok(Some(Speeds {
            max_linear: check_speed("linear", linear)?,
            max_angular: check_speed("angular", angular)?,
        })),
        _ => Err(InvalidConfiguration(
            "max_linear and max_angular must be set together".to_string(),
        )),
    }
}

/// CLI pair → config pair → defaults. An invalid CLI pair falls straight
/// back to the built-in defaults.
pub fn resolve_speeds(args: &[String], config: &SpeedsConfig) -> Speeds {
    match parse_speeds(args) {
        Ok(Some(speeds)) => return speeds,
        Ok(None) => {}
        Err(e) => {
            warn!("{}; using default speeds", e);
            return Speeds::default();
        }
    }

    match config_speeds(config) {
        Ok(Some(speeds)) => speeds,
        Ok(None) => {
            info!("Using default speeds");
            Speeds::default()
        }
        Err(e) => {
            warn!("{} (config file); using default speeds", e);
            Speeds::default()
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Level in force before the config file has been read.
pub fn startup_log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        DEFAULT_LOG_LEVEL
    }
}

fn resolve_log_level(config: &LoggingConfig, verbose: bool) -> LevelFilter {
    if verbose {
        return startup_log_level(true);
    }
    match config.level.as_deref().map(str::parse::<LevelFilter>) {
        Some(Ok(level)) => level,
        Some(Err(_)) => {
            warn!("Unknown log level {:?}, using info", config.level);
            DEFAULT_LOG_LEVEL
        }
        None => DEFAULT_LOG_LEVEL,
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TeleopConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    let speeds = resolve_speeds(cli.speeds, &config.speeds);

    // Sink: CLI → config → default
    let sink = cli.sink.or(config.sink.kind).unwrap_or_default();

    // Address: CLI → env → config → default
    let address = cli
        .address
        .map(|s| s.to_string())
        .or_else(|| std::env::var("KEYTELEOP_SINK_ADDR").ok())
        .or_else(|| config.sink.address.clone())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    ResolvedConfig {
        speeds,
        sink,
        address,
        bind: config
            .sink
            .bind
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        topic: config
            .sink
            .topic
            .clone()
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
        log_level: resolve_log_level(&config.logging, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = TeleopConfig::default();
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.speeds, Speeds { max_linear: 1.0, max_angular: 0.5 });
        assert_eq!(resolved.sink, SinkKind::Udp);
        assert_eq!(resolved.bind, DEFAULT_BIND);
        assert_eq!(resolved.topic, "cmd_vel");
        assert_eq!(resolved.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_cli_speed_pair_wins() {
        let config = TeleopConfig {
            speeds: SpeedsConfig { max_linear: Some(2.0), max_angular: Some(1.0) },
            ..Default::default()
        };
        let speeds = args(&["0.2", "0.3"]);
        let resolved = resolve(&config, &CliOverrides { speeds: &speeds, ..Default::default() });
        assert_eq!(resolved.speeds, Speeds { max_linear: 0.2, max_angular: 0.3 });
    }

    #[test]
    fn test_config_speed_pair_used_without_cli() {
        let config = SpeedsConfig { max_linear: Some(2.0), max_angular: Some(1.0) };
        assert_eq!(
            resolve_speeds(&[], &config),
            Speeds { max_linear: 2.0, max_angular: 1.0 }
        );
    }

    #[test]
    fn test_partial_specification_uses_defaults() {
        let config = SpeedsConfig { max_linear: Some(2.0), max_angular: Some(1.0) };
        assert_eq!(resolve_speeds(&args(&["0.2"]), &config), Speeds::default());
        assert_eq!(resolve_speeds(&args(&["0.2", "0.3", "0.4"]), &config), Speeds::default());

        let partial = SpeedsConfig { max_linear: Some(2.0), max_angular: None };
        assert_eq!(resolve_speeds(&[], &partial), Speeds::default());
    }

    #[test]
    fn test_malformed_speeds_use_defaults() {
        let none = SpeedsConfig::default();
        for bad in [["fast", "0.3"], ["0.2", "NaN"], ["inf", "0.3"], ["-inf", "0.3"]] {
            assert_eq!(resolve_speeds(&args(&bad), &none), Speeds::default(), "{bad:?}");
        }
    }

    #[test]
    fn test_negative_speed_pair_is_accepted() {
        let none = SpeedsConfig::default();
        assert_eq!(
            resolve_speeds(&args(&["-0.2", "0.3"]), &none),
            Speeds { max_linear: -0.2, max_angular: 0.3 }
        );

        let config = SpeedsConfig { max_linear: Some(0.4), max_angular: Some(-0.6) };
        assert_eq!(
            resolve_speeds(&[], &config),
            Speeds { max_linear: 0.4, max_angular: -0.6 }
        );
    }

    #[test]
    fn test_parse_speeds_reports_reason() {
        let err = parse_speeds(&args(&["0.2"])).unwrap_err();
        assert!(err.0.contains("got 1"));
        let err = parse_speeds(&args(&["0.2", "x"])).unwrap_err();
        assert!(err.0.contains("angular"));
        assert_eq!(parse_speeds(&[]), Ok(None));
        assert_eq!(
            parse_speeds(&args(&[" 0.5 ", "0"])),
            Ok(Some(Speeds { max_linear: 0.5, max_angular: 0.0 }))
        );
    }

    #[test]
    fn test_cli_sink_and_address_win() {
        let config = TeleopConfig {
            sink: SinkConfig {
                kind: Some(SinkKind::Udp),
                address: Some("10.0.0.2:9000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(
            &config,
            &CliOverrides {
                sink: Some(SinkKind::Log),
                address: Some("192.168.1.5:9870"),
                ..Default::default()
            },
        );
        assert_eq!(resolved.sink, SinkKind::Log);
        assert_eq!(resolved.address, "192.168.1.5:9870");
    }

    #[test]
    fn test_startup_log_level_hides_debug_unless_verbose() {
        assert_eq!(startup_log_level(false), LevelFilter::Info);
        assert!(log::Level::Debug > startup_log_level(false));
        assert_eq!(startup_log_level(true), LevelFilter::Debug);
    }

    #[test]
    fn test_log_level_resolution() {
        let config = LoggingConfig { level: Some("warn".to_string()) };
        assert_eq!(resolve_log_level(&config, false), LevelFilter::Warn);
        assert_eq!(resolve_log_level(&config, true), LevelFilter::Debug);
        let bogus = LoggingConfig { level: Some("loud".to_string()) };
        assert_eq!(resolve_log_level(&bogus, false), LevelFilter::Info);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[speeds]
max_linear = 0.8
max_angular = 1.2

[sink]
kind = "log"
address = "robot.local:9870"
topic = "base/cmd_vel"

[logging]
level = "debug"
"#;
        let config: TeleopConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.speeds.max_linear, Some(0.8));
        assert_eq!(config.sink.kind, Some(SinkKind::Log));
        assert_eq!(config.sink.topic.as_deref(), Some("base/cmd_vel"));
        assert_eq!(config.sink.bind, None);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));

        let back = toml::to_string(&config).unwrap();
        let again: TeleopConfig = toml::from_str(&back).unwrap();
        assert_eq!(again.sink.address, config.sink.address);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: TeleopConfig = toml::from_str("[sink]\nkind = \"udp\"\n").unwrap();
        assert_eq!(config.sink.kind, Some(SinkKind::Udp));
        assert!(config.speeds.max_linear.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[speeds]\nmax_linear = 0.4\nmax_angular = 0.6").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(
            resolve_speeds(&[], &config.speeds),
            Speeds { max_linear: 0.4, max_angular: 0.6 }
        );
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[speeds\nmax_linear = ").unwrap();
        assert!(matches!(load_config(Some(file.path())), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_generated_default_parses_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path);
        let config = load_config(Some(&path)).unwrap();
        assert!(config.speeds.max_linear.is_none());
        assert!(config.sink.kind.is_none());
    }
}
