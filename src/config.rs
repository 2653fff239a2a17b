use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    /// Messages gathered while loading, logged once the subscriber exists
    #[serde(skip)]
    pub notices: Vec<ConfigNotice>,
}

/// Something worth reporting about how the configuration was assembled
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNotice {
    /// No configuration file was found
    DefaultsUsed,
    /// A setting was overridden by the environment or the command line
    Override { key: &'static str, source: &'static str, value: String },
    /// An environment value could not be parsed and was ignored
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Where profiler records are read from
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Extended JSON export of `system.profile`; stdin when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print each explain command instead of one per line
    pub pretty: bool,
    /// Drop records whose command could only be approximated
    pub skip_lossy: bool,
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "profile-explain")]
#[command(version, about = "Rebuild explain commands from MongoDB profiler records")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Profiler records to read (overrides config file, default: stdin)
    #[arg(long, short, value_name = "PATH")]
    pub input: Option<String>,

    /// Logging level (overrides config file, e.g., "info,profile_explain=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log file (overrides config file)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Pretty-print output (overrides config file)
    #[arg(long, value_name = "BOOL")]
    pub pretty: Option<bool>,

    /// Skip records that can only be approximated (overrides config file)
    #[arg(long, value_name = "BOOL")]
    pub skip_lossy: Option<bool>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load() -> Result<Self, anyhow::Error> {
        let cli_args = CommandLineArgs::parse();
        Self::load_with_args(&cli_args)
    }

    /// Same as [`Config::load`] with already parsed arguments
    pub fn load_with_args(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            let mut config = Config::default();
            config.notices.push(ConfigNotice::DefaultsUsed);
            config
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,profile_explain=debug")
    /// - APP_LOG_FILE: Log file path
    /// - APP_INPUT_PATH: Profiler records to read
    /// - APP_OUTPUT_PRETTY: Pretty-print output (true/false)
    /// - APP_OUTPUT_SKIP_LOSSY: Skip approximated records (true/false)
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.note_override("logging.level", "env", &level);
            self.logging.level = level;
        }

        if let Ok(file) = std::env::var("APP_LOG_FILE") {
            self.note_override("logging.file", "env", &file);
            self.logging.file = Some(file);
        }

        if let Ok(path) = std::env::var("APP_INPUT_PATH") {
            self.note_override("input.path", "env", &path);
            self.input.path = Some(path);
        }

        if let Ok(pretty) = std::env::var("APP_OUTPUT_PRETTY") {
            match pretty.parse::<bool>() {
                Ok(val) => {
                    self.output.pretty = val;
                    self.note_override("output.pretty", "env", &pretty);
                },
                Err(e) => self.notices.push(ConfigNotice::Invalid {
                    var: "APP_OUTPUT_PRETTY",
                    value: pretty,
                    reason: e.to_string(),
                }),
            }
        }

        if let Ok(skip) = std::env::var("APP_OUTPUT_SKIP_LOSSY") {
            match skip.parse::<bool>() {
                Ok(val) => {
                    self.output.skip_lossy = val;
                    self.note_override("output.skip_lossy", "env", &skip);
                },
                Err(e) => self.notices.push(ConfigNotice::Invalid {
                    var: "APP_OUTPUT_SKIP_LOSSY",
                    value: skip,
                    reason: e.to_string(),
                }),
            }
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            self.note_override("logging.level", "CLI", level);
        }

        if let Some(file) = &args.log_file {
            self.logging.file = Some(file.clone());
            self.note_override("logging.file", "CLI", file);
        }

        if let Some(input) = &args.input {
            self.input.path = Some(input.clone());
            self.note_override("input.path", "CLI", input);
        }

        if let Some(pretty) = args.pretty {
            self.output.pretty = pretty;
            self.note_override("output.pretty", "CLI", &pretty.to_string());
        }

        if let Some(skip) = args.skip_lossy {
            self.output.skip_lossy = skip;
            self.note_override("output.skip_lossy", "CLI", &skip.to_string());
        }
    }

    fn note_override(&mut self, key: &'static str, source: &'static str, value: &str) {
        self.notices.push(ConfigNotice::Override { key, source, value: value.to_string() });
    }

    /// Report what loading decided
    ///
    /// Loading runs before logging is initialized, so messages are kept on
    /// the config and emitted here once the subscriber is installed.
    pub fn log_notices(&self) {
        for notice in &self.notices {
            match notice {
                ConfigNotice::DefaultsUsed => {
                    tracing::warn!("Configuration file not found, using defaults")
                },
                ConfigNotice::Override { key, source, value } => {
                    tracing::info!("Override {} from {}: {}", key, source, value)
                },
                ConfigNotice::Invalid { var, value, reason } => {
                    tracing::warn!("Invalid {} '{}': {} (ignored)", var, value, reason)
                },
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level cannot be empty");
        }

        if let Some(path) = &self.input.path
            && path.trim().is_empty()
        {
            anyhow::bail!("input.path cannot be empty");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), file: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
        assert_eq!(config.input.path, None);
        assert!(!config.output.pretty);
        assert!(!config.output.skip_lossy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [output]
            pretty = true
            "#,
        )
        .unwrap();
        assert!(config.output.pretty);
        assert!(!config.output.skip_lossy);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[logging]
level = "debug"
file = "logs/profile-explain.log"

[input]
path = "profile.json"
"#
        )
        .unwrap();
        let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/profile-explain.log"));
        assert_eq!(config.input.path.as_deref(), Some("profile.json"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        let args = CommandLineArgs {
            input: Some("records.json".to_string()),
            log_level: Some("warn".to_string()),
            pretty: Some(true),
            skip_lossy: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.input.path.as_deref(), Some("records.json"));
        assert_eq!(config.logging.level, "warn");
        assert!(config.output.pretty);
        assert!(config.output.skip_lossy);
    }

    #[test]
    fn test_overrides_are_kept_for_logging() {
        let mut config = Config::default();
        let args = CommandLineArgs {
            log_level: Some("debug".to_string()),
            skip_lossy: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(
            config.notices,
            vec![
                ConfigNotice::Override {
                    key: "logging.level",
                    source: "CLI",
                    value: "debug".to_string(),
                },
                ConfigNotice::Override {
                    key: "output.skip_lossy",
                    source: "CLI",
                    value: "true".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_validate_rejects_empty_level() {
        let mut config = Config::default();
        config.logging.level = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = CommandLineArgs::try_parse_from([
            "profile-explain",
            "--input",
            "p.json",
            "--skip-lossy",
            "true",
        ])
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("p.json"));
        assert_eq!(args.skip_lossy, Some(true));
        assert_eq!(args.pretty, None);
    }
}
