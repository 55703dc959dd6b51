//! # Codec Configuration
//!
//! Runtime settings for the layout codecs and their log output.
//!
//! Codec settings control defaults and safety limits shared by the fixed-layout
//! and sequential codecs. Logging settings feed [`crate::utils::logging`].
//!
//! ## Sources
//! - `from_file()` / `from_toml()` for TOML documents
//! - `from_env()` for `LAYOUT_CODEC_*` variables
//! - `Default`, optionally tweaked with `default_with_overrides()`
//!
//! ## Limits
//! - "Consume to end" stream reads are capped at 16 MiB by default
//! - Nested records deeper than 32 levels are rejected

use crate::core::layout::StringEncoding;
use crate::error::{constants, CodecError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default cap for unbounded string/array reads from a stream (16 MiB)
pub const DEFAULT_MAX_UNBOUNDED_READ: usize = 16 * 1024 * 1024;

/// Default maximum record nesting depth
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

const MAX_UNBOUNDED_READ_CEILING: usize = 1 << 30;
const MAX_NESTING_DEPTH_CEILING: usize = 256;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    #[serde(default)]
    pub codec: CodecSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Reads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            CodecError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_OPEN))
        })?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|e| CodecError::ConfigError(format!("Cannot read config file: {e}")))?;

        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| CodecError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_PARSE)))
    }

    /// Defaults overlaid with any `LAYOUT_CODEC_*` variables that are set.
    ///
    /// Unparseable numeric values are ignored; an unknown encoding name is an error.
    pub fn from_env() -> Result<Self> {
        let mut config = CodecConfig::default();

        if let Ok(encoding) = std::env::var("LAYOUT_CODEC_DEFAULT_ENCODING") {
            config.codec.default_string_encoding = encoding.parse()?;
        }

        if let Ok(limit) = std::env::var("LAYOUT_CODEC_MAX_UNBOUNDED_READ") {
            if let Ok(val) = limit.parse::<usize>() {
                config.codec.max_unbounded_read = val;
            }
        }

        if let Ok(depth) = std::env::var("LAYOUT_CODEC_MAX_NESTING_DEPTH") {
            if let Ok(val) = depth.parse::<usize>() {
                config.codec.max_nesting_depth = val;
            }
        }

        if let Ok(level) = std::env::var("LAYOUT_CODEC_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Defaults with `tweak` applied, handy in tests.
    pub fn default_with_overrides(tweak: impl FnOnce(&mut Self)) -> Self {
        let mut config = CodecConfig::default();
        tweak(&mut config);
        config
    }

    /// The default configuration rendered as TOML.
    pub fn example_config() -> String {
        toml::to_string_pretty(&CodecConfig::default()).unwrap_or_default()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Cannot render config: {e}")))?;

        std::fs::write(path, rendered).map_err(|e| {
            CodecError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_WRITE))
        })?;

        Ok(())
    }

    /// Every problem found, empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = self.codec.validate();
        problems.append(&mut self.logging.validate());
        problems
    }

    /// Like [`validate`](Self::validate) but folds all problems into one error.
    pub fn validate_strict(&self) -> Result<()> {
        let problems = self.validate();
        if problems.is_empty() {
            return Ok(());
        }
        Err(CodecError::ConfigError(format!(
            "invalid configuration: {}",
            problems.join("; ")
        )))
    }
}

/// Settings consumed by both codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Encoding for string fields that do not declare one
    pub default_string_encoding: StringEncoding,

    /// Maximum bytes a "consume to end" stream read may take
    pub max_unbounded_read: usize,

    /// Maximum nested record depth
    pub max_nesting_depth: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            default_string_encoding: StringEncoding::Ascii,
            max_unbounded_read: DEFAULT_MAX_UNBOUNDED_READ,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl CodecSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match self.max_unbounded_read {
            0 => problems.push("Max unbounded read must be greater than 0".to_string()),
            limit if limit > MAX_UNBOUNDED_READ_CEILING => problems.push(format!(
                "Max unbounded read too large: {limit} bytes (ceiling is 1 GiB)"
            )),
            _ => {}
        }

        match self.max_nesting_depth {
            0 => problems.push("Max nesting depth must be greater than 0".to_string()),
            depth if depth > MAX_NESTING_DEPTH_CEILING => problems.push(format!(
                "Max nesting depth too large: {depth} (ceiling is {MAX_NESTING_DEPTH_CEILING})"
            )),
            _ => {}
        }

        problems
    }
}

/// Where and how codec diagnostics are written
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Recorded on the startup event
    pub app_name: String,

    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    pub log_to_console: bool,

    pub log_to_file: bool,

    /// Required when `log_to_file` is set
    pub log_file_path: Option<String>,

    /// One JSON object per event instead of plain text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("layout-codec"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match self.app_name.len() {
            0 => problems.push("Application name cannot be empty".to_string()),
            len if len > 64 => problems.push(format!("Application name is {len} bytes, limit is 64")),
            _ => {}
        }

        match (&self.log_file_path, self.log_to_file) {
            (None, true) => {
                problems.push("log_file_path must be specified when log_to_file is enabled".to_string())
            }
            (Some(path), true) => {
                let dir = Path::new(path).parent().filter(|dir| !dir.as_os_str().is_empty());
                if let Some(dir) = dir.filter(|dir| !dir.exists()) {
                    problems.push(format!("Log directory {} is missing", dir.display()));
                }
            }
            _ => {}
        }

        if !(self.log_to_console || self.log_to_file) {
            problems.push("At least one logging output must be enabled".to_string());
        }

        problems
    }
}

/// `tracing::Level` as a lowercase string
mod log_level_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let name = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        name.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Level::from_str(&name).map_err(|_| D::Error::custom(format!("unknown log level `{name}`")))
    }
}
