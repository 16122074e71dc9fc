//! Logging configuration loaded from INI or JSON.
//!
//! INI files use a `[logging]` section with snake_case keys. JSON documents
//! use the PascalCase keys of the application's settings file; keys that do
//! not concern logging are ignored. Absent keys take the defaults of
//! [`LoggingSettings::default`].

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use ini::Ini;
use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

use crate::{
    handlers::{file::ProviderConfig, rolling::RollingConfig},
    level::Level,
};

const INI_SECTION: &str = "logging";

/// Errors raised while loading [`LoggingSettings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid INI: {0}")]
    Ini(#[from] ini::ParseError),
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoggingSettings {
    pub enable_file_log: bool,
    /// Gates `log_exception` and `log_error`.
    pub is_log_required: bool,
    /// Zero or negative disables size-based rolling.
    pub file_size_limit_bytes: i64,
    pub max_rolling_files: i32,
    #[serde(alias = "ProcessTaskTimeout")]
    pub process_shutdown_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_level")]
    pub minimum_level: Level,
    pub append: bool,
    pub queue_capacity: usize,
    pub log_file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enable_file_log: true,
            is_log_required: true,
            file_size_limit_bytes: 2_097_152,
            max_rolling_files: 1,
            process_shutdown_timeout_ms: 1500,
            minimum_level: Level::Information,
            append: true,
            queue_capacity: 1024,
            log_file_name: "beacon".to_owned(),
        }
    }
}

impl LoggingSettings {
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        let mut settings = Self::default();
        let Some(section) = ini.section(Some(INI_SECTION)) else {
            return Ok(settings);
        };
        for (key, value) in section.iter() {
            let value = value.trim();
            match key {
                "enable_file_log" => settings.enable_file_log = parse_bool(key, value)?,
                "is_log_required" => settings.is_log_required = parse_bool(key, value)?,
                "file_size_limit_bytes" => settings.file_size_limit_bytes = parse_value(key, value)?,
                "max_rolling_files" => settings.max_rolling_files = parse_value(key, value)?,
                "process_shutdown_timeout_ms" => {
                    settings.process_shutdown_timeout_ms = parse_value(key, value)?;
                }
                "minimum_level" => settings.minimum_level = parse_value(key, value)?,
                "append" => settings.append = parse_bool(key, value)?,
                "queue_capacity" => settings.queue_capacity = parse_value(key, value)?,
                "log_file_name" => settings.log_file_name = value.to_owned(),
                other => log::debug!("LoggingSettings: ignoring unknown key {other}"),
            }
        }
        settings.validate()
    }

    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_ini_str(&read_file(path.as_ref())?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_file(path.as_ref())?)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "queue_capacity".to_owned(),
                value: "0".to_owned(),
            });
        }
        if self.log_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_file_name".to_owned(),
                value: self.log_file_name,
            });
        }
        Ok(self)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            capacity: self.queue_capacity,
            append: self.append,
            shutdown_timeout: Duration::from_millis(self.process_shutdown_timeout_ms),
        }
    }

    /// Zero or negative rolling counts leave the suffix unbounded.
    pub fn rolling_config(&self) -> RollingConfig {
        RollingConfig::new(
            self.file_size_limit_bytes,
            usize::try_from(self.max_rolling_files).unwrap_or(0),
        )
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_application_settings() {
        let settings = LoggingSettings::default();
        assert!(settings.enable_file_log);
        assert!(settings.is_log_required);
        assert_eq!(settings.rolling_config(), RollingConfig::new(2_097_152, 1));
        assert_eq!(settings.provider_config(), ProviderConfig::default());
        assert_eq!(settings.minimum_level, Level::Information);
    }

    #[test]
    fn parses_ini_section() {
        let text = "\
[logging]
enable_file_log = false
is_log_required = no
file_size_limit_bytes = 100
max_rolling_files = 3
process_shutdown_timeout_ms = 250
minimum_level = warn
append = 0
queue_capacity = 8
log_file_name = reader
";
        let settings = LoggingSettings::from_ini_str(text).expect("valid ini");
        assert_eq!(
            settings,
            LoggingSettings {
                enable_file_log: false,
                is_log_required: false,
                file_size_limit_bytes: 100,
                max_rolling_files: 3,
                process_shutdown_timeout_ms: 250,
                minimum_level: Level::Warning,
                append: false,
                queue_capacity: 8,
                log_file_name: "reader".to_owned(),
            }
        );
        assert_eq!(
            settings.provider_config().shutdown_timeout,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn ini_without_logging_section_uses_defaults() {
        let settings = LoggingSettings::from_ini_str("[other]\nkey = value\n").expect("valid ini");
        assert_eq!(settings, LoggingSettings::default());
    }

    #[rstest]
    #[case("[logging]\nqueue_capacity = 0\n", "queue_capacity")]
    #[case("[logging]\nminimum_level = loud\n", "minimum_level")]
    #[case("[logging]\nappend = maybe\n", "append")]
    #[case("[logging]\nmax_rolling_files = many\n", "max_rolling_files")]
    fn rejects_invalid_ini_values(#[case] text: &str, #[case] expected_key: &str) {
        match LoggingSettings::from_ini_str(text) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn parses_json_settings_and_ignores_unrelated_keys() {
        let text = r#"{
            "OrganizationName": "Acme",
            "ApiEndpointForJson": "https://example.invalid/upload",
            "EnableFileLog": true,
            "IsLogRequired": false,
            "FileSizeLimitBytes": 4096,
            "MaxRollingFiles": 5,
            "ProcessTaskTimeout": 3000,
            "MinimumLevel": "Debug"
        }"#;
        let settings = LoggingSettings::from_json_str(text).expect("valid json");
        assert!(!settings.is_log_required);
        assert_eq!(settings.rolling_config(), RollingConfig::new(4096, 5));
        assert_eq!(settings.process_shutdown_timeout_ms, 3000);
        assert_eq!(settings.minimum_level, Level::Debug);
        assert_eq!(settings.log_file_name, "beacon");
    }

    #[test]
    fn non_positive_rolling_count_is_unbounded() {
        for text in [r#"{"MaxRollingFiles": -2}"#, r#"{"MaxRollingFiles": 0}"#] {
            let settings = LoggingSettings::from_json_str(text).expect("valid json");
            assert_eq!(settings.rolling_config().max_rolling_files, None);
        }
    }

    #[rstest]
    #[case(r#"{"MinimumLevel": "loud"}"#)]
    #[case(r#"{"EnableFileLog": "yes"}"#)]
    #[case("not json")]
    fn rejects_invalid_json(#[case] text: &str) {
        assert!(matches!(
            LoggingSettings::from_json_str(text),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_files() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "[logging]\nmax_rolling_files = 4\n").expect("write");
        let settings = LoggingSettings::from_ini_file(file.path()).expect("load ini");
        assert_eq!(settings.max_rolling_files, 4);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            LoggingSettings::from_json_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
