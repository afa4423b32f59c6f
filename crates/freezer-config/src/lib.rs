//! Configuration for freezer
//!
//! Settings come from three layers, highest first: command line flags (and
//! their environment variables), the YAML config file, built-in defaults.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "FREEZER_CONFIG_PATH";

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_POLL_DEADLINE_SECS: u64 = 600;

const CANDIDATES: [&str; 2] = ["freezer.yaml", ".freezer.yaml"];

/// Global config directory (`~/.config/freezer` on Linux)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("freezer");
    Ok(config_dir)
}

/// Locate the config file
///
/// Search order:
/// 1. `FREEZER_CONFIG_PATH`
/// 2. current directory: `freezer.yaml`, `.freezer.yaml`
/// 3. `<config dir>/freezer/config.yaml`
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("{} points at missing file {}", CONFIG_PATH_ENV, path.display());
    }

    if let Ok(current_dir) = std::env::current_dir() {
        for filename in &CANDIDATES {
            let path = current_dir.join(filename);
            if path.exists() {
                return Some(path);
            }
        }
    }

    let global_config = get_config_dir().ok()?.join("config.yaml");
    if global_config.exists() {
        return Some(global_config);
    }

    None
}

/// Contents of a config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FreezerConfig {
    /// Root directory of server dumps
    pub output_dir: Option<PathBuf>,

    /// Control plane API base URL
    pub endpoint: Option<String>,

    pub poll_interval_secs: Option<u64>,
    pub poll_deadline_secs: Option<u64>,
}

impl FreezerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the discovered config file, or an empty config if there is none
    pub fn discover() -> Result<Self> {
        match find_config_file() {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Effective settings after applying every layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub endpoint: String,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_deadline: Duration::from_secs(DEFAULT_POLL_DEADLINE_SECS),
        }
    }
}

impl Settings {
    /// `output_dir` is the command line value and wins over the file
    pub fn resolve(file: &FreezerConfig, output_dir: Option<PathBuf>) -> Result<Self> {
        let defaults = Settings::default();
        let poll_interval = positive_secs(
            "poll_interval_secs",
            file.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )?;
        let poll_deadline = positive_secs(
            "poll_deadline_secs",
            file.poll_deadline_secs.unwrap_or(DEFAULT_POLL_DEADLINE_SECS),
        )?;

        let output_dir = output_dir
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| file.output_dir.clone())
            .unwrap_or(defaults.output_dir);

        Ok(Self {
            output_dir,
            endpoint: file.endpoint.clone().unwrap_or(defaults.endpoint),
            poll_interval,
            poll_deadline,
        })
    }
}

fn positive_secs(field: &'static str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// Config dir ends with freezer
    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("freezer"));
    }

    /// Config is found in the current directory
    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join(".freezer.yaml"), "output_dir: dumps").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(".freezer.yaml"));
    }

    /// freezer.yaml wins over .freezer.yaml
    #[test]
    #[serial]
    fn test_visible_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("freezer.yaml"), "").unwrap();
        fs::write(temp_dir.path().join(".freezer.yaml"), "").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        let path = result.unwrap();
        assert_eq!(path.file_name().unwrap(), "freezer.yaml");
    }

    /// FREEZER_CONFIG_PATH wins
    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "endpoint: http://localhost:4000").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &config_path);
        }
        let result = find_config_file();
        let config = FreezerConfig::discover();
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        assert_eq!(result, Some(config_path));
        assert_eq!(
            config.unwrap().endpoint.as_deref(),
            Some("http://localhost:4000")
        );
    }

    /// Config keys load
    #[test]
    fn test_load_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("freezer.yaml");
        fs::write(
            &path,
            "output_dir: /var/lib/freezer\npoll_interval_secs: 2\npoll_deadline_secs: 120\n",
        )
        .unwrap();

        let config = FreezerConfig::load(&path).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/var/lib/freezer")));
        assert_eq!(config.poll_interval_secs, Some(2));
        assert_eq!(config.poll_deadline_secs, Some(120));
        assert_eq!(config.endpoint, None);
    }

    /// An empty file is an empty config
    #[test]
    fn test_empty_file_is_empty_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("freezer.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(FreezerConfig::load(&path).unwrap(), FreezerConfig::default());
    }

    /// Bad YAML and unknown keys are errors
    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("freezer.yaml");
        fs::write(&path, "poll_interval_secs: [1, 2").unwrap();

        let err = FreezerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        fs::write(&path, "unknown_key: 1").unwrap();
        assert!(FreezerConfig::load(&path).is_err());
    }

    /// Defaults
    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&FreezerConfig::default(), None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.poll_deadline, Duration::from_secs(600));
    }

    /// Flags win over the file
    #[test]
    fn test_flag_overrides_file() {
        let file = FreezerConfig {
            output_dir: Some(PathBuf::from("from-file")),
            poll_interval_secs: Some(1),
            ..Default::default()
        };

        let settings = Settings::resolve(&file, None).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("from-file"));
        assert_eq!(settings.poll_interval, Duration::from_secs(1));

        let settings = Settings::resolve(&file, Some(PathBuf::from("from-flag"))).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("from-flag"));

        let settings = Settings::resolve(&file, Some(PathBuf::new())).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("from-file"));
    }

    /// Zero poll interval is rejected
    #[test]
    fn test_zero_interval_is_rejected() {
        let file = FreezerConfig {
            poll_interval_secs: Some(0),
            ..Default::default()
        };

        let err = Settings::resolve(&file, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "poll_interval_secs",
                ..
            }
        ));
    }
}
