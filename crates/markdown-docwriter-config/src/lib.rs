use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn/open-apis";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 1;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_ORDERED_LIST_MAX_START: u64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid { config_path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub feishu: FeishuConfig,
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Credentials and transport settings for the Feishu open platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeishuConfig {
    pub app_id: String,
    /// May reference an environment variable, e.g. `$FEISHU_APP_SECRET`.
    pub app_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_folder: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub batch_size: usize,
    pub ordered_list_max_start: u64,
    pub detect_subsections: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            ordered_list_max_start: DEFAULT_ORDERED_LIST_MAX_START,
            detect_subsections: true,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

impl FeishuConfig {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            default_folder: None,
        }
    }
}

impl Config {
    pub fn new(feishu: FeishuConfig) -> Self {
        Self {
            feishu,
            writer: WriterConfig::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in credentials and folder
        let feishu = &mut config.feishu;
        feishu.app_id = Self::expand(&feishu.app_id);
        feishu.app_secret = Self::expand(&feishu.app_secret);
        feishu.default_folder = feishu.default_folder.as_deref().map(Self::expand);

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-docwriter");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self) -> Result<(), String> {
        if self.feishu.app_id.trim().is_empty() {
            return Err("feishu.app_id is empty".to_string());
        }
        if self.feishu.app_secret.trim().is_empty() {
            return Err("feishu.app_secret is empty".to_string());
        }
        if self.writer.batch_size == 0 {
            return Err("writer.batch_size must be at least 1".to_string());
        }
        Ok(())
    }

    /// Unresolvable variables leave the value as written.
    fn expand(value: &str) -> String {
        match shellexpand::full(value) {
            Ok(expanded) => expanded.into_owned(),
            Err(_) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config::new(FeishuConfig::new("cli_a1", "s3cret"))
    }

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-docwriter/config.toml"));
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[feishu]
app_id = "cli_a1"
app_secret = "s3cret"
"#,
        );

        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config, sample());
        assert_eq!(config.feishu.base_url, "https://open.feishu.cn/open-apis");
        assert_eq!(config.feishu.timeout_secs, 30);
        assert_eq!(config.feishu.max_retries, 3);
        assert_eq!(config.writer.batch_size, 50);
        assert_eq!(config.writer.ordered_list_max_start, 3);
        assert!(config.writer.detect_subsections);
    }

    #[test]
    fn test_writer_section_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[feishu]
app_id = "cli_a1"
app_secret = "s3cret"
default_folder = "fldcn123"

[writer]
ordered_list_max_start = 9
"#,
        );

        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config.feishu.default_folder.as_deref(), Some("fldcn123"));
        assert_eq!(config.writer.ordered_list_max_start, 9);
        assert_eq!(config.writer.batch_size, 50);
    }

    #[test]
    fn test_secret_from_env_var() {
        unsafe {
            env::set_var("DOCWRITER_TEST_SECRET", "from-env");
        }

        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[feishu]
app_id = "cli_a1"
app_secret = "$DOCWRITER_TEST_SECRET"
"#,
        );
        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(config.feishu.app_secret, "from-env");

        unsafe {
            env::remove_var("DOCWRITER_TEST_SECRET");
        }
    }

    #[test]
    fn test_unset_env_var_is_kept_verbatim() {
        assert_eq!(
            Config::expand("$DOCWRITER_TEST_NEVER_SET"),
            "$DOCWRITER_TEST_NEVER_SET"
        );
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_parse_error_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "[feishu]\napp_id = ");

        let err = Config::load_from_path(&path).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_missing_secret_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[feishu]
app_id = "cli_a1"
app_secret = ""
"#,
        );

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_zero_batch_size_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[feishu]
app_id = "cli_a1"
app_secret = "s3cret"

[writer]
batch_size = 0
"#,
        );

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/dir/config.toml");
        let mut config = sample();
        config.feishu.default_folder = Some("fldcn9".to_string());

        config.save_to_path(&config_file).unwrap();

        assert!(config_file.exists(), "Config file should exist");
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(loaded, config);
    }
}
