//! Configuration structures and loading.

use crate::credentials::{decode_token, encode_token, TOKEN_ENV_VAR};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub explain: ExplainConfig,

    #[serde(default)]
    pub commit: CommitConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        debug!("Using config file: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Hange Configuration

[openai]
# Base URL of the API
base_url = "https://api.openai.com/v1"

# Models used by each command
explain_model = "gpt-5-nano"
commit_model = "gpt-5-nano"

# Request timeout in seconds
timeout_seconds = 120

# Uploaded files expire on the server after this many seconds,
# so nothing is left behind if cleanup is interrupted
file_expiration_seconds = 3600

# Search indexes expire after this many days of inactivity
index_expiration_days = 1

[explain]
# Parallel file readers (0 = number of CPUs - 1)
workers = 0

# Files buffered between readers and uploads (0 = 2 x workers)
buffer_size = 0

# Entry names skipped while walking directories
ignore_patterns = [".git", "target", "node_modules", ".DS_Store"]

# Upper bound for deleting remote data (0 = wait until done)
cleanup_timeout_seconds = 60

[commit]
# Lines of context around each change in the diff
diff_context_lines = 30

# Upper bound for the generated message
max_output_tokens = 80

[ui]
# Enable colored output
color = true

# Show a spinner while waiting for the service
spinner = true
"#
        .to_string()
    }

    /// Read a value by dotted key (e.g. `openai.explain_model`).
    pub fn get_field(&self, key: &str) -> ConfigResult<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["openai", "base_url"] => self.openai.base_url.clone(),
            ["openai", "explain_model"] => self.openai.explain_model.clone(),
            ["openai", "commit_model"] => self.openai.commit_model.clone(),
            ["openai", "timeout_seconds"] => self.openai.timeout_seconds.to_string(),
            ["openai", "file_expiration_seconds"] => {
                self.openai.file_expiration_seconds.to_string()
            }
            ["openai", "index_expiration_days"] => self.openai.index_expiration_days.to_string(),
            ["explain", "workers"] => self.explain.workers.to_string(),
            ["explain", "buffer_size"] => self.explain.buffer_size.to_string(),
            ["explain", "ignore_patterns"] => self.explain.ignore_patterns.join(","),
            ["explain", "cleanup_timeout_seconds"] => {
                self.explain.cleanup_timeout_seconds.to_string()
            }
            ["commit", "diff_context_lines"] => self.commit.diff_context_lines.to_string(),
            ["commit", "max_output_tokens"] => self.commit.max_output_tokens.to_string(),
            ["auth", "token"] => {
                if self.auth.token.is_some() {
                    "<set>".to_string()
                } else {
                    "<not set>".to_string()
                }
            }
            ["ui", "color"] => self.ui.color.to_string(),
            ["ui", "spinner"] => self.ui.spinner.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };

        Ok(value)
    }

    /// Set a value by dotted key (e.g. `openai.explain_model`).
    pub fn set_field(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["openai", "base_url"] => self.openai.base_url = value.to_string(),
            ["openai", "explain_model"] => self.openai.explain_model = value.to_string(),
            ["openai", "commit_model"] => self.openai.commit_model = value.to_string(),
            ["openai", "timeout_seconds"] => self.openai.timeout_seconds = parse(key, value)?,
            ["openai", "file_expiration_seconds"] => {
                self.openai.file_expiration_seconds = parse(key, value)?
            }
            ["openai", "index_expiration_days"] => {
                self.openai.index_expiration_days = parse(key, value)?
            }
            ["explain", "workers"] => self.explain.workers = parse(key, value)?,
            ["explain", "buffer_size"] => self.explain.buffer_size = parse(key, value)?,
            ["explain", "ignore_patterns"] => {
                self.explain.ignore_patterns = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            }
            ["explain", "cleanup_timeout_seconds"] => {
                self.explain.cleanup_timeout_seconds = parse(key, value)?
            }
            ["commit", "diff_context_lines"] => self.commit.diff_context_lines = parse(key, value)?,
            ["commit", "max_output_tokens"] => self.commit.max_output_tokens = parse(key, value)?,
            ["auth", "token"] => self.set_token(value)?,
            ["ui", "color"] => self.ui.color = parse(key, value)?,
            ["ui", "spinner"] => self.ui.spinner = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Store the service credential.
    pub fn set_token(&mut self, token: &str) -> ConfigResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        self.auth.token = Some(encode_token(token));
        Ok(())
    }

    /// The service credential: environment first, then the stored value.
    pub fn token(&self) -> ConfigResult<String> {
        self.resolve_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn resolve_token(&self, from_env: Option<String>) -> ConfigResult<String> {
        if let Some(token) = from_env.map(|t| t.trim().to_string()) {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        let stored = self.auth.token.as_deref().ok_or(ConfigError::TokenNotSet)?;
        let token = decode_token(stored)?;
        if token.trim().is_empty() {
            return Err(ConfigError::TokenNotSet);
        }

        Ok(token)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Hosted LLM service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub explain_model: String,
    pub commit_model: String,
    pub timeout_seconds: u64,
    pub file_expiration_seconds: u64,
    pub index_expiration_days: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            explain_model: "gpt-5-nano".to_string(),
            commit_model: "gpt-5-nano".to_string(),
            timeout_seconds: 120,
            file_expiration_seconds: 60 * 60,
            index_expiration_days: 1,
        }
    }
}

/// Settings for the `explain` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub workers: usize,
    pub buffer_size: usize,
    pub ignore_patterns: Vec<String>,
    pub cleanup_timeout_seconds: u64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            buffer_size: 0,
            ignore_patterns: vec![
                ".git".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
                ".DS_Store".to_string(),
            ],
            cleanup_timeout_seconds: 60,
        }
    }
}

/// Settings for commit message generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub diff_context_lines: u32,
    pub max_output_tokens: u32,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            diff_context_lines: 30,
            max_output_tokens: 80,
        }
    }
}

/// Stored credential, base64-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
    pub spinner: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            spinner: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.file_expiration_seconds, 3600);
        assert_eq!(config.commit.diff_context_lines, 30);
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_default_string_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_config_string()).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.openai.explain_model, defaults.openai.explain_model);
        assert_eq!(parsed.explain.ignore_patterns, defaults.explain.ignore_patterns);
        assert_eq!(parsed.commit.max_output_tokens, defaults.commit.max_output_tokens);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [openai]
            explain_model = "gpt-5.1"
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.openai.explain_model, "gpt-5.1");
        // Defaults should still work
        assert_eq!(config.openai.commit_model, "gpt-5-nano");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.explain.workers, 0);
    }

    #[test]
    fn test_set_and_get_field() {
        let mut config = Config::default();

        config.set_field("openai.commit_model", "gpt-5.1").unwrap();
        config.set_field("explain.workers", "4").unwrap();
        config.set_field("explain.ignore_patterns", ".git, dist").unwrap();

        assert_eq!(config.get_field("openai.commit_model").unwrap(), "gpt-5.1");
        assert_eq!(config.get_field("explain.workers").unwrap(), "4");
        assert_eq!(config.explain.ignore_patterns, vec![".git", "dist"]);
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut config = Config::default();

        assert!(matches!(
            config.set_field("explain.workers", "many"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_field("nope.key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_token_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set_token("  sk-secret \n").unwrap();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("sk-secret"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.resolve_token(None).unwrap(), "sk-secret");
    }

    #[test]
    fn test_token_errors() {
        let mut config = Config::default();
        assert!(matches!(config.set_token("   "), Err(ConfigError::EmptyToken)));
        assert!(matches!(config.resolve_token(None), Err(ConfigError::TokenNotSet)));
    }

    #[test]
    fn test_env_token_wins() {
        let mut config = Config::default();
        config.set_token("stored").unwrap();

        let token = config.resolve_token(Some("from-env".to_string())).unwrap();
        assert_eq!(token, "from-env");

        let token = config.resolve_token(Some("  ".to_string())).unwrap();
        assert_eq!(token, "stored");
    }
}
