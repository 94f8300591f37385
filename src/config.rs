use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::Repository;

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".release-notes.toml";

/// Environment variable consulted when no `--token` flag is given.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .release-notes.toml.
/// All fields are optional — the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Repositories offered in the selection menu. Empty means the built-in catalog.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Fallback API token, used only when neither the flag nor GITHUB_TOKEN is set.
    pub token: Option<String>,
    /// REST API base URL. Defaults to the public GitHub API.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from .release-notes.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// The repositories to offer, falling back to the built-in catalog.
    pub fn repositories(&self) -> Vec<Repository> {
        if self.repositories.is_empty() {
            default_repositories()
        } else {
            self.repositories.clone()
        }
    }

    /// Resolve the API token: `--token` flag, then GITHUB_TOKEN, then the
    /// config file value.
    pub fn github_token(&self, flag: Option<&str>) -> Option<String> {
        let env = std::env::var(TOKEN_ENV_VAR).ok();
        resolve_token(flag, env.as_deref(), self.github.token.as_deref())
    }
}

/// Pick the first non-empty token in precedence order.
pub fn resolve_token(
    flag: Option<&str>,
    env: Option<&str>,
    fallback: Option<&str>,
) -> Option<String> {
    [flag, env, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Last four characters of the token, for the start-up banner.
pub fn mask_token(token: &str) -> &str {
    let start = token
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &token[start..]
}

pub fn default_repositories() -> Vec<Repository> {
    [
        "mattermost",
        "enterprise",
        "mattermost-mobile",
        "mattermost-desktop",
    ]
    .into_iter()
    .map(|name| Repository::new("mattermost", name))
    .collect()
}
