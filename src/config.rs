//! TOML configuration.
//!
//! Every section is optional. A missing file is not an error for the CLI,
//! which falls back to [`Config::minimal`] (mock data source).
//!
//! ```toml
//! [source]
//! kind = "github"
//!
//! [github]
//! repo = "owner/life-data"
//!
//! [search]
//! max_results = 20
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which data source backs the dashboard.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Mock,
    Github,
    Local,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Mock => "mock",
            SourceKind::Github => "github",
            SourceKind::Local => "local",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    /// `owner/name`.
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Environment variable holding the access token. Unset means anonymous.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repo: None,
            api_base: default_api_base(),
            token_env: default_token_env(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl GitHubConfig {
    /// Token from the configured environment variable, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LocalConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_interactive_max_results")]
    pub interactive_max_results: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            interactive_max_results: default_interactive_max_results(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_max_results() -> usize {
    20
}
fn default_interactive_max_results() -> usize {
    30
}
fn default_debounce_ms() -> u64 {
    150
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Mock source with default search and server settings.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise [`Config::minimal`]. A file that exists
/// but is invalid is still an error.
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using mock source");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    match config.source.kind {
        SourceKind::Mock => {}
        SourceKind::Github => {
            let Some(repo) = config.github.repo.as_deref() else {
                bail!("github.repo is required when source.kind = \"github\"");
            };
            let valid = repo
                .split_once('/')
                .is_some_and(|(owner, name)| {
                    !owner.is_empty() && !name.is_empty() && !name.contains('/')
                });
            if !valid {
                bail!("github.repo must be in owner/name form, got '{}'", repo);
            }
        }
        SourceKind::Local => {
            if config.local.root.is_none() {
                bail!("local.root is required when source.kind = \"local\"");
            }
        }
    }

    if config.search.max_results < 1 {
        bail!("search.max_results must be >= 1");
    }
    if config.search.interactive_max_results < 1 {
        bail!("search.interactive_max_results must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_empty_config_is_mock_with_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.source.kind, SourceKind::Mock);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.search.interactive_max_results, 30);
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.server.bind, "127.0.0.1:7340");
        assert_eq!(config.github.cache_ttl_secs, 60);
        assert_eq!(config.github.api_base, "https://api.github.com");
    }

    #[test]
    fn test_github_requires_repo() {
        let err = parse("[source]\nkind = \"github\"\n").unwrap_err();
        assert!(err.to_string().contains("github.repo is required"));
    }

    #[test]
    fn test_github_repo_form() {
        let err = parse("[source]\nkind = \"github\"\n[github]\nrepo = \"just-a-name\"\n").unwrap_err();
        assert!(err.to_string().contains("owner/name"));

        let config = parse("[source]\nkind = \"github\"\n[github]\nrepo = \"acme/life-data\"\n").unwrap();
        assert_eq!(config.github.repo.as_deref(), Some("acme/life-data"));
    }

    #[test]
    fn test_local_requires_root() {
        let err = parse("[source]\nkind = \"local\"\n").unwrap_err();
        assert!(err.to_string().contains("local.root"));
    }

    #[test]
    fn test_max_results_must_be_positive() {
        let err = parse("[search]\nmax_results = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(toml::from_str::<Config>("[source]\nkind = \"s3\"\n").is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config = parse(include_str!("../config/cmdc.example.toml")).unwrap();
        assert_eq!(config.source.kind, SourceKind::Github);
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
    }

    #[test]
    fn test_load_or_minimal_missing_file() {
        let config = load_or_minimal(Path::new("/definitely/not/here/cmdc.toml")).unwrap();
        assert_eq!(config.source.kind, SourceKind::Mock);
    }
}
