//! GitHub contents API store.
//!
//! Reads a repository through `GET {api_base}/repos/{owner}/{name}/contents/{path}`:
//!
//! | Call | `Accept` | Body |
//! |------|----------|------|
//! | [`read`](ContentStore::read) | `application/vnd.github.raw` | raw file text |
//! | [`list_dir`](ContentStore::list_dir) | `application/vnd.github+json` | JSON array of entries |
//!
//! A bearer token is sent when configured. Responses are cached per path for
//! the configured TTL, keyed `raw:<path>` and `dir:<path>` so a file and a
//! directory listing never collide.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;

use crate::config::GitHubConfig;
use crate::store::{ContentStore, DirEntry, StoreError};

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("command-center/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
enum Cached {
    Text(String),
    Listing(Vec<DirEntry>),
}

struct CacheEntry {
    value: Cached,
    stored_at: Instant,
}

pub struct GitHubStore {
    client: reqwest::Client,
    api_base: String,
    repo: String,
    token: Option<String>,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl GitHubStore {
    pub fn new(
        api_base: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
        ttl: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            repo: repo.into(),
            token,
            ttl,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &GitHubConfig) -> anyhow::Result<Self> {
        let repo = config
            .repo
            .clone()
            .ok_or_else(|| anyhow::anyhow!("github.repo is not configured"))?;
        Ok(Self::new(
            config.api_base.clone(),
            repo,
            config.token(),
            Duration::from_secs(config.cache_ttl_secs),
        )?)
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached(&self, key: &str) -> Option<Cached> {
        let cache = self.lock_cache();
        let entry = cache.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            tracing::debug!(key, "github cache hit");
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, value: Cached) {
        self.lock_cache().insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    async fn get(&self, path: &str, accept: &str) -> Result<reqwest::Response, StoreError> {
        let mut request = self.client.get(self.contents_url(path)).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            s => Err(StoreError::Status {
                status: s.as_u16(),
                path: path.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    fn describe(&self) -> String {
        format!("github:{}", self.repo)
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let key = format!("dir:{}", path);
        if let Some(Cached::Listing(entries)) = self.cached(&key) {
            return Ok(entries);
        }

        let entries: Vec<DirEntry> = match self.get(path, JSON_MEDIA_TYPE).await {
            Ok(response) => response.json().await?,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        self.store(key, Cached::Listing(entries.clone()));
        Ok(entries)
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let key = format!("raw:{}", path);
        if let Some(Cached::Text(text)) = self.cached(&key) {
            return Ok(text);
        }

        let text = self.get(path, RAW_MEDIA_TYPE).await?.text().await?;
        self.store(key, Cached::Text(text.clone()));
        Ok(text)
    }

    fn invalidate(&self) {
        self.lock_cache().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url() {
        let store = GitHubStore::new(
            "https://api.github.com/",
            "acme/life-data",
            None,
            Duration::from_secs(60),
        )
        .unwrap();
        assert_eq!(
            store.contents_url("agents/bam/WORKING.md"),
            "https://api.github.com/repos/acme/life-data/contents/agents/bam/WORKING.md"
        );
        assert_eq!(store.describe(), "github:acme/life-data");
    }

    #[test]
    fn test_cache_expires_and_invalidates() {
        let store = GitHubStore::new("http://localhost", "a/b", None, Duration::from_secs(60)).unwrap();
        store.store("raw:x".into(), Cached::Text("hello".into()));
        assert!(matches!(store.cached("raw:x"), Some(Cached::Text(t)) if t == "hello"));
        store.invalidate();
        assert!(store.cached("raw:x").is_none());

        let expired = GitHubStore::new("http://localhost", "a/b", None, Duration::ZERO).unwrap();
        expired.store("raw:x".into(), Cached::Text("hello".into()));
        assert!(expired.cached("raw:x").is_none());
    }
}
