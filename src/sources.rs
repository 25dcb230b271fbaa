//! Data source selection.
//!
//! The binary turns `[source].kind` into exactly one [`DataSource`] here and
//! hands it to every command. Nothing else chooses a source.

use anyhow::{Context, Result};

use command_center_core::source::mock::MockDataSource;
use command_center_core::source::DataSource;

use crate::config::{Config, SourceKind};
use crate::repo_source::RepoDataSource;
use crate::store_github::GitHubStore;
use crate::store_local::LocalStore;

pub fn make_source(config: &Config) -> Result<Box<dyn DataSource>> {
    let source: Box<dyn DataSource> = match config.source.kind {
        SourceKind::Mock => Box::new(MockDataSource::new()),
        SourceKind::Github => {
            let store = GitHubStore::from_config(&config.github)
                .context("Failed to set up GitHub store")?;
            Box::new(RepoDataSource::new(store)?)
        }
        SourceKind::Local => {
            let root = config
                .local
                .root
                .clone()
                .context("local.root is not configured")?;
            if !root.is_dir() {
                anyhow::bail!("local.root does not exist: {}", root.display());
            }
            Box::new(RepoDataSource::new(LocalStore::new(root))?)
        }
    };
    tracing::debug!(source = source.name(), "data source ready");
    Ok(source)
}

/// Print the configured source and whether it answers.
pub async fn list_sources(config: &Config) -> Result<()> {
    println!("{:<10} {:<40} HEALTHY", "KIND", "LOCATION");

    let (location, healthy) = match make_source(config) {
        Ok(source) => {
            let healthy = match source.agents().await {
                Ok(_) => "true".to_string(),
                Err(e) => format!("false ({})", e),
            };
            (source.name().to_string(), healthy)
        }
        Err(e) => ("-".to_string(), format!("false ({:#})", e)),
    };

    println!(
        "{:<10} {:<40} {}",
        config.source.kind.as_str(),
        location,
        healthy
    );
    Ok(())
}
