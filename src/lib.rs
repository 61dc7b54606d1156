//! spacetraveling: a static blog generator backed by a headless CMS
//!
//! Posts are read from a Prismic repository (or a JSON fixture file),
//! rendered into a paginated listing and one page per post with an
//! estimated read time.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod pager;
pub mod resolver;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use cms::{CmsClient, MemoryCms, PrismicClient};

/// The blog site
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// Override the CMS access token
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.config.cms.access_token = token;
        }
        self
    }

    /// Build the configured CMS client: fixtures when `cms.fixtures` is set,
    /// otherwise the Prismic API
    pub fn cms(&self) -> Result<Arc<dyn CmsClient>> {
        let cms = &self.config.cms;
        match &cms.fixtures {
            Some(fixtures) => {
                let path = self.base_dir.join(fixtures);
                tracing::info!("Using fixture documents from {:?}", path);
                Ok(Arc::new(MemoryCms::load(path)?))
            }
            None => {
                tracing::info!("Using Prismic API at {}", cms.endpoint);
                Ok(Arc::new(PrismicClient::new(
                    &cms.endpoint,
                    cms.access_token.clone(),
                    cms.timeout(),
                )?))
            }
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateSummary> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
