//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cms::RetryPolicy;
use crate::helpers::{DateFormatter, Locale, DEFAULT_DATE_FORMAT};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: Locale,
    pub timezone: String,

    // Date format (date-fns tokens)
    pub date_format: String,

    // Directory
    pub public_dir: String,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Spacetraveling".to_string(),
            language: Locale::PtBr,
            timezone: "UTC".to_string(),

            date_format: DEFAULT_DATE_FORMAT.to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Parsed display timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Date formatter for listing and detail pages
    pub fn date_formatter(&self) -> Result<DateFormatter> {
        Ok(DateFormatter::new(&self.date_format, self.language, self.tz()?))
    }
}

/// CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Prismic API entry point
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    /// Language requested from the CMS
    pub lang: String,
    /// Posts per listing page
    pub page_size: u32,
    pub timeout_secs: u64,
    /// JSON file of documents served instead of the remote API
    pub fixtures: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            lang: "pt-br".to_string(),
            page_size: 2,
            timeout_secs: 10,
            fixtures: None,
            retry: RetryConfig::default(),
        }
    }
}

impl CmsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.timeout(),
            max_attempts: self.retry.max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
        }
    }
}

/// Retry settings for transient CMS failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Spacetraveling");
        assert_eq!(config.language, Locale::PtBr);
        assert_eq!(config.cms.page_size, 2);
        assert_eq!(config.cms.lang, "pt-br");
        assert_eq!(config.cms.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en-US
timezone: America/Sao_Paulo
cms:
  endpoint: https://myblog.cdn.prismic.io/api/v2
  page_size: 5
  retry:
    max_attempts: 1
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, Locale::EnUs);
        assert_eq!(config.tz().unwrap(), chrono_tz::America::Sao_Paulo);
        assert_eq!(config.cms.page_size, 5);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.retry.max_attempts, 1);
        assert_eq!(config.cms.retry.initial_backoff_ms, 250);
    }

    #[test]
    fn test_invalid_timezone() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.date_formatter().is_err());
    }
}
