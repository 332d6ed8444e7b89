//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable holding the content store space id
pub const SPACE_ID_ENV: &str = "CONTENTFUL_SPACE_ID";

/// Environment variable holding the content delivery access token
pub const ACCESS_TOKEN_ENV: &str = "CONTENTFUL_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub description: String,
    pub intro: String,
    pub avatar: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub post_dir: String,

    // Date format (chrono syntax)
    pub date_format: String,

    // Content store
    #[serde(default)]
    pub contentful: ContentfulConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Hoang Nguyen Blog".to_string(),
            author: "Hoang Nguyen".to_string(),
            description: "Hoang Nguyen Blog".to_string(),
            intro: "I'm learning web development and writing about my journey.".to_string(),
            avatar: "/images/profile.jpg".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            post_dir: "posts".to_string(),

            date_format: "%B %-d, %Y".to_string(),

            contentful: ContentfulConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Override credentials from `CONTENTFUL_SPACE_ID` / `CONTENTFUL_ACCESS_TOKEN`
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override credentials using a custom variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(space) = lookup(SPACE_ID_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("Using space id from {}", SPACE_ID_ENV);
            self.contentful.space = space;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            self.contentful.access_token = token;
        }
    }
}

/// Content Delivery API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentfulConfig {
    pub space: String,
    #[serde(alias = "accessToken")]
    pub access_token: String,
    pub environment: String,
    pub host: String,
    pub content_type: String,
    pub page_size: usize,
    pub include: usize,
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        Self {
            space: String::new(),
            access_token: String::new(),
            environment: "master".to_string(),
            host: "https://cdn.contentful.com".to_string(),
            content_type: "blogPost".to_string(),
            page_size: 100,
            include: 1,
            timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl ContentfulConfig {
    /// Whether both credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.space.is_empty() && !self.access_token.is_empty()
    }
}

// Keep the token out of debug logs.
impl std::fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("space", &self.space)
            .field("access_token", &"<redacted>")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("content_type", &self.content_type)
            .field("page_size", &self.page_size)
            .field("include", &self.include)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Retry policy for transient content store failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}
