//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub i18n_dir: String,

    // Date / Time format (strftime)
    pub date_format: String,
    pub edited_format: String,

    // Assets
    pub logo: String,
    pub default_banner: String,

    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://localhost:3000".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            i18n_dir: "languages".to_string(),

            date_format: "%d %b %Y".to_string(),
            edited_format: "%d %b %Y, às %H:%M".to_string(),

            logo: "/logo.svg".to_string(),
            default_banner: "/images/banner.png".to_string(),

            cms: CmsConfig::default(),
            comments: CommentsConfig::default(),
            preview: PreviewConfig::default(),
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

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            tracing::debug!("CMS endpoint overridden by {}", ENDPOINT_ENV);
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            self.cms.access_token = Some(token);
        }
    }

    /// Display timezone, UTC when the configured name is unknown
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            if !self.timezone.is_empty() {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            }
            chrono_tz::UTC
        })
    }
}

/// Content repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Posts per listing page
    pub page_size: u32,
    /// Serve documents from this JSON file instead of the API
    pub fixtures: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            page_size: 20,
            fixtures: None,
        }
    }
}

/// Utterances comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub `owner/repo` storing the comments; widget disabled when empty
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

impl CommentsConfig {
    pub fn enabled(&self) -> bool {
        !self.repo.is_empty()
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub cookie_name: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie_name: "spacetraveling.preview".to_string(),
        }
    }
}
