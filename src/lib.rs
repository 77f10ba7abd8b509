//! spacetraveling: a blog front-end backed by the Prismic headless CMS
//!
//! Posts are read from a content repository (or a local fixtures file),
//! projected into view models and rendered with embedded Tera templates,
//! either ahead of time into static HTML or on request by the server.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
    /// Label overrides
    pub i18n_dir: PathBuf,
}

impl Blog {
    /// Create a blog from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let i18n_dir = base_dir.join(&config.i18n_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            i18n_dir,
        }
    }

    /// The configured content backend
    pub fn content_api(&self) -> Result<Arc<dyn cms::ContentApi>> {
        Ok(cms::connect(&self.config.cms, &self.base_dir)?)
    }

    /// A client reading published content
    pub fn client(&self) -> Result<cms::Client> {
        Ok(cms::Client::new(self.content_api()?))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateStats> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
