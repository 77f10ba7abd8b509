//! Headless CMS access - queries, documents and backends

mod client;
mod document;
mod error;
pub mod fixtures;
pub mod prismic;
pub mod query;

use std::path::Path;
use std::sync::Arc;

pub use client::{Client, ContentApi, PreviewContext, PreviewResolver};
pub use document::{parse_publication_date, ApiInfo, Document, QueryResponse, RefInfo};
pub use error::CmsError;
pub use fixtures::FixtureApi;
pub use prismic::PrismicApi;
pub use query::{Ordering, Predicate, QueryOptions};

use crate::config::CmsConfig;

/// Build the backend described by the configuration: the fixtures file when
/// one is set, the Prismic API otherwise
pub fn connect(config: &CmsConfig, base_dir: &Path) -> Result<Arc<dyn ContentApi>, CmsError> {
    if let Some(fixtures) = config.fixtures.as_deref().filter(|f| !f.is_empty()) {
        return Ok(Arc::new(FixtureApi::load(base_dir.join(fixtures))?));
    }

    tracing::debug!("Using Prismic endpoint {}", config.endpoint);
    Ok(Arc::new(PrismicApi::new(
        &config.endpoint,
        config.access_token.clone(),
    )?))
}
