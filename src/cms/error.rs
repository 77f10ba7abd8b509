//! CMS error types

use thiserror::Error;

/// Errors raised while talking to the content repository
#[derive(Error, Debug)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("CMS API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error("Invalid CMS endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("CMS repository has no master ref")]
    NoMasterRef,

    #[error("Failed to read fixtures: {0}")]
    Fixtures(String),
}

impl CmsError {
    pub(crate) fn invalid_cursor(cursor: &str, reason: impl std::fmt::Display) -> Self {
        CmsError::InvalidCursor(format!("{} ({})", cursor, reason))
    }
}
