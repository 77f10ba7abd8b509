//! Content client adapter
//!
//! [`ContentApi`] is the seam between the blog and a concrete content backend
//! (the Prismic REST API, or a local fixtures file). [`Client`] wraps a backend
//! with the per-request configuration (the preview ref) and offers the lookups
//! the page assemblers need.

use async_trait::async_trait;
use std::sync::Arc;

use super::document::{Document, QueryResponse};
use super::error::CmsError;
use super::query::{Predicate, QueryOptions};

/// A backend able to answer search queries
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Run a search query
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<QueryResponse, CmsError>;

    /// Dereference a `next_page` cursor returned by a previous query
    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError>;
}

/// Preview session state carried by the preview cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContext {
    /// Preview ref (the token exchanged at `/api/preview`)
    pub reference: String,
}

impl PreviewContext {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// A backend configured for one request
#[derive(Clone)]
pub struct Client {
    api: Arc<dyn ContentApi>,
    preview: Option<PreviewContext>,
}

impl Client {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { api, preview: None }
    }

    /// Scope this client to a preview session; queries without an explicit
    /// ref then read the preview ref instead of the master ref
    pub fn with_preview(mut self, preview: Option<PreviewContext>) -> Self {
        self.preview = preview;
        self
    }

    pub fn preview(&self) -> Option<&PreviewContext> {
        self.preview.as_ref()
    }

    pub async fn query(
        &self,
        predicates: &[Predicate],
        options: QueryOptions,
    ) -> Result<QueryResponse, CmsError> {
        let mut options = options;
        if options.reference.is_none() {
            options.reference = self.preview.as_ref().map(|p| p.reference.clone());
        }
        tracing::debug!(
            "CMS query {} (ref: {:?})",
            super::query::predicates_to_query(predicates),
            options.reference
        );
        self.api.query(predicates, &options).await
    }

    /// Follow a pagination cursor
    pub async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError> {
        tracing::debug!("CMS cursor {}", cursor);
        self.api.fetch_page(cursor).await
    }

    /// Fetch a document by type and uid
    pub async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<Document>, CmsError> {
        let response = self
            .query(
                &[Predicate::document_type(doc_type), Predicate::uid(doc_type, uid)],
                QueryOptions::new().page_size(1),
            )
            .await?;
        Ok(response.results.into_iter().next())
    }

    /// Fetch a document by id, optionally under a specific ref
    pub async fn get_by_id(
        &self,
        id: &str,
        reference: Option<&str>,
    ) -> Result<Option<Document>, CmsError> {
        let mut options = QueryOptions::new().page_size(1);
        options.reference = reference.map(str::to_string);
        let response = self.query(&[Predicate::document_id(id)], options).await?;
        Ok(response.results.into_iter().next())
    }

    /// Fetch the first document of a type under the given ref
    pub async fn get_single(
        &self,
        doc_type: &str,
        reference: &str,
    ) -> Result<Option<Document>, CmsError> {
        let response = self
            .query(
                &[Predicate::document_type(doc_type)],
                QueryOptions::new().page_size(1).reference(reference),
            )
            .await?;
        Ok(response.results.into_iter().next())
    }

    /// Prepare the resolution of a preview token to a site path
    pub fn preview_resolver<'a>(&'a self, token: &'a str, document_id: &'a str) -> PreviewResolver<'a> {
        PreviewResolver {
            client: self,
            token,
            document_id,
        }
    }
}

/// Maps a preview token and document id to the page that shows the document
pub struct PreviewResolver<'a> {
    client: &'a Client,
    token: &'a str,
    document_id: &'a str,
}

impl PreviewResolver<'_> {
    /// Resolve to a path with `link_resolver`.
    ///
    /// Without a document id the preview targets the whole release and
    /// `default_path` is returned. A document that is not visible under the
    /// token resolves to `None`.
    pub async fn resolve<F>(
        &self,
        link_resolver: F,
        default_path: &str,
    ) -> Result<Option<String>, CmsError>
    where
        F: Fn(&Document) -> String,
    {
        if self.document_id.is_empty() {
            return Ok(Some(default_path.to_string()));
        }

        let document = self
            .client
            .get_by_id(self.document_id, Some(self.token))
            .await?;

        Ok(document.map(|doc| link_resolver(&doc)))
    }
}
