//! Prismic REST API v2 backend
//!
//! Every query first reads the repository root to learn the current master
//! ref (unless the query carries its own ref), then calls
//! `/documents/search`. Nothing is cached between calls.

use async_trait::async_trait;
use url::Url;

use super::client::ContentApi;
use super::document::{ApiInfo, QueryResponse};
use super::error::CmsError;
use super::query::{orderings_to_query, predicates_to_query, Predicate, QueryOptions};

/// HTTP client for a Prismic repository
pub struct PrismicApi {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicApi {
    /// Create a client for an API endpoint such as
    /// `https://my-repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, CmsError> {
        Self::with_client(reqwest::Client::new(), endpoint, access_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    pub fn with_client(
        http: reqwest::Client,
        endpoint: &str,
        access_token: Option<String>,
    ) -> Result<Self, CmsError> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| CmsError::InvalidEndpoint(format!("{} ({})", endpoint, e)))?;
        let access_token = access_token.filter(|t| !t.is_empty());
        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    /// Read the current master ref
    pub async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }

        let response = self.http.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        let info: ApiInfo = response.json().await?;

        info.master_ref()
            .map(str::to_string)
            .ok_or(CmsError::NoMasterRef)
    }

    /// Build the search URL for a query under `reference`
    pub fn search_url(
        &self,
        reference: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("documents").push("search");
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            if !predicates.is_empty() {
                pairs.append_pair("q", &predicates_to_query(predicates));
            }
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
            if !options.orderings.is_empty() {
                pairs.append_pair("orderings", &orderings_to_query(&options.orderings));
            }
            if let Some(after) = &options.after {
                pairs.append_pair("after", after);
            }
            if let Some(page) = options.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(size) = options.page_size {
                pairs.append_pair("pageSize", &size.to_string());
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }

        url
    }

    async fn get_json(&self, url: Url) -> Result<QueryResponse, CmsError> {
        let response = self.http.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CmsError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CmsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentApi for PrismicApi {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<QueryResponse, CmsError> {
        let reference = match &options.reference {
            Some(reference) => reference.clone(),
            None => self.master_ref().await?,
        };
        let url = self.search_url(&reference, predicates, options);
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError> {
        let url = Url::parse(cursor).map_err(|e| CmsError::invalid_cursor(cursor, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CmsError::invalid_cursor(cursor, "not an http(s) URL"));
        }
        self.get_json(url).await
    }
}
