//! Offline backend serving documents from a JSON fixtures file
//!
//! The file mirrors what the repository would return:
//!
//! ```json
//! {
//!   "documents": [ { "id": "...", "uid": "...", "type": "posts", ... } ],
//!   "previews": { "<preview ref>": [ { "id": "...", ... } ] }
//! }
//! ```
//!
//! Queries without a ref (or with `master`) see `documents`. A preview ref
//! sees `documents` overlaid with that ref's drafts. Any other ref sees
//! nothing, which is how an expired preview token behaves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use url::Url;

use super::client::ContentApi;
use super::document::{Document, QueryResponse};
use super::error::CmsError;
use super::query::{
    Ordering, Predicate, QueryOptions, DOCUMENT_ID, DOCUMENT_TYPE, FIRST_PUBLICATION_DATE,
    LAST_PUBLICATION_DATE,
};

const MASTER_REF: &str = "master";
const CURSOR_SCHEME: &str = "fixtures";
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Contents of a fixtures file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub documents: Vec<Document>,
    pub previews: HashMap<String, Vec<Document>>,
}

/// Query request captured in a cursor URL
#[derive(Debug, Serialize, Deserialize)]
struct CursorRequest {
    predicates: Vec<Predicate>,
    options: QueryOptions,
}

/// In-process content backend
pub struct FixtureApi {
    fixtures: Fixtures,
}

impl FixtureApi {
    pub fn new(fixtures: Fixtures) -> Self {
        Self { fixtures }
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self::new(Fixtures {
            documents,
            previews: HashMap::new(),
        })
    }

    /// Load a fixtures file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CmsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CmsError::Fixtures(format!("{}: {}", path.display(), e)))?;
        let fixtures: Fixtures = serde_json::from_str(&content)
            .map_err(|e| CmsError::Fixtures(format!("{}: {}", path.display(), e)))?;
        tracing::info!(
            "Loaded {} documents and {} preview refs from {:?}",
            fixtures.documents.len(),
            fixtures.previews.len(),
            path
        );
        Ok(Self::new(fixtures))
    }

    /// Documents visible under a ref
    fn visible(&self, reference: Option<&str>) -> Vec<Document> {
        match reference {
            None | Some(MASTER_REF) => self.fixtures.documents.clone(),
            Some(reference) => match self.fixtures.previews.get(reference) {
                // Drafts come first so unordered lookups surface them
                Some(drafts) => {
                    let mut docs = drafts.clone();
                    docs.extend(
                        self.fixtures
                            .documents
                            .iter()
                            .filter(|d| !drafts.iter().any(|draft| draft.id == d.id))
                            .cloned(),
                    );
                    docs
                }
                None => Vec::new(),
            },
        }
    }

    fn run(&self, predicates: &[Predicate], options: &QueryOptions) -> QueryResponse {
        let mut docs: Vec<Document> = self
            .visible(options.reference.as_deref())
            .into_iter()
            .filter(|doc| predicates.iter().all(|p| matches(doc, p)))
            .collect();

        docs.sort_by(|a, b| compare(a, b, &options.orderings));

        if let Some(after) = &options.after {
            if let Some(pos) = docs.iter().position(|d| &d.id == after) {
                docs.drain(..=pos);
            }
        }

        if !options.fetch.is_empty() {
            for doc in &mut docs {
                restrict_fields(doc, &options.fetch);
            }
        }

        let page_size = options.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page = options.page.unwrap_or(1).max(1);
        let total = docs.len() as u32;
        let total_pages = total.div_ceil(page_size);

        let start = ((page - 1) * page_size) as usize;
        let results: Vec<Document> = docs
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        let cursor = |target: u32| {
            let mut next = options.clone();
            next.page = Some(target);
            cursor_url(predicates, next)
        };

        QueryResponse {
            page,
            results_per_page: page_size,
            results_size: results.len() as u32,
            total_results_size: total,
            total_pages,
            next_page: (page < total_pages).then(|| cursor(page + 1)),
            prev_page: (page > 1).then(|| cursor(page - 1)),
            results,
        }
    }
}

#[async_trait]
impl ContentApi for FixtureApi {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<QueryResponse, CmsError> {
        Ok(self.run(predicates, options))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError> {
        let url = Url::parse(cursor).map_err(|e| CmsError::invalid_cursor(cursor, e))?;
        if url.scheme() != CURSOR_SCHEME {
            return Err(CmsError::invalid_cursor(cursor, "not a fixtures cursor"));
        }
        let request = url
            .query_pairs()
            .find(|(k, _)| k == "request")
            .map(|(_, v)| v.into_owned())
            .ok_or_else(|| CmsError::invalid_cursor(cursor, "missing request"))?;
        let request: CursorRequest =
            serde_json::from_str(&request).map_err(|e| CmsError::invalid_cursor(cursor, e))?;
        Ok(self.run(&request.predicates, &request.options))
    }
}

fn cursor_url(predicates: &[Predicate], options: QueryOptions) -> String {
    let request = CursorRequest {
        predicates: predicates.to_vec(),
        options,
    };
    let mut url = Url::parse("fixtures:///search").expect("static cursor base is a valid URL");
    url.query_pairs_mut().append_pair(
        "request",
        &serde_json::to_string(&request).unwrap_or_default(),
    );
    url.to_string()
}

fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At { path, value } => match path.as_str() {
            DOCUMENT_TYPE => &doc.doc_type == value,
            DOCUMENT_ID => &doc.id == value,
            _ => match custom_field(path) {
                Some((doc_type, "uid")) => {
                    doc.doc_type == doc_type && doc.uid.as_deref() == Some(value.as_str())
                }
                Some((doc_type, field)) => {
                    doc.doc_type == doc_type
                        && doc.field(field).and_then(|v| v.as_str()) == Some(value.as_str())
                }
                None => false,
            },
        },
    }
}

/// Split `my.<type>.<field>`
fn custom_field(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix("my.")?;
    rest.split_once('.')
}

fn compare(a: &Document, b: &Document, orderings: &[Ordering]) -> CmpOrdering {
    for ordering in orderings {
        let ord = match ordering.field.as_str() {
            FIRST_PUBLICATION_DATE => a.first_publication_date.cmp(&b.first_publication_date),
            LAST_PUBLICATION_DATE => a.last_publication_date.cmp(&b.last_publication_date),
            DOCUMENT_ID => a.id.cmp(&b.id),
            path => match custom_field(path) {
                Some((_, "uid")) => a.uid.cmp(&b.uid),
                Some((_, field)) => {
                    let key = |d: &Document| d.field(field).map(|v| v.to_string());
                    key(a).cmp(&key(b))
                }
                None => CmpOrdering::Equal,
            },
        };
        let ord = if ordering.descending { ord.reverse() } else { ord };
        if ord != CmpOrdering::Equal {
            return ord;
        }
    }
    CmpOrdering::Equal
}

fn restrict_fields(doc: &mut Document, fetch: &[String]) {
    if let serde_json::Value::Object(map) = &mut doc.data {
        let prefix = format!("{}.", doc.doc_type);
        map.retain(|key, _| {
            fetch
                .iter()
                .any(|f| f.strip_prefix(&prefix) == Some(key.as_str()))
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    /// A published post dated `2021-03-<day>`
    pub(crate) fn post(id: &str, uid: &str, day: u32) -> Document {
        let date = Utc.with_ymd_and_hms(2021, 3, day, 12, 0, 0).unwrap();
        Document {
            id: id.to_string(),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            tags: Vec::new(),
            first_publication_date: Some(date),
            last_publication_date: Some(date),
            lang: Some("pt-br".to_string()),
            data: json!({
                "title": format!("Post {}", uid),
                "subtitle": format!("Subtitle {}", uid),
                "author": "Joseph Oliveira",
                "banner": { "url": format!("https://images.prismic.io/{}.png", uid) },
                "content": [
                    {
                        "heading": "Hello World",
                        "body": [ { "type": "paragraph", "text": "foo bar baz", "spans": [] } ]
                    }
                ]
            }),
        }
    }

    fn ids(response: &QueryResponse) -> Vec<&str> {
        response.results.iter().map(|d| d.id.as_str()).collect()
    }

    fn api() -> FixtureApi {
        let mut page = post("P", "about", 1);
        page.doc_type = "page".to_string();
        FixtureApi::from_documents(vec![post("B", "b", 2), post("A", "a", 1), post("C", "c", 3), page])
    }

    #[tokio::test]
    async fn test_filter_and_order() {
        let api = api();
        let options = QueryOptions::new().orderings(vec![Ordering::desc(FIRST_PUBLICATION_DATE)]);
        let response = api
            .query(&[Predicate::document_type("posts")], &options)
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["C", "B", "A"]);
        assert_eq!(response.total_results_size, 3);
        assert!(response.next_page.is_none());
    }

    #[tokio::test]
    async fn test_after_skips_through_document() {
        let api = api();
        let options = QueryOptions::new()
            .orderings(vec![Ordering::asc(FIRST_PUBLICATION_DATE)])
            .after("A");
        let response = api
            .query(&[Predicate::document_type("posts")], &options)
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_uid_lookup() {
        let api = api();
        let response = api
            .query(
                &[Predicate::document_type("posts"), Predicate::uid("posts", "b")],
                &QueryOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["B"]);
    }

    #[tokio::test]
    async fn test_fetch_restricts_data() {
        let api = api();
        let options = QueryOptions::new().fetch(["posts.title"]);
        let response = api
            .query(&[Predicate::document_id("A")], &options)
            .await
            .unwrap();
        let data = response.results[0].data.as_object().unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("title"));
    }

    #[tokio::test]
    async fn test_cursor_pagination() {
        let api = api();
        let options = QueryOptions::new()
            .orderings(vec![Ordering::desc(FIRST_PUBLICATION_DATE)])
            .page_size(2);
        let first = api
            .query(&[Predicate::document_type("posts")], &options)
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["C", "B"]);
        assert_eq!(first.total_pages, 2);

        let cursor = first.next_page.clone().unwrap();
        let second = api.fetch_page(&cursor).await.unwrap();
        assert_eq!(ids(&second), vec!["A"]);
        assert_eq!(second.page, 2);
        assert!(second.next_page.is_none());
        assert!(second.prev_page.is_some());
    }

    #[tokio::test]
    async fn test_rejects_foreign_cursor() {
        let err = api().fetch_page("https://example.com/page/2").await.unwrap_err();
        assert!(matches!(err, CmsError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn test_preview_overlay_and_unknown_ref() {
        let mut draft = post("B", "b-draft", 2);
        draft.first_publication_date = None;
        let mut previews = HashMap::new();
        previews.insert("preview-ref".to_string(), vec![draft]);
        let api = FixtureApi::new(Fixtures {
            documents: vec![post("A", "a", 1), post("B", "b", 2)],
            previews,
        });

        let response = api
            .query(
                &[Predicate::document_id("B")],
                &QueryOptions::new().reference("preview-ref"),
            )
            .await
            .unwrap();
        assert_eq!(response.results[0].uid.as_deref(), Some("b-draft"));

        let response = api
            .query(
                &[Predicate::document_id("B")],
                &QueryOptions::new().reference("expired"),
            )
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }
}
