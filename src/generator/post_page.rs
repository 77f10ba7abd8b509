//! Single post resolution: lookup, adjacent posts and reading time

use serde::Serialize;

use crate::cms::query::{DOCUMENT_ID, FIRST_PUBLICATION_DATE};
use crate::cms::{Client, CmsError, Document, Ordering, Predicate, QueryOptions};
use crate::content::{reading_time, text_field, PostDetail};
use crate::helpers::{link_resolver, POST_TYPE};

/// A page-level redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub destination: String,
    pub permanent: bool,
}

impl Redirect {
    /// Temporary redirect to the home page, so that publishing the missing
    /// post later is not hidden behind a cached redirect
    pub fn home() -> Self {
        Self {
            destination: "/".to_string(),
            permanent: false,
        }
    }
}

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacentPostLink {
    pub title: String,
    pub href: String,
}

impl AdjacentPostLink {
    fn from_document(doc: &Document) -> Self {
        Self {
            title: text_field(doc, "title").unwrap_or_default(),
            href: link_resolver(doc),
        }
    }
}

/// Previous (older) and next (newer) posts; at least one is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPagination {
    pub prev_page: Option<AdjacentPostLink>,
    pub next_page: Option<AdjacentPostLink>,
}

/// Everything a post page displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPage {
    pub post: PostDetail,
    pub pagination: Option<PostPagination>,
    /// Minutes, absent when the post has no content
    pub reading_time: Option<u32>,
    pub preview: bool,
}

/// Outcome of a post lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PostResolution {
    Found(Box<PostPage>),
    Redirect(Redirect),
}

/// Resolve the post for `slug`.
///
/// A client scoped to a preview looks the slug up under the preview ref and,
/// when nothing matches, falls back to the single post visible under that
/// ref, since a draft's uid may not match the slug yet.
pub async fn resolve_post(client: &Client, slug: &str) -> Result<PostResolution, CmsError> {
    let mut document = client.get_by_uid(POST_TYPE, slug).await?;
    if document.is_none() {
        if let Some(preview) = client.preview() {
            document = client.get_single(POST_TYPE, &preview.reference).await?;
        }
    }

    let Some(document) = document else {
        tracing::debug!("Post {:?} not found, redirecting home", slug);
        return Ok(PostResolution::Redirect(Redirect::home()));
    };

    let post = PostDetail::from_document(&document);
    let pagination = adjacent_posts(client, &document.id).await?;
    let reading_time = reading_time(post.data.content.as_deref());

    Ok(PostResolution::Found(Box::new(PostPage {
        post,
        pagination,
        reading_time,
        preview: client.preview().is_some(),
    })))
}

/// Find the posts published right before and right after `document_id`.
///
/// Both queries continue after the document in publication order; the
/// document id is a secondary sort key so posts sharing a timestamp still
/// have a stable neighbour.
pub async fn adjacent_posts(
    client: &Client,
    document_id: &str,
) -> Result<Option<PostPagination>, CmsError> {
    let prev_page = first_after(client, document_id, true).await?;
    let next_page = first_after(client, document_id, false).await?;

    if prev_page.is_none() && next_page.is_none() {
        return Ok(None);
    }

    Ok(Some(PostPagination {
        prev_page,
        next_page,
    }))
}

async fn first_after(
    client: &Client,
    document_id: &str,
    descending: bool,
) -> Result<Option<AdjacentPostLink>, CmsError> {
    let orderings = if descending {
        vec![
            Ordering::desc(FIRST_PUBLICATION_DATE),
            Ordering::desc(DOCUMENT_ID),
        ]
    } else {
        vec![
            Ordering::asc(FIRST_PUBLICATION_DATE),
            Ordering::asc(DOCUMENT_ID),
        ]
    };

    let options = QueryOptions::new()
        .fetch(["posts.title"])
        .orderings(orderings)
        .after(document_id)
        .page_size(1);

    let response = client
        .query(&[Predicate::document_type(POST_TYPE)], options)
        .await?;

    Ok(response.results.first().map(AdjacentPostLink::from_document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::tests::post;
    use crate::cms::fixtures::Fixtures;
    use crate::cms::{FixtureApi, PreviewContext};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn client(documents: Vec<Document>) -> Client {
        Client::new(Arc::new(FixtureApi::from_documents(documents)))
    }

    fn abc() -> Client {
        client(vec![post("B", "b", 2), post("C", "c", 3), post("A", "a", 1)])
    }

    fn found(resolution: PostResolution) -> PostPage {
        match resolution {
            PostResolution::Found(page) => *page,
            PostResolution::Redirect(r) => panic!("unexpected redirect to {}", r.destination),
        }
    }

    fn link(title: &str, href: &str) -> Option<AdjacentPostLink> {
        Some(AdjacentPostLink {
            title: title.to_string(),
            href: href.to_string(),
        })
    }

    #[tokio::test]
    async fn test_middle_post_has_both_neighbours() {
        let pagination = adjacent_posts(&abc(), "B").await.unwrap().unwrap();
        assert_eq!(pagination.prev_page, link("Post a", "/post/a"));
        assert_eq!(pagination.next_page, link("Post c", "/post/c"));
    }

    #[tokio::test]
    async fn test_newest_post_has_only_previous() {
        let pagination = adjacent_posts(&abc(), "C").await.unwrap().unwrap();
        assert_eq!(pagination.prev_page, link("Post b", "/post/b"));
        assert_eq!(pagination.next_page, None);
    }

    #[tokio::test]
    async fn test_oldest_post_has_only_next() {
        let pagination = adjacent_posts(&abc(), "A").await.unwrap().unwrap();
        assert_eq!(pagination.prev_page, None);
        assert_eq!(pagination.next_page, link("Post b", "/post/b"));
    }

    #[tokio::test]
    async fn test_single_post_has_no_pagination() {
        let client = client(vec![post("A", "a", 1)]);
        assert_eq!(adjacent_posts(&client, "A").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_break_ties_by_id() {
        let client = client(vec![post("X", "x", 2), post("Y", "y", 2), post("Z", "z", 2)]);
        let pagination = adjacent_posts(&client, "Y").await.unwrap().unwrap();
        assert_eq!(pagination.prev_page, link("Post x", "/post/x"));
        assert_eq!(pagination.next_page, link("Post z", "/post/z"));
    }

    #[tokio::test]
    async fn test_resolve_post() {
        let page = found(resolve_post(&abc(), "b").await.unwrap());
        assert_eq!(page.post.uid.as_deref(), Some("b"));
        assert_eq!(page.reading_time, Some(1));
        assert!(page.pagination.is_some());
        assert!(!page.preview);
    }

    #[tokio::test]
    async fn test_unknown_slug_redirects_home() {
        let resolution = resolve_post(&abc(), "missing").await.unwrap();
        assert_eq!(
            resolution,
            PostResolution::Redirect(Redirect {
                destination: "/".to_string(),
                permanent: false,
            })
        );
    }

    #[tokio::test]
    async fn test_post_without_content_has_no_reading_time() {
        let mut doc = post("A", "a", 1);
        doc.data = serde_json::json!({ "title": "Empty" });
        let page = found(resolve_post(&client(vec![doc]), "a").await.unwrap());
        assert_eq!(page.reading_time, None);
        assert_eq!(page.pagination, None);
    }

    #[tokio::test]
    async fn test_preview_reads_draft_by_ref() {
        let mut draft = post("D", "draft-uid", 9);
        draft.first_publication_date = None;
        draft.last_publication_date = None;
        let mut previews = HashMap::new();
        previews.insert("preview-ref".to_string(), vec![draft]);
        let api = FixtureApi::new(Fixtures {
            documents: Vec::new(),
            previews,
        });
        let client = Client::new(Arc::new(api))
            .with_preview(Some(PreviewContext::new("preview-ref")));

        let page = found(resolve_post(&client, "some-other-slug").await.unwrap());
        assert_eq!(page.post.uid.as_deref(), Some("draft-uid"));
        assert!(page.preview);
    }

    #[tokio::test]
    async fn test_preview_keeps_slug_lookup_for_other_posts() {
        let mut draft = post("B", "b-draft", 2);
        draft.data["title"] = serde_json::json!("Draft title");
        let mut previews = HashMap::new();
        previews.insert("preview-ref".to_string(), vec![draft]);
        let api = FixtureApi::new(Fixtures {
            documents: vec![post("A", "a", 1), post("B", "b", 2)],
            previews,
        });
        let client = Client::new(Arc::new(api))
            .with_preview(Some(PreviewContext::new("preview-ref")));

        let page = found(resolve_post(&client, "a").await.unwrap());
        assert_eq!(page.post.uid.as_deref(), Some("a"));
        assert_eq!(page.post.data.title.as_deref(), Some("Post a"));

        let page = found(resolve_post(&client, "b-draft").await.unwrap());
        assert_eq!(page.post.data.title.as_deref(), Some("Draft title"));
    }

    #[tokio::test]
    async fn test_adjacent_link_with_rich_text_title() {
        let mut older = post("A", "a", 1);
        older.data["title"] = serde_json::json!([
            { "type": "heading1", "text": "Rich older post", "spans": [] }
        ]);
        let client = client(vec![older, post("B", "b", 2)]);
        let pagination = adjacent_posts(&client, "B").await.unwrap().unwrap();
        assert_eq!(pagination.prev_page, link("Rich older post", "/post/a"));
    }
}
