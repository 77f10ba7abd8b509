//! Post listing with cursor pagination

use serde::Serialize;

use crate::cms::{Client, CmsError, Ordering, Predicate, QueryOptions, QueryResponse};
use crate::cms::query::FIRST_PUBLICATION_DATE;
use crate::content::{PostSummary, SUMMARY_FIELDS};
use crate::helpers::POST_TYPE;

/// Posts loaded so far, newest first, and the cursor to the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostListing {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl PostListing {
    fn from_response(response: QueryResponse) -> Self {
        Self {
            results: response
                .results
                .iter()
                .map(PostSummary::from_document)
                .collect(),
            next_page: response.next_page,
        }
    }

    /// Whether more posts can be loaded
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Query the first listing page
pub async fn load_initial_page(client: &Client, page_size: u32) -> Result<PostListing, CmsError> {
    let options = QueryOptions::new()
        .fetch(SUMMARY_FIELDS)
        .orderings(vec![Ordering::desc(FIRST_PUBLICATION_DATE)])
        .page_size(page_size);

    let response = client
        .query(&[Predicate::document_type(POST_TYPE)], options)
        .await?;

    tracing::debug!(
        "Loaded {} of {} posts",
        response.results.len(),
        response.total_results_size
    );

    Ok(PostListing::from_response(response))
}

/// Follow the listing cursor and append the next page.
///
/// New posts go after the ones already loaded, in the order the CMS returned
/// them, and the cursor is replaced by the new page's cursor. Returns the
/// number of appended posts; without a cursor nothing is fetched.
///
/// The listing is borrowed mutably for the whole fetch, so calls on one
/// listing are serialized by the caller.
pub async fn load_more(client: &Client, listing: &mut PostListing) -> Result<usize, CmsError> {
    let Some(cursor) = listing.next_page.as_deref() else {
        return Ok(0);
    };

    let page = PostListing::from_response(client.fetch_page(cursor).await?);
    let appended = page.results.len();

    listing.results.extend(page.results);
    listing.next_page = page.next_page;

    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::tests::post;
    use crate::cms::FixtureApi;
    use std::sync::Arc;

    fn client() -> Client {
        Client::new(Arc::new(FixtureApi::from_documents(vec![
            post("A", "a", 1),
            post("B", "b", 2),
            post("C", "c", 3),
            post("D", "d", 4),
            post("E", "e", 5),
        ])))
    }

    fn uids(listing: &PostListing) -> Vec<&str> {
        listing
            .results
            .iter()
            .filter_map(|p| p.uid.as_deref())
            .collect()
    }

    #[tokio::test]
    async fn test_initial_page_newest_first() {
        let listing = load_initial_page(&client(), 2).await.unwrap();
        assert_eq!(uids(&listing), vec!["e", "d"]);
        assert!(listing.has_more());
    }

    #[tokio::test]
    async fn test_initial_page_fetches_summary_fields_only() {
        let listing = load_initial_page(&client(), 2).await.unwrap();
        let first = &listing.results[0];
        assert_eq!(first.data.title.as_deref(), Some("Post e"));
        assert_eq!(first.data.author.as_deref(), Some("Joseph Oliveira"));
    }

    #[tokio::test]
    async fn test_load_more_appends_until_exhausted() {
        let client = client();
        let mut listing = load_initial_page(&client, 2).await.unwrap();

        assert_eq!(load_more(&client, &mut listing).await.unwrap(), 2);
        assert_eq!(uids(&listing), vec!["e", "d", "c", "b"]);
        assert!(listing.has_more());

        assert_eq!(load_more(&client, &mut listing).await.unwrap(), 1);
        assert_eq!(uids(&listing), vec!["e", "d", "c", "b", "a"]);
        assert!(!listing.has_more());

        assert_eq!(load_more(&client, &mut listing).await.unwrap(), 0);
        assert_eq!(listing.results.len(), 5);
    }

    #[tokio::test]
    async fn test_load_more_never_reorders_existing() {
        let client = client();
        let mut listing = load_initial_page(&client, 3).await.unwrap();
        // A caller-held buffer in any order keeps that order
        listing.results.reverse();
        let before = listing.results.clone();

        load_more(&client, &mut listing).await.unwrap();

        assert_eq!(&listing.results[..3], &before[..]);
        assert_eq!(uids(&listing)[3..], ["b", "a"]);
    }

    #[tokio::test]
    async fn test_load_more_invalid_cursor_leaves_listing() {
        let client = client();
        let mut listing = PostListing {
            results: Vec::new(),
            next_page: Some("not a cursor".to_string()),
        };
        assert!(load_more(&client, &mut listing).await.is_err());
        assert_eq!(listing.next_page.as_deref(), Some("not a cursor"));
    }
}
