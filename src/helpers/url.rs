//! URL helper functions

use crate::cms::Document;
use crate::config::SiteConfig;

/// Custom type holding blog posts
pub const POST_TYPE: &str = "posts";

/// Map a document to its site path
///
/// # Examples
/// ```ignore
/// link_resolver(&post) // -> "/post/como-utilizar-hooks"
/// ```
pub fn link_resolver(doc: &Document) -> String {
    resolve_link(&doc.doc_type, doc.uid.as_deref())
}

/// Map a document type and uid to a site path; anything that is not a post
/// (or a post without uid) lands on the home page
pub fn resolve_link(doc_type: &str, uid: Option<&str>) -> String {
    match (doc_type, uid) {
        (POST_TYPE, Some(uid)) if !uid.is_empty() => post_path(uid),
        _ => "/".to_string(),
    }
}

/// Path of a post page
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", encode_url(uid))
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello") // -> "https://example.com/post/hello"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Encode a URL path segment
pub fn encode_url(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

const PATH_SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
