//! Post view models projected from CMS documents

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::richtext::{as_text, RichTextBlock};
use crate::cms::Document;

/// Fields requested for listing queries
pub const SUMMARY_FIELDS: [&str; 3] = ["posts.title", "posts.subtitle", "posts.author"];

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub uid: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub data: SummaryData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryData {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub uid: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    /// Present only when the post was edited after its first publication
    pub last_publication_date: Option<DateTime<Utc>>,
    pub data: DetailData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailData {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub banner: Option<Banner>,
    pub author: Option<String>,
    pub content: Option<Vec<ContentGroup>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub url: String,
}

/// A section of a post body: a heading followed by rich text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentGroup {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

impl PostSummary {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            uid: doc.uid.clone(),
            first_publication_date: doc.first_publication_date,
            data: SummaryData {
                title: text_field(doc, "title"),
                subtitle: text_field(doc, "subtitle"),
                author: text_field(doc, "author"),
            },
        }
    }
}

impl PostDetail {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            uid: doc.uid.clone(),
            first_publication_date: doc.first_publication_date,
            last_publication_date: edited_date(
                doc.first_publication_date,
                doc.last_publication_date,
            ),
            data: DetailData {
                title: text_field(doc, "title"),
                subtitle: text_field(doc, "subtitle"),
                banner: banner(doc),
                author: text_field(doc, "author"),
                content: content(doc),
            },
        }
    }

    /// Whether the post was edited after being published
    pub fn is_edited(&self) -> bool {
        self.last_publication_date.is_some()
    }
}

/// The edit date, or `None` when it matches the first publication
pub fn edited_date(
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (first, last) {
        (Some(first), Some(last)) if first == last => None,
        (_, last) => last,
    }
}

/// A text field stored either as a plain string or as rich text
pub fn text_field(doc: &Document, name: &str) -> Option<String> {
    let text = match doc.field(name)? {
        Value::String(s) => s.clone(),
        value @ Value::Array(_) => as_text(&rich_text(value)),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn banner(doc: &Document) -> Option<Banner> {
    doc.field("banner")?
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(|url| Banner {
            url: url.to_string(),
        })
}

fn content(doc: &Document) -> Option<Vec<ContentGroup>> {
    let groups = doc.field("content")?.as_array()?;
    Some(
        groups
            .iter()
            .map(|group| ContentGroup {
                heading: match group.get("heading") {
                    Some(Value::String(s)) => s.clone(),
                    Some(value @ Value::Array(_)) => as_text(&rich_text(value)),
                    _ => String::new(),
                },
                body: group.get("body").map(rich_text).unwrap_or_default(),
            })
            .collect(),
    )
}

/// Parse rich text blocks, skipping malformed ones
fn rich_text(value: &Value) -> Vec<RichTextBlock> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::warn!("Skipping malformed rich text block: {}", e);
                None
            }
        })
        .collect()
}
