//! Query predicates and options understood by the CMS search endpoint

use serde::{Deserialize, Serialize};

/// Field paths used by the blog
pub const DOCUMENT_TYPE: &str = "document.type";
pub const DOCUMENT_ID: &str = "document.id";
pub const FIRST_PUBLICATION_DATE: &str = "document.first_publication_date";
pub const LAST_PUBLICATION_DATE: &str = "document.last_publication_date";

/// A search predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match of a field path against a value
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn document_type(doc_type: &str) -> Self {
        Self::at(DOCUMENT_TYPE, doc_type)
    }

    pub fn document_id(id: &str) -> Self {
        Self::at(DOCUMENT_ID, id)
    }

    /// Match the uid of a custom type (`my.<type>.uid`)
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }

    /// Render in the API predicate syntax: `[at(document.type, "posts")]`
    pub fn to_query(&self) -> String {
        match self {
            Predicate::At { path, value } => {
                format!("[at({}, \"{}\")]", path, value.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

/// Render a predicate list as the `q` parameter
pub fn predicates_to_query(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(Predicate::to_query).collect();
    format!("[{}]", inner)
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Render orderings as the `orderings` parameter: `[a desc,b]`
pub fn orderings_to_query(orderings: &[Ordering]) -> String {
    let keys: Vec<String> = orderings
        .iter()
        .map(|o| {
            if o.descending {
                format!("{} desc", o.field)
            } else {
                o.field.clone()
            }
        })
        .collect();
    format!("[{}]", keys.join(","))
}

/// Options accepted by a search query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Restrict `data` to these `type.field` paths
    pub fetch: Vec<String>,
    pub orderings: Vec<Ordering>,
    /// Only return documents sorted after this document id
    pub after: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Content ref to query; the master ref when absent
    pub reference: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn orderings(mut self, orderings: Vec<Ordering>) -> Self {
        self.orderings = orderings;
        self
    }

    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_syntax() {
        let q = predicates_to_query(&[
            Predicate::document_type("posts"),
            Predicate::uid("posts", "hello"),
        ]);
        assert_eq!(
            q,
            r#"[[at(document.type, "posts")][at(my.posts.uid, "hello")]]"#
        );
    }

    #[test]
    fn test_predicate_escapes_quotes() {
        assert_eq!(
            Predicate::document_id(r#"a"b"#).to_query(),
            r#"[at(document.id, "a\"b")]"#
        );
    }

    #[test]
    fn test_predicate_escapes_backslashes() {
        assert_eq!(
            Predicate::uid("posts", r"slug\").to_query(),
            r#"[at(my.posts.uid, "slug\\")]"#
        );
        assert_eq!(
            Predicate::document_id(r#"a\"b"#).to_query(),
            r#"[at(document.id, "a\\\"b")]"#
        );
    }

    #[test]
    fn test_orderings_syntax() {
        let o = orderings_to_query(&[
            Ordering::desc(FIRST_PUBLICATION_DATE),
            Ordering::asc(DOCUMENT_ID),
        ]);
        assert_eq!(o, "[document.first_publication_date desc,document.id]");
    }
}
