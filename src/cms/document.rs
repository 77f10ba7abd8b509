//! Raw documents and query responses as returned by the CMS

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document snapshot owned by the CMS
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Repository-wide identifier, also used as the `after` cursor
    pub id: String,

    /// Human-readable identifier, unique per type
    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type tag (e.g. `posts`)
    #[serde(rename = "type")]
    pub doc_type: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Absent on documents that were never published (preview drafts)
    #[serde(default, with = "publication_date")]
    pub first_publication_date: Option<DateTime<Utc>>,

    #[serde(default, with = "publication_date")]
    pub last_publication_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub lang: Option<String>,

    /// Type-specific fields
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// Look up a field in the document data
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }
}

/// One page of a search query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryResponse {
    pub page: u32,
    pub results_per_page: u32,
    pub results_size: u32,
    pub total_results_size: u32,
    pub total_pages: u32,
    /// Cursor URL for the following page, absent on the last page
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

/// Repository metadata returned by the API root
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<RefInfo>,
}

/// A content release reference
#[derive(Debug, Clone, Deserialize)]
pub struct RefInfo {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    /// The ref pointing at published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// Prismic timestamps use a `+0000` offset without a colon, which RFC 3339 rejects
mod publication_date {
    use chrono::{DateTime, FixedOffset, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::<FixedOffset>::parse_from_str(s, FORMAT))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        let date = match raw {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => {
                let date = parse(&s);
                if date.is_none() {
                    tracing::warn!("Ignoring unparseable publication date {:?}", s);
                }
                date
            }
            Some(other) => {
                tracing::warn!("Ignoring non-string publication date {}", other);
                None
            }
        };
        Ok(date)
    }
}

pub use publication_date::parse as parse_publication_date;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_prismic_document() {
        let json = r#"{
            "id": "YFzjKRAAACMAPmPa",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-25T19:25:28+0000",
            "data": { "title": "Como utilizar Hooks" }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.doc_type, "posts");
        assert_eq!(
            doc.first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        assert_eq!(doc.field("title").and_then(|v| v.as_str()), Some("Como utilizar Hooks"));
    }

    #[test]
    fn test_draft_without_dates() {
        let json = r#"{"id": "X", "type": "posts", "first_publication_date": null}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.first_publication_date.is_none());
        assert!(doc.last_publication_date.is_none());
        assert!(doc.uid.is_none());
    }

    #[test]
    fn test_rfc3339_dates_accepted() {
        assert_eq!(
            parse_publication_date("2021-03-15T19:25:28Z"),
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        assert!(parse_publication_date("yesterday").is_none());
    }

    #[test]
    fn test_malformed_dates_do_not_drop_the_page() {
        let json = r#"{
            "page": 1,
            "results_per_page": 20,
            "results_size": 2,
            "total_results_size": 2,
            "total_pages": 1,
            "next_page": null,
            "results": [
                {"id": "A", "type": "posts", "first_publication_date": "2021-03-15T19:25:28+0000"},
                {"id": "B", "type": "posts", "first_publication_date": "15/03/2021",
                 "last_publication_date": 1615836328}
            ]
        }"#;
        let page: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(
            page.results[0].first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        assert!(page.results[1].first_publication_date.is_none());
        assert!(page.results[1].last_publication_date.is_none());
    }

    #[test]
    fn test_master_ref() {
        let json = r#"{"refs": [
            {"id": "release", "ref": "R1", "label": "Release", "isMasterRef": false},
            {"id": "master", "ref": "M1", "label": "Master", "isMasterRef": true}
        ]}"#;
        let info: ApiInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.master_ref(), Some("M1"));
    }
}
