//! Built-in spacetraveling templates using the Tera template engine
//!
//! Templates are embedded in the binary; the structs below are the data the
//! page renderer places in the template context.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/preview.html",
                include_str!("spacetraveling/partials/preview.html"),
            ),
            (
                "partials/comments.html",
                include_str!("spacetraveling/partials/comments.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub logo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub enabled: bool,
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

/// A post entry in the listing
#[derive(Debug, Clone, Serialize)]
pub struct ListItemData {
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
}

/// A post page, with every missing field replaced by its placeholder label
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub page_title: String,
    pub title: String,
    pub subtitle: String,
    pub banner_url: String,
    pub banner_alt: String,
    pub author: String,
    pub date: String,
    pub reading_time: String,
    pub edited: Option<String>,
    pub sections: Vec<SectionData>,
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Rendered rich text, inserted without escaping
    pub html: String,
}
