//! Structured rich text
//!
//! The CMS stores formatted content as a list of blocks, each tagged with its
//! kind, whose inline formatting is a list of character ranges ("spans").
//! Blocks render to plain text (for reading time and meta descriptions) or to
//! escaped HTML fragments.

use serde::{Deserialize, Serialize};

use crate::helpers::{html_escape, image_tag, link_to, resolve_link};

/// A rich text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RichTextBlock {
    #[serde(rename = "heading1")]
    Heading1(TextBlock),
    #[serde(rename = "heading2")]
    Heading2(TextBlock),
    #[serde(rename = "heading3")]
    Heading3(TextBlock),
    #[serde(rename = "heading4")]
    Heading4(TextBlock),
    #[serde(rename = "heading5")]
    Heading5(TextBlock),
    #[serde(rename = "heading6")]
    Heading6(TextBlock),
    #[serde(rename = "paragraph")]
    Paragraph(TextBlock),
    #[serde(rename = "preformatted")]
    Preformatted(TextBlock),
    #[serde(rename = "list-item")]
    ListItem(TextBlock),
    #[serde(rename = "o-list-item")]
    OrderedListItem(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "embed")]
    Embed(EmbedBlock),
    /// Block kinds this renderer does not know; rendered as nothing
    #[serde(other)]
    Unsupported,
}

/// Text with inline formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }
}

/// Inline formatting over the character range `start..end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink { data: LinkData },
    Label { data: LabelData },
    #[serde(other)]
    Unsupported,
}

/// Link target of a hyperlink span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkData {
    pub link_type: Option<String>,
    pub url: Option<String>,
    pub target: Option<String>,
    /// Type and uid of a linked document
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub uid: Option<String>,
}

impl LinkData {
    /// Web links keep their URL; document links go through the link resolver
    pub fn href(&self) -> String {
        match (&self.url, &self.doc_type) {
            (Some(url), _) => url.clone(),
            (None, Some(doc_type)) => resolve_link(doc_type, self.uid.as_deref()),
            (None, None) => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelData {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    pub url: String,
    pub alt: Option<String>,
    pub copyright: Option<String>,
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedBlock {
    pub oembed: OEmbed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OEmbed {
    #[serde(rename = "type")]
    pub embed_type: Option<String>,
    pub embed_url: Option<String>,
    pub provider_name: Option<String>,
    pub html: Option<String>,
}

impl RichTextBlock {
    /// Text content, if the block carries any
    pub fn text(&self) -> Option<&str> {
        match self {
            RichTextBlock::Heading1(b)
            | RichTextBlock::Heading2(b)
            | RichTextBlock::Heading3(b)
            | RichTextBlock::Heading4(b)
            | RichTextBlock::Heading5(b)
            | RichTextBlock::Heading6(b)
            | RichTextBlock::Paragraph(b)
            | RichTextBlock::Preformatted(b)
            | RichTextBlock::ListItem(b)
            | RichTextBlock::OrderedListItem(b) => Some(&b.text),
            RichTextBlock::Image(_) | RichTextBlock::Embed(_) | RichTextBlock::Unsupported => None,
        }
    }

    /// Render a single block; list items render as bare `<li>`
    pub fn to_html(&self) -> String {
        match self {
            RichTextBlock::Heading1(b) => wrap("h1", &text_html(b)),
            RichTextBlock::Heading2(b) => wrap("h2", &text_html(b)),
            RichTextBlock::Heading3(b) => wrap("h3", &text_html(b)),
            RichTextBlock::Heading4(b) => wrap("h4", &text_html(b)),
            RichTextBlock::Heading5(b) => wrap("h5", &text_html(b)),
            RichTextBlock::Heading6(b) => wrap("h6", &text_html(b)),
            RichTextBlock::Paragraph(b) => wrap("p", &text_html(b)),
            RichTextBlock::Preformatted(b) => wrap("pre", &render_spans(b)),
            RichTextBlock::ListItem(b) | RichTextBlock::OrderedListItem(b) => {
                wrap("li", &text_html(b))
            }
            RichTextBlock::Image(image) => image_html(image),
            RichTextBlock::Embed(embed) => embed_html(embed),
            RichTextBlock::Unsupported => String::new(),
        }
    }

    fn list_tag(&self) -> Option<&'static str> {
        match self {
            RichTextBlock::ListItem(_) => Some("ul"),
            RichTextBlock::OrderedListItem(_) => Some("ol"),
            _ => None,
        }
    }
}

/// Plain text of a block list, blocks joined with a space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .filter_map(RichTextBlock::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML of a block list; consecutive list items are grouped in `<ul>`/`<ol>`
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = block.list_tag();
        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }
        html.push_str(&block.to_html());
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn wrap(tag: &str, inner: &str) -> String {
    format!("<{tag}>{inner}</{tag}>")
}

fn text_html(block: &TextBlock) -> String {
    render_spans(block).replace('\n', "<br />")
}

fn image_html(image: &ImageBlock) -> String {
    if image.url.is_empty() {
        return String::new();
    }
    format!(
        r#"<p class="block-img">{}</p>"#,
        image_tag(&image.url, image.alt.as_deref())
    )
}

fn embed_html(embed: &EmbedBlock) -> String {
    let oembed = &embed.oembed;
    let Some(html) = &oembed.html else {
        return String::new();
    };
    let mut attrs = String::new();
    if let Some(url) = &oembed.embed_url {
        attrs.push_str(&format!(r#" data-oembed="{}""#, html_escape(url)));
    }
    if let Some(kind) = &oembed.embed_type {
        attrs.push_str(&format!(r#" data-oembed-type="{}""#, html_escape(kind)));
    }
    if let Some(provider) = &oembed.provider_name {
        attrs.push_str(&format!(
            r#" data-oembed-provider="{}""#,
            html_escape(&provider.to_lowercase())
        ));
    }
    format!("<div{}>{}</div>", attrs, html)
}

/// Escape the block text and apply its spans as nested elements.
///
/// Span offsets count characters. Ranges are clamped to the text, spans are
/// nested by start (outermost first) and a span overlapping the end of its
/// parent is cut at the parent's end.
fn render_spans(block: &TextBlock) -> String {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let mut spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end.min(len))
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    render_range(&chars, 0, len, &spans)
}

fn render_range(chars: &[char], start: usize, end: usize, spans: &[&Span]) -> String {
    let mut out = String::new();
    let mut pos = start;
    let mut i = 0;

    while i < spans.len() {
        let span = spans[i];
        let span_start = span.start.max(pos);
        let span_end = span.end.min(end);
        if span_start >= span_end {
            i += 1;
            continue;
        }

        // Spans starting inside this one are its children
        let mut j = i + 1;
        while j < spans.len() && spans[j].start < span_end {
            j += 1;
        }

        out.push_str(&escape_chars(&chars[pos..span_start]));
        let inner = render_range(chars, span_start, span_end, &spans[i + 1..j]);
        out.push_str(&apply_span(&span.kind, &inner));

        pos = span_end;
        i = j;
    }

    out.push_str(&escape_chars(&chars[pos..end]));
    out
}

fn apply_span(kind: &SpanKind, inner: &str) -> String {
    match kind {
        SpanKind::Strong => wrap("strong", inner),
        SpanKind::Em => wrap("em", inner),
        SpanKind::Hyperlink { data } => link_to(&data.href(), inner, data.target.as_deref()),
        SpanKind::Label { data } => {
            format!(r#"<span class="{}">{}</span>"#, html_escape(&data.label), inner)
        }
        SpanKind::Unsupported => inner.to_string(),
    }
}

fn escape_chars(chars: &[char]) -> String {
    html_escape(&chars.iter().collect::<String>())
}
