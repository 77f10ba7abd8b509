//! HTML helper functions

/// Escape text for use in HTML content and attribute values
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("https://images.prismic.io/banner.png", Some("Banner"))
/// ```
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}

/// Generate an anchor tag; absolute URLs open in a new tab
pub fn link_to(href: &str, inner_html: &str, target: Option<&str>) -> String {
    let external = href.starts_with("http://") || href.starts_with("https://");
    match target {
        Some(target) => format!(
            r#"<a href="{}" target="{}" rel="noopener">{}</a>"#,
            html_escape(href),
            html_escape(target),
            inner_html
        ),
        None if external => format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            inner_html
        ),
        None => format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner_html),
    }
}
