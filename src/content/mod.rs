//! Content module - post projections, rich text and reading time

mod post;
pub mod reading_time;
pub mod richtext;

pub use post::{
    edited_date, text_field, Banner, ContentGroup, DetailData, PostDetail, PostSummary, SummaryData,
    SUMMARY_FIELDS,
};
pub use reading_time::reading_time;
pub use richtext::{as_html, as_text, RichTextBlock};
