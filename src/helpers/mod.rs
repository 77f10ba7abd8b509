//! Helper functions for templates and page assembly
//!
//! URL generation (including the document link resolver), HTML escaping and
//! locale-aware date formatting.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
