//! List posts

use anyhow::Result;
use std::io::Write;

use crate::cms::Client;
use crate::generator::{load_initial_page, load_more, PostListing};
use crate::helpers::DateFormatter;
use crate::Blog;

/// Print the post listing; with `all`, follow the cursor to the last page
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    let listing = collect(&client, blog.config.cms.page_size, all).await?;

    let dates = DateFormatter::new(&blog.config);
    let mut out = std::io::stdout().lock();
    write_listing(&mut out, &listing, &dates)?;

    Ok(())
}

async fn collect(client: &Client, page_size: u32, all: bool) -> Result<PostListing> {
    let mut listing = load_initial_page(client, page_size).await?;
    if all {
        while listing.has_more() {
            load_more(client, &mut listing).await?;
        }
    }
    Ok(listing)
}

fn write_listing<W: Write>(out: &mut W, listing: &PostListing, dates: &DateFormatter) -> Result<()> {
    writeln!(out, "Posts ({}):", listing.results.len())?;
    for post in &listing.results {
        writeln!(
            out,
            "  {} - {} [{}]",
            post.first_publication_date
                .map(|d| dates.date(&d))
                .unwrap_or_else(|| "-".to_string()),
            post.data.title.as_deref().unwrap_or("(untitled)"),
            post.uid.as_deref().unwrap_or("")
        )?;
    }
    if listing.has_more() {
        writeln!(out, "  ... more posts available (use --all)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::tests::post;
    use crate::cms::FixtureApi;
    use crate::config::SiteConfig;
    use std::sync::Arc;

    fn client() -> Client {
        Client::new(Arc::new(FixtureApi::from_documents(vec![
            post("A", "a", 1),
            post("B", "b", 2),
            post("C", "c", 3),
        ])))
    }

    fn render(listing: &PostListing) -> String {
        let mut config = SiteConfig::default();
        config.language = "en".to_string();
        config.timezone = "UTC".to_string();
        let mut out = Vec::new();
        write_listing(&mut out, listing, &DateFormatter::new(&config)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_first_page_only() {
        let output = render(&collect(&client(), 2, false).await.unwrap());
        assert!(output.starts_with("Posts (2):"));
        assert!(output.contains("03 Mar 2021 - Post c [c]"));
        assert!(output.contains("use --all"));
    }

    #[tokio::test]
    async fn test_all_pages() {
        let output = render(&collect(&client(), 2, true).await.unwrap());
        assert!(output.starts_with("Posts (3):"));
        assert!(output.contains("[a]"));
        assert!(!output.contains("use --all"));
    }
}
