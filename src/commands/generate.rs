//! Generate the static site

use anyhow::Result;
use std::time::Instant;

use crate::generator::{GenerateStats, Generator};
use crate::Blog;

/// Render every published post and the home page into the public directory
pub async fn run(blog: &Blog) -> Result<GenerateStats> {
    let start = Instant::now();

    let client = blog.client()?;
    let generator = Generator::new(blog)?;
    let stats = generator.generate(&client).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts and {} assets in {:.2}s",
        stats.posts,
        stats.assets,
        duration.as_secs_f64()
    );

    Ok(stats)
}
