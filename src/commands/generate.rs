//! Generate static files

use anyhow::Result;
use std::path::Path;

use super::Source;
use crate::generator::Generator;
use crate::Blog;

/// Fetch every post and write the site into the public directory
pub async fn run(blog: &Blog, offline: Option<&Path>) -> Result<()> {
    let start = std::time::Instant::now();

    let source = Source::open(blog, offline)?;
    let generator = Generator::new(blog)?;
    let count = generator.generate(&source).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts in {:.2}s",
        count,
        duration.as_secs_f64()
    );

    Ok(())
}
