//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateSummary, Generator};
use crate::Site;

/// Generate the static site from the configured CMS
pub async fn run(site: &Site) -> Result<GenerateSummary> {
    let start = std::time::Instant::now();

    let cms = site.cms()?;
    let generator = Generator::new(site, cms)?;
    let summary = generator.generate().await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} listing pages and {} posts in {:.2}s",
        summary.listing_pages,
        summary.post_pages,
        duration.as_secs_f64()
    );

    Ok(summary)
}
