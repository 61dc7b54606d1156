//! List site content

use anyhow::Result;

use crate::generator::Generator;
use crate::pager::{query_first_page, PostListPager};
use crate::Site;

/// List CMS content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let cms = site.cms()?;
    let config = &site.config.cms;
    let dates = site.config.date_formatter()?;

    match content_type {
        "post" | "posts" => {
            let retry = config.retry_policy();
            let first = query_first_page(
                cms.as_ref(),
                &config.document_type,
                &config.lang,
                config.page_size,
                &retry,
            )
            .await?;
            let pager = PostListPager::with_first_page(cms.clone(), &config.lang, retry, first);
            pager.load_all().await?;

            let resolver = Generator::new(site, cms)?.resolver();
            let state = pager.snapshot().await;
            println!("Posts ({}):", state.posts.len());
            for post in &state.posts {
                let read_time = match resolver.resolve(&post.uid).await {
                    Ok(detail) => format!("{} min", detail.read_time()),
                    Err(e) => {
                        tracing::warn!("Could not resolve {}: {}", post.uid, e);
                        "? min".to_string()
                    }
                };
                println!(
                    "  {} - {} by {} ({}) [{}]",
                    dates.display(post.first_publication_date.as_ref()),
                    post.title,
                    post.author,
                    read_time,
                    post.uid
                );
            }
        }
        "id" | "ids" => {
            let resolver = Generator::new(site, cms)?.resolver();
            let uids = resolver.list_known_identifiers().await?;
            println!("Identifiers ({}):", uids.len());
            for uid in uids {
                println!("  {}", uid);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, id", content_type);
        }
    }

    Ok(())
}
