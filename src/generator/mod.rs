//! Generator module - generates static HTML files using built-in Tera templates

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tera::Context;

use crate::cms::CmsClient;
use crate::content::{richtext, Post, PostDetail};
use crate::helpers::{date_xml, DateFormatter, Labels};
use crate::pager::{query_first_page, LoadOutcome, PostListPager};
use crate::resolver::PostPageResolver;
use crate::templates::{
    base_context, BlockData, PostPageData, PostSummaryData, SiteData, TemplateRenderer,
};
use crate::Site;

/// What a generation run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub listing_pages: usize,
    pub post_pages: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    cms: Arc<dyn CmsClient>,
    renderer: TemplateRenderer,
    dates: DateFormatter,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site, cms: Arc<dyn CmsClient>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let dates = site.config.date_formatter()?;

        Ok(Self {
            site: site.clone(),
            cms,
            renderer,
            dates,
        })
    }

    /// Resolver for post detail pages
    pub fn resolver(&self) -> PostPageResolver {
        let cms = &self.site.config.cms;
        PostPageResolver::new(
            self.cms.clone(),
            &cms.document_type,
            &cms.lang,
            cms.retry_policy(),
        )
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.site.public_dir)?;

        let listing_pages = self.generate_listing_pages().await?;
        let post_pages = self.generate_post_pages().await?;
        self.generate_not_found_page()?;

        Ok(GenerateSummary {
            listing_pages,
            post_pages,
        })
    }

    /// Generate `index.html` and one `page/<n>/index.html` per pager state.
    /// Page `n` shows everything loaded after `n - 1` load-more steps.
    async fn generate_listing_pages(&self) -> Result<usize> {
        let cms = &self.site.config.cms;
        let retry = cms.retry_policy();
        let first = query_first_page(
            self.cms.as_ref(),
            &cms.document_type,
            &cms.lang,
            cms.page_size,
            &retry,
        )
        .await?;

        let pager = PostListPager::with_first_page(self.cms.clone(), &cms.lang, retry, first);
        let mut visited = HashSet::new();
        let mut page_num = 1;

        loop {
            let state = pager.snapshot().await;
            let next_link = state
                .has_more()
                .then(|| format!("/page/{}/", page_num + 1));

            let html = self.render_listing(&state.posts, next_link.as_deref())?;
            let output_path = listing_path(&self.site.public_dir, page_num);
            write_file(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);

            let Some(cursor) = state.next_page else {
                break;
            };
            if !visited.insert(cursor.clone()) {
                tracing::warn!("CMS returned cursor {} twice, stopping pagination", cursor);
                break;
            }

            match pager.load_more().await? {
                LoadOutcome::Loaded { .. } => page_num += 1,
                LoadOutcome::Exhausted => break,
                LoadOutcome::InFlight => bail!("listing pager is already loading"),
            }
        }

        tracing::info!("Generated {} listing pages", page_num);
        Ok(page_num)
    }

    /// Generate one detail page per known post
    async fn generate_post_pages(&self) -> Result<usize> {
        let resolver = self.resolver();
        let uids = resolver.list_known_identifiers().await?;

        let mut count = 0;
        for uid in &uids {
            if !is_routable_uid(uid) {
                tracing::warn!("Skipping post with unroutable uid {:?}", uid);
                continue;
            }
            let detail = resolver.resolve(uid).await?;
            self.write_post_page(&detail)?;
            count += 1;
        }

        tracing::info!("Generated {} post pages", count);
        Ok(count)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.render_not_found()?;
        write_file(&self.site.public_dir.join("404.html"), &html)
    }

    /// Render and write `post/<uid>/index.html`, returning the HTML
    pub fn write_post_page(&self, detail: &PostDetail) -> Result<String> {
        let html = self.render_post(detail)?;
        let output_path = post_output_path(&self.site.public_dir, &detail.uid);
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);
        Ok(html)
    }

    fn labels(&self) -> Labels {
        self.dates.locale().labels()
    }

    fn context(&self) -> Context {
        let site = SiteData {
            title: self.site.config.title.clone(),
        };
        base_context(&site, &self.labels())
    }

    fn summary_data(&self, post: &Post) -> PostSummaryData {
        PostSummaryData {
            uid: post.uid.clone(),
            path: post_path(&post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: self.dates.display(post.first_publication_date.as_ref()),
            datetime: post.first_publication_date.as_ref().map(date_xml),
        }
    }

    /// Render a listing page
    pub fn render_listing(&self, posts: &[Post], next_link: Option<&str>) -> Result<String> {
        let posts: Vec<PostSummaryData> = posts
            .iter()
            .filter(|p| {
                let routable = is_routable_uid(&p.uid);
                if !routable {
                    tracing::warn!("Leaving post with unroutable uid {:?} off the listing", p.uid);
                }
                routable
            })
            .map(|p| self.summary_data(p))
            .collect();

        let mut context = self.context();
        context.insert("posts", &posts);
        context.insert("next_link", &next_link);
        self.renderer.render("index.html", &context)
    }

    /// Render a post detail page
    pub fn render_post(&self, detail: &PostDetail) -> Result<String> {
        let blocks = detail
            .content
            .iter()
            .map(|block| BlockData {
                heading: block.heading.clone(),
                html: richtext::as_html(&block.body),
            })
            .collect();

        let post = PostPageData {
            uid: detail.uid.clone(),
            title: detail.title.clone(),
            author: detail.author.clone(),
            banner_url: richtext::escape_html(&detail.banner_url),
            date: self.dates.display(detail.first_publication_date.as_ref()),
            datetime: detail.first_publication_date.as_ref().map(date_xml),
            read_time: detail.read_time(),
            blocks,
        };

        let mut context = self.context();
        context.insert("post", &post);
        self.renderer.render("post.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render("404.html", &self.context())
    }

    /// Render the page shown when the CMS could not be reached
    pub fn render_upstream_error(&self, retry_path: &str) -> Result<String> {
        let mut context = self.context();
        context.insert("retry_path", &richtext::escape_html(retry_path));
        self.renderer.render("upstream_error.html", &context)
    }
}

/// A uid is usable as a single path segment
pub fn is_routable_uid(uid: &str) -> bool {
    !uid.is_empty()
        && !uid.starts_with('.')
        && uid
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Site path of a post detail page
pub fn post_path(uid: &str) -> String {
    format!("/post/{}/", uid)
}

/// Output file of a post detail page
pub fn post_output_path(public_dir: &Path, uid: &str) -> PathBuf {
    public_dir.join("post").join(uid).join("index.html")
}

fn listing_path(public_dir: &Path, page_num: usize) -> PathBuf {
    if page_num == 1 {
        public_dir.join("index.html")
    } else {
        public_dir.join(format!("page/{}/index.html", page_num))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{Document, MemoryCms};
    use crate::config::SiteConfig;
    use serde_json::json;

    fn doc(uid: &str, words: usize) -> Document {
        let text = vec!["palavra"; words].join(" ");
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            last_publication_date: None,
            lang: Some("pt-br".to_string()),
            data: json!({
                "title": format!("Título {}", uid),
                "subtitle": "Subtítulo",
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/banner.png" },
                "content": [{
                    "heading": "Introdução",
                    "body": [{ "type": "paragraph", "text": text, "spans": [] }]
                }]
            }),
        }
    }

    fn site(dir: &Path) -> Site {
        let config = SiteConfig::default();
        Site {
            public_dir: dir.join(&config.public_dir),
            base_dir: dir.to_path_buf(),
            config,
        }
    }

    #[tokio::test]
    async fn test_generate_listing_chain_and_posts() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let cms = Arc::new(MemoryCms::new(vec![
            doc("a", 10),
            doc("b", 450),
            doc("c", 0),
        ]));

        let generator = Generator::new(&site, cms).unwrap();
        let summary = generator.generate().await.unwrap();
        assert_eq!(
            summary,
            GenerateSummary {
                listing_pages: 2,
                post_pages: 3
            }
        );

        let index = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(index.contains("/post/a/"));
        assert!(index.contains("/post/b/"));
        assert!(!index.contains("/post/c/"));
        assert!(index.contains(r#"href="/page/2/""#));
        assert!(index.contains("15 mar 2021"));

        let page2 = fs::read_to_string(site.public_dir.join("page/2/index.html")).unwrap();
        assert!(page2.contains("/post/a/"));
        assert!(page2.contains("/post/c/"));
        assert!(!page2.contains("Carregar mais posts"));

        let post_b = fs::read_to_string(site.public_dir.join("post/b/index.html")).unwrap();
        assert!(post_b.contains("3 min"));
        assert!(post_b.contains("Joseph Oliveira"));

        let post_c = fs::read_to_string(site.public_dir.join("post/c/index.html")).unwrap();
        assert!(post_c.contains("0 min"));

        assert!(site.public_dir.join("404.html").exists());
    }

    #[tokio::test]
    async fn test_unknown_date_label() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let mut undated = doc("a", 1);
        undated.first_publication_date = None;
        let generator = Generator::new(&site, Arc::new(MemoryCms::new(vec![undated]))).unwrap();

        let post = Post::try_from(&doc("a", 1)).unwrap();
        let undated_post = Post {
            first_publication_date: None,
            ..post
        };
        let html = generator.render_listing(&[undated_post], None).unwrap();
        assert!(html.contains("data desconhecida"));
    }

    #[test]
    fn test_listing_skips_unroutable_uids() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let generator = Generator::new(&site, Arc::new(MemoryCms::new(Vec::new()))).unwrap();

        let good = Post::try_from(&doc("a", 1)).unwrap();
        let crafted = Post {
            uid: r#"x" onmouseover="alert(1)"#.to_string(),
            title: "Crafted".to_string(),
            ..good.clone()
        };
        let html = generator.render_listing(&[good, crafted], None).unwrap();
        assert!(html.contains(r#"href="/post/a/""#));
        assert!(!html.contains("onmouseover"));
        assert!(!html.contains("Crafted"));
    }

    #[test]
    fn test_routable_uid() {
        assert!(is_routable_uid("como-utilizar-hooks"));
        assert!(is_routable_uid("post_2021.v2"));
        assert!(!is_routable_uid(""));
        assert!(!is_routable_uid("../etc"));
        assert!(!is_routable_uid("a/b"));
        assert!(!is_routable_uid("a b"));
    }
}
