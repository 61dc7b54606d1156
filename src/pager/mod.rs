//! Post listing pagination
//!
//! [`PostListPager`] owns the posts loaded so far and the cursor of the next
//! CMS page. `load_more` is guarded so only one request is ever in flight,
//! and a failed request leaves the state exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

use crate::cms::{CmsClient, CmsError, Predicate, QueryOptions, RetryPolicy};
use crate::content::{posts_from_documents, Post};

/// Fields needed to show a post on the listing
pub const LISTING_FIELDS: [&str; 3] = ["title", "subtitle", "author"];

/// The statically generated first page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstPage {
    pub next_page: Option<String>,
    pub posts: Vec<Post>,
}

/// Posts loaded so far and where to continue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    pub next_page: Option<String>,
    pub posts: Vec<Post>,
}

impl PaginationState {
    /// Append posts in order, skipping uids already loaded.
    /// Returns how many were appended.
    fn append(&mut self, posts: Vec<Post>) -> usize {
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.uid.clone()).collect();
        let before = self.posts.len();
        for post in posts {
            if seen.insert(post.uid.clone()) {
                self.posts.push(post);
            } else {
                tracing::debug!("Skipping duplicate post {}", post.uid);
            }
        }
        self.posts.len() - before
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Result of a `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged
    Loaded { appended: usize },
    /// There is no next page; nothing was requested
    Exhausted,
    /// Another `load_more` is still running; nothing was requested
    InFlight,
}

/// Query the first listing page of `doc_type`
pub async fn query_first_page(
    cms: &dyn CmsClient,
    doc_type: &str,
    lang: &str,
    page_size: u32,
    retry: &RetryPolicy,
) -> Result<FirstPage, CmsError> {
    let predicates = [Predicate::at("document.type", doc_type)];
    let options = QueryOptions::fetch(LISTING_FIELDS.iter().map(|f| format!("{}.{}", doc_type, f)))
        .page_size(page_size)
        .lang(lang);

    let response = retry
        .run("first page query", || cms.query(&predicates, &options))
        .await?;
    let posts = posts_from_documents(&response.results)?;
    tracing::debug!(
        "First page: {} posts, more: {}",
        posts.len(),
        response.next_page.is_some()
    );

    Ok(FirstPage {
        next_page: response.next_page,
        posts,
    })
}

/// Append the locale parameter to a cursor URL, replacing any existing one
pub fn cursor_with_lang(cursor: &str, lang: &str) -> Result<Url, CmsError> {
    let mut url = Url::parse(cursor)?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "lang")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut qp = url.query_pairs_mut();
        for (k, v) in &pairs {
            qp.append_pair(k, v);
        }
        qp.append_pair("lang", lang);
    }
    Ok(url)
}

/// Paginated post listing backed by the CMS
pub struct PostListPager {
    cms: Arc<dyn CmsClient>,
    lang: String,
    retry: RetryPolicy,
    state: Mutex<PaginationState>,
}

impl PostListPager {
    /// Create an empty pager
    pub fn new(cms: Arc<dyn CmsClient>, lang: &str, retry: RetryPolicy) -> Self {
        Self {
            cms,
            lang: lang.to_string(),
            retry,
            state: Mutex::new(PaginationState::default()),
        }
    }

    /// Create a pager already holding the first page
    pub fn with_first_page(
        cms: Arc<dyn CmsClient>,
        lang: &str,
        retry: RetryPolicy,
        first_page: FirstPage,
    ) -> Self {
        let mut pager = Self::new(cms, lang, retry);
        pager.initialize(first_page);
        pager
    }

    /// Replace the state with the first page
    pub fn initialize(&mut self, first_page: FirstPage) {
        let state = self.state.get_mut();
        *state = PaginationState {
            next_page: first_page.next_page,
            posts: Vec::new(),
        };
        state.append(first_page.posts);
    }

    /// A copy of the current state
    pub async fn snapshot(&self) -> PaginationState {
        self.state.lock().await.clone()
    }

    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more()
    }

    /// Fetch the next page and merge it into the loaded posts
    ///
    /// Returns `InFlight` without doing anything when another call has not
    /// finished yet, and `Exhausted` when there is no cursor. On error the
    /// state is unchanged.
    pub async fn load_more(&self) -> Result<LoadOutcome, CmsError> {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::debug!("load_more ignored: a request is already in flight");
            return Ok(LoadOutcome::InFlight);
        };

        let Some(cursor) = state.next_page.clone() else {
            return Ok(LoadOutcome::Exhausted);
        };

        let url = cursor_with_lang(&cursor, &self.lang)?;
        let cms = &self.cms;
        let url = &url;
        let response = self
            .retry
            .run("load more", move || cms.fetch_page(url.as_str()))
            .await?;

        let fetched = posts_from_documents(&response.results)?;
        let appended = state.append(fetched);
        state.next_page = response.next_page;

        tracing::info!(
            "Loaded {} more posts ({} total, more: {})",
            appended,
            state.posts.len(),
            state.has_more()
        );
        Ok(LoadOutcome::Loaded { appended })
    }

    /// Keep loading until the cursor runs out or repeats.
    /// Returns the number of pages fetched.
    pub async fn load_all(&self) -> Result<usize, CmsError> {
        let mut visited = HashSet::new();
        let mut pages = 0;
        loop {
            let Some(cursor) = self.state.lock().await.next_page.clone() else {
                return Ok(pages);
            };
            if !visited.insert(cursor) {
                tracing::warn!("CMS returned the same cursor twice, stopping pagination");
                return Ok(pages);
            }
            match self.load_more().await? {
                LoadOutcome::Loaded { .. } => pages += 1,
                LoadOutcome::Exhausted | LoadOutcome::InFlight => return Ok(pages),
            }
        }
    }
}
