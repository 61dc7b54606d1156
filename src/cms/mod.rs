//! Headless CMS access
//!
//! The rest of the crate only talks to the CMS through the [`CmsClient`]
//! trait. [`PrismicClient`] speaks the Prismic REST API, [`MemoryCms`]
//! serves documents from memory (fixtures and tests).

mod error;
mod memory;
mod prismic;
mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{CmsError, ErrorKind};
pub use memory::MemoryCms;
pub use prismic::PrismicClient;
pub use retry::RetryPolicy;

/// A query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `at(path, value)`: exact match on a document field
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Predicate form used inside the `q` query parameter
    pub fn render(&self) -> String {
        match self {
            Predicate::At { path, value } => {
                format!("[at({}, \"{}\")]", path, value.replace('"', "\\\""))
            }
        }
    }
}

/// Render a predicate list as the `q` parameter: `[[at(..)][at(..)]]`
pub fn render_predicates(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(Predicate::render).collect();
    format!("[{}]", inner)
}

/// Options shared by `query` and `get_by_uid`
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Fields to return, e.g. `posts.title`
    pub fetch: Vec<String>,
    pub page_size: Option<u32>,
    pub lang: Option<String>,
}

impl QueryOptions {
    pub fn fetch<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fetch: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results_size: Option<u32>,
    /// Cursor URL for the next page, `None` on the last page
    pub next_page: Option<String>,
    pub results: Vec<Document>,
}

/// A raw CMS document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Capability to read documents from the CMS
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Search documents matching every predicate
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, CmsError>;

    /// Fetch a single document by its uid, failing with `NotFound` when absent
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> Result<Document, CmsError>;

    /// Follow a `next_page` cursor URL
    async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_predicates() {
        let q = render_predicates(&[Predicate::at("document.type", "posts")]);
        assert_eq!(q, r#"[[at(document.type, "posts")]]"#);

        let q = render_predicates(&[
            Predicate::at("document.type", "posts"),
            Predicate::at("my.posts.uid", "hello"),
        ]);
        assert_eq!(
            q,
            r#"[[at(document.type, "posts")][at(my.posts.uid, "hello")]]"#
        );
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 2,
            "total_pages": 3,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?page=2",
            "results": [{
                "id": "YF3f",
                "uid": "como-utilizar-hooks",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "data": {"title": "Como utilizar Hooks"}
            }]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_pages, Some(3));
        assert!(response.next_page.is_some());
        assert_eq!(response.results[0].uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(response.results[0].doc_type, "posts");
    }
}
