//! In-memory CMS used for fixture builds and tests

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use url::Url;

use super::{CmsClient, CmsError, Document, Predicate, QueryOptions, SearchResponse};

/// Prismic's default page size
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Serves a fixed, ordered set of documents
///
/// Cursors are `memory://documents/search?...` URLs carrying the query so
/// that `fetch_page` can replay it.
#[derive(Debug, Clone, Default)]
pub struct MemoryCms {
    documents: Vec<Document>,
}

impl MemoryCms {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Load documents from a JSON array
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let documents: Vec<Document> = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} fixture documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::new(documents))
    }

    fn matches(doc: &Document, predicate: &Predicate) -> bool {
        let Predicate::At { path, value } = predicate;
        match path.as_str() {
            "document.type" => &doc.doc_type == value,
            "document.id" => &doc.id == value,
            other => match other
                .strip_prefix("my.")
                .and_then(|rest| rest.strip_suffix(".uid"))
            {
                Some(doc_type) => doc.doc_type == doc_type && doc.uid.as_deref() == Some(value),
                None => false,
            },
        }
    }

    fn search(
        &self,
        predicates: &[Predicate],
        lang: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResponse, CmsError> {
        let matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| predicates.iter().all(|p| Self::matches(doc, p)))
            .filter(|doc| match (lang, doc.lang.as_deref()) {
                (Some(wanted), Some(actual)) => wanted == "*" || wanted == actual,
                _ => true,
            })
            .collect();

        let page_size = page_size.max(1);
        let total = matching.len() as u32;
        let total_pages = total.div_ceil(page_size).max(1);
        let start = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
        let results = matching
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        let next_page = if page < total_pages {
            Some(Self::cursor(predicates, lang, page + 1, page_size)?.to_string())
        } else {
            None
        };

        Ok(SearchResponse {
            page: Some(page),
            total_pages: Some(total_pages),
            total_results_size: Some(total),
            next_page,
            results,
        })
    }

    fn cursor(
        predicates: &[Predicate],
        lang: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Url, CmsError> {
        let mut url = Url::parse("memory://documents/search")?;
        {
            let mut qp = url.query_pairs_mut();
            for Predicate::At { path, value } in predicates {
                qp.append_pair("at", &format!("{}={}", path, value));
            }
            qp.append_pair("page", &page.to_string());
            qp.append_pair("pageSize", &page_size.to_string());
            if let Some(lang) = lang {
                qp.append_pair("lang", lang);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CmsClient for MemoryCms {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, CmsError> {
        self.search(
            predicates,
            options.lang.as_deref(),
            1,
            options.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> Result<Document, CmsError> {
        let predicates = [Predicate::at(format!("my.{}.uid", doc_type), uid)];
        self.search(&predicates, options.lang.as_deref(), 1, 1)?
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError> {
        let url = Url::parse(url)?;
        if url.scheme() != "memory" {
            return Err(CmsError::malformed(format!("not a memory cursor: {}", url)));
        }

        let mut predicates = Vec::new();
        let mut page = 1;
        let mut page_size = DEFAULT_PAGE_SIZE;
        let mut lang = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "at" => {
                    let (path, value) = value
                        .split_once('=')
                        .ok_or_else(|| CmsError::malformed("bad predicate in cursor"))?;
                    predicates.push(Predicate::at(path, value));
                }
                "page" => page = value.parse().map_err(CmsError::malformed)?,
                "pageSize" => page_size = value.parse().map_err(CmsError::malformed)?,
                "lang" => lang = Some(value.into_owned()),
                _ => {}
            }
        }

        self.search(&predicates, lang.as_deref(), page, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(uid: &str) -> Document {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: None,
            last_publication_date: None,
            lang: Some("pt-br".to_string()),
            data: json!({ "title": uid }),
        }
    }

    fn cms() -> MemoryCms {
        let mut docs: Vec<Document> = ["a", "b", "c"].iter().map(|u| post(u)).collect();
        docs.push(Document {
            doc_type: "pages".to_string(),
            ..post("about")
        });
        MemoryCms::new(docs)
    }

    #[tokio::test]
    async fn test_query_paginates_in_order() {
        let cms = cms();
        let options = QueryOptions::default().page_size(2).lang("pt-br");
        let first = cms
            .query(&[Predicate::at("document.type", "posts")], &options)
            .await
            .unwrap();

        let uids: Vec<_> = first.results.iter().filter_map(|d| d.uid.clone()).collect();
        assert_eq!(uids, vec!["a", "b"]);
        assert_eq!(first.total_pages, Some(2));

        let cursor = first.next_page.expect("cursor");
        let second = cms.fetch_page(&cursor).await.unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].uid.as_deref(), Some("c"));
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn test_cursor_past_the_end() {
        let cms = cms();
        let response = cms
            .fetch_page("memory://documents/search?at=document.type%3Dposts&page=4294967295&pageSize=4294967295")
            .await
            .unwrap();
        assert!(response.results.is_empty());
        assert!(response.next_page.is_none());
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let cms = cms();
        let doc = cms
            .get_by_uid("posts", "b", &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(doc.id, "id-b");

        let err = cms
            .get_by_uid("posts", "about", &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_lang_filter() {
        let cms = cms();
        let options = QueryOptions::default().lang("en-us");
        let response = cms
            .query(&[Predicate::at("document.type", "posts")], &options)
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }
}
