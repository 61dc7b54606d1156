//! Post detail resolution at generation time

use std::collections::HashSet;
use std::sync::Arc;

use crate::cms::{CmsClient, CmsError, Predicate, QueryOptions, RetryPolicy};
use crate::content::PostDetail;

/// Page size used when enumerating identifiers
const LIST_PAGE_SIZE: u32 = 100;

/// Fields needed to render the detail page
pub const DETAIL_FIELDS: [&str; 5] = ["title", "subtitle", "content", "author", "banner"];

/// Enumerates and resolves posts of one document type
pub struct PostPageResolver {
    cms: Arc<dyn CmsClient>,
    doc_type: String,
    lang: String,
    retry: RetryPolicy,
}

impl PostPageResolver {
    pub fn new(cms: Arc<dyn CmsClient>, doc_type: &str, lang: &str, retry: RetryPolicy) -> Self {
        Self {
            cms,
            doc_type: doc_type.to_string(),
            lang: lang.to_string(),
            retry,
        }
    }

    /// Every post uid known to the CMS, in CMS order
    pub async fn list_known_identifiers(&self) -> Result<Vec<String>, CmsError> {
        let predicates = [Predicate::at("document.type", self.doc_type.as_str())];
        let options = QueryOptions::fetch([format!("{}.uid", self.doc_type)])
            .page_size(LIST_PAGE_SIZE)
            .lang(self.lang.as_str());

        let cms = &self.cms;
        let mut response = self
            .retry
            .run("list identifiers", || cms.query(&predicates, &options))
            .await?;

        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        let mut uids = Vec::new();
        loop {
            for doc in &response.results {
                match &doc.uid {
                    Some(uid) if !uid.is_empty() => {
                        if seen.insert(uid.clone()) {
                            uids.push(uid.clone());
                        }
                    }
                    _ => tracing::warn!("Skipping {} document {} without uid", doc.doc_type, doc.id),
                }
            }

            let Some(next) = response.next_page.take() else {
                break;
            };
            if !visited.insert(next.clone()) {
                tracing::warn!("CMS returned cursor {} twice, stopping enumeration", next);
                break;
            }
            let next = &next;
            response = self
                .retry
                .run("list identifiers", move || cms.fetch_page(next))
                .await?;
        }

        tracing::info!("Found {} {} identifiers", uids.len(), self.doc_type);
        Ok(uids)
    }

    /// Fetch one post with its full content
    ///
    /// Fails with `NotFound` when the CMS has no such document and with an
    /// upstream error when the CMS cannot be reached.
    pub async fn resolve(&self, uid: &str) -> Result<PostDetail, CmsError> {
        let options = QueryOptions::fetch(
            DETAIL_FIELDS
                .iter()
                .map(|f| format!("{}.{}", self.doc_type, f)),
        )
        .lang(self.lang.as_str());

        let cms = &self.cms;
        let doc_type = self.doc_type.as_str();
        let doc = self
            .retry
            .run("resolve post", || cms.get_by_uid(doc_type, uid, &options))
            .await?;

        let detail = PostDetail::try_from(&doc)?;
        tracing::debug!("Resolved {} ({} blocks)", detail.uid, detail.content.len());
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{Document, ErrorKind, MemoryCms, PrismicClient, SearchResponse};
    use async_trait::async_trait;
    use httpmock::MockServer;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Always hands back the same next-page cursor
    struct LoopingCms {
        fetches: AtomicUsize,
    }

    impl LoopingCms {
        fn page(uid: &str) -> SearchResponse {
            SearchResponse {
                next_page: Some("https://repo.cdn.prismic.io/api/v2/documents/search?page=2".into()),
                results: vec![doc(uid)],
                ..SearchResponse::default()
            }
        }
    }

    #[async_trait]
    impl CmsClient for LoopingCms {
        async fn query(
            &self,
            _predicates: &[Predicate],
            _options: &QueryOptions,
        ) -> Result<SearchResponse, CmsError> {
            Ok(Self::page("first"))
        }

        async fn get_by_uid(
            &self,
            doc_type: &str,
            uid: &str,
            _options: &QueryOptions,
        ) -> Result<Document, CmsError> {
            Err(CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
        }

        async fn fetch_page(&self, _url: &str) -> Result<SearchResponse, CmsError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Self::page(&format!("next-{}", n)))
        }
    }

    fn doc(uid: &str) -> Document {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: Some("2021-03-25T19:25:28+0000".to_string()),
            last_publication_date: None,
            lang: Some("pt-br".to_string()),
            data: json!({
                "title": format!("Post {}", uid),
                "author": "Danilo Vieira",
                "banner": { "url": "https://images.prismic.io/b.png" },
                "content": [{
                    "heading": "Intro",
                    "body": [{ "type": "paragraph", "text": "um dois três", "spans": [] }]
                }]
            }),
        }
    }

    fn resolver(cms: Arc<dyn CmsClient>) -> PostPageResolver {
        PostPageResolver::new(
            cms,
            "posts",
            "pt-br",
            RetryPolicy::no_retry(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn test_list_follows_every_page() {
        let docs: Vec<Document> = (0..250).map(|i| doc(&format!("post-{}", i))).collect();
        let resolver = resolver(Arc::new(MemoryCms::new(docs)));

        let uids = resolver.list_known_identifiers().await.unwrap();
        assert_eq!(uids.len(), 250);
        assert_eq!(uids[0], "post-0");
        assert_eq!(uids[249], "post-249");
    }

    #[tokio::test]
    async fn test_list_stops_on_repeated_cursor() {
        let cms = Arc::new(LoopingCms {
            fetches: AtomicUsize::new(0),
        });
        let resolver = resolver(cms.clone());

        let uids = resolver.list_known_identifiers().await.unwrap();
        assert_eq!(uids, ["first", "next-0"]);
        assert_eq!(cms.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_existing_and_missing() {
        let resolver = resolver(Arc::new(MemoryCms::new(vec![doc("existing-id")])));

        let detail = resolver.resolve("existing-id").await.unwrap();
        assert_eq!(detail.uid, "existing-id");
        assert_eq!(detail.read_time(), 1);

        let err = resolver.resolve("missing-id").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_upstream_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/v2");
                then.status(500).body("internal error");
            })
            .await;

        let cms = PrismicClient::new(&server.url("/api/v2"), None, Duration::from_secs(5)).unwrap();
        let err = resolver(Arc::new(cms)).resolve("any").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
