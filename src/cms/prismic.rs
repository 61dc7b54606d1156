//! Prismic REST API client

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{render_predicates, CmsClient, CmsError, Document, Predicate, QueryOptions, SearchResponse};

/// API entry point payload; only the refs matter here
#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Client for a Prismic repository, e.g. `https://repo.cdn.prismic.io/api/v2`
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CmsError> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    /// The master ref, fetched once from the API entry point
    async fn master_ref(&self) -> Result<&str, CmsError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                if let Some(token) = &self.access_token {
                    url.query_pairs_mut().append_pair("access_token", token);
                }
                tracing::debug!("Fetching Prismic API info from {}", self.endpoint);
                let info: ApiInfo = self.get_json(url).await?;
                info.refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or_else(|| CmsError::malformed("API info has no master ref"))
            })
            .await?;
        Ok(reference.as_str())
    }

    fn search_url(
        &self,
        reference: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<Url, CmsError> {
        let mut url = Url::parse(&format!("{}/documents/search", self.endpoint))?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("ref", reference);
            if !predicates.is_empty() {
                qp.append_pair("q", &render_predicates(predicates));
            }
            if !options.fetch.is_empty() {
                qp.append_pair("fetch", &options.fetch.join(","));
            }
            if let Some(page_size) = options.page_size {
                qp.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(lang) = &options.lang {
                qp.append_pair("lang", lang);
            }
            if let Some(token) = &self.access_token {
                qp.append_pair("access_token", token);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        let resp = self.client.get(url).send().await?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, CmsError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(CmsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_slice(&bytes).map_err(CmsError::malformed)
    }
}

#[async_trait]
impl CmsClient for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, CmsError> {
        let reference = self.master_ref().await?;
        let url = self.search_url(reference, predicates, options)?;
        tracing::debug!("Prismic query: {}", url);
        self.get_json(url).await
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> Result<Document, CmsError> {
        let predicates = [Predicate::at(format!("my.{}.uid", doc_type), uid)];
        let options = QueryOptions {
            page_size: Some(1),
            ..options.clone()
        };
        let response = self.query(&predicates, &options).await?;
        response
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
        tracing::debug!("Prismic next page: {}", url);
        self.get_json(url).await
    }
}
