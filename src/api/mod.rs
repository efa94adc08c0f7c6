use crate::internal::models::{Article, FetchAck, FetchStatus, PreferencePayload};
use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP API service for the news-aggregation backend.
///
/// All four backend endpoints are wrapped here. Errors are returned as
/// `anyhow::Result` with contextualized messages so the UI can show a
/// human-readable failure instead of a bare transport error. Non-2xx
/// statuses and non-success acknowledgment bodies are both failures.
#[derive(Debug, Clone)]
pub struct ApiService {
    client: Client,
    base_url: String,
}

impl ApiService {
    /// Create a service talking to the given backend, e.g.
    /// `http://localhost:5000`. A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a URL and deserialize the JSON body into `T`. A non-2xx status
    /// fails before any parse is attempted.
    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to send GET request to {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", url))?;

        resp.json::<T>()
            .await
            .with_context(|| format!("failed to parse JSON response from {}", url))
    }

    /// Fetch the current article list. The request carries no preference
    /// parameters; the server answers from whatever preference was last
    /// pushed via [`push_preferences`](Self::push_preferences).
    pub async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let url = self.endpoint("/api/news");
        self.get_json(&url).await.context("fetch_articles failed")
    }

    /// Fetch the last-fetch-time / article-count summary.
    pub async fn fetch_status(&self) -> Result<FetchStatus> {
        let url = self.endpoint("/status");
        self.get_json(&url).await.context("fetch_status failed")
    }

    /// Ask the server to re-pull articles from its upstream source. Succeeds
    /// only on an explicit `{"status": "success"}` acknowledgment.
    pub async fn trigger_refetch(&self) -> Result<()> {
        let url = self.endpoint("/fetch_news");
        let ack: FetchAck = self
            .get_json(&url)
            .await
            .context("trigger_refetch failed")?;
        if !ack.is_success() {
            bail!(
                "server declined to fetch news: {}",
                ack.message.as_deref().unwrap_or(&ack.status)
            );
        }
        Ok(())
    }

    /// Push the active topic and custom search term to the server so
    /// subsequent article fetches reflect them.
    pub async fn push_preferences(&self, topic: &str, custom_search: &str) -> Result<()> {
        let url = self.endpoint("/api/preferences");
        let payload = PreferencePayload::new(topic, custom_search);
        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("failed to send POST request to {}", url))?
            .error_for_status()
            .with_context(|| format!("POST {} returned an error status", url))?;

        let ack: FetchAck = resp
            .json()
            .await
            .with_context(|| format!("failed to parse JSON response from {}", url))?;
        if !ack.is_success() {
            bail!(
                "server rejected preferences: {}",
                ack.message.as_deref().unwrap_or(&ack.status)
            );
        }
        Ok(())
    }
}
