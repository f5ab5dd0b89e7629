//! HTTP client for the Apify REST API (v2)
//!
//! Covers the three calls the scraper needs: starting an actor run, reading
//! a run's status, and listing a dataset's items.

use crate::apify::types::{ActorInput, ApiResponse, RunHandle, RunInfo};
use crate::apify::ActorBackend;
use crate::config::ApiConfig;
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Apify API client
///
/// Authenticates every request with the bearer token and targets a
/// configurable base URL so tests can point it at a mock server.
#[derive(Debug, Clone)]
pub struct ApifyClient {
    client: Client,
    base_url: String,
    actor_id: String,
    token: String,
}

impl ApifyClient {
    /// Creates a client for the given endpoint configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL and actor id
    /// * `token` - Apify API token
    ///
    /// # Returns
    ///
    /// * `Ok(ApifyClient)` - Successfully built client
    /// * `Err(ScrapeError)` - The token was empty or the HTTP client could not be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use insta_scraper::config::ApiConfig;
    /// use insta_scraper::ApifyClient;
    ///
    /// let client = ApifyClient::new(&ApiConfig::default(), "apify_api_xxx".to_string()).unwrap();
    /// ```
    pub fn new(config: &ApiConfig, token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(crate::ConfigError::MissingEnvVar(
                crate::config::API_TOKEN_VAR.to_string(),
            )
            .into());
        }

        let client = Client::builder()
            .user_agent(concat!("insta-scraper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            actor_id: config.actor_id.clone(),
            token,
        })
    }

    /// Returns the actor this client starts runs for
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turns a non-success response into `ScrapeError::Api`
    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl ActorBackend for ApifyClient {
    async fn start_run(&self, input: &ActorInput) -> Result<Option<RunHandle>> {
        let url = self.endpoint(&format!("acts/{}/runs", self.actor_id));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;

        let body: Value = resp.json().await?;
        let handle = body
            .get("data")
            .cloned()
            .and_then(|data| serde_json::from_value::<RunHandle>(data).ok())
            .filter(|handle| !handle.id.is_empty() && !handle.default_dataset_id.is_empty());

        Ok(handle)
    }

    async fn run_info(&self, run_id: &str) -> Result<RunInfo> {
        let url = self.endpoint(&format!("actor-runs/{}", run_id));
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;

        let api_resp: ApiResponse<RunInfo> = resp.json().await?;
        Ok(api_resp.data)
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let url = self.endpoint(&format!("datasets/{}/items", dataset_id));
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("format", "json"), ("clean", "true")])
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;

        let items: Vec<Value> = resp.json().await?;
        Ok(items)
    }
}
