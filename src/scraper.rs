//! Scrape service
//!
//! Ties the pieces together for one request: submit the actor run, wait for
//! its dataset, and normalize whatever comes back. Batch-level failures
//! (submission, failed run, timeout) abort the request; item-level failures
//! only drop the item.

use crate::apify::{wait_for_items, ActorBackend, ActorInput, ApifyClient, PollSettings};
use crate::config::Settings;
use crate::model::{Post, ScrapeRequest};
use crate::normalize::{Clock, Normalizer, SystemClock};
use crate::{Result, ScrapeError};
use serde_json::Value;

/// Runs scrape requests against an [`ActorBackend`]
pub struct Scraper<B: ActorBackend = ApifyClient, C: Clock = SystemClock> {
    backend: B,
    poll: PollSettings,
    normalizer: Normalizer<C>,
}

impl Scraper<ApifyClient, SystemClock> {
    /// Builds a scraper talking to Apify with the given settings
    ///
    /// Fails immediately if the settings carry no API token.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = ApifyClient::new(&settings.api, settings.api_token.clone())?;
        Ok(Self::new(client, PollSettings::from(&settings.polling)))
    }
}

impl<B: ActorBackend> Scraper<B, SystemClock> {
    /// Creates a scraper over any backend, stamping undated items with wall-clock time
    pub fn new(backend: B, poll: PollSettings) -> Self {
        Self::with_normalizer(backend, poll, Normalizer::new())
    }
}

impl<B: ActorBackend, C: Clock> Scraper<B, C> {
    /// Creates a scraper with a specific normalizer (and thus clock)
    pub fn with_normalizer(backend: B, poll: PollSettings, normalizer: Normalizer<C>) -> Self {
        Self {
            backend,
            poll,
            normalizer,
        }
    }

    /// Returns the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scrapes posts for a request
    ///
    /// # Returns
    ///
    /// * `Ok(posts)` - Every item that normalized successfully; possibly empty
    /// * `Err(ScrapeError)` - Submission failed, the run failed, or polling timed out
    pub async fn scrape_posts(&self, request: &ScrapeRequest) -> Result<Vec<Post>> {
        let items = self.fetch_items(request).await?;
        let posts = self.normalizer.normalize_batch(&items);

        tracing::info!(
            "Successfully scraped {} posts out of {} items",
            posts.len(),
            items.len()
        );
        Ok(posts)
    }

    /// Submits a run and waits for its raw dataset items
    pub async fn fetch_items(&self, request: &ScrapeRequest) -> Result<Vec<Value>> {
        let input = ActorInput::from(request);
        tracing::info!(
            "Starting Apify scraper for {} URL(s): resultsType={}, resultsLimit={}, searchType={}, searchLimit={}",
            input.direct_urls.len(),
            input.results_type,
            input.results_limit,
            input.search_type,
            input.search_limit
        );

        let handle = self
            .backend
            .start_run(&input)
            .await
            .map_err(|e| match e {
                ScrapeError::Submission(_) => e,
                other => ScrapeError::Submission(other.to_string()),
            })?
            .ok_or_else(|| {
                ScrapeError::Submission("API response did not include a run handle".to_string())
            })?;

        tracing::info!(
            "Actor run started. Run ID: {}, Dataset ID: {}",
            handle.id,
            handle.default_dataset_id
        );

        wait_for_items(&self.backend, &handle.id, &handle.default_dataset_id, self.poll).await
    }
}
