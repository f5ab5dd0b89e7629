//! Apify actor API access
//!
//! This module contains:
//! - The [`ActorBackend`] trait, the seam between the scraper and the
//!   external job API
//! - [`ApifyClient`], the reqwest implementation against Apify API v2
//! - The poll loop that waits for a run's dataset to be populated

mod client;
mod poller;
mod types;

pub use client::ApifyClient;
pub use poller::{wait_for_items, PollSettings};
pub use types::{ActorInput, ApiResponse, RunHandle, RunInfo, RunStatus};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Operations the scraper needs from the external job API
///
/// Implementations must not retry internally; the poll loop owns retry and
/// timeout behavior.
#[async_trait]
pub trait ActorBackend: Send + Sync {
    /// Starts an actor run
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RunHandle))` - The run was started
    /// * `Ok(None)` - The API answered without a usable run handle
    /// * `Err(ScrapeError)` - The request itself failed
    async fn start_run(&self, input: &ActorInput) -> Result<Option<RunHandle>>;

    /// Reads the current status of a run
    async fn run_info(&self, run_id: &str) -> Result<RunInfo>;

    /// Reads every item currently stored in a dataset
    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>>;
}
