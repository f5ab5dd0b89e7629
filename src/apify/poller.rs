//! Dataset poll loop
//!
//! An actor run is asynchronous and its completion is only observable by
//! polling. Each attempt:
//!
//! 1. Reads the dataset; any items end the loop (even if the run is still
//!    running).
//! 2. Otherwise reads the run status: a failed run ends the loop with
//!    `RunFailed`, a succeeded run ends it with an empty list.
//! 3. Otherwise checks the wall-clock ceiling and sleeps one interval.
//!
//! Errors from the read calls themselves are retried until the ceiling is
//! exceeded, then surfaced wrapped in `PollFailed`.

use crate::apify::types::RunStatus;
use crate::apify::ActorBackend;
use crate::config::PollingConfig;
use crate::{Result, ScrapeError};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Timing parameters for [`wait_for_items`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep between attempts
    pub interval: Duration,
    /// Ceiling measured from the first attempt
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(180),
        }
    }
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Outcome of one poll attempt that did not error
enum Attempt {
    Items(Vec<Value>),
    Succeeded,
    Failed(String),
    Pending(RunStatus),
}

async fn attempt<B: ActorBackend + ?Sized>(
    backend: &B,
    run_id: &str,
    dataset_id: &str,
) -> Result<Attempt> {
    let items = backend.dataset_items(dataset_id).await?;
    if !items.is_empty() {
        return Ok(Attempt::Items(items));
    }

    let info = backend.run_info(run_id).await?;
    if info.status.is_failure() {
        return Ok(Attempt::Failed(info.failure_message()));
    }
    if info.status.is_success() {
        return Ok(Attempt::Succeeded);
    }
    Ok(Attempt::Pending(info.status))
}

/// Polls a run's dataset until it has items or the run finishes
///
/// # Arguments
///
/// * `backend` - The job API
/// * `run_id` - Run to watch
/// * `dataset_id` - The run's default dataset
/// * `settings` - Interval and wall-clock ceiling
///
/// # Returns
///
/// * `Ok(items)` - Items found, or an empty list if the run succeeded with none
/// * `Err(ScrapeError::RunFailed)` - The run reported a terminal failure
/// * `Err(ScrapeError::Timeout)` - The ceiling passed while the run was pending
/// * `Err(ScrapeError::PollFailed)` - The ceiling passed while reads kept failing
pub async fn wait_for_items<B: ActorBackend + ?Sized>(
    backend: &B,
    run_id: &str,
    dataset_id: &str,
    settings: PollSettings,
) -> Result<Vec<Value>> {
    let started = Instant::now();

    loop {
        let outcome = attempt(backend, run_id, dataset_id).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Attempt::Items(items)) => {
                tracing::info!("Retrieved {} items from dataset {}", items.len(), dataset_id);
                return Ok(items);
            }
            Ok(Attempt::Succeeded) => {
                tracing::warn!("Run {} succeeded but no items found", run_id);
                return Ok(Vec::new());
            }
            Ok(Attempt::Failed(message)) => {
                tracing::error!("Run {} failed: {}", run_id, message);
                return Err(ScrapeError::RunFailed {
                    run_id: run_id.to_string(),
                    message,
                });
            }
            Ok(Attempt::Pending(status)) => {
                if elapsed > settings.timeout {
                    return Err(ScrapeError::Timeout {
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
                tracing::info!(
                    "Waiting for results... Status: {} ({}s elapsed)",
                    status,
                    elapsed.as_secs()
                );
            }
            Err(e) => {
                if elapsed > settings.timeout {
                    return Err(ScrapeError::PollFailed {
                        elapsed_secs: elapsed.as_secs(),
                        source: Box::new(e),
                    });
                }
                tracing::warn!("Temporary error retrieving dataset: {}", e);
            }
        }

        sleep(settings.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apify::types::{ActorInput, RunHandle, RunInfo};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted backend: each dataset read pops the next response; once the
    /// script is exhausted the last entry repeats.
    struct ScriptedBackend {
        datasets: Mutex<VecDeque<Result<Vec<Value>>>>,
        status: RunStatus,
        error_message: Option<String>,
        dataset_reads: AtomicUsize,
        status_reads: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(datasets: Vec<Result<Vec<Value>>>, status: RunStatus) -> Self {
            Self {
                datasets: Mutex::new(datasets.into()),
                status,
                error_message: None,
                dataset_reads: AtomicUsize::new(0),
                status_reads: AtomicUsize::new(0),
            }
        }

        fn with_error_message(mut self, message: &str) -> Self {
            self.error_message = Some(message.to_string());
            self
        }
    }

    fn clone_result(result: &Result<Vec<Value>>) -> Result<Vec<Value>> {
        match result {
            Ok(items) => Ok(items.clone()),
            Err(e) => Err(ScrapeError::Submission(e.to_string())),
        }
    }

    #[async_trait]
    impl ActorBackend for ScriptedBackend {
        async fn start_run(&self, _input: &ActorInput) -> Result<Option<RunHandle>> {
            unreachable!("poll loop never starts runs")
        }

        async fn run_info(&self, _run_id: &str) -> Result<RunInfo> {
            self.status_reads.fetch_add(1, Ordering::SeqCst);
            Ok(RunInfo {
                status: self.status.clone(),
                error_message: self.error_message.clone(),
                status_message: None,
            })
        }

        async fn dataset_items(&self, _dataset_id: &str) -> Result<Vec<Value>> {
            self.dataset_reads.fetch_add(1, Ordering::SeqCst);
            let mut datasets = self.datasets.lock().unwrap();
            if datasets.len() > 1 {
                datasets.pop_front().unwrap()
            } else {
                clone_result(datasets.front().unwrap())
            }
        }
    }

    fn transient() -> ScrapeError {
        ScrapeError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_on_third_attempt() {
        let backend = ScriptedBackend::new(
            vec![Ok(vec![]), Ok(vec![]), Ok(vec![json!({"shortCode": "A"})])],
            RunStatus::Running,
        );

        let started = Instant::now();
        let items = wait_for_items(&backend, "run", "ds", PollSettings::default())
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(backend.dataset_reads.load(Ordering::SeqCst), 3);
        assert_eq!(backend.status_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_surfaces_message_without_waiting() {
        let backend = ScriptedBackend::new(vec![Ok(vec![])], RunStatus::Failed)
            .with_error_message("Profile is private");

        let started = Instant::now();
        let result = wait_for_items(&backend, "run-1", "ds", PollSettings::default()).await;

        match result {
            Err(ScrapeError::RunFailed { run_id, message }) => {
                assert_eq!(run_id, "run-1");
                assert_eq!(message, "Profile is private");
            }
            other => panic!("expected RunFailed, got {:?}", other),
        }
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_run_without_items_returns_empty() {
        let backend = ScriptedBackend::new(vec![Ok(vec![])], RunStatus::Succeeded);

        let items = wait_for_items(&backend, "run", "ds", PollSettings::default())
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(backend.dataset_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_run_times_out() {
        let backend = ScriptedBackend::new(vec![Ok(vec![])], RunStatus::Running);

        let started = Instant::now();
        let result = wait_for_items(&backend, "run", "ds", PollSettings::default()).await;

        assert!(matches!(result, Err(ScrapeError::Timeout { elapsed_secs: 185 })));
        assert_eq!(started.elapsed(), Duration::from_secs(185));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let backend = ScriptedBackend::new(
            vec![
                Err(transient()),
                Err(transient()),
                Ok(vec![json!({"shortCode": "A"}), json!({"shortCode": "B"})]),
            ],
            RunStatus::Running,
        );

        let items = wait_for_items(&backend, "run", "ds", PollSettings::default())
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(backend.status_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_errors_wrap_last_error_after_ceiling() {
        let backend = ScriptedBackend::new(vec![Err(transient())], RunStatus::Running);
        let settings = PollSettings {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(20),
        };

        let result = wait_for_items(&backend, "run", "ds", settings).await;

        match result {
            Err(ScrapeError::PollFailed {
                elapsed_secs,
                source,
            }) => {
                assert_eq!(elapsed_secs, 25);
                assert!(source.to_string().contains("502"));
            }
            other => panic!("expected PollFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_from_config() {
        let config = PollingConfig {
            interval_secs: 2,
            timeout_secs: 30,
        };
        let settings = PollSettings::from(&config);
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }
}
