//! Request and response shapes of the Apify API

use crate::model::ScrapeRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor input, using the parameter names the Instagram actor expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsType")]
    pub results_type: String,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "searchType")]
    pub search_type: String,
    #[serde(rename = "searchLimit")]
    pub search_limit: u32,
    #[serde(rename = "addParentData")]
    pub add_parent_data: bool,
}

impl From<&ScrapeRequest> for ActorInput {
    fn from(request: &ScrapeRequest) -> Self {
        Self {
            direct_urls: request.direct_urls().to_vec(),
            results_type: request.results_type().as_str().to_string(),
            results_limit: request.results_limit(),
            search_type: request.search_type().as_str().to_string(),
            search_limit: request.search_limit(),
            add_parent_data: request.add_parent_data(),
        }
    }
}

/// Wrapper for Apify API responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Handle returned when a run is started
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunHandle {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: String,
}

/// Run metadata as reported by `GET /actor-runs/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RunInfo {
    pub status: RunStatus,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
    #[serde(rename = "statusMessage", default)]
    pub status_message: Option<String>,
}

impl RunInfo {
    /// Best available description of why a run ended the way it did
    pub fn failure_message(&self) -> String {
        self.error_message
            .as_deref()
            .or(self.status_message.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Lifecycle status of an actor run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    /// Anything the API reports that this client does not know about
    Other(String),
}

impl RunStatus {
    /// Returns true if the run finished without success
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::Aborted)
    }

    /// Returns true if the run finished successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Converts the status to the API's string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimingOut => "TIMING-OUT",
            Self::TimedOut => "TIMED-OUT",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "TIMING-OUT" => Self::TimingOut,
            "TIMED-OUT" => Self::TimedOut,
            "ABORTING" => Self::Aborting,
            "ABORTED" => Self::Aborted,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultsType, SearchType};

    #[test]
    fn test_actor_input_from_request() {
        let request = ScrapeRequest::builder(["https://www.instagram.com/natgeo/"])
            .results_limit(5)
            .search_limit(2)
            .search_type(SearchType::Hashtag)
            .results_type(ResultsType::Comments)
            .add_parent_data(true)
            .is_user_reel_feed_url(true)
            .build()
            .unwrap();

        let json = serde_json::to_value(ActorInput::from(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "directUrls": ["https://www.instagram.com/natgeo/"],
                "resultsType": "comments",
                "resultsLimit": 5,
                "searchType": "hashtag",
                "searchLimit": 2,
                "addParentData": true,
            })
        );
    }

    #[test]
    fn test_run_status_classification() {
        assert!(RunStatus::Failed.is_failure());
        assert!(RunStatus::Aborted.is_failure());
        assert!(RunStatus::TimedOut.is_failure());
        assert!(RunStatus::Succeeded.is_success());
        assert!(!RunStatus::Running.is_failure());
        assert!(!RunStatus::TimingOut.is_failure());
        assert!(!RunStatus::Aborting.is_failure());
        assert!(!RunStatus::Other("PAUSED".into()).is_success());
    }

    #[test]
    fn test_run_status_round_trip_strings() {
        for s in ["READY", "RUNNING", "SUCCEEDED", "FAILED", "TIMED-OUT", "ABORTED"] {
            assert_eq!(RunStatus::from(s.to_string()).as_str(), s);
        }
        assert_eq!(RunStatus::from("NEW".to_string()), RunStatus::Other("NEW".into()));
    }

    #[test]
    fn test_run_info_failure_message() {
        let info: RunInfo = serde_json::from_value(serde_json::json!({
            "status": "FAILED",
            "errorMessage": "Instagram blocked the request"
        }))
        .unwrap();
        assert_eq!(info.status, RunStatus::Failed);
        assert_eq!(info.failure_message(), "Instagram blocked the request");

        let info: RunInfo = serde_json::from_value(serde_json::json!({
            "status": "ABORTED",
            "statusMessage": "Aborted by user"
        }))
        .unwrap();
        assert_eq!(info.failure_message(), "Aborted by user");

        let info: RunInfo =
            serde_json::from_value(serde_json::json!({ "status": "FAILED" })).unwrap();
        assert_eq!(info.failure_message(), "Unknown error");
    }
}
