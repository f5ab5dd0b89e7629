//! Scrape request descriptor
//!
//! A [`ScrapeRequest`] describes one scrape submission. It is built once from
//! user input through [`ScrapeRequestBuilder`], validated on `build()`, and
//! never mutated afterwards.

use crate::config::is_valid_profile_url;
use crate::ValidationError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive bounds for `results_limit`
pub const RESULTS_LIMIT_RANGE: (u32, u32) = (1, 1000);

/// Inclusive bounds for `search_limit`
pub const SEARCH_LIMIT_RANGE: (u32, u32) = (1, 100);

/// What kind of Instagram entity a search targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    User,
    Hashtag,
    Place,
}

impl SearchType {
    /// Returns the value the actor expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Hashtag => "hashtag",
            Self::Place => "place",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the actor should return for each target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultsType {
    #[default]
    Posts,
    Comments,
    Details,
    Mentions,
    Stories,
}

impl ResultsType {
    /// Returns the value the actor expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::Details => "details",
            Self::Mentions => "mentions",
            Self::Stories => "stories",
        }
    }
}

impl fmt::Display for ResultsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one scrape submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    direct_urls: Vec<String>,
    results_limit: u32,
    search_limit: u32,
    search_type: SearchType,
    results_type: ResultsType,
    enhance_user_search_with_facebook_page: bool,
    #[serde(rename = "isUserReelFeedURL")]
    is_user_reel_feed_url: bool,
    #[serde(rename = "isUserTaggedFeedURL")]
    is_user_tagged_feed_url: bool,
    add_parent_data: bool,
}

impl ScrapeRequest {
    /// Starts a builder for the given profile URLs
    ///
    /// # Example
    ///
    /// ```
    /// use insta_scraper::ScrapeRequest;
    ///
    /// let request = ScrapeRequest::builder(["https://www.instagram.com/natgeo/"])
    ///     .results_limit(5)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.results_limit(), 5);
    /// ```
    pub fn builder<I, S>(urls: I) -> ScrapeRequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScrapeRequestBuilder::new(urls)
    }

    pub fn direct_urls(&self) -> &[String] {
        &self.direct_urls
    }

    pub fn results_limit(&self) -> u32 {
        self.results_limit
    }

    pub fn search_limit(&self) -> u32 {
        self.search_limit
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    pub fn results_type(&self) -> ResultsType {
        self.results_type
    }

    pub fn enhance_user_search_with_facebook_page(&self) -> bool {
        self.enhance_user_search_with_facebook_page
    }

    pub fn is_user_reel_feed_url(&self) -> bool {
        self.is_user_reel_feed_url
    }

    pub fn is_user_tagged_feed_url(&self) -> bool {
        self.is_user_tagged_feed_url
    }

    pub fn add_parent_data(&self) -> bool {
        self.add_parent_data
    }
}

/// Builder for [`ScrapeRequest`]
///
/// Defaults: 200 results, 1 search result, `user` search, `posts` results,
/// every flag off.
#[derive(Debug, Clone)]
pub struct ScrapeRequestBuilder {
    urls: Vec<String>,
    results_limit: u32,
    search_limit: u32,
    search_type: SearchType,
    results_type: ResultsType,
    enhance_user_search_with_facebook_page: bool,
    is_user_reel_feed_url: bool,
    is_user_tagged_feed_url: bool,
    add_parent_data: bool,
}

impl ScrapeRequestBuilder {
    fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            results_limit: 200,
            search_limit: 1,
            search_type: SearchType::default(),
            results_type: ResultsType::default(),
            enhance_user_search_with_facebook_page: false,
            is_user_reel_feed_url: false,
            is_user_tagged_feed_url: false,
            add_parent_data: false,
        }
    }

    pub fn results_limit(mut self, limit: u32) -> Self {
        self.results_limit = limit;
        self
    }

    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn results_type(mut self, results_type: ResultsType) -> Self {
        self.results_type = results_type;
        self
    }

    pub fn enhance_user_search_with_facebook_page(mut self, enabled: bool) -> Self {
        self.enhance_user_search_with_facebook_page = enabled;
        self
    }

    pub fn is_user_reel_feed_url(mut self, enabled: bool) -> Self {
        self.is_user_reel_feed_url = enabled;
        self
    }

    pub fn is_user_tagged_feed_url(mut self, enabled: bool) -> Self {
        self.is_user_tagged_feed_url = enabled;
        self
    }

    pub fn add_parent_data(mut self, enabled: bool) -> Self {
        self.add_parent_data = enabled;
        self
    }

    /// Validates the collected input and produces the request
    ///
    /// URLs are trimmed and blank lines dropped. Every invalid URL is
    /// reported at once.
    pub fn build(self) -> Result<ScrapeRequest, ValidationError> {
        let urls: Vec<String> = self
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        if urls.is_empty() {
            return Err(ValidationError::NoUrls);
        }

        let invalid: Vec<String> = urls
            .iter()
            .filter(|u| !is_valid_profile_url(u))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidProfileUrls(invalid));
        }

        check_range("results_limit", self.results_limit, RESULTS_LIMIT_RANGE)?;
        check_range("search_limit", self.search_limit, SEARCH_LIMIT_RANGE)?;

        Ok(ScrapeRequest {
            direct_urls: urls,
            results_limit: self.results_limit,
            search_limit: self.search_limit,
            search_type: self.search_type,
            results_type: self.results_type,
            enhance_user_search_with_facebook_page: self.enhance_user_search_with_facebook_page,
            is_user_reel_feed_url: self.is_user_reel_feed_url,
            is_user_tagged_feed_url: self.is_user_tagged_feed_url,
            add_parent_data: self.add_parent_data,
        })
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    (min, max): (u32, u32),
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
