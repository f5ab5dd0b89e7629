//! Data model: the scrape request and the normalized records it produces

mod post;
mod request;

pub use post::{Comment, CommentOwner, Post};
pub use request::{
    ResultsType, ScrapeRequest, ScrapeRequestBuilder, SearchType, RESULTS_LIMIT_RANGE,
    SEARCH_LIMIT_RANGE,
};
