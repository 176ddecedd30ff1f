//! Twitter/X collection surface for Floodwatch.
//!
//! `twitter` holds the API client, raw response models, the tweet
//! normalizer, and keyword search; `directory` holds the static
//! flood-prone-city to traffic-account table.

pub mod directory;
pub mod twitter;

pub use twitter::client::{TweetSource, TwitterApi};
pub use twitter::normalize::{normalize, TweetRecord, UNKNOWN_LOCATION};

/// Errors surfaced by the social crate's fetch and lookup paths.
#[derive(thiserror::Error, Debug)]
pub enum SocialError {
    #[error("http error: {0}")]
    Http(#[from] floodwatch_http::HttpError),

    #[error("app-only authentication failed: {0}")]
    Auth(String),

    #[error("timestamp formatting failed: {0}")]
    Time(#[from] time::error::Format),

    #[error("city list has {got} entries but {want} handle groups are defined")]
    CityCount { got: usize, want: usize },
}

pub type Result<T> = std::result::Result<T, SocialError>;
