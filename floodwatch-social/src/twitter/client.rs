//! Wrapper around the Twitter/X API with Floodwatch defaults.
//!
//! Handles app-only auth, request parameter shaping, and `next_token`
//! pagination before delegating to the shared HTTP client. One `TwitterApi`
//! is constructed at startup and passed to every fetch operation.

use crate::twitter::types::{RawTweet, SearchResponse, TokenResponse};
use crate::{Result, SocialError};
use async_trait::async_trait;
use floodwatch_http::{Auth, HttpClient, RequestOpts};
use std::borrow::Cow;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, Time};

const BASE_URL: &str = "https://api.twitter.com";

/// v1.1 user timeline caps a single call at 200 posts.
const TIMELINE_MAX_COUNT: u32 = 200;
/// v2 full-archive search accepts page sizes in 10..=500.
const SEARCH_PAGE_MIN: u32 = 10;
const SEARCH_PAGE_MAX: u32 = 500;

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    /// Client around a pre-issued bearer token.
    pub fn new(bearer_token: String) -> Result<Self> {
        let http = HttpClient::new(BASE_URL)?;
        Ok(Self {
            http,
            bearer: bearer_token,
        })
    }

    /// Exchange a consumer key/secret for an app-only bearer token
    /// (`POST /oauth2/token`, HTTP basic auth).
    pub async fn from_consumer_keys(consumer_key: &str, consumer_secret: &str) -> Result<Self> {
        let http = HttpClient::new(BASE_URL)?;

        let token: TokenResponse = http
            .post_form(
                "oauth2/token",
                &[("grant_type", "client_credentials")],
                RequestOpts {
                    auth: Some(Auth::Basic {
                        user: consumer_key,
                        pass: consumer_secret,
                    }),
                    ..Default::default()
                },
            )
            .await?;

        if token.token_type != "bearer" {
            return Err(SocialError::Auth(format!(
                "unexpected token_type {:?}",
                token.token_type
            )));
        }
        tracing::info!("twitter.auth.app_only_token_issued");

        Ok(Self {
            http,
            bearer: token.access_token,
        })
    }

    /// Override the per-request timeout on the underlying client.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.http = self.http.with_timeout(dur);
        self
    }

    /// Override the retry budget on the underlying client.
    pub fn with_retries(mut self, n: usize) -> Self {
        self.http = self.http.with_retries(n);
        self
    }

    /// Most recent posts of one account, newest first.
    ///
    /// `count` is the requested number; the API caps one call at 200.
    pub async fn user_timeline(&self, handle: &str, count: u32) -> Result<Vec<RawTweet>> {
        let count = count.clamp(1, TIMELINE_MAX_COUNT);

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("screen_name", handle.into()),
            ("count", count.to_string().into()),
        ];

        let posts: Vec<RawTweet> = self
            .http
            .get_json(
                "1.1/statuses/user_timeline.json",
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(handle, requested = count, got = posts.len(), "twitter.timeline");
        Ok(posts)
    }

    /// Date-windowed posts from one account via v2 full-archive search,
    /// following `next_token` pages until `max_tweets` are collected or the
    /// pages run out.
    pub async fn historical_search(
        &self,
        username: &str,
        since: Date,
        until: Date,
        max_tweets: u32,
    ) -> Result<Vec<RawTweet>> {
        let start = OffsetDateTime::new_utc(since, Time::MIDNIGHT).format(&Rfc3339)?;
        let end = OffsetDateTime::new_utc(until, Time::MIDNIGHT).format(&Rfc3339)?;
        let query = format!("from:{username}");

        let mut out: Vec<RawTweet> = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let remaining = max_tweets.saturating_sub(out.len() as u32);
            if remaining == 0 {
                break;
            }
            let page_size = remaining.clamp(SEARCH_PAGE_MIN, SEARCH_PAGE_MAX);

            let mut params: Vec<(&str, Cow<'_, str>)> = vec![
                ("query", Cow::Borrowed(query.as_str())),
                ("max_results", page_size.to_string().into()),
                ("start_time", Cow::Borrowed(start.as_str())),
                ("end_time", Cow::Borrowed(end.as_str())),
                ("tweet.fields", "created_at,geo".into()),
            ];
            if let Some(tok) = &next_token {
                params.push(("next_token", Cow::Borrowed(tok.as_str())));
            }

            let resp: SearchResponse = self
                .http
                .get_json(
                    "2/tweets/search/all",
                    RequestOpts {
                        auth: Some(Auth::Bearer(&self.bearer)),
                        query: Some(params),
                        ..Default::default()
                    },
                )
                .await?;

            let page = resp.data.unwrap_or_default();
            tracing::debug!(
                username,
                page_len = page.len(),
                collected = out.len(),
                "twitter.historical.page"
            );
            out.extend(page);

            next_token = resp.meta.and_then(|m| m.next_token);
            if next_token.is_none() {
                break;
            }
        }

        out.truncate(max_tweets as usize);
        Ok(out)
    }
}

/// Seam over timeline fetching so keyword search can be exercised without
/// the network.
#[async_trait]
pub trait TweetSource: Send + Sync {
    async fn user_timeline(&self, handle: &str, count: u32) -> Result<Vec<RawTweet>>;
}

#[async_trait]
impl TweetSource for TwitterApi {
    async fn user_timeline(&self, handle: &str, count: u32) -> Result<Vec<RawTweet>> {
        TwitterApi::user_timeline(self, handle, count).await
    }
}
