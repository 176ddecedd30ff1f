//! Keyword search over the recent timelines of a set of accounts.

use crate::twitter::client::TweetSource;
use crate::twitter::normalize::normalize;
use crate::Result;

/// Queried when the caller supplies no accounts: the two main Houston
/// traffic feeds.
pub const DEFAULT_SEARCH_ACCOUNTS: &[&str] = &["TotalTrafficHOU", "houstontranstar"];

#[derive(Debug, Clone)]
pub struct SearchOpts {
    /// Posts requested per account (API-capped around 200 per call).
    pub per_account: u32,
    /// Matches returned post-filter.
    pub max_results: usize,
}

impl Default for SearchOpts {
    fn default() -> Self {
        Self {
            per_account: 300,
            max_results: 15,
        }
    }
}

/// Fetch each account's recent posts, concatenate them, and return the
/// texts containing `term` as a case-insensitive substring, at most
/// `max_results` of them.
///
/// Merge order is per-account concatenation, each account newest first;
/// there is no global timestamp sort, so with several accounts "most
/// recent" is only approximate. Inherited behaviour, kept as-is.
pub async fn search_term<S>(
    source: &S,
    accounts: &[String],
    term: &str,
    opts: &SearchOpts,
) -> Result<Vec<String>>
where
    S: TweetSource + ?Sized,
{
    let fallback: Vec<String>;
    let accounts: &[String] = if accounts.is_empty() {
        tracing::warn!("empty account list; falling back to Houston traffic defaults");
        fallback = DEFAULT_SEARCH_ACCOUNTS
            .iter()
            .map(|s| s.to_string())
            .collect();
        &fallback
    } else {
        accounts
    };

    let mut merged = Vec::new();
    for handle in accounts {
        let posts = source.user_timeline(handle, opts.per_account).await?;
        merged.extend(posts.iter().map(normalize));
    }

    let needle = term.to_lowercase();
    let matches: Vec<String> = merged
        .into_iter()
        .filter(|rec| rec.text.to_lowercase().contains(&needle))
        .map(|rec| rec.text)
        .take(opts.max_results)
        .collect();

    tracing::info!(term, matches = matches.len(), "twitter.search");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::types::RawTweet;
    use async_trait::async_trait;
    use serde_json::json;

    /// Canned per-handle timelines; no network.
    struct StubSource {
        timelines: Vec<(&'static str, Vec<RawTweet>)>,
    }

    #[async_trait]
    impl TweetSource for StubSource {
        async fn user_timeline(&self, handle: &str, _count: u32) -> Result<Vec<RawTweet>> {
            Ok(self
                .timelines
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, posts)| posts.clone())
                .unwrap_or_default())
        }
    }

    fn post(id: u64, text: &str) -> RawTweet {
        serde_json::from_value(json!({ "id": id, "text": text })).unwrap()
    }

    fn stub() -> StubSource {
        StubSource {
            timelines: vec![
                (
                    "TotalTrafficHOU",
                    (0..20)
                        .map(|i| post(100 + i, &format!("Stall on I-45 North #{i}")))
                        .chain(std::iter::once(post(180, "Clear on US-59")))
                        .collect(),
                ),
                (
                    "houstontranstar",
                    vec![
                        post(200, "i-45 southbound lanes flooded"),
                        post(201, "Westpark closure"),
                    ],
                ),
            ],
        }
    }

    #[tokio::test]
    async fn caps_at_fifteen_case_insensitive_matches() {
        let src = stub();
        let accounts = vec!["TotalTrafficHOU".into(), "houstontranstar".into()];
        let got = search_term(&src, &accounts, "I-45", &SearchOpts::default())
            .await
            .unwrap();

        assert_eq!(got.len(), 15);
        assert!(got.iter().all(|t| t.to_lowercase().contains("i-45")));
    }

    #[tokio::test]
    async fn preserves_per_account_order_without_global_sort() {
        let src = stub();
        let accounts = vec!["TotalTrafficHOU".into(), "houstontranstar".into()];
        let opts = SearchOpts {
            max_results: 25,
            ..SearchOpts::default()
        };
        let got = search_term(&src, &accounts, "i-45", &opts).await.unwrap();

        // All 20 first-account matches come before the second account's one.
        assert_eq!(got.len(), 21);
        assert!(got[20].starts_with("i-45 southbound"));
    }

    #[tokio::test]
    async fn empty_account_list_uses_defaults() {
        let src = stub();
        let got = search_term(&src, &[], "Westpark", &SearchOpts::default())
            .await
            .unwrap();
        assert_eq!(got, vec!["Westpark closure".to_string()]);
    }

    #[tokio::test]
    async fn no_matches_is_empty_not_error() {
        let src = stub();
        let accounts = vec!["TotalTrafficHOU".into()];
        let got = search_term(&src, &accounts, "Beltway 8", &SearchOpts::default())
            .await
            .unwrap();
        assert!(got.is_empty());
    }
}
