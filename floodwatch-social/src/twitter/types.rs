use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// One post as the API returns it, reduced to the fields the normalizer
/// cares about. Aliases let the same view deserialize both v1.1 timeline
/// objects (numeric `id`, `text`/`full_text`, `geo`/`coordinates`) and v2
/// search objects (string `id`, `created_at`).
///
/// Every optional field is lenient: a malformed value reads as absent, so
/// extraction never fails on a single bad field.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTweet {
    pub id: TweetId,
    #[serde(alias = "full_text")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub geo: Option<GeoPoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<GeoPoint>,
}

/// v1.1 ids are numbers, v2 ids are strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TweetId {
    Num(u64),
    Str(String),
}

impl std::fmt::Display for TweetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TweetId::Num(n) => write!(f, "{n}"),
            TweetId::Str(s) => f.write_str(s),
        }
    }
}

/// A point geometry; only the coordinate pair matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Vec<f64>>,
}

impl GeoPoint {
    /// Render the pair as `"a,b"`; `None` when fewer than two components.
    pub fn render(&self) -> Option<String> {
        let pair = self.coordinates.as_deref()?;
        if pair.len() < 2 {
            return None;
        }
        Some(format!("{},{}", pair[0], pair[1]))
    }
}

/// Envelope for `GET /2/tweets/search/all`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub data: Option<Vec<RawTweet>>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Envelope for `POST /oauth2/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}

/// Deserialize to `None` instead of erroring when the field is present but
/// not the expected shape. Keeps "field absent" and "field malformed"
/// indistinguishable, which is all the fallback rules need.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_v11_timeline_object() {
        let raw: RawTweet = serde_json::from_value(json!({
            "id": 1234567890u64,
            "text": "I-45 North closed at Main",
            "created_at": "Wed Aug 17 12:00:00 +0000 2017",
            "geo": { "type": "Point", "coordinates": [29.76, -95.36] },
            "coordinates": null,
            "user": { "screen_name": "houstontranstar" }
        }))
        .unwrap();

        assert_eq!(raw.id.to_string(), "1234567890");
        assert_eq!(raw.geo.unwrap().render().as_deref(), Some("29.76,-95.36"));
        assert!(raw.coordinates.is_none());
    }

    #[test]
    fn parses_v2_search_object() {
        let raw: RawTweet = serde_json::from_value(json!({
            "id": "9876",
            "text": "Mainlanes reopened",
            "created_at": "2019-03-01T08:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(raw.id.to_string(), "9876");
        assert_eq!(raw.created_at.as_deref(), Some("2019-03-01T08:00:00.000Z"));
    }

    #[test]
    fn malformed_optional_field_reads_as_absent() {
        let raw: RawTweet = serde_json::from_value(json!({
            "id": 1,
            "text": "x",
            "geo": "not-an-object",
            "coordinates": { "coordinates": "garbage" }
        }))
        .unwrap();

        assert!(raw.geo.is_none());
        assert!(raw.coordinates.unwrap().coordinates.is_none());
    }

    #[test]
    fn full_text_alias_is_accepted() {
        let raw: RawTweet =
            serde_json::from_value(json!({ "id": 2, "full_text": "long form" })).unwrap();
        assert_eq!(raw.text, "long form");
    }
}
