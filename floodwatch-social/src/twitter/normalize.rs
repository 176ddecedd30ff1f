//! Reduce one raw post to the fixed 4-field record the corpora are built
//! from, with explicit ordered fallbacks for the fields the APIs often omit.

use crate::twitter::types::RawTweet;

/// Placeholder for "no coordinates on this post". A fixed string rather
/// than an empty field keeps the CSV location column homogeneous.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// The normalized representation of one post.
#[derive(Debug, Clone, PartialEq)]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
    pub date: String,
    pub location: String,
}

/// Normalize one raw post.
///
/// Fallback order:
/// - date: `formatted_date`, else `created_at`, else empty
/// - location: `geo` pair, else `coordinates` pair, else [`UNKNOWN_LOCATION`]
pub fn normalize(raw: &RawTweet) -> TweetRecord {
    let date = raw
        .formatted_date
        .clone()
        .or_else(|| raw.created_at.clone())
        .unwrap_or_default();

    let location = raw
        .geo
        .as_ref()
        .and_then(|g| g.render())
        .or_else(|| raw.coordinates.as_ref().and_then(|c| c.render()))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    TweetRecord {
        id: raw.id.to_string(),
        text: raw.text.clone(),
        date,
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: serde_json::Value) -> RawTweet {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn geo_wins_over_coordinates() {
        let rec = normalize(&raw(json!({
            "id": 1,
            "text": "flooding at I-10 and Heights",
            "geo": { "coordinates": [29.79, -95.40] },
            "coordinates": { "coordinates": [-95.40, 29.79] }
        })));
        assert_eq!(rec.location, "29.79,-95.4");
    }

    #[test]
    fn coordinates_used_when_geo_absent() {
        let rec = normalize(&raw(json!({
            "id": 2,
            "text": "x",
            "coordinates": { "coordinates": [-95.36, 29.76] }
        })));
        assert_eq!(rec.location, "-95.36,29.76");
    }

    #[test]
    fn both_absent_yields_unknown_sentinel() {
        let rec = normalize(&raw(json!({ "id": 3, "text": "x" })));
        assert_eq!(rec.location, UNKNOWN_LOCATION);
    }

    #[test]
    fn formatted_date_wins_over_created_at() {
        let rec = normalize(&raw(json!({
            "id": 4,
            "text": "x",
            "formatted_date": "2017-08-27 04:00",
            "created_at": "Sun Aug 27 04:00:00 +0000 2017"
        })));
        assert_eq!(rec.date, "2017-08-27 04:00");
    }

    #[test]
    fn created_at_fallback_then_empty() {
        let rec = normalize(&raw(json!({
            "id": 5,
            "text": "x",
            "created_at": "Sun Aug 27 04:00:00 +0000 2017"
        })));
        assert_eq!(rec.date, "Sun Aug 27 04:00:00 +0000 2017");

        let rec = normalize(&raw(json!({ "id": 6, "text": "x" })));
        assert_eq!(rec.date, "");
    }

    #[test]
    fn short_coordinate_pair_falls_through_to_sentinel() {
        let rec = normalize(&raw(json!({
            "id": 7,
            "text": "x",
            "geo": { "coordinates": [29.76] }
        })));
        assert_eq!(rec.location, UNKNOWN_LOCATION);
    }
}
