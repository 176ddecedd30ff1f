//! CSV serialization of normalized corpora.
//!
//! Column layout matches the original flat files: `id,tweets,date,location`
//! with a trailing `tag` column on labeled corpora.

use anyhow::{Context, Result};
use floodwatch_social::TweetRecord;
use std::path::Path;

/// Write one corpus. A `tag` adds the label column with the same value on
/// every row; `None` omits the column entirely.
pub fn write_corpus(path: &Path, records: &[TweetRecord], tag: Option<&str>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;

    match tag {
        Some(tag) => {
            writer.write_record(["id", "tweets", "date", "location", "tag"])?;
            for rec in records {
                writer.write_record([
                    rec.id.as_str(),
                    rec.text.as_str(),
                    rec.date.as_str(),
                    rec.location.as_str(),
                    tag,
                ])?;
            }
        }
        None => {
            writer.write_record(["id", "tweets", "date", "location"])?;
            for rec in records {
                writer.write_record([
                    rec.id.as_str(),
                    rec.text.as_str(),
                    rec.date.as_str(),
                    rec.location.as_str(),
                ])?;
            }
        }
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = records.len(), ?tag, "corpus.written");
    Ok(())
}

/// Concatenate corpora preserving each part's internal order. Row count of
/// the result equals the sum of the inputs.
pub fn concat(parts: Vec<Vec<TweetRecord>>) -> Vec<TweetRecord> {
    let mut merged = Vec::with_capacity(parts.iter().map(Vec::len).sum());
    for part in parts {
        merged.extend(part);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodwatch_social::{normalize, UNKNOWN_LOCATION};
    use serde_json::json;
    use tempfile::TempDir;

    fn record(id: u64, text: &str) -> TweetRecord {
        normalize(&serde_json::from_value(json!({ "id": id, "text": text })).unwrap())
    }

    #[test]
    fn concat_row_count_is_sum_of_inputs() {
        let a: Vec<_> = (0..7).map(|i| record(i, "a")).collect();
        let b: Vec<_> = (0..5).map(|i| record(100 + i, "b")).collect();
        let merged = concat(vec![a, b]);

        assert_eq!(merged.len(), 12);
        // non-overlapping parts keep their order
        assert_eq!(merged[0].id, "0");
        assert_eq!(merged[7].id, "100");
    }

    #[test]
    fn tagged_corpus_has_five_columns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("traffic.csv");
        let records = vec![record(1, "Stall on I-45"), record(2, "All clear")];

        write_corpus(&path, &records, Some("traffic")).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec!["id", "tweets", "date", "location", "tag"])
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| &r[4] == "traffic"));
        assert_eq!(&rows[0][3], UNKNOWN_LOCATION);
    }

    #[test]
    fn untagged_corpus_has_four_columns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("harvey.csv");
        write_corpus(&path, &[record(9, "x")], None).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 4);
        assert_eq!(reader.records().count(), 1);
    }
}
