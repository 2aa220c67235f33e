//! Builds the run dataset from fetched export files.

use serde_json::Value;
use tracing::{info, warn};

use crate::storage::{file_name, operator_code};

use super::{LineupError, LineupRecord, RunDataset};

/// Accumulates export files into a [`RunDataset`].
///
/// Files are applied in the order they are added; a later record for an
/// (operator, channel) pair already seen replaces the earlier one.
#[derive(Debug, Default)]
pub struct LineupAggregator {
    dataset: RunDataset,
}

impl LineupAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one export file into the dataset.
    ///
    /// Returns the operator code the file was filed under, or `None` when
    /// the key carries no operator code.
    pub fn add_file(&mut self, key: &str, content: Value) -> Result<Option<String>, LineupError> {
        let Some(code) = operator_code(key) else {
            warn!(file = %key, "Skipping file without a two-character operator code");
            return Ok(None);
        };
        let Value::Array(entries) = content else {
            return Err(LineupError::NotAnArray {
                key: key.to_string(),
            });
        };

        info!(file = %file_name(key), operator = %code, records = entries.len(), "Processing file");

        let mut skipped = 0;
        let mut overwrites = 0;
        let lineup = self.dataset.operator_mut(code);
        for (index, entry) in entries.into_iter().enumerate() {
            let record = match LineupRecord::try_from(entry) {
                Ok(record) => record,
                Err(e) => {
                    warn!(file = %key, index, "Skipping record: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            let channel_id = record.channel_id.clone();
            if let Some(previous) = lineup.upsert(record) {
                overwrites += 1;
                warn!(
                    operator = %code,
                    channel_id = %channel_id,
                    previous_name = ?previous.name(),
                    file = %key,
                    "Channel already seen in this run, overwriting attributes"
                );
            }
        }

        self.dataset.skipped_records += skipped;
        self.dataset.overwrites += overwrites;
        Ok(Some(code.to_string()))
    }

    /// Dataset built so far.
    pub fn dataset(&self) -> &RunDataset {
        &self.dataset
    }

    pub fn finish(self) -> RunDataset {
        self.dataset
    }
}

/// Aggregate already-fetched files, in iteration order.
pub fn aggregate<I, K>(files: I) -> Result<RunDataset, LineupError>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut aggregator = LineupAggregator::new();
    for (key, content) in files {
        aggregator.add_file(key.as_ref(), content)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(dataset: &RunDataset, code: &str) -> Vec<(String, String)> {
        dataset
            .operator(code)
            .unwrap()
            .channels()
            .map(|(id, attrs)| (id.to_string(), attrs.name().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_groups_by_operator_code_from_filename() {
        let dataset = aggregate(vec![
            (
                "exports/DE_2024-10-09.json",
                json!([{"EPG_ID": 7159, "name": "RTL"}, {"EPG_ID": 7160, "name": "VOX"}]),
            ),
            (
                "exports/NL_2024-10-09.json",
                json!([{"EPG_ID": 1, "name": "NPO 1"}]),
            ),
        ])
        .unwrap();

        assert_eq!(dataset.operator_count(), 2);
        assert_eq!(
            names(&dataset, "DE"),
            vec![
                ("7159".to_string(), "RTL".to_string()),
                ("7160".to_string(), "VOX".to_string())
            ]
        );
        assert_eq!(names(&dataset, "NL"), vec![("1".to_string(), "NPO 1".to_string())]);
        assert_eq!(dataset.overwrites, 0);
    }

    #[test]
    fn test_last_file_wins_for_same_channel() {
        let dataset = aggregate(vec![
            (
                "exports/DE-sat_2024-10-09.json",
                json!([{"EPG_ID": 7159, "name": "RTL", "Channel_Number": 12}]),
            ),
            (
                "exports/DE-cab_2024-10-09.json",
                json!([{"EPG_ID": 7159, "name": "RTL HD", "Channel_Number": 3}]),
            ),
        ])
        .unwrap();

        let de = dataset.operator("DE").unwrap();
        assert_eq!(de.len(), 1);
        let attrs = de.get("7159").unwrap();
        assert_eq!(attrs.name().as_deref(), Some("RTL HD"));
        assert_eq!(attrs.channel_number(), Some(&json!(3)));
        assert_eq!(dataset.overwrites, 1);
    }

    #[test]
    fn test_disjoint_files_are_order_independent() {
        let a = ("x/DE_2024-10-09.json", json!([{"EPG_ID": 1, "name": "A"}]));
        let b = ("y/DE_2024-10-09.json", json!([{"EPG_ID": 2, "name": "B"}]));

        let ab = aggregate(vec![a.clone(), b.clone()]).unwrap();
        let ba = aggregate(vec![b, a]).unwrap();

        let de_ab = ab.operator("DE").unwrap();
        let de_ba = ba.operator("DE").unwrap();
        assert_eq!(de_ab.get("1"), de_ba.get("1"));
        assert_eq!(de_ab.get("2"), de_ba.get("2"));
        assert_eq!(de_ab.len(), de_ba.len());
    }

    #[test]
    fn test_non_array_content_is_an_error() {
        let result = aggregate(vec![("x/DE_2024-10-09.json", json!({"EPG_ID": 1}))]);
        assert!(matches!(result, Err(LineupError::NotAnArray { .. })));
    }

    #[test]
    fn test_unusable_records_are_skipped() {
        let dataset = aggregate(vec![(
            "x/DE_2024-10-09.json",
            json!([{"name": "no id"}, "junk", {"EPG_ID": 5, "name": "ok"}]),
        )])
        .unwrap();

        assert_eq!(dataset.skipped_records, 2);
        assert_eq!(names(&dataset, "DE"), vec![("5".to_string(), "ok".to_string())]);
    }

    #[test]
    fn test_empty_file_creates_empty_operator() {
        let dataset = aggregate(vec![("x/IT_2024-10-09.json", json!([]))]).unwrap();
        assert!(dataset.operator("IT").unwrap().is_empty());
    }

    #[test]
    fn test_file_without_operator_code_is_ignored() {
        let mut aggregator = LineupAggregator::new();
        let code = aggregator.add_file("x/D", json!([{"EPG_ID": 1}])).unwrap();
        assert!(code.is_none());
        assert!(aggregator.dataset().is_empty());
    }
}
