use crate::storage::{CollectionOutcome, CollectionReport};
use anyhow::Result;
use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// Render documents as a pretty relaxed extended JSON array.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_extjson(docs: Vec<Document>) -> Result<String> {
    let values: Vec<Value> = docs
        .into_iter()
        .map(|doc| Bson::Document(doc).into_relaxed_extjson())
        .collect();

    Ok(serde_json::to_string_pretty(&Value::Array(values))?)
}

#[must_use]
pub fn collection_line(report: &CollectionReport) -> String {
    let outcome = match report.outcome {
        CollectionOutcome::Created => "created",
        CollectionOutcome::Updated => "updated",
    };

    format!("{}: {outcome} [{}]", report.name, report.indexes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{DateTime, doc};

    #[test]
    fn extjson_is_relaxed() -> Result<()> {
        let json = to_extjson(vec![doc! {
            "createIndexes": "user_sessions",
            "expireAfterSeconds": 0,
            "at": DateTime::from_millis(0),
        }])?;
        let value: Value = serde_json::from_str(&json)?;

        assert_eq!(value[0]["expireAfterSeconds"], Value::from(0));
        assert!(
            value[0]["at"]["$date"]
                .as_str()
                .is_some_and(|date| date.starts_with("1970-01-01T00:00:00"))
        );
        Ok(())
    }

    #[test]
    fn collection_line_lists_indexes() {
        let line = collection_line(&CollectionReport {
            name: "two_factor_auth",
            outcome: CollectionOutcome::Created,
            indexes: vec!["userId_1".to_string(), "enabled_1".to_string()],
        });
        assert_eq!(line, "two_factor_auth: created [userId_1, enabled_1]");
    }
}
