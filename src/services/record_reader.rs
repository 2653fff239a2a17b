//! Profiler record reader
//!
//! Reads `system.profile` documents exported as MongoDB Extended JSON, the
//! format `mongoexport` and `mongosh` produce. Accepts newline-delimited
//! documents, concatenated (pretty-printed) documents, or JSON arrays of
//! documents. Key order is preserved end to end.

use crate::services::explain::RawProfilerRecord;
use bson::Bson;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading profiler records
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to read profiler records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON after record {record}: {source}")]
    Json {
        record: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Extended JSON in record {record}: {source}")]
    ExtendedJson {
        record: usize,
        #[source]
        source: bson::extjson::de::Error,
    },

    #[error("Record {record} is not a document")]
    NotADocument { record: usize },

    #[error("Failed to decode record {record}: {source}")]
    Decode {
        record: usize,
        #[source]
        source: bson::de::Error,
    },
}

/// Result type alias for record reading
pub type RecordResult<T> = Result<T, RecordError>;

/// Reader for exported profiler records
pub struct RecordReader;

impl RecordReader {
    /// Read records from a file
    pub fn read_path(path: &Path) -> RecordResult<Vec<RawProfilerRecord>> {
        let content = fs::read_to_string(path)?;
        tracing::debug!("Read {} bytes of profiler records from {}", content.len(), path.display());
        Self::read_str(&content)
    }

    /// Read records from any reader (e.g. stdin)
    pub fn read_from<R: Read>(mut reader: R) -> RecordResult<Vec<RawProfilerRecord>> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::read_str(&content)
    }

    /// Read records from Extended JSON text
    ///
    /// Record numbers in errors are 1-based, counted across arrays.
    pub fn read_str(input: &str) -> RecordResult<Vec<RawProfilerRecord>> {
        let mut values = Vec::new();
        for value in serde_json::Deserializer::from_str(input).into_iter::<Value>() {
            let value = value.map_err(|source| RecordError::Json { record: values.len(), source })?;
            match value {
                Value::Array(items) => values.extend(items),
                other => values.push(other),
            }
        }

        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Self::decode(i + 1, value))
            .collect()
    }

    fn decode(record: usize, value: Value) -> RecordResult<RawProfilerRecord> {
        let bson = Bson::try_from(value)
            .map_err(|source| RecordError::ExtendedJson { record, source })?;
        let Bson::Document(doc) = bson else {
            return Err(RecordError::NotADocument { record });
        };
        RawProfilerRecord::from_document(doc).map_err(|source| RecordError::Decode { record, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use std::io::Write;

    #[test]
    fn test_read_ndjson() {
        let input = r#"
{"op": "query", "ns": "test.foo", "query": {"b": 1, "a": 2}}

{"op": "remove", "ns": "test.foo", "query": {"x": 1}}
"#;
        let records = RecordReader::read_str(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].op, "query");
        assert_eq!(records[0].query, doc! { "b": 1, "a": 2 });
        assert_eq!(records[0].query.keys().next().map(String::as_str), Some("b"));
        assert_eq!(records[1].op, "remove");
    }

    #[test]
    fn test_read_array() {
        let input = r#"[
            {"op": "insert", "ns": "d.c"},
            {"op": "getmore", "ns": "d.c"}
        ]"#;
        let records = RecordReader::read_str(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].op, "getmore");
    }

    #[test]
    fn test_read_extended_json_types() {
        let input = r#"{
            "op": "query",
            "ns": "test.foo",
            "millis": {"$numberLong": "12"},
            "ts": {"$date": "2017-07-14T02:40:00.000Z"},
            "command": {"find": "foo", "filter": {"_id": {"$oid": "5968e8a0a7b8a1a4b5c6d7e8"}}}
        }"#;
        let records = RecordReader::read_str(input).unwrap();
        let record = &records[0];
        assert_eq!(record.millis, Some(12));
        assert!(record.timestamp().is_some());
        let filter = record.command.get_document("filter").unwrap();
        assert!(matches!(filter.get("_id"), Some(Bson::ObjectId(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(RecordReader::read_str("").unwrap().is_empty());
        assert!(RecordReader::read_str("  \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_not_a_document() {
        let err = RecordReader::read_str("{\"op\": \"query\"}\n42").unwrap_err();
        assert!(matches!(err, RecordError::NotADocument { record: 2 }));
    }

    #[test]
    fn test_invalid_json() {
        let err = RecordReader::read_str("{\"op\": \"query\"}\n{\"op\": ").unwrap_err();
        assert!(matches!(err, RecordError::Json { record: 1, .. }));
    }

    #[test]
    fn test_read_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"op": "update", "ns": "d.c", "updateobj": {{"$set": {{"y": 2}}}}}}"#)
            .unwrap();
        let records = RecordReader::read_path(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].update_obj, doc! { "$set": { "y": 2 } });
    }

    #[test]
    fn test_read_missing_path() {
        let err = RecordReader::read_path(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, RecordError::Io(_)));
    }
}
