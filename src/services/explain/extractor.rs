//! Profiler record model and projection
//!
//! `system.profile` documents changed shape across server releases: fields
//! were renamed (`nscannedObjects` became `docsExamined` in 3.2), counters
//! are logged as int32, int64 or double depending on the release, and the
//! payload fields come and go per operation kind. Decoding is therefore
//! lenient: a field that is missing or has an unexpected type decodes to its
//! empty value instead of failing the whole record.
//!
//! Document-valued fields are moved out of the source document as-is and
//! never pass through serde, which would read user sub-documents such as
//! `{$date: 5}` or `{$oid: "abc"}` as Extended JSON.

use super::models::{OperationKind, ProjectedExample};
use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A document logged by the database profiler
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawProfilerRecord {
    #[serde(skip)]
    pub all_users: Vec<Bson>,
    #[serde(deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub cursor_exhausted: bool,
    /// Named `nscannedObjects` before 3.2
    #[serde(deserialize_with = "lenient_i64")]
    pub docs_examined: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub nscanned_objects: Option<i64>,
    #[serde(skip)]
    pub exec_stats: Document,
    #[serde(deserialize_with = "lenient_i64")]
    pub key_updates: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub keys_examined: Option<i64>,
    #[serde(skip)]
    pub locks: Document,
    #[serde(deserialize_with = "lenient_i64")]
    pub millis: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub nreturned: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub ns: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub num_yield: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub op: String,
    #[serde(deserialize_with = "lenient_string")]
    pub protocol: String,
    #[serde(skip)]
    pub query: Document,
    #[serde(skip)]
    pub update_obj: Document,
    #[serde(skip)]
    pub command: Document,
    #[serde(skip)]
    pub originating_command: Document,
    #[serde(deserialize_with = "lenient_i64")]
    pub response_length: Option<i64>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub ts: Option<bson::DateTime>,
    #[serde(deserialize_with = "lenient_string")]
    pub user: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub write_conflicts: Option<i64>,
}

impl RawProfilerRecord {
    /// Decode a raw profiler document
    pub fn from_document(mut doc: Document) -> Result<Self, bson::de::Error> {
        let all_users = match doc.remove("allUsers") {
            Some(Bson::Array(items)) => items,
            _ => Vec::new(),
        };
        let exec_stats = take_document(&mut doc, "execStats");
        let locks = take_document(&mut doc, "locks");
        let query = take_document(&mut doc, "query");
        let update_obj = take_document(&mut doc, "updateobj");
        let command = take_document(&mut doc, "command");
        let originating_command = take_document(&mut doc, "originatingCommand");

        // Every remaining modeled field is a scalar
        let compound: Vec<String> = doc
            .iter()
            .filter(|(_, value)| matches!(value, Bson::Document(_) | Bson::Array(_)))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &compound {
            doc.remove(key);
        }

        Ok(Self {
            all_users,
            exec_stats,
            locks,
            query,
            update_obj,
            command,
            originating_command,
            ..bson::from_document(doc)?
        })
    }

    /// Documents examined, whichever name this server release used
    pub fn docs_examined(&self) -> Option<i64> {
        self.docs_examined.or(self.nscanned_objects)
    }

    /// Time the operation was logged
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.ts.map(|ts| ts.to_chrono())
    }
}

impl From<&RawProfilerRecord> for ProjectedExample {
    fn from(record: &RawProfilerRecord) -> Self {
        Self {
            ns: record.ns.clone(),
            op: OperationKind::from(record.op.as_str()),
            query: record.query.clone(),
            command: record.command.clone(),
            originating_command: record.originating_command.clone(),
            update_obj: record.update_obj.clone(),
        }
    }
}

/// Project a profiler record down to what reconstruction needs
pub fn extract(record: &RawProfilerRecord) -> ProjectedExample {
    ProjectedExample::from(record)
}

// ============================================================================
// Lenient field decoders
// ============================================================================

/// Move a document-valued field out of `doc`, empty when absent or not a document
fn take_document(doc: &mut Document, key: &str) -> Document {
    match doc.remove(key) {
        Some(Bson::Document(value)) => value,
        _ => Document::new(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::String(s)) => s,
        _ => String::new(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Option::<Bson>::deserialize(deserializer)?, Some(Bson::Boolean(true))))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::Int32(n)) => Some(n as i64),
        Some(Bson::Int64(n)) => Some(n),
        Some(Bson::Double(n)) if n.is_finite() => Some(n as i64),
        _ => None,
    })
}

fn lenient_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bson::DateTime>, D::Error> {
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::DateTime(ts)) => Some(ts),
        _ => None,
    })
}
