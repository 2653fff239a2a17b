//! Data models for explain reconstruction

use crate::utils::namespace;
use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Operation Kind
// ============================================================================

/// Operation kind as logged in the profiler's `op` field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    #[default]
    Query,
    Update,
    Remove,
    Insert,
    GetMore,
    Command,
    /// Any value the profiler may log that has no reconstruction rule
    /// (e.g. `killcursors`); the raw string is kept verbatim.
    Other(String),
}

impl OperationKind {
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Update => "update",
            OperationKind::Remove => "remove",
            OperationKind::Insert => "insert",
            OperationKind::GetMore => "getmore",
            OperationKind::Command => "command",
            OperationKind::Other(op) => op,
        }
    }
}

impl From<&str> for OperationKind {
    fn from(op: &str) -> Self {
        match op {
            "query" => OperationKind::Query,
            "update" => OperationKind::Update,
            "remove" => OperationKind::Remove,
            "insert" => OperationKind::Insert,
            "getmore" => OperationKind::GetMore,
            "command" => OperationKind::Command,
            other => OperationKind::Other(other.to_string()),
        }
    }
}

impl From<String> for OperationKind {
    fn from(op: String) -> Self {
        OperationKind::from(op.as_str())
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Projected Example
// ============================================================================

/// The part of a profiler record needed to rebuild its command.
///
/// Every payload keeps the key order of the source record. Empty payloads
/// stand for fields the record did not carry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectedExample {
    /// Namespace, `"<database>.<collection>"`
    pub ns: String,
    pub op: OperationKind,
    #[serde(default, skip_serializing_if = "Document::is_empty")]
    pub query: Document,
    #[serde(default, skip_serializing_if = "Document::is_empty")]
    pub command: Document,
    /// Command that created the cursor a `getmore` iterates (3.6+)
    #[serde(rename = "originatingCommand", default, skip_serializing_if = "Document::is_empty")]
    pub originating_command: Document,
    #[serde(rename = "updateobj", default, skip_serializing_if = "Document::is_empty")]
    pub update_obj: Document,
}

impl ProjectedExample {
    /// Database part of the namespace
    pub fn database(&self) -> &str {
        namespace::database(&self.ns)
    }

    /// Collection part of the namespace, empty when `ns` has no `.`
    pub fn collection(&self) -> &str {
        namespace::collection(&self.ns)
    }
}

// ============================================================================
// Reconstruction Result
// ============================================================================

/// A documented, lossy outcome of reconstruction.
///
/// These never make reconstruction fail; they only tell the caller that the
/// returned command does not fully reproduce the original operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approximation {
    /// 2.6 `{query: ..., $explain: true}` records cannot be rebuilt;
    /// the command is replaced by `{explain: ""}`.
    LegacyDoubleExplain,
    /// A `getmore` without `originatingCommand`; the placeholder
    /// `{getmore: ""}` does not produce a real plan.
    GetMoreWithoutOrigin,
    /// Legacy remove records do not say whether the delete was limited to one
    /// document, `limit: 0` is assumed.
    DeleteLimitAssumed,
    /// The `$reduce` function of a `group` command was replaced by `"{}"`.
    ReduceFunctionDiscarded,
}

impl Approximation {
    pub fn description(&self) -> &'static str {
        match self {
            Approximation::LegacyDoubleExplain => {
                "legacy $explain query cannot be reconstructed, sentinel explain used"
            },
            Approximation::GetMoreWithoutOrigin => {
                "getmore has no originating command, placeholder used"
            },
            Approximation::DeleteLimitAssumed => "delete limit unknown, 0 assumed",
            Approximation::ReduceFunctionDiscarded => "group $reduce function discarded",
        }
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Output of a reconstruction call
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// `{explain: <command>}`
    pub command: Document,
    /// Lossy steps taken on the way, in the order they were applied
    pub approximations: Vec<Approximation>,
}

impl Reconstruction {
    pub fn is_lossy(&self) -> bool {
        !self.approximations.is_empty()
    }

    /// The command wrapped under `explain`
    pub fn explained(&self) -> Option<&Document> {
        self.command.get_document("explain").ok()
    }

    pub fn into_command(self) -> Document {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_operation_kind_parse() {
        assert_eq!(OperationKind::from("query"), OperationKind::Query);
        assert_eq!(OperationKind::from("getmore"), OperationKind::GetMore);
        assert_eq!(
            OperationKind::from("killcursors"),
            OperationKind::Other("killcursors".to_string())
        );
    }

    #[test]
    fn test_operation_kind_display_round_trips_unknown() {
        let kind = OperationKind::from("killcursors");
        assert_eq!(kind.to_string(), "killcursors");
        assert_eq!(OperationKind::Remove.to_string(), "remove");
    }

    #[test]
    fn test_projected_example_namespace_parts() {
        let example = ProjectedExample { ns: "shop.orders".to_string(), ..Default::default() };
        assert_eq!(example.database(), "shop");
        assert_eq!(example.collection(), "orders");
    }

    #[test]
    fn test_projected_example_serializes_profiler_names() {
        let example = ProjectedExample {
            ns: "d.c".to_string(),
            op: OperationKind::Update,
            query: doc! { "x": 1 },
            update_obj: doc! { "$set": { "y": 2 } },
            ..Default::default()
        };
        let out = bson::to_document(&example).unwrap();
        assert_eq!(
            out,
            doc! {
                "ns": "d.c",
                "op": "update",
                "query": { "x": 1 },
                "updateobj": { "$set": { "y": 2 } },
            }
        );
    }

    #[test]
    fn test_reconstruction_accessors() {
        let r = Reconstruction {
            command: doc! { "explain": { "find": "c" } },
            approximations: vec![],
        };
        assert!(!r.is_lossy());
        assert_eq!(r.explained(), Some(&doc! { "find": "c" }));
    }
}
