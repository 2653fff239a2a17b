//! Rewrite rules module
//!
//! Every historical profiler shape the reconstructor knows about is one rule:
//! a predicate over the record plus the rewrite that turns it into a command
//! the server accepts under `explain`. Rules are organized by operation kind.
//!
//! | id   | op      | shape                                   |
//! |------|---------|-----------------------------------------|
//! | Q001 | query   | 2.6 `{query, $explain}` double explain  |
//! | Q002 | query   | legacy filter-only query (< 3.2)        |
//! | Q003 | query   | `find` command (3.2+)                   |
//! | U001 | update  | update statement                        |
//! | D001 | remove  | delete statement                        |
//! | I001 | insert  | legacy insert without `insert` verb     |
//! | M001 | getmore | getmore with `originatingCommand` (3.6+)|
//! | M002 | getmore | getmore without origin                  |
//! | C001 | command | `group` with a `$reduce` function       |

pub mod command;
pub mod getmore;
pub mod query;
pub mod write;

use crate::services::explain::models::*;
use crate::utils::namespace;
use bson::Document;

// ============================================================================
// Rule Trait and Types
// ============================================================================

/// Field added by 3.6+ drivers to every command, rejected by 3.0 servers
pub const DB_FIELD: &str = "$db";

/// Context for rule evaluation
pub struct RuleContext<'a> {
    pub example: &'a ProjectedExample,
    /// Command payload after the per-kind fallback to the query payload
    pub command: &'a Document,
}

impl<'a> RuleContext<'a> {
    pub fn new(example: &'a ProjectedExample, command: &'a Document) -> Self {
        Self { example, command }
    }

    /// Collection part of the record's namespace
    pub fn collection(&self) -> &str {
        namespace::collection(&self.example.ns)
    }

    pub fn op(&self) -> &OperationKind {
        &self.example.op
    }
}

/// Result of a single rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub command: Document,
    pub approximation: Option<Approximation>,
}

impl Rewrite {
    /// Faithful rewrite
    pub fn exact(command: Document) -> Self {
        Self { command, approximation: None }
    }

    /// Rewrite that loses information about the original operation
    pub fn lossy(command: Document, approximation: Approximation) -> Self {
        Self { command, approximation: Some(approximation) }
    }
}

/// Trait for rewrite rules
pub trait RewriteRule: Send + Sync {
    /// Rule ID (e.g., "Q001")
    fn id(&self) -> &str;

    /// Rule name
    fn name(&self) -> &str;

    /// Check if rule applies to this operation kind
    fn applicable_to(&self, op: &OperationKind) -> bool;

    /// Check if the record has the shape this rule handles
    fn matches(&self, _context: &RuleContext) -> bool {
        true
    }

    /// Build the command to explain
    fn rewrite(&self, context: &RuleContext) -> Rewrite;
}

/// Get all rules, in evaluation order
///
/// Within one operation kind the first matching rule wins, so more specific
/// shapes come before the general ones.
pub fn get_all_rules() -> Vec<Box<dyn RewriteRule>> {
    let mut rules: Vec<Box<dyn RewriteRule>> = Vec::new();
    rules.extend(query::get_rules());
    rules.extend(write::get_rules());
    rules.extend(getmore::get_rules());
    rules.extend(command::get_rules());
    rules
}
