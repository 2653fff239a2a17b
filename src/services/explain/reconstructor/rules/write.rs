//! Write rules (U001, D001, I001)
//!
//! One profiler record describes one statement, so `updates` and `deletes`
//! always hold exactly one element.

use super::*;
use crate::utils::document_ext::DocumentExt;
use bson::doc;

/// U001: Update statement
pub struct U001UpdateStatement;

impl RewriteRule for U001UpdateStatement {
    fn id(&self) -> &str {
        "U001"
    }
    fn name(&self) -> &str {
        "update statement"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Update
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        let statement = if context.command.is_empty() {
            doc! {
                "q": context.example.query.clone(),
                "u": context.example.update_obj.clone(),
            }
        } else {
            context.command.clone()
        };
        Rewrite::exact(doc! {
            "update": context.collection(),
            "updates": [statement],
        })
    }
}

/// D001: Delete statement
///
/// Legacy remove records do not keep the `justOne` flag, so `limit: 0`
/// (remove every match) is assumed.
pub struct D001DeleteStatement;

impl RewriteRule for D001DeleteStatement {
    fn id(&self) -> &str {
        "D001"
    }
    fn name(&self) -> &str {
        "delete statement"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Remove
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        let wrap = |statement: Document| {
            doc! {
                "delete": context.collection(),
                "deletes": [statement],
            }
        };
        if context.command.is_empty() {
            let statement = doc! {
                "q": context.example.query.clone(),
                "limit": 0,
            };
            Rewrite::lossy(wrap(statement), Approximation::DeleteLimitAssumed)
        } else {
            Rewrite::exact(wrap(context.command.clone()))
        }
    }
}

/// I001: Insert without `insert` verb
///
/// The inserted documents do not affect the plan and are dropped.
pub struct I001InsertStub;

impl RewriteRule for I001InsertStub {
    fn id(&self) -> &str {
        "I001"
    }
    fn name(&self) -> &str {
        "insert stub"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Insert
    }

    fn matches(&self, context: &RuleContext) -> bool {
        !context.command.first_key_is("insert")
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        Rewrite::exact(doc! { "insert": context.collection() })
    }
}

/// Get all write rules
pub fn get_rules() -> Vec<Box<dyn RewriteRule>> {
    vec![Box::new(U001UpdateStatement), Box::new(D001DeleteStatement), Box::new(I001InsertStub)]
}
