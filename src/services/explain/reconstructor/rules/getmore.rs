//! Getmore rules (M001-M002)
//!
//! A getmore only continues a cursor; its plan is the plan of the command
//! that opened the cursor. 3.6+ logs that command as `originatingCommand`.

use super::*;
use crate::utils::document_ext::DocumentExt;
use bson::doc;

/// M001: Explain the command that opened the cursor
pub struct M001OriginatingCommand;

impl RewriteRule for M001OriginatingCommand {
    fn id(&self) -> &str {
        "M001"
    }
    fn name(&self) -> &str {
        "originating command"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::GetMore
    }

    fn matches(&self, context: &RuleContext) -> bool {
        !context.example.originating_command.is_empty()
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        Rewrite::exact(context.example.originating_command.without_field(DB_FIELD))
    }
}

/// M002: Getmore without origin (< 3.6)
pub struct M002Placeholder;

impl RewriteRule for M002Placeholder {
    fn id(&self) -> &str {
        "M002"
    }
    fn name(&self) -> &str {
        "getmore placeholder"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::GetMore
    }

    fn rewrite(&self, _context: &RuleContext) -> Rewrite {
        Rewrite::lossy(doc! { "getmore": "" }, Approximation::GetMoreWithoutOrigin)
    }
}

/// Get all getmore rules
pub fn get_rules() -> Vec<Box<dyn RewriteRule>> {
    vec![Box::new(M001OriginatingCommand), Box::new(M002Placeholder)]
}
