//! Query rules (Q001-Q003)
//!
//! Reads were logged in three shapes over the server's history:
//! - 2.6 wraps an explained query as `{query: {...}, $explain: true}`
//! - before 3.2 only the filter is logged, sometimes under a `query` key
//! - 3.2+ logs the `find` command itself

use super::*;
use crate::utils::document_ext::DocumentExt;
use bson::{Bson, doc};

/// Q001: Legacy double-wrapped explain (2.6)
///
/// The original query was itself an explain; there is nothing left to
/// rebuild, so the sentinel `{explain: ""}` is returned.
pub struct Q001LegacyDoubleExplain;

impl RewriteRule for Q001LegacyDoubleExplain {
    fn id(&self) -> &str {
        "Q001"
    }
    fn name(&self) -> &str {
        "legacy double explain"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Query
    }

    fn matches(&self, context: &RuleContext) -> bool {
        context.command.contains_key("$explain")
    }

    fn rewrite(&self, _context: &RuleContext) -> Rewrite {
        Rewrite::lossy(doc! { "explain": "" }, Approximation::LegacyDoubleExplain)
    }
}

/// Q002: Filter-only query (< 3.2)
pub struct Q002LegacyFilter;

impl RewriteRule for Q002LegacyFilter {
    fn id(&self) -> &str {
        "Q002"
    }
    fn name(&self) -> &str {
        "legacy filter query"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Query
    }

    fn matches(&self, context: &RuleContext) -> bool {
        !context.command.first_key_is("find")
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        let filter = match context.command.first_key() {
            Some("query") => context.command.first_value().cloned().unwrap_or(Bson::Null),
            _ => Bson::Document(context.command.clone()),
        };
        Rewrite::exact(doc! {
            "find": context.collection(),
            "filter": filter,
        })
    }
}

/// Q003: `find` command (3.2+)
pub struct Q003FindCommand;

impl RewriteRule for Q003FindCommand {
    fn id(&self) -> &str {
        "Q003"
    }
    fn name(&self) -> &str {
        "find command"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Query
    }

    fn matches(&self, context: &RuleContext) -> bool {
        context.command.first_key_is("find")
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        Rewrite::exact(context.command.without_field(DB_FIELD))
    }
}

/// Get all query rules
pub fn get_rules() -> Vec<Box<dyn RewriteRule>> {
    vec![Box::new(Q001LegacyDoubleExplain), Box::new(Q002LegacyFilter), Box::new(Q003FindCommand)]
}
