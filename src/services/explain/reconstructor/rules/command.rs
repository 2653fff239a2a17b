//! Generic command rules (C001)
//!
//! Commands other than `group` are explained as logged.

use super::*;
use crate::utils::document_ext::DocumentExt;
use bson::Bson;

/// Placeholder stored in place of a discarded `$reduce` function
pub const REDUCE_PLACEHOLDER: &str = "{}";

/// C001: `group` with a `$reduce` function
///
/// Up to 3.2 the profiler logs `$reduce` as a JavaScript function, which
/// decodes to an empty value; 3.4+ logs `{code: "function () {}"}`, which the
/// server rejects under explain with "not code". The reduce function never
/// influences index selection, so it is replaced by `"{}"`.
pub struct C001GroupReduce;

impl RewriteRule for C001GroupReduce {
    fn id(&self) -> &str {
        "C001"
    }
    fn name(&self) -> &str {
        "group reduce function"
    }

    fn applicable_to(&self, op: &OperationKind) -> bool {
        *op == OperationKind::Command
    }

    fn matches(&self, context: &RuleContext) -> bool {
        context.command.first_key_is("group")
            && matches!(
                context.command.first_value(),
                Some(Bson::Document(group)) if group.contains_key("$reduce")
            )
    }

    fn rewrite(&self, context: &RuleContext) -> Rewrite {
        let mut command = context.command.clone();
        if let Some((verb, Bson::Document(group))) = context.command.iter().next() {
            let group: Document = group
                .iter()
                .map(|(key, value)| match key.as_str() {
                    "$reduce" => (key.clone(), Bson::String(REDUCE_PLACEHOLDER.to_string())),
                    _ => (key.clone(), value.clone()),
                })
                .collect();
            // Replacing an existing key keeps its position
            command.insert(verb.clone(), group);
        }
        Rewrite::lossy(command, Approximation::ReduceFunctionDiscarded)
    }
}

/// Get all command rules
pub fn get_rules() -> Vec<Box<dyn RewriteRule>> {
    vec![Box::new(C001GroupReduce)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn command_example(command: Document) -> ProjectedExample {
        ProjectedExample {
            ns: "test.$cmd".to_string(),
            op: OperationKind::Command,
            command,
            ..Default::default()
        }
    }

    #[test]
    fn test_c001_replaces_reduce_object() {
        let ex = command_example(doc! {
            "group": {
                "ns": "orders",
                "key": { "status": 1 },
                "$reduce": { "code": "function (cur, result) { result.total += cur.qty }" },
                "initial": { "total": 0 },
            },
            "maxTimeMS": 1000,
        });
        let ctx = RuleContext::new(&ex, &ex.command);
        assert!(C001GroupReduce.matches(&ctx));

        let rewrite = C001GroupReduce.rewrite(&ctx);
        assert_eq!(
            rewrite.command,
            doc! {
                "group": {
                    "ns": "orders",
                    "key": { "status": 1 },
                    "$reduce": "{}",
                    "initial": { "total": 0 },
                },
                "maxTimeMS": 1000,
            }
        );
        assert_eq!(rewrite.approximation, Some(Approximation::ReduceFunctionDiscarded));
    }

    #[test]
    fn test_c001_replaces_javascript_code() {
        let ex = command_example(doc! {
            "group": {
                "ns": "orders",
                "$reduce": Bson::JavaScriptCode("function () {}".to_string()),
            },
        });
        let rewrite = C001GroupReduce.rewrite(&RuleContext::new(&ex, &ex.command));
        assert_eq!(rewrite.command, doc! { "group": { "ns": "orders", "$reduce": "{}" } });
    }

    #[test]
    fn test_c001_ignores_other_commands() {
        let ex = command_example(doc! { "aggregate": "orders", "pipeline": [], "$reduce": 1 });
        assert!(!C001GroupReduce.matches(&RuleContext::new(&ex, &ex.command)));
    }

    #[test]
    fn test_c001_ignores_group_without_reduce() {
        let ex = command_example(doc! { "group": { "ns": "orders", "key": { "a": 1 } } });
        assert!(!C001GroupReduce.matches(&RuleContext::new(&ex, &ex.command)));

        let ex = command_example(doc! { "group": "orders" });
        assert!(!C001GroupReduce.matches(&RuleContext::new(&ex, &ex.command)));
    }
}
