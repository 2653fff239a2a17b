//! Command reconstruction
//!
//! Dispatches a projected example to the rewrite rule for its operation kind
//! and wraps the result under `explain`.

pub mod rules;

use crate::services::explain::models::*;
use bson::{Document, doc};
use rules::{RewriteRule, RuleContext, get_all_rules};

/// Rule engine turning profiler examples into explain commands
pub struct Reconstructor {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconstructor {
    /// Create a reconstructor with the full rule table
    pub fn new() -> Self {
        Self { rules: get_all_rules() }
    }

    /// Create with a custom rule table (used in tests)
    #[cfg(test)]
    pub fn with_rules(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self { rules }
    }

    /// Rebuild the explain command for one example
    ///
    /// Never fails: shapes that cannot be rebuilt faithfully produce a
    /// documented approximation, listed in the result.
    pub fn reconstruct(&self, example: &ProjectedExample) -> Reconstruction {
        let seed = Self::seed_command(example);
        let context = RuleContext::new(example, seed);
        let mut approximations = Vec::new();

        let rule = self
            .rules
            .iter()
            .find(|rule| rule.applicable_to(&example.op) && rule.matches(&context));

        let command = match rule {
            Some(rule) => {
                let rewrite = rule.rewrite(&context);
                tracing::debug!(
                    "Rule {} ({}) rebuilt {} on {}",
                    rule.id(),
                    rule.name(),
                    example.op,
                    example.ns
                );
                if let Some(approximation) = rewrite.approximation {
                    tracing::debug!(
                        "Rule {} approximated {} on {}: {}",
                        rule.id(),
                        example.op,
                        example.ns,
                        approximation
                    );
                    approximations.push(approximation);
                }
                rewrite.command
            },
            None => seed.clone(),
        };

        Reconstruction { command: doc! { "explain": command }, approximations }
    }

    /// Command payload the rules start from
    ///
    /// Legacy query and insert records carry their payload in `query` only.
    fn seed_command(example: &ProjectedExample) -> &Document {
        match example.op {
            OperationKind::Query | OperationKind::Insert if example.command.is_empty() => {
                &example.query
            },
            _ => &example.command,
        }
    }
}
