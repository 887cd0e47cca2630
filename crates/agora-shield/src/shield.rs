//! The rule table guarding an API schema.

use std::collections::HashMap;

use thiserror::Error;

use crate::rules::{PredicateOutcome, Rule, RuleContext};

/// Verdict for one field access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Grant,
    /// Authenticated but not allowed; carries the message the API boundary
    /// surfaces.
    Deny(String),
    Unauthenticated,
}

/// What [`Shield::guard`] returns in place of a resolver result.
#[derive(Debug, Error)]
pub enum GuardError<E: std::error::Error> {
    #[error("{0}")]
    Forbidden(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    /// The resolver itself failed; its error passes through untouched.
    #[error(transparent)]
    Resolver(E),
}

/// Field-level rule table.
///
/// Each protected field resolves to one rule: its own field rule if present,
/// else its type's rule, else the fallback. A denied outcome surfaces the
/// table's single deny message; which rule denied is not a secret worth
/// leaking.
pub struct Shield {
    field_rules: HashMap<String, HashMap<String, Rule>>,
    type_rules: HashMap<String, Rule>,
    fallback_rule: Rule,
    fallback_error: String,
}

impl Shield {
    /// An empty table with the given fallback rule and deny message.
    pub fn new(fallback_rule: Rule, fallback_error: impl Into<String>) -> Self {
        Self {
            field_rules: HashMap::new(),
            type_rules: HashMap::new(),
            fallback_rule,
            fallback_error: fallback_error.into(),
        }
    }

    /// Attach a rule to one field of a type.
    pub fn field_rule(mut self, type_name: &str, field: &str, rule: Rule) -> Self {
        self.field_rules
            .entry(type_name.to_string())
            .or_default()
            .insert(field.to_string(), rule);
        self
    }

    /// Attach a rule to every field of a type that has no field rule.
    pub fn type_rule(mut self, type_name: &str, rule: Rule) -> Self {
        self.type_rules.insert(type_name.to_string(), rule);
        self
    }

    /// Decide one field access.
    pub fn decide(&self, ctx: &RuleContext<'_>, type_name: &str, field: &str) -> Decision {
        let rule = self
            .field_rules
            .get(type_name)
            .and_then(|fields| fields.get(field))
            .or_else(|| self.type_rules.get(type_name))
            .unwrap_or(&self.fallback_rule);
        match rule.evaluate(ctx) {
            PredicateOutcome::Granted => Decision::Grant,
            PredicateOutcome::Denied => Decision::Deny(self.fallback_error.clone()),
            PredicateOutcome::Unauthenticated => Decision::Unauthenticated,
        }
    }

    /// Run a resolver behind the table.
    ///
    /// On a grant the resolver's own error passes through untouched, so a
    /// domain failure is never masked as an authorization failure. On any
    /// other decision the resolver never runs.
    pub fn guard<T, E, F>(
        &self,
        ctx: &RuleContext<'_>,
        type_name: &str,
        field: &str,
        resolver: F,
    ) -> Result<T, GuardError<E>>
    where
        E: std::error::Error,
        F: FnOnce() -> Result<T, E>,
    {
        match self.decide(ctx, type_name, field) {
            Decision::Grant => resolver().map_err(GuardError::Resolver),
            Decision::Deny(reason) => Err(GuardError::Forbidden(reason)),
            Decision::Unauthenticated => Err(GuardError::Unauthenticated),
        }
    }
}
