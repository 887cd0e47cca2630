//! Predicate primitives and the rule algebra.
//!
//! Predicates answer "may this requester do this" with a tri-state outcome,
//! keeping "nobody is logged in" distinguishable from "logged in but lacking
//! the capability". Rules compose predicates into the expression attached to
//! a protected field.

use agora_storage::{GroupId, GroupPermissions, ServerPermissions};

use crate::path::ResolvePath;
use crate::permissions::UserPermissions;

/// Outcome of a predicate or composed rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredicateOutcome {
    Granted,
    Denied,
    Unauthenticated,
}

/// Whether the snapshot grants a server-wide capability.
pub fn has_server_permission(
    permissions: Option<&UserPermissions>,
    capability: ServerPermissions,
) -> PredicateOutcome {
    let Some(permissions) = permissions else {
        return PredicateOutcome::Unauthenticated;
    };
    if permissions.server.contains(capability) {
        PredicateOutcome::Granted
    } else {
        PredicateOutcome::Denied
    }
}

/// Whether the snapshot grants a capability within one group.
///
/// A missing group entry means "not a member" and denies exactly like a
/// membership that lacks the capability.
pub fn has_group_permission(
    permissions: Option<&UserPermissions>,
    capability: GroupPermissions,
    group_id: GroupId,
) -> PredicateOutcome {
    let Some(permissions) = permissions else {
        return PredicateOutcome::Unauthenticated;
    };
    match permissions.groups.get(&group_id) {
        Some(granted) if granted.contains(capability) => PredicateOutcome::Granted,
        _ => PredicateOutcome::Denied,
    }
}

/// Everything a rule may consult, assembled per field resolution.
///
/// `group_is_public` carries the privacy of the group owning whatever record
/// is being resolved, pre-fetched by the context builder so that rule
/// evaluation itself never suspends. `None` when the field has no owning
/// group or none was resolved.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub permissions: Option<&'a UserPermissions>,
    pub group_id: Option<GroupId>,
    pub group_is_public: Option<bool>,
    pub path: &'a ResolvePath,
}

/// A predicate over the evaluation context.
pub type Predicate = fn(&RuleContext<'_>) -> PredicateOutcome;

/// Access rule attached to a protected field or type.
#[derive(Clone, Debug)]
pub enum Rule {
    /// Grants unconditionally.
    Allow,
    /// Grants when any branch grants.
    Or(Vec<Rule>),
    /// Defers to a predicate.
    Predicate(Predicate),
}

impl Rule {
    /// Evaluate the rule against a context.
    ///
    /// `Or` takes the first grant. When no branch grants, an unauthenticated
    /// branch outweighs plain denials: the requester's actual problem is the
    /// missing login, not a capability.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> PredicateOutcome {
        match self {
            Rule::Allow => PredicateOutcome::Granted,
            Rule::Predicate(predicate) => predicate(ctx),
            Rule::Or(branches) => {
                let mut outcome = PredicateOutcome::Denied;
                for branch in branches {
                    match branch.evaluate(ctx) {
                        PredicateOutcome::Granted => return PredicateOutcome::Granted,
                        PredicateOutcome::Unauthenticated => {
                            outcome = PredicateOutcome::Unauthenticated;
                        }
                        PredicateOutcome::Denied => {}
                    }
                }
                outcome
            }
        }
    }
}

/// `Rule::Or` over plain predicates.
pub fn any_of(predicates: &[Predicate]) -> Rule {
    Rule::Or(predicates.iter().copied().map(Rule::Predicate).collect())
}
