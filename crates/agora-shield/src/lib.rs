//! Field-level authorization for the platform API.
//!
//! Every protected field is decided from three inputs: the requester's
//! [`UserPermissions`] snapshot, the privacy of the group owning the record,
//! and the field's position in the request tree. Predicates return a
//! tri-state [`PredicateOutcome`] so a missing login never reads as a
//! capability denial; [`Rule`]s compose predicates; a [`Shield`] maps schema
//! types and fields to rules and turns outcomes into [`Decision`]s. The
//! [`policy`] module carries the platform's default table.

mod path;
mod permissions;
pub mod policy;
mod rules;
mod shield;

pub use path::{DEFAULT_ANCESTOR_DEPTH, PathSegment, ResolvePath, has_ancestor, has_path};
pub use permissions::UserPermissions;
pub use rules::{
    Predicate, PredicateOutcome, Rule, RuleContext, any_of, has_group_permission,
    has_server_permission,
};
pub use shield::{Decision, GuardError, Shield};
