//! The platform's default rule table.
//!
//! Covers the governance surface: group, role, proposal, and event queries
//! and mutations, plus per-type read rules for the records those expose.
//! Type and field names are the API schema's own. Anything not listed falls
//! back to requiring authentication.
//!
//! Public-visibility predicates read `group_is_public`, the pre-resolved
//! privacy of the group owning whatever record is being resolved; one
//! predicate therefore serves groups, roles, proposals, and actions alike.

use agora_storage::{GroupPermissions, ServerPermissions};

use crate::path::{DEFAULT_ANCESTOR_DEPTH, has_ancestor, has_path};
use crate::rules::{
    PredicateOutcome, Rule, RuleContext, any_of, has_group_permission, has_server_permission,
};
use crate::shield::Shield;

// ──────────────────────────────── Predicates ────────────────────────────────

/// Any authenticated requester.
pub fn is_authenticated(ctx: &RuleContext<'_>) -> PredicateOutcome {
    if ctx.permissions.is_some() {
        PredicateOutcome::Granted
    } else {
        PredicateOutcome::Unauthenticated
    }
}

/// The owning group was resolved and is public.
pub fn is_public_group(ctx: &RuleContext<'_>) -> PredicateOutcome {
    if ctx.group_is_public == Some(true) {
        PredicateOutcome::Granted
    } else {
        PredicateOutcome::Denied
    }
}

/// Member of the target group, regardless of capabilities.
pub fn is_group_member(ctx: &RuleContext<'_>) -> PredicateOutcome {
    let Some(permissions) = ctx.permissions else {
        return PredicateOutcome::Unauthenticated;
    };
    match ctx.group_id {
        Some(group_id) if permissions.groups.contains_key(&group_id) => {
            PredicateOutcome::Granted
        }
        _ => PredicateOutcome::Denied,
    }
}

/// Cover photo of a public group, reached through the group's own subtree
/// or one of the public group surfaces.
pub fn is_public_cover_photo(ctx: &RuleContext<'_>) -> PredicateOutcome {
    let reachable = has_ancestor("group", ctx.path, DEFAULT_ANCESTOR_DEPTH)
        || has_path("publicGroups", ctx.path);
    if !reachable {
        return PredicateOutcome::Denied;
    }
    is_public_group(ctx)
}

/// Image uploaded with a proposal action of a public group.
pub fn is_public_action_image(ctx: &RuleContext<'_>) -> PredicateOutcome {
    if !has_path("proposal", ctx.path) {
        return PredicateOutcome::Denied;
    }
    is_public_group(ctx)
}

fn group_capability(ctx: &RuleContext<'_>, capability: GroupPermissions) -> PredicateOutcome {
    if ctx.permissions.is_none() {
        return PredicateOutcome::Unauthenticated;
    }
    // Capabilities are always checked against a concrete target group.
    let Some(group_id) = ctx.group_id else {
        return PredicateOutcome::Denied;
    };
    has_group_permission(ctx.permissions, capability, group_id)
}

pub fn can_manage_group_settings(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::MANAGE_SETTINGS)
}

pub fn can_manage_group_roles(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::MANAGE_ROLES)
}

pub fn can_manage_group_events(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::MANAGE_EVENTS)
}

pub fn can_create_group_events(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::CREATE_EVENTS)
}

pub fn can_approve_member_requests(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::APPROVE_MEMBER_REQUESTS)
}

pub fn can_update_group(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::UPDATE_GROUP)
}

pub fn can_delete_group(ctx: &RuleContext<'_>) -> PredicateOutcome {
    group_capability(ctx, GroupPermissions::DELETE_GROUP)
}

/// Server-wide event moderation.
pub fn can_manage_events(ctx: &RuleContext<'_>) -> PredicateOutcome {
    has_server_permission(ctx.permissions, ServerPermissions::MANAGE_EVENTS)
}

// ─────────────────────────────────── Table ───────────────────────────────────

/// Build the default table.
pub fn default_policy() -> Shield {
    let public_read = || any_of(&[is_authenticated, is_public_group]);

    Shield::new(Rule::Predicate(is_authenticated), "Forbidden")
        // Queries
        .field_rule("Query", "group", public_read())
        .field_rule("Query", "proposal", public_read())
        .field_rule("Query", "event", public_read())
        .field_rule("Query", "groupRole", Rule::Predicate(is_group_member))
        .field_rule("Query", "publicGroups", Rule::Allow)
        .field_rule("Query", "publicGroupsFeed", Rule::Allow)
        .field_rule("Query", "events", Rule::Allow)
        // Mutations
        .field_rule("Mutation", "updateGroup", Rule::Predicate(can_update_group))
        .field_rule("Mutation", "deleteGroup", Rule::Predicate(can_delete_group))
        .field_rule(
            "Mutation",
            "updateGroupConfig",
            Rule::Predicate(can_manage_group_settings),
        )
        .field_rule(
            "Mutation",
            "approveGroupMemberRequest",
            Rule::Predicate(can_approve_member_requests),
        )
        .field_rule(
            "Mutation",
            "createGroupRole",
            Rule::Predicate(can_manage_group_roles),
        )
        .field_rule(
            "Mutation",
            "updateGroupRole",
            Rule::Predicate(can_manage_group_roles),
        )
        .field_rule(
            "Mutation",
            "deleteGroupRole",
            Rule::Predicate(can_manage_group_roles),
        )
        .field_rule(
            "Mutation",
            "deleteGroupRoleMember",
            Rule::Predicate(can_manage_group_roles),
        )
        .field_rule(
            "Mutation",
            "createEvent",
            any_of(&[can_create_group_events, can_manage_group_events]),
        )
        .field_rule(
            "Mutation",
            "updateEvent",
            any_of(&[can_manage_events, can_manage_group_events]),
        )
        .field_rule(
            "Mutation",
            "deleteEvent",
            any_of(&[can_manage_events, can_manage_group_events]),
        )
        // Group reads
        .field_rule("Group", "id", public_read())
        .field_rule("Group", "name", public_read())
        .field_rule("Group", "description", public_read())
        .field_rule("Group", "coverPhoto", public_read())
        .field_rule("Group", "settings", public_read())
        .field_rule("Group", "feed", public_read())
        .field_rule("Group", "futureEvents", public_read())
        .field_rule("Group", "pastEvents", public_read())
        .field_rule("Group", "memberCount", public_read())
        .field_rule(
            "Group",
            "memberRequests",
            Rule::Predicate(can_approve_member_requests),
        )
        .field_rule(
            "Group",
            "memberRequestCount",
            Rule::Predicate(can_approve_member_requests),
        )
        .field_rule("Group", "roles", Rule::Predicate(is_group_member))
        .type_rule("GroupConfig", public_read())
        // Only a role's display fields are visible outside the group.
        .field_rule("GroupRole", "id", public_read())
        .field_rule("GroupRole", "name", public_read())
        .field_rule("GroupRole", "color", public_read())
        // Proposal and action reads
        .type_rule("Proposal", public_read())
        .type_rule("ProposalAction", public_read())
        .type_rule("ProposalActionRole", public_read())
        .type_rule("ProposalActionRoleMember", public_read())
        .type_rule("ProposalActionGroupConfig", public_read())
        .type_rule("ProposalActionEvent", public_read())
        .type_rule("ProposalActionEventHost", public_read())
        .type_rule("Event", public_read())
        // Image reads; filenames stay narrower than bare ids.
        .field_rule(
            "Image",
            "id",
            any_of(&[is_authenticated, is_public_cover_photo, is_public_action_image]),
        )
        .field_rule(
            "Image",
            "filename",
            any_of(&[is_authenticated, is_public_action_image]),
        )
}
