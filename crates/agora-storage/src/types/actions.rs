//! Proposal action types.
//!
//! A proposal carries exactly one action. The action row names the kind;
//! the kind-specific payload lives in a sub-record (role, config, or event)
//! or, for cover photos, in an attached image. Actions are written when the
//! proposal is drafted and are read-only afterwards, except for the `prior`
//! diff list the implementation engine fills in as its audit record.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AdminModel, DecisionMakingModel, EventAttendeeStatus, GroupPermissions, GroupPrivacy,
    GroupRoleId, ProposalActionConfigId, ProposalActionEventId, ProposalActionId,
    ProposalActionRoleId, ProposalId, UserId,
};

/// The kind of change a proposal puts to a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionType {
    ChangeGroupRole,
    CreateGroupRole,
    ChangeGroupConfig,
    ChangeGroupCoverPhoto,
    CreateGroupEvent,
}

/// Error type for parsing ActionType from its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionTypeError(pub String);

impl std::fmt::Display for ParseActionTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid action type: {}", self.0)
    }
}

impl std::error::Error for ParseActionTypeError {}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::ChangeGroupRole => "change_group_role",
            ActionType::CreateGroupRole => "create_group_role",
            ActionType::ChangeGroupConfig => "change_group_config",
            ActionType::ChangeGroupCoverPhoto => "change_group_cover_photo",
            ActionType::CreateGroupEvent => "create_group_event",
        }
    }
}

impl FromStr for ActionType {
    type Err = ParseActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "change_group_role" => Ok(ActionType::ChangeGroupRole),
            "create_group_role" => Ok(ActionType::CreateGroupRole),
            "change_group_config" => Ok(ActionType::ChangeGroupConfig),
            "change_group_cover_photo" => Ok(ActionType::ChangeGroupCoverPhoto),
            "create_group_event" => Ok(ActionType::CreateGroupEvent),
            _ => Err(ParseActionTypeError(s.to_string())),
        }
    }
}

/// Proposal action record
#[derive(Clone, Debug)]
pub struct ProposalAction {
    pub id: ProposalActionId,
    pub proposal_id: ProposalId,
    pub action_type: ActionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a proposal action
#[derive(Clone, Debug)]
pub struct CreateProposalActionParams {
    pub proposal_id: ProposalId,
    pub action_type: ActionType,
}

/// Typed lookup filter for proposal actions.
#[derive(Clone, Debug, Default)]
pub struct ProposalActionFilter {
    pub id: Option<ProposalActionId>,
    pub proposal_id: Option<ProposalId>,
    pub action_type: Option<ActionType>,
}

impl ProposalActionFilter {
    pub fn by_id(id: ProposalActionId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_proposal(proposal_id: ProposalId) -> Self {
        Self {
            proposal_id: Some(proposal_id),
            ..Self::default()
        }
    }
}

// ───────────────────────────── Role actions ─────────────────────────────

/// Whether a proposed member entry adds or removes the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberChangeType {
    Add,
    Remove,
}

impl MemberChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberChangeType::Add => "add",
            MemberChangeType::Remove => "remove",
        }
    }
}

impl FromStr for MemberChangeType {
    type Err = ParseActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(MemberChangeType::Add),
            "remove" => Ok(MemberChangeType::Remove),
            _ => Err(ParseActionTypeError(s.to_string())),
        }
    }
}

/// One proposed membership change on a role action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleMemberChange {
    pub user_id: UserId,
    pub change_type: MemberChangeType,
}

/// Pre-change value of a role field, recorded at implementation time.
///
/// Only fields the proposal actually touched get an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "old", rename_all = "snake_case")]
pub enum RoleDiff {
    Name(String),
    Color(String),
}

/// Role payload of a `ChangeGroupRole` or `CreateGroupRole` action.
///
/// `group_role_id == None` marks a creation; it never means "update an
/// unknown role".
#[derive(Clone, Debug)]
pub struct ProposalActionRole {
    pub id: ProposalActionRoleId,
    pub proposal_action_id: ProposalActionId,
    pub group_role_id: Option<GroupRoleId>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub permissions: Option<GroupPermissions>,
    /// Proposed membership changes, in proposal order.
    pub members: Vec<RoleMemberChange>,
    /// Filled in by the implementation engine; empty until then.
    pub prior: Vec<RoleDiff>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a role action payload
#[derive(Clone, Debug)]
pub struct CreateProposalActionRoleParams {
    pub proposal_action_id: ProposalActionId,
    pub group_role_id: Option<GroupRoleId>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub permissions: Option<GroupPermissions>,
    pub members: Vec<RoleMemberChange>,
}

// ───────────────────────────── Config actions ─────────────────────────────

/// Pre-change value of a group setting, recorded at implementation time.
///
/// The set of variants written equals the set of fields the proposal set,
/// including proposed zeroes. Absent fields never appear.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "old", rename_all = "snake_case")]
pub enum ConfigDiff {
    AdminModel(AdminModel),
    DecisionMakingModel(DecisionMakingModel),
    RatificationThreshold(i32),
    ReservationsLimit(i32),
    StandAsidesLimit(i32),
    VotingTimeLimit(i32),
    Privacy(GroupPrivacy),
}

/// Config payload of a `ChangeGroupConfig` action.
///
/// Presence of a proposed value is the `Option`, not the value itself:
/// `Some(0)` is a real proposal to set zero, `None` leaves the setting
/// alone.
#[derive(Clone, Debug)]
pub struct ProposalActionConfig {
    pub id: ProposalActionConfigId,
    pub proposal_action_id: ProposalActionId,
    pub admin_model: Option<AdminModel>,
    pub decision_making_model: Option<DecisionMakingModel>,
    pub ratification_threshold: Option<i32>,
    pub reservations_limit: Option<i32>,
    pub stand_asides_limit: Option<i32>,
    pub voting_time_limit: Option<i32>,
    pub privacy: Option<GroupPrivacy>,
    /// Filled in by the implementation engine; empty until then.
    pub prior: Vec<ConfigDiff>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a config action payload
#[derive(Clone, Debug)]
pub struct CreateProposalActionConfigParams {
    pub proposal_action_id: ProposalActionId,
    pub admin_model: Option<AdminModel>,
    pub decision_making_model: Option<DecisionMakingModel>,
    pub ratification_threshold: Option<i32>,
    pub reservations_limit: Option<i32>,
    pub stand_asides_limit: Option<i32>,
    pub voting_time_limit: Option<i32>,
    pub privacy: Option<GroupPrivacy>,
}

impl CreateProposalActionConfigParams {
    pub fn new(proposal_action_id: ProposalActionId) -> Self {
        Self {
            proposal_action_id,
            admin_model: None,
            decision_making_model: None,
            ratification_threshold: None,
            reservations_limit: None,
            stand_asides_limit: None,
            voting_time_limit: None,
            privacy: None,
        }
    }
}

// ───────────────────────────── Event actions ─────────────────────────────

/// One proposed host/attendee entry on an event action, in proposal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalActionEventHost {
    pub user_id: UserId,
    pub status: EventAttendeeStatus,
}

/// Event payload of a `CreateGroupEvent` action: the template the live
/// event is created from.
#[derive(Clone, Debug)]
pub struct ProposalActionEvent {
    pub id: ProposalActionEventId,
    pub proposal_action_id: ProposalActionId,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub online: bool,
    pub external_link: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub hosts: Vec<ProposalActionEventHost>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an event action payload
#[derive(Clone, Debug)]
pub struct CreateProposalActionEventParams {
    pub proposal_action_id: ProposalActionId,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub online: bool,
    pub external_link: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub hosts: Vec<ProposalActionEventHost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_roundtrip() {
        for t in [
            ActionType::ChangeGroupRole,
            ActionType::CreateGroupRole,
            ActionType::ChangeGroupConfig,
            ActionType::ChangeGroupCoverPhoto,
            ActionType::CreateGroupEvent,
        ] {
            assert_eq!(t.as_str().parse::<ActionType>().unwrap(), t);
        }
        assert!("change_everything".parse::<ActionType>().is_err());
    }

    #[test]
    fn config_diff_serializes_field_and_old_value() {
        let diff = ConfigDiff::VotingTimeLimit(30);
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["field"], "voting_time_limit");
        assert_eq!(json["old"], 30);
    }

    #[test]
    fn role_diff_roundtrip() {
        let diffs = vec![
            RoleDiff::Name("organizers".into()),
            RoleDiff::Color("#f44336".into()),
        ];
        let json = serde_json::to_string(&diffs).unwrap();
        let back: Vec<RoleDiff> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diffs);
    }

    #[test]
    fn config_diff_enum_old_value_uses_stored_form() {
        let diff = ConfigDiff::Privacy(GroupPrivacy::Private);
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["old"], "private");
    }
}
