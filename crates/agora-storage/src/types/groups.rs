//! Group, group config, and group role types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupConfigId, GroupId, GroupPermissions, GroupRoleId, UserId};

/// Who administers a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModel {
    Standard,
    NoAdmin,
    Rotating,
}

/// How a group decides on proposals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMakingModel {
    Consensus,
    Consent,
    MajorityVote,
}

/// Group visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrivacy {
    Private,
    Public,
}

/// Error type for parsing a group settings enum from its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSettingError(pub String);

impl std::fmt::Display for ParseSettingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid setting value: {}", self.0)
    }
}

impl std::error::Error for ParseSettingError {}

impl AdminModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminModel::Standard => "standard",
            AdminModel::NoAdmin => "no_admin",
            AdminModel::Rotating => "rotating",
        }
    }
}

impl FromStr for AdminModel {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(AdminModel::Standard),
            "no_admin" => Ok(AdminModel::NoAdmin),
            "rotating" => Ok(AdminModel::Rotating),
            _ => Err(ParseSettingError(s.to_string())),
        }
    }
}

impl DecisionMakingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionMakingModel::Consensus => "consensus",
            DecisionMakingModel::Consent => "consent",
            DecisionMakingModel::MajorityVote => "majority_vote",
        }
    }
}

impl FromStr for DecisionMakingModel {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consensus" => Ok(DecisionMakingModel::Consensus),
            "consent" => Ok(DecisionMakingModel::Consent),
            "majority_vote" => Ok(DecisionMakingModel::MajorityVote),
            _ => Err(ParseSettingError(s.to_string())),
        }
    }
}

impl GroupPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPrivacy::Private => "private",
            GroupPrivacy::Public => "public",
        }
    }
}

impl FromStr for GroupPrivacy {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(GroupPrivacy::Private),
            "public" => Ok(GroupPrivacy::Public),
            _ => Err(ParseSettingError(s.to_string())),
        }
    }
}

/// Group record
#[derive(Clone, Debug)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a group
#[derive(Clone, Debug)]
pub struct CreateGroupParams {
    pub name: String,
    pub description: Option<String>,
}

/// Live group settings. Every field has a value; defaults apply at creation.
#[derive(Clone, Debug)]
pub struct GroupConfig {
    pub id: GroupConfigId,
    pub group_id: GroupId,
    pub admin_model: AdminModel,
    pub decision_making_model: DecisionMakingModel,
    /// Percentage of members who must vote for a proposal to ratify.
    pub ratification_threshold: i32,
    /// Maximum "reservations" votes a proposal can carry and still pass.
    pub reservations_limit: i32,
    /// Maximum "stand aside" votes a proposal can carry and still pass.
    pub stand_asides_limit: i32,
    /// Voting window in minutes; 0 means no limit.
    pub voting_time_limit: i32,
    pub privacy: GroupPrivacy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupConfig {
    pub const DEFAULT_RATIFICATION_THRESHOLD: i32 = 50;
    pub const DEFAULT_RESERVATIONS_LIMIT: i32 = 2;
    pub const DEFAULT_STAND_ASIDES_LIMIT: i32 = 2;
    /// 0 = voting stays open until the proposal is closed by hand.
    pub const DEFAULT_VOTING_TIME_LIMIT: i32 = 0;
}

/// Parameters for updating a group's settings.
///
/// `None` fields are left untouched; `Some` fields are written, including
/// `Some(0)` for the numeric limits.
#[derive(Clone, Debug)]
pub struct UpdateGroupConfigParams {
    pub group_id: GroupId,
    pub admin_model: Option<AdminModel>,
    pub decision_making_model: Option<DecisionMakingModel>,
    pub ratification_threshold: Option<i32>,
    pub reservations_limit: Option<i32>,
    pub stand_asides_limit: Option<i32>,
    pub voting_time_limit: Option<i32>,
    pub privacy: Option<GroupPrivacy>,
}

impl UpdateGroupConfigParams {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
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

/// Group role record, with the capability set it grants and its members.
#[derive(Clone, Debug)]
pub struct GroupRole {
    pub id: GroupRoleId,
    pub group_id: GroupId,
    pub name: String,
    pub color: String,
    pub permissions: GroupPermissions,
    pub member_ids: Vec<UserId>,
    /// True when the role was created by an implemented proposal rather
    /// than directly by a member.
    pub from_proposal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a group role
#[derive(Clone, Debug)]
pub struct CreateGroupRoleParams {
    pub group_id: GroupId,
    pub name: String,
    pub color: String,
    pub permissions: GroupPermissions,
    pub member_ids: Vec<UserId>,
}

/// Parameters for updating a group role.
///
/// Member semantics are additive: `add_member_ids` are inserted, everyone
/// already on the role stays. Removal is a separate store call.
#[derive(Clone, Debug)]
pub struct UpdateGroupRoleParams {
    pub id: GroupRoleId,
    pub name: Option<String>,
    pub color: Option<String>,
    pub permissions: Option<GroupPermissions>,
    pub add_member_ids: Vec<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_enums_roundtrip() {
        for m in [AdminModel::Standard, AdminModel::NoAdmin, AdminModel::Rotating] {
            assert_eq!(m.as_str().parse::<AdminModel>().unwrap(), m);
        }
        for m in [
            DecisionMakingModel::Consensus,
            DecisionMakingModel::Consent,
            DecisionMakingModel::MajorityVote,
        ] {
            assert_eq!(m.as_str().parse::<DecisionMakingModel>().unwrap(), m);
        }
        for p in [GroupPrivacy::Private, GroupPrivacy::Public] {
            assert_eq!(p.as_str().parse::<GroupPrivacy>().unwrap(), p);
        }
    }

    #[test]
    fn setting_parse_is_case_sensitive() {
        assert!("Standard".parse::<AdminModel>().is_err());
        assert!("PUBLIC".parse::<GroupPrivacy>().is_err());
    }

    #[test]
    fn serde_matches_stored_form() {
        let json = serde_json::to_string(&DecisionMakingModel::MajorityVote).unwrap();
        assert_eq!(json, "\"majority_vote\"");
        let back: DecisionMakingModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DecisionMakingModel::MajorityVote);
    }
}
