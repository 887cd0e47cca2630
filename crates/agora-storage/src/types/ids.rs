//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Group identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub Uuid);

/// Group role identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupRoleId(pub Uuid);

/// Group config identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupConfigId(pub Uuid);

/// Proposal identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalId(pub Uuid);

/// Proposal action identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalActionId(pub Uuid);

/// Proposal action role sub-record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalActionRoleId(pub Uuid);

/// Proposal action event sub-record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalActionEventId(pub Uuid);

/// Proposal action config sub-record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalActionConfigId(pub Uuid);

/// Image identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub Uuid);

/// Event identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

macro_rules! impl_id_display {
    ($($id:ident),+ $(,)?) => {
        $(
            impl std::fmt::Display for $id {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl std::str::FromStr for $id {
                type Err = uuid::Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(Self(Uuid::try_parse(s)?))
                }
            }
        )+
    };
}

impl_id_display!(
    UserId,
    GroupId,
    GroupRoleId,
    GroupConfigId,
    ProposalId,
    ProposalActionId,
    ProposalActionRoleId,
    ProposalActionEventId,
    ProposalActionConfigId,
    ImageId,
    EventId,
);
