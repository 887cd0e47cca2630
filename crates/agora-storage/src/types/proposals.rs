//! Proposal types.
//!
//! Voting and stage transitions are decided elsewhere; storage only needs
//! the owning aggregate the action hangs off of.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{GroupId, ProposalId};

/// Lifecycle stage of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProposalStage {
    Voting,
    Ratified,
    Revision,
    Closed,
}

/// Error type for parsing ProposalStage from its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProposalStageError(pub String);

impl std::fmt::Display for ParseProposalStageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid proposal stage: {}", self.0)
    }
}

impl std::error::Error for ParseProposalStageError {}

impl ProposalStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStage::Voting => "voting",
            ProposalStage::Ratified => "ratified",
            ProposalStage::Revision => "revision",
            ProposalStage::Closed => "closed",
        }
    }
}

impl FromStr for ProposalStage {
    type Err = ParseProposalStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voting" => Ok(ProposalStage::Voting),
            "ratified" => Ok(ProposalStage::Ratified),
            "revision" => Ok(ProposalStage::Revision),
            "closed" => Ok(ProposalStage::Closed),
            _ => Err(ParseProposalStageError(s.to_string())),
        }
    }
}

/// Proposal record
#[derive(Clone, Debug)]
pub struct Proposal {
    pub id: ProposalId,
    pub group_id: GroupId,
    pub stage: ProposalStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a proposal. New proposals start in `Voting`.
#[derive(Clone, Debug)]
pub struct CreateProposalParams {
    pub group_id: GroupId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_roundtrip() {
        for s in [
            ProposalStage::Voting,
            ProposalStage::Ratified,
            ProposalStage::Revision,
            ProposalStage::Closed,
        ] {
            assert_eq!(s.as_str().parse::<ProposalStage>().unwrap(), s);
        }
        assert!("tabled".parse::<ProposalStage>().is_err());
    }
}
