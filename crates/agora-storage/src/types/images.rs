//! Image metadata types.
//!
//! Rows here are metadata only; file bytes live wherever the media store
//! put them, addressed by `filename`.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{GroupId, ImageId, ProposalActionId};

/// What an image is attached as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageType {
    CoverPhoto,
    ProfilePicture,
}

/// Error type for parsing ImageType from its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseImageTypeError(pub String);

impl std::fmt::Display for ParseImageTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid image type: {}", self.0)
    }
}

impl std::error::Error for ParseImageTypeError {}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::CoverPhoto => "cover_photo",
            ImageType::ProfilePicture => "profile_picture",
        }
    }
}

impl FromStr for ImageType {
    type Err = ParseImageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover_photo" => Ok(ImageType::CoverPhoto),
            "profile_picture" => Ok(ImageType::ProfilePicture),
            _ => Err(ParseImageTypeError(s.to_string())),
        }
    }
}

/// Image metadata record
#[derive(Clone, Debug)]
pub struct Image {
    pub id: ImageId,
    pub filename: String,
    pub image_type: ImageType,
    /// Set when the image is live on a group (e.g. its current cover photo).
    pub group_id: Option<GroupId>,
    /// Set when the image was uploaded as part of a proposal action.
    pub proposal_action_id: Option<ProposalActionId>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating an image record
#[derive(Clone, Debug)]
pub struct CreateImageParams {
    pub filename: String,
    pub image_type: ImageType,
    pub group_id: Option<GroupId>,
    pub proposal_action_id: Option<ProposalActionId>,
}

/// Typed lookup filter for images. `None` fields match anything.
#[derive(Clone, Debug, Default)]
pub struct ImageFilter {
    pub image_type: Option<ImageType>,
    pub group_id: Option<GroupId>,
    pub proposal_action_id: Option<ProposalActionId>,
}

impl ImageFilter {
    /// The group's current cover photo.
    pub fn group_cover_photo(group_id: GroupId) -> Self {
        Self {
            image_type: Some(ImageType::CoverPhoto),
            group_id: Some(group_id),
            proposal_action_id: None,
        }
    }

    /// Cover photo uploaded with a proposal action.
    pub fn action_cover_photo(proposal_action_id: ProposalActionId) -> Self {
        Self {
            image_type: Some(ImageType::CoverPhoto),
            group_id: None,
            proposal_action_id: Some(proposal_action_id),
        }
    }
}
