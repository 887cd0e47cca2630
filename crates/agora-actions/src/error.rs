//! Engine error type.

use thiserror::Error;

use agora_storage::StoreError;

use crate::media::MediaError;

/// Errors from implementing or reading proposal actions.
///
/// The missing-record variants are user-input-class conditions: the action's
/// payload does not line up with the live records it targets. Each keeps its
/// own message so callers can surface them as-is.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Could not find proposal action role")]
    RoleNotFound,

    #[error("Could not find group role to update")]
    GroupRoleNotFound,

    #[error("Proposal action role is missing fields required to create a role")]
    MissingRoleFields,

    #[error("Could not find proposed group settings")]
    ConfigNotFound,

    #[error("Could not find group cover photo")]
    CoverPhotoNotFound,

    #[error("Could not find proposal action event")]
    EventNotFound,

    #[error("Could not find proposal action event host")]
    EventHostNotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_messages_are_distinct() {
        let variants = [
            ActionError::RoleNotFound,
            ActionError::GroupRoleNotFound,
            ActionError::ConfigNotFound,
            ActionError::CoverPhotoNotFound,
            ActionError::EventNotFound,
            ActionError::EventHostNotFound,
        ];
        let messages: std::collections::HashSet<String> =
            variants.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), variants.len());
    }

    #[test]
    fn store_errors_convert() {
        let err: ActionError = StoreError::NotFound.into();
        assert!(matches!(err, ActionError::Storage(StoreError::NotFound)));
    }
}
