//! The proposal action engine.
//!
//! A passed proposal carries exactly one action describing the change the
//! group voted on. Every implement operation here opens one write scope,
//! performs all of its reads and writes inside it, and commits at the end.
//! A failure anywhere on the way drops the scope, rolling every write back
//! and leaving the proposal eligible for retry.

use std::sync::Arc;

use tracing::info;

use agora_storage::{
    ActionType, ConfigDiff, CreateEventParams, CreateGroupRoleParams, CreateImageParams, Event,
    EventAttendeeStatus, GroupId, GroupRole, Image, ImageFilter, ImageType, MemberChangeType,
    ProposalAction, ProposalActionFilter, ProposalActionId, ProposalId, RoleDiff, Store,
    StoreError, UpdateGroupConfigParams, UpdateGroupRoleParams, UserId,
};

use crate::error::ActionError;
use crate::media::{ImageUpload, MediaStore};

/// Applies passed proposal actions to the live group records.
pub struct ProposalActions {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
}

impl ProposalActions {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    // ──────────────────────────────── Implementation ────────────────────────────────

    /// Apply a passed action to its group.
    pub async fn implement(
        &self,
        action: &ProposalAction,
        group_id: GroupId,
    ) -> Result<(), ActionError> {
        match action.action_type {
            ActionType::CreateGroupRole => {
                self.implement_create_group_role(action.id, group_id).await?;
            }
            ActionType::ChangeGroupRole => {
                self.implement_change_group_role(action.id).await?;
            }
            ActionType::ChangeGroupConfig => {
                self.implement_change_group_config(action.id, group_id)
                    .await?;
            }
            ActionType::ChangeGroupCoverPhoto => {
                self.implement_change_group_cover_photo(action.id, group_id)
                    .await?;
            }
            ActionType::CreateGroupEvent => {
                self.implement_group_event(action.id, group_id).await?;
            }
        }
        Ok(())
    }

    /// Create the proposed role on the group, with every listed member.
    ///
    /// Member entries become the initial member list regardless of their
    /// change type; a creation has no existing members to remove.
    pub async fn implement_create_group_role(
        &self,
        action_id: ProposalActionId,
        group_id: GroupId,
    ) -> Result<GroupRole, ActionError> {
        let mut txn = self.store.begin().await?;

        let role = txn
            .get_proposal_action_role(action_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::RoleNotFound,
                e => ActionError::Storage(e),
            })?;
        let (Some(name), Some(color), Some(permissions)) =
            (role.name, role.color, role.permissions)
        else {
            return Err(ActionError::MissingRoleFields);
        };
        let member_ids = role.members.into_iter().map(|m| m.user_id).collect();

        let created = txn
            .create_group_role(
                &CreateGroupRoleParams {
                    group_id,
                    name,
                    color,
                    permissions,
                    member_ids,
                },
                true,
            )
            .await?;
        txn.commit().await?;

        info!(action_id = %action_id, role_id = %created.id, "created group role from proposal");
        Ok(created)
    }

    /// Apply a proposed change to an existing role.
    ///
    /// Member changes are partitioned by change type: additions ride on the
    /// role update, removals are a separate call. The pre-change value of
    /// each proposed display field is recorded on the payload as the audit
    /// trail.
    pub async fn implement_change_group_role(
        &self,
        action_id: ProposalActionId,
    ) -> Result<(), ActionError> {
        let mut txn = self.store.begin().await?;

        let action_role = txn
            .get_proposal_action_role(action_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::RoleNotFound,
                e => ActionError::Storage(e),
            })?;
        // A change action always points at a live role; a payload without
        // one reads the same as a missing payload.
        let Some(group_role_id) = action_role.group_role_id else {
            return Err(ActionError::RoleNotFound);
        };
        let live = txn.get_group_role(group_role_id).await.map_err(|e| match e {
            StoreError::NotFound => ActionError::GroupRoleNotFound,
            e => ActionError::Storage(e),
        })?;

        let to_add: Vec<UserId> = action_role
            .members
            .iter()
            .filter(|m| m.change_type == MemberChangeType::Add)
            .map(|m| m.user_id)
            .collect();
        let to_remove: Vec<UserId> = action_role
            .members
            .iter()
            .filter(|m| m.change_type == MemberChangeType::Remove)
            .map(|m| m.user_id)
            .collect();

        // Capture pre-change values for exactly the fields the proposal set.
        let mut diffs = Vec::new();
        if action_role.name.is_some() {
            diffs.push(RoleDiff::Name(live.name));
        }
        if action_role.color.is_some() {
            diffs.push(RoleDiff::Color(live.color));
        }

        txn.update_group_role(&UpdateGroupRoleParams {
            id: live.id,
            name: action_role.name,
            color: action_role.color,
            permissions: action_role.permissions,
            add_member_ids: to_add,
        })
        .await?;
        if !to_remove.is_empty() {
            txn.delete_group_role_members(live.id, &to_remove).await?;
        }
        if !diffs.is_empty() {
            txn.record_role_diffs(action_role.id, &diffs).await?;
        }
        txn.commit().await?;

        info!(action_id = %action_id, role_id = %live.id, "changed group role from proposal");
        Ok(())
    }

    /// Apply proposed settings to the group's live config.
    ///
    /// The pre-change value of every proposed field lands on the payload
    /// before the live settings change in one statement. A proposed zero
    /// counts as a change; an unset field never does.
    pub async fn implement_change_group_config(
        &self,
        action_id: ProposalActionId,
        group_id: GroupId,
    ) -> Result<(), ActionError> {
        let mut txn = self.store.begin().await?;

        let proposed = txn
            .get_proposal_action_config(action_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::ConfigNotFound,
                e => ActionError::Storage(e),
            })?;
        let live = txn.get_group_config(group_id).await?;

        let mut diffs = Vec::new();
        if proposed.admin_model.is_some() {
            diffs.push(ConfigDiff::AdminModel(live.admin_model));
        }
        if proposed.decision_making_model.is_some() {
            diffs.push(ConfigDiff::DecisionMakingModel(live.decision_making_model));
        }
        if proposed.ratification_threshold.is_some() {
            diffs.push(ConfigDiff::RatificationThreshold(live.ratification_threshold));
        }
        if proposed.reservations_limit.is_some() {
            diffs.push(ConfigDiff::ReservationsLimit(live.reservations_limit));
        }
        if proposed.stand_asides_limit.is_some() {
            diffs.push(ConfigDiff::StandAsidesLimit(live.stand_asides_limit));
        }
        if proposed.voting_time_limit.is_some() {
            diffs.push(ConfigDiff::VotingTimeLimit(live.voting_time_limit));
        }
        if proposed.privacy.is_some() {
            diffs.push(ConfigDiff::Privacy(live.privacy));
        }

        // The audit record lands first; only then does the live row change.
        txn.record_config_diffs(proposed.id, &diffs).await?;
        txn.update_group_config(&UpdateGroupConfigParams {
            group_id,
            admin_model: proposed.admin_model,
            decision_making_model: proposed.decision_making_model,
            ratification_threshold: proposed.ratification_threshold,
            reservations_limit: proposed.reservations_limit,
            stand_asides_limit: proposed.stand_asides_limit,
            voting_time_limit: proposed.voting_time_limit,
            privacy: proposed.privacy,
        })
        .await?;
        txn.commit().await?;

        info!(
            action_id = %action_id,
            group_id = %group_id,
            changed = diffs.len(),
            "changed group settings from proposal"
        );
        Ok(())
    }

    /// Swap the group's cover photo for the one proposed with the action.
    ///
    /// The proposed image is re-pointed at the group before the old one is
    /// deleted, so the group never has a gap. Re-pointing clears the image's
    /// action link, which is what makes a second run of the same action fail
    /// its lookup instead of silently re-applying.
    pub async fn implement_change_group_cover_photo(
        &self,
        action_id: ProposalActionId,
        group_id: GroupId,
    ) -> Result<(), ActionError> {
        let mut txn = self.store.begin().await?;

        let current = txn
            .get_image(&ImageFilter::group_cover_photo(group_id))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::CoverPhotoNotFound,
                e => ActionError::Storage(e),
            })?;
        let proposed = txn
            .get_image(&ImageFilter::action_cover_photo(action_id))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::CoverPhotoNotFound,
                e => ActionError::Storage(e),
            })?;

        txn.attach_image_to_group(proposed.id, group_id).await?;
        txn.delete_image(current.id).await?;
        txn.commit().await?;

        info!(
            action_id = %action_id,
            group_id = %group_id,
            image_id = %proposed.id,
            "swapped group cover photo from proposal"
        );
        Ok(())
    }

    /// Create the proposed event on the group.
    ///
    /// The event template must carry a host entry with `Host` status; the
    /// live event is created against that user. No host, no event.
    pub async fn implement_group_event(
        &self,
        action_id: ProposalActionId,
        group_id: GroupId,
    ) -> Result<Event, ActionError> {
        let mut txn = self.store.begin().await?;

        let event = txn
            .get_proposal_action_event(action_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ActionError::EventNotFound,
                e => ActionError::Storage(e),
            })?;
        let host_user_id = event
            .hosts
            .iter()
            .find(|h| h.status == EventAttendeeStatus::Host)
            .ok_or(ActionError::EventHostNotFound)?
            .user_id;

        let created = txn
            .create_event(&CreateEventParams {
                group_id,
                host_user_id,
                name: event.name,
                description: event.description,
                location: event.location,
                online: event.online,
                external_link: event.external_link,
                starts_at: event.starts_at,
                ends_at: event.ends_at,
            })
            .await?;
        txn.commit().await?;

        info!(action_id = %action_id, event_id = %created.id, "created group event from proposal");
        Ok(created)
    }

    // ──────────────────────────────────── Reads ────────────────────────────────────

    /// Get the first action matching the filter.
    pub async fn get_proposal_action(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<ProposalAction, ActionError> {
        Ok(self.store.get_proposal_action(filter).await?)
    }

    /// Get all actions matching the filter, oldest first.
    pub async fn get_proposal_actions(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<Vec<ProposalAction>, ActionError> {
        Ok(self.store.get_proposal_actions(filter).await?)
    }

    /// Batch-fetch the action of each proposal, in input order.
    ///
    /// Loader-shaped: one entry per input id; a proposal without an action
    /// gets an error entry instead of shortening the list.
    pub async fn get_proposal_actions_batch(
        &self,
        proposal_ids: &[ProposalId],
    ) -> Result<Vec<Result<ProposalAction, StoreError>>, ActionError> {
        Ok(self.store.get_proposal_actions_batch(proposal_ids).await?)
    }

    /// Get the cover photo uploaded with an action.
    pub async fn get_proposed_cover_photo(
        &self,
        action_id: ProposalActionId,
    ) -> Result<Image, ActionError> {
        Ok(self.store.get_action_cover_photo(action_id).await?)
    }

    // ─────────────────────────────── Image side-channel ───────────────────────────────

    /// Persist an upload and record it against the action.
    ///
    /// Used while the proposal is drafted: the bytes land in the media
    /// store, the row keeps the action link until implementation attaches
    /// the image to the group.
    pub async fn save_proposal_action_image(
        &self,
        action_id: ProposalActionId,
        upload: ImageUpload,
        image_type: ImageType,
    ) -> Result<Image, ActionError> {
        let filename = self.media.save(upload).await?;
        let image = self
            .store
            .create_image(&CreateImageParams {
                filename,
                image_type,
                group_id: None,
                proposal_action_id: Some(action_id),
            })
            .await?;
        Ok(image)
    }
}
