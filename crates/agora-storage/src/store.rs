//! The Store and StoreTxn traits that backends implement.

use crate::StoreError;
use crate::types::*;

/// The storage trait the action engine and platform services depend on.
///
/// Methods here run as single statements against the pool. Anything that
/// must land atomically goes through [`Store::begin`] and a [`StoreTxn`].
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ──────────────────────────────── Lifecycle ────────────────────────────────

    /// Open an all-or-nothing write scope. Dropping it uncommitted rolls back.
    async fn begin(&self) -> Result<Box<dyn StoreTxn>, StoreError>;

    // ───────────────────────────────── Groups ──────────────────────────────────

    /// Create a group (returns the stored record).
    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError>;

    /// Get a group by ID.
    async fn get_group(&self, group_id: GroupId) -> Result<Group, StoreError>;

    /// Create a group's settings row with platform defaults.
    async fn create_group_config(&self, group_id: GroupId) -> Result<GroupConfig, StoreError>;

    /// Get a group's settings.
    async fn get_group_config(&self, group_id: GroupId) -> Result<GroupConfig, StoreError>;

    /// Create a group role with its members.
    async fn create_group_role(
        &self,
        params: &CreateGroupRoleParams,
        from_proposal: bool,
    ) -> Result<GroupRole, StoreError>;

    /// Get a group role by ID, members included.
    async fn get_group_role(&self, role_id: GroupRoleId) -> Result<GroupRole, StoreError>;

    // ──────────────────────────────── Proposals ────────────────────────────────

    /// Create a proposal in the `Voting` stage.
    async fn create_proposal(&self, params: &CreateProposalParams)
    -> Result<Proposal, StoreError>;

    /// Get a proposal by ID.
    async fn get_proposal(&self, proposal_id: ProposalId) -> Result<Proposal, StoreError>;

    // ───────────────────────────── Proposal actions ────────────────────────────

    /// Create a proposal action row.
    async fn create_proposal_action(
        &self,
        params: &CreateProposalActionParams,
    ) -> Result<ProposalAction, StoreError>;

    /// Get the first action matching the filter.
    async fn get_proposal_action(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<ProposalAction, StoreError>;

    /// Get all actions matching the filter, oldest first.
    async fn get_proposal_actions(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<Vec<ProposalAction>, StoreError>;

    /// Batch-fetch actions by owning proposal.
    ///
    /// The result has exactly one entry per input id, in input order; a
    /// proposal without an action yields `Err(StoreError::NotFound)` in its
    /// slot rather than shortening the list.
    async fn get_proposal_actions_batch(
        &self,
        proposal_ids: &[ProposalId],
    ) -> Result<Vec<Result<ProposalAction, StoreError>>, StoreError>;

    // ─────────────────────────── Action sub-records ────────────────────────────

    /// Create the role payload of a role action.
    async fn create_proposal_action_role(
        &self,
        params: &CreateProposalActionRoleParams,
    ) -> Result<ProposalActionRole, StoreError>;

    /// Get the role payload of an action, member changes included.
    async fn get_proposal_action_role(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionRole, StoreError>;

    /// Create the config payload of a config action.
    async fn create_proposal_action_config(
        &self,
        params: &CreateProposalActionConfigParams,
    ) -> Result<ProposalActionConfig, StoreError>;

    /// Get the config payload of an action.
    async fn get_proposal_action_config(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionConfig, StoreError>;

    /// Create the event payload of an event action.
    async fn create_proposal_action_event(
        &self,
        params: &CreateProposalActionEventParams,
    ) -> Result<ProposalActionEvent, StoreError>;

    /// Get the event payload of an action, hosts included.
    async fn get_proposal_action_event(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionEvent, StoreError>;

    // ───────────────────────────────── Images ──────────────────────────────────

    /// Create an image metadata row.
    async fn create_image(&self, params: &CreateImageParams) -> Result<Image, StoreError>;

    /// Get the newest image matching the filter.
    async fn get_image(&self, filter: &ImageFilter) -> Result<Image, StoreError>;

    /// Get the cover photo uploaded with an action.
    async fn get_action_cover_photo(
        &self,
        action_id: ProposalActionId,
    ) -> Result<Image, StoreError>;

    // ───────────────────────────────── Events ──────────────────────────────────

    /// Get an event by ID.
    async fn get_event(&self, event_id: EventId) -> Result<Event, StoreError>;
}

/// One atomic write scope over the store.
///
/// All reads see the transaction's own writes. `commit` makes everything
/// visible at once; dropping the value without committing rolls back.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait StoreTxn: Send {
    // ──────────────────────────────── Reads ────────────────────────────────

    /// Get a group role by ID, members included.
    async fn get_group_role(&mut self, role_id: GroupRoleId) -> Result<GroupRole, StoreError>;

    /// Get a group's settings.
    async fn get_group_config(&mut self, group_id: GroupId) -> Result<GroupConfig, StoreError>;

    /// Get the newest image matching the filter.
    async fn get_image(&mut self, filter: &ImageFilter) -> Result<Image, StoreError>;

    /// Get the role payload of an action, member changes included.
    async fn get_proposal_action_role(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionRole, StoreError>;

    /// Get the config payload of an action.
    async fn get_proposal_action_config(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionConfig, StoreError>;

    /// Get the event payload of an action, hosts included.
    async fn get_proposal_action_event(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionEvent, StoreError>;

    // ──────────────────────────────── Writes ───────────────────────────────

    /// Create a group role with its members.
    async fn create_group_role(
        &mut self,
        params: &CreateGroupRoleParams,
        from_proposal: bool,
    ) -> Result<GroupRole, StoreError>;

    /// Update a role's fields; `add_member_ids` are inserted, existing
    /// members stay.
    async fn update_group_role(&mut self, params: &UpdateGroupRoleParams)
    -> Result<(), StoreError>;

    /// Remove the given users from a role.
    async fn delete_group_role_members(
        &mut self,
        role_id: GroupRoleId,
        user_ids: &[UserId],
    ) -> Result<(), StoreError>;

    /// Apply every `Some` field to the group's settings in one statement.
    async fn update_group_config(
        &mut self,
        params: &UpdateGroupConfigParams,
    ) -> Result<(), StoreError>;

    /// Record pre-change role field values on the action's role payload.
    async fn record_role_diffs(
        &mut self,
        role_id: ProposalActionRoleId,
        diffs: &[RoleDiff],
    ) -> Result<(), StoreError>;

    /// Record pre-change settings values on the action's config payload.
    async fn record_config_diffs(
        &mut self,
        config_id: ProposalActionConfigId,
        diffs: &[ConfigDiff],
    ) -> Result<(), StoreError>;

    /// Point an image at a group, making it live there.
    async fn attach_image_to_group(
        &mut self,
        image_id: ImageId,
        group_id: GroupId,
    ) -> Result<(), StoreError>;

    /// Delete an image metadata row.
    async fn delete_image(&mut self, image_id: ImageId) -> Result<(), StoreError>;

    /// Create a live event.
    async fn create_event(&mut self, params: &CreateEventParams) -> Result<Event, StoreError>;

    // ─────────────────────────────── Lifecycle ─────────────────────────────

    /// Make every write in this scope visible at once.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard every write in this scope.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}
