//! Transaction-scoped store access.

use sqlx::{Sqlite, SqliteConnection, Transaction};

use agora_storage::{
    ConfigDiff, CreateEventParams, CreateGroupRoleParams, Event, GroupConfig, GroupId,
    GroupRole, GroupRoleId, Image, ImageFilter, ImageId, ProposalActionConfig,
    ProposalActionConfigId, ProposalActionEvent, ProposalActionId, ProposalActionRole,
    ProposalActionRoleId, RoleDiff, StoreError, StoreTxn, UpdateGroupConfigParams,
    UpdateGroupRoleParams, UserId,
};

use crate::queries;

/// One open sqlite transaction. Dropping it uncommitted rolls back.
pub struct SqliteTxn {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteTxn {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx: Some(tx) }
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| StoreError::Backend("transaction already closed".into()))
    }
}

#[async_trait::async_trait]
impl StoreTxn for SqliteTxn {
    // ──────────────────────────────── Reads ────────────────────────────────

    async fn get_group_role(&mut self, role_id: GroupRoleId) -> Result<GroupRole, StoreError> {
        queries::fetch_group_role(self.conn()?, role_id).await
    }

    async fn get_group_config(&mut self, group_id: GroupId) -> Result<GroupConfig, StoreError> {
        queries::fetch_group_config(self.conn()?, group_id).await
    }

    async fn get_image(&mut self, filter: &ImageFilter) -> Result<Image, StoreError> {
        queries::fetch_image(self.conn()?, filter).await
    }

    async fn get_proposal_action_role(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionRole, StoreError> {
        queries::fetch_action_role(self.conn()?, action_id).await
    }

    async fn get_proposal_action_config(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionConfig, StoreError> {
        queries::fetch_action_config(self.conn()?, action_id).await
    }

    async fn get_proposal_action_event(
        &mut self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionEvent, StoreError> {
        queries::fetch_action_event(self.conn()?, action_id).await
    }

    // ──────────────────────────────── Writes ───────────────────────────────

    async fn create_group_role(
        &mut self,
        params: &CreateGroupRoleParams,
        from_proposal: bool,
    ) -> Result<GroupRole, StoreError> {
        queries::insert_group_role(self.conn()?, params, from_proposal).await
    }

    async fn update_group_role(
        &mut self,
        params: &UpdateGroupRoleParams,
    ) -> Result<(), StoreError> {
        queries::update_group_role(self.conn()?, params).await
    }

    async fn delete_group_role_members(
        &mut self,
        role_id: GroupRoleId,
        user_ids: &[UserId],
    ) -> Result<(), StoreError> {
        queries::delete_group_role_members(self.conn()?, role_id, user_ids).await
    }

    async fn update_group_config(
        &mut self,
        params: &UpdateGroupConfigParams,
    ) -> Result<(), StoreError> {
        queries::update_group_config(self.conn()?, params).await
    }

    async fn record_role_diffs(
        &mut self,
        role_id: ProposalActionRoleId,
        diffs: &[RoleDiff],
    ) -> Result<(), StoreError> {
        queries::set_role_prior(self.conn()?, role_id, diffs).await
    }

    async fn record_config_diffs(
        &mut self,
        config_id: ProposalActionConfigId,
        diffs: &[ConfigDiff],
    ) -> Result<(), StoreError> {
        queries::set_config_prior(self.conn()?, config_id, diffs).await
    }

    async fn attach_image_to_group(
        &mut self,
        image_id: ImageId,
        group_id: GroupId,
    ) -> Result<(), StoreError> {
        queries::attach_image_to_group(self.conn()?, image_id, group_id).await
    }

    async fn delete_image(&mut self, image_id: ImageId) -> Result<(), StoreError> {
        queries::delete_image(self.conn()?, image_id).await
    }

    async fn create_event(&mut self, params: &CreateEventParams) -> Result<Event, StoreError> {
        queries::insert_event(self.conn()?, params).await
    }

    // ─────────────────────────────── Lifecycle ─────────────────────────────

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| StoreError::Backend("transaction already closed".into()))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| StoreError::Backend("transaction already closed".into()))?;
        tx.rollback()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
