//! SQLite-backed [`Store`] implementation.
//!
//! Single-statement operations run straight off the pool; multi-row creates
//! and everything reachable through [`Store::begin`] run inside a sqlite
//! transaction. The schema lives in `migrations/` and is applied on open.

mod config;
mod queries;
mod txn;

pub use config::{ConfigError, StoreConfig};
pub use txn::SqliteTxn;

use sqlx::migrate::MigrateDatabase;
use sqlx::{Sqlite, SqlitePool, sqlite::SqlitePoolOptions};
use tracing::debug;

use agora_storage::{
    CreateGroupParams, CreateGroupRoleParams, CreateImageParams, CreateProposalActionConfigParams,
    CreateProposalActionEventParams, CreateProposalActionParams, CreateProposalActionRoleParams,
    CreateProposalParams, Event, EventId, Group, GroupConfig, GroupId, GroupRole, GroupRoleId,
    Image, ImageFilter, Proposal, ProposalAction, ProposalActionConfig, ProposalActionEvent,
    ProposalActionFilter, ProposalActionId, ProposalActionRole, ProposalId, Store, StoreError,
    StoreTxn,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.agora/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        Self::open_with(&StoreConfig::default()).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    /// Open per the given config; a missing url means the default path.
    pub async fn open_with(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = match &config.url {
            Some(url) => url.clone(),
            None => Self::default_url()?,
        };
        Self::open_pool(&url, config.max_connections).await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        Self::open_pool(url, 1).await
    }

    fn default_url() -> Result<String, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".agora");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        Ok(format!("sqlite://{}", path.to_string_lossy()))
    }

    async fn open_pool(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        if !Sqlite::database_exists(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Sqlite::create_database(url)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!(url, "sqlite store open, migrations applied");

        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ──────────────────────────────── Lifecycle ────────────────────────────────

    async fn begin(&self) -> Result<Box<dyn StoreTxn>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Box::new(SqliteTxn::new(tx)))
    }

    // ───────────────────────────────── Groups ──────────────────────────────────

    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError> {
        queries::insert_group(&mut *self.conn().await?, params).await
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Group, StoreError> {
        queries::fetch_group(&mut *self.conn().await?, group_id).await
    }

    async fn create_group_config(&self, group_id: GroupId) -> Result<GroupConfig, StoreError> {
        queries::insert_group_config(&mut *self.conn().await?, group_id).await
    }

    async fn get_group_config(&self, group_id: GroupId) -> Result<GroupConfig, StoreError> {
        queries::fetch_group_config(&mut *self.conn().await?, group_id).await
    }

    async fn create_group_role(
        &self,
        params: &CreateGroupRoleParams,
        from_proposal: bool,
    ) -> Result<GroupRole, StoreError> {
        // Role row plus member rows must land together.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let role = queries::insert_group_role(&mut tx, params, from_proposal).await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(role)
    }

    async fn get_group_role(&self, role_id: GroupRoleId) -> Result<GroupRole, StoreError> {
        queries::fetch_group_role(&mut *self.conn().await?, role_id).await
    }

    // ──────────────────────────────── Proposals ────────────────────────────────

    async fn create_proposal(
        &self,
        params: &CreateProposalParams,
    ) -> Result<Proposal, StoreError> {
        queries::insert_proposal(&mut *self.conn().await?, params).await
    }

    async fn get_proposal(&self, proposal_id: ProposalId) -> Result<Proposal, StoreError> {
        queries::fetch_proposal(&mut *self.conn().await?, proposal_id).await
    }

    // ───────────────────────────── Proposal actions ────────────────────────────

    async fn create_proposal_action(
        &self,
        params: &CreateProposalActionParams,
    ) -> Result<ProposalAction, StoreError> {
        queries::insert_proposal_action(&mut *self.conn().await?, params).await
    }

    async fn get_proposal_action(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<ProposalAction, StoreError> {
        let actions = queries::fetch_proposal_actions(&mut *self.conn().await?, filter).await?;
        actions.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn get_proposal_actions(
        &self,
        filter: &ProposalActionFilter,
    ) -> Result<Vec<ProposalAction>, StoreError> {
        queries::fetch_proposal_actions(&mut *self.conn().await?, filter).await
    }

    async fn get_proposal_actions_batch(
        &self,
        proposal_ids: &[ProposalId],
    ) -> Result<Vec<Result<ProposalAction, StoreError>>, StoreError> {
        queries::fetch_actions_by_proposals(&mut *self.conn().await?, proposal_ids).await
    }

    // ─────────────────────────── Action sub-records ────────────────────────────

    async fn create_proposal_action_role(
        &self,
        params: &CreateProposalActionRoleParams,
    ) -> Result<ProposalActionRole, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let role = queries::insert_action_role(&mut tx, params).await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(role)
    }

    async fn get_proposal_action_role(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionRole, StoreError> {
        queries::fetch_action_role(&mut *self.conn().await?, action_id).await
    }

    async fn create_proposal_action_config(
        &self,
        params: &CreateProposalActionConfigParams,
    ) -> Result<ProposalActionConfig, StoreError> {
        queries::insert_action_config(&mut *self.conn().await?, params).await
    }

    async fn get_proposal_action_config(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionConfig, StoreError> {
        queries::fetch_action_config(&mut *self.conn().await?, action_id).await
    }

    async fn create_proposal_action_event(
        &self,
        params: &CreateProposalActionEventParams,
    ) -> Result<ProposalActionEvent, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let event = queries::insert_action_event(&mut tx, params).await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(event)
    }

    async fn get_proposal_action_event(
        &self,
        action_id: ProposalActionId,
    ) -> Result<ProposalActionEvent, StoreError> {
        queries::fetch_action_event(&mut *self.conn().await?, action_id).await
    }

    // ───────────────────────────────── Images ──────────────────────────────────

    async fn create_image(&self, params: &CreateImageParams) -> Result<Image, StoreError> {
        queries::insert_image(&mut *self.conn().await?, params).await
    }

    async fn get_image(&self, filter: &ImageFilter) -> Result<Image, StoreError> {
        queries::fetch_image(&mut *self.conn().await?, filter).await
    }

    async fn get_action_cover_photo(
        &self,
        action_id: ProposalActionId,
    ) -> Result<Image, StoreError> {
        queries::fetch_image(&mut *self.conn().await?, &ImageFilter::action_cover_photo(action_id))
            .await
    }

    // ───────────────────────────────── Events ──────────────────────────────────

    async fn get_event(&self, event_id: EventId) -> Result<Event, StoreError> {
        queries::fetch_event(&mut *self.conn().await?, event_id).await
    }
}
