//! Common test helpers for the engine tests.
//!
//! This module provides an engine wired to an in-memory SQLite store plus
//! seed helpers, so individual tests stay focused on the behavior they
//! check.

use std::sync::{Arc, Mutex};

use agora_storage::*;
use agora_store_sqlite::SqliteStore;
use async_trait::async_trait;

use crate::ProposalActions;
use crate::media::{ImageUpload, MediaError, MediaStore};

/// Test helper: media store that records saves without touching disk.
#[derive(Default)]
pub struct MemoryMediaStore {
    saved: Mutex<Vec<String>>,
}

impl MemoryMediaStore {
    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn save(&self, upload: ImageUpload) -> Result<String, MediaError> {
        let mut saved = self.saved.lock().unwrap();
        let filename = format!("{}-{}", saved.len(), upload.filename);
        saved.push(filename.clone());
        Ok(filename)
    }
}

/// Test helper: Create an engine over a fresh in-memory store.
pub async fn create_test_engine() -> (ProposalActions, Arc<SqliteStore>, Arc<MemoryMediaStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let media = Arc::new(MemoryMediaStore::default());
    let engine = ProposalActions::new(store.clone(), media.clone());
    (engine, store, media)
}

/// Test helper: Engine over a prepared mock store.
pub fn mock_engine(store: MockStore) -> ProposalActions {
    ProposalActions::new(Arc::new(store), Arc::new(MemoryMediaStore::default()))
}

/// Test helper: Fresh user id. Membership rows only carry the id, so no
/// user record needs to exist.
pub fn user() -> UserId {
    UserId(uuid::Uuid::new_v4())
}

/// Test helper: Create a group with its default settings row.
pub async fn seed_group(store: &SqliteStore, name: &str) -> GroupId {
    let group = store
        .create_group(&CreateGroupParams {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap();
    store.create_group_config(group.id).await.unwrap();
    group.id
}

/// Test helper: Create a proposal in the group carrying an action of the
/// given kind, and return the action.
pub async fn seed_action(
    store: &SqliteStore,
    group_id: GroupId,
    action_type: ActionType,
) -> ProposalAction {
    let proposal = store
        .create_proposal(&CreateProposalParams { group_id })
        .await
        .unwrap();
    store
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: proposal.id,
            action_type,
        })
        .await
        .unwrap()
}

/// Test helper: Create a live group role with the given members.
pub async fn seed_group_role(
    store: &SqliteStore,
    group_id: GroupId,
    name: &str,
    member_ids: Vec<UserId>,
) -> GroupRole {
    store
        .create_group_role(
            &CreateGroupRoleParams {
                group_id,
                name: name.to_string(),
                color: "#f44336".to_string(),
                permissions: GroupPermissions::CREATE_EVENTS,
                member_ids,
            },
            false,
        )
        .await
        .unwrap()
}

/// Test helper: Attach a live cover photo to a group.
pub async fn seed_group_cover_photo(store: &SqliteStore, group_id: GroupId) -> Image {
    store
        .create_image(&CreateImageParams {
            filename: format!("{}.webp", uuid::Uuid::new_v4()),
            image_type: ImageType::CoverPhoto,
            group_id: Some(group_id),
            proposal_action_id: None,
        })
        .await
        .unwrap()
}

/// Test helper: Attach a proposed cover photo upload to an action.
pub async fn seed_action_cover_photo(store: &SqliteStore, action_id: ProposalActionId) -> Image {
    store
        .create_image(&CreateImageParams {
            filename: format!("{}.webp", uuid::Uuid::new_v4()),
            image_type: ImageType::CoverPhoto,
            group_id: None,
            proposal_action_id: Some(action_id),
        })
        .await
        .unwrap()
}
