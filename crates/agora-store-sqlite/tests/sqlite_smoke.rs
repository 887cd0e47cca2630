use chrono::{Duration, Utc};

use agora_storage::{
    ActionType, AdminModel, ConfigDiff, CreateEventParams, CreateGroupParams,
    CreateGroupRoleParams, CreateImageParams, CreateProposalActionConfigParams,
    CreateProposalActionEventParams, CreateProposalActionParams, CreateProposalActionRoleParams,
    CreateProposalParams, DecisionMakingModel, EventAttendeeStatus, EventId, GroupConfig, GroupId,
    GroupPermissions, GroupPrivacy, GroupRoleId, ImageFilter, ImageType, MemberChangeType,
    ProposalActionEventHost, ProposalActionFilter, ProposalId, ProposalStage, RoleDiff,
    RoleMemberChange, Store, StoreError, StoreTxn, UpdateGroupConfigParams, UpdateGroupRoleParams,
    UserId,
};
use agora_store_sqlite::{SqliteStore, StoreConfig};

fn user() -> UserId {
    UserId(uuid::Uuid::new_v4())
}

fn group_params(name: &str) -> CreateGroupParams {
    CreateGroupParams {
        name: name.to_string(),
        description: Some("a test group".to_string()),
    }
}

fn role_params(group_id: GroupId, name: &str, member_ids: Vec<UserId>) -> CreateGroupRoleParams {
    CreateGroupRoleParams {
        group_id,
        name: name.to_string(),
        color: "#f44336".to_string(),
        permissions: GroupPermissions::CREATE_EVENTS | GroupPermissions::MANAGE_EVENTS,
        member_ids,
    }
}

// ==================== Group + Config Tests ====================

#[tokio::test]
async fn group_and_config_lifecycle() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("gardeners")).await.unwrap();
    assert_eq!(group.name, "gardeners");
    assert_eq!(group.description, Some("a test group".to_string()));

    let fetched = s.get_group(group.id).await.unwrap();
    assert_eq!(fetched.name, "gardeners");

    // Settings row starts at platform defaults
    let config = s.create_group_config(group.id).await.unwrap();
    assert_eq!(config.group_id, group.id);
    assert_eq!(config.admin_model, AdminModel::Standard);
    assert_eq!(config.decision_making_model, DecisionMakingModel::Consensus);
    assert_eq!(
        config.ratification_threshold,
        GroupConfig::DEFAULT_RATIFICATION_THRESHOLD
    );
    assert_eq!(
        config.reservations_limit,
        GroupConfig::DEFAULT_RESERVATIONS_LIMIT
    );
    assert_eq!(
        config.stand_asides_limit,
        GroupConfig::DEFAULT_STAND_ASIDES_LIMIT
    );
    assert_eq!(
        config.voting_time_limit,
        GroupConfig::DEFAULT_VOTING_TIME_LIMIT
    );
    assert_eq!(config.privacy, GroupPrivacy::Private);

    // Partial update writes only the Some fields, including a real zero
    let mut update = UpdateGroupConfigParams::new(group.id);
    update.decision_making_model = Some(DecisionMakingModel::MajorityVote);
    update.stand_asides_limit = Some(0);
    update.privacy = Some(GroupPrivacy::Public);

    let mut txn = s.begin().await.unwrap();
    txn.update_group_config(&update).await.unwrap();
    txn.commit().await.unwrap();

    let config = s.get_group_config(group.id).await.unwrap();
    assert_eq!(config.decision_making_model, DecisionMakingModel::MajorityVote);
    assert_eq!(config.stand_asides_limit, 0);
    assert_eq!(config.privacy, GroupPrivacy::Public);
    // untouched fields keep their values
    assert_eq!(config.admin_model, AdminModel::Standard);
    assert_eq!(
        config.ratification_threshold,
        GroupConfig::DEFAULT_RATIFICATION_THRESHOLD
    );
}

#[tokio::test]
async fn group_role_crud_and_member_changes() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("coop")).await.unwrap();
    let (alice, bob, carol) = (user(), user(), user());

    let role = s
        .create_group_role(&role_params(group.id, "organizers", vec![alice, bob]), false)
        .await
        .unwrap();
    assert!(!role.from_proposal);
    assert_eq!(role.member_ids, vec![alice, bob]);

    let fetched = s.get_group_role(role.id).await.unwrap();
    assert_eq!(fetched.name, "organizers");
    assert_eq!(fetched.member_ids, vec![alice, bob]);
    assert!(fetched.permissions.contains(GroupPermissions::CREATE_EVENTS));

    // Rename, recolor, and add members; re-adding bob is a no-op
    let mut txn = s.begin().await.unwrap();
    txn.update_group_role(&UpdateGroupRoleParams {
        id: role.id,
        name: Some("coordinators".to_string()),
        color: Some("#2196f3".to_string()),
        permissions: Some(GroupPermissions::MANAGE_ROLES),
        add_member_ids: vec![bob, carol],
    })
    .await
    .unwrap();
    txn.commit().await.unwrap();

    let fetched = s.get_group_role(role.id).await.unwrap();
    assert_eq!(fetched.name, "coordinators");
    assert_eq!(fetched.color, "#2196f3");
    assert_eq!(fetched.permissions, GroupPermissions::MANAGE_ROLES);
    assert_eq!(fetched.member_ids, vec![alice, bob, carol]);

    // Remove two members in one call
    let mut txn = s.begin().await.unwrap();
    txn.delete_group_role_members(role.id, &[alice, carol])
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let fetched = s.get_group_role(role.id).await.unwrap();
    assert_eq!(fetched.member_ids, vec![bob]);

    // Roles created through the proposal pipeline carry the flag
    let proposed = s
        .create_group_role(&role_params(group.id, "stewards", vec![]), true)
        .await
        .unwrap();
    assert!(proposed.from_proposal);
}

// ==================== Proposal Action Tests ====================

#[tokio::test]
async fn proposal_action_filters_and_ordering() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("readers")).await.unwrap();
    let p1 = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    assert_eq!(p1.stage, ProposalStage::Voting);

    let a1 = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: p1.id,
            action_type: ActionType::ChangeGroupConfig,
        })
        .await
        .unwrap();

    let by_id = s
        .get_proposal_action(&ProposalActionFilter::by_id(a1.id))
        .await
        .unwrap();
    assert_eq!(by_id.id, a1.id);
    assert_eq!(by_id.action_type, ActionType::ChangeGroupConfig);

    let by_proposal = s
        .get_proposal_action(&ProposalActionFilter::by_proposal(p1.id))
        .await
        .unwrap();
    assert_eq!(by_proposal.id, a1.id);

    // Type filter composes with the proposal filter
    let mut filter = ProposalActionFilter::by_proposal(p1.id);
    filter.action_type = Some(ActionType::CreateGroupEvent);
    let err = s.get_proposal_action(&filter).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let all = s
        .get_proposal_actions(&ProposalActionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn batch_fetch_preserves_input_order() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("batch")).await.unwrap();
    let p1 = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let p2 = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let p3 = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();

    // Only p1 and p3 get actions; p2 stays bare
    let a1 = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: p1.id,
            action_type: ActionType::CreateGroupRole,
        })
        .await
        .unwrap();
    let a3 = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: p3.id,
            action_type: ActionType::ChangeGroupCoverPhoto,
        })
        .await
        .unwrap();

    let batch = s
        .get_proposal_actions_batch(&[p1.id, p2.id, p3.id])
        .await
        .unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].as_ref().unwrap().id, a1.id);
    assert!(matches!(batch[1], Err(StoreError::NotFound)));
    assert_eq!(batch[2].as_ref().unwrap().id, a3.id);

    // Input order wins over storage order
    let batch = s
        .get_proposal_actions_batch(&[p3.id, p1.id])
        .await
        .unwrap();
    assert_eq!(batch[0].as_ref().unwrap().id, a3.id);
    assert_eq!(batch[1].as_ref().unwrap().id, a1.id);

    let batch = s.get_proposal_actions_batch(&[]).await.unwrap();
    assert!(batch.is_empty());
}

// ==================== Action Payload Tests ====================

#[tokio::test]
async fn role_payload_roundtrip_and_prior_recording() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("payload")).await.unwrap();
    let role = s
        .create_group_role(&role_params(group.id, "mods", vec![]), false)
        .await
        .unwrap();
    let proposal = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let action = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: proposal.id,
            action_type: ActionType::ChangeGroupRole,
        })
        .await
        .unwrap();

    let (dana, erin) = (user(), user());
    let payload = s
        .create_proposal_action_role(&CreateProposalActionRoleParams {
            proposal_action_id: action.id,
            group_role_id: Some(role.id),
            name: Some("moderators".to_string()),
            color: None,
            permissions: None,
            members: vec![
                RoleMemberChange {
                    user_id: dana,
                    change_type: MemberChangeType::Add,
                },
                RoleMemberChange {
                    user_id: erin,
                    change_type: MemberChangeType::Remove,
                },
            ],
        })
        .await
        .unwrap();
    assert!(payload.prior.is_empty());

    let fetched = s.get_proposal_action_role(action.id).await.unwrap();
    assert_eq!(fetched.group_role_id, Some(role.id));
    assert_eq!(fetched.name, Some("moderators".to_string()));
    assert_eq!(fetched.color, None);
    assert_eq!(fetched.members.len(), 2);
    assert_eq!(fetched.members[0].user_id, dana);
    assert_eq!(fetched.members[0].change_type, MemberChangeType::Add);
    assert_eq!(fetched.members[1].change_type, MemberChangeType::Remove);

    // The engine records pre-change values on the payload at implement time
    let mut txn = s.begin().await.unwrap();
    txn.record_role_diffs(payload.id, &[RoleDiff::Name("mods".to_string())])
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let fetched = s.get_proposal_action_role(action.id).await.unwrap();
    assert_eq!(fetched.prior, vec![RoleDiff::Name("mods".to_string())]);
}

#[tokio::test]
async fn config_payload_roundtrip_and_prior_recording() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("settings")).await.unwrap();
    s.create_group_config(group.id).await.unwrap();
    let proposal = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let action = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: proposal.id,
            action_type: ActionType::ChangeGroupConfig,
        })
        .await
        .unwrap();

    // Only two fields proposed; one of them a zero
    let mut params = CreateProposalActionConfigParams::new(action.id);
    params.voting_time_limit = Some(0);
    params.privacy = Some(GroupPrivacy::Public);
    let payload = s.create_proposal_action_config(&params).await.unwrap();

    let fetched = s.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(fetched.id, payload.id);
    assert_eq!(fetched.voting_time_limit, Some(0));
    assert_eq!(fetched.privacy, Some(GroupPrivacy::Public));
    assert_eq!(fetched.admin_model, None);
    assert_eq!(fetched.ratification_threshold, None);
    assert!(fetched.prior.is_empty());

    let mut txn = s.begin().await.unwrap();
    txn.record_config_diffs(
        payload.id,
        &[
            ConfigDiff::VotingTimeLimit(GroupConfig::DEFAULT_VOTING_TIME_LIMIT),
            ConfigDiff::Privacy(GroupPrivacy::Private),
        ],
    )
    .await
    .unwrap();
    txn.commit().await.unwrap();

    let fetched = s.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(fetched.prior.len(), 2);
    assert_eq!(fetched.prior[1], ConfigDiff::Privacy(GroupPrivacy::Private));
}

#[tokio::test]
async fn event_payload_keeps_host_order() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("events")).await.unwrap();
    let proposal = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let action = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: proposal.id,
            action_type: ActionType::CreateGroupEvent,
        })
        .await
        .unwrap();

    let (going, hosting) = (user(), user());
    let starts = Utc::now() + Duration::days(7);
    s.create_proposal_action_event(&CreateProposalActionEventParams {
        proposal_action_id: action.id,
        name: "garden day".to_string(),
        description: "planting party".to_string(),
        location: Some("the commons".to_string()),
        online: false,
        external_link: None,
        starts_at: starts,
        ends_at: Some(starts + Duration::hours(3)),
        hosts: vec![
            ProposalActionEventHost {
                user_id: going,
                status: EventAttendeeStatus::Going,
            },
            ProposalActionEventHost {
                user_id: hosting,
                status: EventAttendeeStatus::Host,
            },
        ],
    })
    .await
    .unwrap();

    let fetched = s.get_proposal_action_event(action.id).await.unwrap();
    assert_eq!(fetched.name, "garden day");
    assert_eq!(fetched.starts_at.timestamp(), starts.timestamp());
    assert_eq!(fetched.hosts.len(), 2);
    assert_eq!(fetched.hosts[0].status, EventAttendeeStatus::Going);
    assert_eq!(fetched.hosts[1].user_id, hosting);
    assert_eq!(fetched.hosts[1].status, EventAttendeeStatus::Host);
}

// ==================== Image Tests ====================

#[tokio::test]
async fn cover_photo_attach_consumes_the_upload() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("photos")).await.unwrap();
    let old = s
        .create_image(&CreateImageParams {
            filename: "old.webp".to_string(),
            image_type: ImageType::CoverPhoto,
            group_id: Some(group.id),
            proposal_action_id: None,
        })
        .await
        .unwrap();

    let proposal = s
        .create_proposal(&CreateProposalParams { group_id: group.id })
        .await
        .unwrap();
    let action = s
        .create_proposal_action(&CreateProposalActionParams {
            proposal_id: proposal.id,
            action_type: ActionType::ChangeGroupCoverPhoto,
        })
        .await
        .unwrap();
    let proposed = s
        .create_image(&CreateImageParams {
            filename: "new.webp".to_string(),
            image_type: ImageType::CoverPhoto,
            group_id: None,
            proposal_action_id: Some(action.id),
        })
        .await
        .unwrap();

    let upload = s.get_action_cover_photo(action.id).await.unwrap();
    assert_eq!(upload.id, proposed.id);

    // Re-point then delete, all in one scope
    let mut txn = s.begin().await.unwrap();
    let current = txn
        .get_image(&ImageFilter::group_cover_photo(group.id))
        .await
        .unwrap();
    assert_eq!(current.id, old.id);
    txn.attach_image_to_group(proposed.id, group.id).await.unwrap();
    txn.delete_image(current.id).await.unwrap();
    txn.commit().await.unwrap();

    let live = s
        .get_image(&ImageFilter::group_cover_photo(group.id))
        .await
        .unwrap();
    assert_eq!(live.id, proposed.id);
    assert_eq!(live.group_id, Some(group.id));
    assert_eq!(live.proposal_action_id, None);

    // The upload is spent; the action no longer owns an image
    let err = s.get_action_cover_photo(action.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn newest_image_wins_for_a_group() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("gallery")).await.unwrap();
    s.create_image(&CreateImageParams {
        filename: "first.webp".to_string(),
        image_type: ImageType::CoverPhoto,
        group_id: Some(group.id),
        proposal_action_id: None,
    })
    .await
    .unwrap();

    // Same-second inserts are ordered by their time-based ids
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = s
        .create_image(&CreateImageParams {
            filename: "second.webp".to_string(),
            image_type: ImageType::CoverPhoto,
            group_id: Some(group.id),
            proposal_action_id: None,
        })
        .await
        .unwrap();

    let newest = s
        .get_image(&ImageFilter::group_cover_photo(group.id))
        .await
        .unwrap();
    assert_eq!(newest.id, second.id);
    assert_eq!(newest.filename, "second.webp");
}

// ==================== Transaction Tests ====================

#[tokio::test]
async fn txn_commit_makes_writes_visible() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("atomic")).await.unwrap();
    let host = user();
    let starts = Utc::now() + Duration::days(1);

    let mut txn = s.begin().await.unwrap();
    let event = txn
        .create_event(&CreateEventParams {
            group_id: group.id,
            host_user_id: host,
            name: "assembly".to_string(),
            description: "monthly meeting".to_string(),
            location: None,
            online: true,
            external_link: Some("https://meet.example.org/assembly".to_string()),
            starts_at: starts,
            ends_at: None,
        })
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let fetched = s.get_event(event.id).await.unwrap();
    assert_eq!(fetched.name, "assembly");
    assert_eq!(fetched.host_user_id, host);
    assert!(fetched.online);
    assert_eq!(fetched.ends_at, None);
}

#[tokio::test]
async fn txn_rolls_back_on_drop_and_on_request() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("undo")).await.unwrap();
    let starts = Utc::now() + Duration::days(1);
    let event_params = CreateEventParams {
        group_id: group.id,
        host_user_id: user(),
        name: "phantom".to_string(),
        description: "never happens".to_string(),
        location: None,
        online: false,
        external_link: None,
        starts_at: starts,
        ends_at: None,
    };

    // Dropped without commit
    let event_id = {
        let mut txn = s.begin().await.unwrap();
        let event = txn.create_event(&event_params).await.unwrap();
        event.id
    };
    let err = s.get_event(event_id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    // Explicit rollback
    let mut txn = s.begin().await.unwrap();
    let event = txn.create_event(&event_params).await.unwrap();
    txn.rollback().await.unwrap();
    let err = s.get_event(event.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

// ==================== Error Mapping Tests ====================

#[tokio::test]
async fn common_error_mapping_paths() {
    let s = SqliteStore::open_in_memory().await.unwrap();

    let group = s.create_group(&group_params("dup")).await.unwrap();

    // Duplicate group name → AlreadyExists
    let err = s.create_group(&group_params("dup")).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists));

    // Second settings row for the same group → AlreadyExists
    s.create_group_config(group.id).await.unwrap();
    let err = s.create_group_config(group.id).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists));

    // Unknown ids → NotFound
    let fake_group = GroupId(uuid::Uuid::new_v4());
    let err = s.get_group(fake_group).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    let err = s.get_group_config(fake_group).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let fake_role = GroupRoleId(uuid::Uuid::new_v4());
    let err = s.get_group_role(fake_role).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let fake_proposal = ProposalId(uuid::Uuid::new_v4());
    let err = s.get_proposal(fake_proposal).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let fake_event = EventId(uuid::Uuid::new_v4());
    let err = s.get_event(fake_event).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    // Updates against missing rows → NotFound
    let mut txn = s.begin().await.unwrap();
    let err = txn
        .update_group_role(&UpdateGroupRoleParams {
            id: fake_role,
            name: Some("nope".to_string()),
            color: None,
            permissions: None,
            add_member_ids: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    let err = txn
        .update_group_config(&UpdateGroupConfigParams::new(fake_group))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    txn.rollback().await.unwrap();
}

// ==================== Disk-backed Store Tests ====================

#[tokio::test]
async fn disk_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agora.db");
    let url = format!("sqlite://{}", path.to_string_lossy());

    let group_id = {
        let s = SqliteStore::open(&url).await.unwrap();
        s.create_group(&group_params("commons")).await.unwrap().id
    };

    let s = SqliteStore::open_with(&StoreConfig {
        url: Some(url),
        max_connections: 4,
    })
    .await
    .unwrap();
    let group = s.get_group(group_id).await.unwrap();
    assert_eq!(group.name, "commons");
}
