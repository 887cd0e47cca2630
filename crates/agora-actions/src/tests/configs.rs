//! Group settings implementation tests.
//!
//! The audit invariant under test: the set of recorded diffs equals the
//! set of proposed fields, proposed zeroes included, unset fields never.

use agora_storage::*;

use super::common::*;
use crate::ActionError;

#[tokio::test]
async fn diffs_match_proposed_fields_exactly() {
    let (engine, store, _media) = create_test_engine().await;
    let group_id = seed_group(&store, "assembly").await;
    let action = seed_action(&store, group_id, ActionType::ChangeGroupConfig).await;

    // Propose a zero and an enum change; leave everything else unset.
    let mut params = CreateProposalActionConfigParams::new(action.id);
    params.stand_asides_limit = Some(0);
    params.privacy = Some(GroupPrivacy::Public);
    store.create_proposal_action_config(&params).await.unwrap();

    engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap();

    let recorded = store.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(
        recorded.prior,
        vec![
            ConfigDiff::StandAsidesLimit(GroupConfig::DEFAULT_STAND_ASIDES_LIMIT),
            ConfigDiff::Privacy(GroupPrivacy::Private),
        ]
    );

    let live = store.get_group_config(group_id).await.unwrap();
    assert_eq!(live.stand_asides_limit, 0);
    assert_eq!(live.privacy, GroupPrivacy::Public);
    // Unset fields pass through unchanged.
    assert_eq!(live.admin_model, AdminModel::Standard);
    assert_eq!(
        live.ratification_threshold,
        GroupConfig::DEFAULT_RATIFICATION_THRESHOLD
    );
}

#[tokio::test]
async fn all_seven_fields_change_together() {
    let (engine, store, _media) = create_test_engine().await;
    let group_id = seed_group(&store, "assembly").await;
    let action = seed_action(&store, group_id, ActionType::ChangeGroupConfig).await;

    store
        .create_proposal_action_config(&CreateProposalActionConfigParams {
            proposal_action_id: action.id,
            admin_model: Some(AdminModel::Rotating),
            decision_making_model: Some(DecisionMakingModel::MajorityVote),
            ratification_threshold: Some(66),
            reservations_limit: Some(1),
            stand_asides_limit: Some(3),
            voting_time_limit: Some(1440),
            privacy: Some(GroupPrivacy::Public),
        })
        .await
        .unwrap();

    engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap();

    let recorded = store.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(recorded.prior.len(), 7);

    let live = store.get_group_config(group_id).await.unwrap();
    assert_eq!(live.admin_model, AdminModel::Rotating);
    assert_eq!(live.decision_making_model, DecisionMakingModel::MajorityVote);
    assert_eq!(live.ratification_threshold, 66);
    assert_eq!(live.reservations_limit, 1);
    assert_eq!(live.stand_asides_limit, 3);
    assert_eq!(live.voting_time_limit, 1440);
    assert_eq!(live.privacy, GroupPrivacy::Public);
}

#[tokio::test]
async fn empty_proposal_changes_nothing_and_records_nothing() {
    let (engine, store, _media) = create_test_engine().await;
    let group_id = seed_group(&store, "assembly").await;
    let action = seed_action(&store, group_id, ActionType::ChangeGroupConfig).await;

    store
        .create_proposal_action_config(&CreateProposalActionConfigParams::new(action.id))
        .await
        .unwrap();

    engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap();

    let recorded = store.get_proposal_action_config(action.id).await.unwrap();
    assert!(recorded.prior.is_empty());

    let live = store.get_group_config(group_id).await.unwrap();
    assert_eq!(live.admin_model, AdminModel::Standard);
    assert_eq!(live.decision_making_model, DecisionMakingModel::Consensus);
    assert_eq!(live.privacy, GroupPrivacy::Private);
}

#[tokio::test]
async fn config_without_payload_fails() {
    let (engine, store, _media) = create_test_engine().await;
    let group_id = seed_group(&store, "assembly").await;
    let action = seed_action(&store, group_id, ActionType::ChangeGroupConfig).await;

    let err = engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::ConfigNotFound));

    // Nothing was recorded or changed.
    let live = store.get_group_config(group_id).await.unwrap();
    assert_eq!(live.privacy, GroupPrivacy::Private);
}

#[tokio::test]
async fn rerun_overwrites_diffs_against_current_values() {
    let (engine, store, _media) = create_test_engine().await;
    let group_id = seed_group(&store, "assembly").await;
    let action = seed_action(&store, group_id, ActionType::ChangeGroupConfig).await;

    let mut params = CreateProposalActionConfigParams::new(action.id);
    params.ratification_threshold = Some(75);
    store.create_proposal_action_config(&params).await.unwrap();

    engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap();
    let first = store.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(
        first.prior,
        vec![ConfigDiff::RatificationThreshold(
            GroupConfig::DEFAULT_RATIFICATION_THRESHOLD
        )]
    );

    // A second run sees the already-applied value as the old one. Settings
    // changes are idempotent in effect but the audit trail tracks the run.
    engine
        .implement_change_group_config(action.id, group_id)
        .await
        .unwrap();
    let second = store.get_proposal_action_config(action.id).await.unwrap();
    assert_eq!(second.prior, vec![ConfigDiff::RatificationThreshold(75)]);
}
