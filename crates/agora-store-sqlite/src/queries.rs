//! Row-level queries, written once against a connection so the pool-backed
//! store and open transactions run identical SQL.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use agora_storage::{
    ConfigDiff, CreateEventParams, CreateGroupParams, CreateGroupRoleParams,
    CreateImageParams, CreateProposalActionConfigParams, CreateProposalActionEventParams,
    CreateProposalActionParams, CreateProposalActionRoleParams, CreateProposalParams, Event,
    EventId, Group, GroupConfig, GroupConfigId, GroupId, GroupPermissions, GroupRole, GroupRoleId,
    Image, ImageFilter, ImageId, MemberChangeType, Proposal, ProposalAction,
    ProposalActionConfig, ProposalActionConfigId, ProposalActionEvent, ProposalActionEventHost,
    ProposalActionEventId, ProposalActionFilter, ProposalActionId, ProposalActionRole,
    ProposalActionRoleId, ProposalId, ProposalStage, RoleDiff, RoleMemberChange, StoreError,
    UpdateGroupConfigParams, UpdateGroupRoleParams, UserId,
};

/// Epoch seconds back to a DateTime; stored values always fit.
fn ts(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {secs}")))
}

fn parse_id(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

/// Map UNIQUE violations to AlreadyExists; everything else is a backend error.
fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

// ───────────────────────────────── Groups ──────────────────────────────────

pub(crate) async fn insert_group(
    conn: &mut SqliteConnection,
    p: &CreateGroupParams,
) -> Result<Group, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query("INSERT INTO groups(id,name,description,created_at,updated_at) VALUES(?,?,?,?,?)")
        .bind(id.to_string())
        .bind(&p.name)
        .bind(p.description.as_deref())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(insert_err)?;
    Ok(Group {
        id: GroupId(id),
        name: p.name.clone(),
        description: p.description.clone(),
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_group(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Group, StoreError> {
    let row = sqlx::query_as::<_, (String, Option<String>, i64, i64)>(
        "SELECT name,description,created_at,updated_at FROM groups WHERE id=?",
    )
    .bind(group_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (name, description, created_at, updated_at) = row;
    Ok(Group {
        id: group_id,
        name,
        description,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

pub(crate) async fn insert_group_config(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<GroupConfig, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO group_configs(id,group_id,admin_model,decision_making_model,
         ratification_threshold,reservations_limit,stand_asides_limit,voting_time_limit,
         privacy,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(group_id.0.to_string())
    .bind(agora_storage::AdminModel::Standard.as_str())
    .bind(agora_storage::DecisionMakingModel::Consensus.as_str())
    .bind(GroupConfig::DEFAULT_RATIFICATION_THRESHOLD as i64)
    .bind(GroupConfig::DEFAULT_RESERVATIONS_LIMIT as i64)
    .bind(GroupConfig::DEFAULT_STAND_ASIDES_LIMIT as i64)
    .bind(GroupConfig::DEFAULT_VOTING_TIME_LIMIT as i64)
    .bind(agora_storage::GroupPrivacy::Private.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    fetch_group_config(conn, group_id).await
}

pub(crate) async fn fetch_group_config(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<GroupConfig, StoreError> {
    let row = sqlx::query_as::<_, (String, String, String, i64, i64, i64, i64, String, i64, i64)>(
        "SELECT id,admin_model,decision_making_model,ratification_threshold,reservations_limit,
         stand_asides_limit,voting_time_limit,privacy,created_at,updated_at
         FROM group_configs WHERE group_id=?",
    )
    .bind(group_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (id, admin, dmm, threshold, reservations, stand_asides, voting, privacy, created, updated) =
        row;
    Ok(GroupConfig {
        id: GroupConfigId(parse_id(&id)?),
        group_id,
        admin_model: admin
            .parse()
            .map_err(|e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()))?,
        decision_making_model: dmm
            .parse()
            .map_err(|e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()))?,
        ratification_threshold: threshold as i32,
        reservations_limit: reservations as i32,
        stand_asides_limit: stand_asides as i32,
        voting_time_limit: voting as i32,
        privacy: privacy
            .parse()
            .map_err(|e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()))?,
        created_at: ts(created)?,
        updated_at: ts(updated)?,
    })
}

pub(crate) async fn update_group_config(
    conn: &mut SqliteConnection,
    p: &UpdateGroupConfigParams,
) -> Result<(), StoreError> {
    let now = Utc::now().timestamp();
    // COALESCE leaves a column alone when the bound value is NULL, so Some(0)
    // writes a real zero and None changes nothing.
    let res = sqlx::query(
        "UPDATE group_configs SET
         admin_model=COALESCE(?,admin_model),
         decision_making_model=COALESCE(?,decision_making_model),
         ratification_threshold=COALESCE(?,ratification_threshold),
         reservations_limit=COALESCE(?,reservations_limit),
         stand_asides_limit=COALESCE(?,stand_asides_limit),
         voting_time_limit=COALESCE(?,voting_time_limit),
         privacy=COALESCE(?,privacy),
         updated_at=?
         WHERE group_id=?",
    )
    .bind(p.admin_model.map(|m| m.as_str()))
    .bind(p.decision_making_model.map(|m| m.as_str()))
    .bind(p.ratification_threshold.map(i64::from))
    .bind(p.reservations_limit.map(i64::from))
    .bind(p.stand_asides_limit.map(i64::from))
    .bind(p.voting_time_limit.map(i64::from))
    .bind(p.privacy.map(|m| m.as_str()))
    .bind(now)
    .bind(p.group_id.0.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub(crate) async fn insert_group_role(
    conn: &mut SqliteConnection,
    p: &CreateGroupRoleParams,
    from_proposal: bool,
) -> Result<GroupRole, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO group_roles(id,group_id,name,color,permissions,from_proposal,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.group_id.0.to_string())
    .bind(&p.name)
    .bind(&p.color)
    .bind(p.permissions.bits_i64())
    .bind(from_proposal)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    for (i, user_id) in p.member_ids.iter().enumerate() {
        sqlx::query("INSERT INTO group_role_members(role_id,user_id,position) VALUES(?,?,?)")
            .bind(id.to_string())
            .bind(user_id.0.to_string())
            .bind(i as i64)
            .execute(&mut *conn)
            .await
            .map_err(insert_err)?;
    }
    Ok(GroupRole {
        id: GroupRoleId(id),
        group_id: p.group_id,
        name: p.name.clone(),
        color: p.color.clone(),
        permissions: p.permissions,
        member_ids: p.member_ids.clone(),
        from_proposal,
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_group_role(
    conn: &mut SqliteConnection,
    role_id: GroupRoleId,
) -> Result<GroupRole, StoreError> {
    let row = sqlx::query_as::<_, (String, String, String, i64, bool, i64, i64)>(
        "SELECT group_id,name,color,permissions,from_proposal,created_at,updated_at
         FROM group_roles WHERE id=?",
    )
    .bind(role_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (group_id, name, color, permissions, from_proposal, created_at, updated_at) = row;

    let member_rows = sqlx::query_as::<_, (String,)>(
        "SELECT user_id FROM group_role_members WHERE role_id=? ORDER BY position",
    )
    .bind(role_id.0.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    let mut member_ids = Vec::with_capacity(member_rows.len());
    for (user_id,) in member_rows {
        member_ids.push(UserId(parse_id(&user_id)?));
    }

    Ok(GroupRole {
        id: role_id,
        group_id: GroupId(parse_id(&group_id)?),
        name,
        color,
        permissions: GroupPermissions::from_bits_i64(permissions),
        member_ids,
        from_proposal,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

pub(crate) async fn update_group_role(
    conn: &mut SqliteConnection,
    p: &UpdateGroupRoleParams,
) -> Result<(), StoreError> {
    let now = Utc::now().timestamp();
    let res = sqlx::query(
        "UPDATE group_roles SET
         name=COALESCE(?,name),
         color=COALESCE(?,color),
         permissions=COALESCE(?,permissions),
         updated_at=?
         WHERE id=?",
    )
    .bind(p.name.as_deref())
    .bind(p.color.as_deref())
    .bind(p.permissions.map(|x| x.bits_i64()))
    .bind(now)
    .bind(p.id.0.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    // Additive: re-adding an existing member is a no-op, not an error.
    for user_id in &p.add_member_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO group_role_members(role_id,user_id,position)
             VALUES(?,?,(SELECT COALESCE(MAX(position)+1,0) FROM group_role_members WHERE role_id=?))",
        )
        .bind(p.id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(p.id.0.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    }
    Ok(())
}

pub(crate) async fn delete_group_role_members(
    conn: &mut SqliteConnection,
    role_id: GroupRoleId,
    user_ids: &[UserId],
) -> Result<(), StoreError> {
    if user_ids.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; user_ids.len()].join(",");
    let sql =
        format!("DELETE FROM group_role_members WHERE role_id=? AND user_id IN ({placeholders})");
    let mut q = sqlx::query(&sql).bind(role_id.0.to_string());
    for user_id in user_ids {
        q = q.bind(user_id.0.to_string());
    }
    q.execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

// ──────────────────────────────── Proposals ────────────────────────────────

pub(crate) async fn insert_proposal(
    conn: &mut SqliteConnection,
    p: &CreateProposalParams,
) -> Result<Proposal, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query("INSERT INTO proposals(id,group_id,stage,created_at,updated_at) VALUES(?,?,?,?,?)")
        .bind(id.to_string())
        .bind(p.group_id.0.to_string())
        .bind(ProposalStage::Voting.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(insert_err)?;
    Ok(Proposal {
        id: ProposalId(id),
        group_id: p.group_id,
        stage: ProposalStage::Voting,
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_proposal(
    conn: &mut SqliteConnection,
    proposal_id: ProposalId,
) -> Result<Proposal, StoreError> {
    let row = sqlx::query_as::<_, (String, String, i64, i64)>(
        "SELECT group_id,stage,created_at,updated_at FROM proposals WHERE id=?",
    )
    .bind(proposal_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (group_id, stage, created_at, updated_at) = row;
    Ok(Proposal {
        id: proposal_id,
        group_id: GroupId(parse_id(&group_id)?),
        stage: stage
            .parse()
            .map_err(|e: agora_storage::ParseProposalStageError| {
                StoreError::Backend(e.to_string())
            })?,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

// ───────────────────────────── Proposal actions ────────────────────────────

type ActionRow = (String, String, String, i64, i64);

fn action_from_row(row: ActionRow) -> Result<ProposalAction, StoreError> {
    let (id, proposal_id, action_type, created_at, updated_at) = row;
    Ok(ProposalAction {
        id: ProposalActionId(parse_id(&id)?),
        proposal_id: ProposalId(parse_id(&proposal_id)?),
        action_type: action_type
            .parse()
            .map_err(|e: agora_storage::ParseActionTypeError| StoreError::Backend(e.to_string()))?,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

pub(crate) async fn insert_proposal_action(
    conn: &mut SqliteConnection,
    p: &CreateProposalActionParams,
) -> Result<ProposalAction, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO proposal_actions(id,proposal_id,action_type,created_at,updated_at)
         VALUES(?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.proposal_id.0.to_string())
    .bind(p.action_type.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    Ok(ProposalAction {
        id: ProposalActionId(id),
        proposal_id: p.proposal_id,
        action_type: p.action_type,
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_proposal_actions(
    conn: &mut SqliteConnection,
    filter: &ProposalActionFilter,
) -> Result<Vec<ProposalAction>, StoreError> {
    let mut sql = String::from(
        "SELECT id,proposal_id,action_type,created_at,updated_at FROM proposal_actions WHERE 1=1",
    );
    if filter.id.is_some() {
        sql.push_str(" AND id=?");
    }
    if filter.proposal_id.is_some() {
        sql.push_str(" AND proposal_id=?");
    }
    if filter.action_type.is_some() {
        sql.push_str(" AND action_type=?");
    }
    sql.push_str(" ORDER BY created_at, id");

    let mut q = sqlx::query_as::<_, ActionRow>(&sql);
    if let Some(id) = filter.id {
        q = q.bind(id.0.to_string());
    }
    if let Some(proposal_id) = filter.proposal_id {
        q = q.bind(proposal_id.0.to_string());
    }
    if let Some(action_type) = filter.action_type {
        q = q.bind(action_type.as_str());
    }

    let rows = q
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    rows.into_iter().map(action_from_row).collect()
}

pub(crate) async fn fetch_actions_by_proposals(
    conn: &mut SqliteConnection,
    proposal_ids: &[ProposalId],
) -> Result<Vec<Result<ProposalAction, StoreError>>, StoreError> {
    if proposal_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; proposal_ids.len()].join(",");
    let sql = format!(
        "SELECT id,proposal_id,action_type,created_at,updated_at FROM proposal_actions
         WHERE proposal_id IN ({placeholders}) ORDER BY created_at, id"
    );
    let mut q = sqlx::query_as::<_, ActionRow>(&sql);
    for proposal_id in proposal_ids {
        q = q.bind(proposal_id.0.to_string());
    }
    let rows = q
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    let mut by_proposal: HashMap<ProposalId, ProposalAction> = HashMap::new();
    for row in rows {
        let action = action_from_row(row)?;
        // A proposal carries one action; keep the oldest if data has more.
        by_proposal.entry(action.proposal_id).or_insert(action);
    }

    Ok(proposal_ids
        .iter()
        .map(|proposal_id| {
            by_proposal
                .get(proposal_id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
        .collect())
}

// ─────────────────────────── Action sub-records ────────────────────────────

pub(crate) async fn insert_action_role(
    conn: &mut SqliteConnection,
    p: &CreateProposalActionRoleParams,
) -> Result<ProposalActionRole, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO proposal_action_roles(id,proposal_action_id,group_role_id,name,color,
         permissions,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.proposal_action_id.0.to_string())
    .bind(p.group_role_id.map(|r| r.0.to_string()))
    .bind(p.name.as_deref())
    .bind(p.color.as_deref())
    .bind(p.permissions.map(|x| x.bits_i64()))
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    for (i, m) in p.members.iter().enumerate() {
        sqlx::query(
            "INSERT INTO proposal_action_role_members(action_role_id,user_id,change_type,position)
             VALUES(?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(m.user_id.0.to_string())
        .bind(m.change_type.as_str())
        .bind(i as i64)
        .execute(&mut *conn)
        .await
        .map_err(insert_err)?;
    }
    Ok(ProposalActionRole {
        id: ProposalActionRoleId(id),
        proposal_action_id: p.proposal_action_id,
        group_role_id: p.group_role_id,
        name: p.name.clone(),
        color: p.color.clone(),
        permissions: p.permissions,
        members: p.members.clone(),
        prior: Vec::new(),
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_action_role(
    conn: &mut SqliteConnection,
    action_id: ProposalActionId,
) -> Result<ProposalActionRole, StoreError> {
    let row = sqlx::query_as::<
        _,
        (
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<i64>,
            String,
            i64,
            i64,
        ),
    >(
        "SELECT id,group_role_id,name,color,permissions,prior,created_at,updated_at
         FROM proposal_action_roles WHERE proposal_action_id=?",
    )
    .bind(action_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (id, group_role_id, name, color, permissions, prior, created_at, updated_at) = row;
    let id = parse_id(&id)?;

    let member_rows = sqlx::query_as::<_, (String, String)>(
        "SELECT user_id,change_type FROM proposal_action_role_members
         WHERE action_role_id=? ORDER BY position",
    )
    .bind(id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    let mut members = Vec::with_capacity(member_rows.len());
    for (user_id, change_type) in member_rows {
        members.push(RoleMemberChange {
            user_id: UserId(parse_id(&user_id)?),
            change_type: change_type
                .parse::<MemberChangeType>()
                .map_err(|e| StoreError::Backend(e.to_string()))?,
        });
    }

    let prior: Vec<RoleDiff> =
        serde_json::from_str(&prior).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(ProposalActionRole {
        id: ProposalActionRoleId(id),
        proposal_action_id: action_id,
        group_role_id: match group_role_id {
            Some(s) => Some(GroupRoleId(parse_id(&s)?)),
            None => None,
        },
        name,
        color,
        permissions: permissions.map(GroupPermissions::from_bits_i64),
        members,
        prior,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

pub(crate) async fn set_role_prior(
    conn: &mut SqliteConnection,
    role_id: ProposalActionRoleId,
    diffs: &[RoleDiff],
) -> Result<(), StoreError> {
    let json = serde_json::to_string(diffs).map_err(|e| StoreError::Backend(e.to_string()))?;
    let now = Utc::now().timestamp();
    let res = sqlx::query("UPDATE proposal_action_roles SET prior=?, updated_at=? WHERE id=?")
        .bind(json)
        .bind(now)
        .bind(role_id.0.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub(crate) async fn insert_action_config(
    conn: &mut SqliteConnection,
    p: &CreateProposalActionConfigParams,
) -> Result<ProposalActionConfig, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO proposal_action_configs(id,proposal_action_id,admin_model,
         decision_making_model,ratification_threshold,reservations_limit,stand_asides_limit,
         voting_time_limit,privacy,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.proposal_action_id.0.to_string())
    .bind(p.admin_model.map(|m| m.as_str()))
    .bind(p.decision_making_model.map(|m| m.as_str()))
    .bind(p.ratification_threshold.map(i64::from))
    .bind(p.reservations_limit.map(i64::from))
    .bind(p.stand_asides_limit.map(i64::from))
    .bind(p.voting_time_limit.map(i64::from))
    .bind(p.privacy.map(|m| m.as_str()))
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    Ok(ProposalActionConfig {
        id: ProposalActionConfigId(id),
        proposal_action_id: p.proposal_action_id,
        admin_model: p.admin_model,
        decision_making_model: p.decision_making_model,
        ratification_threshold: p.ratification_threshold,
        reservations_limit: p.reservations_limit,
        stand_asides_limit: p.stand_asides_limit,
        voting_time_limit: p.voting_time_limit,
        privacy: p.privacy,
        prior: Vec::new(),
        created_at: ts(now)?,
        updated_at: ts(now)?,
    })
}

pub(crate) async fn fetch_action_config(
    conn: &mut SqliteConnection,
    action_id: ProposalActionId,
) -> Result<ProposalActionConfig, StoreError> {
    let row = sqlx::query_as::<
        _,
        (
            String,
            Option<String>,
            Option<String>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<String>,
            String,
            i64,
            i64,
        ),
    >(
        "SELECT id,admin_model,decision_making_model,ratification_threshold,reservations_limit,
         stand_asides_limit,voting_time_limit,privacy,prior,created_at,updated_at
         FROM proposal_action_configs WHERE proposal_action_id=?",
    )
    .bind(action_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (id, admin, dmm, threshold, reservations, stand_asides, voting, privacy, prior, created, updated) =
        row;

    let prior: Vec<ConfigDiff> =
        serde_json::from_str(&prior).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(ProposalActionConfig {
        id: ProposalActionConfigId(parse_id(&id)?),
        proposal_action_id: action_id,
        admin_model: match admin {
            Some(s) => Some(s.parse().map_err(
                |e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()),
            )?),
            None => None,
        },
        decision_making_model: match dmm {
            Some(s) => Some(s.parse().map_err(
                |e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()),
            )?),
            None => None,
        },
        ratification_threshold: threshold.map(|v| v as i32),
        reservations_limit: reservations.map(|v| v as i32),
        stand_asides_limit: stand_asides.map(|v| v as i32),
        voting_time_limit: voting.map(|v| v as i32),
        privacy: match privacy {
            Some(s) => Some(s.parse().map_err(
                |e: agora_storage::ParseSettingError| StoreError::Backend(e.to_string()),
            )?),
            None => None,
        },
        prior,
        created_at: ts(created)?,
        updated_at: ts(updated)?,
    })
}

pub(crate) async fn set_config_prior(
    conn: &mut SqliteConnection,
    config_id: ProposalActionConfigId,
    diffs: &[ConfigDiff],
) -> Result<(), StoreError> {
    let json = serde_json::to_string(diffs).map_err(|e| StoreError::Backend(e.to_string()))?;
    let now = Utc::now().timestamp();
    let res = sqlx::query("UPDATE proposal_action_configs SET prior=?, updated_at=? WHERE id=?")
        .bind(json)
        .bind(now)
        .bind(config_id.0.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub(crate) async fn insert_action_event(
    conn: &mut SqliteConnection,
    p: &CreateProposalActionEventParams,
) -> Result<ProposalActionEvent, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO proposal_action_events(id,proposal_action_id,name,description,location,
         online,external_link,starts_at,ends_at,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.proposal_action_id.0.to_string())
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.location.as_deref())
    .bind(p.online)
    .bind(p.external_link.as_deref())
    .bind(p.starts_at.timestamp())
    .bind(p.ends_at.map(|t| t.timestamp()))
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    for (i, host) in p.hosts.iter().enumerate() {
        sqlx::query(
            "INSERT INTO proposal_action_event_hosts(action_event_id,user_id,status,position)
             VALUES(?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(host.user_id.0.to_string())
        .bind(host.status.as_str())
        .bind(i as i64)
        .execute(&mut *conn)
        .await
        .map_err(insert_err)?;
    }
    fetch_action_event(conn, p.proposal_action_id).await
}

pub(crate) async fn fetch_action_event(
    conn: &mut SqliteConnection,
    action_id: ProposalActionId,
) -> Result<ProposalActionEvent, StoreError> {
    let row = sqlx::query_as::<
        _,
        (
            String,
            String,
            String,
            Option<String>,
            bool,
            Option<String>,
            i64,
            Option<i64>,
            i64,
            i64,
        ),
    >(
        "SELECT id,name,description,location,online,external_link,starts_at,ends_at,
         created_at,updated_at
         FROM proposal_action_events WHERE proposal_action_id=?",
    )
    .bind(action_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (id, name, description, location, online, external_link, starts, ends, created, updated) =
        row;
    let id = parse_id(&id)?;

    let host_rows = sqlx::query_as::<_, (String, String)>(
        "SELECT user_id,status FROM proposal_action_event_hosts
         WHERE action_event_id=? ORDER BY position",
    )
    .bind(id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    let mut hosts = Vec::with_capacity(host_rows.len());
    for (user_id, status) in host_rows {
        hosts.push(ProposalActionEventHost {
            user_id: UserId(parse_id(&user_id)?),
            status: status
                .parse()
                .map_err(|e: agora_storage::ParseAttendeeStatusError| {
                    StoreError::Backend(e.to_string())
                })?,
        });
    }

    Ok(ProposalActionEvent {
        id: ProposalActionEventId(id),
        proposal_action_id: action_id,
        name,
        description,
        location,
        online,
        external_link,
        starts_at: ts(starts)?,
        ends_at: match ends {
            Some(secs) => Some(ts(secs)?),
            None => None,
        },
        hosts,
        created_at: ts(created)?,
        updated_at: ts(updated)?,
    })
}

// ───────────────────────────────── Images ──────────────────────────────────

type ImageRow = (String, String, String, Option<String>, Option<String>, i64);

fn image_from_row(row: ImageRow) -> Result<Image, StoreError> {
    let (id, filename, image_type, group_id, proposal_action_id, created_at) = row;
    Ok(Image {
        id: ImageId(parse_id(&id)?),
        filename,
        image_type: image_type
            .parse()
            .map_err(|e: agora_storage::ParseImageTypeError| StoreError::Backend(e.to_string()))?,
        group_id: match group_id {
            Some(s) => Some(GroupId(parse_id(&s)?)),
            None => None,
        },
        proposal_action_id: match proposal_action_id {
            Some(s) => Some(ProposalActionId(parse_id(&s)?)),
            None => None,
        },
        created_at: ts(created_at)?,
    })
}

pub(crate) async fn insert_image(
    conn: &mut SqliteConnection,
    p: &CreateImageParams,
) -> Result<Image, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO images(id,filename,image_type,group_id,proposal_action_id,created_at)
         VALUES(?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(&p.filename)
    .bind(p.image_type.as_str())
    .bind(p.group_id.map(|g| g.0.to_string()))
    .bind(p.proposal_action_id.map(|a| a.0.to_string()))
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    Ok(Image {
        id: ImageId(id),
        filename: p.filename.clone(),
        image_type: p.image_type,
        group_id: p.group_id,
        proposal_action_id: p.proposal_action_id,
        created_at: ts(now)?,
    })
}

pub(crate) async fn fetch_image(
    conn: &mut SqliteConnection,
    filter: &ImageFilter,
) -> Result<Image, StoreError> {
    let mut sql = String::from(
        "SELECT id,filename,image_type,group_id,proposal_action_id,created_at FROM images WHERE 1=1",
    );
    if filter.image_type.is_some() {
        sql.push_str(" AND image_type=?");
    }
    if filter.group_id.is_some() {
        sql.push_str(" AND group_id=?");
    }
    if filter.proposal_action_id.is_some() {
        sql.push_str(" AND proposal_action_id=?");
    }
    // v7 ids are time-ordered; id breaks same-second ties.
    sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT 1");

    let mut q = sqlx::query_as::<_, ImageRow>(&sql);
    if let Some(image_type) = filter.image_type {
        q = q.bind(image_type.as_str());
    }
    if let Some(group_id) = filter.group_id {
        q = q.bind(group_id.0.to_string());
    }
    if let Some(action_id) = filter.proposal_action_id {
        q = q.bind(action_id.0.to_string());
    }

    let row = q
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .ok_or(StoreError::NotFound)?;
    image_from_row(row)
}

pub(crate) async fn attach_image_to_group(
    conn: &mut SqliteConnection,
    image_id: ImageId,
    group_id: GroupId,
) -> Result<(), StoreError> {
    // Clearing proposal_action_id consumes the upload: a second attempt to
    // implement the same action no longer finds a proposed image.
    let res = sqlx::query("UPDATE images SET group_id=?, proposal_action_id=NULL WHERE id=?")
        .bind(group_id.0.to_string())
        .bind(image_id.0.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub(crate) async fn delete_image(
    conn: &mut SqliteConnection,
    image_id: ImageId,
) -> Result<(), StoreError> {
    let res = sqlx::query("DELETE FROM images WHERE id=?")
        .bind(image_id.0.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

// ───────────────────────────────── Events ──────────────────────────────────

pub(crate) async fn insert_event(
    conn: &mut SqliteConnection,
    p: &CreateEventParams,
) -> Result<Event, StoreError> {
    let id = Uuid::now_v7();
    let now = Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO events(id,group_id,host_user_id,name,description,location,online,
         external_link,starts_at,ends_at,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(p.group_id.0.to_string())
    .bind(p.host_user_id.0.to_string())
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.location.as_deref())
    .bind(p.online)
    .bind(p.external_link.as_deref())
    .bind(p.starts_at.timestamp())
    .bind(p.ends_at.map(|t| t.timestamp()))
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(insert_err)?;
    fetch_event(conn, EventId(id)).await
}

pub(crate) async fn fetch_event(
    conn: &mut SqliteConnection,
    event_id: EventId,
) -> Result<Event, StoreError> {
    let row = sqlx::query_as::<
        _,
        (
            String,
            String,
            String,
            String,
            Option<String>,
            bool,
            Option<String>,
            i64,
            Option<i64>,
            i64,
            i64,
        ),
    >(
        "SELECT group_id,host_user_id,name,description,location,online,external_link,
         starts_at,ends_at,created_at,updated_at
         FROM events WHERE id=?",
    )
    .bind(event_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?
    .ok_or(StoreError::NotFound)?;
    let (
        group_id,
        host_user_id,
        name,
        description,
        location,
        online,
        external_link,
        starts,
        ends,
        created,
        updated,
    ) = row;
    Ok(Event {
        id: event_id,
        group_id: GroupId(parse_id(&group_id)?),
        host_user_id: UserId(parse_id(&host_user_id)?),
        name,
        description,
        location,
        online,
        external_link,
        starts_at: ts(starts)?,
        ends_at: match ends {
            Some(secs) => Some(ts(secs)?),
            None => None,
        },
        created_at: ts(created)?,
        updated_at: ts(updated)?,
    })
}
