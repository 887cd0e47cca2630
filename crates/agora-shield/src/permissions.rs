//! Per-request permission snapshot.

use std::collections::HashMap;

use agora_storage::{GroupId, GroupPermissions, ServerPermissions};

/// Everything a requester may do, resolved once per request.
///
/// Built by the authentication layer from the requester's server and group
/// roles, each role's capabilities folded in with a bitwise union. Absence
/// of a group key means "not a member"; an authenticated user with no roles
/// carries empty sets. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct UserPermissions {
    pub server: ServerPermissions,
    pub groups: HashMap<GroupId, GroupPermissions>,
}
