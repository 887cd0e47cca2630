//! Capability bitsets for group and server roles.
//!
//! A role grants a set of capabilities; membership in several roles is
//! combined with a bitwise union. Stored as the raw bits.

use bitflags::bitflags;

bitflags! {
    /// Capabilities a group role can grant within its group.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GroupPermissions: u32 {
        const MANAGE_SETTINGS         = 1 << 0;
        const MANAGE_POSTS            = 1 << 1;
        const MANAGE_COMMENTS         = 1 << 2;
        const MANAGE_EVENTS           = 1 << 3;
        const MANAGE_ROLES            = 1 << 4;
        const CREATE_EVENTS           = 1 << 5;
        const APPROVE_MEMBER_REQUESTS = 1 << 6;
        const UPDATE_GROUP            = 1 << 7;
        const DELETE_GROUP            = 1 << 8;
    }
}

bitflags! {
    /// Capabilities a server role can grant platform-wide.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ServerPermissions: u32 {
        const CREATE_INVITES  = 1 << 0;
        const MANAGE_INVITES  = 1 << 1;
        const MANAGE_POSTS    = 1 << 2;
        const MANAGE_COMMENTS = 1 << 3;
        const MANAGE_EVENTS   = 1 << 4;
        const MANAGE_ROLES    = 1 << 5;
        const MANAGE_SETTINGS = 1 << 6;
        const REMOVE_MEMBERS  = 1 << 7;
    }
}

impl GroupPermissions {
    /// Raw bits as stored in the database.
    pub fn bits_i64(&self) -> i64 {
        self.bits() as i64
    }

    /// Rebuild from stored bits, dropping any bits this version doesn't know.
    pub fn from_bits_i64(bits: i64) -> Self {
        Self::from_bits_truncate(bits as u32)
    }
}

impl ServerPermissions {
    pub fn bits_i64(&self) -> i64 {
        self.bits() as i64
    }

    pub fn from_bits_i64(bits: i64) -> Self {
        Self::from_bits_truncate(bits as u32)
    }
}
