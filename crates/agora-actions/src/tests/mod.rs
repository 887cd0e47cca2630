//! Engine tests.
//!
//! Tests are organized into modules by feature area:
//! - `common` - Shared test helpers and seed data
//! - `roles` - Role creation and role change implementation tests
//! - `configs` - Group settings implementation tests
//! - `cover_photos` - Cover photo swap tests
//! - `events` - Event implementation tests
//! - `reads` - Lookup, batch, and image side-channel tests

pub mod common;

mod configs;
