//! Storage abstraction for agora.
//!
//! Backend crates (e.g., agora-store-sqlite) implement these traits so the
//! action engine and shield don't depend on any specific database engine or
//! schema details.

use thiserror::Error;

mod store;
mod types;

pub use store::{Store, StoreTxn};
pub use types::*;

#[cfg(feature = "test-support")]
pub use store::{MockStore, MockStoreTxn};

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}
