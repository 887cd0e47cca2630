//! Proposal action implementation.
//!
//! A proposal that passes carries one action describing the change its
//! group voted on. This crate applies those actions to the live records:
//! role creation and change, settings changes with an audit diff, cover
//! photo swaps, and event creation. It also owns the image side-channel
//! for uploads that ride along with a draft proposal.
//!
//! Everything runs against the [`agora_storage::Store`] traits; each
//! implement operation is one all-or-nothing write scope.

mod engine;
mod error;
mod media;

pub use engine::ProposalActions;
pub use error::ActionError;
pub use media::{DiskMediaStore, ImageUpload, MediaError, MediaStore};

#[cfg(test)]
mod tests;
