//! Type definitions for agora storage.

mod actions;
mod events;
mod groups;
mod ids;
mod images;
mod permissions;
mod proposals;

// Re-export all types from submodules
pub use actions::*;
pub use events::*;
pub use groups::*;
pub use ids::*;
pub use images::*;
pub use permissions::*;
pub use proposals::*;
