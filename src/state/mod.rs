//! Channel state: the per-channel entity and the process-wide directory.

mod channel;
mod directory;

pub use channel::{Channel, Roster};
pub use directory::Directory;
