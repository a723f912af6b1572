//! chatterd - channel membership and message routing core.
//!
//! This crate is the channel subsystem of the chatter server: it tracks
//! named channels, their members and operators, and fans join/leave/
//! disconnect notifications out to every affected connection. Transport,
//! framing, and authentication live in collaborator crates; this core only
//! decides *who* must hear about *what*, and in what order.
//!
//! The embedding server wires three seams:
//!
//! - [`UserLookup`] - resolves a connection to its identity record
//! - [`Notifier`] - enqueues one encoded payload for one connection
//! - [`ChannelObserver`] - optional hooks fired after each state change
//!
//! and then feeds inbound frames to [`ChannelComponent::handle`] plus
//! lifecycle events to the component's lifecycle methods.

mod component;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod observer;
pub mod state;
pub mod user;

pub use chatter_proto as proto;

pub use crate::component::ChannelComponent;
pub use crate::config::{Config, LimitsConfig, ServerConfig};
pub use crate::error::{HandlerError, HandlerResult};
pub use crate::notify::{Notifier, Outbound, QueuedNotifier};
pub use crate::observer::ChannelObserver;
pub use crate::state::{Channel, Directory, Roster};
pub use crate::user::{ChatUser, ConnectionId, UserLookup, UserTable};
