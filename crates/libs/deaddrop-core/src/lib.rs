//! Domain types for the deaddrop relay.
//!
//! deaddrop is an ephemeral store-and-forward relay: a message addressed to
//! an identity is pushed immediately when that identity has a live channel
//! and staged durably otherwise, until the recipient reconnects or the
//! retention deadline passes. This crate holds the types shared across the
//! boundary:
//!
//! - [`IdentityRef`] and [`ChannelId`], the opaque keys the relay routes by
//! - [`StagedMessage`], the persisted record of an undelivered message
//! - [`DeliveryEnvelope`], the rendered payload handed to the transport,
//!   with msgpack helpers for hosts that want bytes

pub mod error;
pub mod identity;
pub mod message;

pub use error::EnvelopeError;
pub use identity::{ChannelId, IdentityRef};
pub use message::{DeliveryEnvelope, MessageId, StagedMessage};

/// Largest accepted message body, in bytes.
pub const MAX_CONTENT_LEN: usize = 5000;
