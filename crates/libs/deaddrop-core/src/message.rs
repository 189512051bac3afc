use crate::error::EnvelopeError;
use crate::identity::IdentityRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned id of a staged message. Monotonic per store, so id order
/// is insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message held in the staging store, awaiting delivery or expiry.
///
/// Records exist only while undelivered: confirmed delivery deletes the row,
/// and the sweeper deletes it once `expires_at` has passed. There is no
/// persisted delivered state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedMessage {
    pub id: MessageId,
    pub sender: IdentityRef,
    pub recipient: IdentityRef,
    pub content: String,
    /// Unix seconds at staging time.
    pub created_at: i64,
    /// `created_at` plus the retention window. Set once, never updated.
    pub expires_at: i64,
}

impl StagedMessage {
    /// Whether the retention deadline has passed at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// The rendered payload pushed to a recipient's channel.
///
/// `sender_name` is resolved at delivery time; a sender the identity service
/// no longer knows renders with a fallback name rather than blocking the
/// delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    pub message_id: MessageId,
    pub sender: IdentityRef,
    pub sender_name: String,
    pub recipient: IdentityRef,
    pub content: String,
    pub created_at: i64,
}

impl DeliveryEnvelope {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(rmp_serde::to_vec(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
