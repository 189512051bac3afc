use async_trait::async_trait;
use deaddrop_core::{ChannelId, DeliveryEnvelope};

/// Errors from pushing an envelope over a channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PushError {
    /// The channel no longer exists on the transport side.
    #[error("channel closed: {channel}")]
    Closed { channel: String },

    /// The transport accepted the channel but could not complete the push.
    #[error("push failed: {reason}")]
    Failed { reason: String },
}

impl PushError {
    pub fn closed(channel: impl Into<String>) -> Self {
        Self::Closed { channel: channel.into() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed { reason: reason.into() }
    }
}

/// Outbound side of the session transport.
///
/// The coordinator treats any error, and any push that outlives its
/// timeout, as "not delivered": the staged message stays put. Returning
/// `Ok` means the transport confirmed the push, not merely queued it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn push(
        &self,
        channel: &ChannelId,
        envelope: &DeliveryEnvelope,
    ) -> Result<(), PushError>;
}
