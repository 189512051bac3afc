use crate::clock::{Clock, SystemClock};
use crate::config::RelayConfig;
use crate::events::PresenceEvent;
use crate::presence::PresenceRegistry;
use crate::resolver::IdentityResolver;
use crate::store::{MessageStore, StoreError};
use crate::transport::Transport;
use deaddrop_core::{ChannelId, DeliveryEnvelope, IdentityRef, MessageId, StagedMessage};
use std::sync::Arc;
use std::time::Duration;

/// Display name rendered when the sender no longer resolves.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Pushed over the recipient's live channel and purged from staging.
    Delivered,
    /// Left in the staging store, awaiting a reconnect drain or expiry.
    Staged(MessageId),
}

/// Tally of one reconnect drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainOutcome {
    pub delivered: u64,
    pub remaining: u64,
}

/// Errors surfaced to submit callers.
///
/// A failed or timed-out push is not in this taxonomy: the message stays
/// staged and the caller sees [`Outcome::Staged`], since delivery can still
/// happen on a later reconnect.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("empty message content")]
    EmptyContent,

    #[error("message content too large: {len} bytes (limit {max})")]
    ContentTooLarge { len: usize, max: usize },

    #[error("identity not found: {identity}")]
    IdentityNotFound { identity: IdentityRef },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Orchestrates the store-and-forward protocol.
///
/// Per message the lifecycle is stage, then attempt delivery, then purge on
/// confirmed push. Purging is conditioned strictly on the transport
/// confirming the push, never on presence alone: a registry binding can be
/// stale relative to a dead channel, and an unconfirmed push must leave the
/// message claimable by a later drain.
#[derive(Clone)]
pub struct DeliveryCoordinator {
    registry: PresenceRegistry,
    store: Arc<dyn MessageStore>,
    resolver: Arc<dyn IdentityResolver>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    push_timeout: Duration,
    max_content_len: usize,
}

impl DeliveryCoordinator {
    pub fn new(
        registry: PresenceRegistry,
        store: Arc<dyn MessageStore>,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn Transport>,
        config: &RelayConfig,
    ) -> Self {
        Self::with_clock(registry, store, resolver, transport, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        registry: PresenceRegistry,
        store: Arc<dyn MessageStore>,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        config: &RelayConfig,
    ) -> Self {
        Self {
            registry,
            store,
            resolver,
            transport,
            clock,
            push_timeout: config.push_timeout(),
            max_content_len: config.max_content_len,
        }
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Accept a message from `sender` to `recipient`, stage it, and attempt
    /// immediate delivery if the recipient is reachable.
    ///
    /// Content bounds are checked first, then both identities must resolve;
    /// nothing is staged on rejection. Once staged, the message is deleted
    /// only after a confirmed push.
    pub async fn submit(
        &self,
        sender: IdentityRef,
        recipient: IdentityRef,
        content: &str,
    ) -> Result<Outcome, RelayError> {
        if content.trim().is_empty() {
            return Err(RelayError::EmptyContent);
        }
        if content.len() > self.max_content_len {
            return Err(RelayError::ContentTooLarge {
                len: content.len(),
                max: self.max_content_len,
            });
        }
        if !self.resolver.exists(sender).await {
            return Err(RelayError::IdentityNotFound { identity: sender });
        }
        if !self.resolver.exists(recipient).await {
            return Err(RelayError::IdentityNotFound { identity: recipient });
        }

        let staged = self.store.insert(sender, recipient, content, self.clock.now())?;

        let Some(channel) = self.registry.lookup(recipient) else {
            log::debug!(
                "delivery: staged message {} for offline recipient {}",
                staged.id,
                recipient
            );
            return Ok(Outcome::Staged(staged.id));
        };

        if self.try_deliver(&channel, &staged).await {
            Ok(Outcome::Delivered)
        } else {
            Ok(Outcome::Staged(staged.id))
        }
    }

    /// Deliver the staged backlog of an identity that just became reachable,
    /// oldest first.
    ///
    /// Stops at the first unconfirmed push or lost channel, leaving the
    /// remainder staged in order for the next drain.
    pub async fn drain_on_reconnect(
        &self,
        identity: IdentityRef,
    ) -> Result<DrainOutcome, RelayError> {
        let pending = self.store.pending_for(identity)?;
        let total = pending.len() as u64;
        let mut delivered = 0u64;
        for staged in pending {
            let Some(channel) = self.registry.lookup(identity) else {
                break;
            };
            if !self.try_deliver(&channel, &staged).await {
                break;
            }
            delivered += 1;
        }
        let outcome = DrainOutcome { delivered, remaining: total - delivered };
        if outcome.remaining > 0 {
            log::debug!(
                "delivery: drain for {} stopped with {} message(s) still staged",
                identity,
                outcome.remaining
            );
        }
        Ok(outcome)
    }

    /// Render the staged backlog of an identity without delivering or
    /// purging anything.
    pub async fn pending(&self, identity: IdentityRef) -> Result<Vec<DeliveryEnvelope>, RelayError> {
        if !self.resolver.exists(identity).await {
            return Err(RelayError::IdentityNotFound { identity });
        }
        let mut envelopes = Vec::new();
        for staged in self.store.pending_for(identity)? {
            envelopes.push(self.render(&staged).await);
        }
        Ok(envelopes)
    }

    /// Apply one reachability change from the session transport.
    pub async fn handle_presence_event(&self, event: PresenceEvent) {
        match event {
            PresenceEvent::Reachable { identity, channel } => {
                self.registry.register(identity, channel);
                if let Err(err) = self.drain_on_reconnect(identity).await {
                    log::warn!("presence: drain after reconnect of {identity} failed: {err}");
                }
            }
            PresenceEvent::Unreachable { identity } => {
                self.registry.unregister(identity);
            }
        }
    }

    /// Push one staged message, bounded by the push timeout, and purge it on
    /// confirmed success. Returns whether the push was confirmed.
    async fn try_deliver(&self, channel: &ChannelId, staged: &StagedMessage) -> bool {
        let envelope = self.render(staged).await;
        let push = self.transport.push(channel, &envelope);
        match tokio::time::timeout(self.push_timeout, push).await {
            Ok(Ok(())) => {
                log::debug!("delivery: pushed message {} to {}", staged.id, channel);
                if let Err(err) = self.store.delete(staged.id) {
                    // The expiry sweeper reaps the leftover row.
                    log::warn!(
                        "delivery: delivered message {} but failed to purge it: {err}",
                        staged.id
                    );
                }
                true
            }
            Ok(Err(err)) => {
                log::debug!("delivery: push of message {} to {} failed: {err}", staged.id, channel);
                false
            }
            Err(_) => {
                log::debug!("delivery: push of message {} to {} timed out", staged.id, channel);
                false
            }
        }
    }

    async fn render(&self, staged: &StagedMessage) -> DeliveryEnvelope {
        let sender_name = self
            .resolver
            .display_name(staged.sender)
            .await
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        DeliveryEnvelope {
            message_id: staged.id,
            sender: staged.sender,
            sender_name,
            recipient: staged.recipient,
            content: staged.content.clone(),
            created_at: staged.created_at,
        }
    }
}
