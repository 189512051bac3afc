use super::{MessageStore, StoreError};
use deaddrop_core::{IdentityRef, MessageId, StagedMessage};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory staging backend for tests and ephemeral deployments.
///
/// Keyed by id in a `BTreeMap`, so iteration order is id order and the
/// oldest-first contract of `pending_for` falls out of the map itself.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    retention_secs: u64,
}

struct Inner {
    next_id: u64,
    messages: BTreeMap<u64, StagedMessage>,
}

impl MemoryStore {
    pub fn new(retention_secs: u64) -> Self {
        Self {
            inner: Mutex::new(Inner { next_id: 1, messages: BTreeMap::new() }),
            retention_secs,
        }
    }

    /// Number of staged messages across all recipients.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|guard| guard.messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Backend("staging store mutex poisoned".into()))
    }
}

impl MessageStore for MemoryStore {
    fn insert(
        &self,
        sender: IdentityRef,
        recipient: IdentityRef,
        content: &str,
        now: i64,
    ) -> Result<StagedMessage, StoreError> {
        let mut inner = self.lock_inner()?;
        let id = inner.next_id;
        inner.next_id += 1;
        let staged = StagedMessage {
            id: MessageId(id),
            sender,
            recipient,
            content: content.to_string(),
            created_at: now,
            expires_at: now.saturating_add(self.retention_secs as i64),
        };
        inner.messages.insert(id, staged.clone());
        Ok(staged)
    }

    fn pending_for(&self, recipient: IdentityRef) -> Result<Vec<StagedMessage>, StoreError> {
        let inner = self.lock_inner()?;
        Ok(inner
            .messages
            .values()
            .filter(|message| message.recipient == recipient)
            .cloned()
            .collect())
    }

    fn get(&self, id: MessageId) -> Result<Option<StagedMessage>, StoreError> {
        let inner = self.lock_inner()?;
        Ok(inner.messages.get(&id.0).cloned())
    }

    fn delete(&self, id: MessageId) -> Result<(), StoreError> {
        let mut inner = self.lock_inner()?;
        inner.messages.remove(&id.0);
        Ok(())
    }

    fn delete_expired(&self, now: i64) -> Result<u64, StoreError> {
        let mut inner = self.lock_inner()?;
        let before = inner.messages.len();
        inner.messages.retain(|_, message| !message.is_expired(now));
        Ok((before - inner.messages.len()) as u64)
    }
}
