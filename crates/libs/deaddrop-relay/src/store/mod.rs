mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use deaddrop_core::{IdentityRef, MessageId, StagedMessage};

/// Errors from the staging backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Durable staging area for undelivered messages.
///
/// Ids are assigned by the store and monotonic, so ascending id order is
/// insertion order; `pending_for` relies on that for its oldest-first
/// contract. `delete` must be idempotent: a delivering task and the expiry
/// sweeper may race to remove the same id, and the loser's delete is a
/// silent no-op, not an error.
pub trait MessageStore: Send + Sync {
    /// Stage a message. The store assigns the id and the expiry deadline
    /// from its retention window.
    fn insert(
        &self,
        sender: IdentityRef,
        recipient: IdentityRef,
        content: &str,
        now: i64,
    ) -> Result<StagedMessage, StoreError>;

    /// Every staged message addressed to `recipient`, oldest first.
    fn pending_for(&self, recipient: IdentityRef) -> Result<Vec<StagedMessage>, StoreError>;

    /// Point lookup by id.
    fn get(&self, id: MessageId) -> Result<Option<StagedMessage>, StoreError>;

    /// Remove one staged message. Removing an absent id succeeds.
    fn delete(&self, id: MessageId) -> Result<(), StoreError>;

    /// Remove every message whose deadline has passed at `now`. Returns the
    /// number removed. Applied as a single bulk operation.
    fn delete_expired(&self, now: i64) -> Result<u64, StoreError>;
}
