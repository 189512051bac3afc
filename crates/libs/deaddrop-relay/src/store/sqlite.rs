use super::{MessageStore, StoreError};
use deaddrop_core::{IdentityRef, MessageId, StagedMessage};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    retention_secs: u64,
}

impl SqliteStore {
    pub fn in_memory(retention_secs: u64) -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn), retention_secs })
    }

    pub fn open(path: &Path, retention_secs: u64) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn), retention_secs })
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Backend("staging store mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS staged_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sender INTEGER NOT NULL,
            recipient INTEGER NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_staged_recipient ON staged_messages (recipient, id);
        CREATE INDEX IF NOT EXISTS idx_staged_expires ON staged_messages (expires_at);",
    )
}

fn parse_row(row: &rusqlite::Row) -> rusqlite::Result<StagedMessage> {
    let id: i64 = row.get(0)?;
    let sender: i64 = row.get(1)?;
    let recipient: i64 = row.get(2)?;
    Ok(StagedMessage {
        id: MessageId(id as u64),
        sender: IdentityRef(sender as u64),
        recipient: IdentityRef(recipient as u64),
        content: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
    })
}

impl MessageStore for SqliteStore {
    fn insert(
        &self,
        sender: IdentityRef,
        recipient: IdentityRef,
        content: &str,
        now: i64,
    ) -> Result<StagedMessage, StoreError> {
        let expires_at = now.saturating_add(self.retention_secs as i64);
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO staged_messages (sender, recipient, content, created_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![sender.0 as i64, recipient.0 as i64, content, now, expires_at],
        )?;
        let id = conn.last_insert_rowid();
        Ok(StagedMessage {
            id: MessageId(id as u64),
            sender,
            recipient,
            content: content.to_string(),
            created_at: now,
            expires_at,
        })
    }

    fn pending_for(&self, recipient: IdentityRef) -> Result<Vec<StagedMessage>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, sender, recipient, content, created_at, expires_at FROM staged_messages WHERE recipient = ?1 ORDER BY id ASC",
        )?;
        let mut rows = stmt.query(params![recipient.0 as i64])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_row(row)?);
        }
        Ok(records)
    }

    fn get(&self, id: MessageId) -> Result<Option<StagedMessage>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, sender, recipient, content, created_at, expires_at FROM staged_messages WHERE id = ?1 LIMIT 1",
        )?;
        let record = stmt.query_row(params![id.0 as i64], parse_row).optional()?;
        Ok(record)
    }

    fn delete(&self, id: MessageId) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM staged_messages WHERE id = ?1", params![id.0 as i64])?;
        Ok(())
    }

    fn delete_expired(&self, now: i64) -> Result<u64, StoreError> {
        let conn = self.lock_conn()?;
        let removed =
            conn.execute("DELETE FROM staged_messages WHERE expires_at < ?1", params![now])?;
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETENTION: u64 = 100;

    fn store() -> SqliteStore {
        SqliteStore::in_memory(RETENTION).expect("in-memory store")
    }

    #[test]
    fn insert_assigns_id_and_deadline() {
        let store = store();
        let staged =
            store.insert(IdentityRef(1), IdentityRef(2), "hello", 50).expect("insert message");
        assert_eq!(staged.created_at, 50);
        assert_eq!(staged.expires_at, 150);
        let loaded = store.get(staged.id).expect("load message").expect("message exists");
        assert_eq!(loaded, staged);
    }

    #[test]
    fn pending_for_is_oldest_first_and_scoped() {
        let store = store();
        let first =
            store.insert(IdentityRef(1), IdentityRef(2), "first", 10).expect("insert first");
        store.insert(IdentityRef(1), IdentityRef(9), "other", 11).expect("insert other");
        let second =
            store.insert(IdentityRef(1), IdentityRef(2), "second", 12).expect("insert second");

        let pending = store.pending_for(IdentityRef(2)).expect("pending");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
        assert_eq!(pending[1].id, second.id);
    }

    #[test]
    fn delete_absent_id_is_silent() {
        let store = store();
        store.delete(MessageId(12345)).expect("delete absent id");
    }

    #[test]
    fn delete_expired_counts_and_keeps_live_rows() {
        let store = store();
        store.insert(IdentityRef(1), IdentityRef(2), "old", 0).expect("insert old");
        store.insert(IdentityRef(1), IdentityRef(2), "older", 1).expect("insert older");
        let live = store.insert(IdentityRef(1), IdentityRef(2), "live", 60).expect("insert live");

        // Deadlines are 100 and 101; a row is expired only strictly past it.
        assert_eq!(store.delete_expired(100).expect("sweep at 100"), 0);
        assert_eq!(store.delete_expired(102).expect("sweep at 102"), 2);
        let pending = store.pending_for(IdentityRef(2)).expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, live.id);
    }
}
