use deaddrop_core::{ChannelId, IdentityRef, MessageId};
use deaddrop_relay::{
    DeliveryCoordinator, MessageStore, Outcome, PresenceRegistry, RelayConfig, SqliteStore,
};
use deaddrop_testkit::{ManualClock, ScriptedTransport, StaticResolver};
use std::sync::Arc;

const ALICE: IdentityRef = IdentityRef(1);
const BOB: IdentityRef = IdentityRef(2);
const RETENTION_SECS: u64 = 3_600;

#[test]
fn staged_messages_survive_reopen_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("staged.db");

    {
        let store = SqliteStore::open(&path, RETENTION_SECS).expect("open store");
        store.insert(ALICE, BOB, "first", 10).expect("insert first");
        store.insert(ALICE, BOB, "second", 20).expect("insert second");
    }

    let store = SqliteStore::open(&path, RETENTION_SECS).expect("reopen store");
    let pending = store.pending_for(BOB).expect("pending");
    assert_eq!(
        pending.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
        vec!["first", "second"]
    );
    assert_eq!(pending[0].expires_at, 10 + RETENTION_SECS as i64);
}

#[test]
fn ids_stay_monotonic_across_deletes() {
    let store = SqliteStore::in_memory(RETENTION_SECS).expect("in-memory store");
    let first = store.insert(ALICE, BOB, "first", 10).expect("insert first");
    store.delete(first.id).expect("delete first");
    let second = store.insert(ALICE, BOB, "second", 20).expect("insert second");

    assert!(second.id > first.id, "AUTOINCREMENT must not reuse a freed id");
}

#[test]
fn get_absent_id_is_none_and_delete_is_idempotent() {
    let store = SqliteStore::in_memory(RETENTION_SECS).expect("in-memory store");
    assert!(store.get(MessageId(404)).expect("get absent").is_none());
    store.delete(MessageId(404)).expect("delete absent");

    let staged = store.insert(ALICE, BOB, "hello", 10).expect("insert");
    store.delete(staged.id).expect("first delete");
    store.delete(staged.id).expect("second delete");
    assert!(store.get(staged.id).expect("get deleted").is_none());
}

#[test]
fn delete_expired_is_scoped_to_the_deadline() {
    let store = SqliteStore::in_memory(RETENTION_SECS).expect("in-memory store");
    store.insert(ALICE, BOB, "old", 0).expect("insert old");
    store.insert(ALICE, BOB, "new", 5_000).expect("insert new");

    let removed = store.delete_expired(RETENTION_SECS as i64 + 1).expect("sweep");

    assert_eq!(removed, 1);
    let pending = store.pending_for(BOB).expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].content, "new");
}

#[tokio::test]
async fn coordinator_works_against_the_sqlite_backend() {
    let config = RelayConfig {
        retention_secs: RETENTION_SECS,
        push_timeout_ms: 50,
        ..RelayConfig::default()
    };
    let registry = PresenceRegistry::new();
    let store = Arc::new(SqliteStore::in_memory(RETENTION_SECS).expect("in-memory store"));
    let resolver = Arc::new(
        StaticResolver::new().with_identity(ALICE, "alice").with_identity(BOB, "bob"),
    );
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let coordinator = DeliveryCoordinator::with_clock(
        registry.clone(),
        store.clone(),
        resolver,
        transport.clone(),
        clock,
        &config,
    );

    let outcome = coordinator.submit(ALICE, BOB, "hello").await.expect("submit offline");
    assert!(matches!(outcome, Outcome::Staged(_)));
    assert_eq!(store.pending_for(BOB).expect("pending").len(), 1);

    registry.register(BOB, ChannelId::from("chan-bob"));
    let drained = coordinator.drain_on_reconnect(BOB).await.expect("drain");
    assert_eq!(drained.delivered, 1);
    assert!(store.pending_for(BOB).expect("pending").is_empty());
    assert_eq!(transport.push_count(), 1);
}
