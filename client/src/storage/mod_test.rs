use super::*;

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_missing_key_reads_none() {
    let store = MemoryStore::new();
    assert_eq!(store.read("userId"), None);
    assert!(store.is_empty());
}

#[test]
fn memory_store_write_then_read() {
    let mut store = MemoryStore::new();
    store.write("username", "Alice").unwrap();
    assert_eq!(store.read("username").as_deref(), Some("Alice"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_overwrite_replaces_value() {
    let mut store = MemoryStore::new();
    store.write("username", "Alice").unwrap();
    store.write("username", "Bob").unwrap();
    assert_eq!(store.read("username").as_deref(), Some("Bob"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_collects_from_pairs() {
    let store: MemoryStore = [("userId", "u1"), ("username", "Alice")].into_iter().collect();
    assert_eq!(store.read("userId").as_deref(), Some("u1"));
    assert_eq!(store.len(), 2);
}

#[test]
fn boxed_store_forwards() {
    let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
    store.write("k", "v").unwrap();
    assert_eq!(store.read("k").as_deref(), Some("v"));
}
