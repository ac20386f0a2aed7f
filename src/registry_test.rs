use super::*;

fn sender() -> mpsc::Sender<ServerEvent> {
    mpsc::channel(4).0
}

#[test]
fn new_registry_is_empty() {
    let registry = Registry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.online_users().is_empty());
}

#[test]
fn lookup_reflects_most_recent_register() {
    let mut registry = Registry::new();
    let user = Uuid::new_v4();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    registry.register(user, first, sender());
    assert_eq!(registry.lookup(user).unwrap().conn_id, first);

    // Last connection wins: the second register overwrites the first.
    registry.register(user, second, sender());
    assert_eq!(registry.lookup(user).unwrap().conn_id, second);
    assert_eq!(registry.len(), 1);
}

#[test]
fn lookup_absent_after_unregister() {
    let mut registry = Registry::new();
    let user = Uuid::new_v4();
    let conn = Uuid::new_v4();

    registry.register(user, conn, sender());
    registry.unregister(user, conn);
    assert!(registry.lookup(user).is_none());
}

#[test]
fn unregister_is_idempotent() {
    let mut registry = Registry::new();
    let user = Uuid::new_v4();
    let conn = Uuid::new_v4();

    registry.unregister(user, conn);
    registry.register(user, conn, sender());
    registry.unregister(user, conn);
    registry.unregister(user, conn);
    assert!(registry.is_empty());
}

#[test]
fn stale_unregister_keeps_newer_connection() {
    let mut registry = Registry::new();
    let user = Uuid::new_v4();
    let old_conn = Uuid::new_v4();
    let new_conn = Uuid::new_v4();

    registry.register(user, old_conn, sender());
    registry.register(user, new_conn, sender());

    // The overwritten socket's teardown fires after the replacement.
    registry.unregister(user, old_conn);
    assert_eq!(registry.lookup(user).unwrap().conn_id, new_conn);
}

#[test]
fn online_users_lists_every_registered_user() {
    let mut registry = Registry::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    registry.register(a, Uuid::new_v4(), sender());
    registry.register(b, Uuid::new_v4(), sender());

    let mut online = registry.online_users();
    online.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(online, expected);
}

#[test]
fn connections_iterates_all_entries() {
    let mut registry = Registry::new();
    registry.register(Uuid::new_v4(), Uuid::new_v4(), sender());
    registry.register(Uuid::new_v4(), Uuid::new_v4(), sender());
    assert_eq!(registry.connections().count(), 2);
}
