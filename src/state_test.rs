use super::*;

#[tokio::test]
async fn new_app_state_has_empty_registry() {
    let state = test_helpers::test_app_state();
    assert!(state.registry.read().await.is_empty());
    assert!(state.media.is_none());
}

#[tokio::test]
async fn connect_user_registers_in_registry() {
    let state = test_helpers::test_app_state();
    let user = uuid::Uuid::new_v4();
    let _rx = test_helpers::connect_user(&state, user).await;
    assert!(state.registry.read().await.lookup(user).is_some());
}

#[test]
fn dummy_message_is_unread() {
    let m = test_helpers::dummy_message(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), "hello", 1);
    assert!(!m.is_read);
    assert!(m.read_at.is_none());
    assert_eq!(m.text.as_deref(), Some("hello"));
}
