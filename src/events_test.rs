use super::*;
use serde_json::json;

fn sample_message() -> Message {
    Message {
        id: Uuid::nil(),
        sender_id: Uuid::nil(),
        receiver_id: Uuid::nil(),
        text: Some("hi".into()),
        image: None,
        is_read: false,
        read_at: None,
        created_at: 1_700_000_000_000,
    }
}

// =============================================================================
// Message
// =============================================================================

#[test]
fn message_serializes_camel_case() {
    let value = serde_json::to_value(sample_message()).unwrap();
    assert_eq!(value["senderId"], json!(Uuid::nil().to_string()));
    assert_eq!(value["receiverId"], json!(Uuid::nil().to_string()));
    assert_eq!(value["isRead"], json!(false));
    assert_eq!(value["readAt"], json!(null));
    assert_eq!(value["createdAt"], json!(1_700_000_000_000_i64));
}

#[test]
fn message_round_trip() {
    let original = sample_message();
    let json = serde_json::to_string(&original).unwrap();
    let restored: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.text.as_deref(), Some("hi"));
    assert!(!restored.is_read);
    assert_eq!(restored.created_at, original.created_at);
}

#[test]
fn read_message_carries_read_at() {
    let mut message = sample_message();
    message.is_read = true;
    message.read_at = Some(1_700_000_001_000);
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["isRead"], json!(true));
    assert_eq!(value["readAt"], json!(1_700_000_001_000_i64));
}

// =============================================================================
// ServerEvent wire shapes
// =============================================================================

#[test]
fn get_online_users_wire_shape() {
    let user = Uuid::new_v4();
    let value = serde_json::to_value(ServerEvent::GetOnlineUsers(vec![user])).unwrap();
    assert_eq!(value["event"], json!("getOnlineUsers"));
    assert_eq!(value["data"], json!([user.to_string()]));
}

#[test]
fn new_message_wire_shape() {
    let value = serde_json::to_value(ServerEvent::NewMessage(sample_message())).unwrap();
    assert_eq!(value["event"], json!("newMessage"));
    assert_eq!(value["data"]["text"], json!("hi"));
}

#[test]
fn update_user_list_wire_shape() {
    let user = Uuid::new_v4();
    let value = serde_json::to_value(ServerEvent::UpdateUserList { user_id: user }).unwrap();
    assert_eq!(value["event"], json!("updateUserList"));
    assert_eq!(value["data"]["userId"], json!(user.to_string()));
}

#[test]
fn typing_relay_wire_shapes() {
    let sender = Uuid::new_v4();
    let typing = serde_json::to_value(ServerEvent::UserTyping { sender_id: sender }).unwrap();
    assert_eq!(typing["event"], json!("userTyping"));
    assert_eq!(typing["data"]["senderId"], json!(sender.to_string()));

    let stopped = serde_json::to_value(ServerEvent::UserStopTyping { sender_id: sender }).unwrap();
    assert_eq!(stopped["event"], json!("userStopTyping"));
}

#[test]
fn message_read_wire_shape() {
    let id = Uuid::new_v4();
    let value = serde_json::to_value(ServerEvent::MessageRead { message_id: id, read_at: 42 }).unwrap();
    assert_eq!(value["event"], json!("messageRead"));
    assert_eq!(value["data"]["messageId"], json!(id.to_string()));
    assert_eq!(value["data"]["readAt"], json!(42));
}

// =============================================================================
// ClientEvent parsing
// =============================================================================

#[test]
fn typing_event_parses() {
    let receiver = Uuid::new_v4();
    let raw = json!({ "event": "typing", "data": { "receiverId": receiver } }).to_string();
    let event: ClientEvent = serde_json::from_str(&raw).unwrap();
    match event {
        ClientEvent::Typing { receiver_id } => assert_eq!(receiver_id, receiver),
        ClientEvent::StopTyping { .. } => panic!("parsed as stopTyping"),
    }
}

#[test]
fn stop_typing_event_parses() {
    let receiver = Uuid::new_v4();
    let raw = json!({ "event": "stopTyping", "data": { "receiverId": receiver } }).to_string();
    let event: ClientEvent = serde_json::from_str(&raw).unwrap();
    assert!(matches!(event, ClientEvent::StopTyping { receiver_id } if receiver_id == receiver));
}

#[test]
fn unknown_event_rejected() {
    let raw = json!({ "event": "shutdown", "data": {} }).to_string();
    assert!(serde_json::from_str::<ClientEvent>(&raw).is_err());
}
