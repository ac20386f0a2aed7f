use super::*;
use crate::state::test_helpers;
use tokio::time::{Duration, timeout};

async fn recv_event(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("event receive timed out")
        .expect("event channel closed unexpectedly")
}

async fn assert_no_event(rx: &mut mpsc::Receiver<ServerEvent>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no pushed event"
    );
}

#[tokio::test]
async fn typing_event_relays_to_receiver() {
    let state = test_helpers::test_app_state();
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let mut receiver_rx = test_helpers::connect_user(&state, receiver).await;

    let raw = serde_json::json!({ "event": "typing", "data": { "receiverId": receiver } }).to_string();
    handle_client_text(&state, sender, &raw).await;

    let ServerEvent::UserTyping { sender_id } = recv_event(&mut receiver_rx).await else {
        panic!("expected userTyping relay");
    };
    assert_eq!(sender_id, sender);
}

#[tokio::test]
async fn stop_typing_event_relays_to_receiver() {
    let state = test_helpers::test_app_state();
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let mut receiver_rx = test_helpers::connect_user(&state, receiver).await;

    let raw = serde_json::json!({ "event": "stopTyping", "data": { "receiverId": receiver } }).to_string();
    handle_client_text(&state, sender, &raw).await;

    assert!(matches!(
        recv_event(&mut receiver_rx).await,
        ServerEvent::UserStopTyping { sender_id } if sender_id == sender
    ));
}

#[tokio::test]
async fn typing_to_offline_receiver_is_dropped_silently() {
    let state = test_helpers::test_app_state();
    let sender = Uuid::new_v4();
    let mut sender_rx = test_helpers::connect_user(&state, sender).await;

    let raw = serde_json::json!({ "event": "typing", "data": { "receiverId": Uuid::new_v4() } }).to_string();
    handle_client_text(&state, sender, &raw).await;

    assert_no_event(&mut sender_rx).await;
}

#[tokio::test]
async fn malformed_inbound_text_is_ignored() {
    let state = test_helpers::test_app_state();
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let mut receiver_rx = test_helpers::connect_user(&state, receiver).await;

    handle_client_text(&state, sender, "not json at all").await;
    handle_client_text(&state, sender, r#"{"event":"unknown","data":{}}"#).await;

    assert_no_event(&mut receiver_rx).await;
}

// ====== FULL SOCKET TESTS ======
//
// Drive the handshake and socket loop end to end over a real listener.

mod socket {
    use super::test_helpers;
    use futures::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use tokio::time::{Duration, timeout};
    use tokio_tungstenite::tungstenite::Message as WireMessage;
    use uuid::Uuid;

    type Socket = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn spawn_server() -> SocketAddr {
        let state = test_helpers::test_app_state();
        let app = crate::routes::app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn connect(addr: SocketAddr, user_id: Uuid) -> Socket {
        let url = format!("ws://{addr}/api/ws?user_id={user_id}");
        let (socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();
        socket
    }

    async fn next_json(socket: &mut Socket) -> Value {
        loop {
            let frame = timeout(Duration::from_secs(2), socket.next())
                .await
                .expect("socket frame timed out")
                .expect("socket closed unexpectedly")
                .unwrap();
            if let WireMessage::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    async fn next_event(socket: &mut Socket, event: &str) -> Value {
        loop {
            let frame = next_json(socket).await;
            if frame["event"] == event {
                return frame;
            }
        }
    }

    #[tokio::test]
    async fn connect_receives_online_set_including_self() {
        let addr = spawn_server().await;
        let user = Uuid::new_v4();

        let mut socket = connect(addr, user).await;

        let frame = next_event(&mut socket, "getOnlineUsers").await;
        let online = frame["data"].as_array().unwrap();
        assert!(online.contains(&json!(user)));
    }

    #[tokio::test]
    async fn second_connection_is_broadcast_to_existing_sockets() {
        let addr = spawn_server().await;
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let mut first_socket = connect(addr, first).await;
        next_event(&mut first_socket, "getOnlineUsers").await;

        let _second_socket = connect(addr, second).await;

        let frame = next_event(&mut first_socket, "getOnlineUsers").await;
        let online = frame["data"].as_array().unwrap();
        assert!(online.contains(&json!(first)));
        assert!(online.contains(&json!(second)));
    }

    #[tokio::test]
    async fn typing_relays_between_live_sockets() {
        let addr = spawn_server().await;
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();

        let mut receiver_socket = connect(addr, receiver).await;
        let mut sender_socket = connect(addr, sender).await;

        let raw = json!({ "event": "typing", "data": { "receiverId": receiver } }).to_string();
        sender_socket.send(WireMessage::text(raw)).await.unwrap();

        let frame = next_event(&mut receiver_socket, "userTyping").await;
        assert_eq!(frame["data"]["senderId"], json!(sender));
    }

    #[tokio::test]
    async fn nil_user_id_is_rejected_at_handshake() {
        let addr = spawn_server().await;
        let url = format!("ws://{addr}/api/ws?user_id={}", Uuid::nil());

        assert!(tokio_tungstenite::connect_async(url).await.is_err());
    }
}
