//! Integration tests for the board's sync protocol
//!
//! These tests run the real server and drive it over real WebSockets.

use futures_util::{SinkExt, StreamExt};
use server::network::Server;
use shared::{ClientEvent, ServerEvent, Shape, UserSnapshot, PALETTE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// PROTOCOL WIRE TESTS
mod protocol_tests {
    use super::*;

    /// A raw `updateRequest` frame answers with a raw `update` frame.
    #[tokio::test]
    async fn raw_update_request_round_trip() {
        let addr = start_server().await;
        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;

        socket
            .send(Message::Text(r#"{"event":"updateRequest"}"#.to_string()))
            .await
            .unwrap();

        let text = next_text_frame(&mut socket).await;
        assert!(text.starts_with(r#"{"event":"update","data":{"users":["#));
    }

    /// Placements may omit size and rotation; the server accepts defaults.
    #[tokio::test]
    async fn placement_without_optional_fields() {
        let addr = start_server().await;
        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;

        socket
            .send(Message::Text(
                r#"{"event":"placeObjects","data":[{"type":"circle","x":1.0,"y":1.0}]}"#
                    .to_string(),
            ))
            .await
            .unwrap();

        let users = poll_until(&mut socket, |users| {
            users.iter().any(|user| !user.placed_shapes.is_empty())
        })
        .await;

        assert_eq!(users[0].placed_shapes, vec![Shape::circle(1.0, 1.0)]);
    }

    /// Malformed frames are dropped without killing the connection.
    #[tokio::test]
    async fn malformed_frames_are_ignored() {
        let addr = start_server().await;
        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;

        for garbage in ["not json", "{}", r#"{"event":"teleport"}"#, ""] {
            socket
                .send(Message::Text(garbage.to_string()))
                .await
                .unwrap();
        }

        // The session still answers polls afterwards.
        let users = poll_until(&mut socket, |users| users.len() == 1).await;
        assert!(users[0].placed_shapes.is_empty());
    }

    /// Every connected user carries a palette color on the wire.
    #[tokio::test]
    async fn assigned_colors_come_from_palette() {
        let addr = start_server().await;

        let mut sockets = Vec::new();
        for _ in 0..4 {
            sockets.push(connect_client(addr).await);
        }

        let users = poll_until(&mut sockets[0], |users| users.len() == 4).await;
        for user in users {
            assert!(PALETTE.contains(&user.color));
        }
    }
}

/// SHARED-STATE SYNC TESTS
mod sync_tests {
    use super::*;

    /// One client's placement reaches every client through the next poll.
    #[tokio::test]
    async fn placement_reaches_all_clients() {
        let addr = start_server().await;

        let mut client_a = connect_client(addr).await;
        let first = next_update(&mut client_a).await;
        assert_eq!(first.len(), 1);
        let id_a = first[0].id;

        let mut client_b = connect_client(addr).await;
        let seen_by_b = next_update(&mut client_b).await;
        assert_eq!(seen_by_b.len(), 2);

        send_event(
            &mut client_a,
            &ClientEvent::PlaceObjects(vec![Shape::circle(1.0, 1.0)]),
        )
        .await;

        // B polls, exactly like the per-frame driving loop.
        let users = poll_until(&mut client_b, |users| {
            users.iter().any(|user| !user.placed_shapes.is_empty())
        })
        .await;

        assert_eq!(users.len(), 2);
        for user in &users {
            if user.id == id_a {
                assert_eq!(user.placed_shapes, vec![Shape::circle(1.0, 1.0)]);
            } else {
                assert!(user.placed_shapes.is_empty());
            }
        }

        // The same broadcast reached A too.
        let seen_by_a = wait_for_update(&mut client_a, |users| {
            users.iter().any(|user| !user.placed_shapes.is_empty())
        })
        .await;
        assert_eq!(seen_by_a.len(), 2);
    }

    /// Placements from one user accumulate in order across commits.
    #[tokio::test]
    async fn placements_accumulate_in_order() {
        let addr = start_server().await;
        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;

        send_event(
            &mut socket,
            &ClientEvent::PlaceObjects(vec![Shape::circle(1.0, 1.0), Shape::rectangle(2.0, 2.0)]),
        )
        .await;
        send_event(
            &mut socket,
            &ClientEvent::PlaceObjects(vec![Shape::circle(3.0, 3.0)]),
        )
        .await;

        let users = poll_until(&mut socket, |users| users[0].placed_shapes.len() == 3).await;
        assert_eq!(
            users[0].placed_shapes,
            vec![
                Shape::circle(1.0, 1.0),
                Shape::rectangle(2.0, 2.0),
                Shape::circle(3.0, 3.0),
            ]
        );
    }

    /// Disconnecting removes the user from every later snapshot.
    #[tokio::test]
    async fn disconnect_removes_user_from_snapshots() {
        let addr = start_server().await;

        let mut client_a = connect_client(addr).await;
        let first = next_update(&mut client_a).await;
        let id_a = first[0].id;

        let mut client_b = connect_client(addr).await;
        let _ = next_update(&mut client_b).await;

        let _ = poll_until(&mut client_a, |users| users.len() == 2).await;

        client_b.close(None).await.unwrap();

        let users = poll_until(&mut client_a, |users| users.len() == 1).await;
        assert_eq!(users[0].id, id_a);
    }

    /// A reconnecting client starts from an empty slate: its old shapes left
    /// with its old session.
    #[tokio::test]
    async fn reconnect_starts_empty() {
        let addr = start_server().await;

        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;
        send_event(
            &mut socket,
            &ClientEvent::PlaceObjects(vec![Shape::circle(5.0, 5.0)]),
        )
        .await;
        let _ = poll_until(&mut socket, |users| users[0].placed_shapes.len() == 1).await;
        socket.close(None).await.unwrap();

        let mut reconnected = connect_client(addr).await;
        let users = poll_until(&mut reconnected, |users| users.len() == 1).await;
        assert!(users[0].placed_shapes.is_empty());
    }
}

/// GENERATOR-TO-PROTOCOL TESTS
mod generator_tests {
    use super::*;
    use client::collections::{convert_radial_collection, ObjectKind, RadialCollection};
    use shared::{CANVAS_HEIGHT, CANVAS_WIDTH};

    /// A generated radial stamp survives the round trip through the server
    /// exactly as sent.
    #[tokio::test]
    async fn radial_stamp_round_trips_through_server() {
        let addr = start_server().await;
        let mut socket = connect_client(addr).await;
        let _ = next_update(&mut socket).await;

        let collection = RadialCollection {
            object_kind: ObjectKind::Circle,
            x: 400.0,
            y: 400.0,
            radius: 50.0,
            repeat_count: 5,
            jitter_factor: 0.0,
        };
        let shapes = convert_radial_collection(
            &mut rand::thread_rng(),
            &collection,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
        );
        assert_eq!(shapes.len(), 5);

        send_event(&mut socket, &ClientEvent::PlaceObjects(shapes.clone())).await;

        let users = poll_until(&mut socket, |users| users[0].placed_shapes.len() == 5).await;
        assert_eq!(users[0].placed_shapes, shapes);
    }
}

// HELPER FUNCTIONS

async fn start_server() -> SocketAddr {
    let mut server = Server::bind("127.0.0.1:0").await.expect("bind server");
    let addr = server.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect_client(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}", addr))
        .await
        .expect("connect to server");
    socket
}

async fn send_event(socket: &mut Socket, event: &ClientEvent) {
    let text = serde_json::to_string(event).expect("encode event");
    socket.send(Message::Text(text)).await.expect("send event");
}

async fn next_text_frame(socket: &mut Socket) -> String {
    loop {
        let frame = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("socket error");

        if let Message::Text(text) = frame {
            return text;
        }
    }
}

async fn next_update(socket: &mut Socket) -> Vec<UserSnapshot> {
    let text = next_text_frame(socket).await;
    let ServerEvent::Update { users } =
        serde_json::from_str(&text).expect("decode update frame");
    users
}

/// Reads already-queued updates until one matches.
async fn wait_for_update(
    socket: &mut Socket,
    predicate: impl Fn(&[UserSnapshot]) -> bool,
) -> Vec<UserSnapshot> {
    for _ in 0..50 {
        let users = next_update(socket).await;
        if predicate(&users) {
            return users;
        }
    }
    panic!("No queued update matched the expected state");
}

/// Polls like the client's frame loop: send `updateRequest`, read the next
/// update, repeat until the predicate matches.
async fn poll_until(
    socket: &mut Socket,
    predicate: impl Fn(&[UserSnapshot]) -> bool,
) -> Vec<UserSnapshot> {
    for _ in 0..50 {
        send_event(socket, &ClientEvent::UpdateRequest).await;
        let users = next_update(socket).await;
        if predicate(&users) {
            return users;
        }
    }
    panic!("No update matched the expected state after polling");
}
