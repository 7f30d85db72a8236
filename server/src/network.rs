//! WebSocket transport and the event loop that owns the board state.

use crate::store::BoardStore;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent, UserColor};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Messages funneled from connection tasks into the event loop.
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        session_id: u32,
        sender: mpsc::UnboundedSender<Message>,
    },
    Event {
        session_id: u32,
        event: ClientEvent,
    },
    Disconnected {
        session_id: u32,
    },
}

/// Authoritative board server.
///
/// Connection tasks never touch the store directly; they forward
/// [`ServerMessage`]s into [`Server::run`], which is the only mutator.
/// Every `updateRequest` fans the full snapshot out to every connection, so
/// N clients polling at frame rate cost O(N^2) messages per frame. That is
/// the protocol's contract; it caps how far a single board scales.
pub struct Server {
    listener: TcpListener,
    store: BoardStore,
    connections: HashMap<u32, mpsc::UnboundedSender<Message>>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    /// Binds the listener; the accept loop starts in [`Server::run`].
    pub async fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            store: BoardStore::new(),
            connections: HashMap::new(),
            server_tx,
            server_rx,
        })
    }

    /// Address the listener bound to; useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections and processes their events until shutdown.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut next_session_id: u32 = 1;

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let session_id = next_session_id;
                            next_session_id += 1;
                            tokio::spawn(handle_connection(
                                stream,
                                addr,
                                session_id,
                                self.server_tx.clone(),
                            ));
                        }
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }
                },
            }
        }

        Ok(())
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Connected { session_id, sender } => {
                let color = UserColor::random(&mut rand::thread_rng());
                self.store.add_user(session_id, color);
                self.connections.insert(session_id, sender);
                self.broadcast_update();
            }

            ServerMessage::Event { session_id, event } => {
                self.handle_event(session_id, event);
            }

            ServerMessage::Disconnected { session_id } => {
                self.connections.remove(&session_id);
                self.store.remove_user(session_id);
            }
        }
    }

    fn handle_event(&mut self, session_id: u32, event: ClientEvent) {
        match event {
            ClientEvent::UpdateRequest => self.broadcast_update(),

            ClientEvent::PlaceObjects(shapes) => {
                debug!("Session {} placing {} shapes", session_id, shapes.len());

                // A placement can still be in flight when its session's
                // disconnect is processed.
                if let Err(e) = self.store.append_shapes(session_id, shapes) {
                    warn!("Discarding placement: {}", e);
                }
            }
        }
    }

    /// Encodes the current snapshot once and fans it out to every connection,
    /// pruning any whose writer has gone away.
    fn broadcast_update(&mut self) {
        let event = ServerEvent::Update {
            users: self.store.snapshot(),
        };

        let frame = match serde_json::to_string(&event) {
            Ok(text) => Message::Text(text),
            Err(e) => {
                error!("Failed to encode update: {}", e);
                return;
            }
        };

        self.connections.retain(|session_id, sender| {
            if sender.send(frame.clone()).is_err() {
                debug!("Dropping closed connection for session {}", session_id);
                false
            } else {
                true
            }
        });
    }
}

/// Performs the WebSocket handshake and pumps one connection.
///
/// The reader half forwards decoded events into the event loop; a writer
/// task drains the per-connection outbound queue. Either half ending tears
/// the session down.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    session_id: u32,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {}: {}", addr, e);
            return;
        }
    };

    info!("Session {} connected from {}", session_id, addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

    if server_tx
        .send(ServerMessage::Connected {
            session_id,
            sender: out_tx,
        })
        .is_err()
    {
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if ws_sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if server_tx
                        .send(ServerMessage::Event { session_id, event })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => warn!("Session {} sent an unrecognized event: {}", session_id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Session {} socket error: {}", session_id, e);
                break;
            }
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { session_id });
    writer.abort();
}
