//! WebSocket bridge between the render loop and the board server.

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{ClientEvent, ServerEvent, Shape, UserSnapshot};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Client half of the sync protocol.
///
/// The render loop cannot block on IO, so the socket lives on its own thread
/// behind a pair of unbounded channels: events go out, snapshots come back.
/// Dropping the client drops the outgoing channel, which ends the IO thread
/// and closes the connection.
pub struct BoardClient {
    outgoing: mpsc::UnboundedSender<ClientEvent>,
    incoming: mpsc::UnboundedReceiver<Vec<UserSnapshot>>,
}

impl BoardClient {
    /// Spawns the IO thread and starts connecting to `url`.
    ///
    /// Returns as soon as the thread is up; connection failures surface in
    /// the log and leave `poll_update` permanently empty.
    pub fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let url = url.to_string();

        std::thread::Builder::new()
            .name("board-net".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start network runtime: {}", e);
                        return;
                    }
                };

                runtime.block_on(pump_connection(url, out_rx, in_tx));
            })?;

        Ok(BoardClient {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }

    /// Asks the server to broadcast the current snapshot. Sent once per frame.
    pub fn request_update(&self) {
        let _ = self.outgoing.send(ClientEvent::UpdateRequest);
    }

    /// Commits a placement to the server.
    pub fn place_objects(&self, shapes: Vec<Shape>) {
        let _ = self.outgoing.send(ClientEvent::PlaceObjects(shapes));
    }

    /// Returns the newest snapshot received since the last call, if any.
    ///
    /// Older queued snapshots are discarded: the view is a full-state
    /// replace, so only the latest matters.
    pub fn poll_update(&mut self) -> Option<Vec<UserSnapshot>> {
        let mut latest = None;
        while let Ok(users) = self.incoming.try_recv() {
            latest = Some(users);
        }
        latest
    }
}

/// Owns the socket for the lifetime of the connection: encodes outgoing
/// events, decodes incoming updates, stops when either side goes away.
async fn pump_connection(
    url: String,
    mut outgoing: mpsc::UnboundedReceiver<ClientEvent>,
    incoming: mpsc::UnboundedSender<Vec<UserSnapshot>>,
) {
    let (ws_stream, _) = match connect_async(&url).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to {}: {}", url, e);
            return;
        }
    };

    info!("Connected to {}", url);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            event = outgoing.recv() => {
                let event = match event {
                    Some(event) => event,
                    None => break,
                };

                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode event: {}", e);
                        continue;
                    }
                };

                if ws_sender.send(Message::Text(text)).await.is_err() {
                    warn!("Server connection closed while sending");
                    break;
                }
            },

            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(ServerEvent::Update { users }) => {
                                if incoming.send(users).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Unrecognized server event: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Socket error: {}", e);
                        break;
                    }
                }
            },
        }
    }
}
