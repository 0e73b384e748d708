//! WebSocket variant of the API client.
//!
//! One long-lived connection per page against the `/table` endpoint.
//! Outbound commands travel as JSON envelopes `{"id": ..., "command": ...}`
//! with a fresh correlation id per command; the server pushes
//! `{"type", "self", "table" | "error"}` update frames. A periodic text
//! `"ping"` keeps the connection alive; the server's `"pong"` reply carries
//! no business meaning and is dropped before translation. When the socket
//! closes, session closure is signalled upward.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use fate_table_core::{
    Aspect, AspectId, CharacterId, Message, Notification, Player, Scene, Session, SessionId,
    UserId,
};

use crate::error::ApiError;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Build the WebSocket endpoint URL for a host, mirroring the page scheme.
pub fn table_endpoint(host: &str, secure: bool) -> String {
    format!("ws{}://{host}/table", if secure { "s" } else { "" })
}

#[derive(Debug, Serialize)]
struct CommandEnvelope {
    id: String,
    command: Command,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum Command {
    #[serde(rename_all = "camelCase")]
    Create { title: String },
    #[serde(rename_all = "camelCase")]
    Join { table_id: String, name: String },
    #[serde(rename_all = "camelCase")]
    UpdateFatePoints { player_id: String, fate_points: i32 },
    SpendFatePoint,
    #[serde(rename_all = "camelCase")]
    AddAspect {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    RemoveAspect { id: String },
}

#[derive(Debug, Deserialize)]
struct UpdateFrame {
    #[serde(rename = "self")]
    self_id: String,
    table: Option<TableFrame>,
    error: Option<ErrorFrame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableFrame {
    id: String,
    title: String,
    gamemaster: String,
    players: Vec<PlayerFrame>,
    aspects: Vec<AspectFrame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerFrame {
    id: String,
    name: String,
    fate_points: u32,
    aspects: Vec<AspectFrame>,
}

#[derive(Debug, Deserialize)]
struct AspectFrame {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorFrame {
    reason: Option<String>,
}

/// Handle to a live WebSocket connection.
///
/// Commands are fire-and-forget; updates arrive as [`Message`]s on the
/// channel passed to [`WsApi::connect`]. Dropping the handle tears the
/// connection down.
pub struct WsApi {
    commands: mpsc::UnboundedSender<String>,
}

impl WsApi {
    /// Connect to `url` and start translating update frames into messages.
    pub async fn connect(
        url: &str,
        messages: mpsc::UnboundedSender<Message>,
    ) -> Result<Self, ApiError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|err| ApiError::Transient(err.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drive(socket, rx, messages));

        tracing::debug!(url, "websocket connected");

        Ok(Self { commands: tx })
    }

    pub fn create_table(&self, title: &str) -> Result<(), ApiError> {
        self.send(Command::Create {
            title: title.to_string(),
        })
    }

    pub fn join_table(&self, session_id: &SessionId, name: &str) -> Result<(), ApiError> {
        self.send(Command::Join {
            table_id: session_id.to_string(),
            name: name.to_string(),
        })
    }

    pub fn update_fate_points(
        &self,
        player_id: &CharacterId,
        fate_points: i32,
    ) -> Result<(), ApiError> {
        self.send(Command::UpdateFatePoints {
            player_id: player_id.to_string(),
            fate_points,
        })
    }

    pub fn spend_fate_point(&self) -> Result<(), ApiError> {
        self.send(Command::SpendFatePoint)
    }

    pub fn add_aspect(
        &self,
        name: &str,
        player_id: Option<&CharacterId>,
    ) -> Result<(), ApiError> {
        self.send(Command::AddAspect {
            name: name.to_string(),
            player_id: player_id.map(|id| id.to_string()),
        })
    }

    pub fn remove_aspect(&self, id: &AspectId) -> Result<(), ApiError> {
        self.send(Command::RemoveAspect { id: id.to_string() })
    }

    fn send(&self, command: Command) -> Result<(), ApiError> {
        let envelope = CommandEnvelope {
            id: Uuid::new_v4().to_string(),
            command,
        };
        let text =
            serde_json::to_string(&envelope).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.commands
            .send(text)
            .map_err(|_| ApiError::Transient("websocket connection closed".into()))
    }
}

async fn drive(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut commands: mpsc::UnboundedReceiver<String>,
    messages: mpsc::UnboundedSender<Message>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The table this connection is currently attached to, learned from the
    // update frames. Closure is only meaningful once one was seen.
    let mut session: Option<SessionId> = None;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if sink.send(WsMessage::Text("ping".into())).await.is_err() {
                    break;
                }
            }

            command = commands.recv() => match command {
                Some(text) => {
                    if sink.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                // Handle dropped: the caller left, no closure signal needed.
                None => return,
            },

            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(message) = translate_frame(&text) {
                        if let Message::ReplaceScene(scene) = &message {
                            session = scene.session().map(|s| s.id.clone());
                        }
                        if messages.send(message).is_err() {
                            return;
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "websocket failed");
                    break;
                }
            },
        }
    }

    match session {
        Some(session_id) => {
            let _ = messages.send(Message::SessionClosed { session_id });
        }
        None => tracing::debug!("websocket closed before any table was joined"),
    }
}

/// Translate one inbound text frame into a reducer message.
///
/// Returns `None` for heartbeat replies and frames that do not parse.
fn translate_frame(text: &str) -> Option<Message> {
    if text == "pong" {
        return None;
    }

    let update: UpdateFrame = match serde_json::from_str(text) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable update frame");
            return None;
        }
    };

    match update.table {
        Some(table) => {
            let is_gamemaster = table.gamemaster == update.self_id;
            let session = convert_table(table, &update.self_id);
            let scene = if is_gamemaster {
                Scene::Gamemaster {
                    session,
                    result: None,
                }
            } else {
                Scene::PlayerCharacter {
                    session,
                    result: None,
                }
            };
            Some(Message::ReplaceScene(scene))
        }
        None => {
            let reason = update
                .error
                .and_then(|e| e.reason)
                .unwrap_or_else(|| "Error".to_string());
            Some(Message::PostNotification(vec![Notification::error(reason)]))
        }
    }
}

fn convert_table(table: TableFrame, self_id: &str) -> Session {
    Session {
        id: SessionId::from(table.id),
        title: table.title,
        gamemaster_id: UserId::from(table.gamemaster),
        players: table
            .players
            .into_iter()
            .map(|p| Player {
                is_self: p.id == self_id,
                id: CharacterId::from(p.id),
                name: p.name,
                fate_points: p.fate_points,
                aspects: p.aspects.into_iter().map(convert_aspect).collect(),
            })
            .collect(),
        aspects: table.aspects.into_iter().map(convert_aspect).collect(),
    }
}

fn convert_aspect(aspect: AspectFrame) -> Aspect {
    Aspect {
        id: AspectId::from(aspect.id),
        name: aspect.name,
    }
}
