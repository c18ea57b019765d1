// Local stand-ins for the room service and the action feed, bound to ephemeral ports.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use flick_client::interface_adapters::protocol::{
    CreateRoomRequestDto, CreateRoomResponseDto, RoomPlayerDto, RoomResponseDto,
};
use futures_util::{SinkExt, StreamExt};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

// Shared state behind the mock room service.
#[derive(Default)]
pub struct MockApiState {
    pub rooms: Mutex<HashMap<String, RoomResponseDto>>,
    // Raw JSON bodies received on the action endpoint.
    pub submissions: Mutex<Vec<serde_json::Value>>,
    // Roster handed to every room created through the API.
    pub roster: Vec<RoomPlayerDto>,
}

pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockApiState>,
}

impl MockApi {
    pub fn insert_room(&self, room: RoomResponseDto) {
        self.state
            .rooms
            .lock()
            .expect("rooms lock")
            .insert(room.room_id.clone(), room);
    }

    pub fn submissions(&self) -> Vec<serde_json::Value> {
        self.state.submissions.lock().expect("submissions lock").clone()
    }
}

pub fn player(id: &str, x: f32, y: f32) -> RoomPlayerDto {
    RoomPlayerDto {
        id: id.to_string(),
        x: Some(x),
        y: Some(y),
        ..RoomPlayerDto::default()
    }
}

// Start the mock room service and return its base URL.
pub async fn spawn_mock_api(roster: Vec<RoomPlayerDto>) -> MockApi {
    let state = Arc::new(MockApiState {
        roster,
        ..MockApiState::default()
    });

    let app = Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{room_id}", get(get_room))
        .route("/game/action", post(submit_action))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock api failed");
    });

    MockApi {
        base_url: format!("http://{addr}"),
        state,
    }
}

async fn create_room(
    State(state): State<Arc<MockApiState>>,
    Json(req): Json<CreateRoomRequestDto>,
) -> Response {
    if req.name == "reject" {
        return error(StatusCode::BAD_REQUEST, "room name rejected");
    }

    let room_id = format!("room-{}", uuid::Uuid::new_v4());
    let room = RoomResponseDto {
        room_id: room_id.clone(),
        name: req.name,
        capacity: req.capacity,
        players: state.roster.clone(),
    };
    state
        .rooms
        .lock()
        .expect("rooms lock")
        .insert(room_id.clone(), room);

    (StatusCode::CREATED, Json(CreateRoomResponseDto { room_id })).into_response()
}

async fn get_room(
    State(state): State<Arc<MockApiState>>,
    Path(room_id): Path<String>,
) -> Response {
    let room = state
        .rooms
        .lock()
        .expect("rooms lock")
        .get(&room_id)
        .cloned();
    match room {
        Some(room) => Json(room).into_response(),
        // The room service spells its error key "message".
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": "room not found" })),
        )
            .into_response(),
    }
}

async fn submit_action(
    State(state): State<Arc<MockApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if body["playerId"] == "blocked" {
        return error(StatusCode::FORBIDDEN, "player is cooling down");
    }
    state
        .submissions
        .lock()
        .expect("submissions lock")
        .push(body);
    StatusCode::NO_CONTENT.into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

// Start a feed that sends `frames` once to the first client, then holds the
// connection open until the client goes away.
pub async fn spawn_feed_once(frames: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let mut socket = accept_async(stream).await.expect("websocket handshake");
        for frame in frames {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        while let Some(Ok(_)) = socket.next().await {}
    });

    format!("ws://{addr}/ws")
}

// Start a feed that keeps sending `frame` every `every` until the client goes away.
pub async fn spawn_feed_repeating(frame: String, every: Duration) -> String {
    spawn_feed_repeating_until(frame, every, None).await
}

// Like `spawn_feed_repeating`, but the server closes the connection itself
// once `close_after` has passed since the handshake.
pub async fn spawn_feed_repeating_until(
    frame: String,
    every: Duration,
    close_after: Option<Duration>,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let socket = accept_async(stream).await.expect("websocket handshake");
        let (mut write, mut read) = socket.split();
        let mut ticker = tokio::time::interval(every);
        // A closing time far in the future stands in for "never".
        let deadline = tokio::time::sleep(close_after.unwrap_or(Duration::from_secs(3600)));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => {
                    let _ = write.send(Message::Close(None)).await;
                    // Drain until the client acknowledges the close.
                    while let Some(Ok(_)) = read.next().await {}
                    return;
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                        Some(Ok(_)) => {}
                    }
                }
                _ = ticker.tick() => {
                    if write.send(Message::Text(frame.clone().into())).await.is_err() {
                        return;
                    }
                }
            }
        }
    });

    format!("ws://{addr}/ws")
}

pub fn action_frame(target_id: &str, angle: f32, pull_power: f32) -> String {
    serde_json::json!({
        "type": "action",
        "message": { "id": target_id, "angle": [angle], "pull_power": pull_power }
    })
    .to_string()
}
