// Wire protocol DTOs and conversions for the game feed and the game HTTP API.

use crate::domain::{Position, QueuedAction, RosterEntry};
use crate::use_cases::{NewRoom, RoomDetails};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feed message type carrying a player action.
pub const ACTION_MESSAGE_TYPE: &str = "action";

// Outer shape shared by every feed message; the payload is decoded per type.
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

/// Payload of an `action` feed message.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionPayloadDto {
    pub id: String,
    pub angle: Vec<f32>,
    pub pull_power: f32,
}

/// Result of decoding one feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Action(QueuedAction),
    // Well-formed message of a type this client does not handle.
    Ignored { kind: String },
}

#[derive(Debug)]
pub enum DecodeError {
    InvalidJson(serde_json::Error),
    MissingMessage,
    InvalidPayload(serde_json::Error),
    EmptyTarget,
    MissingAngle,
    InvalidNumber { field: &'static str },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidJson(err) => write!(f, "invalid json: {err}"),
            DecodeError::MissingMessage => write!(f, "action without message payload"),
            DecodeError::InvalidPayload(err) => write!(f, "invalid action payload: {err}"),
            DecodeError::EmptyTarget => write!(f, "action without target id"),
            DecodeError::MissingAngle => write!(f, "action without angle"),
            DecodeError::InvalidNumber { field } => write!(f, "action has invalid {field}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes one text frame from the feed, validating action payloads.
pub fn decode_feed_message(text: &str) -> Result<FeedMessage, DecodeError> {
    let envelope: FeedEnvelope = serde_json::from_str(text).map_err(DecodeError::InvalidJson)?;
    if envelope.kind != ACTION_MESSAGE_TYPE {
        return Ok(FeedMessage::Ignored {
            kind: envelope.kind,
        });
    }

    let message = envelope.message.ok_or(DecodeError::MissingMessage)?;
    let payload: ActionPayloadDto =
        serde_json::from_value(message).map_err(DecodeError::InvalidPayload)?;
    payload.try_into().map(FeedMessage::Action)
}

impl TryFrom<ActionPayloadDto> for QueuedAction {
    type Error = DecodeError;

    fn try_from(payload: ActionPayloadDto) -> Result<Self, Self::Error> {
        let target_id = payload.id.trim();
        if target_id.is_empty() {
            return Err(DecodeError::EmptyTarget);
        }
        // Only the first angle component is meaningful.
        let angle = *payload.angle.first().ok_or(DecodeError::MissingAngle)?;
        if !angle.is_finite() {
            return Err(DecodeError::InvalidNumber { field: "angle" });
        }
        if !payload.pull_power.is_finite() || payload.pull_power < 0.0 {
            return Err(DecodeError::InvalidNumber {
                field: "pull_power",
            });
        }

        Ok(QueuedAction {
            target_id: target_id.to_string(),
            angle,
            magnitude: payload.pull_power,
        })
    }
}

/// Local flick submitted to the game action endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionSubmissionDto {
    pub room_id: String,
    pub player_id: String,
    pub angle: f32,
    pub pull_power: f32,
}

/// Body of the create-room request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequestDto {
    pub host_id: String,
    pub name: String,
    pub capacity: u8,
}

impl From<&NewRoom> for CreateRoomRequestDto {
    fn from(room: &NewRoom) -> Self {
        Self {
            host_id: room.host_id.clone(),
            name: room.name.clone(),
            capacity: room.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponseDto {
    pub room_id: String,
}

/// Room details including the roster shown in the waiting room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponseDto {
    pub room_id: String,
    pub name: String,
    pub capacity: u8,
    #[serde(default)]
    pub players: Vec<RoomPlayerDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomPlayerDto {
    pub id: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub power: Option<f32>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub cooldown: Option<u32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl From<RoomPlayerDto> for RosterEntry {
    fn from(player: RoomPlayerDto) -> Self {
        // Spawn is only known when both coordinates are present.
        let spawn = match (player.x, player.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        };
        Self {
            id: player.id,
            icon: player.icon_url,
            power: player.power,
            weight: player.weight,
            volume: player.volume,
            cooldown_ms: player.cooldown,
            spawn,
        }
    }
}

impl From<RoomResponseDto> for RoomDetails {
    fn from(room: RoomResponseDto) -> Self {
        Self {
            room_id: room.room_id,
            name: room.name,
            capacity: room.capacity,
            roster: room.players.into_iter().map(RosterEntry::from).collect(),
        }
    }
}
