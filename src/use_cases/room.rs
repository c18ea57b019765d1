// Room preparation: create or join a room and load its roster before a match.

use crate::domain::RosterEntry;
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

pub const MIN_ROOM_CAPACITY: u8 = 2;
pub const MAX_ROOM_CAPACITY: u8 = 8;

/// Validated request to open a new room.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub host_id: String,
    pub name: String,
    pub capacity: u8,
}

impl NewRoom {
    pub fn new(host_id: &str, name: &str, capacity: u8) -> Result<Self, RoomError> {
        let host_id = host_id.trim();
        if host_id.is_empty() {
            return Err(RoomError::MissingHost);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidName);
        }
        if !(MIN_ROOM_CAPACITY..=MAX_ROOM_CAPACITY).contains(&capacity) {
            return Err(RoomError::InvalidCapacity { capacity });
        }

        Ok(Self {
            host_id: host_id.to_string(),
            name: name.to_string(),
            capacity,
        })
    }
}

/// Room as announced by the room service.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDetails {
    pub room_id: String,
    pub name: String,
    pub capacity: u8,
    pub roster: Vec<RosterEntry>,
}

/// Which room the client should play in.
#[derive(Debug, Clone)]
pub enum RoomTarget {
    Join { room_id: String },
    Create(NewRoom),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomError {
    MissingHost,
    InvalidName,
    InvalidCapacity { capacity: u8 },
    Directory(String),
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomError::MissingHost => write!(f, "host id is required"),
            RoomError::InvalidName => write!(f, "room name is required"),
            RoomError::InvalidCapacity { capacity } => write!(
                f,
                "capacity {capacity} is outside {MIN_ROOM_CAPACITY}..={MAX_ROOM_CAPACITY}"
            ),
            RoomError::Directory(message) => write!(f, "room service error: {message}"),
        }
    }
}

impl std::error::Error for RoomError {}

// Port to the room service.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    type Error: fmt::Display;

    async fn create_room(&self, room: &NewRoom) -> Result<String, Self::Error>;
    async fn fetch_room(&self, room_id: &str) -> Result<RoomDetails, Self::Error>;
}

/// Resolves the target room and returns its details with the roster.
pub async fn prepare_room<D: RoomDirectory>(
    directory: &D,
    target: RoomTarget,
) -> Result<RoomDetails, RoomError> {
    let room_id = match target {
        RoomTarget::Join { room_id } => room_id,
        RoomTarget::Create(room) => {
            let room_id = directory
                .create_room(&room)
                .await
                .map_err(|e| RoomError::Directory(e.to_string()))?;
            info!(%room_id, name = %room.name, capacity = room.capacity, "room created");
            room_id
        }
    };

    let details = directory
        .fetch_room(&room_id)
        .await
        .map_err(|e| RoomError::Directory(e.to_string()))?;

    if details.roster.len() > usize::from(details.capacity) {
        // The service is authoritative; only note the mismatch.
        warn!(
            room_id = %details.room_id,
            players = details.roster.len(),
            capacity = details.capacity,
            "roster exceeds room capacity"
        );
    }

    Ok(details)
}
