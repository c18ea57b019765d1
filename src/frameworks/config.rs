use std::{env, time::Duration};

// Runtime/client constants (not gameplay tuning).

pub fn api_base_url() -> String {
    env::var("GAME_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

pub fn feed_url() -> String {
    env::var("GAME_FEED_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string())
}

pub fn api_timeout() -> Duration {
    let millis = env::var("API_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

pub fn room_id() -> Option<String> {
    non_empty_var("GAME_ROOM_ID")
}

// The host id doubles as the local player when creating a room.
pub fn player_id() -> Option<String> {
    non_empty_var("GAME_PLAYER_ID").or_else(|| non_empty_var("GAME_HOST_ID"))
}

pub fn room_name() -> String {
    non_empty_var("GAME_ROOM_NAME").unwrap_or_else(|| "Flick room".to_string())
}

pub fn room_capacity() -> u8 {
    env::var("GAME_ROOM_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4)
}

pub fn headless() -> bool {
    matches!(
        env::var("GAME_HEADLESS").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub const ACTION_CHANNEL_CAPACITY: usize = 1024;
pub const GESTURE_CHANNEL_CAPACITY: usize = 16;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(1000 / 60);
// Frames longer than this are clamped so a stalled process does not teleport pucks.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(100);
pub const RESULT_REDIRECT_DELAY: Duration = Duration::from_millis(3000);

/// Everything the client needs to run one match.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub feed_url: String,
    pub api_timeout: Duration,
    pub room_id: Option<String>,
    pub player_id: Option<String>,
    pub room_name: String,
    pub room_capacity: u8,
    pub headless: bool,
    pub frame_interval: Duration,
    // Read local drag gestures from stdin.
    pub read_stdin: bool,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: api_base_url(),
            feed_url: feed_url(),
            api_timeout: api_timeout(),
            room_id: room_id(),
            player_id: player_id(),
            room_name: room_name(),
            room_capacity: room_capacity(),
            headless: headless(),
            frame_interval: FRAME_INTERVAL,
            read_stdin: true,
        }
    }
}
