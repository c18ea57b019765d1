use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{
    ActionSubmissionDto, CreateRoomRequestDto, CreateRoomResponseDto, RoomResponseDto,
};
use crate::use_cases::{NewRoom, RoomDetails, RoomDirectory};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum ApiError {
    Transport(reqwest::Error),
    Upstream {
        status: StatusCode,
        message: Option<String>,
    },
    Decode(reqwest::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "game api transport error: {err}"),
            ApiError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "game api error {status}: {message}")
                } else {
                    write!(f, "game api error {status}")
                }
            }
            ApiError::Decode(err) => write!(f, "game api response decode error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

// Thin reqwest client for the room and game-action endpoints.
#[derive(Clone)]
pub struct GameApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GameApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post_room(&self, room: &NewRoom) -> Result<String, ApiError> {
        let url = format!("{}/rooms", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&CreateRoomRequestDto::from(room))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let created: CreateRoomResponseDto = decode(res).await?;
        Ok(created.room_id)
    }

    pub async fn get_room(&self, room_id: &str) -> Result<RoomDetails, ApiError> {
        let url = format!("{}/rooms/{}", self.base_url, room_id);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let room: RoomResponseDto = decode(res).await?;
        Ok(room.into())
    }

    pub async fn submit_action(&self, submission: &ActionSubmissionDto) -> Result<(), ApiError> {
        let url = format!("{}/game/action", self.base_url);
        let res = self
            .http
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(upstream_error(status, res).await);
        }
        Ok(())
    }

    /// Submits without waiting for the result; failures are only logged.
    pub fn spawn_submit_action(&self, submission: ActionSubmissionDto) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            match client.submit_action(&submission).await {
                Ok(()) => debug!(
                    player_id = %submission.player_id,
                    angle = submission.angle,
                    pull_power = submission.pull_power,
                    "action submitted"
                ),
                Err(e) => warn!(
                    player_id = %submission.player_id,
                    error = %e,
                    "action submission failed"
                ),
            }
        })
    }
}

#[async_trait]
impl RoomDirectory for GameApiClient {
    type Error = ApiError;

    async fn create_room(&self, room: &NewRoom) -> Result<String, ApiError> {
        self.post_room(room).await
    }

    async fn fetch_room(&self, room_id: &str) -> Result<RoomDetails, ApiError> {
        self.get_room(room_id).await
    }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
    let status = res.status();
    // Keep upstream status/message so callers can report 4xx semantics.
    if !status.is_success() {
        return Err(upstream_error(status, res).await);
    }
    res.json::<T>().await.map_err(ApiError::Decode)
}

async fn upstream_error(status: StatusCode, res: reqwest::Response) -> ApiError {
    let message = res
        .json::<ErrorResponse>()
        .await
        .ok()
        .map(|payload| payload.error);
    ApiError::Upstream { status, message }
}
