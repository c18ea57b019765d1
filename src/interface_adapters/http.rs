// Shared HTTP error payloads returned by the game API.

#[derive(Debug, serde::Deserialize)]
pub struct ErrorResponse {
    // Services disagree on the key; accept both spellings.
    #[serde(alias = "message")]
    pub error: String,
}
