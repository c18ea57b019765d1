use crate::domain::Flick;
use crate::interface_adapters::clients::GameApiClient;
use crate::interface_adapters::protocol::ActionSubmissionDto;

#[derive(Clone)]
pub struct MatchContext {
    // Outbound API used for fire-and-forget action submission.
    pub api: GameApiClient,
    // Room the match runs in.
    pub room_id: String,
    // Player controlled from this client; `None` when spectating.
    pub local_player_id: Option<String>,
}

impl MatchContext {
    pub fn submission(&self, flick: Flick) -> Option<ActionSubmissionDto> {
        let player_id = self.local_player_id.clone()?;
        Some(ActionSubmissionDto {
            room_id: self.room_id.clone(),
            player_id,
            angle: flick.angle,
            pull_power: flick.pull_power,
        })
    }
}
