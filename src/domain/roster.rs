// Roster validation: room entries become player records before a match starts.

use std::collections::HashSet;

use super::errors::SetupError;
use super::session::{PlayerId, PlayerState, Position};
use super::tuning::PlayerDefaults;

/// Player entry as announced by the room, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub icon: Option<String>,
    pub power: Option<f32>,
    pub weight: Option<f32>,
    pub volume: Option<f32>,
    pub cooldown_ms: Option<u32>,
    pub spawn: Option<Position>,
}

/// Validates the roster and builds the initial player records.
///
/// Missing spawn coordinates are fatal: defaulting them would put this client
/// out of sync with every other participant.
pub fn build_players(
    entries: &[RosterEntry],
    defaults: PlayerDefaults,
) -> Result<Vec<PlayerState>, SetupError> {
    if entries.is_empty() {
        return Err(SetupError::EmptyRoster);
    }

    let mut seen = HashSet::new();
    let mut players = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(SetupError::BlankPlayerId { index });
        }
        if !seen.insert(id.to_string()) {
            return Err(SetupError::DuplicatePlayer {
                player_id: id.to_string(),
            });
        }

        let Some(spawn) = entry.spawn else {
            return Err(SetupError::MissingSpawn {
                player_id: id.to_string(),
            });
        };
        if !spawn.x.is_finite() || !spawn.y.is_finite() {
            return Err(SetupError::MissingSpawn {
                player_id: id.to_string(),
            });
        }

        let power = positive(id, "power", entry.power.unwrap_or(defaults.power))?;
        let weight = positive(id, "weight", entry.weight.unwrap_or(defaults.weight))?;
        let volume = positive(id, "volume", entry.volume.unwrap_or(defaults.volume))?;

        players.push(PlayerState {
            id: id.to_string(),
            icon: entry.icon.clone(),
            power,
            weight,
            volume,
            cooldown: entry.cooldown_ms.unwrap_or(defaults.cooldown_ms),
            position: spawn,
            is_alive: true,
            is_active: false,
        });
    }

    Ok(players)
}

fn positive(player_id: &str, attribute: &'static str, value: f32) -> Result<f32, SetupError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SetupError::InvalidAttribute {
            player_id: player_id.to_string(),
            attribute,
            value,
        })
    }
}
