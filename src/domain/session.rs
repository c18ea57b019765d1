// Client-local session aggregate: phase, players, and the finishing order.

use std::collections::HashMap;

pub type PlayerId = String;

/// Top-level mode of a match as seen by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Countdown,
    Waiting,
    Playing,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Countdown => "countdown",
            Phase::Waiting => "waiting",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Per-player record mirrored from the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub icon: Option<String>,
    pub power: f32,
    pub weight: f32,
    pub volume: f32,
    /// Milliseconds before the player may act again.
    pub cooldown: u32,
    pub position: Position,
    pub is_alive: bool,
    /// True while the post-action cooldown is running.
    pub is_active: bool,
}

/// Partial update merged into an existing `PlayerState`.
///
/// `id` is intentionally absent: identifiers are assigned once at creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub icon: Option<Option<String>>,
    pub power: Option<f32>,
    pub weight: Option<f32>,
    pub volume: Option<f32>,
    pub cooldown: Option<u32>,
    pub position: Option<Position>,
    pub is_alive: Option<bool>,
    pub is_active: Option<bool>,
}

impl PlayerPatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn eliminated() -> Self {
        Self {
            is_alive: Some(false),
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn apply(self, player: &mut PlayerState) {
        if let Some(icon) = self.icon {
            player.icon = icon;
        }
        if let Some(power) = self.power {
            player.power = power;
        }
        if let Some(weight) = self.weight {
            player.weight = weight;
        }
        if let Some(volume) = self.volume {
            player.volume = volume;
        }
        if let Some(cooldown) = self.cooldown {
            player.cooldown = cooldown;
        }
        if let Some(position) = self.position {
            player.position = position;
        }
        if let Some(is_alive) = self.is_alive {
            // Vitality never comes back once lost.
            player.is_alive = player.is_alive && is_alive;
        }
        if let Some(is_active) = self.is_active {
            player.is_active = is_active;
        }
    }
}

/// Root aggregate for one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub players: HashMap<PlayerId, PlayerState>,
    pub winner: Option<PlayerId>,
    /// Winner first, then eliminated players in the order they were recorded.
    pub elimination_order: Vec<PlayerId>,
}

impl Session {
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.is_alive).count()
    }
}

/// Notification emitted by the store after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PlayerAdded(PlayerState),
    PlayerUpdated(PlayerState),
    PlayerRemoved { player_id: PlayerId },
    PhaseChanged(Phase),
    WinnerSet { winner_id: PlayerId },
    StateReset,
}
