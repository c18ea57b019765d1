// Ports to the simulation backend that moves and eliminates players.

use std::time::Duration;

use super::errors::SetupError;
use super::session::{PlayerState, Position};

/// One simulated participant.
pub trait Entity {
    fn id(&self) -> &str;
    fn is_alive(&self) -> bool;
    fn position(&self) -> Position;
    /// Adds a directional impulse. `angle` is used as received from the feed.
    fn apply_impulse(&mut self, angle: f32, magnitude: f32);
    /// Advances this entity by one frame.
    fn update(&mut self, dt: Duration);
}

/// Backend that creates entities and resolves interactions between them.
pub trait Simulation {
    type Entity: Entity;

    fn spawn(&mut self, player: &PlayerState) -> Result<Self::Entity, SetupError>;

    /// Runs after every entity's own update on each frame.
    fn resolve(&mut self, _entities: &mut [Self::Entity]) {}
}
