// Domain layer: session model, simulation ports, and gameplay rules.

pub mod action;
pub mod entity;
pub mod errors;
pub mod roster;
pub mod session;
pub mod systems;
pub mod tuning;

pub use action::{Flick, PointerGesture, QueuedAction};
pub use entity::{Entity, Simulation};
pub use errors::{SessionError, SetupError};
pub use roster::{RosterEntry, build_players};
pub use session::{Phase, PlayerId, PlayerPatch, PlayerState, Position, Session, SessionEvent};
