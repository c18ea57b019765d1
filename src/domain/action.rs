// Action records and the local drag-release gesture that produces them.

use super::session::{PlayerId, Position};
use super::tuning::GestureTuning;

/// Directional impulse request for one player, consumed once by the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedAction {
    pub target_id: PlayerId,
    pub angle: f32,
    pub magnitude: f32,
}

/// Pointer press/release pair captured by the local input surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGesture {
    pub start: Position,
    pub end: Position,
}

/// Angle and pull power derived from a gesture, ready for submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flick {
    pub angle: f32,
    pub pull_power: f32,
}

impl PointerGesture {
    /// Converts the drag into a flick opposite to the drag direction.
    ///
    /// Returns `None` for drags shorter than the dead zone.
    pub fn to_flick(&self, tuning: &GestureTuning) -> Option<Flick> {
        let dx = self.start.x - self.end.x;
        let dy = self.start.y - self.end.y;
        let length = (dx * dx + dy * dy).sqrt();
        if !length.is_finite() || length < tuning.dead_zone {
            return None;
        }

        let pull_power = (length * tuning.power_per_pixel).min(tuning.max_pull_power);
        Some(Flick {
            angle: dy.atan2(dx),
            pull_power,
        })
    }
}
