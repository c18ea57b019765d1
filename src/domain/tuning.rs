// Gameplay tuning for the flick arena.
// Keep this separate from runtime/client configuration (URLs, tick rates, buffer sizes).

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ArenaTuning {
    /// Playing field width in pixels, centred on the origin.
    pub width: f32,

    /// Playing field height in pixels, centred on the origin.
    pub height: f32,

    /// Puck radius in pixels at volume 50.
    pub base_radius: f32,

    /// Fraction of velocity kept per second.
    pub friction: f32,

    /// Velocity in pixels per second added per unit of pull power at power 50.
    pub impulse_scale: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            base_radius: 30.0,
            friction: 0.35,
            impulse_scale: 6.0,
        }
    }
}

/// Attribute values used when the room roster omits them.
#[derive(Debug, Clone, Copy)]
pub struct PlayerDefaults {
    pub power: f32,
    pub weight: f32,
    pub volume: f32,
    pub cooldown_ms: u32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            power: 50.0,
            weight: 50.0,
            volume: 50.0,
            cooldown_ms: 500,
        }
    }
}

/// Lead-in sequence shown before play starts.
#[derive(Debug, Clone, Copy)]
pub struct CountdownTuning {
    /// How long "READY?" stays up before the numbers start.
    pub ready_hold: Duration,
    /// First number shown; counts down to 1.
    pub count_from: u32,
    /// Time between numbers.
    pub step: Duration,
    /// How long the terminal marker stays up before play starts.
    pub go_hold: Duration,
}

impl CountdownTuning {
    pub fn total(&self) -> Duration {
        self.ready_hold + self.step * self.count_from + self.go_hold
    }
}

impl Default for CountdownTuning {
    fn default() -> Self {
        Self {
            ready_hold: Duration::from_secs(1),
            count_from: 3,
            step: Duration::from_secs(1),
            go_hold: Duration::from_millis(500),
        }
    }
}

/// Mapping from a pointer drag to a flick.
#[derive(Debug, Clone, Copy)]
pub struct GestureTuning {
    /// Drags shorter than this many pixels are ignored.
    pub dead_zone: f32,
    pub power_per_pixel: f32,
    pub max_pull_power: f32,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            dead_zone: 4.0,
            power_per_pixel: 0.5,
            max_pull_power: 100.0,
        }
    }
}
