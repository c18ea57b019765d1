// Use-case level outputs of the game loop toward the application shell.

use crate::domain::PlayerId;

/// Name of the host-level event fired when the results screen should open.
pub const REDIRECT_TO_RESULT_EVENT: &str = "gameRedirectToResult";

/// One step of the pre-match lead-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCue {
    Ready,
    Count(u32),
    Go,
}

impl CountdownCue {
    pub fn label(&self) -> String {
        match self {
            CountdownCue::Ready => "READY?".to_string(),
            CountdownCue::Count(n) => n.to_string(),
            CountdownCue::Go => "GO!".to_string(),
        }
    }
}

/// Signals the game loop raises for the surrounding shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellSignal {
    Countdown(CountdownCue),
    Eliminated { player_id: PlayerId },
    Finished { winner_id: PlayerId },
    // Fired once, after the finish display delay.
    RedirectToResult,
    SetupFailed { reason: String },
}

impl ShellSignal {
    pub fn event_name(&self) -> &'static str {
        match self {
            ShellSignal::Countdown(_) => "gameCountdown",
            ShellSignal::Eliminated { .. } => "gamePlayerEliminated",
            ShellSignal::Finished { .. } => "gameFinished",
            ShellSignal::RedirectToResult => REDIRECT_TO_RESULT_EVENT,
            ShellSignal::SetupFailed { .. } => "gameSetupFailed",
        }
    }
}
