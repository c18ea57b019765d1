// Status display: renders store notifications and shell signals as log lines.

use crate::domain::SessionEvent;
use crate::use_cases::{Listener, ShellSignal};
use tracing::{error, info, trace};

/// Human-readable status text for a store notification, if it is worth showing.
pub fn status_text(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::PlayerAdded(player) => Some(format!("{} joined", player.id)),
        SessionEvent::PlayerUpdated(player) if !player.is_alive => {
            Some(format!("{} is out", player.id))
        }
        // Position and cooldown churn every frame.
        SessionEvent::PlayerUpdated(_) => None,
        SessionEvent::PlayerRemoved { player_id } => Some(format!("{player_id} left")),
        SessionEvent::PhaseChanged(phase) => Some(format!("phase: {}", phase.as_str())),
        SessionEvent::WinnerSet { winner_id } => Some(format!("{winner_id} wins!")),
        SessionEvent::StateReset => Some("new match".to_string()),
    }
}

/// Store listener that writes status text to the log.
pub fn status_listener() -> Listener {
    Box::new(|event| match status_text(event) {
        Some(text) => info!(status = %text, "status"),
        None => trace!(?event, "session update"),
    })
}

/// Emits a shell signal toward the host. This client's host is the log.
pub fn emit_signal(signal: &ShellSignal) {
    let event = signal.event_name();
    match signal {
        ShellSignal::Countdown(cue) => info!(event, cue = %cue.label(), "countdown"),
        ShellSignal::Eliminated { player_id } => info!(event, %player_id, "player eliminated"),
        ShellSignal::Finished { winner_id } => info!(event, %winner_id, "match finished"),
        ShellSignal::RedirectToResult => info!(event, "redirecting to results"),
        ShellSignal::SetupFailed { reason } => error!(event, %reason, "match setup failed"),
    }
}
