// Session state store: the client-local view of a match, with change notifications.

use crate::domain::{
    Phase, PlayerId, PlayerPatch, PlayerState, Session, SessionError, SessionEvent,
};
use std::collections::HashSet;
use tracing::debug;

/// Callback invoked synchronously for every store notification.
pub type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Operations on the client-local session view.
///
/// Mutations notify listeners synchronously, in subscription order, before returning.
pub trait SessionStore {
    /// Current snapshot; it changes with every later mutation.
    fn state(&self) -> &Session;
    /// Inserts or overwrites the player keyed by `player.id`.
    fn add_player(&mut self, player: PlayerState);
    /// Merges `patch` into an existing player; unknown ids are ignored.
    fn update_player(&mut self, player_id: &str, patch: PlayerPatch);
    fn remove_player(&mut self, player_id: &str);
    fn set_phase(&mut self, phase: Phase);
    /// Records the winner and puts it at the head of the elimination order.
    fn set_winner(&mut self, player_id: &str) -> Result<(), SessionError>;
    /// Appends to the elimination order unless already present. Emits nothing.
    fn add_eliminated_player(&mut self, player_id: &str);
    /// Replaces the whole session with an empty one in `Countdown`.
    fn reset_state(&mut self);
    fn subscribe(&mut self, listener: Listener) -> ListenerId;
    fn unsubscribe(&mut self, id: ListenerId);
    /// Ends the store lifecycle and drops every listener.
    fn close(&mut self);
}

/// Store backing an interactive client.
pub struct LiveSessionStore {
    session: Session,
    // Every id registered since the last reset, removed players included.
    known_ids: HashSet<PlayerId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl LiveSessionStore {
    pub fn open() -> Self {
        Self {
            session: Session::default(),
            known_ids: HashSet::new(),
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }

    fn notify(&mut self, event: SessionEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl SessionStore for LiveSessionStore {
    fn state(&self) -> &Session {
        &self.session
    }

    fn add_player(&mut self, player: PlayerState) {
        self.known_ids.insert(player.id.clone());
        self.session
            .players
            .insert(player.id.clone(), player.clone());
        self.notify(SessionEvent::PlayerAdded(player));
    }

    fn update_player(&mut self, player_id: &str, patch: PlayerPatch) {
        let Some(player) = self.session.players.get_mut(player_id) else {
            return;
        };
        patch.apply(player);
        let updated = player.clone();
        self.notify(SessionEvent::PlayerUpdated(updated));
    }

    fn remove_player(&mut self, player_id: &str) {
        if self.session.players.remove(player_id).is_some() {
            self.notify(SessionEvent::PlayerRemoved {
                player_id: player_id.to_string(),
            });
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.session.phase = phase;
        self.notify(SessionEvent::PhaseChanged(phase));
    }

    fn set_winner(&mut self, player_id: &str) -> Result<(), SessionError> {
        if !self.known_ids.contains(player_id) {
            return Err(SessionError::UnknownPlayer {
                player_id: player_id.to_string(),
            });
        }
        match self.session.winner.as_deref() {
            Some(current) if current == player_id => return Ok(()),
            Some(current) => {
                return Err(SessionError::WinnerConflict {
                    current: current.to_string(),
                    requested: player_id.to_string(),
                });
            }
            None => {}
        }

        self.session.winner = Some(player_id.to_string());
        let order = &mut self.session.elimination_order;
        if let Some(index) = order.iter().position(|id| id == player_id) {
            // Move an already-recorded winner to the head instead of duplicating it.
            let id = order.remove(index);
            order.insert(0, id);
        } else {
            order.insert(0, player_id.to_string());
        }

        self.notify(SessionEvent::WinnerSet {
            winner_id: player_id.to_string(),
        });
        Ok(())
    }

    fn add_eliminated_player(&mut self, player_id: &str) {
        if !self.known_ids.contains(player_id) {
            debug!(player_id, "ignoring elimination of unregistered player");
            return;
        }
        if !self
            .session
            .elimination_order
            .iter()
            .any(|id| id == player_id)
        {
            self.session.elimination_order.push(player_id.to_string());
        }
    }

    fn reset_state(&mut self) {
        self.session = Session::default();
        self.known_ids.clear();
        self.notify(SessionEvent::StateReset);
    }

    fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn close(&mut self) {
        self.listeners.clear();
    }
}

/// Store for hosts without a rendering surface: every operation is a no-op.
#[derive(Debug, Default)]
pub struct NullSessionStore {
    // Always empty and always in `Countdown`.
    empty: Session,
}

impl NullSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for NullSessionStore {
    fn state(&self) -> &Session {
        &self.empty
    }

    fn add_player(&mut self, _player: PlayerState) {}

    fn update_player(&mut self, _player_id: &str, _patch: PlayerPatch) {}

    fn remove_player(&mut self, _player_id: &str) {}

    fn set_phase(&mut self, _phase: Phase) {}

    fn set_winner(&mut self, _player_id: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn add_eliminated_player(&mut self, _player_id: &str) {}

    fn reset_state(&mut self) {}

    fn subscribe(&mut self, _listener: Listener) -> ListenerId {
        ListenerId(0)
    }

    fn unsubscribe(&mut self, _id: ListenerId) {}

    fn close(&mut self) {}
}
