use super::countdown::Countdown;
use super::store::SessionStore;
use super::types::ShellSignal;
use crate::domain::tuning::{CountdownTuning, GestureTuning};
use crate::domain::{
    Entity, Flick, Phase, PlayerId, PlayerPatch, PlayerState, PointerGesture, QueuedAction,
    SetupError, Simulation,
};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing settings for one match.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    /// Queued actions are applied at most once per this much simulation time.
    pub drain_interval: Duration,
    /// Delay between the finish and the redirect signal.
    pub redirect_delay: Duration,
    pub countdown: CountdownTuning,
    pub gesture: GestureTuning,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            drain_interval: Duration::from_millis(100),
            redirect_delay: Duration::from_millis(3000),
            countdown: CountdownTuning::default(),
            gesture: GestureTuning::default(),
        }
    }
}

/// Per-match orchestrator: countdown, fixed-cadence action drain, entity updates,
/// elimination bookkeeping and the finish sequence.
///
/// The loop keeps its own phase so that control flow does not depend on which
/// store implementation is plugged in; every transition is written to the store.
pub struct GameLoop<S: Simulation> {
    store: Box<dyn SessionStore + Send>,
    sim: S,
    entities: Vec<S::Entity>,
    // Vitality as last mirrored to the store, parallel to `entities`.
    mirrored_alive: Vec<bool>,
    cooldown_of: HashMap<PlayerId, Duration>,
    // Remaining cooldown for players that acted recently.
    cooling: HashMap<PlayerId, Duration>,
    queue: VecDeque<QueuedAction>,
    local_player_id: Option<PlayerId>,
    settings: LoopSettings,
    phase: Phase,
    countdown: Countdown,
    since_drain: Duration,
    // Guards the finish sequence so it runs once per match.
    finished: bool,
    since_finish: Duration,
    redirected: bool,
    signals: Vec<ShellSignal>,
}

impl<S: Simulation> GameLoop<S> {
    /// Resets the store, spawns one entity per player and starts the countdown.
    pub fn open(
        mut store: Box<dyn SessionStore + Send>,
        mut sim: S,
        players: Vec<PlayerState>,
        local_player_id: Option<PlayerId>,
        settings: LoopSettings,
    ) -> Result<Self, SetupError> {
        if players.is_empty() {
            return Err(SetupError::EmptyRoster);
        }

        // Spawn everything before touching the store so a failure leaves it untouched.
        let mut entities = Vec::with_capacity(players.len());
        for player in &players {
            entities.push(sim.spawn(player)?);
        }

        store.reset_state();
        let mut cooldown_of = HashMap::new();
        for player in players {
            cooldown_of.insert(
                player.id.clone(),
                Duration::from_millis(u64::from(player.cooldown)),
            );
            store.add_player(player);
        }

        if let Some(local) = local_player_id.as_deref() {
            if !cooldown_of.contains_key(local) {
                info!(player_id = local, "local player not in roster; spectating");
            }
        }

        let mirrored_alive = entities.iter().map(|e| e.is_alive()).collect();
        info!(players = entities.len(), "match opened");

        Ok(Self {
            store,
            sim,
            entities,
            mirrored_alive,
            cooldown_of,
            cooling: HashMap::new(),
            queue: VecDeque::new(),
            local_player_id,
            settings,
            phase: Phase::Countdown,
            countdown: Countdown::new(settings.countdown),
            since_drain: Duration::ZERO,
            finished: false,
            since_finish: Duration::ZERO,
            redirected: false,
            signals: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn entities(&self) -> &[S::Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [S::Entity] {
        &mut self.entities
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queues an action from the feed. Returns false when it was dropped.
    pub fn enqueue(&mut self, action: QueuedAction) -> bool {
        if self.phase != Phase::Playing {
            warn!(
                target_id = %action.target_id,
                phase = self.phase.as_str(),
                "action outside play; dropping"
            );
            return false;
        }
        self.queue.push_back(action);
        true
    }

    /// Handles a local drag-release. Returns the flick to submit, if input is allowed.
    pub fn pointer_release(&mut self, gesture: PointerGesture) -> Option<Flick> {
        if self.phase != Phase::Playing {
            return None;
        }
        let local = self.local_player_id.as_deref()?;
        let entity = self.entities.iter().find(|e| e.id() == local)?;
        if !entity.is_alive() || self.cooling.contains_key(local) {
            debug!(player_id = local, "local input ignored while unable to act");
            return None;
        }
        gesture.to_flick(&self.settings.gesture)
    }

    /// Takes the shell signals raised since the last call.
    pub fn take_signals(&mut self) -> Vec<ShellSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Advances the match by one frame of `dt` simulation time.
    pub fn tick(&mut self, dt: Duration) {
        match self.phase {
            Phase::Countdown => self.tick_countdown(dt),
            Phase::Playing => self.tick_playing(dt),
            Phase::Finished => self.tick_finished(dt),
            Phase::Waiting => {}
        }
    }

    /// Releases listeners and queued work. The loop is inert afterwards.
    pub fn close(&mut self) {
        self.queue.clear();
        self.signals.clear();
        self.store.close();
        info!(phase = self.phase.as_str(), "match closed");
    }

    fn tick_countdown(&mut self, dt: Duration) {
        for cue in self.countdown.advance(dt) {
            debug!(cue = %cue.label(), "countdown");
            self.signals.push(ShellSignal::Countdown(cue));
        }
        if self.countdown.is_done() {
            self.set_phase(Phase::Playing);
            self.since_drain = Duration::ZERO;
        }
    }

    fn tick_playing(&mut self, dt: Duration) {
        self.since_drain += dt;
        if self.since_drain >= self.settings.drain_interval {
            self.since_drain -= self.settings.drain_interval;
            // One batch per interval; a long frame does not trigger catch-up drains.
            if self.since_drain >= self.settings.drain_interval {
                self.since_drain = Duration::ZERO;
            }
            self.drain();
        }

        self.tick_cooldowns(dt);

        for entity in &mut self.entities {
            entity.update(dt);
        }
        self.sim.resolve(&mut self.entities);

        let eliminated_now = self.mirror_entities();
        self.check_termination(&eliminated_now);
    }

    fn tick_finished(&mut self, dt: Duration) {
        if self.redirected {
            return;
        }
        self.since_finish += dt;
        if self.since_finish >= self.settings.redirect_delay {
            self.redirected = true;
            self.signals.push(ShellSignal::RedirectToResult);
        }
    }

    fn drain(&mut self) {
        while let Some(action) = self.queue.pop_front() {
            let Some(entity) = self
                .entities
                .iter_mut()
                .find(|e| e.id() == action.target_id)
            else {
                // Expected race with eliminations and unknown senders.
                continue;
            };
            if !entity.is_alive() {
                continue;
            }

            entity.apply_impulse(action.angle, action.magnitude);

            let cooldown = self
                .cooldown_of
                .get(&action.target_id)
                .copied()
                .unwrap_or_default();
            if !cooldown.is_zero() {
                self.cooling.insert(action.target_id.clone(), cooldown);
                self.store
                    .update_player(&action.target_id, PlayerPatch::active(true));
            }
        }
    }

    fn tick_cooldowns(&mut self, dt: Duration) {
        let mut expired = Vec::new();
        for (player_id, remaining) in self.cooling.iter_mut() {
            *remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                expired.push(player_id.clone());
            }
        }
        for player_id in expired {
            self.cooling.remove(&player_id);
            self.store
                .update_player(&player_id, PlayerPatch::active(false));
        }
    }

    // Mirrors positions and vitality into the store; returns ids eliminated this frame.
    fn mirror_entities(&mut self) -> Vec<PlayerId> {
        let mut eliminated_now = Vec::new();
        for (entity, mirrored_alive) in self.entities.iter().zip(self.mirrored_alive.iter_mut()) {
            let id = entity.id();
            let position = entity.position();
            let moved = self
                .store
                .state()
                .players
                .get(id)
                .is_some_and(|p| p.position != position);

            if *mirrored_alive && !entity.is_alive() {
                *mirrored_alive = false;
                self.cooling.remove(id);
                let mut patch = PlayerPatch::eliminated();
                patch.position = Some(position);
                self.store.update_player(id, patch);
                self.store.add_eliminated_player(id);
                info!(player_id = id, "player eliminated");
                self.signals.push(ShellSignal::Eliminated {
                    player_id: id.to_string(),
                });
                eliminated_now.push(id.to_string());
            } else if moved {
                self.store.update_player(id, PlayerPatch::position(position));
            }
        }
        eliminated_now
    }

    fn check_termination(&mut self, eliminated_now: &[PlayerId]) {
        if self.finished {
            return;
        }
        let mut alive = self.entities.iter().filter(|e| e.is_alive());
        let winner = match (alive.next(), alive.next()) {
            (Some(last), None) => last.id().to_string(),
            // Everyone left on the same frame: the last one processed takes the win.
            (None, _) => match eliminated_now.last() {
                Some(id) => id.clone(),
                None => return,
            },
            _ => return,
        };
        self.finish(winner);
    }

    fn finish(&mut self, winner_id: PlayerId) {
        self.finished = true;
        self.queue.clear();
        if let Err(e) = self.store.set_winner(&winner_id) {
            warn!(error = %e, "failed to record winner");
        }
        self.set_phase(Phase::Finished);
        info!(winner_id = %winner_id, "match finished");
        self.signals.push(ShellSignal::Finished { winner_id });
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.store.set_phase(phase);
    }
}
