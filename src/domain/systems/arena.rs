use crate::domain::entity::{Entity, Simulation};
use crate::domain::errors::SetupError;
use crate::domain::session::{PlayerState, Position};
use crate::domain::tuning::ArenaTuning;
use std::time::Duration;
use tracing::debug;

// Below this speed (px/s) a puck is considered at rest.
const REST_SPEED: f32 = 1.0;

/// Circular puck on the arena floor.
#[derive(Debug, Clone)]
pub struct Puck {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub mass: f32,
    pub power: f32,
    pub weight: f32,
    pub alive: bool,
    cfg: ArenaTuning,
}

impl Puck {
    fn half_extents(&self) -> (f32, f32) {
        (self.cfg.width / 2.0, self.cfg.height / 2.0)
    }
}

impl Entity for Puck {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    fn apply_impulse(&mut self, angle: f32, magnitude: f32) {
        if !self.alive {
            return;
        }
        // Strong players hit harder, heavy players accelerate less.
        let dv = magnitude * self.cfg.impulse_scale * (self.power / self.weight);
        self.vx += angle.cos() * dv;
        self.vy += angle.sin() * dv;
    }

    fn update(&mut self, dt: Duration) {
        if !self.alive {
            return;
        }
        let dt = dt.as_secs_f32();

        // position integrate
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        // friction
        let keep = self.cfg.friction.powf(dt);
        self.vx *= keep;
        self.vy *= keep;
        if self.vx.hypot(self.vy) < REST_SPEED {
            self.vx = 0.0;
            self.vy = 0.0;
        }

        // A puck whose centre leaves the field falls off.
        let (half_w, half_h) = self.half_extents();
        if self.x.abs() > half_w || self.y.abs() > half_h {
            self.alive = false;
            self.vx = 0.0;
            self.vy = 0.0;
            debug!(player_id = %self.id, x = self.x, y = self.y, "puck left the field");
        }
    }
}

/// Simulation backend: free-moving pucks with elastic puck/puck collisions.
#[derive(Debug, Clone, Default)]
pub struct PuckArena {
    cfg: ArenaTuning,
}

impl PuckArena {
    pub fn new(cfg: ArenaTuning) -> Self {
        Self { cfg }
    }
}

impl Simulation for PuckArena {
    type Entity = Puck;

    fn spawn(&mut self, player: &PlayerState) -> Result<Puck, SetupError> {
        let (half_w, half_h) = (self.cfg.width / 2.0, self.cfg.height / 2.0);
        if player.position.x.abs() > half_w || player.position.y.abs() > half_h {
            return Err(SetupError::Backend(format!(
                "spawn for {} is outside the field",
                player.id
            )));
        }

        // Volume scales area, weight scales density.
        let scale = player.volume / 50.0;
        Ok(Puck {
            id: player.id.clone(),
            x: player.position.x,
            y: player.position.y,
            vx: 0.0,
            vy: 0.0,
            radius: self.cfg.base_radius * scale.sqrt(),
            mass: player.weight * scale,
            power: player.power,
            weight: player.weight,
            alive: player.is_alive,
            cfg: self.cfg,
        })
    }

    fn resolve(&mut self, entities: &mut [Puck]) {
        // Puck vs puck collision (naive O(N^2); rosters are at most 8 players).
        for i in 0..entities.len() {
            let (head, tail) = entities.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.alive {
                continue;
            }
            for b in tail.iter_mut() {
                if !b.alive {
                    continue;
                }
                collide(a, b);
            }
        }
    }
}

fn collide(a: &mut Puck, b: &mut Puck) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let reach = a.radius + b.radius;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq > reach * reach || dist_sq == 0.0 {
        return;
    }

    let dist = dist_sq.sqrt();
    let (nx, ny) = (dx / dist, dy / dist);
    let total_mass = a.mass + b.mass;

    // Push the pair apart so they no longer overlap, heavier puck moves less.
    let overlap = reach - dist;
    a.x -= nx * overlap * (b.mass / total_mass);
    a.y -= ny * overlap * (b.mass / total_mass);
    b.x += nx * overlap * (a.mass / total_mass);
    b.y += ny * overlap * (a.mass / total_mass);

    // Elastic exchange along the contact normal; skip pairs already separating.
    let closing = (a.vx - b.vx) * nx + (a.vy - b.vy) * ny;
    if closing <= 0.0 {
        return;
    }
    let j = 2.0 * closing / total_mass;
    a.vx -= j * b.mass * nx;
    a.vy -= j * b.mass * ny;
    b.vx += j * a.mass * nx;
    b.vy += j * a.mass * ny;

    debug!(a = %a.id, b = %b.id, closing, "pucks collided");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str, x: f32, y: f32) -> PlayerState {
        PlayerState {
            id: id.to_string(),
            icon: None,
            power: 50.0,
            weight: 50.0,
            volume: 50.0,
            cooldown: 500,
            position: Position::new(x, y),
            is_alive: true,
            is_active: false,
        }
    }

    #[test]
    fn when_impulse_is_applied_then_puck_moves_along_angle() {
        let mut arena = PuckArena::default();
        let mut puck = arena.spawn(&state("a", 0.0, 0.0)).expect("spawn");

        puck.apply_impulse(0.0, 10.0);
        puck.update(Duration::from_millis(100));

        assert!(puck.x > 0.0);
        assert!(puck.y.abs() < 1e-4);
        assert!(puck.is_alive());
    }

    #[test]
    fn when_puck_crosses_the_edge_then_it_is_eliminated() {
        let mut arena = PuckArena::default();
        let mut puck = arena.spawn(&state("a", 290.0, 0.0)).expect("spawn");

        puck.apply_impulse(0.0, 100.0);
        puck.update(Duration::from_millis(100));

        assert!(!puck.is_alive());
        assert_eq!(puck.vx, 0.0);
    }

    #[test]
    fn when_spawn_is_outside_the_field_then_spawn_fails() {
        let mut arena = PuckArena::default();
        let result = arena.spawn(&state("a", 1000.0, 0.0));
        assert!(matches!(result, Err(SetupError::Backend(_))));
    }

    #[test]
    fn when_equal_pucks_collide_head_on_then_velocities_swap() {
        let mut arena = PuckArena::default();
        let mut pucks = vec![
            arena.spawn(&state("a", -29.0, 0.0)).expect("spawn"),
            arena.spawn(&state("b", 29.0, 0.0)).expect("spawn"),
        ];
        pucks[0].vx = 100.0;

        arena.resolve(&mut pucks);

        assert!(pucks[0].vx.abs() < 1e-3);
        assert!((pucks[1].vx - 100.0).abs() < 1e-3);
        // Overlap has been resolved.
        assert!(pucks[1].x - pucks[0].x >= pucks[0].radius + pucks[1].radius - 1e-3);
    }

    #[test]
    fn when_a_puck_is_eliminated_then_it_no_longer_collides() {
        let mut arena = PuckArena::default();
        let mut pucks = vec![
            arena.spawn(&state("a", -10.0, 0.0)).expect("spawn"),
            arena.spawn(&state("b", 10.0, 0.0)).expect("spawn"),
        ];
        pucks[1].alive = false;
        pucks[0].vx = 50.0;

        arena.resolve(&mut pucks);

        assert_eq!(pucks[0].vx, 50.0);
        assert_eq!(pucks[1].x, 10.0);
    }
}
