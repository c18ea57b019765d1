// Scripted lead-in shown before play starts: "READY?", numbers, then "GO!".

use super::types::CountdownCue;
use crate::domain::tuning::CountdownTuning;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Countdown {
    schedule: Vec<(Duration, CountdownCue)>,
    total: Duration,
    elapsed: Duration,
    next: usize,
}

impl Countdown {
    pub fn new(tuning: CountdownTuning) -> Self {
        let mut schedule = vec![(Duration::ZERO, CountdownCue::Ready)];
        for step in 0..tuning.count_from {
            schedule.push((
                tuning.ready_hold + tuning.step * step,
                CountdownCue::Count(tuning.count_from - step),
            ));
        }
        schedule.push((
            tuning.ready_hold + tuning.step * tuning.count_from,
            CountdownCue::Go,
        ));

        Self {
            schedule,
            total: tuning.total(),
            elapsed: Duration::ZERO,
            next: 0,
        }
    }

    /// Advances simulation time and returns the cues that became due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<CountdownCue> {
        self.elapsed += dt;
        let mut due = Vec::new();
        while let Some((at, cue)) = self.schedule.get(self.next) {
            if *at > self.elapsed {
                break;
            }
            due.push(*cue);
            self.next += 1;
        }
        due
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.schedule.len() && self.elapsed >= self.total
    }
}
