// Local pointer input from a line-oriented source: "x1 y1 x2 y2" per drag.

use crate::domain::{PointerGesture, Position};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Parses one drag line into a gesture. Blank lines and `#` comments yield `None`.
pub fn parse_gesture(line: &str) -> Option<Result<PointerGesture, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let values: Result<Vec<f32>, _> = line.split_whitespace().map(str::parse::<f32>).collect();
    let values = match values {
        Ok(values) => values,
        Err(e) => return Some(Err(format!("invalid number: {e}"))),
    };
    let [x1, y1, x2, y2] = values[..] else {
        return Some(Err(format!("expected 4 numbers, got {}", values.len())));
    };
    if !values.iter().all(|v| v.is_finite()) {
        return Some(Err("coordinates must be finite".to_string()));
    }

    Some(Ok(PointerGesture {
        start: Position::new(x1, y1),
        end: Position::new(x2, y2),
    }))
}

/// Reads gestures on a dedicated OS thread; a blocking read cannot be cancelled,
/// so the thread is left to die with the process.
pub fn spawn_gesture_reader<R>(source: R, gestures_tx: mpsc::Sender<PointerGesture>)
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in source.lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_gesture(&line) {
                None => {}
                Some(Ok(gesture)) => {
                    if gestures_tx.blocking_send(gesture).is_err() {
                        break;
                    }
                }
                Some(Err(reason)) => warn!(%reason, "ignoring gesture line"),
            }
        }
        debug!("gesture input ended");
    });
}
