use crate::results::{ResultsSink, RoundResults};
use crate::runtime::{TimerKind, TimerService};
use crate::shape::{Shape, ShapeColor, ShapeId, ShapeKind};
use crate::util::{epoch_secs, mean, std_dev};
use chrono::{DateTime, Local};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Delay between a spawn and the next one it schedules
pub const SPAWN_DELAY_MS: Range<u64> = 1000..2000;

/// One successful click-to-shape match; immutable once appended
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClickRecord {
    /// Click time, seconds since the unix epoch
    pub timestamp: f64,
    pub shape_type: ShapeKind,
    pub color: ShapeColor,
    /// Click time minus the shape's creation time, in seconds
    pub reaction_time: f64,
    pub correct: bool,
}

/// Derived per-round figures for the summary overlay and the history log
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSummary {
    pub score: u32,
    pub total_clicks: usize,
    /// Percentage of clicks that hit the target shape; 0 with no clicks
    pub accuracy: f64,
    pub mean_reaction_ms: f64,
    pub median_reaction_ms: f64,
    pub std_dev_ms: f64,
}

/// One timed round of the catch-the-target game.
///
/// Idle when `started_at` is None, Running otherwise. Running begins only in
/// `start` and ends only in `end`, which the round-over timer fires once.
#[derive(Debug)]
pub struct Session {
    pub score: u32,
    pub clicks: Vec<ClickRecord>,
    pub live: HashMap<ShapeId, Shape>,
    pub started_at: Option<SystemTime>,
    pub duration: Duration,
    next_id: u64,
    rng: StdRng,
}

impl Session {
    pub fn new(duration: Duration) -> Self {
        Self::with_rng(duration, StdRng::from_entropy())
    }

    pub fn with_rng(duration: Duration, rng: StdRng) -> Self {
        Self {
            score: 0,
            clicks: Vec::new(),
            live: HashMap::new(),
            started_at: None,
            duration,
            next_id: 0,
            rng,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Seconds until the round-over timer is expected to fire; 0 when Idle
    pub fn seconds_left(&self, now: SystemTime) -> f64 {
        match self.started_at {
            Some(started_at) => {
                let elapsed = now.duration_since(started_at).unwrap_or_default();
                (self.duration.as_secs_f64() - elapsed.as_secs_f64()).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Begin a round: reset score, click history and live shapes, spawn the
    /// first shape immediately, and arm the round-over timer.
    pub fn start(&mut self, timers: &mut dyn TimerService) {
        self.start_at(timers, SystemTime::now());
    }

    pub fn start_at(&mut self, timers: &mut dyn TimerService, now: SystemTime) {
        self.score = 0;
        self.clicks.clear();
        self.live.clear();
        self.next_id = 0;
        self.started_at = Some(now);
        self.spawn_shape_at(timers, now);
        timers.schedule(TimerKind::RoundOver, self.duration);
    }

    /// Register a random shape and schedule the next spawn. A no-op once the
    /// round's duration has elapsed, so a spawn timer that fires after the
    /// end timer cannot leave stray shapes behind (and does not reschedule).
    pub fn spawn_shape(&mut self, timers: &mut dyn TimerService) {
        self.spawn_shape_at(timers, SystemTime::now());
    }

    pub fn spawn_shape_at(&mut self, timers: &mut dyn TimerService, now: SystemTime) {
        let Some(started_at) = self.started_at else {
            return;
        };
        if now.duration_since(started_at).unwrap_or_default() >= self.duration {
            return;
        }

        let id = ShapeId(self.next_id);
        self.next_id += 1;
        let shape = Shape::random(id, &mut self.rng, now);
        self.live.insert(id, shape);

        let delay = self.rng.gen_range(SPAWN_DELAY_MS);
        timers.schedule(TimerKind::Spawn, Duration::from_millis(delay));
    }

    /// Match a click to the nearest live shape (nearest-shape policy, not
    /// strict hit-testing), record it, score it, and remove the shape.
    /// Silently ignored when Idle or when no shapes are live.
    pub fn on_click(&mut self, x: f64, y: f64) -> Option<ClickRecord> {
        self.on_click_at(x, y, SystemTime::now())
    }

    pub fn on_click_at(&mut self, x: f64, y: f64, now: SystemTime) -> Option<ClickRecord> {
        self.started_at?;

        let nearest = self
            .live
            .values()
            .min_by(|a, b| {
                a.distance_to(x, y)
                    .partial_cmp(&b.distance_to(x, y))
                    .unwrap_or(Ordering::Equal)
            })
            .map(|shape| shape.id)?;
        let shape = self.live.remove(&nearest)?;

        let reaction_time = now
            .duration_since(shape.spawned_at)
            .unwrap_or_default()
            .as_secs_f64();
        let record = ClickRecord {
            timestamp: epoch_secs(now),
            shape_type: shape.kind,
            color: shape.color,
            reaction_time,
            correct: shape.is_target(),
        };

        if record.correct {
            self.score += 1;
        }
        self.clicks.push(record.clone());
        Some(record)
    }

    /// End the round: return to Idle, discard uncaught shapes, and persist
    /// the results document. Click history and score survive until the next
    /// `start` so the summary overlay can read them.
    pub fn end(&mut self, sink: &dyn ResultsSink) -> io::Result<PathBuf> {
        self.end_at(sink, SystemTime::now())
    }

    pub fn end_at(&mut self, sink: &dyn ResultsSink, now: SystemTime) -> io::Result<PathBuf> {
        self.started_at = None;
        self.live.clear();

        let results = RoundResults {
            date: DateTime::<Local>::from(now)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            score: self.score,
            clicks: self.clicks.clone(),
        };
        sink.write(&results, now)
    }

    pub fn summary(&self) -> RoundSummary {
        let reactions: Vec<f64> = self
            .clicks
            .iter()
            .map(|c| c.reaction_time * 1000.0)
            .collect();
        let sorted: Vec<f64> = reactions
            .iter()
            .copied()
            .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .collect();
        let median = sorted.get(sorted.len() / 2).copied().unwrap_or(0.0);

        RoundSummary {
            score: self.score,
            total_clicks: self.clicks.len(),
            accuracy: if self.clicks.is_empty() {
                0.0
            } else {
                self.score as f64 / self.clicks.len() as f64 * 100.0
            },
            mean_reaction_ms: mean(&reactions).unwrap_or(0.0),
            median_reaction_ms: median,
            std_dev_ms: std_dev(&reactions).unwrap_or(0.0),
        }
    }
}
