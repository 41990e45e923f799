use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Arena the shapes live in, in abstract units; the ui maps these onto
/// however many terminal cells the canvas currently occupies.
pub const ARENA_WIDTH: f64 = 800.0;
pub const ARENA_HEIGHT: f64 = 550.0;

/// Shapes never spawn with their center closer than this to the arena edge
pub const SPAWN_MARGIN: f64 = 50.0;

/// Half-extent range of a spawned shape
pub const MIN_SIZE: f64 = 20.0;
pub const MAX_SIZE: f64 = 40.0;

/// Identity of a live shape, generated by the session and independent of any
/// rendering handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Square, ShapeKind::Circle, ShapeKind::Triangle];
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeColor {
    Blue,
    Red,
    Green,
    Yellow,
}

impl ShapeColor {
    pub const PALETTE: [ShapeColor; 4] = [
        ShapeColor::Blue,
        ShapeColor::Red,
        ShapeColor::Green,
        ShapeColor::Yellow,
    ];
}

/// A spawned on-screen target. Immutable after creation; it only ever leaves
/// the live set by being clicked or by the round ending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub color: ShapeColor,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub spawned_at: SystemTime,
}

impl Shape {
    /// Draw a shape from the spawn distributions: kind and color uniform over
    /// their variants, center uniform inside the margin, size uniform in
    /// [MIN_SIZE, MAX_SIZE).
    pub fn random<R: Rng + ?Sized>(id: ShapeId, rng: &mut R, spawned_at: SystemTime) -> Self {
        let kind = ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())];
        let color = ShapeColor::PALETTE[rng.gen_range(0..ShapeColor::PALETTE.len())];
        Self {
            id,
            kind,
            color,
            x: rng.gen_range(SPAWN_MARGIN..ARENA_WIDTH - SPAWN_MARGIN),
            y: rng.gen_range(SPAWN_MARGIN..ARENA_HEIGHT - SPAWN_MARGIN),
            size: rng.gen_range(MIN_SIZE..MAX_SIZE),
            spawned_at,
        }
    }

    /// A correct click is a click on the fixed target: a blue square
    pub fn is_target(&self) -> bool {
        self.kind == ShapeKind::Square && self.color == ShapeColor::Blue
    }

    /// Distance from a point to this shape's bounding region, zero inside it.
    /// Backs the nearest-shape click policy: a click near empty space still
    /// catches whichever live shape is closest.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = ((x - self.x).abs() - self.size).max(0.0);
        let dy = ((y - self.y).abs() - self.size).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}
