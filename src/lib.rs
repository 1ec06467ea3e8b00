//! Crateshift - a grid puzzle-platformer simulation core
//!
//! Core modules:
//! - `sim`: the simulation proper (grid occupancy, collision, movement
//!   animation, block interaction protocol, per-frame tick)
//! - `map`: stage-load data model consumed from the host's map provider
//!
//! The crate is a pure library stepped once per frame by a host loop.
//! Rendering, input devices, asset parsing, and audio are host concerns:
//! the host hands the tick a decoded [`sim::TickInput`] snapshot and reads
//! entities back for interpolated rendering after each step.

pub mod map;
pub mod sim;

pub use map::{BlockSpec, MapData, StageError};
pub use sim::{AnimationState, Direction, GridEvent, Movement, Stage, TickInput, tick};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Gravitational acceleration, in tiles per second squared
    pub const GRAVITY: f32 = 9.82;

    /// Duration of an ordinary push/pull/lift/place/climb move (seconds)
    pub const STANDARD_MOVE_DURATION: f32 = 0.2;
    /// Duration of a move while carrying a lifted block (seconds)
    pub const CARRY_MOVE_DURATION: f32 = 0.15;
    /// Duration of a weighted block falling one cell (seconds)
    pub const BLOCK_FALL_DURATION: f32 = 0.05;

    /// Player walk speed, in tiles per second
    pub const WALK_SPEED: f32 = 8.0;
    /// Terminal fall speed, in tiles per second
    pub const MAX_FALL_SPEED: f32 = 55.0;
}

/// Convert a world coordinate to the grid cell containing it
#[inline]
pub fn grid_coord(world: f32, tile: f32) -> i32 {
    (world / tile).floor() as i32
}

/// World-space position of a grid cell's lower-left corner
#[inline]
pub fn cell_to_world(x: i32, y: i32, tile_width: f32, tile_height: f32) -> Vec2 {
    Vec2::new(x as f32 * tile_width, y as f32 * tile_height)
}
