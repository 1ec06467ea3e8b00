//! Movement catalog and animation timing
//!
//! A [`Movement`] is a value type pairing a semantic action (push, pull,
//! lift, ...) with a travel direction, a fixed duration, and a spline shape.
//! An [`AnimationState`] is a running instance of one: elapsed time plus the
//! fractional offset it currently contributes. The logical grid position of
//! the animated object only changes when the animation completes; the offset
//! exists for interpolated rendering.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_FALL_DURATION, CARRY_MOVE_DURATION, STANDARD_MOVE_DURATION};

/// A travel direction in cell deltas. Y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Cell delta `(dx, dy)` for one step in this direction
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::UpLeft => (-1, 1),
            Direction::UpRight => (1, 1),
            Direction::DownLeft => (-1, -1),
            Direction::DownRight => (1, -1),
        }
    }

    #[inline]
    pub const fn dx(self) -> i32 {
        self.delta().0
    }

    #[inline]
    pub const fn dy(self) -> i32 {
        self.delta().1
    }

    /// Direction from integer cell deltas
    pub const fn from_deltas(dx: i32, dy: i32) -> Direction {
        match (dx.signum(), dy.signum()) {
            (0, 0) => Direction::None,
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            (0, 1) => Direction::Up,
            (0, -1) => Direction::Down,
            (-1, 1) => Direction::UpLeft,
            (1, 1) => Direction::UpRight,
            (-1, -1) => Direction::DownLeft,
            _ => Direction::DownRight,
        }
    }

    /// Horizontal direction from `from` toward `to` (both in cell units)
    pub fn horizontal_toward(from: f32, to: f32) -> Direction {
        if to < from {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Progress-to-offset curve shape for a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spline {
    Linear,
}

impl Spline {
    /// Offset in cell units at the given progress percentage.
    ///
    /// Contract: zero offset for `percent <= 0` or `percent > 100`, so a
    /// just-created or just-finished animation contributes no displacement
    /// beyond the object's committed grid position.
    pub fn position(self, dir: Direction, percent: f32) -> Vec2 {
        if percent <= 0.0 || percent > 100.0 {
            return Vec2::ZERO;
        }
        match self {
            Spline::Linear => {
                let (dx, dy) = dir.delta();
                Vec2::new(percent * dx as f32 / 100.0, percent * dy as f32 / 100.0)
            }
        }
    }
}

/// Semantic kind of a catalog movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    None,
    /// Ordinary one-cell move while carrying a block
    Walk,
    Push,
    Pull,
    Lift,
    Place,
    Climb,
    ClimbDown,
    Fall,
}

/// A catalog movement: direction, duration and spline are attributes of the
/// entry, not computed. Value-typed, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub kind: MovementKind,
    pub direction: Direction,
    pub duration: f32,
    pub spline: Spline,
}

impl Movement {
    /// The identity movement
    pub const NONE: Movement = Movement {
        kind: MovementKind::None,
        direction: Direction::None,
        duration: 0.0,
        spline: Spline::Linear,
    };

    const fn catalog(kind: MovementKind, direction: Direction, duration: f32) -> Movement {
        Movement {
            kind,
            direction,
            duration,
            spline: Spline::Linear,
        }
    }

    /// Push or pull classification for a grabbed block.
    ///
    /// `relative_sign` is `block.x - player.x / tile_width`: the signed side
    /// of the player the block sits on. A pull is selected when the travel
    /// direction points away from that side (the player backs off and the
    /// block follows); otherwise it is a push.
    pub fn push_pull(dir: Direction, relative_sign: f32) -> Movement {
        let kind = if dir.dx() as f32 * relative_sign < 0.0 {
            MovementKind::Pull
        } else {
            MovementKind::Push
        };
        Movement::catalog(kind, dir, STANDARD_MOVE_DURATION)
    }

    /// One-cell horizontal move while carrying a lifted block
    pub fn walk(dir: Direction) -> Movement {
        Movement::catalog(MovementKind::Walk, dir, CARRY_MOVE_DURATION)
    }

    /// Lift a block up-and-over toward above the player. `facing` is the
    /// player's direction toward the block; the block travels the opposite
    /// horizontal way, one cell up.
    pub fn lift(facing: Direction) -> Movement {
        let dir = Direction::from_deltas(-facing.dx(), 1);
        Movement::catalog(MovementKind::Lift, dir, STANDARD_MOVE_DURATION)
    }

    /// Place a carried block down-and-forward into the facing cell
    pub fn place(facing: Direction) -> Movement {
        let dir = Direction::from_deltas(facing.dx(), -1);
        Movement::catalog(MovementKind::Place, dir, STANDARD_MOVE_DURATION)
    }

    /// Climb diagonally up-and-over an adjacent block
    pub fn climb(facing: Direction) -> Movement {
        let dir = Direction::from_deltas(facing.dx(), 1);
        Movement::catalog(MovementKind::Climb, dir, STANDARD_MOVE_DURATION)
    }

    /// Step down a ledge while carrying a block
    pub fn climb_down(facing: Direction) -> Movement {
        let dir = Direction::from_deltas(facing.dx(), -1);
        Movement::catalog(MovementKind::ClimbDown, dir, CARRY_MOVE_DURATION)
    }

    /// A weighted block falling one cell
    pub fn fall() -> Movement {
        Movement::catalog(MovementKind::Fall, Direction::Down, BLOCK_FALL_DURATION)
    }

    pub fn is_pull(&self) -> bool {
        self.kind == MovementKind::Pull
    }

    pub fn is_none(&self) -> bool {
        self.kind == MovementKind::None
    }

    /// Total cell offset once the movement completes
    pub fn total_offset(&self) -> (i32, i32) {
        self.direction.delta()
    }
}

/// A running instance of a [`Movement`]: immutable movement plus elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    movement: Movement,
    elapsed: f32,
}

impl AnimationState {
    /// The cleared identity state: no movement, already done
    pub const NONE: AnimationState = AnimationState {
        movement: Movement::NONE,
        elapsed: 0.0,
    };

    pub fn new(movement: Movement) -> AnimationState {
        AnimationState {
            movement,
            elapsed: 0.0,
        }
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_none(&self) -> bool {
        self.movement.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.movement.duration
    }

    /// Advance elapsed time, clamped to the movement duration
    pub fn update(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.movement.duration);
    }

    /// Current relative offset in cell units
    pub fn relative_position(&self) -> Vec2 {
        if self.movement.duration <= 0.0 {
            return Vec2::ZERO;
        }
        let percent = self.elapsed / self.movement.duration * 100.0;
        self.movement.spline.position(self.movement.direction, percent)
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        AnimationState::NONE
    }
}
