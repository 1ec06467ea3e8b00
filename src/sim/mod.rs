//! Grid simulation module
//!
//! All gameplay logic lives here. The simulation is stepped once per frame
//! from a single control flow:
//! - Grid occupancy is the single source of truth (a block is resident in
//!   exactly one cell or mid-flight in the active set, never both)
//! - All positional change outside raw velocity integration goes through
//!   timed movement animations
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod interaction;
pub mod movement;
pub mod object;
pub mod stage;
pub mod tick;

pub use collision::{MoveOutcome, corners_collide, resolve_move};
pub use grid::{BlockId, GridEvent, GridMap};
pub use interaction::Interaction;
pub use movement::{AnimationState, Direction, Movement, MovementKind, Spline};
pub use object::{Block, BlockProps, Body, Player};
pub use stage::Stage;
pub use tick::{TickInput, tick};
