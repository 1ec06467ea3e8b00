//! Simulation entities: blocks and players
//!
//! Both share a [`Body`] record (world position, size, velocity); collision
//! and movement resolution are free functions over it rather than inherited
//! behavior. Blocks live in the grid arena and are addressed by id.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::BlockId;
use super::interaction::Interaction;
use super::movement::{AnimationState, Direction};
use crate::consts::WALK_SPEED;
use crate::grid_coord;

/// Capability properties of a block, parsed once from map property strings.
/// Unknown strings are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProps {
    pub solid: bool,
    pub liftable: bool,
    pub movable: bool,
    pub weight: bool,
}

impl BlockProps {
    pub fn from_strings<S: AsRef<str>>(properties: &[S]) -> BlockProps {
        let mut props = BlockProps::default();
        for p in properties {
            match p.as_ref().to_lowercase().as_str() {
                "solid" => props.solid = true,
                "liftable" => props.liftable = true,
                "movable" => props.movable = true,
                "weight" => props.weight = true,
                _ => {}
            }
        }
        props
    }
}

/// A grid-aligned block. Its cell coordinates are the logical position; a
/// non-identity animation means the block is in the grid's active set and
/// mid-flight toward `cell + direction`.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub x: i32,
    pub y: i32,
    pub props: BlockProps,
    /// Held above a player's head: suppresses solidity and weighted falls
    pub lifted: bool,
    pub anim: AnimationState,
}

impl Block {
    pub fn is_solid(&self) -> bool {
        self.props.solid && !self.lifted
    }

    pub fn is_liftable(&self) -> bool {
        self.props.liftable
    }

    pub fn is_movable(&self) -> bool {
        self.props.movable
    }

    pub fn has_weight(&self) -> bool {
        self.props.weight
    }

    /// World position for rendering: committed cell plus animation offset
    pub fn render_pos(&self, tile_width: f32, tile_height: f32) -> Vec2 {
        let offset = self.anim.relative_position();
        Vec2::new(
            (self.x as f32 + offset.x) * tile_width,
            (self.y as f32 + offset.y) * tile_height,
        )
    }
}

/// Shared physical record: continuous world-space position, size, velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Body {
        Body {
            pos,
            size,
            velocity: Vec2::ZERO,
        }
    }
}

/// A player: continuous position, facing, gravity accumulator, and the
/// interaction state machine for at most one processed block.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub facing: Direction,
    /// Accumulated fall time driving gravity velocity
    pub fall_time: f32,
    pub anim: AnimationState,
    pub interaction: Interaction,
    pub collided_horizontally: bool,
    pub collided_vertically: bool,
}

impl Player {
    pub fn new(pos: Vec2, tile_width: f32, tile_height: f32) -> Player {
        Player {
            body: Body::new(pos, Vec2::new(tile_width, tile_height)),
            facing: Direction::None,
            fall_time: 0.0,
            anim: AnimationState::NONE,
            interaction: Interaction::None,
            collided_horizontally: false,
            collided_vertically: false,
        }
    }

    /// Grid cell of the player's lower-left corner
    pub fn grid_pos(&self, tile_width: f32, tile_height: f32) -> (i32, i32) {
        (
            grid_coord(self.body.pos.x, tile_width),
            grid_coord(self.body.pos.y, tile_height),
        )
    }

    /// Grid cell of the player's center
    pub fn center_cell(&self, tile_width: f32, tile_height: f32) -> (i32, i32) {
        let center = self.body.pos + self.body.size / 2.0;
        (
            grid_coord(center.x, tile_width),
            grid_coord(center.y, tile_height),
        )
    }

    /// The block currently grabbed or lifted, if any
    pub fn processed_block(&self) -> Option<BlockId> {
        match self.interaction {
            Interaction::None => None,
            Interaction::Grabbed { block, .. } | Interaction::Lifted { block } => Some(block),
        }
    }

    pub fn is_interacting(&self) -> bool {
        !matches!(self.interaction, Interaction::None)
    }

    pub fn is_lifting(&self) -> bool {
        matches!(self.interaction, Interaction::Lifted { .. })
    }

    /// Busy players defer interaction input until the animation terminates
    pub fn is_busy(&self) -> bool {
        !self.anim.is_none()
    }

    /// Assert the default walk velocity for a held direction key
    pub fn set_walk_velocity(&mut self, dir: Direction, tile_width: f32) {
        self.body.velocity.x = dir.dx() as f32 * WALK_SPEED * tile_width;
    }

    /// World position for rendering: position plus animation offset in tiles
    pub fn render_pos(&self, tile_width: f32, tile_height: f32) -> Vec2 {
        let offset = self.anim.relative_position();
        self.body.pos + Vec2::new(offset.x * tile_width, offset.y * tile_height)
    }

    pub fn reset(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.velocity = Vec2::ZERO;
        self.fall_time = 0.0;
        self.facing = Direction::None;
        self.anim = AnimationState::NONE;
        self.interaction = Interaction::None;
        self.collided_horizontally = false;
        self.collided_vertically = false;
    }
}
