//! Stage-load data model
//!
//! The host's map provider hands the core one [`MapData`] per stage: grid
//! dimensions, tile size, initial block placement with property strings,
//! and one starting cell per player slot. The core never parses a file
//! format itself; `MapData` derives serde so a host can deserialize stage
//! descriptions straight from its asset pipeline.
//!
//! Validation is fail-fast: a stage never starts from partially valid data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One initial block placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    pub x: u32,
    pub y: u32,
    /// Property strings from map data (`solid`, `movable`, `liftable`,
    /// `weight`); unknown strings are ignored
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Everything the core needs to construct a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapData {
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Tile width in world units
    pub tile_width: f32,
    /// Tile height in world units
    pub tile_height: f32,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    /// Starting cell per player slot; one player is created per entry
    pub start_positions: Vec<(u32, u32)>,
}

/// Fatal stage-construction failures
#[derive(Debug, Clone, PartialEq)]
pub enum StageError {
    InvalidDimensions { width: u32, height: u32 },
    InvalidTileSize { tile_width: f32, tile_height: f32 },
    NoStartPositions,
    StartPositionOutOfBounds { x: u32, y: u32 },
    BlockOutOfBounds { x: u32, y: u32 },
    DuplicateBlock { x: u32, y: u32 },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            StageError::InvalidTileSize {
                tile_width,
                tile_height,
            } => {
                write!(f, "tile size must be positive, got {tile_width}x{tile_height}")
            }
            StageError::NoStartPositions => {
                write!(f, "a stage needs at least one player start position")
            }
            StageError::StartPositionOutOfBounds { x, y } => {
                write!(f, "player start position ({x}, {y}) is outside the grid")
            }
            StageError::BlockOutOfBounds { x, y } => {
                write!(f, "block at ({x}, {y}) is outside the grid")
            }
            StageError::DuplicateBlock { x, y } => {
                write!(f, "more than one block at ({x}, {y})")
            }
        }
    }
}

impl std::error::Error for StageError {}

impl MapData {
    pub fn validate(&self) -> Result<(), StageError> {
        if self.width == 0 || self.height == 0 {
            return Err(StageError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.tile_width <= 0.0 || self.tile_height <= 0.0 {
            return Err(StageError::InvalidTileSize {
                tile_width: self.tile_width,
                tile_height: self.tile_height,
            });
        }
        if self.start_positions.is_empty() {
            return Err(StageError::NoStartPositions);
        }
        for &(x, y) in &self.start_positions {
            if x >= self.width || y >= self.height {
                return Err(StageError::StartPositionOutOfBounds { x, y });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for block in &self.blocks {
            if block.x >= self.width || block.y >= self.height {
                return Err(StageError::BlockOutOfBounds {
                    x: block.x,
                    y: block.y,
                });
            }
            if !seen.insert((block.x, block.y)) {
                return Err(StageError::DuplicateBlock {
                    x: block.x,
                    y: block.y,
                });
            }
        }
        Ok(())
    }
}
