//! Stage state: the grid plus its players
//!
//! Built once from validated [`MapData`]; blocks and players live for the
//! stage's duration. External callers treat everything here as read-only
//! between simulation steps.

use glam::Vec2;
use log::info;

use super::grid::{GridEvent, GridMap};
use super::object::{BlockProps, Player};
use crate::cell_to_world;
use crate::map::{MapData, StageError};

#[derive(Debug, Clone)]
pub struct Stage {
    pub(crate) grid: GridMap,
    pub(crate) players: Vec<Player>,
    pub(crate) active_player: usize,
    start_positions: Vec<Vec2>,
}

impl Stage {
    /// Construct a stage from map data. Fails fast on any invalid metadata;
    /// the core never starts a stage with partially valid data.
    pub fn from_map(map: &MapData) -> Result<Stage, StageError> {
        map.validate()?;

        let mut grid = GridMap::new(map.width, map.height, map.tile_width, map.tile_height);
        for spec in &map.blocks {
            grid.insert_block(
                spec.x as i32,
                spec.y as i32,
                BlockProps::from_strings(&spec.properties),
            );
        }

        let start_positions: Vec<Vec2> = map
            .start_positions
            .iter()
            .map(|&(x, y)| cell_to_world(x as i32, y as i32, map.tile_width, map.tile_height))
            .collect();
        let players = start_positions
            .iter()
            .map(|&pos| Player::new(pos, map.tile_width, map.tile_height))
            .collect();

        info!(
            "stage loaded: {}x{} grid, {} blocks, {} players",
            map.width,
            map.height,
            map.blocks.len(),
            map.start_positions.len()
        );
        Ok(Stage {
            grid,
            players,
            active_player: 0,
            start_positions,
        })
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active_player]
    }

    pub fn active_player_index(&self) -> usize {
        self.active_player
    }

    /// Cycle control to the next player slot
    pub fn next_player(&mut self) {
        self.active_player = (self.active_player + 1) % self.players.len();
    }

    /// Put every player back at its start position with velocity, gravity
    /// and interaction state cleared. Held blocks are dropped in place.
    pub fn reset_start_positions(&mut self) {
        for player in &mut self.players {
            if let Some(id) = player.processed_block() {
                self.grid.block_mut(id).lifted = false;
            }
        }
        for (player, &pos) in self.players.iter_mut().zip(&self.start_positions) {
            player.reset(pos);
        }
    }

    /// Drain active-set change notifications for the render observer
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        self.grid.take_events()
    }
}
