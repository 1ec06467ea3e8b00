//! Block interaction protocol
//!
//! A small per-player state machine (`None | Grabbed | Lifted`) governs
//! which block manipulations are legal and choreographs the multi-entity
//! animations. Every guard failure is a silent no-op: there is no error
//! surface, only "legal move available or not".

use log::debug;

use super::grid::{BlockId, GridMap};
use super::movement::{AnimationState, Direction, Movement};
use super::object::Player;

/// Per-player interaction state for the single processed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    None,
    Grabbed {
        block: BlockId,
        /// Whether a push or pull has occurred since the grab; a release
        /// after a move ends the grab instead of attempting a lift.
        moved: bool,
    },
    Lifted {
        block: BlockId,
    },
}

/// Resident block in the player's facing cell at center height
fn adjacent_block(player: &Player, grid: &GridMap) -> Option<BlockId> {
    if !player.facing.is_horizontal() {
        return None;
    }
    let (cx, cy) = player.center_cell(grid.tile_width(), grid.tile_height());
    grid.block_at(cx + player.facing.dx(), cy)
}

fn in_bounds(grid: &GridMap, x: i32, y: i32) -> bool {
    x >= 0 && (x as u32) < grid.width() && y >= 0 && (y as u32) < grid.height()
}

/// A block may move one step if the destination cell is in bounds and vacant
fn block_can_move(grid: &GridMap, id: BlockId, dir: Direction) -> bool {
    let b = grid.block(id);
    let (x, y) = (b.x + dir.dx(), b.y + dir.dy());
    in_bounds(grid, x, y) && !grid.has_block(x, y)
}

/// A player may step aside if the destination cell is vacant and has
/// footing beneath it. Used for the retreat step of a pull.
fn player_can_move(player: &Player, grid: &GridMap, dir: Direction) -> bool {
    let (cx, cy) = player.center_cell(grid.tile_width(), grid.tile_height());
    let (x, y) = (cx + dir.dx(), cy + dir.dy());
    !grid.has_block(x, y) && grid.has_block(x, y - 1)
}

fn start_block_animation(grid: &mut GridMap, id: BlockId, movement: Movement) {
    grid.activate(id);
    grid.block_mut(id).anim = AnimationState::new(movement);
}

/// Attempt to grab the block the player is facing
pub fn try_grab(player: &mut Player, grid: &GridMap) {
    if player.is_interacting() || player.is_busy() {
        return;
    }
    let Some(id) = adjacent_block(player, grid) else {
        return;
    };
    let block = grid.block(id);
    if !block.is_movable() && !block.is_liftable() {
        return;
    }
    debug!("grabbed block at ({}, {})", block.x, block.y);
    player.interaction = Interaction::Grabbed {
        block: id,
        moved: false,
    };
}

/// Attempt a climb up-and-over the block the player is facing. Only offered
/// when the player is not grabbing or lifting.
pub fn try_climb(player: &mut Player, grid: &GridMap) {
    if player.is_interacting() || player.is_busy() {
        return;
    }
    let Some(id) = adjacent_block(player, grid) else {
        return;
    };
    let block = grid.block(id);
    let (cx, cy) = player.center_cell(grid.tile_width(), grid.tile_height());
    if grid.has_solid(block.x, block.y + 1) || grid.has_solid(cx, cy + 1) {
        return;
    }
    let facing = Direction::horizontal_toward(cx as f32, block.x as f32);
    debug!("climbing block at ({}, {})", block.x, block.y);
    player.anim = AnimationState::new(Movement::climb(facing));
}

/// Advance the interaction for a held direction key. Callers must only
/// invoke this once the player's current animation is done.
pub fn advance(player: &mut Player, grid: &mut GridMap, dir: Direction) {
    if !dir.is_horizontal() {
        return;
    }
    match player.interaction {
        Interaction::None => {}
        Interaction::Grabbed { block, .. } => advance_grabbed(player, grid, block, dir),
        Interaction::Lifted { block } => advance_lifted(player, grid, block, dir),
    }
}

/// Push or pull the grabbed block one cell
fn advance_grabbed(player: &mut Player, grid: &mut GridMap, block: BlockId, dir: Direction) {
    if grid.is_active(block) {
        return;
    }
    let relative_sign = grid.block(block).x as f32 - player.body.pos.x / grid.tile_width();
    let movement = Movement::push_pull(dir, relative_sign);

    if movement.is_pull() {
        if !player_can_move(player, grid, dir) {
            debug!("pull blocked: no retreat cell");
            return;
        }
        debug!("pulling block {:?}", dir);
        start_block_animation(grid, block, movement);
        player.anim = AnimationState::new(movement);
        player.interaction = Interaction::Grabbed { block, moved: true };
    } else {
        let run = movable_run(grid, block, dir);
        if run.is_empty() {
            debug!("push blocked");
            return;
        }
        debug!("pushing run of {} {:?}", run.len(), dir);
        for id in run {
            start_block_animation(grid, id, movement);
        }
        player.anim = AnimationState::new(movement);
        player.interaction = Interaction::Grabbed { block, moved: true };
    }
}

/// Contiguous run of blocks that would move with a push, starting at the
/// grabbed block. The run is rejected as a whole (empty result) as soon as
/// a cell has a block above it (nothing is pushed under an overhang), a
/// non-movable block is encountered, or the run hits the grid edge with no
/// free cell to move into.
fn movable_run(grid: &GridMap, first: BlockId, dir: Direction) -> Vec<BlockId> {
    let mut run = Vec::new();
    let y = grid.block(first).y;
    let mut x = grid.block(first).x;

    while let Some(id) = grid.block_at(x, y) {
        if grid.has_block(x, y + 1) || !grid.block(id).is_movable() {
            run.clear();
            return run;
        }
        run.push(id);
        x += dir.dx();
        if !in_bounds(grid, x, y) {
            // The run reaches the edge: there is no free cell to push into
            run.clear();
            return run;
        }
    }
    run
}

/// Carry the lifted block: walk with it, or step down a ledge
fn advance_lifted(player: &mut Player, grid: &mut GridMap, block: BlockId, dir: Direction) {
    if grid.is_active(block) {
        return;
    }
    let (cx, cy) = player.center_cell(grid.tile_width(), grid.tile_height());
    let player_free = !grid.has_block(cx + dir.dx(), cy);
    let block_free = block_can_move(grid, block, dir);
    let footing = grid.has_solid(cx + dir.dx(), cy - 1);

    let movement = if player_free && block_free && footing {
        Movement::walk(dir)
    } else if player_free && block_free {
        Movement::climb_down(dir)
    } else {
        debug!("carry blocked {:?}", dir);
        return;
    };

    start_block_animation(grid, block, movement);
    player.anim = AnimationState::new(movement);
}

/// Handle release of the grab key: lift, place down, or end the grab
pub fn release(player: &mut Player, grid: &mut GridMap) {
    match player.interaction {
        Interaction::None => {}
        Interaction::Grabbed { block, moved } => {
            if moved {
                debug!("ending grab");
                player.interaction = Interaction::None;
            } else {
                try_lift(player, grid, block);
            }
        }
        Interaction::Lifted { block } => place_down(player, grid, block),
    }
}

/// Lift the grabbed block up-and-over onto the cell above the player
fn try_lift(player: &mut Player, grid: &mut GridMap, block: BlockId) {
    let (bx, by, liftable) = {
        let b = grid.block(block);
        (b.x, b.y, b.is_liftable())
    };
    let tw = grid.tile_width();
    let facing = Direction::horizontal_toward(player.body.pos.x / tw, bx as f32);
    let movement = Movement::lift(facing);
    let (dx, dy) = movement.direction.delta();

    let legal = liftable
        && !grid.is_active(block)
        && !grid.has_block(bx, by + 1)
        && in_bounds(grid, bx + dx, by + dy)
        && !grid.has_block(bx + dx, by + dy);

    if legal {
        debug!("lifting block at ({bx}, {by})");
        grid.activate(block);
        let b = grid.block_mut(block);
        b.lifted = true;
        b.anim = AnimationState::new(movement);
        player.interaction = Interaction::Lifted { block };
    } else {
        debug!("cannot lift block at ({bx}, {by})");
        player.interaction = Interaction::None;
    }
}

/// Place the carried block into the diagonal place-down cell, or failing
/// that the straight forward cell. If neither is free the release is
/// refused and the player keeps carrying.
fn place_down(player: &mut Player, grid: &mut GridMap, block: BlockId) {
    if grid.is_active(block) {
        return;
    }
    let facing = player.facing;
    if !facing.is_horizontal() {
        return;
    }

    let place = Movement::place(facing);
    let movement = if block_can_move(grid, block, place.direction) {
        place
    } else if block_can_move(grid, block, facing) {
        Movement::walk(facing)
    } else {
        debug!("could not place block down");
        return;
    };

    debug!("placing block down {:?}", movement.direction);
    grid.block_mut(block).lifted = false;
    start_block_animation(grid, block, movement);
    // The player animates the hand-off in place: same timing as the block,
    // no displacement of its own.
    player.anim = AnimationState::new(Movement {
        direction: Direction::None,
        ..movement
    });
    player.interaction = Interaction::None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    use crate::sim::object::BlockProps;

    const TILE: f32 = 48.0;

    fn grid() -> GridMap {
        // 8x12 with a solid floor along y=0
        let mut grid = GridMap::new(8, 12, TILE, TILE);
        for x in 0..8 {
            grid.insert_block(x, 0, BlockProps::from_strings(&["solid"]));
        }
        grid
    }

    fn player_at_cell(x: i32, y: i32) -> Player {
        Player::new(Vec2::new(x as f32 * TILE, y as f32 * TILE), TILE, TILE)
    }

    #[test]
    fn test_grab_requires_adjacent_movable() {
        let mut g = grid();
        g.insert_block(3, 1, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        // Solid-only block: not grabbable
        try_grab(&mut p, &g);
        assert_eq!(p.interaction, Interaction::None);

        // Facing away from it: nothing adjacent
        let id = g.insert_block(1, 1, BlockProps::from_strings(&["movable"]));
        try_grab(&mut p, &g);
        assert_eq!(p.interaction, Interaction::None);

        p.facing = Direction::Left;
        try_grab(&mut p, &g);
        assert_eq!(
            p.interaction,
            Interaction::Grabbed {
                block: id,
                moved: false
            }
        );
    }

    #[test]
    fn test_lift_moves_block_to_active_set() {
        // Scenario: liftable block beside the player with a free above-cell
        let mut g = grid();
        let id = g.insert_block(3, 1, BlockProps::from_strings(&["liftable"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_grab(&mut p, &g);
        assert!(matches!(p.interaction, Interaction::Grabbed { .. }));

        release(&mut p, &mut g);
        assert_eq!(p.interaction, Interaction::Lifted { block: id });
        assert!(g.is_active(id));
        assert!(!g.has_block(3, 1));
        assert!(g.block(id).lifted);
        // Lift travels up and toward above the player
        assert_eq!(g.block(id).anim.movement().direction, Direction::UpLeft);
    }

    #[test]
    fn test_lift_refused_under_overhang() {
        let mut g = grid();
        let id = g.insert_block(3, 1, BlockProps::from_strings(&["liftable"]));
        g.insert_block(3, 2, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_grab(&mut p, &g);
        release(&mut p, &mut g);
        // Refused lift ends the grab; block stays resident
        assert_eq!(p.interaction, Interaction::None);
        assert!(!g.is_active(id));
        assert_eq!(g.block_at(3, 1), Some(id));
    }

    #[test]
    fn test_push_run_atomicity_overhang() {
        // Three movable blocks in a row with an overhang above the third:
        // nothing in the run moves.
        let mut g = grid();
        let a = g.insert_block(3, 1, BlockProps::from_strings(&["movable"]));
        let b = g.insert_block(4, 1, BlockProps::from_strings(&["movable"]));
        let c = g.insert_block(5, 1, BlockProps::from_strings(&["movable"]));
        g.insert_block(5, 2, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_grab(&mut p, &g);
        advance(&mut p, &mut g, Direction::Right);

        for id in [a, b, c] {
            assert!(!g.is_active(id));
            assert!(g.block(id).anim.is_none());
        }
        assert_eq!(
            p.interaction,
            Interaction::Grabbed {
                block: a,
                moved: false
            }
        );
    }

    #[test]
    fn test_push_run_moves_together() {
        let mut g = grid();
        let a = g.insert_block(3, 1, BlockProps::from_strings(&["movable"]));
        let b = g.insert_block(4, 1, BlockProps::from_strings(&["movable"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_grab(&mut p, &g);
        advance(&mut p, &mut g, Direction::Right);

        assert!(g.is_active(a));
        assert!(g.is_active(b));
        assert!(!p.anim.is_none());
        assert!(matches!(
            p.interaction,
            Interaction::Grabbed { moved: true, .. }
        ));
    }

    #[test]
    fn test_push_into_wall_rejected() {
        // Movable run reaching the grid edge has no free cell to move into
        let mut g = grid();
        for x in 3..8 {
            g.insert_block(x, 1, BlockProps::from_strings(&["movable"]));
        }
        let first = g.block_at(3, 1).unwrap();
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_grab(&mut p, &g);
        advance(&mut p, &mut g, Direction::Right);
        assert!(!g.is_active(first));
    }

    #[test]
    fn test_pull_needs_retreat_footing() {
        let mut g = grid();
        let id = g.insert_block(3, 1, BlockProps::from_strings(&["movable"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        try_grab(&mut p, &g);

        // Retreat cell (1,1) is free with floor beneath: pull succeeds
        advance(&mut p, &mut g, Direction::Left);
        assert!(g.is_active(id));
        assert!(g.block(id).anim.movement().is_pull());
    }

    #[test]
    fn test_pull_blocked_without_retreat() {
        let mut g = grid();
        let id = g.insert_block(3, 1, BlockProps::from_strings(&["movable"]));
        g.insert_block(1, 1, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        try_grab(&mut p, &g);

        advance(&mut p, &mut g, Direction::Left);
        assert!(!g.is_active(id));
    }

    #[test]
    fn test_place_down_refused_when_surrounded() {
        let mut g = grid();
        let carried = g.insert_block(2, 2, BlockProps::from_strings(&["liftable"]));
        g.block_mut(carried).lifted = true;
        // Both the place-down cell (3,1) and the forward cell (3,2) occupied
        g.insert_block(3, 1, BlockProps::from_strings(&["solid"]));
        g.insert_block(3, 2, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        p.interaction = Interaction::Lifted { block: carried };

        release(&mut p, &mut g);
        assert_eq!(p.interaction, Interaction::Lifted { block: carried });
        assert!(g.block(carried).lifted);
    }

    #[test]
    fn test_place_down_into_facing_cell() {
        let mut g = grid();
        let carried = g.insert_block(2, 2, BlockProps::from_strings(&["liftable"]));
        g.block_mut(carried).lifted = true;
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        p.interaction = Interaction::Lifted { block: carried };

        release(&mut p, &mut g);
        assert_eq!(p.interaction, Interaction::None);
        assert!(g.is_active(carried));
        assert!(!g.block(carried).lifted);
        assert_eq!(g.block(carried).anim.movement().direction, Direction::DownRight);
        // The player plays out the hand-off for the block's duration but
        // stays in its cell
        assert!(p.is_busy());
        assert_eq!(p.anim.movement().direction, Direction::None);
        assert_eq!(
            p.anim.movement().duration,
            g.block(carried).anim.movement().duration
        );
    }

    #[test]
    fn test_carry_walk_on_flat_ground() {
        let mut g = grid();
        let carried = g.insert_block(2, 2, BlockProps::from_strings(&["liftable"]));
        g.block_mut(carried).lifted = true;
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        p.interaction = Interaction::Lifted { block: carried };

        // Floor continues under (3,1): ordinary carry walk
        advance(&mut p, &mut g, Direction::Right);
        assert!(g.is_active(carried));
        assert_eq!(g.block(carried).anim.movement().direction, Direction::Right);
        assert_eq!(p.anim.movement().direction, Direction::Right);
    }

    #[test]
    fn test_carry_climb_down_ledge() {
        // Player stands on a pedestal at (2,1); no floor under (3,1)
        let mut g = GridMap::new(8, 12, TILE, TILE);
        g.insert_block(2, 0, BlockProps::from_strings(&["solid"]));
        let carried = g.insert_block(2, 2, BlockProps::from_strings(&["liftable"]));
        g.block_mut(carried).lifted = true;
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;
        p.interaction = Interaction::Lifted { block: carried };

        advance(&mut p, &mut g, Direction::Right);
        assert!(g.is_active(carried));
        assert_eq!(
            g.block(carried).anim.movement().direction,
            Direction::DownRight
        );
        assert_eq!(p.anim.movement().direction, Direction::DownRight);
    }

    #[test]
    fn test_climb_over_block() {
        let mut g = grid();
        g.insert_block(3, 1, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_climb(&mut p, &g);
        assert_eq!(p.anim.movement().direction, Direction::UpRight);
    }

    #[test]
    fn test_climb_refused_under_overhang() {
        let mut g = grid();
        g.insert_block(3, 1, BlockProps::from_strings(&["solid"]));
        g.insert_block(3, 2, BlockProps::from_strings(&["solid"]));
        let mut p = player_at_cell(2, 1);
        p.facing = Direction::Right;

        try_climb(&mut p, &g);
        assert!(p.anim.is_none());
    }
}
