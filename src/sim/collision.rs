//! Collision detection and axis-ordered movement resolution
//!
//! Collision is a conservative four-corner check of an axis-aligned
//! bounding box against solid grid cells. Thin or partial overlaps that
//! fall between corners at tile boundaries can slip through; that is a
//! documented trade-off of the scheme, not a bug.

use glam::Vec2;

use super::grid::GridMap;
use super::object::Body;
use crate::grid_coord;

/// Result of a resolved move attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub horizontal_collision: bool,
    pub vertical_collision: bool,
    /// A downward vertical collision: the mover hit the ground this step
    pub landed: bool,
}

/// True if any of the four bounding-box corners lands on a solid cell
pub fn corners_collide(pos: Vec2, size: Vec2, grid: &GridMap) -> bool {
    let tw = grid.tile_width();
    let th = grid.tile_height();
    let left = grid_coord(pos.x, tw);
    let right = grid_coord(pos.x + size.x, tw);
    let bottom = grid_coord(pos.y, th);
    let top = grid_coord(pos.y + size.y, th);

    grid.has_solid(left, bottom)
        || grid.has_solid(right, bottom)
        || grid.has_solid(left, top)
        || grid.has_solid(right, top)
}

/// Apply a displacement to a body, axis by axis, reverting each axis on
/// collision. X is resolved before Y: diagonal moves resolve horizontally
/// first. A downward vertical collision additionally snaps the body onto
/// the tile grid (landing correction).
pub fn resolve_move(body: &mut Body, grid: &GridMap, distance: Vec2) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let previous = body.pos;

    if distance.x.abs() > 0.0 {
        body.pos.x += distance.x;
        if corners_collide(body.pos, body.size, grid) {
            body.pos.x = previous.x;
            outcome.horizontal_collision = true;
        }
    }

    if distance.y.abs() > 0.0 {
        body.pos.y += distance.y;
        if corners_collide(body.pos, body.size, grid) {
            body.pos.y = previous.y;
            if distance.y < 0.0 {
                let th = grid.tile_height();
                body.pos.y = grid_coord(body.pos.y, th) as f32 * th;
                outcome.landed = true;
            }
            outcome.vertical_collision = true;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::sim::object::BlockProps;

    fn floor_grid() -> GridMap {
        // 8x6, solid floor along y=0
        let mut grid = GridMap::new(8, 6, 48.0, 48.0);
        for x in 0..8 {
            grid.insert_block(x, 0, BlockProps::from_strings(&["solid"]));
        }
        grid
    }

    #[test]
    fn test_corners_collide_on_floor() {
        let grid = floor_grid();
        // Standing just above the floor row: no overlap
        assert!(!corners_collide(
            Vec2::new(96.0, 48.0),
            Vec2::new(48.0, 48.0),
            &grid
        ));
        // Sunk one unit into the floor
        assert!(corners_collide(
            Vec2::new(96.0, 47.0),
            Vec2::new(48.0, 48.0),
            &grid
        ));
    }

    #[test]
    fn test_landing_snaps_to_grid() {
        let grid = floor_grid();
        let mut body = Body::new(Vec2::new(96.0, 60.0), Vec2::new(48.0, 48.0));
        let outcome = resolve_move(&mut body, &grid, Vec2::new(0.0, -30.0));
        assert!(outcome.vertical_collision);
        assert!(outcome.landed);
        assert_eq!(body.pos.y, 48.0);
    }

    #[test]
    fn test_x_resolves_before_y() {
        // Wall at x=3 above the floor; a diagonal move into the corner
        // reverts X but still falls with Y.
        let mut grid = floor_grid();
        grid.insert_block(3, 1, BlockProps::from_strings(&["solid"]));
        let mut body = Body::new(Vec2::new(95.0, 80.0), Vec2::new(48.0, 48.0));
        let outcome = resolve_move(&mut body, &grid, Vec2::new(30.0, -10.0));
        assert!(outcome.horizontal_collision);
        assert_eq!(body.pos.x, 95.0);
        assert!(!outcome.vertical_collision);
        assert_eq!(body.pos.y, 70.0);
    }

    #[test]
    fn test_upward_collision_does_not_snap() {
        let mut grid = GridMap::new(8, 6, 48.0, 48.0);
        grid.insert_block(2, 4, BlockProps::from_strings(&["solid"]));
        let mut body = Body::new(Vec2::new(96.0, 90.0), Vec2::new(48.0, 48.0));
        let outcome = resolve_move(&mut body, &grid, Vec2::new(0.0, 60.0));
        assert!(outcome.vertical_collision);
        assert!(!outcome.landed);
        assert_eq!(body.pos.y, 90.0);
    }

    proptest! {
        /// Collision containment: over empty ground, a move is never reverted
        #[test]
        fn prop_free_space_never_reverts(
            x in 48.0f32..250.0,
            y in 120.0f32..200.0,
            dx in -20.0f32..20.0,
            dy in -20.0f32..20.0,
        ) {
            let grid = floor_grid();
            let mut body = Body::new(Vec2::new(x, y), Vec2::new(48.0, 48.0));
            let from = body.pos;
            let outcome = resolve_move(&mut body, &grid, Vec2::new(dx, dy));
            // Well above the floor and inside open space: full displacement applies
            prop_assert!(!outcome.horizontal_collision);
            prop_assert!(!outcome.vertical_collision);
            prop_assert!((body.pos.x - (from.x + dx)).abs() < 1e-4);
            prop_assert!((body.pos.y - (from.y + dy)).abs() < 1e-4);
        }
    }
}
