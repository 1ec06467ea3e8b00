//! Per-frame simulation step
//!
//! Ordering within a step matters: active blocks advance before player
//! movement resolves, so a player never collides against a block's stale
//! pre-advance position.

use glam::Vec2;

use super::grid::{BlockId, GridMap};
use super::interaction;
use super::movement::{AnimationState, Direction, Movement};
use super::stage::Stage;
use crate::consts::{GRAVITY, MAX_FALL_SPEED};

/// Decoded input intents for a single frame. The host delivers this as a
/// pre-debounced snapshot; `move_left`/`move_right` are mutually exclusive
/// (last-set-wins is the host's concern).
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Grab key currently held
    pub grab_down: bool,
    /// Grab key released this frame
    pub grab_released: bool,
    pub switch_player: bool,
    pub restart_stage: bool,
}

impl TickInput {
    fn direction(&self) -> Direction {
        if self.move_left {
            Direction::Left
        } else if self.move_right {
            Direction::Right
        } else {
            Direction::None
        }
    }
}

/// Advance the stage by one frame
pub fn tick(stage: &mut Stage, input: &TickInput, dt: f32) {
    // 1. In-flight blocks first: completions re-insert into the grid before
    //    any player collision query runs this step.
    stage.grid.advance_active(dt);
    settle_weighted_blocks(&mut stage.grid);

    // 2. Stage-level intents
    if input.restart_stage {
        stage.reset_start_positions();
    }
    if input.switch_player {
        stage.next_player();
    }

    // 3. Interaction intents for the active player
    let dir = input.direction();
    let active = stage.active_player;
    {
        let player = &mut stage.players[active];
        if input.grab_down {
            interaction::try_grab(player, &stage.grid);
        }
        if dir != Direction::None {
            player.facing = dir;
            if player.is_interacting() {
                if player.anim.is_done() {
                    interaction::advance(player, &mut stage.grid, dir);
                }
            } else if !player.is_busy() {
                player.set_walk_velocity(dir, stage.grid.tile_width());
            }
        }
        if input.grab_released {
            interaction::release(player, &mut stage.grid);
        }
    }

    // 4. Physics per player
    let tw = stage.grid.tile_width();
    let th = stage.grid.tile_height();
    for (idx, player) in stage.players.iter_mut().enumerate() {
        if !player.anim.is_none() {
            player.anim.update(dt);
            if player.anim.is_done() {
                // Commit the logical move; rendering interpolated up to here
                let (dx, dy) = player.anim.movement().total_offset();
                player.body.pos += Vec2::new(dx as f32 * tw, dy as f32 * th);
                player.anim = AnimationState::NONE;
            }
        } else {
            player.fall_time += dt;
            let fall_velocity = -GRAVITY * player.fall_time * th;
            player.body.velocity.y = fall_velocity.max(-MAX_FALL_SPEED * th);

            let distance = player.body.velocity * dt;
            let outcome = super::collision::resolve_move(&mut player.body, &stage.grid, distance);
            player.collided_horizontally = outcome.horizontal_collision;
            player.collided_vertically = outcome.vertical_collision;
            if outcome.landed {
                player.fall_time = 0.0;
                player.body.velocity.y = 0.0;
            }

            // Walking into a climbable block climbs it
            if idx == active && dir != Direction::None && outcome.horizontal_collision {
                interaction::try_climb(player, &stage.grid);
            }
        }
        // Held keys re-assert horizontal velocity next frame
        player.body.velocity.x = 0.0;
    }
}

/// Weighted blocks with nothing beneath them start a one-cell fall
fn settle_weighted_blocks(grid: &mut GridMap) {
    let falling: Vec<BlockId> = grid
        .resident_blocks()
        .filter(|&id| {
            let b = grid.block(id);
            b.has_weight() && !b.lifted && b.y > 0 && !grid.has_block(b.x, b.y - 1)
        })
        .collect();
    for id in falling {
        grid.block_mut(id).anim = AnimationState::new(Movement::fall());
        grid.activate(id);
    }
}
