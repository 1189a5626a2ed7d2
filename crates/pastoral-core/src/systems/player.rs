//! Player movement from the keyboard snapshot

use pastoral_logic::constants::speeds::PLAYER_SPEED;
use pastoral_logic::geometry::{clamp_to_play_area, Rect, Vec2};

use crate::collision::Frame;
use crate::world::WorldState;

/// Move the player by the held keys; a move into a structure is reverted.
pub fn player_system(state: &mut WorldState, frame: &Frame) {
    let keys = state.player.keys;
    let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
    let dir = Vec2::new(axis(keys.left, keys.right), axis(keys.up, keys.down));
    if dir == Vec2::ZERO {
        return;
    }

    let step = frame.step_length(PLAYER_SPEED);
    if step <= 0.0 {
        return;
    }
    let player = &mut state.player;
    let proposed = clamp_to_play_area(player.pos + dir * step, player.size, player.size);
    let moved = Rect::new(proposed.x, proposed.y, player.size, player.size);
    if !frame.colliders.move_blocked(&player.rect(), &moved, &[]) {
        player.pos = proposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BuildKind, Structure};
    use crate::config::SimConfig;

    #[test]
    fn test_player_moves_and_reverts_on_collision() {
        let mut state = WorldState::new(SimConfig::default());
        state.player.pos = Vec2::new(100.0, 100.0);
        state.player.keys.right = true;
        let frame = Frame::new(&state.ecs, Vec::new(), 1.0 / 60.0);
        player_system(&mut state, &frame);
        assert!((state.player.pos.x - 105.0).abs() < 1e-3);
        state.player.pos = Vec2::new(105.0, 100.0);

        // a hut just to the right of the player
        let hut: Structure = BuildKind::Hut.build(Vec2::new(140.0, 110.0), 0);
        state.spawn_structure(hut);
        let frame = Frame::new(&state.ecs, Vec::new(), 1.0 / 60.0);
        player_system(&mut state, &frame);
        assert_eq!(state.player.pos, Vec2::new(105.0, 100.0));
    }

    #[test]
    fn test_player_stays_in_play_area() {
        let mut state = WorldState::new(SimConfig::default());
        state.player.pos = Vec2::new(0.0, 41.0);
        state.player.keys.up = true;
        state.player.keys.left = true;
        let frame = Frame::new(&state.ecs, Vec::new(), 1.0 / 60.0);
        player_system(&mut state, &frame);
        assert_eq!(state.player.pos, Vec2::new(0.0, 40.0));
    }
}
