/// Player physics: one frame of input → velocity → position.
///
/// Per-frame order:
///   1. Input: left/right set horizontal velocity, jump fires if grounded
///   2. Gravity (every frame, grounded or not)
///   3. Integrate position
///   4. Friction on horizontal velocity
///   5. Horizontal wrap (cylindrical tower)
///
/// Fall damage and the invulnerability countdown are separate calls so the
/// step function can apply damage (which needs the whole world) in between.

use crate::config::PhysicsConfig;
use super::entity::{Facing, FrameInput, Player};

/// Advance the player by one frame. Returns true if a jump started.
pub fn update_player(p: &mut Player, input: FrameInput, cfg: &PhysicsConfig, canvas_width: f32) -> bool {
    if input.left {
        p.vx = -cfg.move_speed;
        p.facing = Facing::Left;
    }
    if input.right {
        p.vx = cfg.move_speed;
        p.facing = Facing::Right;
    }

    let mut jumped = false;
    if input.jump && p.grounded {
        p.vy = -cfg.jump_power;
        p.grounded = false;
        jumped = true;
    }

    p.vy += cfg.gravity;

    p.x += p.vx;
    p.y += p.vy;

    p.vx *= cfg.friction;

    wrap_horizontal(p, canvas_width);

    jumped
}

/// Leaving one side of the tower puts the player on the other.
pub fn wrap_horizontal(p: &mut Player, canvas_width: f32) {
    if p.x < -p.width {
        p.x = canvas_width;
    } else if p.x > canvas_width {
        p.x = -p.width;
    }
}

/// Has the player dropped too far below the last surface it stood on?
pub fn fell_too_far(p: &Player, cfg: &PhysicsConfig) -> bool {
    p.y > p.last_ground_y + cfg.max_fall_distance
}

pub fn start_invulnerability(p: &mut Player, frames: u32) {
    p.invulnerable = true;
    p.invulnerable_frames = frames;
}

/// Count down the post-damage window. Returns true on the frame it ends.
pub fn tick_invulnerability(p: &mut Player) -> bool {
    if !p.invulnerable {
        return false;
    }
    p.invulnerable_frames = p.invulnerable_frames.saturating_sub(1);
    if p.invulnerable_frames == 0 {
        p.invulnerable = false;
        return true;
    }
    false
}

/// Stand the player on a surface whose top is at `surface_y`.
pub fn land_on(p: &mut Player, surface_y: f32) {
    p.y = surface_y - p.height;
    p.vy = 0.0;
    p.grounded = true;
    p.last_ground_y = surface_y;
}

/// Place the player at rest, as after a respawn.
pub fn place_at_rest(p: &mut Player, x: f32, y: f32, ground_y: f32) {
    p.x = x;
    p.y = y;
    p.last_ground_y = ground_y;
    p.vx = 0.0;
    p.vy = 0.0;
    p.grounded = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        let mut p = Player::new(100.0, 500.0, 40.0, 50.0);
        p.last_ground_y = 550.0;
        p
    }

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    const W: f32 = 700.0;

    #[test]
    fn gravity_applies_every_frame() {
        let mut p = player();
        p.grounded = true;
        update_player(&mut p, FrameInput::default(), &cfg(), W);
        assert!((p.vy - 0.8).abs() < 1e-5);
        update_player(&mut p, FrameInput::default(), &cfg(), W);
        assert!((p.vy - 1.6).abs() < 1e-5);
        assert!((p.y - 502.4).abs() < 1e-3);
    }

    #[test]
    fn jump_requires_ground() {
        let mut p = player();
        p.grounded = false;
        let jumped = update_player(&mut p, FrameInput { jump: true, ..Default::default() }, &cfg(), W);
        assert!(!jumped);
        assert!(p.vy > 0.0);
    }

    #[test]
    fn jump_clears_grounded_and_applies_impulse() {
        let mut p = player();
        p.grounded = true;
        let jumped = update_player(&mut p, FrameInput { jump: true, ..Default::default() }, &cfg(), W);
        assert!(jumped);
        assert!(!p.grounded);
        // -25 impulse then +0.8 gravity in the same frame
        assert!((p.vy - (-24.2)).abs() < 1e-4);

        // Holding jump in the air does nothing more
        let again = update_player(&mut p, FrameInput { jump: true, ..Default::default() }, &cfg(), W);
        assert!(!again);
    }

    #[test]
    fn held_direction_sets_speed_and_facing() {
        let mut p = player();
        update_player(&mut p, FrameInput { left: true, ..Default::default() }, &cfg(), W);
        assert_eq!(p.facing, Facing::Left);
        assert!((p.x - 94.0).abs() < 1e-4);
        // friction applied after integration
        assert!((p.vx - (-5.1)).abs() < 1e-4);
    }

    #[test]
    fn friction_decays_without_input() {
        let mut p = player();
        p.vx = 6.0;
        for _ in 0..60 {
            update_player(&mut p, FrameInput::default(), &cfg(), W);
        }
        assert!(p.vx.abs() < 0.01);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn wraps_left_to_right() {
        let mut p = player();
        p.x = -41.0;
        wrap_horizontal(&mut p, W);
        assert_eq!(p.x, W);
    }

    #[test]
    fn wraps_right_to_left() {
        let mut p = player();
        p.x = W + 1.0;
        wrap_horizontal(&mut p, W);
        assert_eq!(p.x, -40.0);
    }

    #[test]
    fn partial_offscreen_does_not_wrap() {
        let mut p = player();
        p.x = -20.0;
        wrap_horizontal(&mut p, W);
        assert_eq!(p.x, -20.0);
    }

    #[test]
    fn fall_threshold_is_strict() {
        let mut p = player();
        p.y = p.last_ground_y + 700.0;
        assert!(!fell_too_far(&p, &cfg()));
        p.y += 0.5;
        assert!(fell_too_far(&p, &cfg()));
    }

    #[test]
    fn invulnerability_lasts_exact_frames() {
        let mut p = player();
        start_invulnerability(&mut p, 180);
        for _ in 0..179 {
            assert!(!tick_invulnerability(&mut p));
            assert!(p.invulnerable);
        }
        assert!(tick_invulnerability(&mut p));
        assert!(!p.invulnerable);
        assert!(!tick_invulnerability(&mut p));
    }

    #[test]
    fn land_on_snaps_to_surface() {
        let mut p = player();
        p.vy = 9.0;
        land_on(&mut p, 800.0);
        assert_eq!(p.y, 750.0);
        assert_eq!(p.vy, 0.0);
        assert!(p.grounded);
        assert_eq!(p.last_ground_y, 800.0);
    }
}
