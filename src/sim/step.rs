/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Game clock + scheduled platform removals
///   2. Ambient music gate (first movement or jump input)
///   3. Player physics, fall damage, invulnerability countdown
///   4. Entity updates (hazard patrol, pickup bob, coin spin)
///   5. Collision sweep (platforms → hazards → power-ups → collectibles)
///   6. Camera follow
///
/// Outside `Phase::Running` the step is a no-op: nothing moves and no
/// counter changes until `restart`.

use rand::Rng;

use crate::domain::entity::FrameInput;
use crate::domain::physics;
use super::collision;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt_ms: u64) -> Vec<GameEvent> {
    if world.phase != Phase::Running { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;
    world.clock_ms += dt_ms;

    process_removals(world, &mut events);

    if !world.music_started && input.any() {
        world.music_started = true;
        events.push(GameEvent::MusicStarted);
    }

    if resolve_player(world, input, &mut events) { return events; }
    update_entities(world);
    if collision::resolve(world, &mut events) == collision::Flow::Halt { return events; }

    world.camera.follow(world.player.center_y(), world.world_height);
    events
}

/// Returns true if the game ended during the player update.
fn resolve_player(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) -> bool {
    let canvas_w = world.level.canvas_width;
    if physics::update_player(&mut world.player, input, &world.physics, canvas_w) {
        events.push(GameEvent::Jumped);
    }

    if physics::fell_too_far(&world.player, &world.physics) {
        take_damage(world, events);
        if world.phase == Phase::GameOver { return true; }
    }

    physics::tick_invulnerability(&mut world.player);
    false
}

fn update_entities(world: &mut WorldState) {
    for h in &mut world.hazards { h.update(); }
    for p in &mut world.power_ups { p.update(); }
    for c in &mut world.collectibles { c.update(); }
}

// ══════════════════════════════════════════════════════════════
// Scheduled removals
// ══════════════════════════════════════════════════════════════

/// Drop every breakable platform whose collapse time has come.
/// A record whose platform is already gone is discarded silently.
fn process_removals(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.pending_removals.is_empty() { return; }

    let now = world.clock_ms;
    let (due, waiting): (Vec<_>, Vec<_>) = world
        .pending_removals
        .drain(..)
        .partition(|r| r.due_ms <= now);
    world.pending_removals = waiting;

    for removal in due {
        let found = world.platforms.iter().position(|p| p.index == removal.platform_index);
        if let Some(pos) = found {
            world.platforms.remove(pos);
            events.push(GameEvent::PlatformCollapsed { index: removal.platform_index });
            tracing::debug!("platform {} collapsed", removal.platform_index);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Damage / respawn
// ══════════════════════════════════════════════════════════════

/// Lose a life unless invulnerable. Ends the game on the last life,
/// otherwise respawns on the highest platform reached so far.
pub fn take_damage(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.invulnerable { return; }

    world.lives = world.lives.saturating_sub(1);
    physics::start_invulnerability(&mut world.player, world.physics.invulnerability_frames);
    events.push(GameEvent::PlayerHurt { lives_left: world.lives });
    tracing::debug!("player hurt, {} lives left", world.lives);

    if world.lives == 0 {
        world.phase = Phase::GameOver;
        events.push(GameEvent::GameOver);
        tracing::info!(
            "game over: score {}, platform {}, height {} m",
            world.score, world.current_platform, world.height_m()
        );
        return;
    }

    respawn(world);
}

fn respawn(world: &mut WorldState) {
    let target = world
        .platforms
        .iter()
        .filter(|p| p.index <= world.current_platform)
        .min_by(|a, b| a.y.total_cmp(&b.y))
        .map(|p| (p.bounds().center_x(), p.y));

    let p = &mut world.player;
    match target {
        Some((center_x, top)) => {
            let (x, y) = (center_x - p.width / 2.0, top - p.height);
            physics::place_at_rest(p, x, y, top);
        }
        None => {
            let wh = world.world_height;
            physics::place_at_rest(p, 150.0, wh - 150.0, wh - 100.0);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Restart
// ══════════════════════════════════════════════════════════════

/// Back to a fresh Running game with a newly generated tower.
pub fn restart<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) -> Vec<GameEvent> {
    let previous = world.phase;
    world.reset(rng);
    tracing::info!("restart (was {previous:?})");
    vec![GameEvent::Restarted]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelConfig, PhysicsConfig};
    use crate::domain::entity::{Hazard, PowerUp, PowerUpKind};
    use crate::sim::catalog::sample_catalog;
    use crate::sim::world::PendingRemoval;
    use rand::rngs::mock::StepRng;

    const DT: u64 = 16;

    fn bare_world() -> WorldState {
        let mut rng = StepRng::new(u64::MAX, 0);
        WorldState::new(sample_catalog(), PhysicsConfig::default(), LevelConfig::default(), &mut rng)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    /// Player slightly overlapping the top of platform `index`, falling.
    fn drop_onto(world: &mut WorldState, index: usize) {
        let pos = world.platforms.iter().position(|p| p.index == index).unwrap();
        let p = &world.platforms[pos];
        world.player.x = p.x + 10.0;
        world.player.y = p.y - world.player.height + 5.0;
        world.player.vy = 5.0;
        world.player.grounded = false;
        world.player.last_ground_y = p.y;
    }

    #[test]
    fn climb_hurt_collect_win() {
        let mut w = bare_world();
        assert_eq!((w.score, w.lives, w.current_platform), (0, 5, 0));

        // Land on platform 1
        drop_onto(&mut w, 1);
        step(&mut w, idle(), DT);
        assert_eq!((w.score, w.current_platform), (75, 1));

        // Walk into a hazard while standing (vy is never positive at contact)
        let p1 = w.platforms[1].clone();
        w.hazards.push(Hazard::new(w.player.x + 20.0, p1.y - 35.0, 0.0, '🐖'));
        step(&mut w, idle(), DT);
        assert_eq!(w.lives, 4);
        assert!(w.player.invulnerable);
        assert_eq!(w.player.x, p1.x + p1.width / 2.0 - 20.0);
        assert_eq!(w.player.y, p1.y - 50.0);
        assert_eq!(w.score, 75);

        // Grab a Score pickup
        w.hazards.clear();
        w.power_ups.push(PowerUp::new(w.player.x, w.player.y, PowerUpKind::Score));
        let before = w.score;
        step(&mut w, idle(), DT);
        assert_eq!(w.score, before + 1000);

        // Reach the top
        drop_onto(&mut w, 234);
        let ev = step(&mut w, idle(), DT);
        assert_eq!(w.phase, Phase::Victory);
        assert_eq!(w.lives, 4);
        assert!(ev.contains(&GameEvent::Victory));
    }

    #[test]
    fn damage_ignored_while_invulnerable() {
        let mut w = bare_world();
        let mut ev = vec![];
        take_damage(&mut w, &mut ev);
        take_damage(&mut w, &mut ev);
        assert_eq!(w.lives, 4);
        assert_eq!(ev.iter().filter(|e| matches!(e, GameEvent::PlayerHurt { .. })).count(), 1);

        // Window closes after the configured frame count
        for _ in 0..180 {
            physics::tick_invulnerability(&mut w.player);
        }
        take_damage(&mut w, &mut ev);
        assert_eq!(w.lives, 3);
    }

    #[test]
    fn respawn_falls_back_when_no_platform_qualifies() {
        let mut w = bare_world();
        w.platforms.retain(|p| p.index > 0);
        let mut ev = vec![];
        take_damage(&mut w, &mut ev);
        assert_eq!(w.player.x, 150.0);
        assert_eq!(w.player.y, w.world_height - 150.0);
        assert_eq!(w.player.last_ground_y, w.world_height - 100.0);
        assert!(w.player.grounded);
        assert_eq!((w.player.vx, w.player.vy), (0.0, 0.0));
    }

    #[test]
    fn game_over_freezes_world() {
        let mut w = bare_world();
        w.lives = 1;
        let mut ev = vec![];
        take_damage(&mut w, &mut ev);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.lives, 0);
        assert_eq!(ev.last(), Some(&GameEvent::GameOver));

        let (score, frame, y) = (w.score, w.frame, w.player.y);
        let ev = step(&mut w, FrameInput { right: true, jump: true, ..Default::default() }, DT);
        assert!(ev.is_empty());
        assert_eq!((w.score, w.frame, w.player.y), (score, frame, y));
    }

    #[test]
    fn fall_damage_respawns() {
        let mut w = bare_world();
        w.player.y = w.player.last_ground_y + 701.0;
        let ev = step(&mut w, idle(), DT);
        assert_eq!(w.lives, 4);
        assert!(ev.contains(&GameEvent::PlayerHurt { lives_left: 4 }));
        // Respawned centered on the ground platform
        assert_eq!(w.player.y, w.platforms[0].y - 50.0);
        assert_eq!(w.player.x, 350.0 - 20.0);
    }

    #[test]
    fn fatal_fall_stops_the_frame() {
        let mut w = bare_world();
        w.lives = 1;
        w.player.y = w.player.last_ground_y + 701.0;
        let ev = step(&mut w, idle(), DT);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(ev.last(), Some(&GameEvent::GameOver));
    }

    #[test]
    fn jump_emits_event() {
        let mut w = bare_world();
        w.player.grounded = true;
        let ev = step(&mut w, FrameInput { jump: true, ..Default::default() }, DT);
        assert!(ev.contains(&GameEvent::Jumped));
        assert!(!w.player.grounded);
    }

    #[test]
    fn music_starts_once_on_first_input() {
        let mut w = bare_world();
        step(&mut w, idle(), DT);
        assert!(!w.music_started);

        let ev = step(&mut w, FrameInput { left: true, ..Default::default() }, DT);
        assert!(ev.contains(&GameEvent::MusicStarted));
        let ev = step(&mut w, FrameInput { left: true, ..Default::default() }, DT);
        assert!(!ev.contains(&GameEvent::MusicStarted));
    }

    #[test]
    fn breakable_collapses_after_delay() {
        let mut w = bare_world();
        drop_onto(&mut w, 25);
        step(&mut w, idle(), DT);
        assert_eq!(w.pending_removals.len(), 1);
        let due = w.pending_removals[0].due_ms;
        assert_eq!(due, DT + 1500);

        // Still there one frame before the deadline
        w.clock_ms = due - DT - 1;
        step(&mut w, idle(), DT);
        assert!(w.platforms.iter().any(|p| p.index == 25));

        let ev = step(&mut w, idle(), DT);
        assert!(ev.contains(&GameEvent::PlatformCollapsed { index: 25 }));
        assert!(!w.platforms.iter().any(|p| p.index == 25));
        assert!(w.pending_removals.is_empty());
    }

    #[test]
    fn removing_missing_platform_is_noop() {
        let mut w = bare_world();
        w.pending_removals.push(PendingRemoval { platform_index: 50, due_ms: 0 });
        w.pending_removals.push(PendingRemoval { platform_index: 50, due_ms: 0 });
        let count = w.platforms.len();

        let ev = step(&mut w, idle(), DT);
        assert_eq!(w.platforms.len(), count - 1);
        assert_eq!(ev.iter().filter(|e| matches!(e, GameEvent::PlatformCollapsed { .. })).count(), 1);
        assert!(w.pending_removals.is_empty());
    }

    #[test]
    fn restart_resets_everything() {
        let mut w = bare_world();
        w.score = 4321;
        w.lives = 0;
        w.current_platform = 77;
        w.phase = Phase::GameOver;
        w.music_started = true;
        w.platforms.truncate(10);
        w.pending_removals.push(PendingRemoval { platform_index: 25, due_ms: 99 });

        let mut rng = StepRng::new(0, 0);
        let ev = restart(&mut w, &mut rng);
        assert_eq!(ev, vec![GameEvent::Restarted]);
        assert_eq!((w.score, w.lives, w.current_platform), (0, 5, 0));
        assert_eq!(w.phase, Phase::Running);
        assert!(!w.music_started);
        assert_eq!(w.platforms.len(), 235);
        assert_eq!(w.collectibles.len(), 234);
        assert!(w.pending_removals.is_empty());
        assert_eq!(w.player.x, 150.0);
    }

    #[test]
    fn camera_follows_player() {
        let mut w = bare_world();
        drop_onto(&mut w, 100);
        step(&mut w, idle(), DT);
        let center = w.player.center_y();
        assert!((w.camera.y - (center - 325.0)).abs() < 1e-3);
    }
}
