/// Collision resolver: one sweep per frame, after all entities have moved.
///
/// Pass order:
///   1. Platforms    (landing, progress, victory, breakable trigger)
///   2. Hazards      (stomp or damage)
///   3. Power-ups
///   4. Collectibles
///
/// All tests are strict AABB overlap. A pass that ends the game (victory
/// or the last life lost) stops the sweep; later passes never run.

use crate::domain::entity::{PlatformKind, PowerUpKind};
use crate::domain::physics;
use crate::sim::catalog::TOWER_HEIGHT;
use super::event::GameEvent;
use super::step::take_damage;
use super::world::{PendingRemoval, Phase, WorldState};

/// Whether the sweep should keep going.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Halt,
}

pub fn resolve(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    let passes: [fn(&mut WorldState, &mut Vec<GameEvent>) -> Flow; 4] = [
        resolve_platforms,
        resolve_hazards,
        resolve_power_ups,
        resolve_collectibles,
    ];
    for pass in passes {
        if pass(world, events) == Flow::Halt {
            return Flow::Halt;
        }
    }
    Flow::Continue
}

// ══════════════════════════════════════════════════════════════
// Platforms
// ══════════════════════════════════════════════════════════════

fn resolve_platforms(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    for i in 0..world.platforms.len() {
        let platform_box = world.platforms[i].bounds();
        let player = &world.player;
        if !player.bounds().overlaps(&platform_box) {
            continue;
        }
        // Only a falling player whose top is above the platform top lands.
        if !(player.vy > 0.0 && player.y < platform_box.y) {
            continue;
        }

        physics::land_on(&mut world.player, platform_box.y);

        let index = world.platforms[i].index;
        if index > world.current_platform {
            world.current_platform = index;
            world.score += 75;
            world.current_label = world.platforms[i].label.clone();
            events.push(GameEvent::PlatformReached { index });
            tracing::debug!("reached platform {index}: {}", world.current_label);

            if index == TOWER_HEIGHT {
                world.phase = Phase::Victory;
                events.push(GameEvent::Victory);
                tracing::info!("victory with score {}", world.score);
                return Flow::Halt;
            }
        }

        let platform = &mut world.platforms[i];
        if platform.kind == PlatformKind::Breakable && !platform.visited {
            platform.visited = true;
            world.score += 150;
            world.pending_removals.push(PendingRemoval {
                platform_index: index,
                due_ms: world.clock_ms + world.level.breakable_delay_ms,
            });
            events.push(GameEvent::PlatformCracked { index });
        }
    }
    Flow::Continue
}

// ══════════════════════════════════════════════════════════════
// Hazards
// ══════════════════════════════════════════════════════════════

/// Walked back to front so a stomp can remove the hazard in place.
fn resolve_hazards(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    for i in (0..world.hazards.len()).rev() {
        let hazard_box = world.hazards[i].bounds();
        if !world.player.bounds().overlaps(&hazard_box) {
            continue;
        }
        if world.player.vy > 0.0 && world.player.y < hazard_box.y {
            world.hazards.remove(i);
            world.player.vy = -world.physics.stomp_bounce;
            world.score += 250;
            events.push(GameEvent::HazardStomped);
        } else {
            take_damage(world, events);
            if world.phase == Phase::GameOver {
                return Flow::Halt;
            }
        }
    }
    Flow::Continue
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

fn resolve_power_ups(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    let player_box = world.player.bounds();
    for pu in world.power_ups.iter_mut().filter(|p| !p.collected) {
        if !player_box.overlaps(&pu.bounds()) {
            continue;
        }
        pu.collected = true;
        match pu.kind {
            PowerUpKind::Life => {
                world.lives += 1;
                world.score += 500;
            }
            PowerUpKind::Score => world.score += 1000,
            PowerUpKind::Power => world.score += 300,
        }
        events.push(GameEvent::PowerUpCollected { kind: pu.kind });
    }
    Flow::Continue
}

fn resolve_collectibles(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    let player_box = world.player.bounds();
    for c in world.collectibles.iter_mut().filter(|c| !c.collected) {
        if player_box.overlaps(&c.bounds()) {
            c.collected = true;
            world.score += 100;
            events.push(GameEvent::CoinCollected);
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelConfig, PhysicsConfig};
    use crate::domain::entity::{Collectible, Hazard, PowerUp};
    use crate::sim::catalog::sample_catalog;
    use rand::rngs::mock::StepRng;

    /// World with no hazards, pickups or coins (the max-value RNG skips every roll).
    fn bare_world() -> WorldState {
        let mut rng = StepRng::new(u64::MAX, 0);
        WorldState::new(sample_catalog(), PhysicsConfig::default(), LevelConfig::default(), &mut rng)
    }

    /// Put the player just overlapping the top of platform `index`, falling.
    fn drop_onto(world: &mut WorldState, index: usize) {
        let p = &world.platforms[index];
        world.player.x = p.x + 10.0;
        world.player.y = p.y - world.player.height + 5.0;
        world.player.vy = 5.0;
        world.player.grounded = false;
    }

    #[test]
    fn landing_snaps_and_awards_once() {
        let mut w = bare_world();
        let mut ev = vec![];
        drop_onto(&mut w, 3);
        resolve(&mut w, &mut ev);

        let top = w.platforms[3].y;
        assert_eq!(w.player.y, top - 50.0);
        assert_eq!(w.player.vy, 0.0);
        assert!(w.player.grounded);
        assert_eq!(w.player.last_ground_y, top);
        assert_eq!(w.current_platform, 3);
        assert_eq!(w.score, 75);
        assert_eq!(w.current_label, "Service 3");
        assert_eq!(ev, vec![GameEvent::PlatformReached { index: 3 }]);

        // Landing again never re-awards
        drop_onto(&mut w, 3);
        ev.clear();
        resolve(&mut w, &mut ev);
        assert_eq!(w.score, 75);
        assert!(ev.is_empty());
    }

    #[test]
    fn lower_platform_does_not_lower_progress() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.current_platform = 10;
        drop_onto(&mut w, 4);
        resolve(&mut w, &mut ev);
        assert_eq!(w.current_platform, 10);
        assert_eq!(w.score, 0);
        assert!(w.player.grounded);
    }

    #[test]
    fn rising_player_passes_through() {
        let mut w = bare_world();
        let mut ev = vec![];
        drop_onto(&mut w, 2);
        w.player.vy = -10.0;
        resolve(&mut w, &mut ev);
        assert_eq!(w.current_platform, 0);
        assert!(!w.player.grounded);
    }

    #[test]
    fn final_platform_wins_and_halts() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.lives = 1;
        drop_onto(&mut w, 234);
        // A coin right where the player lands must not be picked up
        w.collectibles.push(Collectible::new(w.player.x, w.player.y));

        let flow = resolve(&mut w, &mut ev);
        assert_eq!(flow, Flow::Halt);
        assert_eq!(w.phase, Phase::Victory);
        assert_eq!(w.current_platform, 234);
        assert!(!w.collectibles[0].collected);
        assert_eq!(ev.last(), Some(&GameEvent::Victory));
    }

    #[test]
    fn breakable_schedules_removal_once() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.clock_ms = 1000;
        drop_onto(&mut w, 25);
        resolve(&mut w, &mut ev);
        assert!(w.platforms[25].visited);
        assert_eq!(w.score, 75 + 150);
        assert_eq!(w.pending_removals, vec![PendingRemoval { platform_index: 25, due_ms: 2500 }]);

        drop_onto(&mut w, 25);
        resolve(&mut w, &mut ev);
        assert_eq!(w.pending_removals.len(), 1);
        assert_eq!(w.score, 225);
    }

    #[test]
    fn moving_platform_175_never_breaks() {
        let mut w = bare_world();
        let mut ev = vec![];
        drop_onto(&mut w, 175);
        resolve(&mut w, &mut ev);
        assert!(!w.platforms[175].visited);
        assert!(w.pending_removals.is_empty());
    }

    #[test]
    fn stomp_removes_hazard_and_bounces() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.player.x = 300.0;
        w.player.y = 1000.0;
        w.player.vy = 4.0;
        w.hazards.push(Hazard::new(305.0, 1040.0, 2.0, '🐀'));

        resolve(&mut w, &mut ev);
        assert!(w.hazards.is_empty());
        assert_eq!(w.player.vy, -12.0);
        assert_eq!(w.score, 250);
        assert_eq!(w.lives, 5);
    }

    #[test]
    fn side_contact_hurts() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.player.x = 300.0;
        w.player.y = 1000.0;
        w.player.vy = 0.0;
        w.hazards.push(Hazard::new(320.0, 1010.0, 2.0, '🐀'));

        resolve(&mut w, &mut ev);
        assert_eq!(w.hazards.len(), 1);
        assert_eq!(w.lives, 4);
        assert!(w.player.invulnerable);
        assert!(ev.contains(&GameEvent::PlayerHurt { lives_left: 4 }));
    }

    #[test]
    fn last_life_lost_halts_sweep() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.lives = 1;
        w.player.x = 300.0;
        w.player.y = 1000.0;
        w.player.vy = 0.0;
        w.hazards.push(Hazard::new(320.0, 1010.0, 2.0, '🐀'));
        w.power_ups.push(PowerUp::new(300.0, 1000.0, PowerUpKind::Score));

        let flow = resolve(&mut w, &mut ev);
        assert_eq!(flow, Flow::Halt);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.lives, 0);
        assert!(!w.power_ups[0].collected);
        assert_eq!(w.score, 0);
    }

    #[test]
    fn pickups_award_by_kind() {
        let mut w = bare_world();
        let mut ev = vec![];
        w.player.x = 300.0;
        w.player.y = 1000.0;
        w.power_ups.push(PowerUp::new(300.0, 1000.0, PowerUpKind::Life));
        w.power_ups.push(PowerUp::new(310.0, 1010.0, PowerUpKind::Score));
        w.power_ups.push(PowerUp::new(305.0, 1020.0, PowerUpKind::Power));
        w.collectibles.push(Collectible::new(310.0, 1020.0));

        resolve(&mut w, &mut ev);
        assert_eq!(w.lives, 6);
        assert_eq!(w.score, 500 + 1000 + 300 + 100);
        assert!(w.power_ups.iter().all(|p| p.collected));
        assert!(w.collectibles[0].collected);

        // Collected items are inert
        ev.clear();
        resolve(&mut w, &mut ev);
        assert_eq!(w.score, 1900);
        assert!(ev.is_empty());
    }
}
