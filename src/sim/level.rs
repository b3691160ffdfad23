/// Level generator: builds the tower from the catalog.
///
/// ## Layout
///   - Platform 0 is the ground, spanning the full canvas width.
///   - Platform i (1..=234) sits `i * spacing` above the world bottom, at a
///     random x and with a random width. y strictly decreases with i.
///   - Kind is a pure function of the index (see `PlatformKind::for_index`).
///
/// ## Spawns (per platform, in RNG draw order)
///   1. x, width
///   2. hazard roll (only above `hazard_min_index`), glyph, patrol direction
///   3. power-up roll, kind
///   4. collectible roll, x offset
///
/// The RNG is injected so tests can pin the outcome.

use rand::Rng;

use crate::config::{LevelConfig, PhysicsConfig};
use crate::domain::entity::{
    Collectible, Hazard, Platform, PlatformKind, Player, PowerUp, PowerUpKind, HAZARD_GLYPHS,
};
use crate::sim::catalog::{Catalog, TOWER_HEIGHT};

/// Freshly generated entity collections plus the player at its spawn point.
#[derive(Clone, Debug)]
pub struct Level {
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub power_ups: Vec<PowerUp>,
    pub collectibles: Vec<Collectible>,
    pub player: Player,
}

pub fn world_height(lvl: &LevelConfig) -> f32 {
    TOWER_HEIGHT as f32 * lvl.platform_spacing
}

pub fn generate<R: Rng + ?Sized>(
    catalog: &Catalog,
    lvl: &LevelConfig,
    phys: &PhysicsConfig,
    rng: &mut R,
) -> Level {
    let wh = world_height(lvl);

    let mut platforms = Vec::with_capacity(TOWER_HEIGHT + 1);
    let mut hazards = Vec::new();
    let mut power_ups = Vec::new();
    let mut collectibles = Vec::new();

    platforms.push(Platform {
        index: 0,
        x: 0.0,
        y: wh - lvl.ground_height,
        width: lvl.canvas_width,
        height: lvl.ground_height,
        kind: PlatformKind::Normal,
        visited: false,
        label: "Base Camp".into(),
        category: "Start".into(),
    });

    let x_span = (lvl.canvas_width - lvl.max_platform_width).max(0.0);
    let w_span = (lvl.max_platform_width - lvl.min_platform_width).max(0.0);

    for i in 1..=TOWER_HEIGHT {
        let x = rng.gen::<f32>() * x_span;
        let y = wh - i as f32 * lvl.platform_spacing;
        let width = lvl.min_platform_width + rng.gen::<f32>() * w_span;

        let (label, category) = match catalog.for_platform(i) {
            Some(item) => (item.name.clone(), item.category.clone()),
            None => (format!("Service {i}"), "AWS".to_string()),
        };

        platforms.push(Platform {
            index: i,
            x,
            y,
            width,
            height: lvl.platform_height,
            kind: PlatformKind::for_index(i, TOWER_HEIGHT),
            visited: false,
            label,
            category,
        });

        // Low platforms never roll for hazards (no draw is consumed).
        if i > lvl.hazard_min_index && roll(rng, lvl.hazard_chance) {
            let glyph = HAZARD_GLYPHS[rng.gen_range(0..HAZARD_GLYPHS.len())];
            let vx = if rng.gen_bool(0.5) { Hazard::SPEED } else { -Hazard::SPEED };
            hazards.push(Hazard::new(x + 30.0, y - 35.0, vx, glyph));
        }

        if roll(rng, lvl.power_up_chance) {
            let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
            power_ups.push(PowerUp::new(x + width / 2.0, y - 35.0, kind));
        }

        if roll(rng, lvl.collectible_chance) {
            let offset = rng.gen::<f32>() * (width - 40.0).max(0.0);
            collectibles.push(Collectible::new(x + offset + 20.0, y - 30.0));
        }
    }

    tracing::debug!(
        "level generated: {} platforms, {} hazards, {} power-ups, {} collectibles",
        platforms.len(), hazards.len(), power_ups.len(), collectibles.len()
    );

    Level {
        platforms,
        hazards,
        power_ups,
        collectibles,
        player: spawn_player(lvl, phys),
    }
}

/// Player at the start position, standing just above the ground.
pub fn spawn_player(lvl: &LevelConfig, phys: &PhysicsConfig) -> Player {
    let wh = world_height(lvl);
    let mut player = Player::new(150.0, wh - 180.0, phys.player_width, phys.player_height);
    player.last_ground_y = wh - lvl.ground_height;
    player
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}
