/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The game loop owns the one `WorldState`. It is mutated only by
/// `step::step`, `step::take_damage`, `step::restart` and the collision
/// pass; the renderer reads it.
///
/// ## Camera / Viewport
///
/// World and screen coordinates are separate:
///   - `camera.y` — world y of the top edge of the viewport
///   - the viewport is `canvas_width` x `viewport_height` world units
///   - Renderer maps: `screen_y = (world_y - camera.y) * rows / view_h`
///
/// ## Scheduled removals
///
/// Breakable platforms collapse a fixed time after the first landing.
/// Each pending collapse is a `PendingRemoval` record checked against the
/// game clock (`clock_ms`) at the start of every step.

use rand::Rng;

use crate::config::{LevelConfig, PhysicsConfig};
use crate::domain::entity::{Collectible, Hazard, Platform, Player, PowerUp};
use crate::sim::catalog::{Catalog, TOWER_HEIGHT};
use crate::sim::level::{self, Level};

/// Label shown before the first platform is reached.
pub const START_LABEL: &str = "Start of the climb";

const LABEL_MAX_CHARS: usize = 25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    GameOver,
    Victory,
}

/// Vertical-only camera: the tower is exactly one canvas wide.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World y of the top edge of the viewport.
    pub y: f32,
    /// Viewport height in world units.
    pub view_h: f32,
}

impl Camera {
    pub fn new(view_h: f32) -> Self {
        Camera { y: 0.0, view_h }
    }

    /// Center on `target_y`, clamped so the view never leaves the world.
    pub fn follow(&mut self, target_y: f32, world_h: f32) {
        let max_y = (world_h - self.view_h).max(0.0);
        self.y = (target_y - self.view_h / 2.0).clamp(0.0, max_y);
    }

    /// Is world row `y` within the viewport, widened by `margin` on both sides?
    pub fn is_visible(&self, y: f32, margin: f32) -> bool {
        y > self.y - margin && y < self.y + self.view_h + margin
    }
}

/// A breakable platform waiting to collapse.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingRemoval {
    pub platform_index: usize,
    pub due_ms: u64,
}

pub struct WorldState {
    pub catalog: Catalog,
    pub physics: PhysicsConfig,
    pub level: LevelConfig,

    // ── Entities ──
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub power_ups: Vec<PowerUp>,
    pub collectibles: Vec<Collectible>,

    // ── Game tracking ──
    pub score: u32,
    pub lives: u32,
    pub current_platform: usize,
    pub current_label: String,
    pub phase: Phase,
    pub music_started: bool,

    // ── Timing ──
    /// Game clock in milliseconds, advanced by each step's frame time.
    pub clock_ms: u64,
    pub frame: u64,
    pub pending_removals: Vec<PendingRemoval>,

    // ── Camera / Viewport ──
    pub camera: Camera,
    pub world_height: f32,
}

impl WorldState {
    pub fn new<R: Rng + ?Sized>(
        catalog: Catalog,
        physics: PhysicsConfig,
        level_cfg: LevelConfig,
        rng: &mut R,
    ) -> Self {
        let mut world = WorldState {
            catalog,
            player: level::spawn_player(&level_cfg, &physics),
            platforms: vec![],
            hazards: vec![],
            power_ups: vec![],
            collectibles: vec![],
            score: 0,
            lives: level_cfg.starting_lives,
            current_platform: 0,
            current_label: START_LABEL.to_string(),
            phase: Phase::Running,
            music_started: false,
            clock_ms: 0,
            frame: 0,
            pending_removals: vec![],
            camera: Camera::new(level_cfg.viewport_height),
            world_height: level::world_height(&level_cfg),
            physics,
            level: level_cfg,
        };
        world.reset(rng);
        world
    }

    /// Full reinitialization: fresh level, counters back to their start values.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Level { platforms, hazards, power_ups, collectibles, player } =
            level::generate(&self.catalog, &self.level, &self.physics, rng);
        self.platforms = platforms;
        self.hazards = hazards;
        self.power_ups = power_ups;
        self.collectibles = collectibles;
        self.player = player;

        self.score = 0;
        self.lives = self.level.starting_lives;
        self.current_platform = 0;
        self.current_label = START_LABEL.to_string();
        self.phase = Phase::Running;
        self.music_started = false;
        self.clock_ms = 0;
        self.frame = 0;
        self.pending_removals.clear();

        self.world_height = level::world_height(&self.level);
        self.camera = Camera::new(self.level.viewport_height);
        self.camera.follow(self.player.center_y(), self.world_height);
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Climbed height in meters (15 world units per meter).
    pub fn height_m(&self) -> i64 {
        ((self.world_height - self.player.y) / 15.0).floor() as i64
    }

    /// Current platform label, shortened for the HUD.
    pub fn display_label(&self) -> String {
        truncate_label(&self.current_label, LABEL_MAX_CHARS)
    }

    /// Name of the catalog entry for the current platform, for the end screens.
    pub fn reached_name(&self) -> &str {
        if self.current_platform == 0 {
            return START_LABEL;
        }
        self.catalog
            .for_platform(self.current_platform)
            .map(|item| item.name.as_str())
            .unwrap_or(START_LABEL)
    }

    pub fn total_platforms(&self) -> usize {
        TOWER_HEIGHT
    }
}

/// Cut to `max` characters and append "..." when anything was dropped.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}
