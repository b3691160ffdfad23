/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    pub physics: PhysicsConfig,
    pub level: LevelConfig,
    pub input: InputConfig,
    pub gamepad: GamepadConfig,
    pub paths: PathsConfig,
}

/// Per-frame player physics. Units are world units per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub move_speed: f32,
    pub friction: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub stomp_bounce: f32,
    pub max_fall_distance: f32,
    pub invulnerability_frames: u32,
    pub player_width: f32,
    pub player_height: f32,
}

/// World geometry and spawn odds used by the level generator.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub canvas_width: f32,
    pub viewport_height: f32,
    pub platform_spacing: f32,
    pub platform_height: f32,
    pub ground_height: f32,
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub hazard_chance: f64,
    pub hazard_min_index: usize,  // hazards only above this platform
    pub power_up_chance: f64,
    pub collectible_chance: f64,
    pub breakable_delay_ms: u64,
    pub starting_lives: u32,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    pub key_hold_timeout_ms: u64,
    pub swipe_hold_ms: u64,     // how long a horizontal swipe holds the direction
    pub swipe_min_cols: u16,
    pub swipe_min_rows: u16,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PathsConfig {
    pub catalog: PathBuf,
    pub assets_dir: PathBuf,
    pub sprite: String,
    pub jump_clip: String,
    pub victory_clip: String,
    pub game_over_clip: String,
    pub ambient_clip: String,
    pub log_file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    level: TomlLevel,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_friction")]
    friction: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_power")]
    jump_power: f32,
    #[serde(default = "default_stomp_bounce")]
    stomp_bounce: f32,
    #[serde(default = "default_max_fall")]
    max_fall_distance: f32,
    #[serde(default = "default_invulnerability")]
    invulnerability_frames: u32,
}

#[derive(Deserialize, Debug)]
struct TomlLevel {
    #[serde(default = "default_spacing")]
    platform_spacing: f32,
    #[serde(default = "default_hazard_chance")]
    hazard_chance: f64,
    #[serde(default = "default_power_up_chance")]
    power_up_chance: f64,
    #[serde(default = "default_collectible_chance")]
    collectible_chance: f64,
    #[serde(default = "default_breakable_delay")]
    breakable_delay_ms: u64,
    #[serde(default = "default_lives")]
    starting_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_key_hold")]
    key_hold_timeout_ms: u64,
    #[serde(default = "default_swipe_hold")]
    swipe_hold_ms: u64,
    #[serde(default = "default_swipe_cols")]
    swipe_min_cols: u16,
    #[serde(default = "default_swipe_rows")]
    swipe_min_rows: u16,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_catalog")]
    catalog: String,
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_sprite")]
    sprite: String,
    #[serde(default = "default_jump_clip")]
    jump_clip: String,
    #[serde(default = "default_victory_clip")]
    victory_clip: String,
    #[serde(default = "default_game_over_clip")]
    game_over_clip: String,
    #[serde(default = "default_ambient_clip")]
    ambient_clip: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 frames per second

fn default_move_speed() -> f32 { 6.0 }
fn default_friction() -> f32 { 0.85 }
fn default_gravity() -> f32 { 0.8 }
fn default_jump_power() -> f32 { 25.0 }
fn default_stomp_bounce() -> f32 { 12.0 }
fn default_max_fall() -> f32 { 700.0 }
fn default_invulnerability() -> u32 { 180 }

fn default_spacing() -> f32 { 220.0 }
fn default_hazard_chance() -> f64 { 0.25 }
fn default_power_up_chance() -> f64 { 0.12 }
fn default_collectible_chance() -> f64 { 0.35 }
fn default_breakable_delay() -> u64 { 1500 }
fn default_lives() -> u32 { 5 }

fn default_key_hold() -> u64 { 160 }
fn default_swipe_hold() -> u64 { 200 }
fn default_swipe_cols() -> u16 { 3 }
fn default_swipe_rows() -> u16 { 2 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_catalog() -> String { "services.json".into() }
fn default_assets_dir() -> String { "assets".into() }
fn default_sprite() -> String { "mascot.png".into() }
fn default_jump_clip() -> String { "jump.mp3".into() }
fn default_victory_clip() -> String { "applause.mp3".into() }
fn default_game_over_clip() -> String { "gameover.mp3".into() }
fn default_ambient_clip() -> String { "ambient.mp3".into() }
fn default_log_file() -> String { "cloudclimb.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            move_speed: default_move_speed(),
            friction: default_friction(),
            gravity: default_gravity(),
            jump_power: default_jump_power(),
            stomp_bounce: default_stomp_bounce(),
            max_fall_distance: default_max_fall(),
            invulnerability_frames: default_invulnerability(),
        }
    }
}

impl Default for TomlLevel {
    fn default() -> Self {
        TomlLevel {
            platform_spacing: default_spacing(),
            hazard_chance: default_hazard_chance(),
            power_up_chance: default_power_up_chance(),
            collectible_chance: default_collectible_chance(),
            breakable_delay_ms: default_breakable_delay(),
            starting_lives: default_lives(),
        }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput {
            key_hold_timeout_ms: default_key_hold(),
            swipe_hold_ms: default_swipe_hold(),
            swipe_min_cols: default_swipe_cols(),
            swipe_min_rows: default_swipe_rows(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            catalog: default_catalog(),
            assets_dir: default_assets_dir(),
            sprite: default_sprite(),
            jump_clip: default_jump_clip(),
            victory_clip: default_victory_clip(),
            game_over_clip: default_game_over_clip(),
            ambient_clip: default_ambient_clip(),
            log_file: default_log_file(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        physics_from(&TomlPhysics::default())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        level_from(&TomlLevel::default())
    }
}

fn physics_from(t: &TomlPhysics) -> PhysicsConfig {
    PhysicsConfig {
        move_speed: t.move_speed,
        friction: t.friction,
        gravity: t.gravity,
        jump_power: t.jump_power,
        stomp_bounce: t.stomp_bounce,
        max_fall_distance: t.max_fall_distance,
        invulnerability_frames: t.invulnerability_frames,
        player_width: 40.0,
        player_height: 50.0,
    }
}

fn level_from(t: &TomlLevel) -> LevelConfig {
    LevelConfig {
        canvas_width: 700.0,
        viewport_height: 650.0,
        platform_spacing: t.platform_spacing,
        platform_height: 30.0,
        ground_height: 60.0,
        min_platform_width: 200.0,
        max_platform_width: 280.0,
        hazard_chance: t.hazard_chance,
        hazard_min_index: 5,
        power_up_chance: t.power_up_chance,
        collectible_chance: t.collectible_chance,
        breakable_delay_ms: t.breakable_delay_ms,
        starting_lives: t.starting_lives,
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Unknown or missing keys use defaults.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn parse_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[PathBuf::from(".")]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let g = &toml_cfg.general;
        GameConfig {
            tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
            physics: physics_from(&toml_cfg.physics),
            level: level_from(&toml_cfg.level),
            input: InputConfig {
                key_hold_timeout_ms: toml_cfg.input.key_hold_timeout_ms,
                swipe_hold_ms: toml_cfg.input.swipe_hold_ms,
                swipe_min_cols: toml_cfg.input.swipe_min_cols,
                swipe_min_rows: toml_cfg.input.swipe_min_rows,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump.clone(),
                restart: toml_cfg.gamepad.restart.clone(),
                quit: toml_cfg.gamepad.quit.clone(),
            },
            paths: PathsConfig {
                catalog: resolve_file(&g.catalog, search_dirs),
                assets_dir: resolve_dir(&g.assets_dir, search_dirs),
                sprite: g.sprite.clone(),
                jump_clip: g.jump_clip.clone(),
                victory_clip: g.victory_clip.clone(),
                game_over_clip: g.game_over_clip.clone(),
                ambient_clip: g.ambient_clip.clone(),
                log_file: PathBuf::from(&g.log_file),
            },
        }
    }
}

/// Absolute paths are kept; relative ones resolve to the first candidate
/// directory that contains them, else stay relative to CWD.
fn resolve_file(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    resolve_with(name, search_dirs, Path::is_file)
}

fn resolve_dir(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    resolve_with(name, search_dirs, Path::is_dir)
}

fn resolve_with(name: &str, search_dirs: &[PathBuf], exists: fn(&Path) -> bool) -> PathBuf {
    let p = PathBuf::from(name);
    if p.is_absolute() {
        return p;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|c| exists(c))
        .unwrap_or(p)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // XDG data home (~/.local/share/cloudclimb)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cloudclimb");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/cloudclimb");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        tracing::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
