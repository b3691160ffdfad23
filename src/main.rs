/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, terminal,
};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::catalog;
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::assets;
use ui::gamepad::GamepadState;
use ui::input::{InputState, QUIT_KEYS, RESTART_KEYS};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};
use ui::sprite::Sprite;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.paths.log_file);
    tracing::info!("cloudclimb {} starting", env!("CARGO_PKG_VERSION"));

    let catalog = match catalog::load(&config.paths.catalog) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    let assets = assets::load(&config.paths);
    let mut rng = rand::thread_rng();
    let mut world = WorldState::new(catalog, config.physics.clone(), config.level.clone(), &mut rng);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    // Release events only when the terminal confirms it can report them
    let honor_release = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();

    let mut sound = SoundEngine::new(&assets.clips);

    let result = game_loop(
        &mut world,
        &mut renderer,
        &mut sound,
        &assets.sprite,
        &config,
        honor_release,
        &mut rng,
    );

    if honor_release {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        tracing::error!("game loop: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Cloud Climb!");
    println!("Final score: {}  Reached: {}", world.score, world.reached_name());
}

/// Log to a file: the terminal belongs to the renderer.
fn init_logging(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Could not open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cloudclimb=info"));
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

fn game_loop<R: Rng + ?Sized>(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    sprite: &Sprite,
    config: &GameConfig,
    honor_release: bool,
    rng: &mut R,
) -> io::Result<()> {
    let mut kb = InputState::new(&config.input);
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        tracing::info!("gamepad detected");
    }

    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(&QUIT_KEYS) || gp.quit_pressed() {
            break;
        }

        if !world.is_running() && (kb.any_pressed(&RESTART_KEYS) || gp.restart_pressed()) {
            let events = step::restart(world, rng);
            dispatch(world, sound, &events);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            let input = combine_input(kb.frame_input(last_tick), &gp);
            let events = step::step(world, input, config.tick_rate_ms);
            dispatch(world, sound, &events);
            renderer.render(world, sprite)?;
        } else if kb.resized {
            renderer.render(world, sprite)?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn combine_input(kb: FrameInput, gp: &GamepadState) -> FrameInput {
    FrameInput {
        left: kb.left || gp.left_held(),
        right: kb.right || gp.right_held(),
        jump: kb.jump || gp.jump_held(),
    }
}

fn dispatch(world: &WorldState, sound: &mut Option<SoundEngine>, events: &[GameEvent]) {
    if events.is_empty() {
        return;
    }
    for event in events {
        match event {
            GameEvent::Victory => tracing::info!(score = world.score, "summit reached"),
            GameEvent::GameOver => tracing::info!(
                score = world.score,
                platform = world.current_platform,
                "game over"
            ),
            GameEvent::PlatformReached { index } => tracing::debug!(index, "platform reached"),
            GameEvent::PlayerHurt { lives_left } => tracing::debug!(lives_left, "player hurt"),
            other => tracing::trace!(?other, "event"),
        }
    }
    if let Some(engine) = sound.as_mut() {
        sound::play_events(engine, events);
    }
}
