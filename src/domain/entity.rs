/// Entities: Player, Platform, Hazard, PowerUp, Collectible.
///
/// Plain data records. Per-frame behavior that touches only the entity
/// itself lives here; anything that reads or writes shared game state
/// (score, lives, phase) lives in `sim`.

use super::geometry::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Input sampled once per frame. All fields are "held" states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl FrameInput {
    pub fn any(&self) -> bool {
        self.left || self.right || self.jump
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    pub grounded: bool,
    pub invulnerable: bool,
    pub invulnerable_frames: u32,
    /// Top of the last surface stood on; fall damage is measured from here.
    pub last_ground_y: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Player {
            x, y,
            vx: 0.0,
            vy: 0.0,
            width,
            height,
            facing: Facing::Right,
            grounded: false,
            invulnerable: false,
            invulnerable_frames: 0,
            last_ground_y: y,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Sprite blink while invulnerable: dimmed on odd 10-frame windows.
    pub fn is_flashing(&self) -> bool {
        self.invulnerable && (self.invulnerable_frames / 10) % 2 == 1
    }
}

// ── Platform ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlatformKind {
    Normal,
    Breakable,  // collapses shortly after the first landing
    Moving,     // drawn differently; does not actually move
    Final,
}

impl PlatformKind {
    /// Kind is a pure function of the platform index.
    ///
    /// Breakable every 25, Moving every 35, both below `top`. The checks are
    /// applied in that order, so an index matching both (175) ends up Moving.
    pub fn for_index(index: usize, top: usize) -> PlatformKind {
        if index == top {
            return PlatformKind::Final;
        }
        let mut kind = PlatformKind::Normal;
        if index % 25 == 0 && index < top {
            kind = PlatformKind::Breakable;
        }
        if index % 35 == 0 && index < top {
            kind = PlatformKind::Moving;
        }
        kind
    }
}

#[derive(Clone, Debug)]
pub struct Platform {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PlatformKind,
    pub visited: bool,
    pub label: String,
    pub category: String,
}

impl Platform {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Hazard ──

pub const HAZARD_GLYPHS: [char; 8] = ['🐓', '🐖', '🦨', '🐀', '🐃', '🦆', '🦑', '💩'];

#[derive(Clone, Debug)]
pub struct Hazard {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub patrol_radius: f32,
    pub origin_x: f32,
    pub width: f32,
    pub height: f32,
    pub glyph: char,
}

impl Hazard {
    pub const SPEED: f32 = 2.0;
    pub const PATROL_RADIUS: f32 = 120.0;
    pub const SIZE: f32 = 30.0;

    pub fn new(x: f32, y: f32, vx: f32, glyph: char) -> Self {
        Hazard {
            x, y, vx,
            patrol_radius: Self::PATROL_RADIUS,
            origin_x: x,
            width: Self::SIZE,
            height: Self::SIZE,
            glyph,
        }
    }

    /// Patrol: move, then turn around once past the patrol radius.
    pub fn update(&mut self) {
        self.x += self.vx;
        if (self.x - self.origin_x).abs() > self.patrol_radius {
            self.vx = -self.vx;
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── PowerUp ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerUpKind {
    Life,
    Score,
    Power,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Life, PowerUpKind::Score, PowerUpKind::Power];

    pub fn glyph(self) -> char {
        match self {
            PowerUpKind::Life => '💖',
            PowerUpKind::Score => '⭐',
            PowerUpKind::Power => '🍄',
        }
    }
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub collected: bool,
    pub bob_phase: f32,
}

impl PowerUp {
    pub const SIZE: f32 = 25.0;
    const BOB_STEP: f32 = 0.1;
    const BOB_AMPLITUDE: f32 = 5.0;

    pub fn new(x: f32, y: f32, kind: PowerUpKind) -> Self {
        PowerUp { x, y, kind, collected: false, bob_phase: 0.0 }
    }

    pub fn update(&mut self) {
        self.bob_phase += Self::BOB_STEP;
    }

    /// Vertical draw offset. Cosmetic only; collision uses the rest position.
    pub fn bob_offset(&self) -> f32 {
        self.bob_phase.sin() * Self::BOB_AMPLITUDE
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, Self::SIZE, Self::SIZE)
    }
}

// ── Collectible ──

#[derive(Clone, Debug)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub collected: bool,
    pub rotation_phase: f32,
}

impl Collectible {
    pub const SIZE: f32 = 20.0;
    const SPIN_STEP: f32 = 0.2;

    pub fn new(x: f32, y: f32) -> Self {
        Collectible { x, y, collected: false, rotation_phase: 0.0 }
    }

    pub fn update(&mut self) {
        self.rotation_phase += Self::SPIN_STEP;
    }

    /// Two-frame spin: coin and money bag alternate every half phase unit.
    pub fn glyph(&self) -> char {
        if ((self.rotation_phase * 2.0).floor() as i64) % 2 == 0 { '🪙' } else { '💰' }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, Self::SIZE, Self::SIZE)
    }
}
