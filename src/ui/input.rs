/// Input state tracker.
///
/// Two sources feed one per-frame `FrameInput`:
///   - Keyboard: held keys, with timeout-based release on terminals that
///     never report Release events.
///   - Pointer drag (mouse capture), the terminal stand-in for touch:
///     a drag that ends mostly upward requests a jump; a mostly horizontal
///     drag holds that direction for a short, fixed time.
///
/// Uses crossterm's keyboard enhancement for Release events when available.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::config::InputConfig;
use crate::domain::entity::FrameInput;

// ── Key bindings ──

pub const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const JUMP_KEYS: [KeyCode; 4] = [KeyCode::Up, KeyCode::Char(' '), KeyCode::Char('w'), KeyCode::Char('W')];
pub const RESTART_KEYS: [KeyCode; 3] = [KeyCode::Enter, KeyCode::Char('r'), KeyCode::Char('R')];
pub const QUIT_KEYS: [KeyCode; 3] = [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

// ── Swipes ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Swipe {
    Left,
    Right,
    Up,
}

/// Classify a finished drag by its delta in terminal cells.
///
/// A row is roughly two columns tall, so rows count double when deciding
/// whether the drag was mostly vertical. Downward drags do nothing.
pub fn classify_swipe(dx: i32, dy: i32, min_cols: u16, min_rows: u16) -> Option<Swipe> {
    if dy.abs() * 2 > dx.abs() {
        if dy <= -(min_rows as i32) { Some(Swipe::Up) } else { None }
    } else if dx.abs() >= min_cols as i32 {
        if dx > 0 { Some(Swipe::Right) } else { Some(Swipe::Left) }
    } else {
        None
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call. Used for edge-triggered actions (restart).
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,

    /// Set when the terminal was resized since the last drain.
    pub resized: bool,

    hold_timeout: Duration,

    // ── Pointer drag ──
    drag_start: Option<(u16, u16)>,
    swipe_left_until: Option<Instant>,
    swipe_right_until: Option<Instant>,
    swipe_jump: bool,
    swipe_hold: Duration,
    swipe_min_cols: u16,
    swipe_min_rows: u16,
}

impl InputState {
    pub fn new(cfg: &InputConfig) -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            resized: false,
            hold_timeout: Duration::from_millis(cfg.key_hold_timeout_ms),
            drag_start: None,
            swipe_left_until: None,
            swipe_right_until: None,
            swipe_jump: false,
            swipe_hold: Duration::from_millis(cfg.swipe_hold_ms),
            swipe_min_cols: cfg.swipe_min_cols,
            swipe_min_rows: cfg.swipe_min_rows,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.resized = false;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.drag_start = Some((m.column, m.row));
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        if let Some((sx, sy)) = self.drag_start.take() {
                            let dx = m.column as i32 - sx as i32;
                            let dy = m.row as i32 - sy as i32;
                            if let Some(s) = classify_swipe(dx, dy, self.swipe_min_cols, self.swipe_min_rows) {
                                self.register_swipe(s, Instant::now());
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Resize(..)) => self.resized = true,
                _ => {}
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        let timeout = self.hold_timeout;
        self.last_active.retain(|_, t| now.duration_since(*t) < timeout);
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Enhancement not confirmed; rely on timeout-based expiry
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// A recognized swipe: jump is a one-frame pulse, sideways holds the
    /// direction until `now + swipe_hold`.
    pub fn register_swipe(&mut self, swipe: Swipe, now: Instant) {
        match swipe {
            Swipe::Up => self.swipe_jump = true,
            Swipe::Left => self.swipe_left_until = Some(now + self.swipe_hold),
            Swipe::Right => self.swipe_right_until = Some(now + self.swipe_hold),
        }
    }

    /// Held state for this frame. Consumes a pending swipe jump.
    pub fn frame_input(&mut self, now: Instant) -> FrameInput {
        let held_until = |until: Option<Instant>| until.map_or(false, |t| now < t);
        let input = FrameInput {
            left: self.any_held(&LEFT_KEYS) || held_until(self.swipe_left_until),
            right: self.any_held(&RIGHT_KEYS) || held_until(self.swipe_right_until),
            jump: self.any_held(&JUMP_KEYS) || self.swipe_jump,
        };
        self.swipe_jump = false;
        input
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < self.hold_timeout)
            .unwrap_or(false)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> InputState {
        InputState::new(&InputConfig {
            key_hold_timeout_ms: 160,
            swipe_hold_ms: 200,
            swipe_min_cols: 3,
            swipe_min_rows: 2,
        })
    }

    #[test]
    fn short_drags_are_ignored() {
        assert_eq!(classify_swipe(0, 0, 3, 2), None);
        assert_eq!(classify_swipe(2, 0, 3, 2), None);
        assert_eq!(classify_swipe(0, -1, 3, 2), None);
    }

    #[test]
    fn horizontal_drags() {
        assert_eq!(classify_swipe(5, 1, 3, 2), Some(Swipe::Right));
        assert_eq!(classify_swipe(-3, 0, 3, 2), Some(Swipe::Left));
    }

    #[test]
    fn vertical_drags() {
        assert_eq!(classify_swipe(1, -2, 3, 2), Some(Swipe::Up));
        // Rows count double: 3 rows beat 5 columns
        assert_eq!(classify_swipe(5, -3, 3, 2), Some(Swipe::Up));
        // Downward swipes do nothing
        assert_eq!(classify_swipe(0, 6, 3, 2), None);
    }

    #[test]
    fn sideways_swipe_holds_for_window() {
        let mut s = state();
        let t0 = Instant::now();
        s.register_swipe(Swipe::Right, t0);

        assert!(s.frame_input(t0).right);
        assert!(s.frame_input(t0 + Duration::from_millis(199)).right);
        assert!(!s.frame_input(t0 + Duration::from_millis(200)).right);
        assert!(!s.frame_input(t0).left);
    }

    #[test]
    fn swipe_jump_is_one_frame() {
        let mut s = state();
        let t0 = Instant::now();
        s.register_swipe(Swipe::Up, t0);
        assert!(s.frame_input(t0).jump);
        assert!(!s.frame_input(t0).jump);
    }

    #[test]
    fn idle_state_is_empty() {
        let mut s = state();
        assert_eq!(s.frame_input(Instant::now()), FrameInput::default());
        assert!(!s.any_pressed(&RESTART_KEYS));
        assert!(!s.ctrl_c_pressed());
    }
}
