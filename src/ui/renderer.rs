/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The tower viewport (one canvas wide, one viewport tall) is scaled to
/// whatever the terminal offers between the HUD row and the help row.
/// The player sprite uses half-block glyphs, two pixels per cell.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, PlatformKind};
use crate::domain::palette::{self, Rgb};
use crate::sim::world::{truncate_label, Phase, WorldState};
use super::sprite::Sprite;

fn color(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

fn dim(c: Rgb) -> Rgb {
    Rgb(c.0 / 2, c.1 / 2, c.2 / 2)
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every cell outside the playfield. Using the
    /// same RGB for `Clear` and cells keeps inter-row gaps from showing.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn blank(bg: Color) -> Self {
        Cell { bg, ..Self::BLANK }
    }

    fn from_char(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg, wide: false, cont: false }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Overwriting half of a wide glyph blanks the other half.
    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = y * self.width + x;
        let old = self.cells[i];
        if old.wide && x + 1 < self.width {
            let bg = self.cells[i + 1].bg;
            self.cells[i + 1] = Cell::blank(bg);
        }
        if old.cont && x > 0 {
            let bg = self.cells[i - 1].bg;
            self.cells[i - 1] = Cell::blank(bg);
        }
        self.cells[i] = cell;
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::blank(bg));
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Cell::from_char(ch, fg, bg));
        }
    }

    /// Like `put_str` but keeps whatever background is already there.
    fn put_text(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            let bg = self.get(cx, y).bg;
            self.set(cx, y, Cell::from_char(ch, fg, bg));
        }
    }

    /// Two-column glyph (emoji). Dropped if it would hang off the right edge.
    fn put_wide(&mut self, x: i32, y: i32, ch: char) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x + 1 >= self.width || y >= self.height {
            return;
        }
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell { ch, fg: Color::White, bg, wide: true, cont: false });
        self.set(x + 1, y, Cell { ch: ' ', fg: Color::White, bg, wide: false, cont: true });
    }
}

// ── Viewport: world units → terminal cells ──

#[derive(Clone, Copy, Debug)]
struct Viewport {
    cols: usize,
    top: usize,
    rows: usize,
    sx: f32,
    sy: f32,
    cam_y: f32,
}

impl Viewport {
    fn new(cols: usize, top: usize, rows: usize, canvas_w: f32, view_h: f32, cam_y: f32) -> Self {
        Viewport {
            cols,
            top,
            rows,
            sx: cols as f32 / canvas_w,
            sy: rows as f32 / view_h,
            cam_y,
        }
    }

    fn col(&self, wx: f32) -> i32 {
        (wx * self.sx).floor() as i32
    }

    fn row(&self, wy: f32) -> i32 {
        self.top as i32 + ((wy - self.cam_y) * self.sy).floor() as i32
    }

    fn span_x(&self, w: f32) -> usize {
        ((w * self.sx).round() as usize).max(1)
    }

    fn span_y(&self, h: f32) -> usize {
        ((h * self.sy).round() as usize).max(1)
    }

    fn contains(&self, c: i32, r: i32) -> bool {
        c >= 0 && (c as usize) < self.cols && r >= self.top as i32 && (r as usize) < self.top + self.rows
    }
}

/// Word-wrap `text` into at most `max_lines` lines of `width` chars.
/// Overlong words are cut; text that does not fit ends with "...".
fn wrap_label(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    if width == 0 || max_lines == 0 {
        return lines;
    }
    let mut cur = String::new();
    let mut overflow = false;
    for word in text.split_whitespace() {
        let word: String = word.chars().take(width).collect();
        let cur_len = cur.chars().count();
        if cur_len > 0 && cur_len + 1 + word.chars().count() > width {
            if lines.len() + 1 == max_lines {
                overflow = true;
                break;
            }
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    if overflow {
        if let Some(last) = lines.last_mut() {
            let mut s: String = last.chars().take(width.saturating_sub(3)).collect();
            s.push_str("...");
            *last = s.chars().take(width).collect();
        }
    }
    lines
}

/// Shorten to `width` chars, ending in "..." when anything was cut.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width > 3 {
        let head: String = text.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        text.chars().take(width).collect()
    }
}

/// HUD row. The progress bar is pinned to the right edge; the stats and
/// the current label get whatever is left of it.
fn draw_hud(fb: &mut FrameBuffer, w: &WorldState) {
    fb.fill_row(HUD_ROW, Cell::BASE_BG);

    let total = w.total_platforms();
    let count = format!(" {}/{} ", w.current_platform, total);
    let bar_x = fb.width.saturating_sub(PROGRESS_BAR_W + count.len());
    fb.put_str(bar_x, HUD_ROW, &count, Color::White, Cell::BASE_BG);

    let filled = (w.current_platform * PROGRESS_BAR_W + total / 2) / total.max(1);
    let fill = color(palette::progress_color(w.current_platform, total));
    for i in 0..PROGRESS_BAR_W {
        let (ch, fg) = if i < filled { ('█', fill) } else { ('░', Color::DarkGrey) };
        fb.set(bar_x + count.len() + i, HUD_ROW, Cell::from_char(ch, fg, Cell::BASE_BG));
    }

    let room = bar_x.saturating_sub(1);
    let stats = format!(" Score: {}  Lives: {}  Height: {}m  │ ", w.score, w.lives, w.height_m());
    let label_room = room.saturating_sub(stats.chars().count());
    let text = fit(&format!("{stats}{}", fit(&w.display_label(), label_room)), room);
    fb.put_str(0, HUD_ROW, &text, Color::White, Cell::BASE_BG);
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const PLAY_TOP: usize = 1;
/// HUD row on top, help row at the bottom.
const RESERVED_ROWS: usize = 2;

const MIN_COLS: usize = 30;
const MIN_ROWS: usize = 10;

/// Platforms within this many world units of the viewport are drawn.
const PLATFORM_CULL: f32 = 150.0;
const ITEM_CULL: f32 = 100.0;

const PROGRESS_BAR_W: usize = 20;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState, sprite: &Sprite) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        if self.term_w < MIN_COLS || self.term_h < MIN_ROWS {
            self.front.put_str(0, 0, "Terminal too small", Color::White, Cell::BASE_BG);
        } else {
            self.compose_game(world, sprite);
            match world.phase {
                Phase::Running => {}
                Phase::GameOver | Phase::Victory => self.compose_end_overlay(world),
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ═══════════════════════════════════════════════
    //  Playfield
    // ═══════════════════════════════════════════════

    fn compose_game(&mut self, w: &WorldState, sprite: &Sprite) {
        let vp = Viewport::new(
            self.term_w,
            PLAY_TOP,
            self.term_h - RESERVED_ROWS,
            w.level.canvas_width,
            w.camera.view_h,
            w.camera.y,
        );
        self.compose_sky(&vp);
        self.compose_platforms(w, &vp);
        self.compose_items(w, &vp);
        self.compose_player(w, &vp, sprite);
        self.compose_hud(w);
        self.compose_help();
    }

    fn compose_sky(&mut self, vp: &Viewport) {
        let span = vp.rows.saturating_sub(1).max(1) as f32;
        for r in 0..vp.rows {
            let bg = palette::sky_at(r as f32 / span);
            self.front.fill_row(vp.top + r, color(bg));
        }
    }

    fn compose_platforms(&mut self, w: &WorldState, vp: &Viewport) {
        for p in w.platforms.iter().filter(|p| w.camera.is_visible(p.y, PLATFORM_CULL)) {
            let colors = palette::platform_colors(p);
            let c0 = vp.col(p.x);
            let r0 = vp.row(p.y);
            let pw = vp.span_x(p.width);
            let ph = vp.span_y(p.height);

            for dy in 0..ph {
                for dx in 0..pw {
                    let (c, r) = (c0 + dx as i32, r0 + dy as i32);
                    if !vp.contains(c, r) {
                        continue;
                    }
                    let edge = dx == 0 || dx + 1 == pw;
                    let bg = if edge { colors.border } else { colors.fill };
                    let ch = if dy == 0 && !edge { '▔' } else { ' ' };
                    self.front.set(c as usize, r as usize,
                        Cell::from_char(ch, color(palette::HIGHLIGHT), color(bg)));
                }
            }

            // Index sits in the bottom-right corner; the label gets the rest.
            let tag = if p.index == 0 { String::new() } else { p.index.to_string() };
            let inner = pw.saturating_sub(2);
            let label_w = if tag.is_empty() { inner } else { inner.saturating_sub(tag.len() + 1) };
            for (i, line) in wrap_label(&p.label, label_w, ph.min(3)).iter().enumerate() {
                let r = r0 + i as i32;
                let len = line.chars().count();
                let c = c0 + 1 + ((label_w - len) / 2) as i32;
                if vp.contains(c, r) {
                    self.front.put_str(c as usize, r as usize, line,
                        color(palette::LABEL), color(colors.fill));
                }
            }
            if !tag.is_empty() && tag.len() < inner {
                let c = c0 + (pw - 1 - tag.len()) as i32;
                let r = r0 + ph as i32 - 1;
                if vp.contains(c, r) {
                    self.front.put_str(c as usize, r as usize, &tag,
                        color(palette::HIGHLIGHT), color(colors.border));
                }
            }

            if p.kind == PlatformKind::Final {
                let tag = "FINAL!";
                let c = c0 + (pw.saturating_sub(tag.len()) / 2) as i32;
                if vp.contains(c, r0 - 1) {
                    self.front.put_text(c as usize, (r0 - 1) as usize, tag, color(palette::GOLD));
                }
            }
        }
    }

    fn compose_items(&mut self, w: &WorldState, vp: &Viewport) {
        let visible = |y: f32| w.camera.is_visible(y, ITEM_CULL);

        for h in w.hazards.iter().filter(|h| visible(h.y)) {
            self.put_glyph(vp, h.x, h.y, h.glyph);
        }
        for p in w.power_ups.iter().filter(|p| !p.collected && visible(p.y)) {
            self.put_glyph(vp, p.x, p.y + p.bob_offset(), p.kind.glyph());
        }
        for c in w.collectibles.iter().filter(|c| !c.collected && visible(c.y)) {
            self.put_glyph(vp, c.x, c.y, c.glyph());
        }
    }

    fn put_glyph(&mut self, vp: &Viewport, x: f32, y: f32, glyph: char) {
        let (c, r) = (vp.col(x), vp.row(y));
        if vp.contains(c, r) && vp.contains(c + 1, r) {
            self.front.put_wide(c, r, glyph);
        }
    }

    /// Half-block sprite: upper pixel as foreground, lower as background.
    fn compose_player(&mut self, w: &WorldState, vp: &Viewport, sprite: &Sprite) {
        let p = &w.player;
        let c0 = vp.col(p.x);
        let r0 = vp.row(p.y);
        let pw = vp.span_x(p.width);
        let ph = vp.span_y(p.height);
        let mirrored = p.facing == Facing::Left;
        let flashing = p.is_flashing();
        let shade = |c: Rgb| color(if flashing { dim(c) } else { c });

        for dy in 0..ph {
            for dx in 0..pw {
                let (c, r) = (c0 + dx as i32, r0 + dy as i32);
                if !vp.contains(c, r) {
                    continue;
                }
                let u = (dx as f32 + 0.5) / pw as f32;
                let top = sprite.sample(u, (dy as f32 + 0.25) / ph as f32, mirrored);
                let bottom = sprite.sample(u, (dy as f32 + 0.75) / ph as f32, mirrored);
                if top.is_none() && bottom.is_none() {
                    continue;
                }
                let under = self.front.get(c as usize, r as usize).bg;
                let fg = top.map_or(under, shade);
                let bg = bottom.map_or(under, shade);
                self.front.set(c as usize, r as usize, Cell::from_char('▀', fg, bg));
            }
        }
    }

    // ═══════════════════════════════════════════════
    //  HUD
    // ═══════════════════════════════════════════════

    fn compose_hud(&mut self, w: &WorldState) {
        draw_hud(&mut self.front, w);
    }

    fn compose_help(&mut self) {
        let row = self.term_h - 1;
        self.front.fill_row(row, Cell::BASE_BG);
        self.front.put_str(1, row, "←/→ A/D move   ↑/Space jump   drag to swipe   Q quit",
            Color::DarkGrey, Cell::BASE_BG);
    }

    fn compose_end_overlay(&mut self, w: &WorldState) {
        let (title, accent) = match w.phase {
            Phase::Victory => ("★ SUMMIT REACHED! ★", color(palette::GOLD)),
            _ => ("✕ GAME OVER ✕", Color::Rgb { r: 255, g: 60, b: 60 }),
        };
        let box_w = 44.min(self.term_w);
        let inner = box_w.saturating_sub(4);
        let lines = [
            (title.to_string(), accent),
            (String::new(), Color::White),
            (format!("Final score: {}", w.score), Color::White),
            (format!("Height: {} m", w.height_m()), Color::White),
            (format!("Reached: {}", truncate_label(w.reached_name(), inner.saturating_sub(12))), Color::White),
            (String::new(), Color::White),
            ("Enter / R: climb again   Q: quit".to_string(), Color::Rgb { r: 80, g: 255, b: 80 }),
        ];
        let box_h = (lines.len() + 2).min(self.term_h);
        let x0 = (self.term_w - box_w) / 2;
        let y0 = (self.term_h - box_h) / 2;
        let panel = Color::Rgb { r: 10, g: 10, b: 20 };

        for y in y0..y0 + box_h {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell::blank(panel));
            }
        }
        for (i, (text, fg)) in lines.iter().enumerate() {
            let len = text.chars().count().min(inner);
            let x = x0 + 2 + (inner - len) / 2;
            self.front.put_str(x, y0 + 1 + i, text, *fg, panel);
        }
    }
}
