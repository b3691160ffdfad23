/// Colors: category → platform colors, special platform kinds, the
/// background gradient and the progress-bar thresholds.
///
/// Everything here is a pure lookup; the renderer converts `Rgb` into
/// terminal colors.

use super::entity::{Platform, PlatformKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Rgb {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Linear blend, `t` in [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Body fill and outline of a platform.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlatformColors {
    pub fill: Rgb,
    pub border: Rgb,
}

const fn pair(fill: u32, border: u32) -> PlatformColors {
    PlatformColors { fill: Rgb::hex(fill), border: Rgb::hex(border) }
}

pub const DEFAULT_COLORS: PlatformColors = pair(0x228B22, 0x1F5F1F);
pub const BREAKABLE_COLORS: PlatformColors = pair(0x8B4513, 0x5D2E0A);
pub const MOVING_COLORS: PlatformColors = pair(0x4169E1, 0x2E4BC7);
pub const FINAL_COLORS: PlatformColors = pair(0xFFD700, 0xCC9A00);

/// Total over all strings: unknown categories get the default green.
pub fn color_for(category: &str) -> PlatformColors {
    match category {
        "AWS" => pair(0x32CD32, 0x228B22),
        "S3 Services" => pair(0xFF6B35, 0xCC4A1F),
        "Compute" => pair(0x4ECDC4, 0x3BA39C),
        "Database" => pair(0xFF4757, 0xE63946),
        "Storage" => pair(0x5F27CD, 0x4C1FA3),
        "Network" => pair(0x00D2D3, 0x00A8A9),
        "Security" => pair(0x54A0FF, 0x2F80CC),
        "Analytics" => pair(0xFFA502, 0xCC7A00),
        "Machine Learning" => pair(0xA4B0BE, 0x747D8C),
        _ => DEFAULT_COLORS,
    }
}

/// Kind-specific colors win over the category.
pub fn platform_colors(p: &Platform) -> PlatformColors {
    match p.kind {
        PlatformKind::Breakable => BREAKABLE_COLORS,
        PlatformKind::Moving => MOVING_COLORS,
        PlatformKind::Final => FINAL_COLORS,
        PlatformKind::Normal => color_for(&p.category),
    }
}

// ── Background ──

/// Sky gradient stops, top of the screen (t = 0) to bottom (t = 1).
pub const SKY_STOPS: [(f32, Rgb); 4] = [
    (0.0, Rgb::hex(0x001122)),
    (0.3, Rgb::hex(0x003366)),
    (0.7, Rgb::hex(0x004488)),
    (1.0, Rgb::hex(0x87CEEB)),
];

pub fn sky_at(t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    for w in SKY_STOPS.windows(2) {
        let (t0, c0) = w[0];
        let (t1, c1) = w[1];
        if t <= t1 {
            return c0.lerp(c1, (t - t0) / (t1 - t0));
        }
    }
    SKY_STOPS[SKY_STOPS.len() - 1].1
}

// ── Progress bar ──

pub fn progress_color(reached: usize, total: usize) -> Rgb {
    let ratio = if total == 0 { 1.0 } else { reached as f32 / total as f32 };
    if ratio < 0.5 {
        Rgb::hex(0xFF6B35)
    } else if ratio < 0.8 {
        Rgb::hex(0xFFA502)
    } else {
        Rgb::hex(0x32CD32)
    }
}

pub const HIGHLIGHT: Rgb = Rgb(255, 255, 255);
pub const LABEL: Rgb = Rgb(255, 255, 255);
pub const GOLD: Rgb = Rgb::hex(0xFFD700);

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(kind: PlatformKind, category: &str) -> Platform {
        Platform {
            index: 1,
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 30.0,
            kind,
            visited: false,
            label: "x".into(),
            category: category.into(),
        }
    }

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Rgb::hex(0x4169E1), Rgb(0x41, 0x69, 0xE1));
    }

    #[test]
    fn known_categories() {
        assert_eq!(color_for("Compute").fill, Rgb::hex(0x4ECDC4));
        assert_eq!(color_for("Machine Learning").border, Rgb::hex(0x747D8C));
        assert_eq!(color_for("AWS").fill, Rgb::hex(0x32CD32));
    }

    #[test]
    fn unknown_category_is_default() {
        assert_eq!(color_for(""), DEFAULT_COLORS);
        assert_eq!(color_for("Quantum"), DEFAULT_COLORS);
        assert_eq!(color_for("compute"), DEFAULT_COLORS);
    }

    #[test]
    fn kind_overrides_category() {
        assert_eq!(platform_colors(&platform(PlatformKind::Breakable, "Compute")), BREAKABLE_COLORS);
        assert_eq!(platform_colors(&platform(PlatformKind::Moving, "Compute")), MOVING_COLORS);
        assert_eq!(platform_colors(&platform(PlatformKind::Final, "Compute")), FINAL_COLORS);
        assert_eq!(platform_colors(&platform(PlatformKind::Normal, "Compute")), color_for("Compute"));
    }

    #[test]
    fn progress_thresholds() {
        assert_eq!(progress_color(0, 234), Rgb::hex(0xFF6B35));
        assert_eq!(progress_color(116, 234), Rgb::hex(0xFF6B35));
        assert_eq!(progress_color(117, 234), Rgb::hex(0xFFA502));
        assert_eq!(progress_color(187, 234), Rgb::hex(0xFFA502));
        assert_eq!(progress_color(188, 234), Rgb::hex(0x32CD32));
        assert_eq!(progress_color(234, 234), Rgb::hex(0x32CD32));
    }

    #[test]
    fn sky_hits_stops() {
        assert_eq!(sky_at(0.0), Rgb::hex(0x001122));
        assert_eq!(sky_at(0.3), Rgb::hex(0x003366));
        assert_eq!(sky_at(1.0), Rgb::hex(0x87CEEB));
        assert_eq!(sky_at(2.0), Rgb::hex(0x87CEEB));
    }
}
