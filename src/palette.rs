// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

/// Tint of a fully opaque flake.
const SNOW_RGB: (u8, u8, u8) = (235, 245, 255);

/// Number of distinct shades flakes are quantized to.
pub const SHADES: usize = 8;

#[derive(Clone, Debug)]
pub struct Palette {
    /// Faintest first.
    pub shades: Vec<Color>,
    pub bg: Option<Color>,
    /// Foreground of page content drawn in front of the snow.
    pub content: Option<Color>,
}

impl Palette {
    /// Color for a flake of the given opacity, `None` in mono mode.
    pub fn flake_color(&self, opacity: f64) -> Option<Color> {
        if self.shades.is_empty() {
            return None;
        }
        let last = self.shades.len() - 1;
        let t = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let idx = (t * last as f64).round() as usize;
        self.shades.get(idx.min(last)).copied()
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    // grayscale ramp 232..=255 covers 8..=238 in steps of 10
    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let step = (avg.saturating_sub(8) / 10).min(23);
    let gray_idx = 232 + step;
    let v = 8 + 10 * step;
    let gray_dist = dist2(r, g, b, v, v, v);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 4] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn to_color(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Color {
    match mode {
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 | ColorMode::Mono => rgb_to_color16(r, g, b),
    }
}

fn scale(rgb: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let s = |v: u8| ((v as f32) * t).round().clamp(0.0, 255.0) as u8;
    (s(rgb.0), s(rgb.1), s(rgb.2))
}

pub fn build_palette(mode: ColorMode, default_background: bool) -> Palette {
    let bg = if default_background {
        None
    } else {
        Some(match mode {
            ColorMode::Color16 | ColorMode::Mono => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            ColorMode::Color256 => Color::AnsiValue(16),
        })
    };

    if mode == ColorMode::Mono {
        return Palette {
            shades: Vec::new(),
            bg,
            content: None,
        };
    }

    // opacity 0 still leaves a faint flake visible
    let shades = (0..SHADES)
        .map(|i| {
            let t = 0.25 + 0.75 * (i as f32) / ((SHADES - 1) as f32);
            to_color(mode, scale(SNOW_RGB, t))
        })
        .collect();

    Palette {
        shades,
        bg,
        content: Some(to_color(mode, (255, 215, 120))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_palette_has_no_flake_colors() {
        let p = build_palette(ColorMode::Mono, true);
        assert_eq!(p.flake_color(1.0), None);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn opaque_flakes_get_the_brightest_shade() {
        let p = build_palette(ColorMode::TrueColor, false);
        assert_eq!(p.shades.len(), SHADES);
        assert_eq!(
            p.flake_color(1.0),
            Some(Color::Rgb {
                r: 235,
                g: 245,
                b: 255
            })
        );
        assert_eq!(p.flake_color(0.0), p.shades.first().copied());
        assert_eq!(p.flake_color(-3.0), p.flake_color(0.0));
        assert_eq!(p.bg, Some(Color::Rgb { r: 0, g: 0, b: 0 }));
    }

    #[test]
    fn ansi256_maps_white_and_gray() {
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
        assert_eq!(rgb_to_color16(250, 250, 250), Color::White);
    }
}
