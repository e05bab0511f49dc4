//! Colors for the timemap: a small RGB type, the shading transforms used to
//! derive bar fills and outlines from one seed color, and the row palette.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    fn to_unit(self) -> [f64; 3] {
        [self.r, self.g, self.b].map(|c| f64::from(c) / 255.0)
    }

    fn from_unit([r, g, b]: [f64; 3]) -> Self {
        let quantize = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb::new(quantize(r), quantize(g), quantize(b))
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let a = self.to_unit();
        let b = other.to_unit();
        Rgb::from_unit([0, 1, 2].map(|i| a[i] + (b[i] - a[i]) * t))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const GRAY: Rgb = Rgb::new(128, 128, 128);
pub const DARK_GRAY: Rgb = Rgb::new(169, 169, 169);
pub const LAVENDER: Rgb = Rgb::new(230, 230, 250);
pub const FIREBRICK: Rgb = Rgb::new(178, 34, 34);
pub const DARK_ORANGE: Rgb = Rgb::new(255, 140, 0);
pub const TEXT_DARK: Rgb = Rgb::new(60, 60, 70);

fn rgb_to_hsv([r, g, b]: [f64; 3]) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    [h, s, max]
}

fn hsv_to_rgb([h, s, v]: [f64; 3]) -> [f64; 3] {
    let sector = (h * 6.0).rem_euclid(6.0);
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as u8 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Scales saturation and value (HSV lightness) of `color`, clamped to `[0, 1]`.
pub fn shade(color: Rgb, saturation: f64, value: f64) -> Rgb {
    let [h, s, v] = rgb_to_hsv(color.to_unit());
    let s = (s * saturation).clamp(0.0, 1.0);
    let v = (v * value).clamp(0.0, 1.0);
    Rgb::from_unit(hsv_to_rgb([h, s, v]))
}

/// Bolder variant, used for the active-time bar.
pub fn emphasize(color: Rgb) -> Rgb {
    shade(color, 1.2, 1.2)
}

/// Darker variant, used for outlines.
pub fn mute(color: Rgb) -> Rgb {
    shade(color, 0.9, 0.9)
}

/// Paler variant, used for the idle-time bar.
pub fn soften(color: Rgb) -> Rgb {
    shade(color, 0.4, 1.3)
}

/// Viridis sampled at eighths; intermediate colors are interpolated.
const VIRIDIS: [Rgb; 9] = [
    Rgb::new(0x44, 0x01, 0x54),
    Rgb::new(0x47, 0x2d, 0x7b),
    Rgb::new(0x3b, 0x52, 0x8b),
    Rgb::new(0x2c, 0x72, 0x8e),
    Rgb::new(0x21, 0x91, 0x8c),
    Rgb::new(0x28, 0xae, 0x80),
    Rgb::new(0x5e, 0xc9, 0x62),
    Rgb::new(0xad, 0xdc, 0x30),
    Rgb::new(0xfd, 0xe7, 0x25),
];

fn viridis_at(t: f64) -> Rgb {
    let pos = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    VIRIDIS[lo].lerp(VIRIDIS[hi], pos - lo as f64)
}

/// `n` evenly spaced viridis colors, dark purple first.
pub fn viridis(n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![VIRIDIS[0]],
        _ => (0..n)
            .map(|i| viridis_at(i as f64 / (n - 1) as f64))
            .collect(),
    }
}
