//! Display colours for questions.
//!
//! Spiral questions take the hue of their level. Emotional questions sit on a
//! red to yellow to green gradient, and general questions on a purple ramp.
//! These colours never affect scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::SetKind;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Beige, Purple, Red, Blue, Orange, Green, Yellow, Turquoise.
pub const SPIRAL_HUES: [Rgb; 8] = [
    Rgb::new(0xF5, 0xF5, 0xDC),
    Rgb::new(0x80, 0x00, 0x80),
    Rgb::new(0xFF, 0x00, 0x00),
    Rgb::new(0x00, 0x00, 0xFF),
    Rgb::new(0xFF, 0xA5, 0x00),
    Rgb::new(0x00, 0x80, 0x00),
    Rgb::new(0xFF, 0xFF, 0x00),
    Rgb::new(0x40, 0xE0, 0xD0),
];

/// Colour for a question given its pool, index, and the pool's length.
pub fn color_for(kind: SetKind, index: usize, pool_len: usize) -> Rgb {
    match kind {
        SetKind::Spiral => SPIRAL_HUES[index % SPIRAL_HUES.len()],
        SetKind::Emotional => emotional_gradient(index, pool_len),
        SetKind::General => general_gradient(index, pool_len),
    }
}

/// Position of `index` in `[0, 1]` across a pool of `len` entries.
fn normalized(index: usize, len: usize) -> f64 {
    let span = len.saturating_sub(1).max(1);
    (index as f64 / span as f64).clamp(0.0, 1.0)
}

fn channel(value: f64) -> u8 {
    value.floor().clamp(0.0, 255.0) as u8
}

fn emotional_gradient(index: usize, len: usize) -> Rgb {
    let position = normalized(index, len);
    if position < 0.5 {
        Rgb::new(255, channel(255.0 * position * 2.0), 0)
    } else {
        let towards_green = (position - 0.5) * 2.0;
        Rgb::new(channel(255.0 * (1.0 - towards_green)), 255, 0)
    }
}

fn general_gradient(index: usize, len: usize) -> Rgb {
    let intensity = channel(155.0 + 100.0 * normalized(index, len));
    Rgb::new(intensity, 0, intensity)
}
