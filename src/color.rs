use palette::FromColor;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Bead color data. Channels are nominally in [0, 1] but nothing enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const VIOLET: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    /// Hue and saturation pad coordinates, both in [0, 1], at full value.
    pub fn from_hue_saturation(hue: f32, saturation: f32) -> Color {
        let hsv = palette::Hsv::new(hue * 360.0, saturation, 1.0);
        let rgb: palette::LinSrgb = palette::Srgb::from_color(hsv).into_linear();
        rgb.into()
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.r *= intensity;
        self.g *= intensity;
        self.b *= intensity;
    }

    /// Overwrites every channel from `source`, scaling r, g and b. Alpha is copied as is.
    pub fn set(&mut self, source: &Color, intensity: f32) {
        self.r = source.r * intensity;
        self.g = source.g * intensity;
        self.b = source.b * intensity;
        self.a = source.a;
    }
}

impl From<[f32; 3]> for Color {
    fn from(rgb: [f32; 3]) -> Self {
        Color::rgb(rgb[0], rgb[1], rgb[2])
    }
}

impl From<palette::LinSrgb> for Color {
    fn from(rgb: palette::LinSrgb) -> Self {
        Color::rgb(rgb.red, rgb.green, rgb.blue)
    }
}

/// A color that moves from `start` towards `finish` over a fixed number of
/// ticks and keeps oscillating between the bounds afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFade {
    current: Color,
    delta: [f32; 3],
}

impl ColorFade {
    pub fn new(start: Color, finish: Color, ticks: u32) -> Result<ColorFade> {
        if ticks == 0 {
            return Err(Error::InvalidFade(ticks));
        }

        let t = ticks as f32;
        Ok(ColorFade {
            current: start,
            delta: [
                (finish.r - start.r) / t,
                (finish.g - start.g) / t,
                (finish.b - start.b) / t,
            ],
        })
    }

    pub fn advance(&mut self) {
        let channels = [
            &mut self.current.r,
            &mut self.current.g,
            &mut self.current.b,
        ];

        // Each channel bounces off its own bound, so the channels may drift out of phase.
        for (value, delta) in channels.into_iter().zip(self.delta.iter_mut()) {
            *value += *delta;
            if *value <= 0.0 {
                *value = 0.0;
                *delta = -*delta;
            }
            if *value >= 1.0 {
                *value = 1.0;
                *delta = -*delta;
            }
        }
    }
}

/// The color an effect paints with: either fixed or fading over time.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectColor {
    Solid(Color),
    Fade(ColorFade),
}

impl EffectColor {
    pub fn current(&self) -> Color {
        match self {
            EffectColor::Solid(color) => *color,
            EffectColor::Fade(fade) => fade.current,
        }
    }

    pub fn advance(&mut self) {
        match self {
            EffectColor::Solid(_) => {}
            EffectColor::Fade(fade) => fade.advance(),
        }
    }

    /// Replaces the current value. A running fade keeps its direction and step size.
    pub fn set(&mut self, source: &Color) {
        match self {
            EffectColor::Solid(color) => color.set(source, 1.0),
            EffectColor::Fade(fade) => fade.current.set(source, 1.0),
        }
    }
}

impl Default for EffectColor {
    fn default() -> Self {
        EffectColor::Solid(Color::WHITE)
    }
}

impl From<Color> for EffectColor {
    fn from(color: Color) -> Self {
        EffectColor::Solid(color)
    }
}

impl From<ColorFade> for EffectColor {
    fn from(fade: ColorFade) -> Self {
        EffectColor::Fade(fade)
    }
}
