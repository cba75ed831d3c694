use std::f32::consts::PI;

use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::{Error, Result};
use crate::registry::KnobReader;

pub const NAME: &str = "throb";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrobOptions {
    pub period: f32,
    /// Phase advance per tick.
    pub step: f32,
}

impl Default for ThrobOptions {
    fn default() -> Self {
        ThrobOptions {
            period: 1.0,
            step: 0.05,
        }
    }
}

impl ThrobOptions {
    pub(crate) fn from_knobs(knobs: &mut KnobReader) -> Result<Self> {
        let defaults = ThrobOptions::default();
        let step = knobs.float("step", defaults.step)?;
        if step <= 0.0 {
            return Err(Error::invalid_option("step", "must be positive"));
        }
        Ok(ThrobOptions {
            period: knobs.float("period", defaults.period)?,
            step,
        })
    }
}

/// Pulses all beads together between dark and full color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Throb {
    options: ThrobOptions,
    x: f32,
}

impl Throb {
    pub fn new(options: ThrobOptions) -> Throb {
        Throb { options, x: 0.0 }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn set_period(&mut self, period: f32) {
        self.options.period = period;
    }

    fn intensity(&self) -> f32 {
        ((self.x * PI * self.options.period).sin() + 1.0) / 2.0
    }
}

impl LightingEffect for Throb {
    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        let intensity = self.intensity();
        for &index in canvas.beads {
            canvas.ring.color_mut(index)?.set(&canvas.color, intensity);
        }
        self.x += self.options.step;
        Ok(Progress::Running)
    }
}
