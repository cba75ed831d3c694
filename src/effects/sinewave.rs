use std::f32::consts::PI;

use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::{Error, Result};
use crate::registry::KnobReader;

pub const NAME: &str = "sine_wave";
pub const THREE_PHASE_NAME: &str = "3phase_sine_wave";

/// Channel phase shifts as fractions of the bead count.
const PHASES: [f32; 3] = [0.0, 0.25, 0.5];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveOptions {
    /// Full waves along the bead list.
    pub period: f32,
    /// Beads the wave travels per tick, sign gives the direction.
    pub direction: i32,
}

impl Default for WaveOptions {
    fn default() -> Self {
        WaveOptions {
            period: 1.0,
            direction: 1,
        }
    }
}

impl WaveOptions {
    pub(crate) fn from_knobs(knobs: &mut KnobReader) -> Result<Self> {
        let defaults = WaveOptions::default();
        Ok(WaveOptions {
            period: knobs.float("period", defaults.period)?,
            direction: knobs.direction("direction", defaults.direction)?,
        })
    }
}

/// A sine of intensity travelling along the ordered beads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SineWave {
    options: WaveOptions,
    offset: i64,
}

impl SineWave {
    pub fn new(options: WaveOptions) -> SineWave {
        SineWave { options, offset: 0 }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn set_period(&mut self, period: f32) {
        self.options.period = period;
    }

    pub fn set_direction(&mut self, direction: i32) -> Result<()> {
        if direction == 0 {
            return Err(Error::invalid_option("direction", "must not be zero"));
        }
        self.options.direction = direction;
        Ok(())
    }

    /// Intensity in [0, 1] at `position` in a list of `count` beads, shifted by `shift` beads.
    fn intensity(&self, position: usize, count: usize, shift: f32) -> f32 {
        let n = count as f32;
        let x = position as f32 + self.offset as f32 + shift;
        ((2.0 * PI / n * self.options.period * x).sin() + 1.0) / 2.0
    }

    fn advance(&mut self, count: usize) {
        self.offset = (self.offset + self.options.direction as i64).rem_euclid(count as i64);
    }
}

impl LightingEffect for SineWave {
    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        let count = canvas.beads.len();
        if count == 0 {
            return Ok(Progress::Running);
        }

        for (position, &index) in canvas.beads.iter().enumerate() {
            let intensity = self.intensity(position, count, 0.0);
            canvas.ring.color_mut(index)?.set(&canvas.color, intensity);
        }
        self.advance(count);
        Ok(Progress::Running)
    }
}

/// Like [`SineWave`], but red, green and blue each run their own shifted wave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreePhaseSineWave {
    wave: SineWave,
}

impl ThreePhaseSineWave {
    pub fn new(options: WaveOptions) -> ThreePhaseSineWave {
        ThreePhaseSineWave {
            wave: SineWave::new(options),
        }
    }

    pub fn offset(&self) -> i64 {
        self.wave.offset
    }

    pub fn wave_mut(&mut self) -> &mut SineWave {
        &mut self.wave
    }
}

impl LightingEffect for ThreePhaseSineWave {
    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        let count = canvas.beads.len();
        if count == 0 {
            return Ok(Progress::Running);
        }

        let n = count as f32;
        for (position, &index) in canvas.beads.iter().enumerate() {
            let [r, g, b] = PHASES.map(|phase| self.wave.intensity(position, count, phase * n));
            let bead = canvas.ring.color_mut(index)?;
            bead.r = r * canvas.color.r;
            bead.g = g * canvas.color.g;
            bead.b = b * canvas.color.b;
        }
        self.wave.advance(count);
        Ok(Progress::Running)
    }
}
