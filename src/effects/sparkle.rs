use rand::seq::SliceRandom;

use crate::beads::BeadSet;
use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::{Error, Result};
use crate::registry::KnobReader;

pub const NAME: &str = "sparkle";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkleOptions {
    /// Beads lit per window.
    pub size: usize,
    /// Window length in ticks.
    pub speed: u32,
}

impl Default for SparkleOptions {
    fn default() -> Self {
        SparkleOptions { size: 1, speed: 2 }
    }
}

impl SparkleOptions {
    pub(crate) fn from_knobs(knobs: &mut KnobReader) -> Result<Self> {
        let defaults = SparkleOptions::default();
        let speed = knobs.count("speed", defaults.speed as usize)?;
        Ok(SparkleOptions {
            size: knobs.count("size", defaults.size)?,
            speed: u32::try_from(speed)
                .map_err(|_| Error::invalid_option("speed", "out of range"))?,
        })
    }
}

/// Lights a fresh random sample of beads every `speed` ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sparkle {
    options: SparkleOptions,
    count: u32,
    current: Vec<usize>,
}

fn check_size(size: usize, set: &BeadSet) -> Result<()> {
    if size > set.len() {
        return Err(Error::SampleTooLarge {
            size,
            available: set.len(),
        });
    }
    Ok(())
}

impl Sparkle {
    pub fn new(options: SparkleOptions) -> Sparkle {
        Sparkle {
            options,
            count: 0,
            current: Vec::new(),
        }
    }

    /// Beads lit in the current window.
    pub fn current(&self) -> &[usize] {
        &self.current
    }

    pub fn set_size(&mut self, size: usize, set: &BeadSet) -> Result<()> {
        check_size(size, set)?;
        self.options.size = size;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.options.speed = speed;
    }

    fn resample(&mut self, set: &BeadSet) -> Result<()> {
        check_size(self.options.size, set)?;
        let members: Vec<usize> = set.iter().collect();
        self.current = members
            .choose_multiple(&mut rand::thread_rng(), self.options.size)
            .copied()
            .collect();
        Ok(())
    }
}

impl LightingEffect for Sparkle {
    fn prepare(&mut self, set: &BeadSet, _beads: &[usize]) -> Result<()> {
        check_size(self.options.size, set)?;
        self.count = 0;
        self.current.clear();
        Ok(())
    }

    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        if self.count >= self.options.speed {
            self.count = 0;
        }
        if self.count == 0 {
            self.resample(canvas.set)?;
        }

        for &index in &self.current {
            canvas.ring.color_mut(index)?.set(&canvas.color, 1.0);
        }
        self.count += 1;
        Ok(Progress::Running)
    }
}
