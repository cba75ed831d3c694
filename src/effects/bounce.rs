use crate::beads::BeadSet;
use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::Result;
use crate::registry::KnobReader;

pub const NAME: &str = "bounce";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceOptions {
    pub direction: i32,
}

impl Default for BounceOptions {
    fn default() -> Self {
        BounceOptions { direction: 1 }
    }
}

impl BounceOptions {
    pub(crate) fn from_knobs(knobs: &mut KnobReader) -> Result<Self> {
        Ok(BounceOptions {
            direction: knobs.direction("direction", BounceOptions::default().direction)?,
        })
    }
}

/// A single lit bead running back and forth between the ends of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounce {
    direction: i32,
    current: usize,
    last: usize,
}

impl Bounce {
    pub fn new(options: BounceOptions) -> Bounce {
        Bounce {
            direction: options.direction,
            current: 0,
            last: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }
}

impl LightingEffect for Bounce {
    fn prepare(&mut self, _set: &BeadSet, beads: &[usize]) -> Result<()> {
        self.current = if self.direction < 0 {
            beads.len().saturating_sub(1)
        } else {
            0
        };
        self.last = self.current;
        Ok(())
    }

    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        let Some(end) = canvas.beads.len().checked_sub(1) else {
            return Ok(Progress::Running);
        };

        let background = canvas.ring.background();
        canvas
            .ring
            .color_mut(canvas.beads[self.last])?
            .set(&background, 1.0);

        // Clamp so a fast bounce turns at the end instead of jumping past it.
        let next = self.current as i64 + self.direction as i64;
        self.current = next.clamp(0, end as i64) as usize;
        self.last = self.current;
        canvas
            .ring
            .color_mut(canvas.beads[self.current])?
            .set(&canvas.color, 1.0);

        if self.current == 0 || self.current == end {
            self.direction = -self.direction;
        }
        Ok(Progress::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beads::BeadRing;
    use crate::color::Color;

    fn trace(options: BounceOptions, count: usize, ticks: usize) -> Vec<(usize, i32)> {
        let mut ring = BeadRing::new(count);
        let beads: Vec<usize> = (0..count).collect();
        let set: BeadSet = beads.iter().copied().collect();
        let mut bounce = Bounce::new(options);
        bounce.prepare(&set, &beads).unwrap();

        let mut positions = Vec::new();
        for _ in 0..ticks {
            let mut canvas = Canvas {
                ring: &mut ring,
                beads: &beads,
                set: &set,
                color: Color::RED,
            };
            bounce.step(&mut canvas).unwrap();
            let lit: Vec<usize> = ring
                .beads()
                .iter()
                .filter(|bead| bead.color == Color::RED)
                .map(|bead| bead.index())
                .collect();
            assert_eq!(lit, vec![bounce.position()]);
            positions.push((bounce.position(), bounce.direction()));
        }
        positions
    }

    #[test]
    fn turns_exactly_at_the_ends() {
        let positions: Vec<usize> = trace(BounceOptions::default(), 5, 12)
            .into_iter()
            .map(|(position, _)| position)
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 3, 2, 1, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn direction_flips_only_at_bounds() {
        for (position, direction) in trace(BounceOptions::default(), 7, 40) {
            match position {
                0 => assert_eq!(direction, 1),
                6 => assert_eq!(direction, -1),
                _ => {}
            }
        }
    }

    #[test]
    fn negative_direction_starts_at_the_end() {
        let positions: Vec<usize> = trace(BounceOptions { direction: -1 }, 4, 4)
            .into_iter()
            .map(|(position, _)| position)
            .collect();
        assert_eq!(positions, vec![2, 1, 0, 1]);
    }

    #[test]
    fn fast_bounce_never_skips_an_end() {
        let positions: Vec<usize> = trace(BounceOptions { direction: 3 }, 5, 4)
            .into_iter()
            .map(|(position, _)| position)
            .collect();
        assert_eq!(positions, vec![3, 4, 1, 0]);
    }

    #[test]
    fn single_bead_stays_lit() {
        let positions = trace(BounceOptions::default(), 1, 3);
        assert!(positions.iter().all(|&(position, _)| position == 0));
    }
}
