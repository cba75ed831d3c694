use std::collections::VecDeque;

use crate::beads::BeadSet;
use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::{Error, Result};
use crate::registry::KnobReader;

pub const NAME: &str = "snake";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeOptions {
    pub length: usize,
    pub direction: i32,
}

impl Default for SnakeOptions {
    fn default() -> Self {
        SnakeOptions {
            length: 1,
            direction: 1,
        }
    }
}

impl SnakeOptions {
    pub(crate) fn from_knobs(knobs: &mut KnobReader) -> Result<Self> {
        let defaults = SnakeOptions::default();
        let length = knobs.count("length", defaults.length)?;
        if length == 0 {
            return Err(Error::invalid_option("length", "must be at least 1"));
        }
        Ok(SnakeOptions {
            length,
            direction: knobs.direction("direction", defaults.direction)?,
        })
    }
}

/// A run of lit beads crawling around the list, wrapping at the ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    options: SnakeOptions,
    /// List positions, tail first.
    body: VecDeque<usize>,
}

impl Snake {
    pub fn new(options: SnakeOptions) -> Snake {
        Snake {
            options,
            body: VecDeque::new(),
        }
    }

    pub fn body(&self) -> impl Iterator<Item = usize> + '_ {
        self.body.iter().copied()
    }

    fn next_head(&self, count: usize) -> usize {
        match self.body.back() {
            Some(&head) => {
                (head as i64 + self.options.direction as i64).rem_euclid(count as i64) as usize
            }
            None if self.options.direction > 0 => 0,
            None => count - 1,
        }
    }
}

impl LightingEffect for Snake {
    fn prepare(&mut self, _set: &BeadSet, beads: &[usize]) -> Result<()> {
        if !beads.is_empty() && self.options.length > beads.len() {
            return Err(Error::invalid_option(
                "length",
                format!("{} is longer than the {} beads", self.options.length, beads.len()),
            ));
        }
        self.body.clear();
        Ok(())
    }

    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        let count = canvas.beads.len();
        if count == 0 {
            return Ok(Progress::Running);
        }

        let head = self.next_head(count);
        self.body.push_back(head);
        if self.body.len() > self.options.length {
            if let Some(tail) = self.body.pop_front() {
                if !self.body.contains(&tail) {
                    let background = canvas.ring.background();
                    canvas
                        .ring
                        .color_mut(canvas.beads[tail])?
                        .set(&background, 1.0);
                }
            }
        }

        for &position in &self.body {
            canvas
                .ring
                .color_mut(canvas.beads[position])?
                .set(&canvas.color, 1.0);
        }
        Ok(Progress::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beads::BeadRing;
    use crate::color::Color;

    fn lit(ring: &BeadRing) -> Vec<usize> {
        ring.beads()
            .iter()
            .filter(|bead| bead.color == Color::GREEN)
            .map(|bead| bead.index())
            .collect()
    }

    fn run(snake: &mut Snake, ring: &mut BeadRing, beads: &[usize], ticks: usize) {
        let set: BeadSet = beads.iter().copied().collect();
        for _ in 0..ticks {
            let mut canvas = Canvas {
                ring: &mut *ring,
                beads,
                set: &set,
                color: Color::GREEN,
            };
            snake.step(&mut canvas).unwrap();
        }
    }

    #[test]
    fn grows_then_crawls() {
        let mut ring = BeadRing::new(10);
        let beads: Vec<usize> = (0..10).collect();
        let mut snake = Snake::new(SnakeOptions {
            length: 3,
            direction: 1,
        });
        run(&mut snake, &mut ring, &beads, 2);
        assert_eq!(lit(&ring), vec![0, 1]);
        run(&mut snake, &mut ring, &beads, 3);
        assert_eq!(lit(&ring), vec![2, 3, 4]);
    }

    #[test]
    fn wraps_around_the_list() {
        let mut ring = BeadRing::new(10);
        let beads: Vec<usize> = (4..8).collect();
        let mut snake = Snake::new(SnakeOptions {
            length: 2,
            direction: -1,
        });
        run(&mut snake, &mut ring, &beads, 3);
        assert_eq!(snake.body().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(lit(&ring), vec![5, 6]);
        run(&mut snake, &mut ring, &beads, 2);
        assert_eq!(lit(&ring), vec![4, 7]);
    }

    #[test]
    fn full_length_snake_stays_lit() {
        let mut ring = BeadRing::new(4);
        let beads: Vec<usize> = (0..4).collect();
        let mut snake = Snake::new(SnakeOptions {
            length: 4,
            direction: 1,
        });
        run(&mut snake, &mut ring, &beads, 9);
        assert_eq!(lit(&ring), vec![0, 1, 2, 3]);
    }

    #[test]
    fn too_long_snake_is_rejected() {
        let beads: Vec<usize> = (0..3).collect();
        let set: BeadSet = beads.iter().copied().collect();
        let mut snake = Snake::new(SnakeOptions {
            length: 4,
            direction: 1,
        });
        assert!(snake.prepare(&set, &beads).is_err());
    }
}
