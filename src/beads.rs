use std::collections::{BTreeSet, HashMap};
use std::ops::BitOr;

use crate::color::Color;
use crate::error::{Error, Result};

pub const DEFAULT_BEAD_COUNT: usize = 60;

/// Beads 0..STEM_LEN hang below the ring.
pub const STEM_LEN: usize = 4;

/// The counter-clockwise table keeps this many leading indices in natural order.
const CCW_FIXED: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Bead {
    index: usize,
    pub color: Color,
}

impl Bead {
    fn new(index: usize) -> Bead {
        Bead {
            index,
            color: Color::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// An unordered set of bead indices. Effects resolve these against the
/// ring, so every effect touching a bead touches the same color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeadSet(BTreeSet<usize>);

impl BeadSet {
    pub fn new() -> BeadSet {
        BeadSet(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &BeadSet) -> BeadSet {
        BeadSet(self.0.union(&other.0).copied().collect())
    }
}

impl FromIterator<usize> for BeadSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        BeadSet(iter.into_iter().collect())
    }
}

impl BitOr for &BeadSet {
    type Output = BeadSet;

    fn bitor(self, rhs: &BeadSet) -> BeadSet {
        self.union(rhs)
    }
}

/// The canonical bead colors plus the predefined subsets of the installation.
pub struct BeadRing {
    beads: Vec<Bead>,
    background: Color,
    sets: HashMap<String, BeadSet>,
}

impl BeadRing {
    pub fn new(count: usize) -> BeadRing {
        BeadRing {
            beads: (0..count).map(Bead::new).collect(),
            background: Color::BLACK,
            sets: predefined_sets(count),
        }
    }

    pub fn with_background(mut self, background: Color) -> BeadRing {
        self.background = background;
        self
    }

    pub fn len(&self) -> usize {
        self.beads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beads.is_empty()
    }

    pub fn beads(&self) -> &[Bead] {
        &self.beads
    }

    pub fn get(&self, index: usize) -> Option<&Bead> {
        self.beads.get(index)
    }

    pub fn color_mut(&mut self, index: usize) -> Result<&mut Color> {
        let count = self.beads.len();
        self.beads
            .get_mut(index)
            .map(|bead| &mut bead.color)
            .ok_or(Error::BeadOutOfRange { index, count })
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Looks up a predefined set by name.
    pub fn named(&self, name: &str) -> Result<&BeadSet> {
        self.sets
            .get(name)
            .ok_or_else(|| Error::UnknownBeadSet(name.to_string()))
    }

    /// Parses a `|`-separated union of set names and bead indices,
    /// e.g. `stem|eighth7|eighth0` or `4|5|6`.
    pub fn parse_set(&self, expr: &str) -> Result<BeadSet> {
        let mut set = BeadSet::new();
        for term in expr.split('|').map(str::trim) {
            let part = match term.parse::<usize>() {
                Ok(index) => std::iter::once(index).collect(),
                Err(_) => self.named(&term.to_lowercase())?.clone(),
            };
            set = &set | &part;
        }
        self.validate(&set)?;
        Ok(set)
    }

    pub fn validate(&self, set: &BeadSet) -> Result<()> {
        match set.iter().find(|&index| index >= self.beads.len()) {
            Some(index) => Err(Error::BeadOutOfRange {
                index,
                count: self.beads.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Angular position of a bead when walking the installation counter-clockwise.
/// The stem keeps its natural order, the ring runs backwards.
pub fn ccw_position(index: usize, count: usize) -> usize {
    if index < CCW_FIXED || index >= count {
        index
    } else {
        count + CCW_FIXED - 1 - index
    }
}

fn span(start: usize, end: usize) -> BeadSet {
    (start..end).collect()
}

fn every_other(start: usize, end: usize) -> BeadSet {
    (start..end).step_by(2).collect()
}

fn predefined_sets(count: usize) -> HashMap<String, BeadSet> {
    let ring_start = STEM_LEN.min(count);
    let ring_len = count - ring_start;
    let part = |k: usize, parts: usize| {
        span(
            ring_start + k * ring_len / parts,
            ring_start + (k + 1) * ring_len / parts,
        )
    };

    let mut sets = HashMap::new();
    sets.insert("none".to_string(), BeadSet::new());
    sets.insert("all".to_string(), span(0, count));
    sets.insert("stem".to_string(), span(0, ring_start));
    sets.insert("ring".to_string(), span(ring_start, count));

    for k in 0..8 {
        sets.insert(format!("eighth{}", k), part(k, 8));
    }
    let quadrants: Vec<BeadSet> = (0..4).map(|k| part(k, 4)).collect();
    for (k, quadrant) in quadrants.iter().enumerate() {
        sets.insert(format!("quadrant{}", k), quadrant.clone());
        let next = (k + 1) % 4;
        sets.insert(format!("half{}{}", k, next), quadrant | &quadrants[next]);
    }

    sets.insert("even_all".to_string(), every_other(0, count));
    sets.insert("even_ring".to_string(), every_other(ring_start, count));
    sets.insert("odd_all".to_string(), every_other(1, count));
    sets.insert("odd_ring".to_string(), every_other(ring_start + 1, count));
    sets
}
