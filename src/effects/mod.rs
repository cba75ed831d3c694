pub(crate) mod bounce;
pub(crate) mod sinewave;
pub(crate) mod snake;
pub(crate) mod sparkle;
pub(crate) mod staticcolor;
pub(crate) mod throb;

use std::fmt;

use serde::Deserialize;

use crate::beads::{ccw_position, BeadRing, BeadSet};
use crate::color::{Color, ColorFade, EffectColor};
use crate::error::{Error, Result};

pub use bounce::Bounce;
pub use sinewave::{SineWave, ThreePhaseSineWave};
pub use snake::Snake;
pub use sparkle::Sparkle;
pub use staticcolor::StaticColor;
pub use throb::Throb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u32);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Walking direction used to turn a bead set into an ordered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Orientation {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Orientation {
    /// Anything but `ccw` walks clockwise.
    pub fn from_name(name: &str) -> Orientation {
        match name.to_lowercase().as_str() {
            "ccw" => Orientation::CounterClockwise,
            _ => Orientation::Clockwise,
        }
    }
}

impl From<String> for Orientation {
    fn from(name: String) -> Self {
        Orientation::from_name(&name)
    }
}

pub fn materialize_bead_order(set: &BeadSet, orientation: Orientation, count: usize) -> Vec<usize> {
    let mut beads: Vec<usize> = set.iter().collect();
    match orientation {
        Orientation::Clockwise => beads.sort_unstable(),
        Orientation::CounterClockwise => beads.sort_by_key(|&index| ccw_position(index, count)),
    }
    beads
}

/// What a behavior gets to work with during one step.
pub struct Canvas<'a> {
    pub ring: &'a mut BeadRing,
    /// Bead indices in the effect's orientation.
    pub beads: &'a [usize],
    /// The same beads, unordered.
    pub set: &'a BeadSet,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Running,
    Finished,
}

pub trait LightingEffect {
    /// Checks the behavior against the bead list it is about to drive.
    fn prepare(&mut self, _set: &BeadSet, _beads: &[usize]) -> Result<()> {
        Ok(())
    }

    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    SetColor(StaticColor),
    SineWave(SineWave),
    ThreePhaseSineWave(ThreePhaseSineWave),
    Throb(Throb),
    Bounce(Bounce),
    Sparkle(Sparkle),
    Snake(Snake),
}

impl Behavior {
    pub fn name(&self) -> &'static str {
        match self {
            Behavior::SetColor(_) => staticcolor::NAME,
            Behavior::SineWave(_) => sinewave::NAME,
            Behavior::ThreePhaseSineWave(_) => sinewave::THREE_PHASE_NAME,
            Behavior::Throb(_) => throb::NAME,
            Behavior::Bounce(_) => bounce::NAME,
            Behavior::Sparkle(_) => sparkle::NAME,
            Behavior::Snake(_) => snake::NAME,
        }
    }

    fn as_effect(&mut self) -> &mut dyn LightingEffect {
        match self {
            Behavior::SetColor(effect) => effect,
            Behavior::SineWave(effect) => effect,
            Behavior::ThreePhaseSineWave(effect) => effect,
            Behavior::Throb(effect) => effect,
            Behavior::Bounce(effect) => effect,
            Behavior::Sparkle(effect) => effect,
            Behavior::Snake(effect) => effect,
        }
    }

    fn prepare(&mut self, set: &BeadSet, beads: &[usize]) -> Result<()> {
        self.as_effect().prepare(set, beads)
    }

    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        self.as_effect().step(canvas)
    }
}

/// Settings shared by every behavior.
#[derive(Debug, Clone, Default)]
pub struct EffectOptions {
    pub beads: BeadSet,
    pub color: EffectColor,
    pub orientation: Orientation,
    /// Ticks to wait before the behavior starts stepping.
    pub delay: u32,
    /// Active ticks after the delay, `None` runs until removed.
    pub duration: Option<u32>,
}

/// A behavior bound to a set of beads, plus the timing bookkeeping every
/// behavior shares.
#[derive(Debug, Clone)]
pub struct Effect {
    id: Option<EffectId>,
    behavior: Behavior,
    set: BeadSet,
    orientation: Orientation,
    beads: Vec<usize>,
    color: EffectColor,
    delay: u32,
    duration: Option<u32>,
    tick_count: u32,
    finished: bool,
}

impl Effect {
    pub fn new(mut behavior: Behavior, options: EffectOptions, ring: &BeadRing) -> Result<Effect> {
        ring.validate(&options.beads)?;
        let beads = materialize_bead_order(&options.beads, options.orientation, ring.len());
        behavior.prepare(&options.beads, &beads)?;

        Ok(Effect {
            id: None,
            behavior,
            set: options.beads,
            orientation: options.orientation,
            beads,
            color: options.color,
            delay: options.delay,
            duration: options.duration,
            tick_count: 0,
            finished: false,
        })
    }

    pub fn name(&self) -> &'static str {
        self.behavior.name()
    }

    pub fn id(&self) -> Option<EffectId> {
        self.id
    }

    pub fn attach(&mut self, id: EffectId) -> Result<()> {
        if let Some(current) = self.id {
            return Err(Error::AlreadyAttached(current));
        }
        self.id = Some(id);
        Ok(())
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub fn bead_set(&self) -> &BeadSet {
        &self.set
    }

    pub fn ordered_beads(&self) -> &[usize] {
        &self.beads
    }

    /// Swaps in another bead set. The behavior is re-checked against it first.
    pub fn set_bead_set(&mut self, set: BeadSet, ring: &BeadRing) -> Result<()> {
        ring.validate(&set)?;
        let beads = materialize_bead_order(&set, self.orientation, ring.len());
        self.behavior.prepare(&set, &beads)?;
        self.set = set;
        self.beads = beads;
        Ok(())
    }

    pub fn color(&self) -> &EffectColor {
        &self.color
    }

    pub fn set_color(&mut self, color: &Color) {
        self.color.set(color);
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn set_delay(&mut self, delay: u32) {
        self.delay = delay;
    }

    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Option<u32>) {
        self.duration = duration;
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn is_active(&self) -> bool {
        self.tick_count >= self.delay
    }

    /// Advances the effect by one mainloop cycle.
    ///
    /// The color advances and the behavior steps first, then the duration is
    /// checked against the tick count from before this cycle, and the tick
    /// count always increments last. A failing step still counts as a tick.
    pub fn tick(&mut self, ring: &mut BeadRing) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::NotAttached);
        }

        let result = if self.is_active() {
            self.color.advance();
            let mut canvas = Canvas {
                ring,
                beads: &self.beads,
                set: &self.set,
                color: self.color.current(),
            };
            self.behavior.step(&mut canvas)
        } else {
            Ok(Progress::Running)
        };

        if let Ok(Progress::Finished) = result {
            self.finished = true;
        }
        if let Some(duration) = self.duration {
            if self.tick_count.saturating_add(1) >= self.delay.saturating_add(duration) {
                self.finished = true;
            }
        }
        self.tick_count = self.tick_count.saturating_add(1);

        result.map(|_| ())
    }

    /// Fades from the current color to black over `ticks` active ticks and
    /// finishes on the tick the fade reaches black. Replaces any earlier duration.
    ///
    /// The duration counts from the end of the delay, so it becomes
    /// `max(tick_count, delay) - delay + ticks`. Adding the delay on top of the
    /// tick count, as in `delay + tick_count + ticks`, would count the delay
    /// twice and keep a delayed effect around after it has gone black.
    pub fn fade_out(&mut self, ticks: u32) -> Result<()> {
        let fade = ColorFade::new(self.color.current(), Color::BLACK, ticks)?;
        let fade_start = self.tick_count.max(self.delay);
        let duration = (fade_start - self.delay)
            .checked_add(ticks)
            .ok_or_else(|| Error::invalid_option("fade", format!("{} ticks is too long", ticks)))?;
        self.color = EffectColor::Fade(fade);
        self.duration = Some(duration);
        Ok(())
    }
}
