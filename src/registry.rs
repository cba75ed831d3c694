use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::beads::BeadRing;
use crate::effects::bounce::BounceOptions;
use crate::effects::sinewave::WaveOptions;
use crate::effects::snake::SnakeOptions;
use crate::effects::sparkle::SparkleOptions;
use crate::effects::throb::ThrobOptions;
use crate::effects::{
    bounce, sinewave, snake, sparkle, staticcolor, throb, Behavior, Bounce, Effect, EffectOptions,
    SineWave, Snake, Sparkle, StaticColor, ThreePhaseSineWave, Throb,
};
use crate::error::{Error, Result};

/// Behavior specific settings by name, e.g. `period = 2`.
pub type Knobs = BTreeMap<String, f32>;

pub type Constructor = fn(&mut KnobReader) -> Result<Behavior>;

/// Reads knobs for one effect and remembers which ones were used.
pub struct KnobReader<'a> {
    effect: &'a str,
    knobs: &'a Knobs,
    used: BTreeSet<&'a str>,
}

impl<'a> KnobReader<'a> {
    pub fn new(effect: &'a str, knobs: &'a Knobs) -> KnobReader<'a> {
        KnobReader {
            effect,
            knobs,
            used: BTreeSet::new(),
        }
    }

    fn get(&mut self, name: &str) -> Option<f32> {
        let knobs: &'a Knobs = self.knobs;
        let (key, value) = knobs.get_key_value(name)?;
        self.used.insert(key.as_str());
        Some(*value)
    }

    pub fn float(&mut self, name: &str, default: f32) -> Result<f32> {
        match self.get(name) {
            Some(value) if value.is_finite() => Ok(value),
            Some(value) => Err(Error::invalid_option(name, format!("{} is not finite", value))),
            None => Ok(default),
        }
    }

    pub fn integer(&mut self, name: &str, default: i64) -> Result<i64> {
        match self.get(name) {
            Some(value) => to_integer(name, value),
            None => Ok(default),
        }
    }

    pub fn count(&mut self, name: &str, default: usize) -> Result<usize> {
        let value = self.integer(name, default as i64)?;
        usize::try_from(value).map_err(|_| Error::invalid_option(name, "must not be negative"))
    }

    pub fn direction(&mut self, name: &str, default: i32) -> Result<i32> {
        match self.integer(name, default as i64)? {
            0 => Err(Error::invalid_option(name, "must not be zero")),
            value => i32::try_from(value).map_err(|_| Error::invalid_option(name, "out of range")),
        }
    }

    /// Fails on the first knob nobody asked for.
    pub fn finish(self) -> Result<()> {
        match self
            .knobs
            .keys()
            .find(|key| !self.used.contains(key.as_str()))
        {
            Some(key) => Err(Error::UnknownOption {
                effect: self.effect.to_string(),
                option: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub(crate) fn to_integer(name: &str, value: f32) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(Error::invalid_option(name, format!("{} is not a whole number", value)));
    }
    Ok(value as i64)
}

fn build_set_color(_: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::SetColor(StaticColor))
}

fn build_sine_wave(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::SineWave(SineWave::new(WaveOptions::from_knobs(knobs)?)))
}

fn build_three_phase_sine_wave(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::ThreePhaseSineWave(ThreePhaseSineWave::new(
        WaveOptions::from_knobs(knobs)?,
    )))
}

fn build_throb(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::Throb(Throb::new(ThrobOptions::from_knobs(knobs)?)))
}

fn build_bounce(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::Bounce(Bounce::new(BounceOptions::from_knobs(knobs)?)))
}

fn build_sparkle(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::Sparkle(Sparkle::new(SparkleOptions::from_knobs(knobs)?)))
}

fn build_snake(knobs: &mut KnobReader) -> Result<Behavior> {
    Ok(Behavior::Snake(Snake::new(SnakeOptions::from_knobs(knobs)?)))
}

/// Effect constructors by name.
pub struct EffectRegistry {
    constructors: HashMap<&'static str, Constructor>,
}

impl EffectRegistry {
    pub fn new() -> EffectRegistry {
        EffectRegistry {
            constructors: HashMap::new(),
        }
    }

    pub fn with_builtin_effects() -> EffectRegistry {
        let mut registry = EffectRegistry::new();
        registry.register(staticcolor::NAME, build_set_color);
        registry.register(sinewave::NAME, build_sine_wave);
        registry.register(sinewave::THREE_PHASE_NAME, build_three_phase_sine_wave);
        registry.register(throb::NAME, build_throb);
        registry.register(bounce::NAME, build_bounce);
        registry.register(sparkle::NAME, build_sparkle);
        registry.register(snake::NAME, build_snake);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: Constructor) {
        if self.constructors.insert(name, constructor).is_some() {
            log::warn!("Effect {} registered twice, keeping the latest", name);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds a detached effect. Nothing runs until it is attached to a mainloop.
    pub fn create(
        &self,
        name: &str,
        knobs: &Knobs,
        options: EffectOptions,
        ring: &BeadRing,
    ) -> Result<Effect> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownEffect(name.to_string()))?;

        let mut reader = KnobReader::new(name, knobs);
        let behavior = constructor(&mut reader)?;
        reader.finish()?;
        Effect::new(behavior, options, ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Behavior;

    fn knobs(pairs: &[(&str, f32)]) -> Knobs {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn ring_options(ring: &BeadRing) -> EffectOptions {
        EffectOptions {
            beads: ring.named("ring").unwrap().clone(),
            ..Default::default()
        }
    }

    #[test]
    fn builtin_names() {
        let registry = EffectRegistry::with_builtin_effects();
        assert_eq!(
            registry.names(),
            vec![
                "3phase_sine_wave",
                "bounce",
                "set_color",
                "sine_wave",
                "snake",
                "sparkle",
                "throb"
            ]
        );
    }

    #[test]
    fn creates_effect_by_name() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        for name in registry.names() {
            let effect = registry
                .create(name, &Knobs::new(), ring_options(&ring), &ring)
                .unwrap();
            assert_eq!(effect.name(), name);
            assert_eq!(effect.id(), None);
        }
    }

    #[test]
    fn knobs_reach_the_behavior() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        let effect = registry
            .create(
                "sparkle",
                &knobs(&[("size", 5.0), ("speed", 3.0)]),
                ring_options(&ring),
                &ring,
            )
            .unwrap();
        match effect.behavior() {
            Behavior::Sparkle(sparkle) => {
                assert_eq!(*sparkle, Sparkle::new(SparkleOptions { size: 5, speed: 3 }))
            }
            other => panic!("unexpected behavior {:?}", other),
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        let result = registry.create("rainbow", &Knobs::new(), ring_options(&ring), &ring);
        assert_eq!(result.err(), Some(Error::UnknownEffect("rainbow".to_string())));
    }

    #[test]
    fn unknown_knob_is_rejected() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        let result = registry.create(
            "throb",
            &knobs(&[("period", 2.0), ("speed", 1.0)]),
            ring_options(&ring),
            &ring,
        );
        assert_eq!(
            result.err(),
            Some(Error::UnknownOption {
                effect: "throb".to_string(),
                option: "speed".to_string()
            })
        );
    }

    #[test]
    fn bad_knob_values_are_rejected() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        for (name, pairs) in [
            ("bounce", vec![("direction", 0.0)]),
            ("sine_wave", vec![("direction", 1.5)]),
            ("sparkle", vec![("size", -1.0)]),
            ("snake", vec![("length", 0.0)]),
            ("throb", vec![("step", 0.0)]),
        ] {
            let result = registry.create(name, &knobs(&pairs), ring_options(&ring), &ring);
            assert!(
                matches!(result, Err(Error::InvalidOption { .. })),
                "{} accepted {:?}",
                name,
                pairs
            );
        }
    }

    #[test]
    fn oversized_sparkle_is_rejected() {
        let ring = BeadRing::new(60);
        let registry = EffectRegistry::with_builtin_effects();
        let options = EffectOptions {
            beads: ring.named("stem").unwrap().clone(),
            ..Default::default()
        };
        let result = registry.create("sparkle", &knobs(&[("size", 5.0)]), options, &ring);
        assert_eq!(
            result.err(),
            Some(Error::SampleTooLarge {
                size: 5,
                available: 4
            })
        );
    }
}
