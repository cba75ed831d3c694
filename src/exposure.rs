//! Named operations an external controller may call on a running effect.
//!
//! Every effect gets the common table, behaviors add their own entries.

use crate::color::Color;
use crate::effects::{Behavior, Effect, EffectId};
use crate::error::{Error, Result};
use crate::registry::to_integer;

pub type Handler = fn(&mut Effect, &[f32]) -> Result<()>;

pub struct Method {
    pub name: &'static str,
    pub arity: usize,
    handler: Handler,
}

const fn method(name: &'static str, arity: usize, handler: Handler) -> Method {
    Method {
        name,
        arity,
        handler,
    }
}

const COMMON: &[Method] = &[
    method("set_color", 3, set_color),
    method("set_hue", 2, set_hue),
    method("set_duration", 1, set_duration),
    method("set_delay", 1, set_delay),
    method("fade_out", 1, fade_out),
];

const WAVE: &[Method] = &[
    method("set_period", 1, set_period),
    method("set_direction", 1, set_direction),
];

const THROB: &[Method] = &[method("set_period", 1, set_period)];

const SPARKLE: &[Method] = &[
    method("set_size", 1, set_size),
    method("set_speed", 1, set_speed),
];

fn behavior_methods(behavior: &Behavior) -> &'static [Method] {
    match behavior {
        Behavior::SineWave(_) | Behavior::ThreePhaseSineWave(_) => WAVE,
        Behavior::Throb(_) => THROB,
        Behavior::Sparkle(_) => SPARKLE,
        Behavior::SetColor(_) | Behavior::Bounce(_) | Behavior::Snake(_) => &[],
    }
}

pub fn methods(effect: &Effect) -> impl Iterator<Item = &'static Method> {
    COMMON.iter().chain(behavior_methods(effect.behavior()))
}

pub fn lookup(effect: &Effect, name: &str) -> Option<&'static Method> {
    methods(effect).find(|method| method.name == name)
}

pub fn invoke(effect: &mut Effect, name: &str, args: &[f32]) -> Result<()> {
    let method = lookup(effect, name).ok_or_else(|| mismatch(effect.id(), name))?;

    if args.len() != method.arity {
        return Err(Error::BadArguments {
            method: name.to_string(),
            expected: method.arity,
            got: args.len(),
        });
    }
    (method.handler)(effect, args)
}

fn ticks(name: &str, value: f32) -> Result<u32> {
    u32::try_from(to_integer(name, value)?)
        .map_err(|_| Error::invalid_option(name, "must be a tick count"))
}

fn set_color(effect: &mut Effect, args: &[f32]) -> Result<()> {
    effect.set_color(&Color::rgb(args[0], args[1], args[2]));
    Ok(())
}

fn set_hue(effect: &mut Effect, args: &[f32]) -> Result<()> {
    effect.set_color(&Color::from_hue_saturation(args[0], args[1]));
    Ok(())
}

fn set_duration(effect: &mut Effect, args: &[f32]) -> Result<()> {
    effect.set_duration(Some(ticks("duration", args[0])?));
    Ok(())
}

fn set_delay(effect: &mut Effect, args: &[f32]) -> Result<()> {
    effect.set_delay(ticks("delay", args[0])?);
    Ok(())
}

fn fade_out(effect: &mut Effect, args: &[f32]) -> Result<()> {
    effect.fade_out(ticks("fade", args[0])?)
}

fn set_period(effect: &mut Effect, args: &[f32]) -> Result<()> {
    let id = effect.id();
    match effect.behavior_mut() {
        Behavior::SineWave(wave) => wave.set_period(args[0]),
        Behavior::ThreePhaseSineWave(wave) => wave.wave_mut().set_period(args[0]),
        Behavior::Throb(throb) => throb.set_period(args[0]),
        _ => return Err(mismatch(id, "set_period")),
    }
    Ok(())
}

fn set_direction(effect: &mut Effect, args: &[f32]) -> Result<()> {
    let direction = i32::try_from(to_integer("direction", args[0])?)
        .map_err(|_| Error::invalid_option("direction", "out of range"))?;
    let id = effect.id();
    match effect.behavior_mut() {
        Behavior::SineWave(wave) => wave.set_direction(direction),
        Behavior::ThreePhaseSineWave(wave) => wave.wave_mut().set_direction(direction),
        _ => Err(mismatch(id, "set_direction")),
    }
}

fn set_size(effect: &mut Effect, args: &[f32]) -> Result<()> {
    let size = usize::try_from(to_integer("size", args[0])?)
        .map_err(|_| Error::invalid_option("size", "must not be negative"))?;
    let set = effect.bead_set().clone();
    let id = effect.id();
    match effect.behavior_mut() {
        Behavior::Sparkle(sparkle) => sparkle.set_size(size, &set),
        _ => Err(mismatch(id, "set_size")),
    }
}

fn set_speed(effect: &mut Effect, args: &[f32]) -> Result<()> {
    let speed = ticks("speed", args[0])?;
    let id = effect.id();
    match effect.behavior_mut() {
        Behavior::Sparkle(sparkle) => {
            sparkle.set_speed(speed);
            Ok(())
        }
        _ => Err(mismatch(id, "set_speed")),
    }
}

/// Detached effects report as id 0, which the mainloop never hands out.
fn mismatch(id: Option<EffectId>, method: &str) -> Error {
    Error::UnknownMethod {
        id: id.unwrap_or(EffectId(0)),
        method: method.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beads::BeadRing;
    use crate::color::tests::nearly_equal;
    use crate::effects::{EffectOptions, Sparkle, Throb};

    fn effect(behavior: Behavior, ring: &BeadRing) -> Effect {
        let options = EffectOptions {
            beads: ring.named("quadrant0").unwrap().clone(),
            ..Default::default()
        };
        let mut effect = Effect::new(behavior, options, ring).unwrap();
        effect.attach(EffectId(7)).unwrap();
        effect
    }

    fn names(effect: &Effect) -> Vec<&'static str> {
        methods(effect).map(|method| method.name).collect()
    }

    #[test]
    fn every_effect_exposes_common_methods() {
        let ring = BeadRing::new(60);
        let throb = effect(Behavior::Throb(Throb::default()), &ring);
        assert_eq!(
            names(&throb),
            vec![
                "set_color",
                "set_hue",
                "set_duration",
                "set_delay",
                "fade_out",
                "set_period"
            ]
        );
        let sparkle = effect(Behavior::Sparkle(Sparkle::default()), &ring);
        assert!(lookup(&sparkle, "set_size").is_some());
        assert!(lookup(&throb, "set_size").is_none());
    }

    #[test]
    fn set_color_and_duration() {
        let ring = BeadRing::new(60);
        let mut throb = effect(Behavior::Throb(Throb::default()), &ring);
        invoke(&mut throb, "set_color", &[0.0, 0.5, 1.0]).unwrap();
        assert_eq!(throb.color().current(), Color::rgb(0.0, 0.5, 1.0));
        invoke(&mut throb, "set_duration", &[40.0]).unwrap();
        assert_eq!(throb.duration(), Some(40));
        invoke(&mut throb, "fade_out", &[10.0]).unwrap();
        assert_eq!(throb.duration(), Some(10));
    }

    #[test]
    fn set_hue_goes_through_hsv() {
        let ring = BeadRing::new(60);
        let mut throb = effect(Behavior::Throb(Throb::default()), &ring);
        invoke(&mut throb, "set_hue", &[1.0 / 3.0, 1.0]).unwrap();
        let color = throb.color().current();
        assert!(nearly_equal(color.g, 1.0, 0.001));
        assert!(nearly_equal(color.r, 0.0, 0.001));
    }

    #[test]
    fn sparkle_size_is_checked_against_the_set() {
        let ring = BeadRing::new(60);
        let mut sparkle = effect(Behavior::Sparkle(Sparkle::default()), &ring);
        invoke(&mut sparkle, "set_size", &[14.0]).unwrap();
        assert_eq!(
            invoke(&mut sparkle, "set_size", &[15.0]),
            Err(Error::SampleTooLarge {
                size: 15,
                available: 14
            })
        );
    }

    #[test]
    fn unknown_method_and_bad_arguments() {
        let ring = BeadRing::new(60);
        let mut throb = effect(Behavior::Throb(Throb::default()), &ring);
        assert_eq!(
            invoke(&mut throb, "explode", &[]),
            Err(Error::UnknownMethod {
                id: EffectId(7),
                method: "explode".to_string()
            })
        );
        assert_eq!(
            invoke(&mut throb, "set_color", &[1.0]),
            Err(Error::BadArguments {
                method: "set_color".to_string(),
                expected: 3,
                got: 1
            })
        );
        assert!(invoke(&mut throb, "set_duration", &[2.5]).is_err());
        assert!(invoke(&mut throb, "set_delay", &[-1.0]).is_err());
    }
}
