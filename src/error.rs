use thiserror::Error;

use crate::effects::EffectId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Configuration
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),
    #[error("Unknown bead set: {0}")]
    UnknownBeadSet(String),
    #[error("Effect {effect} has no option {option}")]
    UnknownOption { effect: String, option: String },
    #[error("Invalid value for {option}: {reason}")]
    InvalidOption { option: String, reason: String },
    #[error("Bead {index} out of range, ring has {count} beads")]
    BeadOutOfRange { index: usize, count: usize },
    #[error("Cannot sample {size} beads from a set of {available}")]
    SampleTooLarge { size: usize, available: usize },
    #[error("Fade needs at least one tick, got {0}")]
    InvalidFade(u32),

    // Lifecycle
    #[error("Effect is not attached to a mainloop")]
    NotAttached,
    #[error("Effect is already attached as {0}")]
    AlreadyAttached(EffectId),
    #[error("No effect with id {0}")]
    UnknownEffectId(EffectId),

    // Remote exposure
    #[error("Effect {id} does not expose {method}")]
    UnknownMethod { id: EffectId, method: String },
    #[error("{method} expects {expected} arguments, got {got}")]
    BadArguments {
        method: String,
        expected: usize,
        got: usize,
    },
}

impl Error {
    pub fn invalid_option(option: &str, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.to_string(),
            reason: reason.into(),
        }
    }
}
