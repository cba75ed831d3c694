use crate::effects::{Canvas, LightingEffect, Progress};
use crate::error::Result;

pub const NAME: &str = "set_color";

/// Paints every bead once and is done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticColor;

impl LightingEffect for StaticColor {
    fn step(&mut self, canvas: &mut Canvas) -> Result<Progress> {
        for &index in canvas.beads {
            *canvas.ring.color_mut(index)? = canvas.color;
        }
        Ok(Progress::Finished)
    }
}
