use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::beads::{BeadRing, DEFAULT_BEAD_COUNT};
use crate::color::{Color, ColorFade, EffectColor};
use crate::effects::{EffectOptions, Orientation};
use crate::error::Result;
use crate::oscoutput::DEFAULT_PORT;
use crate::registry::Knobs;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display driver address.
    pub ip: String,
    pub port: u16,
    /// Where remote control messages arrive.
    pub listen: String,
    pub interval_ms: u64,
    pub bead_count: usize,
    pub background: Color,
    /// Effects attached before the first cycle.
    pub effects: Vec<EffectEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ip: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            listen: "0.0.0.0:8000".to_string(),
            interval_ms: 30,
            bead_count: DEFAULT_BEAD_COUNT,
            background: Color::BLACK,
            effects: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> std::result::Result<Config, String> {
        Config::from_config_file(path)
            .map_err(|err| format!("Cannot read {}: {}", path.display(), err))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FadeEntry {
    pub to: Color,
    pub ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectEntry {
    pub name: String,
    #[serde(default = "EffectEntry::all_beads")]
    pub beads: String,
    #[serde(default = "EffectEntry::white")]
    pub color: Color,
    /// Turns `color` into a fade towards this target.
    pub fade: Option<FadeEntry>,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub delay: u32,
    pub duration: Option<u32>,
    #[serde(default)]
    pub knobs: Knobs,
}

impl EffectEntry {
    fn all_beads() -> String {
        "all".to_string()
    }

    fn white() -> Color {
        Color::WHITE
    }

    pub fn options(&self, ring: &BeadRing) -> Result<EffectOptions> {
        let color = match &self.fade {
            Some(fade) => EffectColor::Fade(ColorFade::new(self.color, fade.to, fade.ticks)?),
            None => EffectColor::Solid(self.color),
        };

        Ok(EffectOptions {
            beads: ring.parse_set(&self.beads)?,
            color,
            orientation: self.orientation,
            delay: self.delay,
            duration: self.duration,
        })
    }
}
