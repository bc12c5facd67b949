use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::network::{Polarity, Role};
use crate::util::stable_hash;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NodeColoring {
    #[default]
    Role,
    /// Sign of the summed weight of the cell's outgoing synapses.
    Polarity,
    /// Stable pseudo-random color per cell id.
    Hashed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub input: Color32,
    pub interior: Color32,
    pub output: Color32,
    pub excitatory: Color32,
    pub inhibitory: Color32,
    pub neutral: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            input: Color32::WHITE,
            interior: Color32::from_rgb(0x44, 0x44, 0x44),
            output: Color32::from_rgb(0x07, 0x75, 0xff),
            excitatory: Color32::from_rgb(0x00, 0xff, 0x2d),
            inhibitory: Color32::from_rgb(0xa6, 0x2a, 0x2a),
            neutral: Color32::from_rgb(0x88, 0x88, 0x88),
        }
    }
}

impl Palette {
    pub fn role(&self, role: Role) -> Color32 {
        match role {
            Role::Input => self.input,
            Role::Interior => self.interior,
            Role::Output => self.output,
        }
    }

    pub fn polarity(&self, polarity: Polarity) -> Color32 {
        match polarity {
            Polarity::Excitatory => self.excitatory,
            Polarity::Inhibitory => self.inhibitory,
            Polarity::Neutral => self.neutral,
        }
    }
}

pub fn hashed_color(id: &str) -> Color32 {
    let hash = stable_hash(id);
    let channel = |shift: u32| 64 + (((hash >> shift) & 0xff) as u8 / 4) * 3;
    Color32::from_rgb(channel(0), channel(8), channel(16))
}

pub fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
