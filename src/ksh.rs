//! Output in the ksh chart format.
//!
//! A ksh chart is a header of `key=value` lines, a `--` separator, and a body with one line
//! per tick. Each measure of the body ends with `--`, and `#define_fx` lines after the last
//! measure define the effects used by FX holds.
//!
//! - [`header`] builds the header block.
//! - [`line`] formats one tick.
//! - [`spin`] computes spin annotations of slams.
//! - [`relocate`] moves laser nodes that would be read as slams.
//! - [`render`] walks the timeline of a chart tick by tick.

use thiserror::Error;

use crate::vox::{model::LaserSide, time::Timing};

pub mod header;
pub mod line;
pub mod relocate;
pub mod render;
pub mod spin;

pub use self::{
    header::{AssetInfo, KshHeader},
    render::render_ksh,
};

/// The `ver` written in the header.
pub const KSH_FORMAT_VERSION: u32 = 167;
/// Gain of the laser filter in percent, written as `pfiltergain`.
pub const DEFAULT_FILTER_GAIN: u32 = 50;
/// Volume of slam sounds in percent, written as `chokkakuvol`.
pub const DEFAULT_SLAM_VOLUME: u32 = 40;
/// Ticks between the start and the end glyph of a slam.
pub const SLAM_TICKS: u32 = 4;
/// Volume of FX chip sounds in percent.
pub const FX_CHIP_SOUND_VOLUME: u32 = 27;
/// File extension of FX chip sounds.
pub const FX_CHIP_SOUND_EXTENSION: &str = ".wav";

/// Options of the ksh output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Start of the song preview in seconds, written as `po` in milliseconds.
    pub hidden_preview_position: u32,
    /// Whether FX chips play their chip sounds.
    pub chip_sounds: bool,
}

impl RenderConfig {
    /// The default options: preview from the start, chip sounds enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hidden_preview_position: 0,
            chip_sounds: true,
        }
    }

    /// Sets the start of the song preview in seconds.
    #[must_use]
    pub const fn with_hidden_preview_position(mut self, seconds: u32) -> Self {
        self.hidden_preview_position = seconds;
        self
    }

    /// Enables or disables FX chip sounds.
    #[must_use]
    pub const fn with_chip_sounds(mut self, chip_sounds: bool) -> Self {
        self.chip_sounds = chip_sounds;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An error which makes a chart impossible to write in ksh.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertError {
    /// ksh can only change the time signature at the start of a measure.
    #[error("time signature change at {timing} is not at the start of a measure")]
    MidMeasureTimeSignature {
        /// Where the change is.
        timing: Timing,
    },
    /// A laser node appeared on a side while a slam there was still resolving.
    #[error("laser node at {timing} interrupts a slam on the {side:?} side")]
    SlamInterrupted {
        /// Where the node is.
        timing: Timing,
        /// The side of the slam.
        side: LaserSide,
    },
}
