//! The vox chart format.
//!
//! A vox file is line-oriented text in Shift_JIS, split into `#SECTION` blocks closed by
//! `#END`. Each timed line starts with a `measure,beat,tick` timing followed by
//! tab-separated fields whose meaning depends on the section and on the format version.
//!
//! - [`time`] defines [`time::Timing`] and [`time::TimeSignature`].
//! - [`timeline`] defines the event store the parser fills.
//! - [`model`] defines notes, lasers, and camera nodes.
//! - [`lex`] classifies the physical lines.
//! - [`revision`] describes the field layouts of the known format versions.
//! - [`validity`] checks sections expected to be constant.
//! - [`parse`] runs the section state machine.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use encoding_rs::{SHIFT_JIS, UTF_8};

use crate::effect::EffectDefinition;

use self::{model::EffectRef, time::Timing, timeline::Timeline};

pub mod lex;
pub mod model;
pub mod parse;
pub mod revision;
pub mod time;
pub mod timeline;
pub mod validity;

pub use self::parse::{ParseError, VoxParseOutput, parse_vox, parse_vox_with_sink};

/// A parsed vox chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vox {
    /// The `#FORMAT VERSION`, or 0 if absent.
    pub version: u32,
    /// All timed events.
    pub timeline: Timeline,
    /// Effect definitions by slot.
    pub effects: BTreeMap<usize, EffectDefinition>,
    /// Names given by `define` statements.
    pub defines: HashMap<String, i32>,
    /// The `#END POSITION`.
    pub end: Timing,
    /// Chip sounds used by FX chips.
    pub required_chip_sounds: BTreeSet<u8>,
}

impl Vox {
    /// The definition an effect reference points at, if the slot is defined.
    #[must_use]
    pub fn effect(&self, effect: EffectRef) -> Option<&EffectDefinition> {
        match effect {
            EffectRef::Slot(slot) => self.effects.get(&slot),
            EffectRef::Fallback => None,
        }
    }
}

/// Decodes the bytes of a vox file, trying UTF-8 first then Shift_JIS.
#[must_use]
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }
    let (text, _, _) = SHIFT_JIS.decode(bytes);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_shift_jis() {
        let (bytes, _, _) = SHIFT_JIS.encode("#BPM\n\u{30c6}\u{30b9}\u{30c8}\n");
        assert_eq!(decode_source(&bytes), "#BPM\n\u{30c6}\u{30b9}\u{30c8}\n");
        assert_eq!(decode_source(b"#END\n"), "#END\n");
    }
}
