//! Field layouts of the known vox format revisions.
//!
//! Older charts store effects and FX hold assignments differently. The layout is selected
//! once from `#FORMAT VERSION`, so the parser only asks the [`Revision`] how to read a line.

/// How `#FXBUTTON EFFECT INFO` lines map to effect slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxEffectLayout {
    /// Line `k` of the section defines slot `k - 1`.
    Sequential,
    /// Blocks of three lines define one slot each. The second line overrides the first and
    /// the third is ignored.
    Blocks,
}

impl FxEffectLayout {
    /// The slot defined by the 1-based section line `line`, if any.
    #[must_use]
    pub const fn slot_of_line(self, line: usize) -> Option<usize> {
        match self {
            Self::Sequential => line.checked_sub(1),
            Self::Blocks => match line.checked_sub(1) {
                Some(index) if index % 3 < 2 => Some(line / 3),
                _ => None,
            },
        }
    }
}

/// Where an FX hold names its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxHoldSource {
    /// Field 3 holds a legacy sound id or a name given by a `define` statement.
    LegacySoundId,
    /// Field 2 holds the effect slot offset by 2.
    EffectIndex,
}

/// The layout decisions of one format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision {
    /// Layout of `#FXBUTTON EFFECT INFO`.
    pub fx_effect_layout: FxEffectLayout,
    /// Where FX holds name their effect.
    pub fx_hold_source: FxHoldSource,
    /// Whether field 2 of an FX chip names a chip sound.
    pub fx_chip_sounds: bool,
}

/// Revisions sorted by the first version they apply to.
const REVISIONS: [(u32, Revision); 4] = [
    (
        0,
        Revision {
            fx_effect_layout: FxEffectLayout::Sequential,
            fx_hold_source: FxHoldSource::LegacySoundId,
            fx_chip_sounds: false,
        },
    ),
    (
        4,
        Revision {
            fx_effect_layout: FxEffectLayout::Sequential,
            fx_hold_source: FxHoldSource::EffectIndex,
            fx_chip_sounds: false,
        },
    ),
    (
        6,
        Revision {
            fx_effect_layout: FxEffectLayout::Blocks,
            fx_hold_source: FxHoldSource::EffectIndex,
            fx_chip_sounds: false,
        },
    ),
    (
        9,
        Revision {
            fx_effect_layout: FxEffectLayout::Blocks,
            fx_hold_source: FxHoldSource::EffectIndex,
            fx_chip_sounds: true,
        },
    ),
];

impl Revision {
    /// Selects the revision of a format version.
    #[must_use]
    pub fn for_version(version: u32) -> Self {
        REVISIONS
            .iter()
            .rev()
            .find(|(first, _)| version >= *first)
            .map_or(REVISIONS[0].1, |(_, revision)| *revision)
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::for_version(0)
    }
}
