//! Definitions of musical time in vox charts.
//!
//! A position in a chart is a [`Timing`] of measure, beat and tick. How many ticks fit in a
//! beat depends on the [`TimeSignature`] in force, so every arithmetic operation takes one.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Ticks in one quarter-note beat.
pub const BASE_TICKS_PER_BEAT: u32 = 48;

/// An error occurred when reading a [`Timing`] or a [`TimeSignature`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimingError {
    /// The text did not consist of exactly three comma-separated components.
    #[error("expected `measure,beat,tick` but got {0:?}")]
    ComponentCount(String),
    /// A component was not an unsigned integer.
    #[error("timing component {0:?} is not a number")]
    InvalidNumber(String),
    /// The measure or the beat was 0, but they are 1-based.
    #[error("measure and beat must be greater than 0")]
    ZeroComponent,
    /// The beat exceeds the beats of the measure.
    #[error("beat {beat} is out of range for a measure of {top} beats")]
    BeatOutOfRange {
        /// The beat read.
        beat: u32,
        /// Beats in the measure.
        top: u32,
    },
    /// The tick exceeds the ticks of the beat.
    #[error("tick {tick} is out of range for a beat of {ticks_per_beat} ticks")]
    TickOutOfRange {
        /// The tick read.
        tick: u32,
        /// Ticks in the beat.
        ticks_per_beat: u32,
    },
    /// The time signature cannot be expressed in ticks.
    #[error("invalid time signature {top}/{bottom}")]
    InvalidTimeSignature {
        /// Beats per measure.
        top: u32,
        /// Note value of one beat.
        bottom: u32,
    },
}

/// A time signature, `top` beats of a `1/bottom` note each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    top: u32,
    bottom: u32,
}

impl TimeSignature {
    /// The 4/4 signature.
    pub const COMMON: Self = Self { top: 4, bottom: 4 };

    /// Creates a time signature.
    ///
    /// The bottom must be a power of two that divides a whole note of
    /// `4 * BASE_TICKS_PER_BEAT` ticks, and the top must be positive.
    pub const fn new(top: u32, bottom: u32) -> Result<Self, TimingError> {
        if top == 0
            || bottom == 0
            || !bottom.is_power_of_two()
            || (4 * BASE_TICKS_PER_BEAT) % bottom != 0
        {
            return Err(TimingError::InvalidTimeSignature { top, bottom });
        }
        Ok(Self { top, bottom })
    }

    /// Beats per measure.
    #[must_use]
    pub const fn top(self) -> u32 {
        self.top
    }

    /// Note value of one beat.
    #[must_use]
    pub const fn bottom(self) -> u32 {
        self.bottom
    }

    /// Ticks in one beat.
    #[must_use]
    pub const fn ticks_per_beat(self) -> u32 {
        BASE_TICKS_PER_BEAT * 4 / self.bottom
    }

    /// Ticks in one measure.
    #[must_use]
    pub const fn ticks_per_measure(self) -> u32 {
        self.top * self.ticks_per_beat()
    }

    /// Ticks in a 32nd note.
    #[must_use]
    pub const fn thirty_second_ticks(self) -> u32 {
        4 * self.ticks_per_beat() / 32
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.bottom)
    }
}

/// A position in a chart.
///
/// Ordered by measure, then beat, then tick. The measure and the beat are 1-based, and the
/// tick is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timing {
    /// The measure, from 1.
    pub measure: u32,
    /// The beat in the measure, from 1.
    pub beat: u32,
    /// The tick in the beat, from 0.
    pub tick: u32,
}

impl Timing {
    /// The first tick of a chart.
    pub const START: Self = Self::new(1, 1, 0);

    /// Creates a new timing without any range checks.
    #[must_use]
    pub const fn new(measure: u32, beat: u32, tick: u32) -> Self {
        Self {
            measure,
            beat,
            tick,
        }
    }

    /// The first tick of `measure`.
    #[must_use]
    pub const fn measure_start(measure: u32) -> Self {
        Self::new(measure, 1, 0)
    }

    /// Reads `measure,beat,tick` and checks the beat and the tick against `signature`.
    pub fn parse(text: &str, signature: TimeSignature) -> Result<Self, TimingError> {
        let timing: Self = text.parse()?;
        if timing.beat > signature.top() {
            return Err(TimingError::BeatOutOfRange {
                beat: timing.beat,
                top: signature.top(),
            });
        }
        if timing.tick >= signature.ticks_per_beat() {
            return Err(TimingError::TickOutOfRange {
                tick: timing.tick,
                ticks_per_beat: signature.ticks_per_beat(),
            });
        }
        Ok(timing)
    }

    /// Whether this is the first tick of its measure.
    #[must_use]
    pub const fn is_measure_start(self) -> bool {
        self.beat == 1 && self.tick == 0
    }

    /// Signed distance in ticks from `other` to `self`, counted under one `signature`.
    #[must_use]
    pub fn diff(self, other: Self, signature: TimeSignature) -> i64 {
        let measures = i64::from(self.measure) - i64::from(other.measure);
        let beats = i64::from(self.beat) - i64::from(other.beat);
        let ticks = i64::from(self.tick) - i64::from(other.tick);
        measures * i64::from(signature.ticks_per_measure())
            + beats * i64::from(signature.ticks_per_beat())
            + ticks
    }

    /// The timing `ticks` later, carrying into beats and measures under `signature`.
    #[must_use]
    pub const fn advance(self, ticks: u32, signature: TimeSignature) -> Self {
        let ticks_per_beat = signature.ticks_per_beat();
        let total_ticks = self.tick + ticks;
        let beat = self.beat + total_ticks / ticks_per_beat;
        let tick = total_ticks % ticks_per_beat;
        let extra_measures = (beat - 1) / signature.top();
        Self {
            measure: self.measure + extra_measures,
            beat: (beat - 1) % signature.top() + 1,
            tick,
        }
    }
}

impl FromStr for Timing {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.trim().split(',').map(str::trim);
        let (Some(measure), Some(beat), Some(tick), None) = (
            components.next(),
            components.next(),
            components.next(),
            components.next(),
        ) else {
            return Err(TimingError::ComponentCount(s.to_string()));
        };
        let number = |component: &str| {
            component
                .parse::<u32>()
                .map_err(|_| TimingError::InvalidNumber(component.to_string()))
        };
        let timing = Self::new(number(measure)?, number(beat)?, number(tick)?);
        if timing.measure == 0 || timing.beat == 0 {
            return Err(TimingError::ZeroComponent);
        }
        Ok(timing)
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.measure, self.beat, self.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ticks() {
        let six_eight = TimeSignature::new(6, 8).unwrap();
        assert_eq!(six_eight.ticks_per_beat(), 24);
        assert_eq!(six_eight.ticks_per_measure(), 144);
        assert_eq!(six_eight.thirty_second_ticks(), 3);
        assert_eq!(TimeSignature::COMMON.thirty_second_ticks(), 6);
        assert!(TimeSignature::new(4, 3).is_err());
        assert!(TimeSignature::new(0, 4).is_err());
        assert!(TimeSignature::new(4, 256).is_err());
    }

    #[test]
    fn parse_accepts_leading_zeros() {
        assert_eq!(
            Timing::parse("001,02,00", TimeSignature::COMMON),
            Ok(Timing::new(1, 2, 0))
        );
        assert_eq!(
            Timing::parse(" 12, 4, 47 ", TimeSignature::COMMON),
            Ok(Timing::new(12, 4, 47))
        );
    }

    #[test]
    fn parse_checks_bounds_against_signature() {
        let six_eight = TimeSignature::new(6, 8).unwrap();
        assert_eq!(
            Timing::parse("1,1,30", six_eight),
            Err(TimingError::TickOutOfRange {
                tick: 30,
                ticks_per_beat: 24
            })
        );
        assert!(Timing::parse("1,1,30", TimeSignature::COMMON).is_ok());
        assert_eq!(
            Timing::parse("1,5,0", TimeSignature::COMMON),
            Err(TimingError::BeatOutOfRange { beat: 5, top: 4 })
        );
        assert_eq!(
            Timing::parse("0,1,0", TimeSignature::COMMON),
            Err(TimingError::ZeroComponent)
        );
        assert!(matches!(
            "1,1".parse::<Timing>(),
            Err(TimingError::ComponentCount(_))
        ));
        assert!(matches!(
            "1,x,0".parse::<Timing>(),
            Err(TimingError::InvalidNumber(_))
        ));
    }

    #[test]
    fn advance_carries() {
        let sig = TimeSignature::COMMON;
        assert_eq!(Timing::new(1, 1, 40).advance(10, sig), Timing::new(1, 2, 2));
        assert_eq!(Timing::new(1, 4, 47).advance(1, sig), Timing::new(2, 1, 0));
        assert_eq!(Timing::new(3, 2, 5).advance(192 * 2, sig), Timing::new(5, 2, 5));
    }

    #[test]
    fn diff_is_signed() {
        let sig = TimeSignature::COMMON;
        let a = Timing::new(2, 1, 0);
        let b = Timing::new(1, 4, 40);
        assert_eq!(a.diff(b, sig), 8);
        assert_eq!(b.diff(a, sig), -8);
    }

    #[test]
    fn ordering_follows_fields() {
        assert!(Timing::new(1, 4, 47) < Timing::new(2, 1, 0));
        assert!(Timing::new(2, 1, 1) > Timing::new(2, 1, 0));
    }
}
