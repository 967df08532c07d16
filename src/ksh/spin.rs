//! Spin annotations attached to slams with a roll.

use crate::vox::{
    model::{RollKind, SlamDirection},
    time::TimeSignature,
};

/// Length of the spin of `roll` in ticks, under `signature`.
#[must_use]
pub fn spin_length(roll: RollKind, signature: TimeSignature) -> u32 {
    let measure = f64::from(signature.ticks_per_measure());
    let length = match roll {
        RollKind::Measure => measure * 0.85,
        RollKind::HalfMeasure => measure / 2.95,
        RollKind::ThreeBeat | RollKind::Swing => measure * 0.62,
        RollKind::Cancer => measure * 2.0,
    };
    length as u32
}

/// The note line suffix of a slam in `direction` carrying `roll`, such as `@(163`.
#[must_use]
pub fn spin_suffix(roll: RollKind, direction: SlamDirection, signature: TimeSignature) -> String {
    let symbol = match (roll, direction) {
        (RollKind::Swing, SlamDirection::Left) => '<',
        (RollKind::Swing, SlamDirection::Right) => '>',
        (_, SlamDirection::Left) => '(',
        (_, SlamDirection::Right) => ')',
    };
    format!("@{symbol}{}", spin_length(roll, signature))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lengths_in_common_time() {
        let common = TimeSignature::COMMON;
        assert_eq!(spin_length(RollKind::Measure, common), 163);
        assert_eq!(spin_length(RollKind::HalfMeasure, common), 65);
        assert_eq!(spin_length(RollKind::ThreeBeat, common), 119);
        assert_eq!(spin_length(RollKind::Cancer, common), 384);
        assert_eq!(spin_length(RollKind::Swing, common), 119);
    }

    #[test]
    fn lengths_follow_signature() {
        let six_eight = TimeSignature::new(6, 8).unwrap();
        assert_eq!(spin_length(RollKind::Measure, six_eight), 122);
        assert_eq!(spin_length(RollKind::Cancer, six_eight), 288);
    }

    #[test]
    fn suffixes() {
        let common = TimeSignature::COMMON;
        assert_eq!(
            spin_suffix(RollKind::Measure, SlamDirection::Left, common),
            "@(163"
        );
        assert_eq!(
            spin_suffix(RollKind::Cancer, SlamDirection::Right, common),
            "@)384"
        );
        assert_eq!(
            spin_suffix(RollKind::Swing, SlamDirection::Left, common),
            "@<119"
        );
        assert_eq!(
            spin_suffix(RollKind::Swing, SlamDirection::Right, common),
            "@>119"
        );
    }
}
