//! Translation of vox effect encodings into [`EffectDefinition`]s.
//!
//! A line of `#FXBUTTON EFFECT INFO` is a type code followed by comma-separated numeric
//! fields. Each type code has its own formula deriving ksh parameters from the fields.
//! Charts before format version 4 instead name one of a few preset effects by a sound id in
//! a `define` statement.

use thiserror::Error;

use super::{
    BitCrusherParams, EchoParams, Effect, EffectDefinition, FlangerParams, GateParams,
    PhaserParams, PitchShiftParams, RetriggerParams, SideChainParams, TapeStopParams,
    WobbleParams,
};

/// An error occurred when translating a vox effect.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TranslateError {
    /// The type code is not one of the known effects.
    #[error("effect type {0:?} is not supported")]
    UnknownType(String),
    /// The line has fewer fields than the effect needs.
    #[error("effect type {code} needs field {index} but the line ends before it")]
    MissingField {
        /// The type code.
        code: u8,
        /// The 0-based field index after the type code.
        index: usize,
    },
    /// A field is not a number.
    #[error("effect type {code} field {index} is not a number: {text:?}")]
    InvalidNumber {
        /// The type code.
        code: u8,
        /// The 0-based field index after the type code.
        index: usize,
        /// The field as written.
        text: String,
    },
    /// A retrigger or echo has an update period of zero, which leaves its wave length
    /// undefined.
    #[error("effect type {code} has an update period of zero")]
    ZeroUpdatePeriod {
        /// The type code.
        code: u8,
    },
}

/// The fields after the type code.
struct Fields<'a> {
    code: u8,
    fields: &'a [&'a str],
}

impl Fields<'_> {
    fn text(&self, index: usize) -> Result<&str, TranslateError> {
        self.fields
            .get(index)
            .map(|field| field.trim())
            .ok_or(TranslateError::MissingField {
                code: self.code,
                index,
            })
    }

    fn float(&self, index: usize) -> Result<f64, TranslateError> {
        let text = self.text(index)?;
        text.parse().map_err(|_| TranslateError::InvalidNumber {
            code: self.code,
            index,
            text: text.to_string(),
        })
    }

    fn trunc(&self, index: usize) -> Result<i64, TranslateError> {
        self.float(index).map(trunc)
    }

    /// A fraction of 1 as a truncated percentage.
    fn percent(&self, index: usize) -> Result<i64, TranslateError> {
        self.float(index).map(|value| trunc(value * 100.0))
    }

    /// A value already in percent, truncated.
    fn percent_raw(&self, index: usize) -> Result<i64, TranslateError> {
        self.trunc(index)
    }
}

fn trunc(value: f64) -> i64 {
    value.trunc() as i64
}

/// Translates one `#FXBUTTON EFFECT INFO` line such as `1,\t8.00,\t95.00,...`.
///
/// Tabs are removed before splitting on commas. Fields past the ones an effect uses are
/// ignored.
///
/// # Errors
///
/// Fails when the type code is unknown, when a field the formula needs is missing, or when it
/// is not a number.
pub fn translate_effect_line(line: &str) -> Result<EffectDefinition, TranslateError> {
    let line = line.replace('\t', "");
    let mut fields = line.split(',');
    let code_text = fields.next().unwrap_or_default().trim();
    let code = code_text
        .parse::<u8>()
        .map_err(|_| TranslateError::UnknownType(code_text.to_string()))?;
    let fields: Vec<_> = fields.collect();
    translate_effect(code, &fields)
}

/// Translates the fields after the type `code` of an effect line.
///
/// # Errors
///
/// See [`translate_effect_line`].
pub fn translate_effect(code: u8, fields: &[&str]) -> Result<EffectDefinition, TranslateError> {
    let fields = Fields { code, fields };
    match code {
        1 => retrigger(&fields, false),
        2 => gate(&fields),
        3 => phaser(&fields),
        4 => tape_stop(&fields),
        5 => side_chain(&fields),
        6 => wobble(&fields),
        7 => bit_crusher(&fields),
        8 => retrigger(&fields, true),
        9 => pitch_shift(&fields),
        11 => lowpass(&fields),
        12 => flanger(&fields),
        _ => Err(TranslateError::UnknownType(code.to_string())),
    }
}

/// Fields: division, mix, update period, feedback, unused, rate.
///
/// A feedback other than 1 turns the retrigger into an echo. A negative update period gives
/// a wave length sixteen times finer with a fixed update period of 1/18.
fn retrigger(fields: &Fields, update_trigger: bool) -> Result<EffectDefinition, TranslateError> {
    let division = fields.float(0)?;
    let mix = fields.percent_raw(1)?;
    let update_period = fields.float(2)?;
    let feedback = fields.float(3)?;
    let is_echo = (feedback - 1.0).abs() > f64::EPSILON;
    let rate = fields.float(5)?;
    if update_trigger {
        fields.text(6)?;
    }
    if update_period.abs() < f64::EPSILON {
        return Err(TranslateError::ZeroUpdatePeriod { code: fields.code });
    }

    let wave_length = trunc(4.0 / update_period * division);
    let (main, update_period_denominator, rate) = if update_period > 0.0 {
        (
            wave_length,
            trunc(update_period),
            Some(trunc((1.0 - rate) * 100.0)),
        )
    } else {
        (wave_length.saturating_mul(16), 18, None)
    };

    let effect = if is_echo {
        Effect::Echo(EchoParams {
            feedback_level: Some(fields.percent(3)?),
            wave_length: Some(main),
            update_period: Some(update_period_denominator),
            mix: Some(mix),
            update_trigger,
        })
    } else {
        Effect::Retrigger(RetriggerParams {
            wave_length: Some(main),
            update_period: Some(update_period_denominator),
            rate,
            mix: Some(mix),
            update_trigger,
        })
    };
    Ok(EffectDefinition::new(effect, Some(main.to_string())))
}

/// Fields: mix, division 1, division 2.
fn gate(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let mix = fields.percent_raw(0)?;
    let wave_length = trunc(2.0 / fields.float(2)? * fields.float(1)?);
    Ok(EffectDefinition::new(
        Effect::Gate(GateParams {
            wave_length: Some(wave_length),
            mix: Some(mix),
        }),
        Some(wave_length.to_string()),
    ))
}

/// Fields: mix, period, feedback, stereo width, high cut gain.
fn phaser(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let period = fields.trunc(1)?;
    Ok(EffectDefinition::new(
        Effect::Phaser(PhaserParams {
            period: Some(period),
            feedback: Some(fields.percent(2)?),
            stereo_width: Some(fields.percent_raw(3)?),
            hi_cut_gain: Some(-fields.trunc(4)?),
            mix: Some(fields.percent_raw(0)?),
        }),
        Some(period.to_string()),
    ))
}

/// Fields: mix and two unused ones. The speed is replaced per hold.
fn tape_stop(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    Ok(EffectDefinition::new(
        Effect::TapeStop(TapeStopParams {
            speed: Some(69),
            mix: Some(fields.percent_raw(0)?),
        }),
        Some("69"),
    ))
}

/// Fields: mix (unused), period, hold, attack, release.
fn side_chain(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let period = trunc(fields.float(1)? * 2.0);
    Ok(EffectDefinition::new(
        Effect::SideChain(SideChainParams {
            period: Some(period),
            hold_time: Some(fields.trunc(2)?),
            attack_time: Some(fields.trunc(3)?),
            release_time: Some(fields.trunc(4)?),
        }),
        Some(period.to_string()),
    ))
}

/// Fields: two unused, mix, low frequency, high frequency, wave length, resonance.
fn wobble(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let wave_length = trunc(fields.float(5)? * 4.0);
    Ok(EffectDefinition::new(
        Effect::Wobble(WobbleParams {
            wave_length: Some(wave_length),
            lo_freq: Some(fields.trunc(3)?),
            hi_freq: Some(fields.trunc(4)?),
            q: Some(fields.float(6)?),
            mix: Some(fields.percent_raw(2)?),
        }),
        Some(wave_length.to_string()),
    ))
}

/// Fields: mix, sample reduction.
fn bit_crusher(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let samples = fields.text(1)?;
    fields.float(1)?;
    Ok(EffectDefinition::new(
        Effect::BitCrusher(BitCrusherParams {
            reduction: Some(samples.to_string()),
            mix: Some(fields.percent_raw(0)?),
        }),
        Some(samples),
    ))
}

/// Fields: mix, pitch.
fn pitch_shift(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let pitch = fields.trunc(1)?;
    Ok(EffectDefinition::new(
        Effect::PitchShift(PitchShiftParams {
            pitch: Some(pitch),
            mix: Some(fields.percent_raw(0)?),
        }),
        Some(pitch.to_string()),
    ))
}

/// Fields: two unused, cutoff frequency, unused. A wobble pinned to one frequency.
fn lowpass(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let frequency = fields.trunc(2)?;
    Ok(EffectDefinition::new(
        Effect::Wobble(WobbleParams {
            lo_freq: Some(frequency),
            hi_freq: Some(frequency),
            ..WobbleParams::default()
        }),
        Some("1"),
    ))
}

/// Fields: mix, delay samples, depth, period.
fn flanger(fields: &Fields) -> Result<EffectDefinition, TranslateError> {
    let main = fields.trunc(1)? as f64 / 10.0;
    let depth = fields.text(2)?;
    fields.float(2)?;
    Ok(EffectDefinition::new(
        Effect::Flanger(FlangerParams {
            depth: Some(depth.to_string()),
            period: Some(fields.trunc(3)?),
            mix: Some(fields.percent_raw(0)?),
        }),
        Some(format!("{main:?}")),
    ))
}

/// Translates the sound id of a `define` statement in charts before format version 4.
///
/// Ids above 8 are unknown, and every id without a preset maps to the fallback. Returns the
/// definition and whether the id was unknown.
#[must_use]
pub fn translate_legacy_sound_id(sound_id: i32) -> (EffectDefinition, bool) {
    let preset = |effect: Effect, main: &str| (EffectDefinition::new(effect, Some(main)), false);
    match sound_id {
        2 => preset(Effect::Retrigger(RetriggerParams::default()), "8"),
        3 => preset(Effect::Retrigger(RetriggerParams::default()), "16"),
        4 => preset(Effect::Gate(GateParams::default()), "16"),
        5 => preset(Effect::Flanger(FlangerParams::default()), "200"),
        6 => preset(Effect::Retrigger(RetriggerParams::default()), "32"),
        7 => preset(Effect::Gate(GateParams::default()), "8"),
        8 => preset(Effect::PitchShift(PitchShiftParams::default()), "8"),
        id => (EffectDefinition::fallback(), id > 8),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::effect::EffectKind;

    #[test]
    fn line_strips_tabs_and_extra_fields() {
        let definition =
            translate_effect_line("2,\t98.00,\t8,\t1.00,\t0.00,\t0.00").unwrap();
        assert_eq!(definition.kind(), EffectKind::Gate);
        assert_eq!(definition.main_param.as_deref(), Some("16"));
    }

    #[test]
    fn unknown_and_malformed_lines() {
        assert_eq!(
            translate_effect_line("10,\t1.00"),
            Err(TranslateError::UnknownType("10".to_string()))
        );
        assert_eq!(
            translate_effect_line("x,\t1.00"),
            Err(TranslateError::UnknownType("x".to_string()))
        );
        assert_eq!(
            translate_effect_line("2,\t98.00"),
            Err(TranslateError::MissingField { code: 2, index: 2 })
        );
        assert!(matches!(
            translate_effect_line("2,\tloud,\t8,\t1.00"),
            Err(TranslateError::InvalidNumber { code: 2, index: 0, .. })
        ));
    }

    #[test]
    fn retrigger_with_negative_update_period() {
        let definition = translate_effect(1, &["2", "100", "-1", "1.0", "0", "0.7"]).unwrap();
        assert_eq!(definition.main_param.as_deref(), Some("-128"));
        assert_eq!(
            definition.define_line(0),
            "#define_fx 0 type=Retrigger;waveLength=1/-128;updatePeriod=1/18;mix=0%>100%"
        );
    }

    #[test]
    fn retrigger_with_zero_update_period() {
        assert_eq!(
            translate_effect(8, &["0.5", "100", "0.00", "1.0", "0", "0.7", "1"]),
            Err(TranslateError::ZeroUpdatePeriod { code: 8 })
        );
    }

    #[test]
    fn legacy_sound_ids() {
        let (retrigger, unknown) = translate_legacy_sound_id(3);
        assert!(!unknown);
        assert_eq!(retrigger.kind(), EffectKind::Retrigger);
        assert_eq!(retrigger.fx_change(3, 10), "3;16");

        let (fallback, unknown) = translate_legacy_sound_id(1);
        assert!(!unknown);
        assert_eq!(fallback, EffectDefinition::fallback());

        let (fallback, unknown) = translate_legacy_sound_id(20);
        assert!(unknown);
        assert_eq!(fallback, EffectDefinition::fallback());
    }
}
