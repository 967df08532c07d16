//! Effect definitions of ksh charts.
//!
//! An FX hold in ksh triggers an effect defined once at the end of the chart by a
//! `#define_fx` line. Each kind of effect takes its own named parameters, so [`Effect`] has
//! one variant per kind, each carrying a record of the parameters it can set. A parameter
//! left as `None` is not written and the player uses its default.
//!
//! The conversion from vox encodings lives in [`translate`].

use std::fmt;

use itertools::Itertools;

pub mod translate;

/// Name of the slot holding the fallback effect.
pub const EFFECT_FALLBACK_NAME: &str = "fallback";

/// Kind of a ksh effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// `Retrigger`
    Retrigger,
    /// `Gate`
    Gate,
    /// `Flanger`
    Flanger,
    /// `BitCrusher`
    BitCrusher,
    /// `Phaser`
    Phaser,
    /// `Wobble`
    Wobble,
    /// `PitchShift`
    PitchShift,
    /// `TapeStop`
    TapeStop,
    /// `Echo`
    Echo,
    /// `SideChain`
    SideChain,
}

impl EffectKind {
    /// The `type` value of a `#define_fx` line.
    #[must_use]
    pub const fn ksh_name(self) -> &'static str {
        match self {
            Self::Retrigger => "Retrigger",
            Self::Gate => "Gate",
            Self::Flanger => "Flanger",
            Self::BitCrusher => "BitCrusher",
            Self::Phaser => "Phaser",
            Self::Wobble => "Wobble",
            Self::PitchShift => "PitchShift",
            Self::TapeStop => "TapeStop",
            Self::Echo => "Echo",
            Self::SideChain => "SideChain",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ksh_name())
    }
}

/// Parameters of [`Effect::Retrigger`]. Fractions are stored as their denominators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetriggerParams {
    /// `waveLength=1/n`
    pub wave_length: Option<i64>,
    /// `updatePeriod=1/n`
    pub update_period: Option<i64>,
    /// `rate=n%`
    pub rate: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
    /// `updateTrigger=off>on`
    pub update_trigger: bool,
}

/// Parameters of [`Effect::Echo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EchoParams {
    /// `feedbackLevel=n%`
    pub feedback_level: Option<i64>,
    /// `waveLength=1/n`
    pub wave_length: Option<i64>,
    /// `updatePeriod=1/n`
    pub update_period: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
    /// `updateTrigger=off>on`
    pub update_trigger: bool,
}

/// Parameters of [`Effect::Gate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GateParams {
    /// `waveLength=1/n`
    pub wave_length: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::Flanger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlangerParams {
    /// `depth=<n>samples`, kept as written in the source
    pub depth: Option<String>,
    /// `period=1/n`
    pub period: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::BitCrusher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitCrusherParams {
    /// `reduction=<n>samples`, kept as written in the source
    pub reduction: Option<String>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::Phaser`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaserParams {
    /// `period=1/n`
    pub period: Option<i64>,
    /// `feedback=n%`
    pub feedback: Option<i64>,
    /// `stereoWidth=n%`
    pub stereo_width: Option<i64>,
    /// `hiCutGain=<n>dB`
    pub hi_cut_gain: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::Wobble`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WobbleParams {
    /// `waveLength=1/n`
    pub wave_length: Option<i64>,
    /// `loFreq=<n>Hz`
    pub lo_freq: Option<i64>,
    /// `hiFreq=<n>Hz`
    pub hi_freq: Option<i64>,
    /// `Q=<x>`
    pub q: Option<f64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::PitchShift`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchShiftParams {
    /// `pitch=n`
    pub pitch: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::TapeStop`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapeStopParams {
    /// `speed=n`
    pub speed: Option<i64>,
    /// `mix=n%`
    pub mix: Option<i64>,
}

/// Parameters of [`Effect::SideChain`]. Side chain takes no mix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideChainParams {
    /// `period=1/n`
    pub period: Option<i64>,
    /// `holdTime=<n>ms`
    pub hold_time: Option<i64>,
    /// `attackTime=<n>ms`
    pub attack_time: Option<i64>,
    /// `releaseTime=<n>ms`
    pub release_time: Option<i64>,
}

/// An effect with its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    /// Repeats a slice of the audio.
    Retrigger(RetriggerParams),
    /// Chops the audio.
    Gate(GateParams),
    /// Flanger.
    Flanger(FlangerParams),
    /// Reduces the sample rate.
    BitCrusher(BitCrusherParams),
    /// Phaser.
    Phaser(PhaserParams),
    /// Sweeps a filter.
    Wobble(WobbleParams),
    /// Shifts the pitch.
    PitchShift(PitchShiftParams),
    /// Slows the audio down to a stop.
    TapeStop(TapeStopParams),
    /// Repeats the audio with feedback.
    Echo(EchoParams),
    /// Ducks the audio periodically.
    SideChain(SideChainParams),
}

fn fraction(value: i64) -> String {
    format!("1/{value}")
}

fn percent(value: i64) -> String {
    format!("{value}%")
}

impl Effect {
    /// The kind of the effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Retrigger(_) => EffectKind::Retrigger,
            Self::Gate(_) => EffectKind::Gate,
            Self::Flanger(_) => EffectKind::Flanger,
            Self::BitCrusher(_) => EffectKind::BitCrusher,
            Self::Phaser(_) => EffectKind::Phaser,
            Self::Wobble(_) => EffectKind::Wobble,
            Self::PitchShift(_) => EffectKind::PitchShift,
            Self::TapeStop(_) => EffectKind::TapeStop,
            Self::Echo(_) => EffectKind::Echo,
            Self::SideChain(_) => EffectKind::SideChain,
        }
    }

    /// The parameters which are set, as ksh names and values in definition order.
    #[must_use]
    pub fn named_parameters(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((name, value));
            }
        };
        match self {
            Self::Retrigger(p) => {
                push("waveLength", p.wave_length.map(fraction));
                push("updatePeriod", p.update_period.map(fraction));
                push("rate", p.rate.map(percent));
                push("mix", p.mix.map(percent));
                push(
                    "updateTrigger",
                    p.update_trigger.then(|| "off>on".to_string()),
                );
            }
            Self::Echo(p) => {
                push("feedbackLevel", p.feedback_level.map(percent));
                push("waveLength", p.wave_length.map(fraction));
                push("updatePeriod", p.update_period.map(fraction));
                push("mix", p.mix.map(percent));
                push(
                    "updateTrigger",
                    p.update_trigger.then(|| "off>on".to_string()),
                );
            }
            Self::Gate(p) => {
                push("waveLength", p.wave_length.map(fraction));
                push("mix", p.mix.map(percent));
            }
            Self::Flanger(p) => {
                push("depth", p.depth.as_ref().map(|d| format!("{d}samples")));
                push("period", p.period.map(fraction));
                push("mix", p.mix.map(percent));
            }
            Self::BitCrusher(p) => {
                push(
                    "reduction",
                    p.reduction.as_ref().map(|r| format!("{r}samples")),
                );
                push("mix", p.mix.map(percent));
            }
            Self::Phaser(p) => {
                push("period", p.period.map(fraction));
                push("feedback", p.feedback.map(percent));
                push("stereoWidth", p.stereo_width.map(percent));
                push("hiCutGain", p.hi_cut_gain.map(|g| format!("{g}dB")));
                push("mix", p.mix.map(percent));
            }
            Self::Wobble(p) => {
                push("waveLength", p.wave_length.map(fraction));
                push("loFreq", p.lo_freq.map(|f| format!("{f}Hz")));
                push("hiFreq", p.hi_freq.map(|f| format!("{f}Hz")));
                push("Q", p.q.map(|q| format!("{q:?}")));
                push("mix", p.mix.map(percent));
            }
            Self::PitchShift(p) => {
                push("pitch", p.pitch.map(|v| v.to_string()));
                push("mix", p.mix.map(percent));
            }
            Self::TapeStop(p) => {
                push("speed", p.speed.map(|v| v.to_string()));
                push("mix", p.mix.map(percent));
            }
            Self::SideChain(p) => {
                push("period", p.period.map(fraction));
                push("holdTime", p.hold_time.map(|t| format!("{t}ms")));
                push("attackTime", p.attack_time.map(|t| format!("{t}ms")));
                push("releaseTime", p.release_time.map(|t| format!("{t}ms")));
            }
        }
        params
    }
}

/// An effect assigned to a slot, with the main parameter passed on each FX hold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    /// The effect.
    pub effect: Effect,
    /// Value appended to the effect name when an FX hold starts.
    pub main_param: Option<String>,
}

impl EffectDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(effect: Effect, main_param: Option<impl Into<String>>) -> Self {
        Self {
            effect,
            main_param: main_param.map(Into::into),
        }
    }

    /// The definition used whenever a slot cannot be resolved: a flanger of depth 200.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(
            Effect::Flanger(FlangerParams {
                depth: Some("200".to_string()),
                ..FlangerParams::default()
            }),
            Some("200"),
        )
    }

    /// The kind of the effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.effect.kind()
    }

    /// The `#define_fx` line defining this effect under `slot`.
    ///
    /// `mix` is written as a transition from `0%`, so the effect is silent until an FX hold
    /// assigned to it starts.
    #[must_use]
    pub fn define_line(&self, slot: impl fmt::Display) -> String {
        let params = self
            .effect
            .named_parameters()
            .into_iter()
            .map(|(name, value)| match name {
                "mix" => format!("{name}=0%>{value}"),
                _ => format!("{name}={value}"),
            });
        std::iter::once(format!("#define_fx {slot} type={}", self.kind()))
            .chain(params)
            .join(";")
    }

    /// The value of an `fx-l`/`fx-r` option starting a hold of `duration` ticks on `slot`.
    ///
    /// Tape stops scale their speed with the hold length.
    #[must_use]
    pub fn fx_change(&self, slot: impl fmt::Display, duration: u32) -> String {
        if self.kind() == EffectKind::TapeStop {
            return format!("{slot};{}", 2500 / (u64::from(duration) + 10));
        }
        match &self.main_param {
            Some(main) => format!("{slot};{main}"),
            None => slot.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fallback_lines() {
        let fallback = EffectDefinition::fallback();
        assert_eq!(
            fallback.define_line(EFFECT_FALLBACK_NAME),
            "#define_fx fallback type=Flanger;depth=200samples"
        );
        assert_eq!(fallback.fx_change(EFFECT_FALLBACK_NAME, 96), "fallback;200");
    }

    #[test]
    fn mix_starts_from_zero() {
        let gate = EffectDefinition::new(
            Effect::Gate(GateParams {
                wave_length: Some(8),
                mix: Some(90),
            }),
            Some("8"),
        );
        assert_eq!(
            gate.define_line(3),
            "#define_fx 3 type=Gate;waveLength=1/8;mix=0%>90%"
        );
        assert_eq!(gate.fx_change(3, 10), "3;8");
    }

    #[test]
    fn tape_stop_scales_with_duration() {
        let stop = EffectDefinition::new(
            Effect::TapeStop(TapeStopParams {
                speed: Some(69),
                mix: Some(100),
            }),
            Some("69"),
        );
        assert_eq!(stop.fx_change(0, 90), "0;25");
        assert_eq!(stop.fx_change(0, 0), "0;250");
    }

    #[test]
    fn no_main_param() {
        let side_chain = EffectDefinition::new(
            Effect::SideChain(SideChainParams::default()),
            None::<String>,
        );
        assert_eq!(side_chain.fx_change(1, 48), "1");
        assert_eq!(side_chain.define_line(1), "#define_fx 1 type=SideChain");
    }
}
