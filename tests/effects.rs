use pretty_assertions::assert_eq;
use vox2ksh::prelude::*;

fn define(code: u8, fields: &[&str]) -> (String, Option<String>) {
    let definition = translate_effect(code, fields).expect("must be translated");
    (definition.define_line(0), definition.main_param)
}

#[test]
fn retrigger_and_echo() {
    assert_eq!(
        define(1, &["1", "80", "0.125", "1.0", "0", "0.5"]),
        (
            "#define_fx 0 type=Retrigger;waveLength=1/32;updatePeriod=1/0;rate=50%;mix=0%>80%"
                .to_string(),
            Some("32".to_string())
        )
    );
    assert_eq!(
        define(1, &["4", "100", "1", "0.6", "0", "0"]),
        (
            "#define_fx 0 type=Echo;feedbackLevel=60%;waveLength=1/16;updatePeriod=1/1;mix=0%>100%"
                .to_string(),
            Some("16".to_string())
        )
    );
    assert_eq!(
        define(8, &["2", "90", "1", "1.0", "0", "0.3", "1"]),
        (
            "#define_fx 0 type=Retrigger;waveLength=1/8;updatePeriod=1/1;rate=70%;mix=0%>90%;updateTrigger=off>on"
                .to_string(),
            Some("8".to_string())
        )
    );
}

#[test]
fn update_period_is_the_truncated_field() {
    assert_eq!(
        define(1, &["8", "95", "4.00", "1.00", "0", "0.70"]),
        (
            "#define_fx 0 type=Retrigger;waveLength=1/8;updatePeriod=1/4;rate=30%;mix=0%>95%"
                .to_string(),
            Some("8".to_string())
        )
    );
}

#[test]
fn non_positive_update_periods() {
    assert_eq!(
        define(1, &["2", "100", "-1", "0.5", "0", "0"]),
        (
            "#define_fx 0 type=Echo;feedbackLevel=50%;waveLength=1/-128;updatePeriod=1/18;mix=0%>100%"
                .to_string(),
            Some("-128".to_string())
        )
    );
    assert_eq!(
        translate_effect_line("1,	8.00,	95.00,	0.00,	1.00,	0.00,	0.70"),
        Err(TranslateError::ZeroUpdatePeriod { code: 1 })
    );
}

#[test]
fn update_trigger_needs_its_field() {
    assert_eq!(
        translate_effect(8, &["2", "90", "1", "1.0", "0", "0.3"]),
        Err(TranslateError::MissingField { code: 8, index: 6 })
    );
}

#[test]
fn filters_and_modulation() {
    assert_eq!(
        define(2, &["90", "4", "2"]).0,
        "#define_fx 0 type=Gate;waveLength=1/4;mix=0%>90%"
    );
    assert_eq!(
        define(3, &["100", "2", "0.5", "90", "5"]),
        (
            "#define_fx 0 type=Phaser;period=1/2;feedback=50%;stereoWidth=90%;hiCutGain=-5dB;mix=0%>100%"
                .to_string(),
            Some("2".to_string())
        )
    );
    assert_eq!(
        define(6, &["0", "0", "80", "500", "18000", "0.5", "1.4"]),
        (
            "#define_fx 0 type=Wobble;waveLength=1/2;loFreq=500Hz;hiFreq=18000Hz;Q=1.4;mix=0%>80%"
                .to_string(),
            Some("2".to_string())
        )
    );
    assert_eq!(
        define(11, &["0", "0", "800", "0"]),
        (
            "#define_fx 0 type=Wobble;loFreq=800Hz;hiFreq=800Hz".to_string(),
            Some("1".to_string())
        )
    );
    assert_eq!(
        define(12, &["80", "25", "40", "2"]),
        (
            "#define_fx 0 type=Flanger;depth=40samples;period=1/2;mix=0%>80%".to_string(),
            Some("2.5".to_string())
        )
    );
}

#[test]
fn signal_effects() {
    assert_eq!(
        define(5, &["90", "1.00", "45", "50", "60"]),
        (
            "#define_fx 0 type=SideChain;period=1/2;holdTime=45ms;attackTime=50ms;releaseTime=60ms"
                .to_string(),
            Some("2".to_string())
        )
    );
    assert_eq!(
        define(7, &["100", "12"]),
        (
            "#define_fx 0 type=BitCrusher;reduction=12samples;mix=0%>100%".to_string(),
            Some("12".to_string())
        )
    );
    assert_eq!(
        define(9, &["100", "12"]),
        (
            "#define_fx 0 type=PitchShift;pitch=12;mix=0%>100%".to_string(),
            Some("12".to_string())
        )
    );
}

#[test]
fn tape_stop_speed_follows_hold_length() {
    let tape_stop = translate_effect(4, &["100", "8", "1"]).expect("must be translated");
    assert_eq!(
        tape_stop.define_line(1),
        "#define_fx 1 type=TapeStop;speed=69;mix=0%>100%"
    );
    assert_eq!(tape_stop.fx_change(1, 40), "1;50");
    assert_eq!(tape_stop.fx_change(1, 0), "1;250");
}

#[test]
fn hold_changes_carry_main_parameter() {
    let flanger = translate_effect(12, &["80", "25", "40", "2"]).expect("must be translated");
    assert_eq!(flanger.fx_change(0, 10), "0;2.5");
    assert_eq!(
        EffectDefinition::fallback().fx_change(EFFECT_FALLBACK_NAME, 192),
        "fallback;200"
    );
}

#[test]
fn effect_lines_from_charts() {
    let definition =
        translate_effect_line("6,\t0.00,\t0.00,\t100.00,\t300.00,\t12000.00,\t2.00,\t1.41")
            .expect("must be translated");
    assert_eq!(definition.kind(), EffectKind::Wobble);
    assert_eq!(definition.main_param.as_deref(), Some("8"));
    assert_eq!(
        translate_effect_line("13,\t0.00"),
        Err(TranslateError::UnknownType("13".to_string()))
    );
}
