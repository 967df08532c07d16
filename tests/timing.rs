use pretty_assertions::assert_eq;
use vox2ksh::prelude::*;

fn signature(top: u32, bottom: u32) -> TimeSignature {
    TimeSignature::new(top, bottom).expect("valid signature")
}

#[test]
fn signature_properties() {
    let common = TimeSignature::COMMON;
    assert_eq!(common.ticks_per_beat(), 48);
    assert_eq!(common.ticks_per_measure(), 192);
    assert_eq!(common.thirty_second_ticks(), 6);
    assert_eq!(common.to_string(), "4/4");

    let seven_eight = signature(7, 8);
    assert_eq!(seven_eight.ticks_per_beat(), 24);
    assert_eq!(seven_eight.ticks_per_measure(), 168);
    assert_eq!(seven_eight.thirty_second_ticks(), 3);

    let three_two = signature(3, 2);
    assert_eq!(three_two.ticks_per_beat(), 96);
    assert_eq!(three_two.thirty_second_ticks(), 12);

    assert_eq!(
        TimeSignature::new(5, 6),
        Err(TimingError::InvalidTimeSignature { top: 5, bottom: 6 })
    );
}

#[test]
fn timing_text() {
    let timing: Timing = "005,03,12".parse().expect("valid timing");
    assert_eq!(timing, Timing::new(5, 3, 12));
    assert_eq!(timing.to_string(), "5,3,12");
    assert!(!timing.is_measure_start());
    assert!(Timing::measure_start(5).is_measure_start());

    assert_eq!(
        Timing::parse("002,04,00", signature(3, 4)),
        Err(TimingError::BeatOutOfRange { beat: 4, top: 3 })
    );
    assert_eq!(
        Timing::parse("002,01,24", signature(6, 8)),
        Err(TimingError::TickOutOfRange {
            tick: 24,
            ticks_per_beat: 24
        })
    );
    assert_eq!(
        "1,1,0,0".parse::<Timing>(),
        Err(TimingError::ComponentCount("1,1,0,0".to_string()))
    );
}

#[test]
fn arithmetic_under_signatures() {
    let six_eight = signature(6, 8);
    let start = Timing::new(2, 6, 20);
    let later = start.advance(10, six_eight);
    assert_eq!(later, Timing::new(3, 1, 6));
    assert_eq!(later.diff(start, six_eight), 10);
    assert_eq!(start.diff(later, six_eight), -10);

    let common = TimeSignature::COMMON;
    assert_eq!(Timing::START.advance(0, common), Timing::START);
    assert_eq!(Timing::START.advance(191, common), Timing::new(1, 4, 47));
}

#[test]
fn timeline_distances_follow_changes() {
    let mut timeline = Timeline::new();
    timeline.insert(
        Timing::START,
        EventKind::TimeSignatureChange,
        Event::TimeSignature(TimeSignature::COMMON),
    );
    timeline.insert(
        Timing::measure_start(3),
        EventKind::TimeSignatureChange,
        Event::TimeSignature(signature(7, 8)),
    );

    assert_eq!(
        timeline.ticks_between(Timing::new(2, 4, 0), Timing::new(3, 2, 0)),
        48 + 24
    );
    assert_eq!(
        timeline.ticks_between(Timing::START, Timing::measure_start(5)),
        192 * 2 + 168 * 2
    );
    assert_eq!(timeline.time_signature_at(4), Some(signature(7, 8)));
}
