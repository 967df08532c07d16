//! The sparse event timeline of a chart.
//!
//! Events are stored per [`Timing`], and within one timing per [`EventKind`]. At most one
//! event of each kind exists at a timing, and events at one timing are visited in the order
//! of their kinds.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

use super::{
    model::{CameraNode, CameraParam, TiltMode, TrackEvent},
    time::{TimeSignature, Timing},
};

/// Category of an event. Events of one timing are processed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// [`Event::TimeSignature`].
    TimeSignatureChange,
    /// [`Event::Bpm`].
    BpmChange,
    /// [`Event::Stop`].
    StopDuration,
    /// [`Event::TiltMode`].
    TiltModeChange,
    /// [`Event::Camera`] of the parameter.
    CameraParamChange(CameraParam),
    /// [`Event::Track`] on the vox track number.
    Track(u8),
}

/// An event on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// The time signature changes.
    TimeSignature(TimeSignature),
    /// The tempo changes.
    Bpm(f64),
    /// The scroll stops for the number of ticks.
    Stop(u32),
    /// The tilt mode changes.
    TiltMode(TiltMode),
    /// A camera parameter starts moving.
    Camera(CameraNode),
    /// A note or laser.
    Track(TrackEvent),
}

/// Events of one timing, ordered by kind.
pub type EventMap = BTreeMap<EventKind, Event>;

/// Ordered map from timings to the events happening there.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    events: BTreeMap<Timing, EventMap>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
        }
    }

    /// Places `event` at `timing`, returning the event of the same kind it replaced.
    pub fn insert(&mut self, timing: Timing, kind: EventKind, event: Event) -> Option<Event> {
        self.events.entry(timing).or_default().insert(kind, event)
    }

    /// Removes the event of `kind` at `timing`.
    pub fn remove(&mut self, timing: Timing, kind: EventKind) -> Option<Event> {
        let map = self.events.get_mut(&timing)?;
        let removed = map.remove(&kind);
        if map.is_empty() {
            self.events.remove(&timing);
        }
        removed
    }

    /// The event of `kind` at `timing`.
    #[must_use]
    pub fn get(&self, timing: Timing, kind: EventKind) -> Option<&Event> {
        self.events.get(&timing)?.get(&kind)
    }

    /// All events at `timing`.
    #[must_use]
    pub fn events_at(&self, timing: Timing) -> Option<&EventMap> {
        self.events.get(&timing)
    }

    /// The first timing after `after` holding an event of `kind`.
    #[must_use]
    pub fn next_of_kind(&self, after: Timing, kind: EventKind) -> Option<Timing> {
        self.events
            .range((Excluded(after), Unbounded))
            .find(|(_, map)| map.contains_key(&kind))
            .map(|(&timing, _)| timing)
    }

    /// Number of timings holding at least one event.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The latest time signature change placed in or before `measure`.
    #[must_use]
    pub fn time_signature_at(&self, measure: u32) -> Option<TimeSignature> {
        self.events
            .range(..=Timing::new(measure, u32::MAX, u32::MAX))
            .rev()
            .find_map(|(_, map)| match map.get(&EventKind::TimeSignatureChange) {
                Some(Event::TimeSignature(signature)) => Some(*signature),
                _ => None,
            })
    }

    fn signature_or_common(&self, measure: u32) -> TimeSignature {
        self.time_signature_at(measure).unwrap_or_default()
    }

    /// Signed distance in ticks from `from` to `to`, following every signature change in
    /// between. Measures before any change count as 4/4.
    #[must_use]
    pub fn ticks_between(&self, from: Timing, to: Timing) -> i64 {
        if to < from {
            return -self.ticks_between(to, from);
        }
        let offset_in_measure = |timing: Timing| {
            let signature = self.signature_or_common(timing.measure);
            i64::from(timing.beat.saturating_sub(1)) * i64::from(signature.ticks_per_beat())
                + i64::from(timing.tick)
        };
        let whole_measures: i64 = (from.measure..to.measure)
            .map(|measure| i64::from(self.signature_or_common(measure).ticks_per_measure()))
            .sum();
        whole_measures + offset_in_measure(to) - offset_in_measure(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(top: u32, bottom: u32) -> Event {
        Event::TimeSignature(TimeSignature::new(top, bottom).unwrap())
    }

    #[test]
    fn signature_lookup_uses_latest_change() {
        let mut timeline = Timeline::new();
        timeline.insert(Timing::START, EventKind::TimeSignatureChange, signature(4, 4));
        timeline.insert(
            Timing::measure_start(3),
            EventKind::TimeSignatureChange,
            signature(6, 8),
        );

        assert_eq!(timeline.time_signature_at(2), Some(TimeSignature::COMMON));
        assert_eq!(
            timeline.time_signature_at(3),
            Some(TimeSignature::new(6, 8).unwrap())
        );
        assert_eq!(
            timeline.time_signature_at(10),
            Some(TimeSignature::new(6, 8).unwrap())
        );
        assert_eq!(Timeline::new().time_signature_at(1), None);
    }

    #[test]
    fn ticks_between_crosses_signature_changes() {
        let mut timeline = Timeline::new();
        timeline.insert(Timing::START, EventKind::TimeSignatureChange, signature(4, 4));
        timeline.insert(
            Timing::measure_start(2),
            EventKind::TimeSignatureChange,
            signature(3, 8),
        );

        let from = Timing::new(1, 4, 0);
        let to = Timing::new(3, 1, 12);
        assert_eq!(timeline.ticks_between(from, to), 48 + 72 + 12);
        assert_eq!(timeline.ticks_between(to, from), -(48 + 72 + 12));
        assert_eq!(timeline.ticks_between(from, from), 0);
    }

    #[test]
    fn remove_drops_empty_timings() {
        let mut timeline = Timeline::new();
        timeline.insert(Timing::START, EventKind::BpmChange, Event::Bpm(120.0));
        assert_eq!(timeline.len(), 1);
        assert_eq!(
            timeline.remove(Timing::START, EventKind::BpmChange),
            Some(Event::Bpm(120.0))
        );
        assert!(timeline.is_empty());
    }

    #[test]
    fn next_of_kind_skips_other_kinds() {
        let mut timeline = Timeline::new();
        timeline.insert(Timing::new(1, 1, 5), EventKind::BpmChange, Event::Bpm(100.0));
        timeline.insert(Timing::new(1, 2, 0), EventKind::StopDuration, Event::Stop(3));
        assert_eq!(
            timeline.next_of_kind(Timing::START, EventKind::StopDuration),
            Some(Timing::new(1, 2, 0))
        );
        assert_eq!(
            timeline.next_of_kind(Timing::new(1, 2, 0), EventKind::StopDuration),
            None
        );
    }
}
