//! The section state machine reading a vox document into a [`Vox`].
//!
//! The parser is tolerant: a line it cannot understand is reported to the
//! [`DiagnosticSink`] and skipped, or read with a fallback value. Only a few structural
//! problems abort the parse with a [`ParseError`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use super::{
    Vox,
    lex::{Line, Section, lex_lines},
    model::{
        Button, ButtonPress, CameraNode, CameraParam, EffectRef, LaserContinuity, LaserFilter,
        LaserNode, LaserSide, LaserSlam, LASER_POSITION_MAX, RollKind, TiltMode, TrackEvent,
    },
    revision::{FxEffectLayout, FxHoldSource, Revision},
    time::{TimeSignature, Timing, TimingError},
    timeline::{Event, EventKind, Timeline},
    validity,
};
use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, Tag},
    effect::{
        EffectDefinition,
        translate::{translate_effect_line, translate_legacy_sound_id},
    },
};

/// Number of known FX chip sounds. Ids from 1 below this are usable.
pub const FX_CHIP_SOUND_COUNT: u8 = 14;

/// An error which makes the chart impossible to read further.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// The chart has no `#END POSITION`, so its length is unknown.
    #[error("the chart has no #END POSITION")]
    MissingEndPosition,
    /// A stop opened before any `#BEAT INFO`, so its length cannot be measured.
    #[error("line {line}: stop without a time signature in force")]
    StopWithoutTimeSignature {
        /// The line opening the stop.
        line: usize,
    },
    /// A line other than a `define` statement appeared in `#SOUND ID START`.
    #[error("line {line}: only define statements are allowed in #SOUND ID START")]
    UnexpectedLineInSoundIdSection {
        /// The offending line.
        line: usize,
    },
}

/// Output of parsing a vox document.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VoxParseOutput {
    /// The parsed chart, or the error which stopped the parse.
    pub vox: Result<Vox, ParseError>,
    /// Everything reported while parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses the decoded text of the vox file `name`.
pub fn parse_vox(name: &str, source: &str) -> VoxParseOutput {
    let mut sink = DiagnosticSink::new(name);
    let vox = parse_vox_with_sink(source, &mut sink);
    VoxParseOutput {
        vox,
        diagnostics: sink.into_diagnostics(),
    }
}

/// Parses the decoded text of a vox file, reporting into `sink`.
///
/// A fatal error is also recorded in `sink` at the line it happened.
///
/// # Errors
///
/// Fails with a [`ParseError`] when the chart is structurally broken.
pub fn parse_vox_with_sink(source: &str, sink: &mut DiagnosticSink) -> Result<Vox, ParseError> {
    let result = VoxParser::new(sink).parse(source);
    if let Err(error) = &result {
        sink.error(Tag::VoxParse, error.to_string());
    }
    result
}

struct VoxParser<'s> {
    sink: &'s mut DiagnosticSink,
    version: u32,
    revision: Revision,
    timeline: Timeline,
    effects: BTreeMap<usize, EffectDefinition>,
    defines: HashMap<String, i32>,
    end: Option<Timing>,
    required_chip_sounds: BTreeSet<u8>,
    open_stop: Option<Timing>,
}

/// The field at `index`, or an empty string past the end of the line.
fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or_default()
}

impl<'s> VoxParser<'s> {
    fn new(sink: &'s mut DiagnosticSink) -> Self {
        Self {
            sink,
            version: 0,
            revision: Revision::default(),
            timeline: Timeline::new(),
            effects: BTreeMap::new(),
            defines: HashMap::new(),
            end: None,
            required_chip_sounds: BTreeSet::new(),
            open_stop: None,
        }
    }

    fn parse(mut self, source: &str) -> Result<Vox, ParseError> {
        let mut section: Option<Section> = None;
        let mut section_line = 0;

        for line in lex_lines(source) {
            self.sink.set_line(line.line(), Some(line.span()));
            section_line += 1;
            match *line.content() {
                Line::Blank | Line::Comment(_) | Line::Decoration => {}
                Line::Header(header) => {
                    log::debug!("line {}: entering section {header:?}", line.line());
                    section = (header != Section::End).then_some(header);
                    section_line = 0;
                }
                Line::Define { name, value } => self.define(name, value),
                Line::MalformedDefine(text) => self.sink.warning(
                    Tag::FxDefine,
                    format!("define line {text:?} does not have 3 operands"),
                ),
                Line::Data(text) => {
                    if let Some(section) = section {
                        self.data(section, section_line, line.line(), text)?;
                    }
                }
            }
        }

        self.finish()
    }

    fn define(&mut self, name: &str, value: &str) {
        let Ok(value) = value.trim().parse::<i32>() else {
            self.sink.warning(
                Tag::FxDefine,
                format!("define value {value:?} of {name:?} is not a number"),
            );
            return;
        };
        self.defines.insert(name.to_string(), value);
        if value == 0 {
            return;
        }
        let (definition, unknown) = translate_legacy_sound_id(value);
        if unknown {
            self.sink.warning(
                Tag::FxParse,
                format!("old vox sound id {value} unknown, using fallback"),
            );
        }
        if let Ok(slot) = usize::try_from(value) {
            self.effects.insert(slot, definition);
        }
    }

    fn data(
        &mut self,
        section: Section,
        section_line: usize,
        line_number: usize,
        text: &str,
    ) -> Result<(), ParseError> {
        let fields: Vec<_> = text.split('\t').map(str::trim).collect();
        match section {
            Section::FormatVersion => self.format_version(text),
            Section::Bpm => self.bpm(text),
            Section::BpmInfo => self.bpm_info(&fields, line_number)?,
            Section::TiltModeInfo => self.tilt_mode(&fields),
            Section::BeatInfo => self.beat_info(&fields),
            Section::EndPosition => self.end_position(&fields),
            Section::SoundId => {
                return Err(ParseError::UnexpectedLineInSoundIdSection { line: line_number });
            }
            Section::FxButtonEffect => self.fx_effect(section_line, text),
            Section::TabEffect => {
                if validity::tab_effect_is_abnormal(section_line, text) {
                    self.sink
                        .abnormality(Tag::TabEffect, format!("tab effect info abnormal: {text}"));
                }
            }
            Section::TabParamAssign => {
                if validity::tab_param_assign_is_abnormal(text) {
                    self.sink.abnormality(
                        Tag::TabParamAssign,
                        format!("tab param assign info abnormal: {text}"),
                    );
                }
            }
            Section::SpController => self.camera(&fields),
            Section::Track(track) => self.track(track, &fields),
            Section::TrackAutoTab | Section::End | Section::Unknown(_) => {}
        }
        Ok(())
    }

    /// Parses `text` as a timing bounded by the signature in force at its measure.
    fn parse_timing(&self, text: &str) -> Result<Timing, TimingError> {
        text.parse::<Timing>().and_then(|timing| {
            let signature = self
                .timeline
                .time_signature_at(timing.measure)
                .unwrap_or_default();
            Timing::parse(text, signature)
        })
    }

    /// Reads field 0 as a timing.
    fn timing(&mut self, fields: &[&str]) -> Option<Timing> {
        match self.parse_timing(field(fields, 0)) {
            Ok(timing) => Some(timing),
            Err(error) => {
                self.sink.warning(Tag::TimingParse, error.to_string());
                None
            }
        }
    }

    /// The last readable line of `#END POSITION` wins.
    fn end_position(&mut self, fields: &[&str]) {
        match self.parse_timing(field(fields, 0)) {
            Ok(end) => {
                if let Some(previous) = self.end.replace(end) {
                    self.sink.warning(
                        Tag::EndPosition,
                        format!("end position {previous} replaced by {end}"),
                    );
                }
            }
            Err(error) => self.sink.warning(
                Tag::EndPosition,
                format!("end position not understood: {error}"),
            ),
        }
    }

    fn format_version(&mut self, text: &str) {
        match text.parse() {
            Ok(version) => {
                self.version = version;
                self.revision = Revision::for_version(version);
                log::debug!("format version {version}: {:?}", self.revision);
            }
            Err(_) => self.sink.warning(
                Tag::VersionParse,
                format!("format version {text:?} is not a number"),
            ),
        }
    }

    fn bpm(&mut self, text: &str) {
        match text.parse::<f64>() {
            Ok(bpm) => {
                self.timeline
                    .insert(Timing::START, EventKind::BpmChange, Event::Bpm(bpm));
            }
            Err(_) => self
                .sink
                .abnormality(Tag::BpmParse, format!("bpm {text:?} is not a number")),
        }
    }

    fn bpm_info(&mut self, fields: &[&str], line_number: usize) -> Result<(), ParseError> {
        let Some(now) = self.timing(fields) else {
            return Ok(());
        };
        let division = field(fields, 2);
        if division.ends_with('-') {
            if self.timeline.time_signature_at(now.measure).is_none() {
                return Err(ParseError::StopWithoutTimeSignature { line: line_number });
            }
            self.open_stop = Some(now);
            return Ok(());
        }

        if let Some(stop) = self.open_stop.take() {
            let ticks = self.timeline.ticks_between(stop, now);
            match u32::try_from(ticks) {
                Ok(ticks) => {
                    self.timeline
                        .insert(stop, EventKind::StopDuration, Event::Stop(ticks));
                }
                Err(_) => self.sink.warning(
                    Tag::BpmInfo,
                    format!("stop at {stop} ends before it starts, at {now}"),
                ),
            }
        }
        if division != "4" {
            self.sink.abnormality(
                Tag::BpmInfo,
                format!("non-4 beat division in bpm info: {division}"),
            );
        }
        match field(fields, 1).parse::<f64>() {
            Ok(bpm) => {
                self.timeline
                    .insert(now, EventKind::BpmChange, Event::Bpm(bpm));
            }
            Err(_) => self.sink.warning(
                Tag::BpmInfo,
                format!("bpm {:?} is not a number", field(fields, 1)),
            ),
        }
        Ok(())
    }

    fn tilt_mode(&mut self, fields: &[&str]) {
        let Some(now) = self.timing(fields) else {
            return;
        };
        let id = field(fields, 1);
        match id.parse().ok().and_then(TiltMode::from_vox_id) {
            Some(mode) => {
                self.timeline
                    .insert(now, EventKind::TiltModeChange, Event::TiltMode(mode));
            }
            None => self
                .sink
                .warning(Tag::TiltParse, format!("invalid tilt mode {id:?}")),
        }
    }

    fn beat_info(&mut self, fields: &[&str]) {
        let Some(now) = self.timing(fields) else {
            return;
        };
        let (top, bottom) = (field(fields, 1), field(fields, 2));
        let signature = top
            .parse()
            .ok()
            .zip(bottom.parse().ok())
            .and_then(|(top, bottom)| TimeSignature::new(top, bottom).ok());
        match signature {
            Some(signature) => {
                self.timeline.insert(
                    now,
                    EventKind::TimeSignatureChange,
                    Event::TimeSignature(signature),
                );
            }
            None => self.sink.warning(
                Tag::BeatInfo,
                format!("invalid time signature {top}/{bottom}"),
            ),
        }
    }

    fn fx_effect(&mut self, section_line: usize, text: &str) {
        let layout = self.revision.fx_effect_layout;
        let Some(slot) = layout.slot_of_line(section_line) else {
            return;
        };
        let code = text.split(',').next().unwrap_or_default().trim();
        if layout == FxEffectLayout::Blocks && code == "0" {
            return;
        }
        let definition = translate_effect_line(text).unwrap_or_else(|error| {
            self.sink.warning(
                Tag::FxLoad,
                format!("effect slot {slot}: {error}, using fallback"),
            );
            EffectDefinition::fallback()
        });
        self.effects.insert(slot, definition);
    }

    fn camera(&mut self, fields: &[&str]) {
        let name = field(fields, 1);
        let Some(param) = CameraParam::from_vox_name(name) else {
            self.sink.warning(
                Tag::SpcontrollerLoad,
                format!("invalid camera param {name:?}"),
            );
            return;
        };
        let Some(now) = self.timing(fields) else {
            return;
        };
        let duration = field(fields, 3).parse().ok();
        let start = field(fields, 4).parse().ok();
        let end = field(fields, 5).parse().ok();
        if let (Some(duration), Some(start), Some(end)) = (duration, start, end) {
            self.timeline.insert(
                now,
                EventKind::CameraParamChange(param),
                Event::Camera(CameraNode {
                    start,
                    end,
                    duration,
                }),
            );
        }
        if param == CameraParam::Realize && validity::realize_is_abnormal(fields) {
            self.sink
                .abnormality(Tag::SpcontrollerLoad, "spcontroller line is abnormal");
        }
    }

    fn track(&mut self, track: u8, fields: &[&str]) {
        if let Some(side) = LaserSide::from_track(track) {
            self.laser(side, fields);
        } else if let Some(button) = Button::from_track(track) {
            self.button(button, fields);
        } else if track != 9 {
            self.sink.warning(
                Tag::ButtonLoad,
                format!("invalid track number for button: {track}"),
            );
        }
    }

    fn laser(&mut self, side: LaserSide, fields: &[&str]) {
        let Some(now) = self.timing(fields) else {
            return;
        };
        let position = field(fields, 1);
        let Some(position) = position
            .parse::<u8>()
            .ok()
            .filter(|&position| position <= LASER_POSITION_MAX)
        else {
            self.sink.warning(
                Tag::LaserLoad,
                format!("laser position {position:?} is out of bounds"),
            );
            return;
        };
        let continuity = field(fields, 2);
        let Some(continuity) = continuity.parse().ok().and_then(LaserContinuity::from_code) else {
            self.sink.warning(
                Tag::LaserLoad,
                format!("invalid laser continuity {continuity:?}"),
            );
            return;
        };

        let mut node = LaserNode::new(side, position, continuity);
        if let Some(&roll) = fields.get(3) {
            node.roll = roll.parse().ok().and_then(RollKind::from_code);
            if node.roll.is_none() && roll != "0" {
                self.sink
                    .abnormality(Tag::RollParse, format!("roll type: {roll}"));
            }
        }
        if let Some(&filter) = fields.get(4) {
            match filter.parse().ok().and_then(LaserFilter::from_vox_id) {
                Some(filter) => node.filter = filter,
                None => self.sink.warning(
                    Tag::LaserLoad,
                    format!("unrecognized vox filter id {filter:?}"),
                ),
            }
        }
        if let Some(&range) = fields.get(5) {
            match range.parse::<u32>() {
                Ok(range) if range >= 1 => node.range = range,
                _ => self
                    .sink
                    .warning(Tag::LaserLoad, format!("invalid laser range {range:?}")),
            }
        }

        let kind = EventKind::Track(side.track());
        let slam = match self.timeline.get(now, kind) {
            Some(Event::Track(TrackEvent::Laser(start))) => LaserSlam::new(*start, node),
            // More than two nodes at one timing chain from the end of the earlier slam.
            Some(Event::Track(TrackEvent::Slam(slam))) => LaserSlam::new(*slam.end(), node),
            _ => {
                self.timeline
                    .insert(now, kind, Event::Track(TrackEvent::Laser(node)));
                return;
            }
        };
        match slam {
            Ok(slam) => {
                self.timeline
                    .insert(now, kind, Event::Track(TrackEvent::Slam(slam)));
            }
            Err(error) => self.sink.warning(Tag::SlamParse, format!("{error} at {now}")),
        }
    }

    fn button(&mut self, button: Button, fields: &[&str]) {
        let Some(now) = self.timing(fields) else {
            return;
        };
        let Ok(duration) = field(fields, 1).parse::<u32>() else {
            self.sink.warning(
                Tag::ButtonLoad,
                format!("invalid button duration {:?}", field(fields, 1)),
            );
            return;
        };

        let mut press = ButtonPress {
            button,
            duration,
            effect: None,
            chip_sound: None,
        };
        if button.is_fx() {
            if duration > 0 {
                press.effect = Some(self.hold_effect(fields));
            } else if self.revision.fx_chip_sounds {
                press.chip_sound = self.chip_sound(field(fields, 2));
            }
        }
        self.timeline.insert(
            now,
            EventKind::Track(button.track()),
            Event::Track(TrackEvent::Button(press)),
        );
    }

    fn hold_effect(&mut self, fields: &[&str]) -> EffectRef {
        match self.revision.fx_hold_source {
            FxHoldSource::LegacySoundId => {
                let name = field(fields, 3);
                let value = if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                    name.parse().ok()
                } else {
                    self.defines
                        .get(name)
                        .and_then(|&value| usize::try_from(value).ok())
                };
                value.map_or_else(
                    || {
                        self.sink.warning(
                            Tag::ButtonFx,
                            format!("unknown effect name {name:?}, using fallback"),
                        );
                        EffectRef::Fallback
                    },
                    EffectRef::Slot,
                )
            }
            FxHoldSource::EffectIndex => match field(fields, 2).parse::<i64>() {
                Ok(code @ 2..=13) => EffectRef::Slot((code - 2) as usize),
                Ok(254) => {
                    self.sink.warning(
                        Tag::ButtonFx,
                        "reverb effect is unimplemented, using fallback",
                    );
                    EffectRef::Fallback
                }
                _ => {
                    self.sink.warning(
                        Tag::ButtonFx,
                        "out of bounds fx index for FX hold, using fallback",
                    );
                    EffectRef::Fallback
                }
            },
        }
    }

    fn chip_sound(&mut self, text: &str) -> Option<u8> {
        match text.parse::<i32>() {
            Ok(id) if (1..i32::from(FX_CHIP_SOUND_COUNT)).contains(&id) => {
                let id = id as u8;
                self.required_chip_sounds.insert(id);
                Some(id)
            }
            Ok(-1 | 0 | 255) => None,
            _ => {
                self.sink.warning(
                    Tag::ChipSoundParse,
                    format!("unhandled chip sound id {text:?}"),
                );
                None
            }
        }
    }

    fn finish(mut self) -> Result<Vox, ParseError> {
        self.sink.set_line(0, None);
        if let Some(stop) = self.open_stop.take() {
            self.sink.warning(
                Tag::BpmInfo,
                format!("stop at {stop} is never closed, dropping it"),
            );
        }
        if self
            .timeline
            .get(Timing::START, EventKind::TimeSignatureChange)
            .is_none()
        {
            self.sink.warning(
                Tag::BeatInfo,
                "no time signature at 1,1,0, assuming 4/4",
            );
            self.timeline.insert(
                Timing::START,
                EventKind::TimeSignatureChange,
                Event::TimeSignature(TimeSignature::COMMON),
            );
        }
        let end = self.end.ok_or(ParseError::MissingEndPosition)?;
        Ok(Vox {
            version: self.version,
            timeline: self.timeline,
            effects: self.effects,
            defines: self.defines,
            end,
            required_chip_sounds: self.required_chip_sounds,
        })
    }
}
