//! The tick walker writing the body of a ksh chart.
//!
//! Every tick of every measure up to the end of the chart produces one note line, preceded
//! by the option lines of the events at that tick. State carried between ticks covers holds,
//! drawn lasers, resolving slams, camera motions, and laser filters.

use std::collections::BTreeMap;

use crate::{
    diagnostics::{DiagnosticSink, Tag},
    effect::{EFFECT_FALLBACK_NAME, EffectDefinition},
    vox::{
        Vox,
        model::{
            Button, ButtonPress, CameraNode, CameraParam, EffectRef, LaserContinuity,
            LaserFilter, LaserSide, LaserSlam, TrackEvent,
        },
        time::{TimeSignature, Timing},
        timeline::{Event, EventKind},
    },
};

use super::{
    ConvertError, DEFAULT_FILTER_GAIN, FX_CHIP_SOUND_EXTENSION, FX_CHIP_SOUND_VOLUME, KshHeader,
    RenderConfig, SLAM_TICKS,
    line::{ButtonState, LaserGlyph, LineBuffer},
    relocate::RelocationQueue,
    spin::spin_suffix,
};

/// Writes `vox` as a ksh chart under `header`.
///
/// Timeline events moved to avoid false slams stay moved in `vox`. Diagnostics carry the
/// output line number.
///
/// # Errors
///
/// Fails with a [`ConvertError`] when the chart cannot be expressed in ksh.
pub fn render_ksh(
    vox: &mut Vox,
    header: &KshHeader,
    config: &RenderConfig,
    sink: &mut DiagnosticSink,
) -> Result<String, ConvertError> {
    let mut writer = KshWriter::default();
    writer.write(&header.to_string());
    writer.write("--");
    Renderer::new(vox, config, sink).render(&mut writer)?;
    Ok(writer.text)
}

/// Output text with the number of lines written so far.
#[derive(Debug, Default)]
struct KshWriter {
    text: String,
    lines: usize,
}

impl KshWriter {
    fn write(&mut self, block: &str) {
        let block = block.strip_suffix('\n').unwrap_or(block);
        self.text.push_str(block);
        self.text.push('\n');
        self.lines += block.lines().count().max(1);
    }

    /// The 1-based number of the next line.
    const fn next_line(&self) -> usize {
        self.lines + 1
    }
}

/// A camera motion waiting for its end value.
#[derive(Debug, Clone, Copy)]
struct CameraCountdown {
    node: CameraNode,
    ticks_left: u32,
}

/// A slam waiting for its end glyph.
#[derive(Debug, Clone, Copy)]
struct SlamCountdown {
    slam: LaserSlam,
    ticks_left: u32,
}

/// The ksh option of an interpolated camera parameter at `value`.
fn camera_option(param: CameraParam, value: f64) -> Option<(&'static str, String)> {
    match param {
        CameraParam::RotX => Some(("zoom_top", ((value * 150.0) as i64).to_string())),
        CameraParam::Radi => Some(("zoom_bottom", ((value * -150.0) as i64).to_string())),
        CameraParam::Tilt => Some(("tilt", format!("{:?}", (-value * 10.0).trunc() / 10.0))),
        CameraParam::Realize
        | CameraParam::AirLScaX
        | CameraParam::AirRScaX
        | CameraParam::LaneY => None,
    }
}

struct Renderer<'a> {
    vox: &'a mut Vox,
    config: &'a RenderConfig,
    sink: &'a mut DiagnosticSink,
    fallback: EffectDefinition,
    signature: TimeSignature,
    holds: BTreeMap<Button, u32>,
    cameras: BTreeMap<CameraParam, CameraCountdown>,
    drawing: [bool; 2],
    slams: [Option<SlamCountdown>; 2],
    last_laser: [Option<Timing>; 2],
    last_filter: [LaserFilter; 2],
    relocations: RelocationQueue,
}

impl<'a> Renderer<'a> {
    fn new(vox: &'a mut Vox, config: &'a RenderConfig, sink: &'a mut DiagnosticSink) -> Self {
        Self {
            vox,
            config,
            sink,
            fallback: EffectDefinition::fallback(),
            signature: TimeSignature::COMMON,
            holds: BTreeMap::new(),
            cameras: BTreeMap::new(),
            drawing: [false; 2],
            slams: [None; 2],
            last_laser: [None; 2],
            last_filter: [LaserFilter::Peak; 2],
            relocations: RelocationQueue::new(),
        }
    }

    fn render(mut self, writer: &mut KshWriter) -> Result<(), ConvertError> {
        for measure in 1..=self.vox.end.measure {
            let start = Timing::measure_start(measure);
            if let Some(&Event::TimeSignature(signature)) = self
                .vox
                .timeline
                .get(start, EventKind::TimeSignatureChange)
            {
                self.signature = signature;
                writer.write(&format!("beat={signature}"));
            }
            for beat in 1..=self.signature.top() {
                writer.write(&format!("// #{measure},{beat}"));
                for tick in 0..self.signature.ticks_per_beat() {
                    self.sink.set_line(writer.next_line(), None);
                    let line = self.tick(Timing::new(measure, beat, tick))?;
                    writer.write(&line.to_string());
                }
            }
            writer.write("--");
        }

        for (slot, definition) in &self.vox.effects {
            writer.write(&definition.define_line(slot));
        }
        writer.write(&self.fallback.define_line(EFFECT_FALLBACK_NAME));
        Ok(())
    }

    fn tick(&mut self, now: Timing) -> Result<LineBuffer, ConvertError> {
        let mut line = LineBuffer::new();
        let snapshot: Vec<(EventKind, Event)> = self
            .vox
            .timeline
            .events_at(now)
            .map(|events| events.iter().map(|(&kind, &event)| (kind, event)).collect())
            .unwrap_or_default();

        for (kind, event) in snapshot {
            match (kind, event) {
                (EventKind::TimeSignatureChange, _) => {
                    if !now.is_measure_start() {
                        return Err(ConvertError::MidMeasureTimeSignature { timing: now });
                    }
                }
                (_, Event::Bpm(bpm)) => line.option("t", bpm),
                (_, Event::Stop(ticks)) => line.option("stop", ticks),
                (_, Event::TiltMode(mode)) => line.option("tilt", mode.ksh_name()),
                (EventKind::CameraParamChange(param), Event::Camera(node)) => {
                    self.camera(param, node, &mut line);
                }
                (_, Event::Track(TrackEvent::Button(press))) => self.button(press, &mut line),
                (_, Event::Track(event @ (TrackEvent::Laser(_) | TrackEvent::Slam(_)))) => {
                    self.laser(now, kind, event, &mut line)?;
                }
                _ => {}
            }
        }

        self.end_of_tick(&mut line);
        for relocation in self.relocations.apply(&mut self.vox.timeline) {
            if relocation.to.measure > self.vox.end.measure {
                self.sink.warning(
                    Tag::KshLaser,
                    format!(
                        "laser node at {} moved to {}, after the last measure",
                        relocation.from, relocation.to
                    ),
                );
            }
        }
        Ok(line)
    }

    fn camera(&mut self, param: CameraParam, node: CameraNode, line: &mut LineBuffer) {
        if param == CameraParam::LaneY {
            line.option("lane_toggle", node.duration);
            return;
        }
        let Some((key, value)) = camera_option(param, node.start) else {
            return;
        };
        let countdown = CameraCountdown {
            node,
            ticks_left: node.duration,
        };
        if let Some(previous) = self.cameras.insert(param, countdown)
            && previous.ticks_left != 0
        {
            self.sink.warning(
                Tag::SpnodeOutput,
                format!("camera node of {param:?} interrupts another of the same kind"),
            );
        }
        line.option(key, value);
    }

    fn button(&mut self, press: ButtonPress, line: &mut LineBuffer) {
        let button = press.button;
        if press.is_chip() {
            line.set_button(button, ButtonState::Press);
            if self.config.chip_sounds
                && let (Some(letter), Some(sound)) = (button.fx_letter(), press.chip_sound)
            {
                line.option(
                    &format!("fx-{letter}_se"),
                    format!("fxchip_{sound}{FX_CHIP_SOUND_EXTENSION};{FX_CHIP_SOUND_VOLUME}"),
                );
            }
            return;
        }

        if let Some(letter) = button.fx_letter() {
            let change = self.fx_change(press.effect, press.duration);
            line.option(&format!("fx-{letter}"), change);
        }
        line.set_button(button, ButtonState::Hold);
        self.holds.insert(button, press.duration);
    }

    fn fx_change(&mut self, effect: Option<EffectRef>, duration: u32) -> String {
        if let Some(effect @ EffectRef::Slot(slot)) = effect {
            if let Some(definition) = self.vox.effect(effect) {
                return definition.fx_change(slot, duration);
            }
            self.sink.warning(
                Tag::ButtonFx,
                format!("effect slot {slot} is not defined, using fallback"),
            );
        }
        self.fallback.fx_change(EFFECT_FALLBACK_NAME, duration)
    }

    fn laser(
        &mut self,
        now: Timing,
        kind: EventKind,
        event: TrackEvent,
        line: &mut LineBuffer,
    ) -> Result<(), ConvertError> {
        let (node, slam) = match event {
            TrackEvent::Laser(node) => (node, None),
            TrackEvent::Slam(slam) => (*slam.start(), Some(slam)),
            TrackEvent::Button(_) => return Ok(()),
        };
        let side = node.side;
        let index = side.index();

        let thirty_second = i64::from(self.signature.thirty_second_ticks());
        if let Some(&Some(last)) = self.last_laser.get(index)
            && self.vox.timeline.ticks_between(last, now) == thirty_second
        {
            self.relocations.plan(&self.vox.timeline, now, kind);
            return Ok(());
        }

        if self.slams.get(index).is_some_and(Option::is_some) {
            return Err(ConvertError::SlamInterrupted { timing: now, side });
        }

        if let Some(slam) = slam {
            if let Some(countdown) = self.slams.get_mut(index) {
                *countdown = Some(SlamCountdown {
                    slam,
                    ticks_left: SLAM_TICKS,
                });
            }
            if let Some(roll) = node.roll {
                if line.spin.is_some() {
                    self.sink.warning(Tag::KshLaser, "spin on both lasers");
                }
                line.spin = Some(spin_suffix(roll, slam.direction(), self.signature));
            }
        }

        if node.range != 1 {
            line.option(&format!("laserrange_{}", side.letter()), format!("{}x", node.range));
        }

        if let Some(last_filter) = self.last_filter.get_mut(index)
            && node.continuity != LaserContinuity::End
            && node.filter != *last_filter
        {
            if *last_filter == LaserFilter::None {
                line.option("pfiltergain", DEFAULT_FILTER_GAIN);
            }
            match node.filter.ksh_name() {
                Some(name) => line.option("filtertype", name),
                None => line.option("pfiltergain", 0),
            }
            *last_filter = node.filter;
        }

        self.set_drawing(side, match node.continuity {
            LaserContinuity::Start => Some(true),
            LaserContinuity::End => Some(false),
            LaserContinuity::Continue => None,
        });
        line.set_laser(side, LaserGlyph::Node(node.position));
        if let Some(last) = self.last_laser.get_mut(index) {
            *last = Some(now);
        }
        Ok(())
    }

    fn set_drawing(&mut self, side: LaserSide, drawing: Option<bool>) {
        if let (Some(drawing), Some(flag)) = (drawing, self.drawing.get_mut(side.index())) {
            *flag = drawing;
        }
    }

    fn is_drawing(&self, side: LaserSide) -> bool {
        self.drawing.get(side.index()).copied().unwrap_or_default()
    }

    fn end_of_tick(&mut self, line: &mut LineBuffer) {
        self.cameras.retain(|&param, countdown| {
            if countdown.ticks_left == 0 {
                if let Some((key, value)) = camera_option(param, countdown.node.end) {
                    line.option(key, value);
                }
                false
            } else {
                countdown.ticks_left -= 1;
                true
            }
        });

        self.holds.retain(|&button, ticks_left| {
            if *ticks_left == 0 {
                return false;
            }
            line.set_button(button, ButtonState::Hold);
            *ticks_left -= 1;
            true
        });

        for side in LaserSide::ALL {
            if line.laser(side) == LaserGlyph::None && self.is_drawing(side) {
                line.set_laser(side, LaserGlyph::Continue);
            }
        }

        for side in LaserSide::ALL {
            let Some(slot) = self.slams.get_mut(side.index()) else {
                continue;
            };
            let Some(countdown) = slot.as_mut() else {
                continue;
            };
            if countdown.ticks_left == 0 {
                let end = *countdown.slam.end();
                *slot = None;
                line.set_laser(side, LaserGlyph::Node(end.position));
                if end.continuity == LaserContinuity::End {
                    self.set_drawing(side, Some(false));
                }
            } else {
                if countdown.ticks_left < SLAM_TICKS {
                    line.set_laser(side, LaserGlyph::Continue);
                }
                countdown.ticks_left -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn camera_values() {
        assert_eq!(
            camera_option(CameraParam::RotX, 0.5),
            Some(("zoom_top", "75".to_string()))
        );
        assert_eq!(
            camera_option(CameraParam::Radi, 0.5),
            Some(("zoom_bottom", "-75".to_string()))
        );
        assert_eq!(
            camera_option(CameraParam::Tilt, 0.57),
            Some(("tilt", "-0.5".to_string()))
        );
        assert_eq!(
            camera_option(CameraParam::Tilt, -1.0),
            Some(("tilt", "1.0".to_string()))
        );
        assert_eq!(camera_option(CameraParam::Realize, 1.0), None);
    }

    #[test]
    fn writer_counts_lines() {
        let mut writer = KshWriter::default();
        writer.write("a\nb\n");
        writer.write("--");
        assert_eq!(writer.text, "a\nb\n--\n");
        assert_eq!(writer.next_line(), 4);
    }
}
