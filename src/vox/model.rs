//! Objects placed on the timeline of a vox chart.

use thiserror::Error;

/// A button lane. The discriminant is the vox track number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    /// The left FX button.
    FxL = 2,
    /// The leftmost BT button.
    BtA = 3,
    /// The second BT button.
    BtB = 4,
    /// The third BT button.
    BtC = 5,
    /// The rightmost BT button.
    BtD = 6,
    /// The right FX button.
    FxR = 7,
}

impl Button {
    /// Looks up the button of a vox track number.
    #[must_use]
    pub const fn from_track(track: u8) -> Option<Self> {
        Some(match track {
            2 => Self::FxL,
            3 => Self::BtA,
            4 => Self::BtB,
            5 => Self::BtC,
            6 => Self::BtD,
            7 => Self::FxR,
            _ => return None,
        })
    }

    /// The vox track number.
    #[must_use]
    pub const fn track(self) -> u8 {
        self as u8
    }

    /// Whether this is one of the FX buttons.
    #[must_use]
    pub const fn is_fx(self) -> bool {
        matches!(self, Self::FxL | Self::FxR)
    }

    /// Side letter of an FX button used in ksh option keys.
    #[must_use]
    pub const fn fx_letter(self) -> Option<char> {
        match self {
            Self::FxL => Some('l'),
            Self::FxR => Some('r'),
            _ => None,
        }
    }
}

/// Reference from an FX hold to the effect it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectRef {
    /// An index into the effect table of the chart.
    Slot(usize),
    /// The fallback effect.
    Fallback,
}

/// A button press, either a chip or a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonPress {
    /// The pressed button.
    pub button: Button,
    /// Length of a hold in ticks, or 0 for a chip.
    pub duration: u32,
    /// The effect of an FX hold.
    pub effect: Option<EffectRef>,
    /// The percussive sound of an FX chip.
    pub chip_sound: Option<u8>,
}

impl ButtonPress {
    /// Whether this press is a chip.
    #[must_use]
    pub const fn is_chip(&self) -> bool {
        self.duration == 0
    }
}

/// A laser lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaserSide {
    /// The left (blue) laser, vox track 1.
    Left,
    /// The right (red) laser, vox track 8.
    Right,
}

impl LaserSide {
    /// Both sides in the order of ksh columns.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Looks up the side of a vox track number.
    #[must_use]
    pub const fn from_track(track: u8) -> Option<Self> {
        match track {
            1 => Some(Self::Left),
            8 => Some(Self::Right),
            _ => None,
        }
    }

    /// The vox track number.
    #[must_use]
    pub const fn track(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Right => 8,
        }
    }

    /// Side letter used in ksh option keys.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Right => 'r',
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Whether a laser node begins, continues, or ends a laser line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaserContinuity {
    /// A node in the middle of a laser line.
    Continue,
    /// The first node of a laser line.
    Start,
    /// The last node of a laser line.
    End,
}

impl LaserContinuity {
    /// Looks up the continuity of a vox code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Continue),
            1 => Some(Self::Start),
            2 => Some(Self::End),
            _ => None,
        }
    }
}

/// Audio filter applied while a laser is operated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaserFilter {
    /// Peaking filter.
    #[default]
    Peak,
    /// Low-pass filter.
    Lowpass,
    /// High-pass filter.
    Highpass,
    /// Bit crusher.
    Bitcrush,
    /// No filter.
    None,
}

impl LaserFilter {
    /// Looks up the filter of a vox filter id.
    #[must_use]
    pub const fn from_vox_id(id: u8) -> Option<Self> {
        match id {
            0 | 6 => Some(Self::Peak),
            1 | 2 => Some(Self::Lowpass),
            3 | 4 => Some(Self::Highpass),
            5 => Some(Self::Bitcrush),
            _ => None,
        }
    }

    /// The ksh `filtertype` value, or `None` for [`LaserFilter::None`].
    #[must_use]
    pub const fn ksh_name(self) -> Option<&'static str> {
        match self {
            Self::Peak => Some("peak"),
            Self::Lowpass => Some("lpf1"),
            Self::Highpass => Some("hpf1"),
            Self::Bitcrush => Some("bitc"),
            Self::None => None,
        }
    }
}

/// Spin gesture attached to the start of a slam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollKind {
    /// A spin lasting about one measure.
    Measure,
    /// A spin lasting about half a measure.
    HalfMeasure,
    /// A spin lasting about three beats.
    ThreeBeat,
    /// A long spin of two measures.
    Cancer,
    /// A swing to the side.
    Swing,
}

impl RollKind {
    /// Looks up the roll kind of a vox code. 0 means no roll.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Measure),
            2 => Some(Self::HalfMeasure),
            3 => Some(Self::ThreeBeat),
            4 => Some(Self::Cancer),
            5 => Some(Self::Swing),
            _ => None,
        }
    }
}

/// Maximum laser position on the 7-bit scale.
pub const LASER_POSITION_MAX: u8 = 127;

/// A node of a laser line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaserNode {
    /// The lane of the node.
    pub side: LaserSide,
    /// Horizontal position from 0 (left) to 127 (right).
    pub position: u8,
    /// Continuity of the laser line at this node.
    pub continuity: LaserContinuity,
    /// Width multiplier of the laser lane, at least 1.
    pub range: u32,
    /// Filter applied while the laser is operated.
    pub filter: LaserFilter,
    /// Spin gesture, meaningful on the start of a slam.
    pub roll: Option<RollKind>,
}

impl LaserNode {
    /// Creates a node with range 1, the peak filter and no roll.
    #[must_use]
    pub const fn new(side: LaserSide, position: u8, continuity: LaserContinuity) -> Self {
        Self {
            side,
            position,
            continuity,
            range: 1,
            filter: LaserFilter::Peak,
            roll: None,
        }
    }
}

/// An error occurred when pairing two laser nodes into a slam.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlamError {
    /// Both nodes are at the same position.
    #[error("slam starts and ends at the same position {0}")]
    SamePosition(u8),
    /// The nodes are on different sides.
    #[error("slam nodes are on different sides")]
    DifferentSides,
}

/// Direction of a slam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlamDirection {
    /// Towards position 0.
    Left,
    /// Towards position 127.
    Right,
}

/// An instant laser movement between two nodes at the same timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaserSlam {
    start: LaserNode,
    end: LaserNode,
}

impl LaserSlam {
    /// Pairs `start` and `end` into a slam.
    pub const fn new(start: LaserNode, end: LaserNode) -> Result<Self, SlamError> {
        if start.position == end.position {
            return Err(SlamError::SamePosition(start.position));
        }
        if start.side.index() != end.side.index() {
            return Err(SlamError::DifferentSides);
        }
        Ok(Self { start, end })
    }

    /// The node the slam starts from.
    #[must_use]
    pub const fn start(&self) -> &LaserNode {
        &self.start
    }

    /// The node the slam moves to.
    #[must_use]
    pub const fn end(&self) -> &LaserNode {
        &self.end
    }

    /// The direction of the movement.
    #[must_use]
    pub const fn direction(&self) -> SlamDirection {
        if self.start.position > self.end.position {
            SlamDirection::Left
        } else {
            SlamDirection::Right
        }
    }
}

/// Something placed on a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackEvent {
    /// A button chip or hold.
    Button(ButtonPress),
    /// A single laser node.
    Laser(LaserNode),
    /// A laser slam.
    Slam(LaserSlam),
}

/// Camera parameter driven by the `SPCONTROLLER` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CameraParam {
    /// `CAM_RotX`, the top zoom.
    RotX,
    /// `CAM_Radi`, the bottom zoom.
    Radi,
    /// `Realize`, lane lighting.
    Realize,
    /// `AIRL_ScaX`.
    AirLScaX,
    /// `AIRR_ScaX`.
    AirRScaX,
    /// `Tilt`, the manual tilt.
    Tilt,
    /// `LaneY`, the lane toggle.
    LaneY,
}

impl CameraParam {
    /// Looks up the parameter of a vox name.
    #[must_use]
    pub fn from_vox_name(name: &str) -> Option<Self> {
        Some(match name {
            "CAM_RotX" => Self::RotX,
            "CAM_Radi" => Self::Radi,
            "Realize" => Self::Realize,
            "AIRL_ScaX" => Self::AirLScaX,
            "AIRR_ScaX" => Self::AirRScaX,
            "Tilt" => Self::Tilt,
            "LaneY" => Self::LaneY,
            _ => return None,
        })
    }
}

/// Linear motion of a camera parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraNode {
    /// Value at the start.
    pub start: f64,
    /// Value at the end.
    pub end: f64,
    /// Length of the motion in ticks.
    pub duration: u32,
}

/// How strongly the playfield tilts with the lasers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TiltMode {
    /// Regular tilt.
    Normal,
    /// Stronger tilt.
    Bigger,
    /// Stronger tilt kept between lasers.
    KeepBigger,
}

impl TiltMode {
    /// Looks up the mode of a vox id.
    #[must_use]
    pub const fn from_vox_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Normal),
            1 => Some(Self::Bigger),
            2 => Some(Self::KeepBigger),
            _ => None,
        }
    }

    /// The ksh `tilt` value.
    #[must_use]
    pub const fn ksh_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bigger => "bigger",
            Self::KeepBigger => "keep_bigger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slam_rejects_degenerate_pairs() {
        let a = LaserNode::new(LaserSide::Left, 0, LaserContinuity::Start);
        let b = LaserNode::new(LaserSide::Left, 127, LaserContinuity::End);
        let c = LaserNode::new(LaserSide::Right, 127, LaserContinuity::End);

        let slam = LaserSlam::new(a, b).unwrap();
        assert_eq!(slam.direction(), SlamDirection::Right);
        assert_eq!(LaserSlam::new(b, a).unwrap().direction(), SlamDirection::Left);
        assert_eq!(LaserSlam::new(a, a), Err(SlamError::SamePosition(0)));
        assert_eq!(LaserSlam::new(a, c), Err(SlamError::DifferentSides));
    }

    #[test]
    fn track_numbers() {
        assert_eq!(Button::from_track(2), Some(Button::FxL));
        assert_eq!(Button::from_track(9), None);
        assert_eq!(Button::FxR.track(), 7);
        assert_eq!(LaserSide::from_track(8), Some(LaserSide::Right));
        assert_eq!(LaserSide::from_track(2), None);
    }
}
