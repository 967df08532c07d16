//! One tick of a ksh chart body: option lines followed by a note line.

use std::fmt;

use crate::vox::model::{Button, LASER_POSITION_MAX, LaserSide};

/// Symbols of laser positions, from the left edge to the right edge.
const LASER_ALPHABET: &[u8; 49] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXabcdefghijklmno";

/// The glyph of a laser position on the 7-bit scale.
#[must_use]
pub fn laser_glyph(position: u8) -> char {
    let last = LASER_ALPHABET.len() - 1;
    let position = usize::from(position.min(LASER_POSITION_MAX));
    let max = usize::from(LASER_POSITION_MAX);
    // ceil(position / max * last) in integers
    let index = (position * last).div_ceil(max);
    LASER_ALPHABET.get(index).map_or('o', |&glyph| char::from(glyph))
}

/// State of a button column on one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Not pressed.
    #[default]
    None,
    /// A chip.
    Press,
    /// Inside a hold.
    Hold,
}

impl ButtonState {
    const fn glyph(self, fx: bool) -> char {
        match (self, fx) {
            (Self::None, _) => '0',
            (Self::Press, false) | (Self::Hold, true) => '1',
            (Self::Hold, false) | (Self::Press, true) => '2',
        }
    }
}

/// State of a laser column on one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LaserGlyph {
    /// No laser.
    #[default]
    None,
    /// The laser continues from an earlier node.
    Continue,
    /// A node at the position.
    Node(u8),
}

impl LaserGlyph {
    fn glyph(self) -> char {
        match self {
            Self::None => '-',
            Self::Continue => ':',
            Self::Node(position) => laser_glyph(position),
        }
    }
}

/// Everything written for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    /// `key=value` lines written before the note line.
    pub options: Vec<String>,
    bt: [ButtonState; 4],
    fx: [ButtonState; 2],
    lasers: [LaserGlyph; 2],
    /// Spin suffix such as `@(192`.
    pub spin: Option<String>,
}

impl LineBuffer {
    /// Creates an empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option line.
    pub fn option(&mut self, key: &str, value: impl fmt::Display) {
        self.options.push(format!("{key}={value}"));
    }

    fn button_slot(&mut self, button: Button) -> Option<&mut ButtonState> {
        match button {
            Button::FxL => self.fx.get_mut(0),
            Button::FxR => self.fx.get_mut(1),
            Button::BtA => self.bt.get_mut(0),
            Button::BtB => self.bt.get_mut(1),
            Button::BtC => self.bt.get_mut(2),
            Button::BtD => self.bt.get_mut(3),
        }
    }

    /// Sets the column of `button`.
    pub fn set_button(&mut self, button: Button, state: ButtonState) {
        if let Some(slot) = self.button_slot(button) {
            *slot = state;
        }
    }

    /// The column of `side`.
    #[must_use]
    pub fn laser(&self, side: LaserSide) -> LaserGlyph {
        self.lasers.get(side.index()).copied().unwrap_or_default()
    }

    /// Sets the column of `side`.
    pub fn set_laser(&mut self, side: LaserSide, glyph: LaserGlyph) {
        if let Some(slot) = self.lasers.get_mut(side.index()) {
            *slot = glyph;
        }
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for option in &self.options {
            writeln!(f, "{option}")?;
        }
        for state in self.bt {
            write!(f, "{}", state.glyph(false))?;
        }
        write!(f, "|")?;
        for state in self.fx {
            write!(f, "{}", state.glyph(true))?;
        }
        write!(f, "|")?;
        for laser in self.lasers {
            write!(f, "{}", laser.glyph())?;
        }
        if let Some(spin) = &self.spin {
            write!(f, "{spin}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn laser_alphabet_edges() {
        assert_eq!(laser_glyph(0), '0');
        assert_eq!(laser_glyph(127), 'o');
        assert_eq!(laser_glyph(1), '1');
        // 64 / 127 * 48 = 24.19, rounded up to 25
        assert_eq!(laser_glyph(64), 'P');
        assert_eq!(laser_glyph(200), 'o');
    }

    #[test]
    fn empty_line() {
        assert_eq!(LineBuffer::new().to_string(), "0000|00|--");
    }

    #[test]
    fn glyphs_and_options() {
        let mut line = LineBuffer::new();
        line.option("t", 120);
        line.set_button(Button::BtA, ButtonState::Press);
        line.set_button(Button::BtD, ButtonState::Hold);
        line.set_button(Button::FxL, ButtonState::Hold);
        line.set_button(Button::FxR, ButtonState::Press);
        line.set_laser(LaserSide::Left, LaserGlyph::Node(0));
        line.set_laser(LaserSide::Right, LaserGlyph::Continue);
        line.spin = Some("@(192".to_string());
        assert_eq!(line.to_string(), "t=120\n1002|12|0:@(192");
    }
}
