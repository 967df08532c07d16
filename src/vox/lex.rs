//! Classification of the physical lines of a vox document.
//!
//! Every line is trimmed and turned into a [`Line`], wrapped in [`Spanned`] to keep its line
//! number and byte range in the source for diagnostics.

use std::ops::Range;

/// A value with the line number and byte range it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spanned<T> {
    /// Wrapped content value
    content: T,
    /// Line number, 1-based
    line: usize,
    /// Start index in the source string (0-based, inclusive)
    start: usize,
    /// End index in the source string (0-based, exclusive)
    end: usize,
}

impl<T> Spanned<T> {
    /// Wraps `content` read from `line` at `start..end`.
    pub const fn new(content: T, line: usize, start: usize, end: usize) -> Self {
        Self {
            content,
            line,
            start,
            end,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Returns the 1-based line number.
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the byte range in the source.
    pub const fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A section named by a `#` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section<'a> {
    /// `#FORMAT VERSION`
    FormatVersion,
    /// `#BPM`
    Bpm,
    /// `#BPM INFO`
    BpmInfo,
    /// `#TILT MODE INFO`
    TiltModeInfo,
    /// `#BEAT INFO`
    BeatInfo,
    /// `#END POSITION`, also spelled `#END POSISION`
    EndPosition,
    /// `#SOUND ID START`
    SoundId,
    /// `#FXBUTTON EFFECT INFO`
    FxButtonEffect,
    /// `#TAB EFFECT INFO`
    TabEffect,
    /// `#TAB PARAM ASSIGN INFO`
    TabParamAssign,
    /// `#TRACK AUTO TAB`
    TrackAutoTab,
    /// `#SPCONTROLLER`, also spelled `#SPCONTROLER`
    SpController,
    /// `#TRACK<n>`
    Track(u8),
    /// `#END`, which closes the current section
    End,
    /// Any other header
    Unknown(&'a str),
}

impl<'a> Section<'a> {
    /// Reads the section of a header token. Returns `None` for decorative headers.
    #[must_use]
    pub fn from_token(token: &'a str) -> Option<Self> {
        if token.starts_with('=') || token.starts_with(' ') {
            return None;
        }
        Some(match token {
            "END" => Self::End,
            "FORMAT VERSION" => Self::FormatVersion,
            "BPM" => Self::Bpm,
            "BPM INFO" => Self::BpmInfo,
            "TILT MODE INFO" => Self::TiltModeInfo,
            "BEAT INFO" => Self::BeatInfo,
            "END POSITION" | "END POSISION" => Self::EndPosition,
            "SOUND ID START" => Self::SoundId,
            "FXBUTTON EFFECT INFO" => Self::FxButtonEffect,
            "TAB EFFECT INFO" => Self::TabEffect,
            "TAB PARAM ASSIGN INFO" => Self::TabParamAssign,
            "TRACK AUTO TAB" => Self::TrackAutoTab,
            "SPCONTROLER" | "SPCONTROLLER" => Self::SpController,
            _ => token
                .strip_prefix("TRACK")
                .and_then(|number| number.trim().parse().ok())
                .map_or(Self::Unknown(token), Self::Track),
        })
    }
}

/// A classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line<'a> {
    /// An empty line.
    Blank,
    /// A `//` comment, without the slashes.
    Comment(&'a str),
    /// A section header.
    Header(Section<'a>),
    /// A header only used as decoration, such as `#=====`.
    Decoration,
    /// A `define` statement with its name and value operands.
    Define {
        /// The defined name.
        name: &'a str,
        /// The unparsed value.
        value: &'a str,
    },
    /// A `define` statement without exactly two operands.
    MalformedDefine(&'a str),
    /// Any other line, handled by the current section.
    Data(&'a str),
}

impl<'a> Line<'a> {
    /// Classifies one trimmed line.
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            return Self::Blank;
        }
        if let Some(comment) = line.strip_prefix("//") {
            return Self::Comment(comment);
        }
        if line.starts_with('#') {
            let token = line.split('#').nth(1).unwrap_or_default();
            return Section::from_token(token).map_or(Self::Decoration, Self::Header);
        }
        if line.starts_with("define\t") {
            let operands: Vec<_> = line.split('\t').collect();
            return match *operands.as_slice() {
                [_, name, value] => Self::Define { name, value },
                _ => Self::MalformedDefine(line),
            };
        }
        Self::Data(line)
    }
}

/// Splits `source` into classified lines.
#[must_use]
pub fn lex_lines(source: &str) -> Vec<Spanned<Line<'_>>> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(index, raw)| {
            let start = offset;
            offset += raw.len();
            let content = raw.trim_end_matches(['\n', '\r']);
            Spanned::new(
                Line::classify(content.trim()),
                index + 1,
                start,
                start + content.len(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn classify_headers() {
        assert_eq!(
            Line::classify("#BEAT INFO"),
            Line::Header(Section::BeatInfo)
        );
        assert_eq!(
            Line::classify("#END POSISION"),
            Line::Header(Section::EndPosition)
        );
        assert_eq!(Line::classify("#TRACK8"), Line::Header(Section::Track(8)));
        assert_eq!(Line::classify("#END"), Line::Header(Section::End));
        assert_eq!(Line::classify("#=====#"), Line::Decoration);
        assert_eq!(Line::classify("# comment-like #"), Line::Decoration);
        assert_eq!(
            Line::classify("#MYSTERY SECTION"),
            Line::Header(Section::Unknown("MYSTERY SECTION"))
        );
    }

    #[test]
    fn classify_other_lines() {
        assert_eq!(Line::classify(""), Line::Blank);
        assert_eq!(Line::classify("// note"), Line::Comment(" note"));
        assert_eq!(
            Line::classify("define\tRETRIG\t2"),
            Line::Define {
                name: "RETRIG",
                value: "2"
            }
        );
        assert_eq!(
            Line::classify("define\tRETRIG"),
            Line::MalformedDefine("define\tRETRIG")
        );
        assert_eq!(
            Line::classify("001,01,00\t120.00\t4"),
            Line::Data("001,01,00\t120.00\t4")
        );
    }

    #[test]
    fn lex_keeps_positions() {
        let source = "#BPM\r\n  120.00 \n\n#END";
        let lines = lex_lines(source);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].line(), 2);
        assert_eq!(*lines[1].content(), Line::Data("120.00"));
        assert_eq!(&source[lines[1].span()], "  120.00 ");
        assert_eq!(*lines[2].content(), Line::Blank);
        assert_eq!(*lines[3].content(), Line::Header(Section::End));
    }
}
