//! Diagnostics collected while converting a chart.
//!
//! Every problem found while reading the vox input or writing the ksh output is recorded as a
//! [`Diagnostic`] in a [`DiagnosticSink`]. Diagnostics come in three [`Level`]s:
//!
//! - [`Level::Abnormality`]: the input deviates from a constant pattern it usually has. The
//!   conversion is not affected.
//! - [`Level::Warning`]: a value could not be interpreted and a default was substituted.
//! - [`Level::Error`]: the chart cannot be converted any further.
//!
//! Every record is also forwarded to the [`log`] facade, so a driver only needs to install a
//! logger to see them as they happen.
//!
//! With the `diagnostics` feature, input diagnostics can be rendered with `ariadne`:
//!
//! ```rust
//! use vox2ksh::diagnostics::{DiagnosticSink, Level, Tag, emit_diagnostics};
//!
//! let source = "#FORMAT VERSION\nten\n#END\n";
//! let mut sink = DiagnosticSink::new("song.vox");
//! sink.set_line(2, Some(16..19));
//! sink.record(Level::Warning, Tag::VersionParse, "format version is not a number");
//!
//! emit_diagnostics("song.vox", source, sink.diagnostics());
//! ```

use std::{fmt, ops::Range};

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// The input deviates from an expected but non-critical constant pattern.
    Abnormality,
    /// A value could not be interpreted and a fallback was substituted.
    Warning,
    /// The chart cannot be meaningfully converted further.
    Error,
}

impl Level {
    /// Short name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abnormality => "abnormal",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    const fn log_level(self) -> log::Level {
        match self {
            Self::Abnormality => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Abnormality => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short category of a [`Diagnostic`], naming the part of the converter which found it.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tag {
    /// Loading the chart or its metadata failed.
    VoxLoad,
    /// Generic structural problem in the vox text.
    VoxParse,
    /// `#FORMAT VERSION` contents.
    VersionParse,
    /// A timing field in any timed section.
    TimingParse,
    /// `#BPM` contents.
    BpmParse,
    /// `#BPM INFO` contents.
    BpmInfo,
    /// `#BEAT INFO` contents.
    BeatInfo,
    /// `#TILT MODE INFO` contents.
    TiltParse,
    /// `#END POSITION` contents.
    EndPosition,
    /// A `define` statement.
    FxDefine,
    /// A legacy sound id referenced by a `define` statement.
    FxParse,
    /// `#FXBUTTON EFFECT INFO` contents.
    FxLoad,
    /// `#TAB EFFECT INFO` contents.
    TabEffect,
    /// `#TAB PARAM ASSIGN INFO` contents.
    TabParamAssign,
    /// `#SPCONTROLLER` contents.
    SpcontrollerLoad,
    /// A laser node line.
    LaserLoad,
    /// The roll kind of a laser node.
    RollParse,
    /// Pairing laser nodes into a slam.
    SlamParse,
    /// A button line.
    ButtonLoad,
    /// The effect assigned to an FX hold.
    ButtonFx,
    /// The chip sound assigned to an FX chip.
    ChipSoundParse,
    /// Camera output.
    SpnodeOutput,
    /// Laser output.
    KshLaser,
    /// Generic output problem.
    KshOutput,
}

impl Tag {
    /// Short name used in reports, such as `fx_load`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VoxLoad => "vox_load",
            Self::VoxParse => "vox_parse",
            Self::VersionParse => "version_parse",
            Self::TimingParse => "timing_parse",
            Self::BpmParse => "bpm_parse",
            Self::BpmInfo => "bpm_info",
            Self::BeatInfo => "beat_info",
            Self::TiltParse => "tilt_parse",
            Self::EndPosition => "end_position",
            Self::FxDefine => "fx_define",
            Self::FxParse => "fx_parse",
            Self::FxLoad => "fx_load",
            Self::TabEffect => "tab_effect",
            Self::TabParamAssign => "tab_param_assign",
            Self::SpcontrollerLoad => "spcontroller_load",
            Self::LaserLoad => "laser_load",
            Self::RollParse => "roll_parse",
            Self::SlamParse => "slam_parse",
            Self::ButtonLoad => "button_load",
            Self::ButtonFx => "button_fx",
            Self::ChipSoundParse => "chip_sound_parse",
            Self::SpnodeOutput => "spnode_output",
            Self::KshLaser => "ksh_laser",
            Self::KshOutput => "ksh_output",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Category.
    pub tag: Tag,
    /// Human readable description.
    pub message: String,
    /// The input or output file name which was being processed.
    pub file: String,
    /// The 1-based line number in `file`, or 0 if no line was being processed.
    pub line: usize,
    /// Byte span of the offending line in the input text, if the diagnostic refers to input.
    pub span: Option<Range<usize>>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}\n{} / {}: {}",
            self.file, self.line, self.level, self.tag, self.message
        )
    }
}

/// Collector of [`Diagnostic`]s for one chart.
///
/// The sink remembers which file and line is being processed, so the code recording a
/// problem only has to describe it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSink {
    file: String,
    line: usize,
    span: Option<Range<usize>>,
    diagnostics: Vec<Diagnostic>,
    counts: [usize; 3],
}

impl DiagnosticSink {
    /// Creates an empty sink reporting against `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Switches the file name reported by later records, such as from input to output.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = file.into();
        self.line = 0;
        self.span = None;
    }

    /// Sets the line being processed.
    pub fn set_line(&mut self, line: usize, span: Option<Range<usize>>) {
        self.line = line;
        self.span = span;
    }

    /// The line being processed.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Records a diagnostic at the current position and forwards it to the logger.
    pub fn record(&mut self, level: Level, tag: Tag, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            level,
            tag,
            message: message.into(),
            file: self.file.clone(),
            line: self.line,
            span: self.span.clone(),
        };
        log::log!(
            level.log_level(),
            "{}:{} {} / {}: {}",
            diagnostic.file,
            diagnostic.line,
            level,
            tag,
            diagnostic.message
        );
        if let Some(count) = self.counts.get_mut(level.index()) {
            *count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Records a [`Level::Abnormality`].
    pub fn abnormality(&mut self, tag: Tag, message: impl Into<String>) {
        self.record(Level::Abnormality, tag, message);
    }

    /// Records a [`Level::Warning`].
    pub fn warning(&mut self, tag: Tag, message: impl Into<String>) {
        self.record(Level::Warning, tag, message);
    }

    /// Records a [`Level::Error`].
    pub fn error(&mut self, tag: Tag, message: impl Into<String>) {
        self.record(Level::Error, tag, message);
    }

    /// Number of diagnostics recorded at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.counts.get(level.index()).copied().unwrap_or_default()
    }

    /// Whether anything was recorded at all.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Recorded diagnostics in recording order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Takes the recorded diagnostics out of the sink.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Source container that holds the file name and the decoded source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SourceFile<'a> {
    /// Creates a new source container.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Source text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

#[cfg(feature = "diagnostics")]
pub use self::report::{ToAriadne, emit_diagnostics};

#[cfg(feature = "diagnostics")]
mod report {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    use super::{Diagnostic, Level, SourceFile};

    /// Conversion of a positioned diagnostic into an `ariadne::Report`.
    pub trait ToAriadne {
        /// Builds the report. Ariadne calculates rows and columns from the byte span.
        fn to_report<'a>(
            &self,
            src: &SourceFile<'a>,
        ) -> Report<'a, (String, std::ops::Range<usize>)>;
    }

    impl ToAriadne for Diagnostic {
        fn to_report<'a>(
            &self,
            src: &SourceFile<'a>,
        ) -> Report<'a, (String, std::ops::Range<usize>)> {
            let span = self.span.clone().unwrap_or(0..0);
            let filename = src.name().to_string();
            let (kind, color) = match self.level {
                Level::Abnormality => (ReportKind::Advice, Color::Cyan),
                Level::Warning => (ReportKind::Warning, Color::Yellow),
                Level::Error => (ReportKind::Error, Color::Red),
            };
            Report::build(kind, (filename.clone(), span.clone()))
                .with_message(format!("{}: {}", self.tag, self.message))
                .with_label(Label::new((filename, span)).with_color(color))
                .finish()
        }
    }

    /// Renders every input diagnostic of `diagnostics` against `source`.
    ///
    /// Diagnostics without a span, such as the ones produced while writing the output, are
    /// printed in their plain `Display` form.
    pub fn emit_diagnostics<'a>(
        name: &'a str,
        source: &'a str,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    ) {
        let simple = SourceFile::new(name, source);
        let ariadne_source = Source::from(source);
        for diagnostic in diagnostics {
            if diagnostic.span.is_none() {
                eprintln!("{diagnostic}\n");
                continue;
            }
            let report = diagnostic.to_report(&simple);
            let _ = report.eprint((name.to_string(), ariadne_source.clone()));
        }
    }
}
