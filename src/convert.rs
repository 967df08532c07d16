//! The conversion of one vox chart into one ksh chart.
//!
//! [`convert_chart`] reads the identity of the chart from its file name, looks up the song
//! in a [`MetadataSource`], parses the vox text, and renders the ksh text. Everything reported
//! along the way is returned with the result.

use std::{collections::BTreeSet, time::Instant};

use thiserror::Error;

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, Level, Tag},
    ksh::{ConvertError, KshHeader, render_ksh},
    song::{
        ChartId, Difficulty, FileNameError, InfiniteVersion, MetadataError, MetadataSource,
        SongMetadata,
    },
    vox::{ParseError, parse_vox_with_sink},
};

pub use crate::ksh::{AssetInfo, RenderConfig};

/// An error which stopped the conversion of a chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The file name does not identify a chart.
    #[error(transparent)]
    FileName(#[from] FileNameError),
    /// The catalog has no metadata for the chart.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// The vox text is structurally broken.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The chart cannot be written in ksh.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// A converted chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KshChart {
    /// Directory of the song, named after its ASCII name.
    pub song_dir: String,
    /// File name of the chart in the song directory, such as `chart_exh.ksh`.
    pub file_name: String,
    /// The ksh text.
    pub text: String,
    /// FX chip sounds the chart plays, to be copied next to it.
    pub required_chip_sounds: BTreeSet<u8>,
}

impl KshChart {
    /// Path of the chart relative to the output directory.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.song_dir, self.file_name)
    }
}

/// Output of [`convert_chart`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ConvertOutput {
    /// The converted chart, or the error which stopped the conversion.
    pub chart: Result<KshChart, Error>,
    /// Everything reported while converting.
    pub diagnostics: Vec<Diagnostic>,
}

/// The file name of the chart of `difficulty` of `song`. Infinite charts are named after the
/// game version they belong to.
#[must_use]
pub fn chart_file_name(difficulty: Difficulty, song: &SongMetadata) -> String {
    let abbreviation = match difficulty {
        Difficulty::Infinite => InfiniteVersion::from_catalog(song.inf_ver)
            .map_or(difficulty.abbreviation(), InfiniteVersion::abbreviation),
        _ => difficulty.abbreviation(),
    };
    format!("chart_{abbreviation}.ksh")
}

/// Converts the decoded vox text `source` of the file `file_name`.
pub fn convert_chart(
    file_name: &str,
    source: &str,
    metadata: &impl MetadataSource,
    assets: &AssetInfo,
    config: &RenderConfig,
) -> ConvertOutput {
    let started = Instant::now();
    log::info!("processing {file_name:?}");
    let mut sink = DiagnosticSink::new(file_name);
    let chart = convert_with_sink(file_name, source, metadata, assets, config, &mut sink);

    let elapsed = started.elapsed().as_secs_f64();
    match &chart {
        Ok(chart) if sink.has_issues() => log::info!(
            "wrote {:?} in {elapsed:.4}s with {} abnormalities, {} warnings, and {} errors",
            chart.path(),
            sink.count(Level::Abnormality),
            sink.count(Level::Warning),
            sink.count(Level::Error),
        ),
        Ok(chart) => log::info!("wrote {:?} in {elapsed:.4}s with no issues", chart.path()),
        Err(error) => log::info!("conversion of {file_name:?} failed: {error}"),
    }
    ConvertOutput {
        chart,
        diagnostics: sink.into_diagnostics(),
    }
}

fn convert_with_sink(
    file_name: &str,
    source: &str,
    metadata: &impl MetadataSource,
    assets: &AssetInfo,
    config: &RenderConfig,
    sink: &mut DiagnosticSink,
) -> Result<KshChart, Error> {
    let load = |sink: &mut DiagnosticSink, error: Error| {
        sink.error(Tag::VoxLoad, error.to_string());
        error
    };
    let chart = ChartId::from_file_name(file_name).map_err(|e| load(sink, e.into()))?;
    let song = metadata
        .lookup(chart.song_id)
        .map_err(|e| load(sink, e.into()))?
        .sanitized();
    let header = KshHeader::new(file_name, &chart, &song, assets, config)
        .map_err(|e| load(sink, e.into()))?;

    let mut vox = parse_vox_with_sink(source, sink)?;

    let output = KshChart {
        song_dir: song.ascii.clone(),
        file_name: chart_file_name(chart.difficulty, &song),
        text: String::new(),
        required_chip_sounds: vox.required_chip_sounds.clone(),
    };
    sink.set_file(output.path());
    let text = render_ksh(&mut vox, &header, config, sink).map_err(|error| {
        sink.error(Tag::KshOutput, error.to_string());
        error
    })?;
    Ok(KshChart { text, ..output })
}
