//! The header block at the top of a ksh chart.

use std::fmt;

use crate::song::{ChartId, MetadataError, SongMetadata};

use super::{DEFAULT_FILTER_GAIN, DEFAULT_SLAM_VOLUME, KSH_FORMAT_VERSION, RenderConfig};

/// Length of the song preview in milliseconds.
pub const PREVIEW_LENGTH_MS: u32 = 11000;

/// What the asset collaborator found for one chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetInfo {
    /// Number of the jacket image copied next to the chart, if any.
    pub jacket_index: Option<u8>,
    /// Whether the difficulty has its own audio track.
    pub difficulty_audio: bool,
}

/// Header fields of a ksh chart, written as `key=value` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KshHeader {
    /// Name of the converted vox file.
    pub source: String,
    /// `title`
    pub title: String,
    /// `artist`
    pub artist: String,
    /// `effect`, the chart author.
    pub effect: String,
    /// `sorttitle`
    pub sort_title: String,
    /// `sortartist`
    pub sort_artist: String,
    /// `jacket`, or empty without one.
    pub jacket: String,
    /// `illustrator`
    pub illustrator: String,
    /// `difficulty`
    pub difficulty: String,
    /// `level`
    pub level: u32,
    /// `t`, the tempo or tempo range.
    pub bpm: String,
    /// `m`, the audio file.
    pub music: String,
    /// `mvol`
    pub music_volume: u32,
    /// `bg` and `layer`.
    pub background: String,
    /// `po`, the preview offset in milliseconds.
    pub preview_offset: u32,
}

impl KshHeader {
    /// Builds the header of the chart `chart` from its catalog entry.
    ///
    /// # Errors
    ///
    /// Fails when the catalog has no entry for the difficulty of the chart.
    pub fn new(
        source: impl Into<String>,
        chart: &ChartId,
        song: &SongMetadata,
        assets: &AssetInfo,
        config: &RenderConfig,
    ) -> Result<Self, MetadataError> {
        let difficulty = song.difficulty(chart.song_id, chart.difficulty)?;
        let music = if assets.difficulty_audio {
            format!("track_{}.ogg", chart.difficulty.abbreviation())
        } else {
            "track.ogg".to_string()
        };
        Ok(Self {
            source: source.into(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            effect: difficulty.effected_by.clone(),
            sort_title: song.title_yomigana.clone(),
            sort_artist: song.artist_yomigana.clone(),
            jacket: assets
                .jacket_index
                .map(|index| format!("jacket_{index}.png"))
                .unwrap_or_default(),
            illustrator: difficulty.illustrator.clone(),
            difficulty: chart.difficulty.ksh_name().to_string(),
            level: difficulty.difnum,
            bpm: song.bpm_string(),
            music,
            music_volume: song.volume,
            background: song.background().to_string(),
            preview_offset: config.hidden_preview_position.saturating_mul(1000),
        })
    }
}

impl fmt::Display for KshHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// Source: {}", self.source)?;
        writeln!(f, "// Created by vox2ksh-{}.", env!("CARGO_PKG_VERSION"))?;
        writeln!(f, "title={}", self.title)?;
        writeln!(f, "artist={}", self.artist)?;
        writeln!(f, "effect={}", self.effect)?;
        writeln!(f, "sorttitle={}", self.sort_title)?;
        writeln!(f, "sortartist={}", self.sort_artist)?;
        writeln!(f, "jacket={}", self.jacket)?;
        writeln!(f, "illustrator={}", self.illustrator)?;
        writeln!(f, "difficulty={}", self.difficulty)?;
        writeln!(f, "level={}", self.level)?;
        writeln!(f, "t={}", self.bpm)?;
        writeln!(f, "m={}", self.music)?;
        writeln!(f, "mvol={}", self.music_volume)?;
        writeln!(f, "o=0")?;
        writeln!(f, "bg={}", self.background)?;
        writeln!(f, "layer={}", self.background)?;
        writeln!(f, "po={}", self.preview_offset)?;
        writeln!(f, "plength={PREVIEW_LENGTH_MS}")?;
        writeln!(f, "pfiltergain={DEFAULT_FILTER_GAIN}")?;
        writeln!(f, "filtertype=peak")?;
        writeln!(f, "chokkakuautovol=0")?;
        writeln!(f, "chokkakuvol={DEFAULT_SLAM_VOLUME}")?;
        writeln!(f, "ver={KSH_FORMAT_VERSION}")
    }
}
