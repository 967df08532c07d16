//! Song identity and catalog metadata.
//!
//! A vox file name tells the song and the difficulty of the chart, such as
//! `004_1048_beyond_the_earth_5m.vox`. Titles, artists, and the rest of the header come from
//! a catalog queried through [`MetadataSource`].

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

/// A difficulty of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    /// Novice, letter `n`.
    Novice,
    /// Advanced, letter `a`.
    Advanced,
    /// Exhaust, letter `e`.
    Exhaust,
    /// The fourth difficulty of older games, letter `i`.
    Infinite,
    /// Maximum, letter `m`.
    Maximum,
}

impl Difficulty {
    /// Looks up the difficulty of a file name letter.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'n' => Self::Novice,
            'a' => Self::Advanced,
            'e' => Self::Exhaust,
            'i' => Self::Infinite,
            'm' => Self::Maximum,
            _ => return None,
        })
    }

    /// The ksh `difficulty` value.
    #[must_use]
    pub const fn ksh_name(self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Advanced => "challenge",
            Self::Exhaust => "extended",
            Self::Infinite | Self::Maximum => "infinite",
        }
    }

    /// Three-letter abbreviation used in output file names.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Novice => "nov",
            Self::Advanced => "adv",
            Self::Exhaust => "exh",
            Self::Infinite => "inf",
            Self::Maximum => "mxm",
        }
    }

    /// Number of the jacket image belonging to the difficulty, from 1.
    #[must_use]
    pub const fn jacket_number(self) -> u8 {
        match self {
            Self::Novice => 1,
            Self::Advanced => 2,
            Self::Exhaust => 3,
            Self::Infinite => 4,
            Self::Maximum => 5,
        }
    }
}

/// The game version an [`Difficulty::Infinite`] chart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfiniteVersion {
    /// `inf`, catalog value 2.
    Infinite,
    /// `grv`, catalog value 3.
    Gravity,
    /// `hvn`, catalog value 4.
    Heavenly,
    /// `vvd`, catalog value 5.
    Vivid,
}

impl InfiniteVersion {
    /// Looks up the version of a catalog `inf_ver` value.
    #[must_use]
    pub const fn from_catalog(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::Infinite),
            3 => Some(Self::Gravity),
            4 => Some(Self::Heavenly),
            5 => Some(Self::Vivid),
            _ => None,
        }
    }

    /// Three-letter abbreviation used in output file names.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Infinite => "inf",
            Self::Gravity => "grv",
            Self::Heavenly => "hvn",
            Self::Vivid => "vvd",
        }
    }
}

/// An error occurred when reading a chart identity from a file name.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileNameError {
    /// The game or song id is missing or not a number.
    #[error("unable to parse the song id from file name {0:?}")]
    SongId(String),
    /// The difficulty letter or index is missing or unknown.
    #[error("unable to parse difficulty from file name {0:?}")]
    Difficulty(String),
}

/// Identity of a chart, read from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartId {
    /// The game the chart first appeared in.
    pub game_id: u32,
    /// The song.
    pub song_id: u32,
    /// The difficulty.
    pub difficulty: Difficulty,
    /// The digit before the difficulty letter.
    pub difficulty_index: char,
}

impl ChartId {
    /// Reads `<game>_<song>_..._<index><letter>.vox`.
    ///
    /// # Errors
    ///
    /// Fails when the ids are not numbers or the difficulty is not recognized.
    pub fn from_file_name(file_name: &str) -> Result<Self, FileNameError> {
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem);
        let mut fields = stem.split('_');
        let mut id = || {
            fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| FileNameError::SongId(file_name.to_string()))
        };
        let game_id = id()?;
        let song_id = id()?;
        let mut tail = stem.chars().rev();
        let (Some(letter), Some(difficulty_index)) = (tail.next(), tail.next()) else {
            return Err(FileNameError::Difficulty(file_name.to_string()));
        };
        let difficulty = Difficulty::from_letter(letter)
            .ok_or_else(|| FileNameError::Difficulty(file_name.to_string()))?;
        Ok(Self {
            game_id,
            song_id,
            difficulty,
            difficulty_index,
        })
    }
}

/// Metadata of one difficulty of a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyMetadata {
    /// Chart author.
    pub effected_by: String,
    /// Jacket illustrator.
    pub illustrator: String,
    /// Level number.
    pub difnum: u32,
}

/// Catalog metadata of a song.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongMetadata {
    /// ASCII name, used as the output directory.
    pub ascii: String,
    /// Title.
    pub title: String,
    /// Artist.
    pub artist: String,
    /// Reading of the title, used for sorting.
    pub title_yomigana: String,
    /// Reading of the artist, used for sorting.
    pub artist_yomigana: String,
    /// Minimum tempo times 100.
    pub bpm_min: u32,
    /// Maximum tempo times 100.
    pub bpm_max: u32,
    /// Music volume in percent.
    pub volume: u32,
    /// Background id.
    pub bg_no: u32,
    /// Game version of the infinite difficulty.
    pub inf_ver: u8,
    /// Per-difficulty metadata.
    pub difficulties: BTreeMap<Difficulty, DifficultyMetadata>,
}

impl SongMetadata {
    /// The metadata of `difficulty`.
    ///
    /// # Errors
    ///
    /// Fails when the song has no entry for the difficulty.
    pub fn difficulty(
        &self,
        song_id: u32,
        difficulty: Difficulty,
    ) -> Result<&DifficultyMetadata, MetadataError> {
        self.difficulties
            .get(&difficulty)
            .ok_or(MetadataError::DifficultyNotFound {
                song_id,
                difficulty,
            })
    }

    /// The ksh `t` header value: the tempo, or `min-max` for songs with tempo changes.
    #[must_use]
    pub fn bpm_string(&self) -> String {
        if self.bpm_min == self.bpm_max {
            (self.bpm_min / 100).to_string()
        } else {
            format!("{}-{}", self.bpm_min / 100, self.bpm_max / 100)
        }
    }

    /// The ksh background name of `bg_no`.
    #[must_use]
    pub const fn background(&self) -> &'static str {
        background_name(self.bg_no)
    }

    /// Sanitizes every text field with [`sanitize`].
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for text in [
            &mut self.ascii,
            &mut self.title,
            &mut self.artist,
            &mut self.title_yomigana,
            &mut self.artist_yomigana,
        ] {
            *text = sanitize(text);
        }
        for difficulty in self.difficulties.values_mut() {
            difficulty.effected_by = sanitize(&difficulty.effected_by);
            difficulty.illustrator = sanitize(&difficulty.illustrator);
        }
        self
    }
}

/// The ksh background name of a vox background id.
#[must_use]
pub const fn background_name(bg_no: u32) -> &'static str {
    match bg_no {
        0 | 1 | 14..=16 | 71 => "techno",
        2 | 6 | 11..=13 => "wave",
        3 | 7 => "arrow",
        4 | 8 => "sakura",
        63 => "smoke",
        65 => "snow",
        _ => "fallback",
    }
}

/// Code points of the catalog encoding which do not survive the trip to UTF-8.
const UNMAPPABLE: [char; 22] = [
    '\u{301C}', '\u{49FA}', '\u{5F5C}', '\u{66E6}', '\u{66E9}', '\u{7F47}', '\u{8E94}',
    '\u{9A2B}', '\u{9A69}', '\u{9A6B}', '\u{9A6A}', '\u{9AAD}', '\u{9B2F}', '\u{9EF7}',
    '\u{9F63}', '\u{9F67}', '\u{973B}', '\u{9F6A}', '\u{9448}', '\u{9F72}', '\u{9F76}',
    '\u{9F77}',
];

/// Removes unmappable code points from catalog text and turns overlines into tildes.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !UNMAPPABLE.contains(c))
        .map(|c| if c == '\u{203E}' { '~' } else { c })
        .collect()
}

/// An error occurred when looking up song metadata.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataError {
    /// The catalog has no entry for the song.
    #[error("unable to find metadata for song {0}")]
    SongNotFound(u32),
    /// The song has no entry for the difficulty.
    #[error("difficulty {difficulty:?} not found for song {song_id}")]
    DifficultyNotFound {
        /// The song.
        song_id: u32,
        /// The difficulty.
        difficulty: Difficulty,
    },
}

/// A catalog of song metadata.
pub trait MetadataSource {
    /// Looks up the metadata of `song_id`.
    ///
    /// # Errors
    ///
    /// Fails when the catalog has no entry for the song.
    fn lookup(&self, song_id: u32) -> Result<SongMetadata, MetadataError>;
}

impl MetadataSource for HashMap<u32, SongMetadata> {
    fn lookup(&self, song_id: u32) -> Result<SongMetadata, MetadataError> {
        self.get(&song_id)
            .cloned()
            .ok_or(MetadataError::SongNotFound(song_id))
    }
}

impl MetadataSource for BTreeMap<u32, SongMetadata> {
    fn lookup(&self, song_id: u32) -> Result<SongMetadata, MetadataError> {
        self.get(&song_id)
            .cloned()
            .ok_or(MetadataError::SongNotFound(song_id))
    }
}
