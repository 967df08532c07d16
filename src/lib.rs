//! Converter from vox rhythm-game charts into the ksh chart notation.
//!
//! The conversion consists of two phases: parsing and rendering.
//!
//! `vox` module reads the section structure of a vox file into a [`vox::Vox`], a sparse timeline
//! of tempo changes, notes, laser nodes, and camera motions. The parser is tolerant: problems
//! are recorded as diagnostics and the affected line is skipped or read with a fallback.
//!
//! `effect` module translates the numeric effect encodings of vox into named ksh effects.
//!
//! `ksh` module walks the timeline tick by tick and writes one ksh line per tick.
//!
//! `convert` module ties both phases together with the song metadata from a catalog.
//!
//! In detail, our policies are:
//!
//! - Accept Shift_JIS input as well as UTF-8, and write UTF-8.
//! - Never panic on malformed input. Only structural problems stop a conversion.
//! - Keep catalog lookup, asset copying, and file system access out of the library.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use vox2ksh::prelude::*;
//!
//! let source = "\
//! #FORMAT VERSION
//! 10
//! #END
//! #BEAT INFO
//! 001,01,00\t4\t4
//! #END
//! #BPM INFO
//! 001,01,00\t120.00\t4
//! #END
//! #END POSITION
//! 002,01,00
//! #END
//! ";
//! let catalog = HashMap::from([(
//!     1u32,
//!     SongMetadata {
//!         ascii: "first_song".to_string(),
//!         difficulties: [(Difficulty::Novice, DifficultyMetadata::default())].into(),
//!         ..SongMetadata::default()
//!     },
//! )]);
//!
//! let output = convert_chart(
//!     "001_0001_first_song_1n.vox",
//!     source,
//!     &catalog,
//!     &AssetInfo::default(),
//!     &RenderConfig::default(),
//! );
//! let chart = output.chart.unwrap();
//! assert_eq!(chart.path(), "first_song/chart_nov.ksh");
//! assert!(chart.text.contains("t=120\n"));
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod convert;
pub mod diagnostics;
pub mod effect;
pub mod ksh;
pub mod prelude;
pub mod song;
pub mod vox;
