//! Prelude module for the crate.
//!
//! This module re-exports the public types used in a conversion for convenient access.
//! You can use `use vox2ksh::prelude::*;` to import them at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{ToAriadne, emit_diagnostics};

pub use crate::{
    convert::{
        AssetInfo, ConvertOutput, Error, KshChart, RenderConfig, chart_file_name, convert_chart,
    },
    diagnostics::{Diagnostic, DiagnosticSink, Level, SourceFile, Tag},
    effect::{
        EFFECT_FALLBACK_NAME, Effect, EffectDefinition, EffectKind,
        translate::{TranslateError, translate_effect, translate_effect_line},
    },
    ksh::{ConvertError, KshHeader, render_ksh},
    song::{
        ChartId, Difficulty, DifficultyMetadata, FileNameError, InfiniteVersion, MetadataError,
        MetadataSource, SongMetadata,
    },
    vox::{
        ParseError, Vox, VoxParseOutput, decode_source,
        model::{
            Button, ButtonPress, CameraNode, CameraParam, EffectRef, LaserContinuity,
            LaserFilter, LaserNode, LaserSide, LaserSlam, RollKind, TiltMode, TrackEvent,
        },
        parse_vox, parse_vox_with_sink,
        time::{TimeSignature, Timing, TimingError},
        timeline::{Event, EventKind, Timeline},
    },
};
