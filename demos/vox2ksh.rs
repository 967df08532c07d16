//! Command line converter from vox charts to ksh charts.
//!
//! The song catalog is read from a JSON object mapping song ids to [`SongMetadata`], and the
//! render options optionally from a JSON [`RenderConfig`]. Charts are converted in parallel.
//! Jackets, audio, and FX chip sounds are copied next to the charts when their directories are
//! given.
//!
//! ```sh
//! RUST_LOG=info cargo run --example vox2ksh --features serde -- \
//!     --metadata music_db.json --out out data/vox_01/*.vox
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use rayon::prelude::*;
use vox2ksh::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Converts vox charts into ksh charts")]
struct Args {
    /// vox files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// JSON object mapping song ids to their metadata.
    #[arg(short, long)]
    metadata: PathBuf,
    /// JSON file with render options.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory, one subdirectory per song.
    #[arg(short, long, default_value = "out")]
    out: PathBuf,
    /// Directory of jackets named `<song id>_<difficulty number>.png`.
    #[arg(long)]
    jacket_dir: Option<PathBuf>,
    /// Directory of songs named `<song id>.ogg`, or `<song id>_<abbreviation>.ogg` for
    /// difficulties with their own audio.
    #[arg(long)]
    audio_dir: Option<PathBuf>,
    /// Directory of FX chip sounds named `<id>.wav`, with `0.wav` as the fallback.
    #[arg(long)]
    fx_chip_sound_dir: Option<PathBuf>,
    /// Print diagnostics of every chart.
    #[arg(short, long)]
    verbose: bool,
}

/// Locates and copies the media of one chart.
struct Assets<'a> {
    args: &'a Args,
    song_dir: PathBuf,
    chart: ChartId,
}

impl Assets<'_> {
    /// Copies the jacket of the difficulty, or of the nearest easier one.
    fn copy_jacket(&self) -> std::io::Result<Option<u8>> {
        let Some(dir) = &self.args.jacket_dir else {
            return Ok(None);
        };
        for number in (1..=self.chart.difficulty.jacket_number()).rev() {
            let source = dir.join(format!("{}_{number}.png", self.chart.song_id));
            if source.exists() {
                fs::copy(&source, self.song_dir.join(format!("jacket_{number}.png")))?;
                return Ok(Some(number));
            }
        }
        log::warn!("no jacket found for song {}", self.chart.song_id);
        Ok(None)
    }

    /// Copies the audio, returning whether the difficulty has its own track.
    fn copy_audio(&self) -> std::io::Result<bool> {
        let Some(dir) = &self.args.audio_dir else {
            return Ok(false);
        };
        let abbreviation = self.chart.difficulty.abbreviation();
        let own = dir.join(format!("{}_{abbreviation}.ogg", self.chart.song_id));
        if own.exists() {
            fs::copy(&own, self.song_dir.join(format!("track_{abbreviation}.ogg")))?;
            return Ok(true);
        }
        let shared = dir.join(format!("{}.ogg", self.chart.song_id));
        if shared.exists() {
            fs::copy(&shared, self.song_dir.join("track.ogg"))?;
        } else {
            log::warn!("no audio found for song {}", self.chart.song_id);
        }
        Ok(false)
    }

    fn copy_chip_sounds(&self, chart: &KshChart) -> std::io::Result<()> {
        let Some(dir) = &self.args.fx_chip_sound_dir else {
            return Ok(());
        };
        for sound in &chart.required_chip_sounds {
            let source = dir.join(format!("{sound}.wav"));
            let source = if source.exists() {
                source
            } else {
                dir.join("0.wav")
            };
            fs::copy(source, self.song_dir.join(format!("fxchip_{sound}.wav")))?;
        }
        Ok(())
    }
}

/// Converts one file, returning whether it succeeded.
fn convert_file(
    path: &Path,
    args: &Args,
    catalog: &HashMap<u32, SongMetadata>,
    config: &RenderConfig,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or("input path has no file name")?;
    let bytes = fs::read(path)?;
    let source = decode_source(&bytes);

    let assets = if let Ok(chart) = ChartId::from_file_name(file_name)
        && let Ok(song) = catalog.lookup(chart.song_id)
    {
        let song_dir = args.out.join(song.sanitized().ascii);
        fs::create_dir_all(&song_dir)?;
        Some(Assets {
            args,
            song_dir,
            chart,
        })
    } else {
        None
    };
    let asset_info = match &assets {
        Some(assets) => AssetInfo {
            jacket_index: assets.copy_jacket()?,
            difficulty_audio: assets.copy_audio()?,
        },
        None => AssetInfo::default(),
    };

    let output = convert_chart(file_name, &source, catalog, &asset_info, config);
    if args.verbose || output.chart.is_err() {
        emit_diagnostics(file_name, &source, &output.diagnostics);
    }
    let Ok(chart) = output.chart else {
        return Ok(false);
    };
    let path = args.out.join(chart.path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &chart.text)?;
    if let Some(assets) = &assets {
        assets.copy_chip_sounds(&chart)?;
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog: HashMap<u32, SongMetadata> =
        serde_json::from_str(&fs::read_to_string(&args.metadata)?)?;
    let config: RenderConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    log::info!("loaded {} songs from {:?}", catalog.len(), args.metadata);

    let results: Vec<_> = args
        .inputs
        .par_iter()
        .map(|path| {
            convert_file(path, &args, &catalog, &config).unwrap_or_else(|error| {
                log::error!("{}: {error}", path.display());
                false
            })
        })
        .collect();

    let converted = results.iter().filter(|&&ok| ok).count();
    println!(
        "converted {converted} of {} charts into {}",
        results.len(),
        args.out.display()
    );
    Ok(())
}
