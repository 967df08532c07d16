use std::collections::{BTreeSet, HashMap};

use pretty_assertions::assert_eq;
use vox2ksh::prelude::*;

fn catalog() -> HashMap<u32, SongMetadata> {
    let song = SongMetadata {
        ascii: "basic_song".to_string(),
        title: "Basic \u{203E}Song\u{301C}".to_string(),
        artist: "Someone".to_string(),
        title_yomigana: "ベーシックソング".to_string(),
        artist_yomigana: "サムワン".to_string(),
        bpm_min: 15000,
        bpm_max: 18050,
        volume: 75,
        bg_no: 2,
        inf_ver: 3,
        difficulties: [
            (
                Difficulty::Exhaust,
                DifficultyMetadata {
                    effected_by: "Charter".to_string(),
                    illustrator: "Illustrator".to_string(),
                    difnum: 15,
                },
            ),
            (Difficulty::Infinite, DifficultyMetadata::default()),
        ]
        .into(),
    };
    HashMap::from([(1042, song)])
}

#[test]
fn converts_a_chart_with_its_header() {
    let assets = AssetInfo {
        jacket_index: Some(3),
        difficulty_audio: false,
    };
    let config = RenderConfig::new().with_hidden_preview_position(45);
    let output = convert_chart(
        "004_1042_basic_song_3e.vox",
        include_str!("files/basic.vox"),
        &catalog(),
        &assets,
        &config,
    );
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
    let chart = output.chart.expect("must be converted");
    assert_eq!(chart.song_dir, "basic_song");
    assert_eq!(chart.file_name, "chart_exh.ksh");
    assert_eq!(chart.path(), "basic_song/chart_exh.ksh");
    assert_eq!(chart.required_chip_sounds, BTreeSet::from([3]));

    let header: Vec<_> = chart.text.lines().take(25).collect();
    assert_eq!(header[0], "// Source: 004_1042_basic_song_3e.vox");
    assert_eq!(
        &header[2..],
        [
            "title=Basic ~Song",
            "artist=Someone",
            "effect=Charter",
            "sorttitle=ベーシックソング",
            "sortartist=サムワン",
            "jacket=jacket_3.png",
            "illustrator=Illustrator",
            "difficulty=extended",
            "level=15",
            "t=150-180",
            "m=track.ogg",
            "mvol=75",
            "o=0",
            "bg=wave",
            "layer=wave",
            "po=45000",
            "plength=11000",
            "pfiltergain=50",
            "filtertype=peak",
            "chokkakuautovol=0",
            "chokkakuvol=40",
            "ver=167",
            "--",
        ]
    );
    assert_eq!(chart.text.lines().nth(25), Some("beat=4/4"));
    assert_eq!(chart.text.lines().filter(|line| line.contains('|')).count(), 672);
}

#[test]
fn infinite_charts_are_named_after_the_version() {
    let output = convert_chart(
        "004_1042_basic_song_4i.vox",
        include_str!("files/basic.vox"),
        &catalog(),
        &AssetInfo {
            jacket_index: None,
            difficulty_audio: true,
        },
        &RenderConfig::default(),
    );
    let chart = output.chart.expect("must be converted");
    assert_eq!(chart.file_name, "chart_grv.ksh");
    assert!(chart.text.contains("\ndifficulty=infinite\n"));
    assert!(chart.text.contains("\nm=track_inf.ogg\n"));
    assert!(chart.text.contains("\njacket=\n"));
}

#[test]
fn lookup_failures_stop_the_conversion() {
    let output = convert_chart(
        "004_9999_missing_3e.vox",
        include_str!("files/basic.vox"),
        &catalog(),
        &AssetInfo::default(),
        &RenderConfig::default(),
    );
    assert_eq!(
        output.chart,
        Err(Error::Metadata(MetadataError::SongNotFound(9999)))
    );
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].tag, Tag::VoxLoad);
    assert_eq!(output.diagnostics[0].level, Level::Error);

    let output = convert_chart(
        "004_1042_basic_song_1n.vox",
        include_str!("files/basic.vox"),
        &catalog(),
        &AssetInfo::default(),
        &RenderConfig::default(),
    );
    assert_eq!(
        output.chart,
        Err(Error::Metadata(MetadataError::DifficultyNotFound {
            song_id: 1042,
            difficulty: Difficulty::Novice,
        }))
    );

    let output = convert_chart(
        "basic_song.vox",
        "",
        &catalog(),
        &AssetInfo::default(),
        &RenderConfig::default(),
    );
    assert!(matches!(output.chart, Err(Error::FileName(_))));
}

#[test]
fn parse_and_render_errors_are_recorded() {
    let output = convert_chart(
        "004_1042_basic_song_3e.vox",
        "#BEAT INFO\n001,01,00\t4\t4\n#END\n",
        &catalog(),
        &AssetInfo::default(),
        &RenderConfig::default(),
    );
    assert_eq!(output.chart, Err(Error::Parse(ParseError::MissingEndPosition)));
    let last = output.diagnostics.last().expect("error recorded");
    assert_eq!((last.level, last.tag), (Level::Error, Tag::VoxParse));
    assert_eq!(last.file, "004_1042_basic_song_3e.vox");

    let source = "\
#BEAT INFO
001,01,00\t4\t4
001,02,00\t3\t4
#END
#END POSITION
002,01,00
#END
";
    let output = convert_chart(
        "004_1042_basic_song_3e.vox",
        source,
        &catalog(),
        &AssetInfo::default(),
        &RenderConfig::default(),
    );
    assert_eq!(
        output.chart,
        Err(Error::Convert(ConvertError::MidMeasureTimeSignature {
            timing: Timing::new(1, 2, 0)
        }))
    );
    let last = output.diagnostics.last().expect("error recorded");
    assert_eq!((last.level, last.tag), (Level::Error, Tag::KshOutput));
    assert_eq!(last.file, "basic_song/chart_exh.ksh");
}
