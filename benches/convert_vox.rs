//! Benchmark for parsing and rendering `vox` charts.

use criterion::{Criterion, Throughput};
use vox2ksh::prelude::*;

struct VoxFile {
    name: String,
    source: String,
}

fn scan_vox_files() -> Vec<VoxFile> {
    let dir = "tests/files";

    std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "vox"))
        .filter_map(|path| {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(String::from)?;

            let bytes = std::fs::read(&path).expect("Failed to load test file");
            let source = decode_source(&bytes).into_owned();

            Some(VoxFile { name, source })
        })
        .collect()
}

fn header() -> KshHeader {
    KshHeader {
        source: "bench.vox".to_string(),
        title: "bench".to_string(),
        artist: String::new(),
        effect: String::new(),
        sort_title: String::new(),
        sort_artist: String::new(),
        jacket: String::new(),
        illustrator: String::new(),
        difficulty: "extended".to_string(),
        level: 1,
        bpm: "120".to_string(),
        music: "track.ogg".to_string(),
        music_volume: 100,
        background: "fallback".to_string(),
        preview_offset: 0,
    }
}

fn bench_parse_vox(c: &mut Criterion, files: &[VoxFile]) {
    let mut group = c.benchmark_group("parse_vox");

    for file in files {
        group.throughput(Throughput::Bytes(file.source.len() as u64));
        group.bench_function(&file.name, |b| {
            b.iter(|| parse_vox(&file.name, std::hint::black_box(&file.source)));
        });
    }

    group.finish();
}

fn bench_render_ksh(c: &mut Criterion, files: &[VoxFile]) {
    let mut group = c.benchmark_group("render_ksh");
    let header = header();
    let config = RenderConfig::default();

    for file in files {
        let Ok(vox) = parse_vox(&file.name, &file.source).vox else {
            continue;
        };
        group.bench_function(&file.name, |b| {
            b.iter(|| {
                let mut vox = vox.clone();
                let mut sink = DiagnosticSink::new(&file.name);
                render_ksh(
                    std::hint::black_box(&mut vox),
                    &header,
                    &config,
                    &mut sink,
                )
            });
        });
    }

    group.finish();
}

fn main() {
    let files = scan_vox_files();
    let mut criterion = Criterion::default();
    bench_parse_vox(&mut criterion, &files);
    bench_render_ksh(&mut criterion, &files);
}
