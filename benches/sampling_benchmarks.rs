//! Benchmarks for frame planning and extraction.
//!
//! Run with: cargo bench
//!
//! Extraction benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{hint::black_box, path::Path, time::Duration};

use criterion::{Criterion, criterion_group, criterion_main};
use framesplit::{
    FfmpegLogLevel, FrameBounds, FrameIndexPlan, FrameSampler, SamplingRequest, frame_step,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_planning(criterion: &mut Criterion) {
    criterion.bench_function("plan two hours at 29.97 -> 1 fps", |bencher| {
        let request = SamplingRequest::new()
            .with_target_fps(1.0)
            .with_start_time(Duration::from_secs(60));
        bencher.iter(|| {
            let bounds = FrameBounds::resolve(black_box(&request), 29.97, 215_784);
            let plan = FrameIndexPlan::new(bounds, frame_step(1.0, 29.97));
            black_box(plan.iter().sum::<u64>())
        });
    });
}

fn benchmark_extraction(criterion: &mut Criterion) {
    framesplit::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let output = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new();

    let mut group = criterion.benchmark_group("extraction");
    group.sample_size(10);

    group.bench_function("extract at 1 fps (jpg)", |bencher| {
        let request = SamplingRequest::new().with_target_fps(1.0);
        bencher.iter(|| sampler.extract(SAMPLE_VIDEO, output.path(), &request).unwrap());
    });

    group.bench_function("extract at native rate (bmp)", |bencher| {
        let request = SamplingRequest::new()
            .with_target_fps(30.0)
            .with_image_format(framesplit::ImageFormat::Bmp);
        bencher.iter(|| sampler.extract(SAMPLE_VIDEO, output.path(), &request).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_planning, benchmark_extraction);
criterion_main!(benches);
