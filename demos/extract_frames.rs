//! Sample frames from a video into a directory.
//!
//! Usage:
//!   cargo run --example extract_frames -- <input_file> [output_dir] [fps]

use std::error::Error;

use framesplit::{ExtractionOutcome, FrameSampler, ImageFormat, SamplingRequest};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let output_dir = args.next().unwrap_or_else(|| "frames".to_string());
    let fps = match args.next() {
        Some(value) => value.parse::<f64>()?,
        None => 1.0,
    };

    let request = SamplingRequest::new()
        .with_target_fps(fps)
        .with_image_format(ImageFormat::Png);

    let sampler = FrameSampler::new();
    let (metadata, plan) = sampler.plan_file(&input_path, &request)?;
    println!(
        "{input_path}: {:.2} fps, {} frames -> every {} frame(s), {} image(s)",
        metadata.frames_per_second,
        metadata.frame_count,
        plan.step(),
        plan.len(),
    );

    let report = sampler.extract(&input_path, &output_dir, &request)?;
    match report.outcome() {
        ExtractionOutcome::Completed => {
            println!("Wrote {} frame(s) to {output_dir}", report.frames_written());
        }
        ExtractionOutcome::PartiallyCompleted { failure } => {
            println!(
                "Wrote {} of {} frame(s) to {output_dir}, stopped early: {failure}",
                report.frames_written(),
                report.frames_planned(),
            );
        }
    }

    Ok(())
}
