//! Print what framesplit sees in a video file.
//!
//! Usage:
//!   cargo run --example probe -- <input_file>

use std::error::Error;

use framesplit::{FfmpegVideoSource, VideoSource, format_timecode};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    let source = FfmpegVideoSource::open(&input_path)?;
    let metadata = source.metadata();

    println!("File:        {}", source.path().display());
    println!("Container:   {}", metadata.format);
    println!("Codec:       {}", metadata.codec);
    println!("Resolution:  {}x{}", metadata.width, metadata.height);
    println!("Frame rate:  {:.3} fps", source.native_frame_rate());
    println!("Frames:      {}", source.total_frames());
    println!("Duration:    {}", format_timecode(metadata.duration));

    Ok(())
}
