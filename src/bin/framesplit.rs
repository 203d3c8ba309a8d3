use std::{
    io::{Error as IoError, IsTerminal},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framesplit::{
    DEFAULT_TARGET_FPS, ExtractionOutcome, FfmpegLogLevel, FfmpegVideoSource, FrameIndexPlan,
    FrameSampler, FrameSplitError, ImageFormat, ProgressCallback, ProgressInfo, SamplingRequest,
    VideoMetadata, VideoSource, format_timecode, output_file_name,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

const CLI_AFTER_HELP: &str = "Examples:\n  framesplit extract input.mp4 frames --fps 1 --image-type png\n  framesplit extract input.mkv frames --start-time 00:01:00 --end-time 00:02:00 --progress\n  framesplit extract input.mp4 frames --fps 10 --dry-run\n  framesplit probe input.mp4 --json\n  framesplit completions zsh > _framesplit";

#[derive(Debug, Parser)]
#[command(
    name = "framesplit",
    version,
    about = "Split a video into still images at a chosen frame rate",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while exporting.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract frames from a video into a directory of images.
    #[command(
        about = "Extract video frames",
        after_help = "Examples:\n  framesplit extract input.mp4 frames\n  framesplit extract input.mp4 frames --fps 2 --start-time 00:00:10 --end-time 00:00:20"
    )]
    Extract {
        /// Input video (.mp4, .avi, .mov, .mkv, .flv, .wmv).
        video_path: PathBuf,
        /// Output directory, created if missing.
        output_dir: PathBuf,
        /// Start of the window, HH:MM:SS.
        #[arg(long)]
        start_time: Option<String>,
        /// End of the window (exclusive), HH:MM:SS.
        #[arg(long)]
        end_time: Option<String>,
        /// Frames per second to sample.
        #[arg(long, default_value_t = DEFAULT_TARGET_FPS, allow_negative_numbers = true)]
        fps: f64,
        /// Output image type (jpg, png, bmp).
        #[arg(long, default_value = "jpg")]
        image_type: ImageFormat,
        /// Exit with an error if decoding stops before the plan is finished.
        #[arg(long)]
        strict: bool,
        /// Print the frame plan without decoding or writing anything.
        #[arg(long)]
        dry_run: bool,
        /// With --dry-run, print the plan as JSON.
        #[arg(long, requires = "dry_run")]
        json: bool,
    },

    /// Print video stream metadata.
    #[command(about = "Print video metadata", visible_alias = "info")]
    Probe {
        /// Input video.
        video_path: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.frames_planned);
        self.bar.set_position(info.frames_written);
    }
}

fn init_logging(global: &GlobalOptions) {
    let level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build();
    let color = if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };

    if TermLogger::init(level, config, TerminalMode::Stderr, color).is_err() {
        eprintln!("{} logger was already installed", "warning:".yellow().bold());
    }
}

fn to_json_string(value: &serde_json::Value) -> Result<String, FrameSplitError> {
    serde_json::to_string_pretty(value).map_err(|error| IoError::other(error).into())
}

fn metadata_json(metadata: &VideoMetadata) -> serde_json::Value {
    json!({
        "format": metadata.format,
        "codec": metadata.codec,
        "width": metadata.width,
        "height": metadata.height,
        "fps": metadata.frames_per_second,
        "frame_count": metadata.frame_count,
        "duration_seconds": metadata.duration.as_secs_f64(),
    })
}

fn print_metadata(metadata: &VideoMetadata) {
    println!("Format: {}", metadata.format);
    println!("Duration: {}", format_timecode(metadata.duration));
    println!(
        "Video: {}x{} @ {:.2} fps, {} frames [{}]",
        metadata.width,
        metadata.height,
        metadata.frames_per_second,
        metadata.frame_count,
        metadata.codec,
    );
}

fn plan_json(
    metadata: &VideoMetadata,
    plan: &FrameIndexPlan,
    format: ImageFormat,
) -> serde_json::Value {
    let frames: Vec<_> = plan
        .iter()
        .enumerate()
        .map(|(rank, frame_index)| {
            json!({
                "frame_index": frame_index,
                "file": output_file_name(rank as u64, format),
            })
        })
        .collect();

    json!({
        "source": metadata_json(metadata),
        "start_frame": plan.start_frame(),
        "end_frame": plan.end_frame(),
        "step": plan.step(),
        "count": plan.len(),
        "frames": frames,
    })
}

fn print_plan(plan: &FrameIndexPlan, output_dir: &Path, format: ImageFormat) {
    println!(
        "Plan: frames [{}, {}) every {} -> {} image(s) in {}",
        plan.start_frame(),
        plan.end_frame(),
        plan.step(),
        plan.len(),
        output_dir.display()
    );
    if let (Some(first), Some(last)) = (plan.iter().next(), plan.iter().last()) {
        println!("  {} <- source frame {first}", output_file_name(0, format));
        if plan.len() > 1 {
            println!(
                "  {} <- source frame {last}",
                output_file_name(plan.len() - 1, format)
            );
        }
    }
}

fn run() -> Result<ExitCode, FrameSplitError> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    if let Some(level) = cli.global.log_level {
        framesplit::set_ffmpeg_log_level(level);
    }

    match cli.command {
        Commands::Extract {
            video_path,
            output_dir,
            start_time,
            end_time,
            fps,
            image_type,
            strict,
            dry_run,
            json,
        } => {
            let request = SamplingRequest::new()
                .with_target_fps(fps)
                .with_image_format(image_type)
                .with_timecodes(start_time.as_deref(), end_time.as_deref())?;

            if dry_run {
                let (metadata, plan) = FrameSampler::new().plan_file(&video_path, &request)?;
                if json {
                    println!("{}", to_json_string(&plan_json(&metadata, &plan, image_type))?);
                } else {
                    print_metadata(&metadata);
                    print_plan(&plan, &output_dir, image_type);
                }
                return Ok(ExitCode::SUCCESS);
            }

            let mut sampler = FrameSampler::new();
            let progress = cli.global.progress.then(|| Arc::new(TerminalProgress::new()));
            if let Some(progress) = &progress {
                sampler = sampler.with_progress(progress.clone());
            }

            let report = sampler.extract(&video_path, &output_dir, &request)?;

            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }

            match report.outcome() {
                ExtractionOutcome::Completed => {
                    println!(
                        "{} {}",
                        "success:".green().bold(),
                        format!(
                            "Extracted {} frame(s) to {}",
                            report.frames_written(),
                            output_dir.display()
                        )
                        .green()
                    );
                }
                ExtractionOutcome::PartiallyCompleted { failure } => {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!(
                            "stopped after {} of {} frame(s): {failure}",
                            report.frames_written(),
                            report.frames_planned()
                        )
                        .yellow()
                    );
                    println!(
                        "Extracted {} frame(s) to {}",
                        report.frames_written(),
                        output_dir.display()
                    );
                    if strict {
                        return Ok(ExitCode::from(failure.exit_code()));
                    }
                }
            }
        }
        Commands::Probe { video_path, json } => {
            let source = FfmpegVideoSource::open(&video_path)?;
            let metadata = source.metadata();
            if json {
                println!("{}", to_json_string(&metadata_json(metadata))?);
            } else {
                print_metadata(metadata);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesplit", &mut std::io::stdout());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::from(error.exit_code())
        }
    }
}
