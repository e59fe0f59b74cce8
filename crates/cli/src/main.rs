mod output;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use speaker_frame_core::composition::domain::crop_composer::CropComposer;
use speaker_frame_core::detection::domain::detection_params::DetectionParams;
use speaker_frame_core::detection::domain::face_detector::FaceDetector;
use speaker_frame_core::detection::infrastructure::cascade_face_detector::CascadeFaceDetector;
use speaker_frame_core::detection::infrastructure::model_resolver::{self, ModelLocation};
use speaker_frame_core::detection::infrastructure::onnx_blazeface_detector::{
    OnnxBlazefaceDetector, DEFAULT_CONFIDENCE,
};
use speaker_frame_core::enhancement::infrastructure::light_enhancer::LightEnhancer;
use speaker_frame_core::pipeline::batch_logger::LogBatchLogger;
use speaker_frame_core::pipeline::frame_result::FrameRange;
use speaker_frame_core::pipeline::frame_selector::{FrameSelector, Selection};
use speaker_frame_core::pipeline::inspect_image_use_case::InspectImageUseCase;
use speaker_frame_core::pipeline::quote_frames_use_case::QuoteFramesUseCase;
use speaker_frame_core::pipeline::range_frames_use_case::RangeFramesUseCase;
use speaker_frame_core::pipeline::temporal_search::TemporalSearch;
use speaker_frame_core::shared::constants::{
    CASCADE_MODEL_NAME, CASCADE_MODEL_URL, DEFAULT_MIN_BLUR_SCORE, DEFAULT_MIN_FACE_RATIO,
    IMAGE_EXTENSIONS, QUOTE_JPEG_QUALITY,
};
use speaker_frame_core::validation::domain::face_validator::{FaceValidator, ValidatorConfig};
use speaker_frame_core::video::domain::image_writer::ImageWriter;
use speaker_frame_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use speaker_frame_core::video::infrastructure::image_file_reader::ImageFileReader;
use speaker_frame_core::video::infrastructure::image_file_writer::ImageFileWriter;

use output::{FailureEnvelope, InspectEnvelope, QuoteEnvelope, RangeEnvelope};

/// Speaker frame selection: finds, crops and enhances a presentable
/// frame of the on-screen speaker near given moments of a video.
#[derive(Parser)]
#[command(name = "speaker-frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Face detector backend.
    #[arg(long, value_enum, default_value = "cascade", global = true)]
    detector: DetectorKind,

    /// Detector model file (required for blazeface).
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Smallest accepted face as a fraction of frame area (0.0-1.0].
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_RATIO, global = true)]
    min_face_ratio: f64,

    /// Smallest accepted Laplacian variance over the main face.
    #[arg(long, default_value_t = DEFAULT_MIN_BLUR_SCORE, global = true)]
    min_blur_score: f64,

    /// Directory the cropped frames are written to.
    #[arg(long, default_value = "frames", global = true)]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// One frame per timestamp, searched around each moment.
    Quote {
        video: PathBuf,
        /// Prefix for output file names.
        #[arg(long, default_value = "unknown")]
        video_id: String,
        /// JSON array of timestamps in seconds, e.g. `[45, 120.5]`.
        #[arg(long)]
        timestamps: String,
    },
    /// One frame per time range, searched around each range's midpoint.
    Range {
        video: PathBuf,
        #[arg(long, default_value = "unknown")]
        video_id: String,
        /// JSON array of `{"start": s, "end": s, "index": n}` objects.
        #[arg(long)]
        ranges: String,
    },
    /// Validate and crop a single still image.
    Inspect { image: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum DetectorKind {
    Cascade,
    Blazeface,
}

#[derive(Deserialize)]
struct RangeArg {
    start: f64,
    end: f64,
    #[serde(default)]
    index: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        output::print_json(&FailureEnvelope::new(e.to_string()));
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    match &cli.command {
        Command::Quote {
            video,
            video_id,
            timestamps,
        } => {
            let timestamps = parse_timestamps(timestamps)?;
            run_quote(&cli, video, video_id, &timestamps)
        }
        Command::Range {
            video,
            video_id,
            ranges,
        } => {
            let ranges = parse_ranges(ranges)?;
            run_range(&cli, video, video_id, &ranges)
        }
        Command::Inspect { image } => run_inspect(&cli, image),
    }
}

fn run_quote(
    cli: &Cli,
    video: &Path,
    video_id: &str,
    timestamps: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = QuoteFramesUseCase::new(
        Box::new(FfmpegFrameSource::new()),
        build_selector(cli)?,
        TemporalSearch::default(),
        Box::new(LogBatchLogger::new()),
    );
    let results = use_case.execute(video, timestamps)?;

    let writer = ImageFileWriter::new();
    let envelope = QuoteEnvelope::build(video_id, &results, &cli.output_dir, &writer)?;
    output::print_json(&envelope);
    Ok(())
}

fn run_range(
    cli: &Cli,
    video: &Path,
    video_id: &str,
    ranges: &[FrameRange],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = RangeFramesUseCase::new(
        Box::new(FfmpegFrameSource::new()),
        build_selector(cli)?,
        TemporalSearch::default(),
        Box::new(LogBatchLogger::new()),
    );
    let results = use_case.execute(video, ranges)?;

    let writer = ImageFileWriter::new();
    let envelope = RangeEnvelope::build(video_id, &results, &cli.output_dir, &writer)?;
    output::print_json(&envelope);
    Ok(())
}

fn run_inspect(cli: &Cli, image: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = InspectImageUseCase::new(Box::new(ImageFileReader::new()), build_selector(cli)?);
    let report = use_case.execute(image)?;

    let path = match &report.selection {
        Selection::Accepted(crop) => {
            let stem = image
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");
            let path = cli.output_dir.join(format!("{stem}_face.jpg"));
            ImageFileWriter::new().write(&path, &crop.image, Some(QUOTE_JPEG_QUALITY))?;
            log::info!("Crop written to {}", path.display());
            Some(path)
        }
        Selection::Rejected(_) => None,
    };

    output::print_json(&InspectEnvelope::build(&report, path.as_deref()));
    Ok(())
}

fn build_selector(cli: &Cli) -> Result<FrameSelector, Box<dyn std::error::Error>> {
    let config = ValidatorConfig {
        min_face_ratio: cli.min_face_ratio,
        min_blur_score: cli.min_blur_score,
        ..ValidatorConfig::default()
    };
    Ok(FrameSelector::new(
        FaceValidator::new(build_detector(cli)?, config),
        CropComposer::default(),
        Box::new(LightEnhancer::default()),
    ))
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let params = DetectionParams::default();
    match cli.detector {
        DetectorKind::Cascade => {
            log::info!("Resolving model: {CASCADE_MODEL_NAME}");
            let bundled = bundled_models_dir();
            let model_path = model_resolver::resolve(
                &ModelLocation {
                    name: CASCADE_MODEL_NAME,
                    url: CASCADE_MODEL_URL,
                    override_path: cli.model.as_deref(),
                    bundled_dir: bundled.as_deref(),
                },
                Some(Box::new(download_progress)),
            )?;
            Ok(Box::new(CascadeFaceDetector::new(&model_path, params)?))
        }
        DetectorKind::Blazeface => {
            let model_path = cli
                .model
                .as_deref()
                .ok_or("--model is required for the blazeface detector")?;
            Ok(Box::new(OnnxBlazefaceDetector::new(
                model_path,
                DEFAULT_CONFIDENCE,
                params,
            )?))
        }
    }
}

/// `models/` next to the executable, when present.
fn bundled_models_dir() -> Option<PathBuf> {
    let dir = std::env::current_exe().ok()?.parent()?.join("models");
    dir.is_dir().then_some(dir)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(cli.min_face_ratio > 0.0 && cli.min_face_ratio <= 1.0) {
        return Err(format!(
            "Min face ratio must be in (0.0, 1.0], got {}",
            cli.min_face_ratio
        )
        .into());
    }
    if !(cli.min_blur_score > 0.0 && cli.min_blur_score.is_finite()) {
        return Err(format!(
            "Min blur score must be positive, got {}",
            cli.min_blur_score
        )
        .into());
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    match &cli.command {
        Command::Quote { video, .. } | Command::Range { video, .. } => {
            if !video.exists() {
                return Err(format!("Input file not found: {}", video.display()).into());
            }
        }
        Command::Inspect { image } => {
            if !image.exists() {
                return Err(format!("Input file not found: {}", image.display()).into());
            }
            if !is_image(image) {
                return Err(format!("Not a supported image file: {}", image.display()).into());
            }
        }
    }
    Ok(())
}

fn parse_timestamps(json: &str) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let timestamps: Vec<f64> =
        serde_json::from_str(json).map_err(|e| format!("timestamps must be a JSON array of numbers: {e}"))?;
    if let Some(t) = timestamps.iter().find(|t| !t.is_finite()) {
        return Err(format!("Invalid timestamp: {t}").into());
    }
    Ok(timestamps)
}

fn parse_ranges(json: &str) -> Result<Vec<FrameRange>, Box<dyn std::error::Error>> {
    let ranges: Vec<RangeArg> = serde_json::from_str(json)
        .map_err(|e| format!("ranges must be a JSON array of {{start, end, index}}: {e}"))?;
    ranges
        .into_iter()
        .map(|r| {
            if r.start > r.end {
                return Err(format!("Range {} starts after it ends ({} > {})", r.index, r.start, r.end).into());
            }
            Ok(FrameRange {
                index: r.index,
                start: r.start,
                end: r.end,
            })
        })
        .collect()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
