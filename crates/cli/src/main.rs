use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;

use dwellcam_core::capture::domain::capture_sink::CaptureSink;
use dwellcam_core::capture::infrastructure::background_dispatcher::BackgroundCaptureDispatcher;
use dwellcam_core::capture::infrastructure::http_upload_sink::HttpUploadSink;
use dwellcam_core::capture::infrastructure::local_save_sink::LocalSaveSink;
use dwellcam_core::config::session_config::{OutputMode, SessionConfig};
use dwellcam_core::detection::domain::face_detector::FaceDetector;
use dwellcam_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use dwellcam_core::gate::domain::dwell_gate::DwellGate;
use dwellcam_core::gate::domain::dwell_policy::DwellPolicy;
use dwellcam_core::pipeline::capture_session_use_case::CaptureSession;
use dwellcam_core::pipeline::infrastructure::interval_tick_source::IntervalTickSource;
use dwellcam_core::pipeline::session_logger::StdoutSessionLogger;
use dwellcam_core::rendering::infrastructure::live_view_renderer::LiveViewRenderer;
use dwellcam_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use dwellcam_core::shared::model_resolver;
use dwellcam_core::video::domain::video_reader::VideoReader;
use dwellcam_core::video::domain::video_source::VideoSource;
use dwellcam_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use dwellcam_core::video::infrastructure::live_frame_feed::LiveFrameFeed;

/// Refresh the live-view PNG every this many ticks.
const LIVE_VIEW_EVERY_TICKS: u64 = 5;

/// Take a snapshot once a face has stayed inside the oval guide long enough.
#[derive(Parser, Clone)]
#[command(name = "dwellcam")]
struct Cli {
    /// Camera device (e.g. /dev/video0, "0" with --input-format avfoundation)
    /// or a video file.
    #[arg(default_value = "/dev/video0")]
    source: String,

    /// Capture input format for devices: v4l2, avfoundation, dshow.
    #[arg(long)]
    input_format: Option<String>,

    /// Settings file (defaults to the per-user settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick period in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Continuous dwell required before a capture, in milliseconds.
    #[arg(long)]
    threshold_ms: Option<u64>,

    /// Use the long-dwell preset (10 s in the oval).
    #[arg(long, conflicts_with = "threshold_ms")]
    extended: bool,

    /// Pause after a capture before dwell counts again (0 disables).
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Horizontal oval radius in display pixels.
    #[arg(long)]
    radius_x: Option<f64>,

    /// Vertical oval radius in display pixels.
    #[arg(long)]
    radius_y: Option<f64>,

    /// Display width that boxes, oval, and snapshots are scaled to.
    #[arg(long)]
    display_width: Option<u32>,

    /// Display height that boxes, oval, and snapshots are scaled to.
    #[arg(long)]
    display_height: Option<u32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Face detection model (downloaded to the cache when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Save snapshots into this directory.
    #[arg(long, conflicts_with = "upload_url")]
    save_dir: Option<PathBuf>,

    /// POST snapshots as multipart form data to this URL.
    #[arg(long)]
    upload_url: Option<String>,

    /// Keep an annotated PNG of the current view at this path.
    #[arg(long)]
    live_view: Option<PathBuf>,

    /// Stop after this many captures.
    #[arg(long)]
    max_captures: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;

    let gate = DwellGate::new(config.policy()?, config.oval()?);
    let detector = build_detector(&cli, &config)?;
    let source = VideoSource::parse(&cli.source, cli.input_format.as_deref());

    let mut reader = FfmpegReader::new();
    let stream = reader
        .open(&source)
        .map_err(|e| format!("Cannot open {source}: {e}"))?;
    log::info!(
        "Opened {source}: {}x{} @ {:.1} fps ({})",
        stream.width,
        stream.height,
        stream.fps,
        stream.codec
    );

    let pace = if source.is_live() {
        None
    } else {
        LiveFrameFeed::frame_interval(stream.fps)
    };
    let feed = LiveFrameFeed::start(Box::new(reader), pace);

    let dispatcher = Arc::new(BackgroundCaptureDispatcher::spawn(build_sink(&config.output)?));
    log::info!("Captures will {}", config.output);

    let mut session = CaptureSession::new(
        Box::new(feed),
        detector,
        gate,
        Box::new(dispatcher.clone()),
        config.display_width,
        config.display_height,
    )
    .with_logger(Box::new(StdoutSessionLogger::default()))
    .with_max_captures(cli.max_captures);

    if let Some(path) = &cli.live_view {
        log::info!("Live view: {}", path.display());
        session = session.with_renderer(Box::new(LiveViewRenderer::new(
            path,
            LIVE_VIEW_EVERY_TICKS,
        )));
    }

    let cancelled = session.cancel_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal...");
        cancelled.store(true, Ordering::Relaxed);
    })?;

    let report = session.run(&mut IntervalTickSource::from_millis(config.tick_period_ms));
    drop(session);

    let delivery = match Arc::try_unwrap(dispatcher) {
        Ok(dispatcher) => dispatcher.finish(),
        Err(shared) => shared.stats(),
    };

    log::info!(
        "Done: {} ticks, {} captures ({} delivered, {} failed, {} dropped), \
         {} detection failures, {} ticks without a frame",
        report.ticks,
        report.captures,
        delivery.delivered,
        delivery.failed,
        delivery.dropped,
        report.detection_failures,
        report.ticks_without_frame
    );
    Ok(())
}

/// Settings file first, then any flags given on the command line.
fn build_config(cli: &Cli) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::load_default()?,
    };

    if cli.extended {
        config.threshold_ms = DwellPolicy::extended().threshold_ms();
    }
    if let Some(v) = cli.tick_ms {
        config.tick_period_ms = v;
    }
    if let Some(v) = cli.threshold_ms {
        config.threshold_ms = v;
    }
    if let Some(v) = cli.cooldown_ms {
        config.cooldown_ms = v;
    }
    if let Some(v) = cli.radius_x {
        config.radius_x = v;
    }
    if let Some(v) = cli.radius_y {
        config.radius_y = v;
    }
    if let Some(v) = cli.display_width {
        config.display_width = v;
    }
    if let Some(v) = cli.display_height {
        config.display_height = v;
    }
    if let Some(v) = cli.confidence {
        config.confidence = v;
    }
    if let Some(dir) = &cli.save_dir {
        config.output = OutputMode::Save { dir: dir.clone() };
    }
    if let Some(endpoint) = &cli.upload_url {
        config.output = OutputMode::Upload {
            endpoint: endpoint.clone(),
        };
    }

    Ok(config)
}

fn build_sink(output: &OutputMode) -> Result<Box<dyn CaptureSink>, Box<dyn std::error::Error>> {
    Ok(match output {
        OutputMode::Save { dir } => Box::new(LocalSaveSink::new(dir)),
        OutputMode::Upload { endpoint } => Box::new(HttpUploadSink::new(endpoint.as_str())?),
    })
}

fn build_detector(
    cli: &Cli,
    config: &SessionConfig,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        cli.model.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    Ok(Box::new(OnnxYoloDetector::new(&model_path, config.confidence)?))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
