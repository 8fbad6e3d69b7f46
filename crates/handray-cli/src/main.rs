//! handray CLI — fingertip detection and gesture replay on recorded depth data.

mod render;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use handray::{
    detect_hand, BodyFrame, DepthGrid, FrameReport, HandObservation, HandOpenState, HandSide,
    LabelBuffer, Point2D, PointerEvent, Tracker, TrackerConfig,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "handray")]
#[command(about = "Find fingertips in depth images and turn them into pointer events")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect one hand in a single 16-bit depth PNG.
    Detect(CliDetectArgs),

    /// Replay a recorded session of body and depth frames.
    Replay(CliReplayArgs),

    /// Print the default configuration as JSON.
    Config,
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to a 16-bit grayscale PNG holding depth in millimetres.
    #[arg(long)]
    depth: PathBuf,

    /// Palm joint in depth pixels, as `x,y`.
    #[arg(long, value_parser = parse_point)]
    palm: Point2D,

    /// Wrist joint in depth pixels, as `x,y`.
    #[arg(long, value_parser = parse_point)]
    wrist: Point2D,

    #[arg(long, value_enum, default_value_t = SideArg::Right)]
    side: SideArg,

    /// Hand pose reported by the body tracker.
    #[arg(long, value_enum, default_value_t = StateArg::Open)]
    state: StateArg,

    /// Optional tracker config JSON; only `detect` is used here.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the detection (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the colour-coded label image (PNG).
    #[arg(long)]
    labels_png: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliReplayArgs {
    /// Session JSON: `{"frames": [{"body": {...}}, {"depth": {"png": "..."}}, ...]}`.
    /// Relative PNG paths are resolved against the session file's directory.
    #[arg(long)]
    session: PathBuf,

    /// Optional tracker config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write per-frame reports and the event log (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Directory to write one label PNG per processed depth frame.
    #[arg(long)]
    labels_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl SideArg {
    fn to_core(self) -> HandSide {
        match self {
            Self::Left => HandSide::Left,
            Self::Right => HandSide::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StateArg {
    Open,
    Closed,
    Lasso,
    Unknown,
}

impl StateArg {
    fn to_core(self) -> HandOpenState {
        match self {
            Self::Open => HandOpenState::Open,
            Self::Closed => HandOpenState::Closed,
            Self::Lasso => HandOpenState::Lasso,
            Self::Unknown => HandOpenState::Unknown,
        }
    }
}

fn parse_point(s: &str) -> Result<Point2D, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Point2D::new(x, y))
}

#[derive(Debug, serde::Deserialize)]
struct Session {
    frames: Vec<SessionFrame>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum SessionFrame {
    Body(BodyFrame),
    Depth(DepthSource),
}

#[derive(Debug, serde::Deserialize)]
struct DepthSource {
    png: PathBuf,
}

#[derive(Debug, serde::Serialize)]
struct ReplayOutput {
    depth_frames: usize,
    skipped_frames: usize,
    reports: Vec<FrameReport>,
    events: Vec<PointerEvent>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Replay(args) => run_replay(&args),
        Commands::Config => run_config(),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<TrackerConfig> {
    match path {
        Some(p) => {
            tracing::info!("Loading config: {}", p.display());
            Ok(TrackerConfig::from_json_file(p)?)
        }
        None => Ok(TrackerConfig::default()),
    }
}

fn load_depth_png(path: &Path) -> CliResult<DepthGrid> {
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open depth image {}: {}", path.display(), e).into()
    })?;
    Ok(DepthGrid::from_luma16(&img.to_luma16())?)
}

// ── config ─────────────────────────────────────────────────────────────

fn run_config() -> CliResult<()> {
    println!("{}", TrackerConfig::default().to_json_string()?);
    Ok(())
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;

    tracing::info!("Loading depth image: {}", args.depth.display());
    let grid = load_depth_png(&args.depth)?;
    let (w, h) = grid.dimensions();
    tracing::info!("Depth size: {}x{}", w, h);

    let side = args.side.to_core();
    let observation = HandObservation::tracked(args.palm, args.wrist, args.state.to_core());
    let mut labels = LabelBuffer::for_grid(&grid);
    let detection = detect_hand(&grid, &mut labels, side, &observation, &config.detect);

    match &detection {
        Some(det) => tracing::info!(
            "{} hand: {} fingertip(s), thumb={}",
            side.as_str(),
            det.fingertips.len(),
            det.thumb.is_some()
        ),
        None => tracing::warn!(
            "{} hand not detected: palm {:?} has no valid depth",
            side.as_str(),
            args.palm
        ),
    }

    let json = serde_json::to_string_pretty(&detection)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    if let Some(path) = &args.labels_png {
        let hands: Vec<_> = detection.into_iter().collect();
        render::render_labels(&labels, &hands).save(path)?;
        tracing::info!("Label image written to {}", path.display());
    }

    Ok(())
}

// ── replay ─────────────────────────────────────────────────────────────

fn run_replay(args: &CliReplayArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;

    tracing::info!("Loading session: {}", args.session.display());
    let data = std::fs::read_to_string(&args.session)?;
    let session: Session = serde_json::from_str(&data)?;
    let base = args.session.parent().unwrap_or_else(|| Path::new("."));

    let mut sink = match &args.labels_dir {
        Some(dir) => Some(render::PngSequenceSink::new(dir.clone())?),
        None => None,
    };

    let mut tracker = Tracker::with_config(config);
    let mut output = ReplayOutput {
        depth_frames: 0,
        skipped_frames: 0,
        reports: Vec::new(),
        events: Vec::new(),
    };

    for frame in &session.frames {
        match frame {
            SessionFrame::Body(body) => {
                tracker.on_body_frame(body);
            }
            SessionFrame::Depth(src) => {
                output.depth_frames += 1;
                let path = base.join(&src.png);
                let grid = match load_depth_png(&path) {
                    Ok(g) => g,
                    Err(e) => {
                        tracing::warn!("skipping depth frame {}: {}", path.display(), e);
                        output.skipped_frames += 1;
                        continue;
                    }
                };
                let report = tracker.on_depth_grid(&grid);
                report.dispatch(&mut output.events);
                if let Some(sink) = sink.as_mut() {
                    tracker.present(&report, sink);
                }
                output.reports.push(report);
            }
        }
    }

    let clicks = output
        .events
        .iter()
        .filter(|e| matches!(e, PointerEvent::Click { .. }))
        .count();
    tracing::info!(
        "Replayed {} depth frames ({} skipped): {} events, {} click(s)",
        output.depth_frames,
        output.skipped_frames,
        output.events.len(),
        clicks
    );
    if let Some(sink) = &sink {
        tracing::info!("Wrote {} label image(s)", sink.written());
    }

    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    Ok(())
}
