use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drape", version)]
struct Cli {
    /// Session config JSON (defaults apply for missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the garment placement for one pose as JSON.
    Place(PlaceArgs),
    /// Draw a garment over a single frame and write a PNG.
    Composite(CompositeArgs),
    /// Run the scheduler over an image sequence with recorded poses.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Pose JSON (one frame of 33 landmark slots).
    #[arg(long)]
    pose: PathBuf,

    /// Garment image; its aspect ratio sizes the placement.
    #[arg(long)]
    garment: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Video frame image.
    #[arg(long)]
    frame: PathBuf,

    /// Garment image.
    #[arg(long)]
    garment: PathBuf,

    /// Pose JSON for the frame.
    #[arg(long)]
    pose: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Directory of frame images, played in file name order.
    #[arg(long)]
    frames: PathBuf,

    /// Pose track JSON (array of pose frames).
    #[arg(long)]
    track: PathBuf,

    /// Garment image.
    #[arg(long)]
    garment: PathBuf,

    /// Output directory for composed PNG frames.
    #[arg(long)]
    out: PathBuf,

    /// Frame rate of the sequence (defaults to the config's video fps).
    #[arg(long)]
    fps: Option<u32>,

    /// Simulated pose inference latency in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Tick at the frame rate instead of as fast as possible.
    #[arg(long)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Place(args) => cmd_place(args, &config),
        Command::Composite(args) => cmd_composite(args, &config),
        Command::Replay(args) => cmd_replay(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<drape::SessionConfig> {
    let config = match path {
        Some(p) => drape::SessionConfig::from_json_file(p)?,
        None => drape::SessionConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_pose_json(path: &Path) -> anyhow::Result<drape::PoseFrame> {
    let f = File::open(path).with_context(|| format!("open pose '{}'", path.display()))?;
    let pose: drape::PoseFrame =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse pose JSON")?;
    Ok(pose)
}

fn read_garment(path: &Path) -> anyhow::Result<drape::GarmentAsset> {
    let bytes = std::fs::read(path).with_context(|| format!("read garment '{}'", path.display()))?;
    Ok(drape::decode_image(&path.to_string_lossy(), &bytes)?)
}

fn cmd_place(args: PlaceArgs, config: &drape::SessionConfig) -> anyhow::Result<()> {
    let pose = read_pose_json(&args.pose)?;
    let garment = read_garment(&args.garment)?;
    let canvas = drape::Canvas::new(args.width, args.height)?;

    let placement =
        drape::solve_placement(&pose, garment.aspect_ratio(), canvas, &config.solver);
    if placement.is_none() {
        eprintln!("torso not found; no placement");
    }
    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

fn cmd_composite(args: CompositeArgs, config: &drape::SessionConfig) -> anyhow::Result<()> {
    let frame = image::open(&args.frame)
        .with_context(|| format!("open frame '{}'", args.frame.display()))?
        .to_rgba8();
    let frame = drape::FrameRGBA::from_rgba_image(frame);
    let garment = read_garment(&args.garment)?;
    let pose = read_pose_json(&args.pose)?;

    let placement =
        drape::solve_placement(&pose, garment.aspect_ratio(), frame.canvas(), &config.solver);
    let overlay = placement.map(|placement| drape::Overlay {
        garment: &garment,
        placement,
    });

    let mut compositor = drape::Compositor::new(config.overlay.clear_rgba);
    let out = compositor.compose(&frame, overlay)?.to_rgba_image()?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    out.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    if placement.is_none() {
        eprintln!("torso not found; wrote frame without garment");
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_replay(args: ReplayArgs, config: drape::SessionConfig) -> anyhow::Result<()> {
    let track = drape::PoseTrack::from_json_file(&args.track)?;
    let mut engine = drape::ReplayEngine::new(track);
    if let Some(ms) = args.latency_ms {
        engine = engine.with_latency(Duration::from_millis(ms));
    }

    let fps = args.fps.unwrap_or(config.video.fps);
    let video = drape::ImageSequenceSource::new(&args.frames, fps);
    let sink = drape::PngSequenceSink::new(&args.out)?;

    let root = args
        .garment
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let reference = args
        .garment
        .file_name()
        .with_context(|| format!("garment path '{}' has no file name", args.garment.display()))?
        .to_string_lossy()
        .into_owned();
    let cache = drape::GarmentCache::new(drape::InlineLoader::new(drape::FsGarmentSource::new(
        root,
    )));

    let mut scheduler = drape::FrameScheduler::new(
        config,
        drape::SessionState::new(cache),
        video,
        engine,
        sink,
    )?;
    scheduler.initialize_engine()?;
    scheduler.select_garment(drape::GarmentSelection {
        id: reference.clone(),
        display_name: reference.clone(),
        image_reference: reference,
    });
    scheduler.start()?;

    let stats = if args.realtime {
        scheduler.run(&mut drape::IntervalClock::from_hz(fps))?
    } else {
        scheduler.run(&mut drape::ImmediateClock)?
    };

    eprintln!(
        "presented {} frames ({} analyzed, {} busy, {} with garment) to {}",
        stats.presented,
        stats.submitted,
        stats.busy,
        stats.overlays,
        args.out.display()
    );
    Ok(())
}
