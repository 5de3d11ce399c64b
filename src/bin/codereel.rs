use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "codereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 clip (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the event schedule as JSON.
    Timeline(TimelineArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Script JSON (`question`, `code`, `command`, `output`, `cursor_style`).
    #[arg(long)]
    script: PathBuf,

    /// Config JSON; every key is optional.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Reuse identical frames (pauses, the final hold) instead of re-rendering them.
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,

    /// Skip the soundtrack.
    #[arg(long, default_value_t = false)]
    no_audio: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn load(input: &InputArgs) -> anyhow::Result<(codereel::Script, codereel::Config)> {
    let script = codereel::Script::from_path(&input.script)
        .with_context(|| format!("load script '{}'", input.script.display()))?;
    let config = match &input.config {
        Some(path) => codereel::Config::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => codereel::Config::default(),
    };
    Ok((script, config))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (script, config) = load(&args.input)?;
    let opts = codereel::RenderSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        static_frame_elision: args.static_frame_elision,
        channel_capacity: 4,
        enable_audio: !args.no_audio,
    };
    let mut sess = codereel::RenderSession::new(script, config, opts)?;

    let sink_opts = codereel::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
        background: codereel::Palette::default().background,
    };
    let mut sink = codereel::FfmpegSink::new(sink_opts);
    let stats = sess
        .render_all(&mut sink)
        .with_context(|| format!("render '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        args.out.display(),
        stats.frames_total,
        sess.timeline().duration_secs()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (script, config) = load(&args.input)?;
    let mut sess =
        codereel::RenderSession::new(script, config, codereel::RenderSessionOpts::default())?;
    let frame = sess.render_frame(codereel::FrameIndex(args.frame))?;
    write_frame(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_frame(frame: &codereel::FrameRGBA, out: &Path) -> anyhow::Result<()> {
    codereel::write_png(frame, out).with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let (script, config) = load(&args.input)?;
    let sess =
        codereel::RenderSession::new(script, config, codereel::RenderSessionOpts::default())?;
    let json = serde_json::to_string_pretty(sess.timeline()).context("serialize timeline")?;
    println!("{json}");
    Ok(())
}
