use crate::audio::compose::{AudioAssets, AudioTrack, compose_audio};
use crate::audio::events::{AudioEvent, TypedText, derive_audio_events};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig, encoding_err};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::foundation::math::Rng64;
use crate::highlight::language::LanguageFamily;
use crate::highlight::lexer::Token;
use crate::layout::engine::Layout;
use crate::render::backend::FrameRGBA;
use crate::render::cpu::FrameRenderer;
use crate::render::fingerprint::{FrameFingerprint, fingerprint_state};
use crate::script::config::Config;
use crate::script::model::Script;
use crate::session::storyboard::Storyboard;
use crate::theme::Theme;
use crate::timeline::schedule::Timeline;
use crate::timeline::state::RenderState;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, mpsc};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;
/// Mixed into the config seed for synthesized noise, so noise and sample choice use distinct
/// streams.
const SYNTH_SEED_SALT: u64 = 0xA5A5_0000_C11C_4000;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Chunk size used by the render->encode streaming pipeline.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Reuse an already rendered frame of the chunk when the render state is identical.
    pub static_frame_elision: bool,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,
    /// Compose the soundtrack and hand it to the sink in `render_range`.
    pub enable_audio: bool,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
            channel_capacity: 4,
            enable_audio: true,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames actually rasterized (may be < total when static-frame elision is enabled).
    pub frames_rendered: u64,
    /// Frames reused through static-frame elision.
    pub frames_elided: u64,
}

/// One clip generation: script, config and everything precomputed from them.
///
/// Construction validates the script against the config, lays out every block and builds the
/// timeline, so errors surface before any frame is rendered. Frames are a pure function of their
/// index; they can be rendered one at a time, iterated, or streamed into a [`FrameSink`].
pub struct RenderSession {
    board: Arc<Storyboard>,
    config: Config,
    opts: RenderSessionOpts,
    renderer: Option<FrameRenderer>,
    audio_assets: OnceLock<AudioAssets>,
}

impl RenderSession {
    /// Create a session, loading the theme font named by `config` (or a system font).
    pub fn new(script: Script, config: Config, opts: RenderSessionOpts) -> CodeReelResult<Self> {
        let theme = Theme::load(config.font_path.as_deref());
        Self::with_theme(script, config, Arc::new(theme), opts)
    }

    /// Create a session with an already loaded theme, shared with other sessions.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn with_theme(
        script: Script,
        config: Config,
        theme: Arc<Theme>,
        opts: RenderSessionOpts,
    ) -> CodeReelResult<Self> {
        let board = Storyboard::new(script, &config, &theme)?;
        tracing::debug!(
            language = board.language.display_name(),
            total_frames = board.timeline.total_frames(),
            tokens = board.tokens.len(),
            "session prepared"
        );
        Ok(Self {
            board: Arc::new(board),
            config,
            opts,
            renderer: None,
            audio_assets: OnceLock::new(),
        })
    }

    /// The script being rendered.
    pub fn script(&self) -> &Script {
        &self.board.script
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Language used for highlighting and the header file name.
    pub fn language(&self) -> LanguageFamily {
        self.board.language
    }

    /// Highlighted tokens of the code block.
    pub fn tokens(&self) -> &[Token] {
        &self.board.tokens
    }

    /// Geometry of every block.
    pub fn layout(&self) -> &Layout {
        &self.board.layout
    }

    /// Phase schedule of the clip.
    pub fn timeline(&self) -> &Timeline {
        &self.board.timeline
    }

    /// Exact frame count of the clip.
    pub fn total_frames(&self) -> u64 {
        self.board.timeline.total_frames()
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.board.timeline.fps()
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.board.layout.canvas
    }

    /// Render state of `frame`.
    pub fn state_at(&self, frame: FrameIndex) -> CodeReelResult<RenderState> {
        self.board.state_at(frame)
    }

    /// Render a single frame.
    pub fn render_frame(&mut self, frame: FrameIndex) -> CodeReelResult<FrameRGBA> {
        let st = self.board.state_at(frame)?;
        let renderer = match &mut self.renderer {
            Some(r) => r,
            slot => slot.insert(FrameRenderer::new(&self.board)?),
        };
        renderer.render(&self.board, &st)
    }

    /// Lazy iterator over every frame in order. Each call starts again from frame 0.
    pub fn frames(&self) -> CodeReelResult<Frames<'_>> {
        Ok(Frames {
            board: &self.board,
            renderer: FrameRenderer::new(&self.board)?,
            next: 0,
            end: self.total_frames(),
        })
    }

    fn audio_assets(&self) -> &AudioAssets {
        self.audio_assets.get_or_init(|| {
            let mut rng = Rng64::new(self.config.seed ^ SYNTH_SEED_SALT);
            AudioAssets::load(
                self.config.samples_dir.as_deref(),
                self.config.ambient_path.as_deref(),
                &mut rng,
            )
        })
    }

    /// Keystroke, enter and submit cues of the clip. Deterministic for a config seed.
    pub fn audio_events(&self) -> Vec<AudioEvent> {
        let pool = self.audio_assets().keys.len();
        let b = &self.board;
        let text = TypedText {
            question: &b.question,
            code: &b.code,
            command: &b.command,
        };
        derive_audio_events(&b.timeline, text, pool, &mut Rng64::new(self.config.seed))
    }

    /// Mix the full soundtrack; its length matches `total_frames / fps`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compose_audio(&self) -> CodeReelResult<AudioTrack> {
        let events = self.audio_events();
        compose_audio(&self.board.timeline, &events, self.audio_assets())
    }

    /// Render the whole clip into `sink`.
    pub fn render_all(&mut self, sink: &mut dyn FrameSink) -> CodeReelResult<RenderStats> {
        let range = self.board.timeline.range();
        self.render_range(range, sink)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, out-of-order worker completion is reordered at the sink boundary (bounded channel
    /// backpressure). The soundtrack, when enabled, is the part of the full mix under `range`.
    #[tracing::instrument(level = "debug", skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> CodeReelResult<RenderStats> {
        if range.is_empty() {
            return Err(CodeReelError::render("render range must be non-empty"));
        }
        if range.end.0 > self.total_frames() {
            return Err(CodeReelError::render(format!(
                "render range ends at {} but the clip has {} frames",
                range.end.0,
                self.total_frames()
            )));
        }
        tracing::info!(
            frames = range.len_frames(),
            parallel = self.opts.parallel,
            elision = self.opts.static_frame_elision,
            audio = self.opts.enable_audio,
            "render started"
        );
        let started = std::time::Instant::now();

        let mut audio_tmp = TempFileGuard(None);
        let audio_cfg = if self.opts.enable_audio {
            let track = self.compose_audio()?.slice(range, self.fps());
            let path = std::env::temp_dir().join(format!(
                "codereel_audio_mix_{}_{}.f32le",
                std::process::id(),
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or(0)
            ));
            track.write_f32le(&path)?;
            audio_tmp.0 = Some(path.clone());
            Some(AudioInputConfig {
                path,
                sample_rate: track.sample_rate,
                channels: track.channels,
            })
        } else {
            None
        };

        let canvas = self.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps(),
            frames: range.len_frames(),
            audio: audio_cfg,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = u64::from(cfg.width)
            .saturating_mul(u64::from(cfg.height))
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let board = Arc::clone(&self.board);
        let elision = self.opts.static_frame_elision;

        let stats = std::thread::scope(|scope| -> CodeReelResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            // Encoder thread: in-order delivery regardless of render completion order.
            let enc = scope.spawn(move || -> CodeReelResult<()> {
                sink_ref.begin(cfg).map_err(encoding_err)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, Arc<FrameRGBA>>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        sink_ref
                            .push_frame(FrameIndex(next), &frame)
                            .map_err(encoding_err)?;
                        next += 1;
                        continue;
                    }

                    let msg = rx.recv().map_err(|_| {
                        CodeReelError::render("render workers stopped before the range was complete")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);
                }

                sink_ref.end().map_err(encoding_err)?;
                Ok(())
            });

            let mut stats = RenderStats::default();
            let produce_res = (|| -> CodeReelResult<()> {
                let mut renderer = match pool {
                    Some(_) => None,
                    None => Some(match self.renderer.take() {
                        Some(r) => r,
                        None => FrameRenderer::new(&board)?,
                    }),
                };
                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    let chunk = ChunkCtx {
                        board: &board,
                        tx: &tx,
                        start: chunk_start,
                        end: chunk_end,
                    };
                    let chunk_stats = match (pool.as_ref(), renderer.as_mut(), elision) {
                        (Some(pool), _, true) => render_chunk_parallel_elided(&chunk, pool)?,
                        (Some(pool), _, false) => render_chunk_parallel(&chunk, pool)?,
                        (None, Some(r), elide) => render_chunk_sequential(&chunk, r, elide)?,
                        (None, None, _) => {
                            return Err(CodeReelError::render("no renderer for sequential chunk"));
                        }
                    };
                    stats.frames_total += chunk_stats.frames_total;
                    stats.frames_rendered += chunk_stats.frames_rendered;
                    stats.frames_elided += chunk_stats.frames_elided;
                    chunk_start = chunk_end;
                }
                if let Some(r) = renderer {
                    self.renderer = Some(r);
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| CodeReelError::render("encoder thread panicked"))?;

            // A sink failure closes the channel, so report it ahead of the send error it caused.
            match (produce_res, enc_res) {
                (Ok(()), Ok(())) => Ok(stats),
                (Err(_), Err(e @ CodeReelError::Encoding(_))) => Err(e),
                (Err(e), _) | (Ok(()), Err(e)) => Err(e),
            }
        })?;
        drop(audio_tmp);

        tracing::info!(
            frames = stats.frames_total,
            rendered = stats.frames_rendered,
            elided = stats.frames_elided,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render finished"
        );
        Ok(stats)
    }
}

/// Iterator returned by [`RenderSession::frames`].
pub struct Frames<'a> {
    board: &'a Storyboard,
    renderer: FrameRenderer,
    next: u64,
    end: u64,
}

impl Iterator for Frames<'_> {
    type Item = CodeReelResult<(FrameIndex, FrameRGBA)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let idx = FrameIndex(self.next);
        self.next += 1;
        let frame = self
            .board
            .state_at(idx)
            .and_then(|st| self.renderer.render(self.board, &st));
        Some(frame.map(|f| (idx, f)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Frames<'_> {}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Arc<FrameRGBA>,
}

#[derive(Clone, Copy)]
struct ChunkCtx<'a> {
    board: &'a Storyboard,
    tx: &'a mpsc::SyncSender<FrameMsg>,
    start: u64,
    end: u64,
}

impl ChunkCtx<'_> {
    fn send(&self, idx: u64, frame: Arc<FrameRGBA>) -> CodeReelResult<()> {
        self.tx
            .send(FrameMsg {
                idx: FrameIndex(idx),
                frame,
            })
            .map_err(|_| CodeReelError::encoding("encoder thread is not accepting frames"))
    }
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> CodeReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CodeReelError::config("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CodeReelError::render(format!("failed to build rayon thread pool: {e}")))
}

fn render_chunk_sequential(
    ctx: &ChunkCtx<'_>,
    renderer: &mut FrameRenderer,
    elide: bool,
) -> CodeReelResult<RenderStats> {
    let mut stats = RenderStats {
        frames_total: ctx.end - ctx.start,
        ..RenderStats::default()
    };
    let mut cache = HashMap::<FrameFingerprint, Arc<FrameRGBA>>::new();
    for f in ctx.start..ctx.end {
        let st = ctx.board.state_at(FrameIndex(f))?;
        let fp = elide.then(|| fingerprint_state(&st));
        if let Some(frame) = fp.and_then(|fp| cache.get(&fp)) {
            stats.frames_elided += 1;
            ctx.send(f, Arc::clone(frame))?;
            continue;
        }

        let frame = Arc::new(renderer.render(ctx.board, &st)?);
        stats.frames_rendered += 1;
        if let Some(fp) = fp {
            cache.insert(fp, Arc::clone(&frame));
        }
        ctx.send(f, frame)?;
    }
    Ok(stats)
}

fn render_chunk_parallel(ctx: &ChunkCtx<'_>, pool: &rayon::ThreadPool) -> CodeReelResult<RenderStats> {
    let tx = ctx.tx.clone();
    let board = ctx.board;
    pool.install(|| {
        (ctx.start..ctx.end).into_par_iter().try_for_each_init(
            || FrameRenderer::new(board),
            move |w, f| -> CodeReelResult<()> {
                let renderer = w
                    .as_mut()
                    .map_err(|e| CodeReelError::render(format!("render worker setup: {e}")))?;
                let st = board.state_at(FrameIndex(f))?;
                let frame = renderer.render(board, &st)?;
                tx.send(FrameMsg {
                    idx: FrameIndex(f),
                    frame: Arc::new(frame),
                })
                .map_err(|_| CodeReelError::encoding("encoder thread is not accepting frames"))
            },
        )
    })?;
    let n = ctx.end - ctx.start;
    Ok(RenderStats {
        frames_total: n,
        frames_rendered: n,
        frames_elided: 0,
    })
}

fn render_chunk_parallel_elided(
    ctx: &ChunkCtx<'_>,
    pool: &rayon::ThreadPool,
) -> CodeReelResult<RenderStats> {
    let mut uniq = Vec::<RenderState>::new();
    let mut map = Vec::<usize>::with_capacity((ctx.end - ctx.start) as usize);
    let mut seen = HashMap::<FrameFingerprint, usize>::new();

    for f in ctx.start..ctx.end {
        let st = ctx.board.state_at(FrameIndex(f))?;
        let u = *seen.entry(fingerprint_state(&st)).or_insert_with(|| {
            uniq.push(st);
            uniq.len() - 1
        });
        map.push(u);
    }

    let board = ctx.board;
    let rendered = pool.install(|| {
        uniq.par_iter()
            .map_init(
                || FrameRenderer::new(board),
                |w, st| -> CodeReelResult<Arc<FrameRGBA>> {
                    let renderer = w
                        .as_mut()
                        .map_err(|e| CodeReelError::render(format!("render worker setup: {e}")))?;
                    Ok(Arc::new(renderer.render(board, st)?))
                },
            )
            .collect::<CodeReelResult<Vec<_>>>()
    })?;

    for (i, f) in (ctx.start..ctx.end).enumerate() {
        ctx.send(f, Arc::clone(&rendered[map[i]]))?;
    }

    let total = ctx.end - ctx.start;
    let rendered_count = rendered.len() as u64;
    Ok(RenderStats {
        frames_total: total,
        frames_rendered: rendered_count,
        frames_elided: total.saturating_sub(rendered_count),
    })
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
