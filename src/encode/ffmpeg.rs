use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Opaque color the premultiplied frames are flattened onto.
    pub background: Rgba8,
}

impl FfmpegSinkOpts {
    /// Write to `out_path`, replacing it, over a black background.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8::rgb(0, 0, 0),
        }
    }
}

/// MP4 sink backed by the system `ffmpeg`.
///
/// Frames are flattened to opaque RGBA and piped as rawvideo at the declared rate. The soundtrack
/// is read from its `f32le` file and must already match the video length; `begin` refuses a
/// mismatched track and `end` refuses a short frame count, so a finished file always holds
/// exactly `frames` frames of H.264 (`yuv420p`) plus AAC audio of the same duration.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    cfg: Option<SinkConfig>,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
    last: Option<FrameIndex>,
    pushed: u64,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            encoder: None,
            scratch: Vec::new(),
            last: None,
            pushed: 0,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> CodeReelResult<()> {
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(CodeReelError::encoding(format!(
                "{}x{} is not encodable: yuv420p needs even dimensions",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(CodeReelError::encoding(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;

        let encoder = Encoder::spawn(&encoder_args(&cfg, &self.opts))?;
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            frames = cfg.frames,
            secs = cfg.duration_secs(),
            audio = cfg.audio.is_some(),
            "ffmpeg started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last = None;
        self.pushed = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CodeReelResult<()> {
        let (Some(cfg), Some(encoder)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(CodeReelError::encoding("ffmpeg sink not started"));
        };
        if self.last.is_some_and(|last| idx <= last) {
            return Err(CodeReelError::encoding(format!(
                "frame {} arrived out of order",
                idx.0
            )));
        }
        if self.pushed >= cfg.frames {
            return Err(CodeReelError::encoding(format!(
                "frame {} exceeds the {} declared frames",
                idx.0, cfg.frames
            )));
        }
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(CodeReelError::encoding(format!(
                "frame {} is {}x{}, the stream is {}x{}",
                idx.0, frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_over(self.opts.background, &frame.data, &mut self.scratch)?;
        encoder.write(&self.scratch)?;
        self.last = Some(idx);
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> CodeReelResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| CodeReelError::encoding("ffmpeg sink not started"))?;
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| CodeReelError::encoding("ffmpeg sink not started"))?;
        // A short stream would leave ffmpeg writing a truncated, audio-padded file.
        cfg.check_complete(self.pushed)?;
        encoder.finish()
    }
}

/// Command line for one encode: rawvideo on stdin, optional `f32le` track, MP4 out.
///
/// The video stream is pinned to the declared frame count; no `-shortest`, the track length was
/// already checked against it.
fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let rate = format!("{}/{}", cfg.fps.num, cfg.fps.den);
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if opts.overwrite { "-y" } else { "-n" }, "-loglevel", "error"]);
    push(&[
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        format!("{}x{}", cfg.width, cfg.height).as_str(),
        "-r",
        rate.as_str(),
        "-i",
        "pipe:0",
    ]);
    if let Some(audio) = &cfg.audio {
        push(&[
            "-f",
            "f32le",
            "-ar",
            audio.sample_rate.to_string().as_str(),
            "-ac",
            audio.channels.to_string().as_str(),
            "-i",
        ]);
        args.push(audio.path.clone().into_os_string());
        args.extend(["-c:a", "aac", "-b:a", "192k"].map(OsString::from));
    } else {
        args.push("-an".into());
    }
    args.extend(
        [
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-r",
            rate.as_str(),
            "-frames:v",
            cfg.frames.to_string().as_str(),
            "-movflags",
            "+faststart",
        ]
        .map(OsString::from),
    );
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Running `ffmpeg` child with its stdin pipe and a thread draining stderr.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl Encoder {
    fn spawn(args: &[OsString]) -> CodeReelResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CodeReelError::encoding(format!("cannot start ffmpeg (is it on PATH?): {e}"))
            })?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf)?;
                Ok(buf)
            })
        });
        if stdin.is_none() {
            return Err(CodeReelError::encoding("ffmpeg stdin is not piped"));
        }
        Ok(Self {
            child,
            stdin,
            stderr,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> CodeReelResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CodeReelError::encoding("ffmpeg stdin already closed"))?;
        stdin
            .write_all(bytes)
            .map_err(|e| CodeReelError::encoding(format!("writing a frame to ffmpeg: {e}")))
    }

    fn finish(mut self) -> CodeReelResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| CodeReelError::encoding(format!("waiting for ffmpeg: {e}")))?;
        let log = match self.stderr.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| CodeReelError::encoding("ffmpeg stderr reader panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            return Err(CodeReelError::encoding(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for Encoder {
    // Reached with a live child only when the render aborted; don't leave ffmpeg running.
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Composite premultiplied RGBA onto an opaque background. The result is opaque RGBA.
fn flatten_over(background: Rgba8, src: &[u8], dst: &mut [u8]) -> CodeReelResult<()> {
    if src.len() != dst.len() || !src.len().is_multiple_of(4) {
        return Err(CodeReelError::encoding(format!(
            "frame holds {} bytes, the stream expects {}",
            src.len(),
            dst.len()
        )));
    }
    let bg = [background.r, background.g, background.b].map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let uncovered = 255 - u16::from(s[3]);
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], uncovered)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> CodeReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
