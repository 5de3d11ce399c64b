use crate::animation::ease::Ease;
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use serde::Serialize;

/// Pause after the question is typed.
pub const QUESTION_PAUSE_MS: u64 = 2000;
/// Pause after the code is typed.
pub const CODE_PAUSE_MS: u64 = 1000;
/// Terminal slide-up animation.
pub const SLIDE_MS: u64 = 700;
/// Pause after the command is typed, before it "runs".
pub const COMMAND_PAUSE_MS: u64 = 1500;
/// How long the output is shown before the tail.
pub const SHOW_OUTPUT_MS: u64 = 3000;
/// Frozen tail of the clip.
pub const HOLD_MS: u64 = 2000;
/// Easing of the terminal slide.
pub const SLIDE_EASE: Ease = Ease::OutCubic;

/// Phase of the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Question is typed character by character.
    TypeQuestion,
    /// Nothing is typed; the caret blinks.
    Pause,
    /// Code is typed.
    TypeCode,
    /// Terminal slides up from the bottom edge.
    SlideTerminal,
    /// Command is typed at the prompt.
    TypeCommand,
    /// Output is revealed at once.
    ShowOutput,
    /// Frozen tail.
    Hold,
}

/// Text block receiving keystrokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingTarget {
    /// Question block.
    Question,
    /// Code block.
    Code,
    /// Terminal command line.
    Command,
}

/// Event specific data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// `chars` characters of `target` are revealed over the event.
    Typing {
        /// Block being typed.
        target: TypingTarget,
        /// Characters revealed by the end of the event.
        chars: usize,
    },
    /// Caret blinks at the end of `caret`.
    Idle {
        /// Block holding the caret.
        caret: TypingTarget,
    },
    /// Terminal moves with eased progress.
    Slide {
        /// Progress curve.
        ease: Ease,
    },
    /// No per-frame data.
    Static,
}

/// One phase of the timeline covering `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    /// Phase.
    pub kind: EventKind,
    /// Phase data.
    pub payload: EventPayload,
    /// First frame.
    pub start: FrameIndex,
    /// One past the last frame.
    pub end: FrameIndex,
    /// Duration before rounding to frames.
    pub nominal_ms: u64,
}

impl TimelineEvent {
    /// Frames covered by the event.
    pub fn frames(&self) -> u64 {
        self.end.0 - self.start.0
    }

    /// Range covered by the event.
    pub fn range(&self) -> FrameRange {
        FrameRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// Character counts of the three typed blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypingLengths {
    /// Question characters.
    pub question: usize,
    /// Code characters, line breaks included.
    pub code: usize,
    /// Command characters.
    pub command: usize,
}

/// Ordered, contiguous events covering `[0, total_frames)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
    total_frames: u64,
    fps: Fps,
}

impl Timeline {
    /// Expand the fixed animation script into frame ranges.
    ///
    /// Every duration is rounded half up to whole frames; the final `hold` absorbs the rounding
    /// drift so the total equals the rounded sum of all nominal durations. At very low frame rates
    /// the per-event rounding (and the one-frame floor of typing events) can overshoot that sum
    /// by more than the hold is long; the hold then shrinks to zero and the total grows to the
    /// frames the other events need.
    pub fn build(lengths: TypingLengths, fps: Fps, per_char_ms: u32) -> CodeReelResult<Self> {
        if fps.num == 0 || fps.den == 0 {
            return Err(CodeReelError::timeline("fps must be non-zero"));
        }
        if per_char_ms == 0 {
            return Err(CodeReelError::timeline("per-character time must be non-zero"));
        }
        let per_char = u64::from(per_char_ms);
        let typing_ms = |n: usize| (n as u64).saturating_mul(per_char);

        use EventKind as K;
        use EventPayload as P;
        use TypingTarget as T;
        let plan: [(EventKind, EventPayload, u64); 9] = [
            (
                K::TypeQuestion,
                P::Typing {
                    target: T::Question,
                    chars: lengths.question,
                },
                typing_ms(lengths.question),
            ),
            (K::Pause, P::Idle { caret: T::Question }, QUESTION_PAUSE_MS),
            (
                K::TypeCode,
                P::Typing {
                    target: T::Code,
                    chars: lengths.code,
                },
                typing_ms(lengths.code),
            ),
            (K::Pause, P::Idle { caret: T::Code }, CODE_PAUSE_MS),
            (K::SlideTerminal, P::Slide { ease: SLIDE_EASE }, SLIDE_MS),
            (
                K::TypeCommand,
                P::Typing {
                    target: T::Command,
                    chars: lengths.command,
                },
                typing_ms(lengths.command),
            ),
            (K::Pause, P::Idle { caret: T::Command }, COMMAND_PAUSE_MS),
            (K::ShowOutput, P::Static, SHOW_OUTPUT_MS),
            (K::Hold, P::Static, HOLD_MS),
        ];

        let total_ms: u64 = plan.iter().map(|(_, _, ms)| *ms).sum();
        let nominal_frames = fps.ms_to_frames_round(total_ms);

        let mut events = Vec::with_capacity(plan.len());
        let mut cursor = 0u64;
        for (kind, payload, ms) in plan {
            let frames = if kind == K::Hold {
                let hold = nominal_frames.saturating_sub(cursor);
                if hold == 0 && cursor > nominal_frames {
                    tracing::debug!(
                        overshoot = cursor - nominal_frames,
                        "frame rounding exceeds the hold, clip extended"
                    );
                }
                hold
            } else {
                let mut f = fps.ms_to_frames_round(ms);
                if let P::Typing { chars, .. } = payload
                    && chars > 0
                {
                    f = f.max(1);
                }
                f
            };
            events.push(TimelineEvent {
                kind,
                payload,
                start: FrameIndex(cursor),
                end: FrameIndex(cursor + frames),
                nominal_ms: ms,
            });
            cursor += frames;
        }

        let timeline = Self {
            events,
            total_frames: cursor,
            fps,
        };
        timeline.check()?;
        tracing::debug!(
            total_frames = timeline.total_frames,
            question_frames = timeline.events[0].frames(),
            code_frames = timeline.events[2].frames(),
            hold_frames = timeline.events[8].frames(),
            "timeline built"
        );
        Ok(timeline)
    }

    fn check(&self) -> CodeReelResult<()> {
        let mut expected = 0u64;
        for e in &self.events {
            if e.start.0 != expected || e.end.0 < e.start.0 {
                return Err(CodeReelError::timeline(format!(
                    "{:?} event is not contiguous (starts at {}, expected {expected})",
                    e.kind, e.start.0
                )));
            }
            expected = e.end.0;
        }
        if expected != self.total_frames {
            return Err(CodeReelError::timeline(format!(
                "events cover {expected} frames, total is {}",
                self.total_frames
            )));
        }
        Ok(())
    }

    /// Events in playback order.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Exact number of frames in the clip.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frame rate the timeline was built for.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }

    /// Whole clip as a range.
    pub fn range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.total_frames),
        }
    }

    /// Event active at `frame`, or `None` past the end.
    pub fn event_at(&self, frame: FrameIndex) -> Option<&TimelineEvent> {
        self.event_index_at(frame).map(|i| &self.events[i])
    }

    /// Index of the event active at `frame`. Zero-length events are never active.
    pub fn event_index_at(&self, frame: FrameIndex) -> Option<usize> {
        let idx = self.events.partition_point(|e| e.end.0 <= frame.0);
        self.events
            .get(idx)
            .filter(|e| e.start.0 <= frame.0)
            .map(|_| idx)
    }

    /// First event of `kind`.
    pub fn find(&self, kind: EventKind) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }
}

/// Characters revealed at local frame `k` of a typing event of `n` chars over `frames` frames.
pub fn revealed_chars(k: u64, n: usize, frames: u64) -> usize {
    if frames == 0 {
        return n;
    }
    let v = (u128::from(k) + 1) * n as u128 / u128::from(frames);
    v.min(n as u128) as usize
}

/// Local frame at which character `i` (1-based) first becomes visible.
pub fn char_reveal_frame(i: usize, n: usize, frames: u64) -> u64 {
    if n == 0 || frames == 0 {
        return 0;
    }
    let num = i as u128 * u128::from(frames);
    let den = n as u128;
    (num.div_ceil(den).saturating_sub(1)) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
