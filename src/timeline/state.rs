use crate::foundation::core::FrameIndex;
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::timeline::schedule::{EventKind, EventPayload, Timeline, TypingTarget, revealed_chars};

/// Vertical positions of the terminal top during the slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlidePath {
    /// Off-screen start.
    pub from_y: i32,
    /// Resting position.
    pub to_y: i32,
}

/// Caret position and blink phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Caret {
    /// Block the caret sits in, at its reveal boundary.
    pub target: TypingTarget,
    /// `false` during the off half of a blink.
    pub visible: bool,
}

/// Everything a frame depends on. Pure function of the frame index and the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderState {
    /// Question characters shown.
    pub question_chars: usize,
    /// Code characters shown.
    pub code_chars: usize,
    /// Command characters shown.
    pub command_chars: usize,
    /// Terminal top in pixels, `None` while below the canvas.
    pub terminal_y: Option<i32>,
    /// Whether the program output is shown.
    pub output_visible: bool,
    /// Caret, if one is drawn in this phase.
    pub caret: Option<Caret>,
}

impl Timeline {
    /// Resolve the render state of `frame`.
    pub fn state_at(&self, frame: FrameIndex, slide: SlidePath) -> CodeReelResult<RenderState> {
        let idx = self.event_index_at(frame).ok_or_else(|| {
            CodeReelError::render(format!(
                "frame {} is outside the clip (0..{})",
                frame.0,
                self.total_frames()
            ))
        })?;
        let event = &self.events()[idx];
        let k = frame.0 - event.start.0;

        // Phases before the active event are complete.
        let done = &self.events()[..idx];
        let typed = |target: TypingTarget| {
            done.iter()
                .find_map(|e| match e.payload {
                    EventPayload::Typing { target: t, chars } if t == target => Some(chars),
                    _ => None,
                })
                .unwrap_or(0)
        };
        let passed = |kind: EventKind| done.iter().any(|e| e.kind == kind);

        let mut st = RenderState {
            question_chars: typed(TypingTarget::Question),
            code_chars: typed(TypingTarget::Code),
            command_chars: typed(TypingTarget::Command),
            terminal_y: passed(EventKind::SlideTerminal).then_some(slide.to_y),
            output_visible: event.kind == EventKind::ShowOutput
                || passed(EventKind::ShowOutput),
            caret: None,
        };

        match event.payload {
            EventPayload::Typing { target, chars } => {
                let shown = revealed_chars(k, chars, event.frames());
                match target {
                    TypingTarget::Question => st.question_chars = shown,
                    TypingTarget::Code => st.code_chars = shown,
                    TypingTarget::Command => st.command_chars = shown,
                }
                st.caret = Some(Caret {
                    target,
                    visible: true,
                });
            }
            EventPayload::Idle { caret } => {
                st.caret = Some(Caret {
                    target: caret,
                    visible: self.blink_on(k),
                });
            }
            EventPayload::Slide { ease } => {
                let t = (k + 1) as f64 / event.frames() as f64;
                let p = ease.apply(t);
                let y = f64::from(slide.from_y) + f64::from(slide.to_y - slide.from_y) * p;
                st.terminal_y = Some(y.round() as i32);
            }
            EventPayload::Static => {}
        }
        Ok(st)
    }

    /// Blink phase at local frame `k` of a pause: on for 8 of every 15 frames at 30 fps,
    /// scaled to the frame rate.
    pub fn blink_on(&self, k: u64) -> bool {
        let period = self.fps().ms_to_frames_round(500).max(2);
        let on = (period * 8 / 15).max(1);
        k % period < on
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/state.rs"]
mod tests;
