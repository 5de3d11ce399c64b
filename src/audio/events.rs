use crate::foundation::core::FrameIndex;
use crate::foundation::math::Rng64;
use crate::timeline::schedule::{EventKind, EventPayload, Timeline, TypingTarget, char_reveal_frame};
use serde::Serialize;

/// Sound played by an [`AudioEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleId {
    /// Keystroke click, index into the keystroke pool.
    Key(usize),
    /// Enter key at a typed line break.
    Enter,
    /// Command submitted; played when the output is revealed.
    Submit,
}

/// One sound cue on the frame grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AudioEvent {
    /// Frame the sound starts on.
    pub frame: FrameIndex,
    /// Sound to play.
    pub sample: SampleId,
}

/// The three typed blocks, as chars.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TypedText<'a> {
    pub(crate) question: &'a [char],
    pub(crate) code: &'a [char],
    pub(crate) command: &'a [char],
}

impl<'a> TypedText<'a> {
    fn get(&self, target: TypingTarget) -> &'a [char] {
        match target {
            TypingTarget::Question => self.question,
            TypingTarget::Code => self.code,
            TypingTarget::Command => self.command,
        }
    }
}

/// One cue per typed character, on the frame the character appears, plus the submit cue.
///
/// Line breaks map to [`SampleId::Enter`]; every other character picks a key sample from a pool
/// of `pool_len` using `rng`. Events are sorted by frame.
pub(crate) fn derive_audio_events(
    timeline: &Timeline,
    text: TypedText<'_>,
    pool_len: usize,
    rng: &mut Rng64,
) -> Vec<AudioEvent> {
    let mut out = Vec::with_capacity(text.question.len() + text.code.len() + text.command.len() + 1);
    for event in timeline.events() {
        match event.payload {
            EventPayload::Typing { target, chars } => {
                let typed = text.get(target);
                debug_assert_eq!(typed.len(), chars);
                let frames = event.frames();
                for (i, &c) in typed.iter().enumerate() {
                    let local = char_reveal_frame(i + 1, typed.len(), frames);
                    let sample = if c == '\n' {
                        SampleId::Enter
                    } else {
                        SampleId::Key(rng.next_below(pool_len))
                    };
                    out.push(AudioEvent {
                        frame: FrameIndex(event.start.0 + local),
                        sample,
                    });
                }
            }
            _ if event.kind == EventKind::ShowOutput => out.push(AudioEvent {
                frame: event.start,
                sample: SampleId::Submit,
            }),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/events.rs"]
mod tests;
