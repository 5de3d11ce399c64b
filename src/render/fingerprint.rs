use crate::timeline::schedule::TypingTarget;
use crate::timeline::state::RenderState;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6f2c_9d1e_c0de_7ee1;

/// 128-bit identity of everything a frame's pixels depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Fingerprint a render state.
///
/// Two frames of one session with equal fingerprints rasterize to identical pixels.
pub fn fingerprint_state(st: &RenderState) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(st.question_chars as u64);
    h.write_u64(st.code_chars as u64);
    h.write_u64(st.command_chars as u64);
    match st.terminal_y {
        Some(y) => {
            h.write_u8(1);
            h.write_u32(y as u32);
        }
        None => h.write_u8(0),
    }
    h.write_bool(st.output_visible);
    // An invisible caret draws nothing, wherever it sits.
    match st.caret.filter(|c| c.visible) {
        Some(c) => {
            h.write_u8(1);
            h.write_u8(match c.target {
                TypingTarget::Question => 0,
                TypingTarget::Code => 1,
                TypingTarget::Command => 2,
            });
        }
        None => h.write_u8(0),
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
