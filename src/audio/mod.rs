pub(crate) mod compose;
pub(crate) mod events;
pub(crate) mod media;
pub(crate) mod mix;
pub(crate) mod synth;
