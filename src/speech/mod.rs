//! Spoken output
//!
//! A single worker thread owns the voice engine and services an unbounded
//! FIFO of speech requests, so producers never block and an engine crash
//! never takes the rest of the program with it.

mod queue;
mod synth;

pub use queue::{SpeechHandle, SpeechQueue};
pub use synth::{NativeSynth, NullSynth, Synthesizer};
