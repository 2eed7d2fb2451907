//! Coiltone - a playback engine for a dual-channel PWM tone interrupter
//!
//! This library decodes a compact binary song format and schedules its
//! events in real time onto two independent hardware oscillator channels.
//! The hardware itself stays behind the [`ToneChannel`] trait; everything
//! else - varint decoding, note-to-oscillator mapping, the non-blocking
//! polled scheduler, and the optional beat-tracking metronome - is pure
//! library code.

pub mod channel;
pub mod event;
pub mod mapper;
#[cfg(feature = "metronome")]
pub mod metronome;
pub mod player;
pub mod selector;
pub mod varint;

// Re-export commonly used types at the crate root
pub use channel::{ChannelId, ToneChannel, ToneParams};
pub use event::Event;
#[cfg(feature = "metronome")]
pub use metronome::{BeatIndicator, Metronome};
pub use player::{BeatTracker, Player, PollOutcome};
pub use selector::SongSelector;
pub use varint::{Cursor, DecodeError};
