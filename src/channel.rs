//! Oscillator channel abstraction.
//!
//! The engine drives two independent hardware oscillators. Everything it
//! needs from them is captured by [`ToneChannel`]; the register-level
//! mechanics live behind the trait, which keeps the note mapping and the
//! playback scheduler testable without hardware.

/// Identifies one of the two oscillator channels.
///
/// The primary channel counts in an 8-bit range, the secondary in a 16-bit
/// range; each has its own note range and divisor table (see
/// [`crate::mapper`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    /// 8-bit counter, notes 35 and up
    Primary,
    /// 16-bit counter, notes 21 and up
    Secondary,
}

/// A complete oscillator configuration for one note.
///
/// Produced by the pure note mapping in [`crate::mapper`] and consumed by a
/// [`ToneChannel`]. `duty` is always strictly less than `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneParams {
    /// Counter period; smaller period means higher pitch
    pub period: u16,
    /// On-time within one period, in divided clock cycles
    pub duty: u16,
    /// Clock divisor applied ahead of the counter
    pub divisor: u16,
}

/// Capability interface for one hardware oscillator channel.
pub trait ToneChannel {
    /// Applies a full (period, duty, divisor) configuration.
    ///
    /// Calls are idempotent given identical parameters.
    fn configure(&mut self, params: ToneParams);

    /// Stops the channel's output entirely.
    fn silence(&mut self);
}
