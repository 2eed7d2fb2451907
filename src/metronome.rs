//! Wall-clock beat tracking for the external beat indicator.
//!
//! The metronome accumulates ticks from the same tempo/resolution values
//! the player schedules with, but independently of the event stream, so
//! beat boundaries land on musical time even while no events fire. It
//! implements [`BeatTracker`], the player's notification seam.

use log::debug;

use crate::player::BeatTracker;

/// Receives beat boundaries.
///
/// `show` is called at most once per boundary with a monotonically
/// increasing beat index; `reset` precedes index zero of a new song.
pub trait BeatIndicator {
    fn reset(&mut self);
    fn show(&mut self, beat: u64);
}

/// Tick accumulator that emits beat boundaries at the current tempo.
///
/// Multiple beats elapsing between updates are emitted one by one, in
/// order, within a single update (the same catch-up shape the player uses
/// for events).
///
/// # Examples
///
/// ```
/// use coiltone::metronome::{BeatIndicator, Metronome};
/// use coiltone::BeatTracker;
///
/// struct Counter(u64);
/// impl BeatIndicator for Counter {
///     fn reset(&mut self) {}
///     fn show(&mut self, beat: u64) {
///         self.0 = beat;
///     }
/// }
///
/// let mut metronome = Metronome::new(Counter(0));
/// metronome.reset(0);
/// // 500000 us/beat at 1024 ticks/beat: one beat every half second.
/// metronome.update(1_000_000, 500000, 1024);
/// assert_eq!(metronome.beat(), 2);
/// ```
pub struct Metronome<B> {
    indicator: B,
    mark: Option<u32>,
    /// Elapsed microseconds scaled by ticks-per-beat that have not yet
    /// amounted to a whole tick, kept modulo the tempo. The unit is
    /// tempo-independent, so mid-song tempo changes lose nothing.
    carry: u64,
    ticks: u64,
    beat: u64,
}

impl<B: BeatIndicator> Metronome<B> {
    /// Creates a metronome at beat zero with no time mark.
    pub fn new(indicator: B) -> Self {
        Self {
            indicator,
            mark: None,
            carry: 0,
            ticks: 0,
            beat: 0,
        }
    }

    /// Beats emitted since the last reset.
    pub fn beat(&self) -> u64 {
        self.beat
    }

    /// The attached indicator.
    pub fn indicator(&self) -> &B {
        &self.indicator
    }

    fn advance(&mut self, now: u32, tempo: u64, ticks_per_beat: u64) {
        // Unset mark or wrapped counter: resync, elapsed time is zero.
        let mark = match self.mark {
            Some(mark) if mark <= now => mark,
            _ => now,
        };
        self.mark = Some(now);
        // Exact integer conversion: the sub-tick remainder carries to the
        // next update instead of being rounded away.
        let scaled = self.carry + u64::from(now - mark) * ticks_per_beat;
        self.ticks += scaled / tempo;
        self.carry = scaled % tempo;
        while self.ticks >= ticks_per_beat {
            self.ticks -= ticks_per_beat;
            debug!("beat {}:{}", self.beat / 4 + 1, self.beat % 4 + 1);
            self.beat += 1;
            self.indicator.show(self.beat);
        }
    }
}

impl<B: BeatIndicator> BeatTracker for Metronome<B> {
    fn reset(&mut self, now: u32) {
        self.mark = Some(now);
        self.carry = 0;
        self.ticks = 0;
        self.beat = 0;
        self.indicator.reset();
        self.indicator.show(0);
    }

    fn update(&mut self, now: u32, tempo: u64, ticks_per_beat: u64) {
        self.advance(now, tempo, ticks_per_beat);
    }

    fn pause(&mut self, now: u32, tempo: u64, ticks_per_beat: u64) {
        self.advance(now, tempo, ticks_per_beat);
        self.mark = None;
    }

    fn resume(&mut self, now: u32) {
        self.mark = Some(now);
    }
}
