//! Playback scheduling over an encoded song stream.
//!
//! The `Player` converts musical time (ticks) into wall-clock time
//! (microseconds) and fires song events against the two oscillator
//! channels. It never blocks: an external loop calls [`Player::poll`] with
//! the current value of a free-running microsecond counter, and any events
//! that have come due since the last poll fire in order within that call.

use log::{debug, info};

use crate::channel::{ChannelId, ToneChannel};
use crate::event::Event;
use crate::mapper;
use crate::varint::{Cursor, DecodeError};

/// Tempo assumed before a song header is read, in microseconds per beat
/// (500000 = 120 bpm).
const DEFAULT_TEMPO: u64 = 500000;

/// Resolution assumed before a song header is read.
const DEFAULT_TICKS_PER_BEAT: u64 = 1024;

/// Result of a single [`Player::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A song is loaded and playing; zero or more events fired
    Advancing,
    /// This poll consumed the end-of-stream event; playback has stopped
    Finished,
    /// Nothing to do: paused, stopped, or no song loaded
    Idle,
}

/// Receives playback-time notifications from the player.
///
/// This is the seam the optional metronome plugs into: the player tells it
/// when playback starts, pauses, resumes, and how far wall-clock time has
/// progressed under the current tempo. The unit type implements it as a
/// no-op for builds that don't track beats.
pub trait BeatTracker {
    /// Playback started from the top; return to beat zero.
    fn reset(&mut self, now: u32);

    /// Account for wall-clock progress up to `now` at the given tempo.
    ///
    /// Called at the end of every advancing poll, and again immediately
    /// before a tempo change installs so no elapsed time is accounted at
    /// the wrong tempo.
    fn update(&mut self, now: u32, tempo: u64, ticks_per_beat: u64);

    /// Playback is pausing; flush progress and stop accumulating.
    fn pause(&mut self, now: u32, tempo: u64, ticks_per_beat: u64);

    /// Playback resumed at `now`; time spent paused must not count.
    fn resume(&mut self, now: u32);
}

impl BeatTracker for () {
    fn reset(&mut self, _now: u32) {}
    fn update(&mut self, _now: u32, _tempo: u64, _ticks_per_beat: u64) {}
    fn pause(&mut self, _now: u32, _tempo: u64, _ticks_per_beat: u64) {}
    fn resume(&mut self, _now: u32) {}
}

/// The playback engine: event-stream interpreter plus real-time scheduler.
///
/// Owns the two oscillator channels and a read cursor into an externally
/// owned song buffer. The song is never copied or mutated.
///
/// # Examples
///
/// ```
/// use coiltone::{Player, PollOutcome, ToneChannel, ToneParams};
///
/// struct Sink;
/// impl ToneChannel for Sink {
///     fn configure(&mut self, _params: ToneParams) {}
///     fn silence(&mut self) {}
/// }
///
/// // Header: 1 tick/beat, 1000 us/beat. One note after one tick, then end.
/// let song = [0x81, 0x07, 0xE8, 0x81, 60, 10, 0x80, 0x85];
///
/// let mut player = Player::new(Sink, Sink);
/// player.start(&song, 0).unwrap();
/// assert_eq!(player.poll(0).unwrap(), PollOutcome::Advancing);
/// assert_eq!(player.poll(1000).unwrap(), PollOutcome::Finished);
/// assert_eq!(player.poll(2000).unwrap(), PollOutcome::Idle);
/// ```
pub struct Player<'a, P, S, M = ()> {
    primary: P,
    secondary: S,
    beat_tracker: M,
    cursor: Option<Cursor<'a>>,
    tempo: u64,
    ticks_per_beat: u64,
    mark: Option<u32>,
    paused: bool,
    events_processed: u64,
}

impl<'a, P: ToneChannel, S: ToneChannel> Player<'a, P, S> {
    /// Creates a player without beat tracking.
    pub fn new(primary: P, secondary: S) -> Self {
        Self::with_beat_tracker(primary, secondary, ())
    }
}

impl<'a, P: ToneChannel, S: ToneChannel, M: BeatTracker> Player<'a, P, S, M> {
    /// Creates a player that reports playback time to `beat_tracker`.
    pub fn with_beat_tracker(primary: P, secondary: S, beat_tracker: M) -> Self {
        Self {
            primary,
            secondary,
            beat_tracker,
            cursor: None,
            tempo: DEFAULT_TEMPO,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
            mark: None,
            paused: false,
            events_processed: 0,
        }
    }

    /// Loads a song and begins playback at `now`.
    ///
    /// Reads the `[ticks_per_beat][tempo]` header and leaves the cursor on
    /// the first event. Degenerate headers are rejected: a zero tempo or
    /// resolution would make every event permanently due.
    pub fn start(&mut self, song: &'a [u8], now: u32) -> Result<(), DecodeError> {
        let mut cursor = Cursor::new(song);
        let ticks_per_beat = cursor.read_varint()?;
        if ticks_per_beat == 0 {
            return Err(DecodeError::ZeroTicksPerBeat);
        }
        let tempo = cursor.read_varint()?;
        if tempo == 0 {
            return Err(DecodeError::ZeroTempo);
        }
        self.cursor = Some(cursor);
        self.ticks_per_beat = ticks_per_beat;
        self.tempo = tempo;
        self.mark = Some(now);
        self.paused = false;
        self.events_processed = 0;
        self.beat_tracker.reset(now);
        info!("song started: {ticks_per_beat} ticks/beat, {tempo} us/beat");
        Ok(())
    }

    /// Advances playback to `now`, firing every event that has come due.
    ///
    /// Overdue events fire in song order within a single call, so a caller
    /// that polls infrequently loses no events. A decode error stops
    /// playback before it is returned; the song must be `start`ed again.
    pub fn poll(&mut self, now: u32) -> Result<PollOutcome, DecodeError> {
        if self.paused || self.cursor.is_none() {
            return Ok(PollOutcome::Idle);
        }
        // An unset mark, or a mark in the future after counter wraparound,
        // resyncs to `now`: elapsed time is treated as zero.
        let mut mark = match self.mark {
            Some(mark) if mark <= now => mark,
            _ => now,
        };
        loop {
            let Some(cursor) = self.cursor.as_ref() else {
                self.mark = None;
                return Ok(PollOutcome::Finished);
            };
            let delta_ticks = match cursor.peek_varint() {
                Ok(value) => value,
                Err(error) => return Err(self.fail(error)),
            };
            let due_us = delta_ticks * self.tempo / self.ticks_per_beat;
            if u64::from(now - mark) < due_us {
                break;
            }
            // due_us fits in u32 here: it is at most now - mark.
            mark += due_us as u32;
            if let Err(error) = self.step(now) {
                return Err(self.fail(error));
            }
        }
        self.mark = Some(mark);
        self.beat_tracker.update(now, self.tempo, self.ticks_per_beat);
        Ok(PollOutcome::Advancing)
    }

    /// Fires the event at the cursor and advances past it.
    fn step(&mut self, now: u32) -> Result<(), DecodeError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(());
        };
        // Delta ticks were already accounted for by the due-time check.
        cursor.read_varint()?;
        let event = Event::decode(cursor)?;
        self.events_processed += 1;
        match event {
            Event::Silence(ChannelId::Primary) => self.primary.silence(),
            Event::Silence(ChannelId::Secondary) => self.secondary.silence(),
            Event::SilenceAll => {
                self.primary.silence();
                self.secondary.silence();
            }
            Event::TempoChange(tempo) => {
                // Flush elapsed time at the old tempo before switching.
                self.beat_tracker.update(now, self.tempo, self.ticks_per_beat);
                debug!("tempo change: {tempo} us/beat");
                self.tempo = tempo;
            }
            Event::EndOfStream => {
                info!("end of song after {} events", self.events_processed);
                self.cursor = None;
            }
            Event::Note {
                channel,
                note,
                volume,
            } => {
                if let Some(params) = mapper::tone_params(channel, note, volume) {
                    match channel {
                        ChannelId::Primary => self.primary.configure(params),
                        ChannelId::Secondary => self.secondary.configure(params),
                    }
                }
            }
        }
        Ok(())
    }

    fn fail(&mut self, error: DecodeError) -> DecodeError {
        self.cursor = None;
        self.mark = None;
        error
    }

    /// Suspends playback. Takes effect immediately; `poll` returns
    /// [`PollOutcome::Idle`] until [`Player::resume`].
    pub fn pause(&mut self, now: u32) {
        if !self.paused {
            self.beat_tracker.pause(now, self.tempo, self.ticks_per_beat);
        }
        self.paused = true;
    }

    /// Resumes playback at `now`. Real time spent paused is discarded
    /// without skewing tick accounting.
    pub fn resume(&mut self, now: u32) {
        if self.paused {
            self.paused = false;
            self.mark = Some(now);
            self.beat_tracker.resume(now);
        }
    }

    /// Stops playback and silences both channels.
    pub fn stop(&mut self) {
        self.cursor = None;
        self.mark = None;
        self.paused = false;
        self.primary.silence();
        self.secondary.silence();
    }

    /// Returns true while a song is loaded and not paused.
    pub fn is_playing(&self) -> bool {
        self.cursor.is_some() && !self.paused
    }

    /// Returns true if playback is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current tempo in microseconds per beat.
    pub fn tempo(&self) -> u64 {
        self.tempo
    }

    /// Current song resolution in ticks per beat.
    pub fn ticks_per_beat(&self) -> u64 {
        self.ticks_per_beat
    }

    /// Number of events fired since the last `start`.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// The primary oscillator channel.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The secondary oscillator channel.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// The attached beat tracker.
    pub fn beat_tracker(&self) -> &M {
        &self.beat_tracker
    }
}
