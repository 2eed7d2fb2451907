//! Plays a randomly selected built-in song against console-backed
//! channels, printing every oscillator configuration and beat boundary.
//!
//! Run with `cargo run --example play_song`.

use std::time::{Duration, Instant};

use anyhow::Result;
use coiltone::metronome::{BeatIndicator, Metronome};
use coiltone::{Player, PollOutcome, SongSelector, ToneChannel, ToneParams, varint};

struct ConsoleChannel {
    name: &'static str,
}

impl ToneChannel for ConsoleChannel {
    fn configure(&mut self, params: ToneParams) {
        let hz = 16_000_000.0 / (f64::from(params.divisor) * f64::from(params.period));
        println!(
            "[{}] period={:5} duty={:3} divisor={:4} (~{:.1} Hz)",
            self.name, params.period, params.duty, params.divisor, hz
        );
    }

    fn silence(&mut self) {
        println!("[{}] silence", self.name);
    }
}

struct ConsoleIndicator;

impl BeatIndicator for ConsoleIndicator {
    fn reset(&mut self) {
        println!("--- metronome reset ---");
    }

    fn show(&mut self, beat: u64) {
        println!("--- beat {}:{} ---", beat / 4 + 1, beat % 4 + 1);
    }
}

/// Minimal song encoder for the built-in demo material.
struct SongWriter {
    bytes: Vec<u8>,
}

impl SongWriter {
    fn new(ticks_per_beat: u64, tempo: u64) -> Self {
        let mut bytes = Vec::new();
        varint::encode(ticks_per_beat, &mut bytes);
        varint::encode(tempo, &mut bytes);
        Self { bytes }
    }

    fn note(&mut self, delta: u64, event_byte: u8, volume: u8) {
        varint::encode(delta, &mut self.bytes);
        self.bytes.push(event_byte);
        self.bytes.push(volume);
    }

    fn tempo(&mut self, delta: u64, tempo: u64) {
        varint::encode(delta, &mut self.bytes);
        self.bytes.push(2);
        varint::encode(tempo, &mut self.bytes);
    }

    fn finish(mut self, delta: u64) -> Vec<u8> {
        varint::encode(delta, &mut self.bytes);
        self.bytes.push(1);
        varint::encode(0, &mut self.bytes);
        self.bytes.push(5);
        self.bytes
    }
}

fn scale() -> Vec<u8> {
    let mut writer = SongWriter::new(1024, 500000);
    for (i, &note) in [60u8, 62, 64, 65, 67, 69, 71, 72].iter().enumerate() {
        writer.note(if i == 0 { 0 } else { 256 }, note, 8);
        // Bass an octave down on the secondary channel, every other note.
        if i % 2 == 0 {
            writer.note(0, 0x80 | (note - 12), 10);
        }
    }
    writer.finish(512)
}

fn arpeggio() -> Vec<u8> {
    let mut writer = SongWriter::new(1024, 600000);
    for &note in &[57u8, 60, 64, 69, 64, 60] {
        writer.note(256, note, 6);
    }
    // Double time for the second pass.
    writer.tempo(0, 300000);
    for &note in &[57u8, 60, 64, 69, 64, 60] {
        writer.note(256, note, 6);
    }
    writer.finish(256)
}

fn main() -> Result<()> {
    let songs = [scale(), arpeggio()];
    let names = ["C major scale", "A minor arpeggio"];

    let mut selector = SongSelector::new(songs.len());
    let mut rng = rand::thread_rng();
    let index = selector.next(&mut rng);
    println!("playing: {}", names[index]);

    let mut player = Player::with_beat_tracker(
        ConsoleChannel { name: "primary" },
        ConsoleChannel { name: "secondary" },
        Metronome::new(ConsoleIndicator),
    );

    let started = Instant::now();
    let now_us = || started.elapsed().as_micros() as u32;

    player.start(&songs[index], now_us())?;
    loop {
        match player.poll(now_us())? {
            PollOutcome::Finished => break,
            _ => std::thread::sleep(Duration::from_millis(2)),
        }
    }
    println!("done after {} events", player.events_processed());
    Ok(())
}
