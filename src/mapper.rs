//! Pure note-to-oscillator mapping.
//!
//! Converts a (channel, note, volume) triple into the [`ToneParams`] the
//! channel hardware needs. The period tables are calibrated against a
//! 16 MHz oscillator clock; each channel picks a clock divisor per note so
//! the period stays inside its counter width (8 bits on the primary
//! channel, 16 on the secondary). Lower notes need larger divisors.
//!
//! This module has no side effects, so the whole mapping is testable
//! without hardware.

use crate::channel::{ChannelId, ToneParams};

/// Number of 16 MHz clock cycles in one half-cycle of the 250 kHz resonant
/// target the duty cycle is calibrated against.
const RESONANT_HALF_CYCLE_CLOCKS: u32 = 32;

/// Volume levels above this are clamped.
pub const MAX_VOLUME: u8 = 10;

/// Lowest note the primary (8-bit) channel can play.
pub const PRIMARY_NOTE_OFFSET: u8 = 35;

/// Lowest note the secondary (16-bit) channel can play.
pub const SECONDARY_NOTE_OFFSET: u8 = 21;

const PRIMARY_DIVISORS: [u16; 7] = [1, 8, 32, 64, 128, 256, 1024];
const SECONDARY_DIVISORS: [u16; 5] = [1, 8, 64, 256, 1024];

/// Counter periods for notes 35..=127 on the primary channel, paired with
/// the divisor chosen by `primary_divisor`.
const PRIMARY_PERIODS: [u8; 93] = [
    252, //
    238, 224, 212, 200, 189, 178, 168, 158, 149, 141, 133, 126, //
    118, 112, 105, 99, 94, 88, 83, 79, 74, 70, 66, 252, //
    238, 224, 212, 200, 189, 178, 168, 158, 149, 141, 133, 252, //
    238, 224, 212, 200, 189, 178, 168, 158, 149, 141, 133, 252, //
    238, 224, 212, 200, 189, 178, 168, 158, 149, 141, 133, 252, //
    238, 224, 212, 200, 189, 178, 168, 158, 149, 141, 133, 126, //
    118, 112, 105, 99, 94, 88, 83, 79, 74, 70, 66, 252, //
    238, 224, 212, 200, 189, 178, 168, 158,
];

/// Counter periods for notes 21..=127 on the secondary channel, paired with
/// the divisor chosen by `secondary_divisor`.
const SECONDARY_PERIODS: [u16; 107] = [
    9090, 8580, 64792, //
    61155, 57723, 54483, 51425, 48539, 45814, 43243, 40816, 38525, 36363, 34322, 32395, //
    30577, 28861, 27241, 25712, 24269, 22907, 21621, 20407, 19262, 18181, 17160, 16197, //
    15288, 14430, 13620, 12855, 12134, 11453, 10810, 10203, 9630, 9090, 8580, 64792, //
    61155, 57723, 54483, 51425, 48539, 45814, 43243, 40816, 38525, 36363, 34322, 32395, //
    30577, 28861, 27241, 25712, 24269, 22907, 21621, 20407, 19262, 18181, 17160, 16197, //
    15288, 14430, 13620, 12855, 12134, 11453, 10810, 10203, 9630, 9090, 8580, 8098, //
    7644, 7214, 6809, 6427, 6066, 5726, 5404, 5101, 4815, 4544, 4289, 4049, //
    3821, 3607, 3404, 3213, 3033, 2862, 2702, 2550, 2407, 2272, 2144, 2024, //
    1910, 1803, 1702, 1606, 1516, 1431, 1350, 1275,
];

fn primary_divisor(note: u8) -> u16 {
    let index = if note <= 58 {
        6
    } else if note <= 70 {
        5
    } else if note <= 82 {
        4
    } else if note <= 94 {
        3
    } else if note <= 118 {
        2
    } else {
        1
    };
    PRIMARY_DIVISORS[index]
}

fn secondary_divisor(note: u8) -> u16 {
    let index = if note <= 22 {
        2
    } else if note <= 58 {
        1
    } else {
        0
    };
    SECONDARY_DIVISORS[index]
}

/// Volume-to-duty law shared by both channels.
///
/// The drive stage only switches at full subdivision boundaries, so a
/// computed duty of one subdivision targets a half-subdivision on-time:
/// positive values are decremented by one. This arithmetic is calibrated
/// hardware timing; keep it exact.
fn duty_for(volume: u8, divisor: u16, period: u16) -> u16 {
    let duty =
        u32::from(volume.min(MAX_VOLUME)) * RESONANT_HALF_CYCLE_CLOCKS / u32::from(divisor);
    let duty = duty.saturating_sub(1) as u16;
    if duty >= period { period - 1 } else { duty }
}

/// Maps a note to the full oscillator configuration for `channel`.
///
/// Returns `None` for unplayable notes: anything with the high bit set, or
/// below the channel's note offset. The caller is expected to leave the
/// channel's previous configuration untouched in that case.
///
/// # Examples
///
/// ```
/// use coiltone::mapper::tone_params;
/// use coiltone::ChannelId;
///
/// // A4 on the secondary channel: 16 MHz / 36363 = 440 Hz.
/// let params = tone_params(ChannelId::Secondary, 69, 10).unwrap();
/// assert_eq!(params.period, 36363);
/// assert_eq!(params.divisor, 1);
/// assert_eq!(params.duty, 319);
///
/// // Below the channel's range: no configuration at all.
/// assert!(tone_params(ChannelId::Secondary, 20, 10).is_none());
/// ```
pub fn tone_params(channel: ChannelId, note: u8, volume: u8) -> Option<ToneParams> {
    if note & 0x80 != 0 {
        return None;
    }
    let (period, divisor) = match channel {
        ChannelId::Primary => {
            let index = note.checked_sub(PRIMARY_NOTE_OFFSET)? as usize;
            let period = u16::from(*PRIMARY_PERIODS.get(index)?);
            (period, primary_divisor(note))
        }
        ChannelId::Secondary => {
            let index = note.checked_sub(SECONDARY_NOTE_OFFSET)? as usize;
            let period = *SECONDARY_PERIODS.get(index)?;
            (period, secondary_divisor(note))
        }
    };
    let duty = duty_for(volume, divisor, period);
    Some(ToneParams {
        period,
        duty,
        divisor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK_HZ: f64 = 16_000_000.0;

    fn midi_frequency(note: u8) -> f64 {
        440.0 * 2.0_f64.powf((f64::from(note) - 69.0) / 12.0)
    }

    #[test]
    fn test_a4_on_both_channels() {
        let secondary = tone_params(ChannelId::Secondary, 69, 10).unwrap();
        assert_eq!(secondary.period, 36363);
        assert_eq!(secondary.divisor, 1);
        assert_eq!(secondary.duty, 319);

        let primary = tone_params(ChannelId::Primary, 69, 10).unwrap();
        assert_eq!(primary.period, 141);
        assert_eq!(primary.divisor, 256);
        // 10 * 32 / 256 = 1, decremented to half a subdivision.
        assert_eq!(primary.duty, 0);
    }

    #[test]
    fn test_lowest_notes() {
        let secondary = tone_params(ChannelId::Secondary, 21, 10).unwrap();
        assert_eq!(secondary.period, 9090);
        assert_eq!(secondary.divisor, 64);

        let primary = tone_params(ChannelId::Primary, 35, 10).unwrap();
        assert_eq!(primary.period, 252);
        assert_eq!(primary.divisor, 1024);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        for note in 0..=255u8 {
            for volume in 0..=12u8 {
                for channel in [ChannelId::Primary, ChannelId::Secondary] {
                    assert_eq!(
                        tone_params(channel, note, volume),
                        tone_params(channel, note, volume)
                    );
                }
            }
        }
    }

    #[test]
    fn test_duty_always_below_period() {
        for note in 0..=127u8 {
            for volume in 0..=255u8 {
                for channel in [ChannelId::Primary, ChannelId::Secondary] {
                    if let Some(params) = tone_params(channel, note, volume) {
                        assert!(
                            params.duty < params.period,
                            "duty {} >= period {} for note {note} volume {volume} on {channel:?}",
                            params.duty,
                            params.period
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_notes() {
        for note in 0..SECONDARY_NOTE_OFFSET {
            assert!(tone_params(ChannelId::Secondary, note, 10).is_none());
        }
        for note in 0..PRIMARY_NOTE_OFFSET {
            assert!(tone_params(ChannelId::Primary, note, 10).is_none());
        }
        // High bit set means "not a playable note".
        assert!(tone_params(ChannelId::Secondary, 0x80 | 69, 10).is_none());
        assert!(tone_params(ChannelId::Primary, 0xFF, 10).is_none());
    }

    #[test]
    fn test_full_note_range_is_covered() {
        for note in SECONDARY_NOTE_OFFSET..=127 {
            assert!(tone_params(ChannelId::Secondary, note, 10).is_some());
        }
        for note in PRIMARY_NOTE_OFFSET..=127 {
            assert!(tone_params(ChannelId::Primary, note, 10).is_some());
        }
    }

    #[test]
    fn test_volume_clamped_to_max() {
        for channel in [ChannelId::Primary, ChannelId::Secondary] {
            assert_eq!(
                tone_params(channel, 69, MAX_VOLUME),
                tone_params(channel, 69, 255)
            );
        }
    }

    #[test]
    fn test_zero_volume_zero_duty() {
        for note in SECONDARY_NOTE_OFFSET..=127 {
            assert_eq!(tone_params(ChannelId::Secondary, note, 0).unwrap().duty, 0);
        }
    }

    #[test]
    fn test_duty_decrement_law() {
        // 10 * 32 / 8 = 40, minus one for the half-subdivision on-time.
        assert_eq!(duty_for(10, 8, 1000), 39);
        // Volume 1 at divisor 32 computes to exactly one subdivision.
        assert_eq!(duty_for(1, 32, 1000), 0);
        assert_eq!(duty_for(0, 1, 1000), 0);
    }

    #[test]
    fn test_duty_clamped_below_period() {
        // The real tables never trigger the clamp; exercise it directly.
        assert_eq!(duty_for(10, 1, 100), 99);
        assert_eq!(duty_for(10, 1, 320), 319);
    }

    #[test]
    fn test_tables_track_equal_temperament() {
        // Each table entry, scaled by its divisor, approximates the true
        // note frequency on a 16 MHz clock.
        for note in SECONDARY_NOTE_OFFSET..=127 {
            let params = tone_params(ChannelId::Secondary, note, 0).unwrap();
            let actual = CLOCK_HZ / (f64::from(params.divisor) * f64::from(params.period));
            let target = midi_frequency(note);
            let cents = 1200.0 * (actual / target).log2();
            assert!(
                cents.abs() < 10.0,
                "note {note}: {actual:.1} Hz vs {target:.1} Hz ({cents:.1} cents)"
            );
        }
        for note in PRIMARY_NOTE_OFFSET..=127 {
            let params = tone_params(ChannelId::Primary, note, 0).unwrap();
            let actual = CLOCK_HZ / (f64::from(params.divisor) * f64::from(params.period));
            let target = midi_frequency(note);
            let cents = 1200.0 * (actual / target).log2();
            // The 8-bit table is coarser, give it a wider tolerance.
            assert!(
                cents.abs() < 35.0,
                "note {note}: {actual:.1} Hz vs {target:.1} Hz ({cents:.1} cents)"
            );
        }
    }
}
