//! Song event decoding.
//!
//! Each event is `[varint delta_ticks][event_byte][payload...]`. The event
//! byte's high bit selects the target channel and its low seven bits carry
//! the opcode. The delta-ticks field belongs to the scheduler (it decides
//! *when* the event fires), so [`Event::decode`] starts at the event byte.

use crate::channel::ChannelId;
use crate::varint::{Cursor, DecodeError};

const OP_SILENCE: u8 = 0;
const OP_SILENCE_ALL: u8 = 1;
const OP_TEMPO: u8 = 2;
const OP_END: u8 = 5;

/// One decoded song event.
///
/// The opcode space is closed: every value that is not an assigned opcode is
/// a note number. Opcodes 3 and 4 therefore decode as notes and are later
/// discarded by the note mapping's range check, since both channels' note
/// ranges start well above them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Silence the selected channel
    Silence(ChannelId),
    /// Silence both channels
    SilenceAll,
    /// Install a new tempo, in microseconds per beat
    TempoChange(u64),
    /// Terminal marker; nothing follows
    EndOfStream,
    /// Play `note` at `volume` (0-10) on the selected channel
    Note {
        channel: ChannelId,
        note: u8,
        volume: u8,
    },
}

impl Event {
    /// Decodes the event at the cursor, advancing it past the payload.
    ///
    /// The leading delta-ticks varint must already have been consumed by the
    /// caller. A zero tempo in a tempo-change payload is rejected here so a
    /// degenerate value can never reach the scheduler's due-time arithmetic.
    ///
    /// # Examples
    ///
    /// ```
    /// use coiltone::varint::Cursor;
    /// use coiltone::{ChannelId, Event};
    ///
    /// // Note 60 at volume 8, high bit set selects the secondary channel.
    /// let mut cursor = Cursor::new(&[0x80 | 60, 8]);
    /// let event = Event::decode(&mut cursor).unwrap();
    /// assert_eq!(
    ///     event,
    ///     Event::Note { channel: ChannelId::Secondary, note: 60, volume: 8 }
    /// );
    /// ```
    pub fn decode(cursor: &mut Cursor<'_>) -> Result<Event, DecodeError> {
        let byte = cursor.read_u8()?;
        let channel = if byte & 0x80 != 0 {
            ChannelId::Secondary
        } else {
            ChannelId::Primary
        };
        match byte & 0x7f {
            OP_SILENCE => Ok(Event::Silence(channel)),
            OP_SILENCE_ALL => Ok(Event::SilenceAll),
            OP_TEMPO => {
                let tempo = cursor.read_varint()?;
                if tempo == 0 {
                    return Err(DecodeError::ZeroTempo);
                }
                Ok(Event::TempoChange(tempo))
            }
            OP_END => Ok(Event::EndOfStream),
            note => {
                let volume = cursor.read_u8()?;
                Ok(Event::Note {
                    channel,
                    note,
                    volume,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint;

    fn decode(bytes: &[u8]) -> Result<Event, DecodeError> {
        Event::decode(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_silence_channel_select() {
        assert_eq!(decode(&[0x00]), Ok(Event::Silence(ChannelId::Primary)));
        assert_eq!(decode(&[0x80]), Ok(Event::Silence(ChannelId::Secondary)));
    }

    #[test]
    fn test_silence_all() {
        assert_eq!(decode(&[0x01]), Ok(Event::SilenceAll));
        // The channel bit is irrelevant for silence-all.
        assert_eq!(decode(&[0x81]), Ok(Event::SilenceAll));
    }

    #[test]
    fn test_tempo_change() {
        let mut bytes = vec![0x02];
        varint::encode(600000, &mut bytes);
        assert_eq!(decode(&bytes), Ok(Event::TempoChange(600000)));
    }

    #[test]
    fn test_zero_tempo_rejected() {
        assert_eq!(decode(&[0x02, 0x80]), Err(DecodeError::ZeroTempo));
    }

    #[test]
    fn test_end_of_stream() {
        assert_eq!(decode(&[0x05]), Ok(Event::EndOfStream));
    }

    #[test]
    fn test_note_event() {
        assert_eq!(
            decode(&[69, 10]),
            Ok(Event::Note {
                channel: ChannelId::Primary,
                note: 69,
                volume: 10
            })
        );
        assert_eq!(
            decode(&[0x80 | 69, 3]),
            Ok(Event::Note {
                channel: ChannelId::Secondary,
                note: 69,
                volume: 3
            })
        );
    }

    #[test]
    fn test_unassigned_opcodes_decode_as_notes() {
        // 3 and 4 are not assigned opcodes; they take the note path and are
        // dropped later by the mapper's range check.
        for opcode in [3u8, 4] {
            assert_eq!(
                decode(&[opcode, 5]),
                Ok(Event::Note {
                    channel: ChannelId::Primary,
                    note: opcode,
                    volume: 5
                })
            );
        }
    }

    #[test]
    fn test_truncated_payloads() {
        // Note event missing its volume byte.
        assert_eq!(decode(&[69]), Err(DecodeError::Truncated));
        // Tempo change missing its varint.
        assert_eq!(decode(&[0x02]), Err(DecodeError::Truncated));
        // Empty stream.
        assert_eq!(decode(&[]), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_cursor_advances_past_payload() {
        let mut cursor = Cursor::new(&[69, 10, 0xFF]);
        Event::decode(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 2);
    }
}
