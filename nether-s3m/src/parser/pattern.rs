//! Pattern cell stream decoding

use std::io::{Cursor, Seek, SeekFrom};

use crate::error::S3mError;
use crate::module::{S3mCell, S3mInstrument, S3mPattern};
use crate::{NUM_CHANNELS, ROWS_PER_PATTERN};

use super::helpers::{read_u8, read_u16};

/// Decode one pattern's length-prefixed cell stream into a dense 32x64 grid.
///
/// The on-disk encoding omits a field when it repeats the previous row on the
/// same channel, so the scan carries per-channel memory of the last explicit
/// note, instrument and volume. The memory arrays are local to this call and
/// never shared across patterns.
pub(crate) fn parse_pattern(
    data: &[u8],
    offset: usize,
    instruments: &[S3mInstrument],
) -> Result<S3mPattern, S3mError> {
    let mut cursor = Cursor::new(data);
    cursor.seek(SeekFrom::Start(offset as u64))?;

    // Packed byte count follows in the stream after this 2-byte prefix
    let packed_length = read_u16(&mut cursor)?;
    let stream_end = cursor.position() + packed_length as u64;

    let mut pattern = S3mPattern::empty();

    let mut prev_note = [0u8; NUM_CHANNELS];
    let mut prev_instrument = [0u8; NUM_CHANNELS];
    let mut prev_volume = [0u8; NUM_CHANNELS];

    let mut row = 0;
    while row < ROWS_PER_PATTERN && cursor.position() < stream_end {
        let raw = read_u8(&mut cursor)?;

        if raw == 0 {
            // End of row; nothing else is consumed
            row += 1;
            continue;
        }

        let channel = (raw & 31) as usize;

        let mut cell = S3mCell {
            raw,
            ..S3mCell::default()
        };

        if raw & 32 != 0 {
            // Explicit (note, instrument) pair
            let mut note = read_u8(&mut cursor)?;
            if note == 255 {
                note = 0;
            }
            if note != 0 {
                prev_note[channel] = note;
            }
            cell.note = note;

            let instr = read_u8(&mut cursor)?;
            if instr != 0 {
                prev_instrument[channel] = instr;
                // A fresh instrument trigger forgets the prior explicit volume
                prev_volume[channel] = 0;
            }
            cell.instrument = instr;
        }

        // A zero field inherits the channel's remembered value, whether the
        // stream omitted it or carried an explicit zero
        if cell.note == 0 {
            cell.note = prev_note[channel];
        }
        if cell.instrument == 0 {
            cell.instrument = prev_instrument[channel];
        }

        if raw & 64 != 0 {
            let mut volume = read_u8(&mut cursor)?;
            if volume > 64 {
                // Out of range counts as "not set"
                volume = 0;
            }
            if volume != 0 {
                prev_volume[channel] = volume;
            }
            cell.volume = volume;
        } else {
            cell.volume = prev_volume[channel];
        }

        // Volume still unset with an instrument present: use that
        // instrument's default volume
        if cell.volume == 0 && cell.instrument != 0 {
            if let Some(instr) = instruments.get(cell.instrument as usize - 1) {
                cell.volume = instr.default_volume;
            }
        }

        if raw & 128 != 0 {
            cell.effect = read_u8(&mut cursor)?;
            cell.effect_param = read_u8(&mut cursor)?;
        }

        *pattern.cell_mut(channel, row) = cell;
    }

    Ok(pattern)
}
