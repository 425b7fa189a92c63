//! S3M file parser

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::error::S3mError;
use crate::module::{S3mInstrument, S3mModule, S3mPattern};
use crate::{HEADER_SIZE, INSTRUMENT_SIZE, NUM_CHANNELS, S3M_MAGIC1, S3M_MAGIC2};

mod helpers;
mod instrument;
mod pattern;
#[cfg(test)]
mod tests;

use helpers::{read_string, read_u8, read_u16};
use instrument::parse_instrument;
use pattern::parse_pattern;

/// Parse an S3M file into an [`S3mModule`]
///
/// Validates the header magic, resolves the instrument and pattern
/// parapointer tables, materializes every instrument's sample buffer, and
/// decodes every present pattern into a dense 32x64 cell grid.
///
/// # Arguments
/// * `data` - Raw S3M file bytes
///
/// # Returns
/// * `Ok(S3mModule)` - Parsed module
/// * `Err(S3mError)` - Parse error; a bad magic rejects the file before any
///   instrument or pattern decode begins
///
/// # Example
/// ```ignore
/// let data = std::fs::read("song.s3m")?;
/// let module = parse_s3m(&data)?;
/// println!("Loaded: {}", module.title);
/// ```
pub fn parse_s3m(data: &[u8]) -> Result<S3mModule, S3mError> {
    if data.len() < HEADER_SIZE {
        return Err(S3mError::TooSmall);
    }

    // Validate both magics before touching anything else
    if data[28] != S3M_MAGIC1 || &data[44..48] != S3M_MAGIC2 {
        return Err(S3mError::InvalidMagic);
    }

    let mut cursor = Cursor::new(data);

    // Song title (28 bytes, not necessarily null-terminated)
    let mut title_bytes = [0u8; 28];
    cursor.read_exact(&mut title_bytes)?;
    let title = read_string(&title_bytes);

    // Magic1 (1 byte) + type (1 byte) + unused (2 bytes)
    cursor.seek(SeekFrom::Current(4))?;

    let num_orders = read_u16(&mut cursor)?;
    let num_instruments = read_u16(&mut cursor)?;
    let num_patterns = read_u16(&mut cursor)?;

    // Old flags + tracker version + format version (3 x u16)
    cursor.seek(SeekFrom::Current(6))?;

    // Magic2 "SCRM" (4 bytes), already validated
    cursor.seek(SeekFrom::Current(4))?;

    let global_volume = read_u8(&mut cursor)?;
    let initial_speed = read_u8(&mut cursor)?;
    let initial_tempo = read_u8(&mut cursor)?;
    let master_volume = read_u8(&mut cursor)?;

    // Unused (10 bytes) + special (2 bytes)
    cursor.seek(SeekFrom::Current(12))?;

    let mut channel_settings = [0u8; NUM_CHANNELS];
    cursor.read_exact(&mut channel_settings)?;

    // Order list follows the header, parapointer tables follow the orders
    let tables_len =
        num_orders as usize + (num_instruments as usize + num_patterns as usize) * 2;
    if data.len() < HEADER_SIZE + tables_len {
        return Err(S3mError::TooSmall);
    }

    let mut orders = vec![0u8; num_orders as usize];
    cursor.read_exact(&mut orders)?;

    // Parapointers are stored in 16-byte units
    let mut instrument_offsets = Vec::with_capacity(num_instruments as usize);
    for _ in 0..num_instruments {
        instrument_offsets.push(read_u16(&mut cursor)? as usize * 16);
    }

    let mut pattern_offsets = Vec::with_capacity(num_patterns as usize);
    for _ in 0..num_patterns {
        pattern_offsets.push(read_u16(&mut cursor)? as usize * 16);
    }

    // Materialize instruments first; the pattern decoder needs their default
    // volumes to resolve "volume not set" cells
    let mut instruments = Vec::with_capacity(num_instruments as usize);
    for &offset in &instrument_offsets {
        if offset + INSTRUMENT_SIZE > data.len() {
            return Err(S3mError::InvalidInstrumentOffset(offset as u32));
        }
        instruments.push(parse_instrument(data, offset)?);
    }

    let mut patterns = Vec::with_capacity(num_patterns as usize);
    for &offset in &pattern_offsets {
        if offset == 0 {
            // Absent pattern slot
            patterns.push(None);
            continue;
        }
        if offset + 2 > data.len() {
            return Err(S3mError::InvalidPatternOffset(offset as u32));
        }
        patterns.push(Some(parse_pattern(data, offset, &instruments)?));
    }

    Ok(S3mModule {
        title,
        num_orders,
        num_instruments,
        num_patterns,
        global_volume,
        initial_speed,
        initial_tempo,
        master_volume,
        channel_settings,
        orders,
        instruments,
        patterns,
        tempo: initial_tempo as f64,
        speed: initial_speed as f64,
    })
}

/// Get list of instrument titles from an S3M file
pub fn get_instrument_titles(data: &[u8]) -> Result<Vec<String>, S3mError> {
    let module = parse_s3m(data)?;
    Ok(module.instruments.iter().map(|i| i.title.clone()).collect())
}
