//! Instrument record decoding and sample materialization

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::MAX_SAMPLE_FRAMES;
use crate::error::S3mError;
use crate::module::{S3mInstrument, S3mSampleFlags};

use super::helpers::{read_string, read_u8, read_u32};

/// Decode the 80-byte instrument record at `offset` and materialize its raw
/// PCM payload into a normalized float buffer.
///
/// The caller has already verified the record itself lies within `data`; the
/// sample payload range is validated here.
pub(crate) fn parse_instrument(data: &[u8], offset: usize) -> Result<S3mInstrument, S3mError> {
    let mut cursor = Cursor::new(data);
    cursor.seek(SeekFrom::Start(offset as u64))?;

    // Type (1 byte) - 1 = PCM sample; empty and adlib slots decode the same way
    let _instrument_type = read_u8(&mut cursor)?;

    // DOS filename (12 bytes)
    let mut filename_bytes = [0u8; 12];
    cursor.read_exact(&mut filename_bytes)?;
    let filename = read_string(&filename_bytes);

    // Sample segment pointer (3 bytes); the low word is little-endian and
    // counts 16-byte units, the first byte goes unused
    let mut memseg = [0u8; 3];
    cursor.read_exact(&mut memseg)?;
    let sample_offset = u16::from_le_bytes([memseg[1], memseg[2]]) as usize * 16;

    let length = read_u32(&mut cursor)? as usize;
    let loop_begin = read_u32(&mut cursor)?;
    let loop_end = read_u32(&mut cursor)?;

    let default_volume = read_u8(&mut cursor)?;

    // Unused (1 byte) + pack (1 byte)
    cursor.seek(SeekFrom::Current(2))?;

    let flags = S3mSampleFlags::from_bits(read_u8(&mut cursor)?);
    let c5_freq = read_u32(&mut cursor)?;

    // Unused (4 bytes) + internal (8 bytes)
    cursor.seek(SeekFrom::Current(12))?;

    // Instrument title (28 bytes)
    let mut title_bytes = [0u8; 28];
    cursor.read_exact(&mut title_bytes)?;
    let title = read_string(&title_bytes);

    // Trailing "SCRS" magic is not validated

    let mut frames = length;
    if frames > MAX_SAMPLE_FRAMES {
        log::warn!(
            "Sample '{}' length {} exceeds limit of {}, truncating",
            title,
            frames,
            MAX_SAMPLE_FRAMES
        );
        frames = MAX_SAMPLE_FRAMES;
    }

    let sample = load_sample(
        data,
        sample_offset,
        frames,
        flags.contains(S3mSampleFlags::SAMPLE_16BIT),
    )?;

    Ok(S3mInstrument {
        title,
        filename,
        default_volume,
        c5_freq,
        flags,
        loop_begin,
        loop_end,
        sample,
    })
}

/// Normalize a raw unsigned PCM payload into [-1, 1] floats.
///
/// This is a lossless range remap only: no dithering, no interpolation.
fn load_sample(
    data: &[u8],
    offset: usize,
    frames: usize,
    is_16bit: bool,
) -> Result<Vec<f32>, S3mError> {
    let mut sample = Vec::with_capacity(frames);

    if is_16bit {
        let raw = data
            .get(offset..offset + frames * 2)
            .ok_or(S3mError::InvalidSampleOffset(offset as u32))?;
        for pair in raw.chunks_exact(2) {
            let v = u16::from_le_bytes([pair[0], pair[1]]);
            let s = v as f32 / 65536.0 - 0.5;
            debug_assert!((-1.0..=1.0).contains(&s));
            sample.push(s);
        }
    } else {
        let raw = data
            .get(offset..offset + frames)
            .ok_or(S3mError::InvalidSampleOffset(offset as u32))?;
        for &b in raw {
            let s = b as f32 / 128.0 - 1.0;
            debug_assert!((-1.0..=1.0).contains(&s));
            sample.push(s);
        }
    }

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_8bit_endpoints() {
        let data = [0u8, 255, 128];
        let sample = load_sample(&data, 0, 3, false).unwrap();
        assert_eq!(sample, vec![-1.0, 255.0 / 128.0 - 1.0, 0.0]);
        assert_eq!(sample[1], 0.9921875);
    }

    #[test]
    fn test_load_sample_16bit_endpoints() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&65535u16.to_le_bytes());
        data.extend_from_slice(&32768u16.to_le_bytes());
        let sample = load_sample(&data, 0, 3, true).unwrap();
        assert_eq!(sample, vec![-0.5, 65535.0 / 65536.0 - 0.5, 0.0]);
        assert_eq!(sample[1], 0.49998474121093750);
    }

    #[test]
    fn test_load_sample_out_of_bounds() {
        let data = [0u8; 16];
        assert!(matches!(
            load_sample(&data, 8, 16, false),
            Err(S3mError::InvalidSampleOffset(8))
        ));
    }
}
