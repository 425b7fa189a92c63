//! Note pitch and row timing arithmetic

/// Base periods for the 12 semitones at octave 0 (C through B)
pub const NOTE_PERIODS: [u32; 12] = [
    1712, 1616, 1524, 1440, 1356, 1280, 1208, 1140, 1076, 1016, 960, 907,
];

/// Check if a packed note byte is the note-cut/silence marker (high nibble 0xF)
#[inline]
pub fn is_note_cut(note: u8) -> bool {
    note >> 4 == 0xF
}

/// Convert a packed note byte plus an instrument's tuning frequency into a
/// playback frequency in Hz.
///
/// The packed byte carries the octave in the high nibble and the semitone in
/// the low nibble. The period halves per octave through an integer right
/// shift, reproducing the tracker's table-based pitch scale rather than a
/// continuous exponential. The 8368*16 and 14317056 constants come from the
/// format's 8363 Hz reference clock family and must not be altered.
///
/// Cut markers carry no pitch; callers screen them out with [`is_note_cut`]
/// before getting here.
pub fn note_frequency(note: u8, c5_freq: u32) -> f64 {
    debug_assert!(!is_note_cut(note), "note-cut marker has no frequency");

    let octave = (note >> 4) as u32;
    let semitone = (note & 0x0F) as usize;
    debug_assert!(semitone < 12, "semitone nibble out of range: {semitone}");

    let base = NOTE_PERIODS[semitone.min(NOTE_PERIODS.len() - 1)];
    let period = 8368.0 * 16.0 * (base >> octave) as f64 / c5_freq as f64;

    14_317_056.0 / period
}

/// Nanoseconds per pattern row for a tempo (BPM) and speed (ticks per row)
pub fn row_interval_ns(tempo: f64, speed: f64) -> u64 {
    (1e9 / (4.0 * tempo * (6.0 / speed) / 60.0)) as u64
}
