//! S3M module data structures

mod instrument;

pub use instrument::{S3mInstrument, S3mSampleFlags};

use crate::{NUM_CHANNELS, ORDER_END, ROWS_PER_PATTERN};

/// Parsed S3M module
///
/// Owns the materialized instruments, the decoded pattern grids, and the
/// play-order list. `tempo` and `speed` start at the header's initial values;
/// a playback driver may update `tempo` between rows when it encounters a
/// Txx effect (see [`crate::Sequencer`]).
#[derive(Debug, Clone)]
pub struct S3mModule {
    /// Song title (max 28 chars)
    pub title: String,
    /// Number of entries in the order list
    pub num_orders: u16,
    /// Number of instrument slots
    pub num_instruments: u16,
    /// Number of pattern slots (entries may be absent)
    pub num_patterns: u16,
    /// Global volume (0-64)
    pub global_volume: u8,
    /// Initial speed (ticks per row)
    pub initial_speed: u8,
    /// Initial tempo (BPM)
    pub initial_tempo: u8,
    /// Master volume
    pub master_volume: u8,
    /// Per-channel settings bytes from the header
    pub channel_settings: [u8; NUM_CHANNELS],
    /// Pattern play order; 255 ends the song
    pub orders: Vec<u8>,
    /// Materialized instruments, indexed by 0-based instrument number
    pub instruments: Vec<S3mInstrument>,
    /// Decoded patterns; `None` for slots with a zero parapointer
    pub patterns: Vec<Option<S3mPattern>>,
    /// Current tempo (BPM), mutable at runtime via the Txx effect
    pub tempo: f64,
    /// Current speed (ticks per row)
    pub speed: f64,
}

impl S3mModule {
    /// Iterate the play order, stopping at the first end-of-song sentinel
    pub fn play_order(&self) -> impl Iterator<Item = u8> + '_ {
        self.orders.iter().copied().take_while(|&o| o != ORDER_END)
    }

    /// Get the pattern at the given order position
    pub fn pattern_at_order(&self, order: u16) -> Option<&S3mPattern> {
        let pattern_idx = *self.orders.get(order as usize)?;
        if pattern_idx == ORDER_END {
            return None;
        }
        self.patterns.get(pattern_idx as usize)?.as_ref()
    }

    /// Nanoseconds per pattern row at the current tempo and speed
    pub fn row_interval_ns(&self) -> u64 {
        crate::note::row_interval_ns(self.tempo, self.speed)
    }
}

/// S3M pattern: a dense 32x64 grid of cells
///
/// Cells the packed stream never wrote stay all-zero ("empty"). The grid is
/// immutable after decode.
#[derive(Debug, Clone)]
pub struct S3mPattern {
    cells: Vec<S3mCell>,
}

impl S3mPattern {
    /// Create an all-empty pattern grid
    pub fn empty() -> Self {
        Self {
            cells: vec![S3mCell::default(); NUM_CHANNELS * ROWS_PER_PATTERN],
        }
    }

    /// Get the cell at (channel, row)
    ///
    /// # Panics
    /// Panics if `channel >= 32` or `row >= 64`.
    pub fn cell(&self, channel: usize, row: usize) -> &S3mCell {
        assert!(channel < NUM_CHANNELS && row < ROWS_PER_PATTERN);
        &self.cells[row * NUM_CHANNELS + channel]
    }

    pub(crate) fn cell_mut(&mut self, channel: usize, row: usize) -> &mut S3mCell {
        assert!(channel < NUM_CHANNELS && row < ROWS_PER_PATTERN);
        &mut self.cells[row * NUM_CHANNELS + channel]
    }

    /// Get one row as a 32-cell slice
    pub fn row(&self, row: usize) -> &[S3mCell] {
        assert!(row < ROWS_PER_PATTERN);
        &self.cells[row * NUM_CHANNELS..(row + 1) * NUM_CHANNELS]
    }
}

/// Single decoded cell in a pattern grid
///
/// All implied values are already resolved: note/instrument/volume carry the
/// channel's inherited state where the stream omitted a field, and volume 0
/// with an instrument present has been replaced by that instrument's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct S3mCell {
    /// Raw flag byte from the stream; 0 means the cell was never written
    pub raw: u8,
    /// Packed note: octave in the high nibble, semitone in the low.
    /// 0 = none, high nibble 0xF = note cut.
    pub note: u8,
    /// Instrument number: 0 = none, 1-based otherwise
    pub instrument: u8,
    /// Volume (0-64); 0 only when no instrument is set either
    pub volume: u8,
    /// Effect command (1-indexed letter; 0 = none)
    pub effect: u8,
    /// Effect parameter
    pub effect_param: u8,
}

impl S3mCell {
    /// Check if the stream ever wrote this cell
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw == 0
    }

    /// Check if this cell references an instrument
    #[inline]
    pub fn has_instrument(&self) -> bool {
        self.instrument > 0
    }

    /// Check if this cell's note is the cut/silence marker
    #[inline]
    pub fn is_note_cut(&self) -> bool {
        crate::note::is_note_cut(self.note)
    }
}
