//! Nether-S3M: S3M (Scream Tracker 3) module format parser and playback core
//!
//! This crate provides a pure Rust parser for the Scream Tracker 3 S3M format.
//! It decodes the module header, instrument records with their raw PCM
//! payloads (materialized as normalized floating-point buffers), and the
//! row/channel-compressed pattern streams into dense 32x64 cell grids. It
//! also derives the pitch and timing values a sequenced playback loop needs,
//! while leaving mixing and device output to the caller.
//!
//! # Key Features
//!
//! - **Pure Rust**: No external C/C++ dependencies
//! - **Dense cell grids**: Sparse on-disk patterns decode to full 32x64 grids
//! - **Implied-value reconstruction**: Per-channel note/instrument/volume
//!   memory is resolved at decode time, so every cell is self-contained
//! - **Playback arithmetic**: Note frequency and per-row interval derivation,
//!   plus a lazily-populated per-(instrument, note) PCM cache behind
//!   caller-supplied resampler and audio-sink seams
//!
//! # S3M Format Overview
//!
//! S3M files contain:
//! - A 96-byte header with song metadata (title, counts, tempo, speed)
//! - The pattern play-order list (255 terminates the song)
//! - Parapointer tables locating instruments and patterns (16-byte units)
//! - 80-byte instrument records referencing raw 8/16-bit PCM payloads
//! - Length-prefixed packed pattern streams
//!
//! # Usage
//!
//! ```ignore
//! use nether_s3m::parse_s3m;
//!
//! let data = std::fs::read("song.s3m").unwrap();
//! let module = parse_s3m(&data).unwrap();
//!
//! println!("Song: {}", module.title);
//! println!("Patterns: {}", module.num_patterns);
//! println!("Instruments: {}", module.num_instruments);
//!
//! for order in module.play_order() {
//!     println!("  order -> pattern {}", order);
//! }
//! ```
//!
//! # Format Reference
//!
//! - Scream Tracker 3.01 TECH.DOC
//! - <https://moddingwiki.shikadi.net/wiki/S3M_Format>

mod error;
mod module;
mod note;
mod parser;
mod playback;
mod text;

pub use error::S3mError;
pub use module::{S3mCell, S3mInstrument, S3mModule, S3mPattern, S3mSampleFlags};
pub use note::{NOTE_PERIODS, is_note_cut, note_frequency, row_interval_ns};
pub use parser::{get_instrument_titles, parse_s3m};
pub use playback::{AudioSink, ResampleError, Resampler, SampleCache, Sequencer};
pub use text::{cell_to_text, effect_to_text, note_to_text};

// =============================================================================
// Constants
// =============================================================================

/// Header magic byte at offset 28
pub const S3M_MAGIC1: u8 = 0x1A;

/// Header magic string "SCRM" at offset 44
pub const S3M_MAGIC2: &[u8; 4] = b"SCRM";

/// Instrument record trailing magic "SCRS" (not validated on read)
pub const INSTRUMENT_MAGIC: &[u8; 4] = b"SCRS";

/// On-disk header size in bytes
pub const HEADER_SIZE: usize = 96;

/// On-disk instrument record size in bytes
pub const INSTRUMENT_SIZE: usize = 80;

/// Channels per pattern grid
pub const NUM_CHANNELS: usize = 32;

/// Rows per pattern grid
pub const ROWS_PER_PATTERN: usize = 64;

/// Maximum sample length in frames; longer samples are truncated
pub const MAX_SAMPLE_FRAMES: usize = 64000;

// =============================================================================
// Order Constants
// =============================================================================

/// Order value for "end of song"
pub const ORDER_END: u8 = 255;

// =============================================================================
// Effect Constants
// =============================================================================

/// S3M effect commands for reference (letters map to 1-indexed bytes)
pub mod effects {
    /// Axx - Set speed (ticks per row)
    pub const SET_SPEED: u8 = b'A' - b'@';
    /// Bxx - Jump to order
    pub const ORDER_JUMP: u8 = b'B' - b'@';
    /// Cxx - Break to row in next pattern
    pub const PATTERN_BREAK: u8 = b'C' - b'@';
    /// Dxy - Volume slide
    pub const VOLUME_SLIDE: u8 = b'D' - b'@';
    /// Exx - Pitch slide down
    pub const PORTA_DOWN: u8 = b'E' - b'@';
    /// Fxx - Pitch slide up
    pub const PORTA_UP: u8 = b'F' - b'@';
    /// Gxx - Tone portamento
    pub const TONE_PORTA: u8 = b'G' - b'@';
    /// Hxy - Vibrato
    pub const VIBRATO: u8 = b'H' - b'@';
    /// Ixy - Tremor
    pub const TREMOR: u8 = b'I' - b'@';
    /// Jxy - Arpeggio
    pub const ARPEGGIO: u8 = b'J' - b'@';
    /// Kxy - Vibrato + volume slide
    pub const VIBRATO_VOL_SLIDE: u8 = b'K' - b'@';
    /// Lxy - Tone portamento + volume slide
    pub const TONE_PORTA_VOL_SLIDE: u8 = b'L' - b'@';
    /// Oxx - Sample offset
    pub const SAMPLE_OFFSET: u8 = b'O' - b'@';
    /// Qxy - Retrigger note
    pub const RETRIGGER: u8 = b'Q' - b'@';
    /// Rxy - Tremolo
    pub const TREMOLO: u8 = b'R' - b'@';
    /// Sxy - Extended effects
    pub const EXTENDED: u8 = b'S' - b'@';
    /// Txx - Set tempo (BPM)
    pub const SET_TEMPO: u8 = b'T' - b'@';
    /// Uxy - Fine vibrato
    pub const FINE_VIBRATO: u8 = b'U' - b'@';
    /// Vxx - Set global volume
    pub const SET_GLOBAL_VOLUME: u8 = b'V' - b'@';
    /// Xxx - Set panning
    pub const SET_PANNING: u8 = b'X' - b'@';
}

// =============================================================================
// Tests
// =============================================================================
