//! Playback support: resample-ratio derivation, per-note PCM cache, and the
//! row sequencing seam toward an audio backend.
//!
//! The core never mixes or outputs audio. It derives, per (instrument, note)
//! pair, the ratio a resampling service needs to shift the instrument's
//! sample buffer to the output rate, quantizes the result to PCM once, and
//! hands buffers to an [`AudioSink`] as rows fire.

use hashbrown::HashMap;
use thiserror::Error;

use crate::effects;
use crate::module::{S3mCell, S3mModule};
use crate::note::note_frequency;
use crate::{NUM_CHANNELS, ROWS_PER_PATTERN};

/// Error reported by a resampling service
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ResampleError(pub String);

/// Sample-rate conversion service
///
/// Receives a normalized mono float buffer and the conversion ratio
/// (output rate over note frequency), and produces `output_frames` frames at
/// the output rate.
pub trait Resampler {
    fn resample(
        &self,
        input: &[f32],
        output_frames: usize,
        ratio: f64,
    ) -> Result<Vec<f32>, ResampleError>;
}

/// Audio output backend: one voice per pattern channel
pub trait AudioSink {
    /// Start playing a PCM buffer on a channel at the given volume (0-64)
    fn play(&mut self, channel: usize, pcm: &[i16], volume: u8);
    /// Silence a channel
    fn halt(&mut self, channel: usize);
}

/// Lazily-populated PCM cache keyed by (instrument index, packed note byte)
///
/// Each slot is produced at most once for the lifetime of the module; a
/// failed conversion leaves the slot unpopulated so the same key can be
/// retried and other notes keep playing. There is no eviction.
pub struct SampleCache {
    output_rate: u32,
    entries: HashMap<(u8, u8), Vec<i16>>,
}

impl SampleCache {
    /// Create an empty cache targeting the given output sample rate
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate,
            entries: HashMap::new(),
        }
    }

    /// Resample ratio for a note played on an instrument tuned to `c5_freq`
    pub fn ratio(&self, c5_freq: u32, note: u8) -> f64 {
        self.output_rate as f64 / note_frequency(note, c5_freq)
    }

    /// Number of populated cache slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch (or produce) the fixed-rate PCM for an (instrument, note) pair.
    ///
    /// `instrument` is the 0-based instrument index. Returns `None` when the
    /// instrument does not exist or the resampling service fails; the failure
    /// is logged and absorbed so playback of other channels continues.
    pub fn pcm_for(
        &mut self,
        module: &S3mModule,
        resampler: &dyn Resampler,
        instrument: u8,
        note: u8,
    ) -> Option<&[i16]> {
        let key = (instrument, note);

        if !self.entries.contains_key(&key) {
            let instr = module.instruments.get(instrument as usize)?;
            let ratio = self.ratio(instr.c5_freq, note);

            let input_frames = instr.sample.len();
            let output_frames = (input_frames as f64 * ratio).ceil() as usize;
            // The trailing partial frame is dropped from the emitted PCM
            let kept_frames = (input_frames as f64 * ratio).floor() as usize;

            let floats = match resampler.resample(&instr.sample, output_frames, ratio) {
                Ok(f) => f,
                Err(e) => {
                    log::warn!(
                        "Unable to convert sample '{}': {}. Ratio: {}",
                        instr.title,
                        e,
                        ratio
                    );
                    return None;
                }
            };

            // Halve the signal before quantizing; two simultaneous voices at
            // full scale must not clip the mix
            let pcm: Vec<i16> = floats
                .iter()
                .take(kept_frames)
                .map(|&s| (s * 0.5 * 32767.0) as i16)
                .collect();

            self.entries.insert(key, pcm);
        }

        self.entries.get(&key).map(Vec::as_slice)
    }
}

/// Drives pattern rows through an audio sink.
///
/// Owns the module and the PCM cache. The playback loop around it decides
/// when rows fire, sleeping for [`Sequencer::row_interval_ns`] between them;
/// the interval changes when a row carries a Txx tempo effect, the single
/// effect this core interprets.
pub struct Sequencer<R: Resampler> {
    module: S3mModule,
    cache: SampleCache,
    resampler: R,
}

impl<R: Resampler> Sequencer<R> {
    pub fn new(module: S3mModule, resampler: R, output_rate: u32) -> Self {
        Self {
            module,
            cache: SampleCache::new(output_rate),
            resampler,
        }
    }

    pub fn module(&self) -> &S3mModule {
        &self.module
    }

    pub fn cache(&self) -> &SampleCache {
        &self.cache
    }

    /// Nanoseconds to hold the current row before the next one fires
    pub fn row_interval_ns(&self) -> u64 {
        self.module.row_interval_ns()
    }

    /// Trigger every populated cell of one pattern row through the sink and
    /// return the interval to hold before the next row.
    ///
    /// Absent patterns and out-of-range pattern or row indices are silent
    /// no-ops.
    pub fn play_row(&mut self, sink: &mut dyn AudioSink, pattern: usize, row: usize) -> u64 {
        if row >= ROWS_PER_PATTERN {
            return self.module.row_interval_ns();
        }

        let cells: Option<[S3mCell; NUM_CHANNELS]> = self
            .module
            .patterns
            .get(pattern)
            .and_then(Option::as_ref)
            .map(|p| std::array::from_fn(|channel| *p.cell(channel, row)));

        if let Some(cells) = cells {
            for (channel, cell) in cells.iter().enumerate() {
                if !cell.is_empty() && cell.has_instrument() {
                    self.trigger(sink, channel, cell);
                }

                if cell.effect == effects::SET_TEMPO && cell.effect_param != 0 {
                    self.module.tempo = cell.effect_param as f64;
                }
            }
        }

        self.module.row_interval_ns()
    }

    fn trigger(&mut self, sink: &mut dyn AudioSink, channel: usize, cell: &S3mCell) {
        if cell.is_note_cut() {
            sink.halt(channel);
            return;
        }

        // Cells store 1-based instrument numbers
        let instrument = cell.instrument - 1;
        if let Some(pcm) = self
            .cache
            .pcm_for(&self.module, &self.resampler, instrument, cell.note)
        {
            sink.play(channel, pcm, cell.volume);
        }
    }
}
