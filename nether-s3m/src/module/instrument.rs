//! S3M instrument structures and flags

/// Materialized S3M instrument
///
/// Owns a heap-allocated sample buffer normalized to [-1, 1], decoded from
/// the instrument's raw 8-bit or 16-bit unsigned PCM payload.
#[derive(Debug, Clone)]
pub struct S3mInstrument {
    /// Instrument title (max 28 chars)
    pub title: String,
    /// DOS filename (max 12 chars)
    pub filename: String,
    /// Default volume (0-64), used when a cell sets no volume
    pub default_volume: u8,
    /// Sample rate at which the sample plays back as C-5
    pub c5_freq: u32,
    /// Sample flags
    pub flags: S3mSampleFlags,
    /// Loop begin (in frames; unused by playback here)
    pub loop_begin: u32,
    /// Loop end (in frames; unused by playback here)
    pub loop_end: u32,
    /// Normalized sample data, at most [`crate::MAX_SAMPLE_FRAMES`] frames
    pub sample: Vec<f32>,
}

impl Default for S3mInstrument {
    fn default() -> Self {
        Self {
            title: String::new(),
            filename: String::new(),
            default_volume: 64,
            c5_freq: 8363, // Amiga reference rate
            flags: S3mSampleFlags::empty(),
            loop_begin: 0,
            loop_end: 0,
            sample: Vec::new(),
        }
    }
}

impl S3mInstrument {
    /// Sample length in frames
    #[inline]
    pub fn sample_length(&self) -> usize {
        self.sample.len()
    }

    /// Check if the on-disk sample was 16-bit (vs 8-bit)
    #[inline]
    pub fn is_16bit(&self) -> bool {
        self.flags.contains(S3mSampleFlags::SAMPLE_16BIT)
    }

    /// Check if the sample declares a loop
    #[inline]
    pub fn has_loop(&self) -> bool {
        self.flags.contains(S3mSampleFlags::LOOP)
    }
}

/// S3M instrument flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S3mSampleFlags(u8);

impl S3mSampleFlags {
    /// Loop enabled
    pub const LOOP: Self = Self(0x01);
    /// Stereo sample
    pub const STEREO: Self = Self(0x02);
    /// 16-bit sample (vs 8-bit)
    pub const SAMPLE_16BIT: Self = Self(0x04);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for S3mSampleFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
