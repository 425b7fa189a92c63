//! Parser tests over synthetic module images

use crate::error::S3mError;
use crate::{HEADER_SIZE, MAX_SAMPLE_FRAMES, get_instrument_titles, parse_s3m};

/// Instrument description for [`ImageBuilder`]
struct InstrumentSpec {
    title: &'static str,
    default_volume: u8,
    c5_freq: u32,
    flags: u8,
    /// Declared on-disk length (may exceed the payload for truncation tests)
    length: u32,
    payload: Vec<u8>,
    /// Override the memseg pointer (16-byte units); None places the payload
    bad_memseg: Option<u16>,
}

impl InstrumentSpec {
    fn pcm8(payload: Vec<u8>) -> Self {
        Self {
            title: "test sample",
            default_volume: 64,
            c5_freq: 8363,
            flags: 0,
            length: payload.len() as u32,
            payload,
            bad_memseg: None,
        }
    }

    fn pcm16(payload: Vec<u8>) -> Self {
        Self {
            length: payload.len() as u32 / 2,
            flags: 4,
            ..Self::pcm8(payload)
        }
    }
}

/// Builds a complete synthetic S3M byte image: header, order list,
/// parapointer tables, 16-byte-aligned instrument records, sample payloads
/// and pattern streams.
struct ImageBuilder {
    orders: Vec<u8>,
    instruments: Vec<InstrumentSpec>,
    /// Packed streams (without the length prefix); None = zero parapointer
    patterns: Vec<Option<Vec<u8>>>,
}

impl ImageBuilder {
    fn new() -> Self {
        Self {
            orders: vec![0, 255],
            instruments: Vec::new(),
            patterns: Vec::new(),
        }
    }

    fn orders(mut self, orders: &[u8]) -> Self {
        self.orders = orders.to_vec();
        self
    }

    fn instrument(mut self, spec: InstrumentSpec) -> Self {
        self.instruments.push(spec);
        self
    }

    fn pattern(mut self, stream: &[u8]) -> Self {
        self.patterns.push(Some(stream.to_vec()));
        self
    }

    fn missing_pattern(mut self) -> Self {
        self.patterns.push(None);
        self
    }

    fn build(self) -> Vec<u8> {
        let mut image = Vec::new();

        // ---- 96-byte header ----
        let mut title = [0u8; 28];
        title[..4].copy_from_slice(b"TEST");
        image.extend_from_slice(&title);
        image.push(0x1A); // magic1
        image.push(16); // type
        image.extend_from_slice(&[0; 2]);
        image.extend_from_slice(&(self.orders.len() as u16).to_le_bytes());
        image.extend_from_slice(&(self.instruments.len() as u16).to_le_bytes());
        image.extend_from_slice(&(self.patterns.len() as u16).to_le_bytes());
        image.extend_from_slice(&[0; 6]); // old flags + versions
        image.extend_from_slice(b"SCRM"); // magic2
        image.push(64); // global volume
        image.push(6); // initial speed
        image.push(125); // initial tempo
        image.push(48); // master volume
        image.extend_from_slice(&[0; 10]);
        image.extend_from_slice(&[0; 2]); // special
        image.extend_from_slice(&[0; 32]); // channel settings
        assert_eq!(image.len(), HEADER_SIZE);

        // ---- order list + parapointer table placeholders ----
        image.extend_from_slice(&self.orders);
        let instrument_table = image.len();
        image.extend_from_slice(&vec![0; self.instruments.len() * 2]);
        let pattern_table = image.len();
        image.extend_from_slice(&vec![0; self.patterns.len() * 2]);

        // ---- instrument records ----
        let mut instrument_pps = Vec::new();
        let mut payload_slots = Vec::new();
        for spec in &self.instruments {
            align16(&mut image);
            instrument_pps.push((image.len() / 16) as u16);

            image.push(1); // type: PCM
            image.extend_from_slice(&[0u8; 12]); // filename
            payload_slots.push(image.len()); // memseg patched later
            image.extend_from_slice(&[0u8; 3]);
            image.extend_from_slice(&spec.length.to_le_bytes());
            image.extend_from_slice(&0u32.to_le_bytes()); // loop begin
            image.extend_from_slice(&0u32.to_le_bytes()); // loop end
            image.push(spec.default_volume);
            image.push(0); // unused
            image.push(0); // pack
            image.push(spec.flags);
            image.extend_from_slice(&spec.c5_freq.to_le_bytes());
            image.extend_from_slice(&[0u8; 12]);
            let mut ititle = [0u8; 28];
            let n = spec.title.len().min(28);
            ititle[..n].copy_from_slice(&spec.title.as_bytes()[..n]);
            image.extend_from_slice(&ititle);
            image.extend_from_slice(b"SCRS");
        }

        // ---- sample payloads ----
        for (spec, &slot) in self.instruments.iter().zip(&payload_slots) {
            align16(&mut image);
            let memseg = match spec.bad_memseg {
                Some(pp) => pp,
                None => (image.len() / 16) as u16,
            };
            image[slot + 1..slot + 3].copy_from_slice(&memseg.to_le_bytes());
            image.extend_from_slice(&spec.payload);
        }

        // ---- pattern streams ----
        let mut pattern_pps = Vec::new();
        for pattern in &self.patterns {
            let Some(stream) = pattern else {
                pattern_pps.push(0u16);
                continue;
            };
            align16(&mut image);
            pattern_pps.push((image.len() / 16) as u16);
            image.extend_from_slice(&(stream.len() as u16).to_le_bytes());
            image.extend_from_slice(stream);
        }

        // ---- patch parapointer tables ----
        for (i, pp) in instrument_pps.iter().enumerate() {
            image[instrument_table + i * 2..instrument_table + i * 2 + 2]
                .copy_from_slice(&pp.to_le_bytes());
        }
        for (i, pp) in pattern_pps.iter().enumerate() {
            image[pattern_table + i * 2..pattern_table + i * 2 + 2]
                .copy_from_slice(&pp.to_le_bytes());
        }

        image
    }
}

fn align16(image: &mut Vec<u8>) {
    while image.len() % 16 != 0 {
        image.push(0);
    }
}

// =============================================================================
// Header and structure
// =============================================================================

#[test]
fn test_parse_minimal_module() {
    let data = ImageBuilder::new().build();
    let module = parse_s3m(&data).unwrap();

    assert_eq!(module.title, "TEST");
    assert_eq!(module.num_orders, 2);
    assert_eq!(module.num_instruments, 0);
    assert_eq!(module.num_patterns, 0);
    assert_eq!(module.global_volume, 64);
    assert_eq!(module.initial_speed, 6);
    assert_eq!(module.initial_tempo, 125);
    assert_eq!(module.master_volume, 48);
    assert_eq!(module.tempo, 125.0);
    assert_eq!(module.speed, 6.0);
}

#[test]
fn test_reject_too_small() {
    assert!(matches!(parse_s3m(&[0u8; 40]), Err(S3mError::TooSmall)));
}

#[test]
fn test_reject_any_mutated_magic_byte() {
    let data = ImageBuilder::new().build();
    assert!(parse_s3m(&data).is_ok());

    // Magic1 at 28, "SCRM" at 44..48; flipping any single byte must reject
    for position in [28, 44, 45, 46, 47] {
        let mut mutated = data.clone();
        mutated[position] ^= 0xFF;
        assert!(
            matches!(parse_s3m(&mutated), Err(S3mError::InvalidMagic)),
            "mutation at byte {} was not rejected",
            position
        );
    }
}

#[test]
fn test_order_list_terminates_at_sentinel() {
    let data = ImageBuilder::new().orders(&[0, 1, 255, 3]).build();
    let module = parse_s3m(&data).unwrap();

    let visited: Vec<u8> = module.play_order().collect();
    assert_eq!(visited, vec![0, 1]);
    assert_eq!(module.orders.len(), 4);
}

#[test]
fn test_zero_parapointer_is_absent_pattern() {
    let data = ImageBuilder::new()
        .missing_pattern()
        .pattern(&[0; 64])
        .build();
    let module = parse_s3m(&data).unwrap();

    assert_eq!(module.patterns.len(), 2);
    assert!(module.patterns[0].is_none());
    assert!(module.patterns[1].is_some());
}

// =============================================================================
// Pattern decoding
// =============================================================================

#[test]
fn test_decode_fully_explicit_cell() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32 | 64 | 128, // channel 0, note+instrument, volume, effect
            0x42,
            1,
            32,
            20, // Txx
            0x78,
            0, // end of row
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    let cell = pattern.cell(0, 0);
    assert_eq!(cell.raw, 32 | 64 | 128);
    assert_eq!(cell.note, 0x42);
    assert_eq!(cell.instrument, 1);
    assert_eq!(cell.volume, 32);
    assert_eq!(cell.effect, 20);
    assert_eq!(cell.effect_param, 0x78);
}

#[test]
fn test_row_advances_only_on_terminator() {
    // Two channels written within one row, then the terminator
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32, // channel 0
            0x20,
            1,
            32 | 5, // channel 5, same row
            0x30,
            1,
            0, // end of row 0
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    assert_eq!(pattern.cell(0, 0).note, 0x20);
    assert_eq!(pattern.cell(5, 0).note, 0x30);
    assert!(pattern.cell(5, 1).is_empty());
}

#[test]
fn test_inherit_note_and_instrument_from_previous_row() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            default_volume: 33,
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .pattern(&[
            32 | 1, // channel 1: explicit note + instrument
            0x42,
            1,
            0, // end of row 0
            1, // channel 1 again, no fields: everything inherits
            0, // end of row 1
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    let inherited = pattern.cell(1, 1);
    assert_eq!(inherited.note, 0x42);
    assert_eq!(inherited.instrument, 1);
    // No explicit volume was ever set, so the instrument default applies
    assert_eq!(inherited.volume, 33);
}

#[test]
fn test_channel_state_isolation() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32, // channel 0 row 0
            0x20,
            1,
            32 | 1, // channel 1 row 0
            0x30,
            1,
            0,  // end of row 0
            32, // channel 0 row 1
            0x25,
            1,
            0, // end of row 1
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    assert_eq!(pattern.cell(0, 1).note, 0x25);
    // Channel 1 was not written on row 1; its cell stays fully empty and
    // never inherits channel 0's state
    assert!(pattern.cell(1, 1).is_empty());
    assert_eq!(pattern.cell(1, 1).note, 0);
}

#[test]
fn test_instrument_change_resets_volume_memory() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            default_volume: 33,
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .instrument(InstrumentSpec {
            default_volume: 55,
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .pattern(&[
            32 | 64 | 2, // channel 2: note + instrument 1, explicit volume 40
            0x20,
            1,
            40,
            0,      // end of row 0
            32 | 2, // channel 2: new instrument 2, no volume byte
            0x20,
            2,
            0, // end of row 1
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    assert_eq!(pattern.cell(2, 0).volume, 40);
    // The fresh instrument forgot the remembered 40; the cell takes
    // instrument 2's default volume instead
    assert_eq!(pattern.cell(2, 1).volume, 55);
}

#[test]
fn test_volume_above_64_clamps_to_unset() {
    let data = ImageBuilder::new()
        .pattern(&[
            64, // channel 0: explicit volume only
            200,
            0,
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    let cell = pattern.cell(0, 0);
    assert!(!cell.is_empty());
    assert_eq!(cell.volume, 0);
}

#[test]
fn test_out_of_range_volume_falls_back_to_instrument_default() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            default_volume: 33,
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .pattern(&[
            32 | 64, // channel 0: note + instrument + bad volume
            0x20,
            1,
            200,
            0,
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    // The clamped-away volume recovers through the instrument default
    let cell = module.patterns[0].as_ref().unwrap().cell(0, 0);
    assert_eq!(cell.instrument, 1);
    assert_eq!(cell.volume, 33);
}

#[test]
fn test_explicit_volume_inherited_on_later_row() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32 | 64, // channel 0: note + instrument + volume
            0x20,
            1,
            40,
            0,
            32, // channel 0: new note, same instrument field zero, no volume
            0x25,
            0,
            0,
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    let cell = pattern.cell(0, 1);
    assert_eq!(cell.note, 0x25);
    // Present-but-zero instrument inherits, and so does the volume memory
    assert_eq!(cell.instrument, 1);
    assert_eq!(cell.volume, 40);
}

#[test]
fn test_note_255_normalizes_to_none() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32, // channel 0
            255,
            1,
            0,
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    assert_eq!(pattern.cell(0, 0).note, 0);
}

#[test]
fn test_note_cut_marker_round_trips() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![128; 16]))
        .pattern(&[
            32, // channel 0
            0xF0,
            1,
            0,
        ])
        .build();
    let module = parse_s3m(&data).unwrap();

    let pattern = module.patterns[0].as_ref().unwrap();
    let cell = pattern.cell(0, 0);
    assert_eq!(cell.note, 0xF0);
    assert!(cell.is_note_cut());
}

// =============================================================================
// Instrument materialization
// =============================================================================

#[test]
fn test_instrument_fields() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            title: "lead synth",
            default_volume: 50,
            c5_freq: 22050,
            ..InstrumentSpec::pcm8(vec![128; 32])
        })
        .build();
    let module = parse_s3m(&data).unwrap();

    let instr = &module.instruments[0];
    assert_eq!(instr.title, "lead synth");
    assert_eq!(instr.default_volume, 50);
    assert_eq!(instr.c5_freq, 22050);
    assert!(!instr.is_16bit());
    assert_eq!(instr.sample_length(), 32);
}

#[test]
fn test_instrument_title_listing() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            title: "lead synth",
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .instrument(InstrumentSpec {
            title: "bass drum",
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .build();

    let titles = get_instrument_titles(&data).unwrap();
    assert_eq!(titles, vec!["lead synth", "bass drum"]);
}

#[test]
fn test_sample_normalization_8bit() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm8(vec![0, 255, 128]))
        .build();
    let module = parse_s3m(&data).unwrap();

    let sample = &module.instruments[0].sample;
    assert_eq!(sample[0], -1.0);
    assert_eq!(sample[1], 0.9921875);
    assert_eq!(sample[2], 0.0);
    assert!(sample.iter().all(|&s| (-1.0..=1.0).contains(&s)));
}

#[test]
fn test_sample_normalization_16bit() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&65535u16.to_le_bytes());
    payload.extend_from_slice(&32768u16.to_le_bytes());

    let data = ImageBuilder::new()
        .instrument(InstrumentSpec::pcm16(payload))
        .build();
    let module = parse_s3m(&data).unwrap();

    let instr = &module.instruments[0];
    assert!(instr.is_16bit());
    assert_eq!(instr.sample[0], -0.5);
    assert_eq!(instr.sample[1], 0.49998474121093750);
    assert_eq!(instr.sample[2], 0.0);
}

#[test]
fn test_oversized_sample_truncates_to_cap() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            length: 70000,
            ..InstrumentSpec::pcm8(vec![128; 70000])
        })
        .build();
    let module = parse_s3m(&data).unwrap();

    // Truncated, not rejected
    assert_eq!(module.instruments[0].sample_length(), MAX_SAMPLE_FRAMES);
}

#[test]
fn test_sample_payload_out_of_bounds() {
    let data = ImageBuilder::new()
        .instrument(InstrumentSpec {
            bad_memseg: Some(0xFFFF),
            ..InstrumentSpec::pcm8(vec![128; 16])
        })
        .build();

    assert!(matches!(
        parse_s3m(&data),
        Err(S3mError::InvalidSampleOffset(_))
    ));
}
