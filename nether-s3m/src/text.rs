//! Fixed-width text rendering for notes, effects and cells
//!
//! Debug/visualization aid: each form has a constant width so rows line up
//! when printed in columns.

use crate::module::S3mCell;
use crate::note::is_note_cut;

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Render a packed note byte as a 3-character name ("C-4"; "^^ " for cut)
pub fn note_to_text(note: u8) -> String {
    if is_note_cut(note) {
        "^^ ".to_string()
    } else {
        let name = NOTE_NAMES[(note & 0x0F) as usize % NOTE_NAMES.len()];
        format!("{}{}", name, (note >> 4) + 1)
    }
}

/// Render an effect as a 3-character command ("---" when absent)
///
/// Effect bytes are 1-indexed letters (A=1), the parameter prints as two hex
/// digits.
pub fn effect_to_text(effect: u8, param: u8) -> String {
    if effect == 0 {
        "---".to_string()
    } else {
        format!("{}{:02X}", (b'A' + effect - 1) as char, param)
    }
}

/// Render a cell as a 13-character column: note, instrument, volume, effect
pub fn cell_to_text(cell: &S3mCell) -> String {
    if cell.is_empty() {
        return "--- -- -- ---".to_string();
    }

    format!(
        "{} {:02}v{:02} {}",
        note_to_text(cell.note),
        cell.instrument,
        cell.volume,
        effect_to_text(cell.effect, cell.effect_param)
    )
}
