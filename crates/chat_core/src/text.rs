//! Decoding and previewing text attachments.

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Characters shown in an attachment chip
pub const PREVIEW_CHARS: usize = 120;

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Decode raw file bytes: UTF-8 (with or without BOM), UTF-16 when a BOM says
/// so, otherwise Latin-1. Never fails.
pub fn decode_text(raw: &[u8]) -> String {
    let decoded = raw
        .strip_prefix(&UTF8_BOM)
        .and_then(|rest| std::str::from_utf8(rest).ok().map(str::to_owned))
        .or_else(|| {
            raw.strip_prefix(&UTF16_LE_BOM)
                .and_then(|rest| decode_utf16(rest, u16::from_le_bytes))
        })
        .or_else(|| {
            raw.strip_prefix(&UTF16_BE_BOM)
                .and_then(|rest| decode_utf16(rest, u16::from_be_bytes))
        })
        .or_else(|| std::str::from_utf8(raw).ok().map(str::to_owned))
        .unwrap_or_else(|| raw.iter().map(|&b| char::from(b)).collect());

    decoded.replace('\u{feff}', "")
}

/// Length as compared against a character budget
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First [`PREVIEW_CHARS`] characters with whitespace runs collapsed.
pub fn preview_snippet(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    head.split_whitespace().collect::<Vec<_>>().join(" ")
}
