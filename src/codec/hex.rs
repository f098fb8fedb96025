// src/codec/hex.rs
//
// Hex view: `01 A0 FF ` on the way out, tolerant digit scanning on the way in.

/// Render each byte as two uppercase hex digits followed by a space.
/// The trailing space is part of the canonical form.
pub fn encode(bytes: &[u8]) -> String {
    let digits = ::hex::encode_upper(bytes);
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, c) in digits.chars().enumerate() {
        out.push(c);
        if i % 2 == 1 {
            out.push(' ');
        }
    }
    out
}

/// Tolerant hex parse.
///
/// Any character outside `[0-9A-Fa-f]` separates runs of digits and is dropped.
/// Digits within a run are paired into bytes; an odd digit left at the end of
/// a run becomes a byte of its own (`"ABC"` -> `AB 0C`). Never fails.
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() / 2 + 1);
    let mut high: Option<u8> = None;

    for c in text.chars() {
        match c.to_digit(16) {
            Some(nibble) => {
                let nibble = nibble as u8;
                match high.take() {
                    Some(h) => out.push((h << 4) | nibble),
                    None => high = Some(nibble),
                }
            }
            None => {
                // Separator closes the run; a dangling nibble stands alone
                if let Some(h) = high.take() {
                    out.push(h);
                }
            }
        }
    }

    if let Some(h) = high {
        out.push(h);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
