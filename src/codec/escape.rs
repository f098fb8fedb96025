// src/codec/escape.rs
//
// C-style escape view.
//
// Receive side renders control characters as `\n`, `\r`, ... or `\xHH`.
// Transmit side understands the single-letter mnemonics only; `\xHH` is an
// output-only form and is sent literally when typed.

use std::fmt::Write as _;

// ============================================================================
// Escape Table
// ============================================================================

/// Fixed mapping between control bytes and their escape mnemonics
pub struct EscapeTable;

impl EscapeTable {
    pub const ENTRIES: [(u8, char); 9] = [
        (0x00, '0'),
        (0x07, 'a'),
        (0x08, 'b'),
        (0x09, 't'),
        (0x0A, 'n'),
        (0x0B, 'v'),
        (0x0C, 'f'),
        (0x0D, 'r'),
        (0x5C, '\\'),
    ];

    /// Mnemonic letter for a byte, if it has one.
    pub fn mnemonic(byte: u8) -> Option<char> {
        Self::ENTRIES
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, m)| *m)
    }

    /// Byte denoted by a mnemonic letter, if it is one.
    pub fn control(mnemonic: char) -> Option<u8> {
        Self::ENTRIES
            .iter()
            .find(|(_, m)| *m == mnemonic)
            .map(|(b, _)| *b)
    }
}

// ============================================================================
// Encode / Decode
// ============================================================================

/// Render received bytes with control characters escaped.
///
/// The bytes are read as UTF-8 first (best effort), then every character
/// below 0x20 becomes `\<mnemonic>` or `\xHH`. Everything else, backslash
/// included, is copied unchanged.
pub fn encode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len() + 8);

    for c in text.chars() {
        if (c as u32) < 0x20 {
            let byte = c as u8;
            match EscapeTable::mnemonic(byte) {
                Some(m) => {
                    out.push('\\');
                    out.push(m);
                }
                None => {
                    let _ = write!(out, "\\x{:02X}", byte);
                }
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Normal,
    AfterBackslash,
}

/// Expand mnemonic escapes in composed text into the bytes to send.
///
/// An unknown escape is kept literally (`\q` stays `\q`), and a backslash at
/// the very end of the input is sent as-is.
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Normal;

    for c in text.chars() {
        match state {
            State::Normal => {
                if c == '\\' {
                    state = State::AfterBackslash;
                } else {
                    out.push(c);
                }
            }
            State::AfterBackslash => {
                match EscapeTable::control(c) {
                    Some(byte) => out.push(byte as char),
                    None => {
                        out.push('\\');
                        out.push(c);
                    }
                }
                state = State::Normal;
            }
        }
    }

    if state == State::AfterBackslash {
        out.push('\\');
    }

    out.into_bytes()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_a_bijection() {
        let bytes: HashSet<u8> = EscapeTable::ENTRIES.iter().map(|(b, _)| *b).collect();
        let letters: HashSet<char> = EscapeTable::ENTRIES.iter().map(|(_, m)| *m).collect();
        assert_eq!(bytes.len(), EscapeTable::ENTRIES.len());
        assert_eq!(letters.len(), EscapeTable::ENTRIES.len());

        for (byte, letter) in EscapeTable::ENTRIES {
            assert_eq!(EscapeTable::mnemonic(byte), Some(letter));
            assert_eq!(EscapeTable::control(letter), Some(byte));
        }
        assert_eq!(EscapeTable::mnemonic(0x1B), None);
        assert_eq!(EscapeTable::control('x'), None);
    }

    #[test]
    fn test_encode_mnemonics_hex_and_passthrough() {
        assert_eq!(encode(&[0x00, 0x07, 0x1F, 0x41]), "\\0\\a\\x1FA");
    }

    #[test]
    fn test_encode_unmapped_controls_use_uppercase_hex() {
        assert_eq!(encode(&[0x1B, b'[', b'0', b'm']), "\\x1B[0m");
        assert_eq!(encode(&[0x01, 0x0E]), "\\x01\\x0E");
    }

    #[test]
    fn test_encode_leaves_backslash_and_high_text_alone() {
        assert_eq!(encode(b"a\\b"), "a\\b");
        assert_eq!(encode("µs\t".as_bytes()), "µs\\t");
        assert_eq!(encode(&[0x7F]), "\u{7F}");
    }

    #[test]
    fn test_decode_mnemonic_unknown_and_backslash() {
        assert_eq!(decode("\\n\\x\\\\"), vec![0x0A, 0x5C, 0x78, 0x5C]);
    }

    #[test]
    fn test_decode_trailing_backslash() {
        assert_eq!(decode("AT\\"), b"AT\\".to_vec());
        assert_eq!(decode("\\"), vec![0x5C]);
    }

    #[test]
    fn test_decode_does_not_unescape_hex_form() {
        assert_eq!(decode("\\x41"), b"\\x41".to_vec());
    }

    #[test]
    fn test_decode_crlf_command() {
        assert_eq!(decode("AT+GMR\\r\\n"), b"AT+GMR\r\n".to_vec());
    }

    #[test]
    fn test_roundtrip_for_printable_and_mapped_controls() {
        let samples: [&[u8]; 4] = [
            b"hello world",
            &[0x00, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D],
            b"line one\r\nline two\r\n",
            b"\ttabbed\x0bvertical\x0cfeed\x00",
        ];
        for sample in samples {
            assert_eq!(decode(&encode(sample)), sample.to_vec());
        }
    }

    #[test]
    fn test_unmapped_control_does_not_roundtrip() {
        // \xHH is encode-only
        assert_eq!(decode(&encode(&[0x1F])), b"\\x1F".to_vec());
    }
}
