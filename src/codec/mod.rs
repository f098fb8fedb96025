// src/codec/mod.rs
//
// Transcoding between raw port bytes and the three textual views.
//
// Each direction has its own CodecMode:
// - RX: bytes read from the port are `encode`d into display text
// - TX: text composed by the user is `decode`d into bytes to write
//
// All functions here are pure. Malformed input never produces an error; it
// degrades according to the rules in hex.rs and escape.rs.

pub mod escape;
pub mod hex;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use escape::EscapeTable;

// ============================================================================
// Types
// ============================================================================

/// Textual representation used for one traffic direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecMode {
    #[default]
    PlainText,
    Hex,
    Escape,
}

impl CodecMode {
    pub const ALL: [CodecMode; 3] = [CodecMode::PlainText, CodecMode::Hex, CodecMode::Escape];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodecMode::PlainText => "text",
            CodecMode::Hex => "hex",
            CodecMode::Escape => "escape",
        }
    }
}

impl fmt::Display for CodecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" | "plaintext" | "plain_text" => Ok(CodecMode::PlainText),
            "hex" => Ok(CodecMode::Hex),
            "escape" | "esc" => Ok(CodecMode::Escape),
            other => Err(format!("Unknown codec mode '{}' (expected text, hex or escape)", other)),
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Render received bytes as display text.
pub fn encode(bytes: &[u8], mode: CodecMode) -> String {
    match mode {
        CodecMode::PlainText => String::from_utf8_lossy(bytes).into_owned(),
        CodecMode::Hex => hex::encode(bytes),
        CodecMode::Escape => escape::encode(bytes),
    }
}

/// Turn composed text into the bytes to put on the wire.
pub fn decode(text: &str, mode: CodecMode) -> Vec<u8> {
    match mode {
        CodecMode::PlainText => text.as_bytes().to_vec(),
        CodecMode::Hex => hex::decode(text),
        CodecMode::Escape => escape::decode(text),
    }
}

// ============================================================================
// Tests
// ============================================================================
