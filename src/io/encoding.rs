//! Byte decoding for exported CSVs.
//!
//! Exports come from several tools and are not always UTF-8. Candidates are
//! tried in a fixed order and the first that decodes cleanly wins:
//!
//! 1. UTF-8 (a leading BOM is dropped)
//! 2. Latin-1, strict: bytes `0x80..=0x9F` are C1 controls and reject it
//! 3. Windows-1252: the five unassigned bytes (`0x81 0x8D 0x8F 0x90 0x9D`)
//!    reject it

use std::borrow::Cow;
use std::fmt;

use encoding_rs::WINDOWS_1252;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes with no Windows-1252 assignment. `encoding_rs` maps them to C1
/// controls, so they are rejected before decoding.
const CP1252_UNASSIGNED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl Encoding {
    /// Candidates in the order they are tried.
    pub const CHAIN: [Encoding; 3] = [Encoding::Utf8, Encoding::Latin1, Encoding::Windows1252];

    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            Encoding::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    return None;
                }
                Some(encoding_rs::mem::decode_latin1(bytes).into_owned())
            }
            Encoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNASSIGNED.contains(b)) {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(Cow::into_owned)
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Try every candidate in order. On failure, returns the labels tried.
pub fn decode_bytes(bytes: &[u8]) -> Result<(String, Encoding), Vec<String>> {
    for encoding in Encoding::CHAIN {
        if let Some(text) = encoding.decode(bytes) {
            return Ok((text, encoding));
        }
    }
    Err(Encoding::CHAIN.iter().map(|e| e.label().to_string()).collect())
}
