//! Fill-color parsing.
//!
//! Two spellings are accepted, matching the CLI's historical contract:
//! a `#rrggbb` hex string, or a numeric triplet literal such as
//! `(255, 255, 255)` (parentheses optional).

use std::sync::OnceLock;

use crate::error::BlockerError;

/// An RGB triplet, one byte per channel.
pub type Rgb = [u8; 3];

/// Parse a user-supplied color spec into an RGB triplet.
pub fn parse_color(spec: &str) -> Result<Rgb, BlockerError> {
    let trimmed = spec.trim();
    if let Some(hex_digits) = trimmed.strip_prefix('#') {
        return parse_hex(spec, hex_digits);
    }
    parse_triplet(spec, trimmed)
}

fn parse_hex(spec: &str, digits: &str) -> Result<Rgb, BlockerError> {
    let bytes = hex::decode(digits).map_err(|_| invalid(spec, "expected six hex digits"))?;
    match bytes.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(invalid(spec, "expected exactly three hex byte pairs")),
    }
}

fn parse_triplet(spec: &str, trimmed: &str) -> Result<Rgb, BlockerError> {
    // Compile once for repeated parses.
    static TRIPLET_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = TRIPLET_RE.get_or_init(|| {
        regex::Regex::new(r"^\(?\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)?$").unwrap()
    });

    let captures = re
        .captures(trimmed)
        .ok_or_else(|| invalid(spec, "expected '#rrggbb' or '(r, g, b)'"))?;

    let mut rgb = [0u8; 3];
    for (slot, capture) in rgb.iter_mut().zip(captures.iter().skip(1)) {
        let digits = capture.map(|m| m.as_str()).unwrap_or_default();
        *slot = digits
            .parse::<u8>()
            .map_err(|_| invalid(spec, "channel values must be 0-255"))?;
    }
    Ok(rgb)
}

fn invalid(spec: &str, reason: &str) -> BlockerError {
    BlockerError::InvalidColorSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}
