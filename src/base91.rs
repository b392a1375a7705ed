//! APRS base-91 numeric decoding.
//!
//! Fixed-width strings of printable characters encode integers as
//! `value = value * 91 + (byte - 33)` per digit (APRS 1.0.1 page 55).
//! Used by compressed positions, compression-type extension data, and
//! Mic-E altitude.

/// Decode a fixed-width base-91 digit string.
///
/// Digit range is deliberately not validated: characters below `!` yield
/// negative digit values and characters above `}` overshoot, matching how
/// real-world decoders treat the field. Callers that care about range
/// check the decoded value.
pub fn decode(digits: &str) -> i64 {
    let mut value: i64 = 0;
    for ch in digits.chars() {
        value = value * 91 + (ch as i64 - 33);
    }
    value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
