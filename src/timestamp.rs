//! APRS DHM/HMS timestamp resolution.
//!
//! A 7-character field: six digits plus a kind byte.
//! - `z`: day/hour/minute, UTC calendar taken from the receive time
//! - `h`: hour/minute/second, UTC calendar day taken from the receive time
//! - `/`: day/hour/minute, **host-local** calendar taken from the receive time
//!
//! The `/` kind using the local calendar while the others use UTC is almost
//! certainly a protocol-history accident, but it is what deployed decoders
//! do, so it is preserved here rather than fixed.
//!
//! No rollover correction: a day number from late last month still resolves
//! into the receive month, and may land out of range (day 31 in a 30-day
//! month), which is reported as an error.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::types::{DecodeError, Fact};

/// Split a fractional unix time into whole seconds and nanoseconds.
fn split_unix(time: f64) -> (i64, u32) {
    let secs = time.floor();
    let nanos = ((time - secs) * 1e9).round() as u32;
    (secs as i64, nanos.min(999_999_999))
}

/// Decode a 7-character timestamp field against the receive-time anchor.
///
/// Appends a `Timestamp` fact on success, an error otherwise. Never both.
pub fn decode_timestamp(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    field: &str,
    receive_time: f64,
) {
    let chars: Vec<char> = field.chars().collect();
    if chars.len() != 7 || !chars[..6].iter().all(|c| c.is_ascii_digit()) {
        errors.push(DecodeError::TimestampMalformed);
        return;
    }
    let kind = chars[6];
    if kind != 'z' && kind != 'h' && kind != '/' {
        errors.push(DecodeError::TimestampMalformed);
        return;
    }

    let two = |i: usize| -> u32 {
        chars[i].to_digit(10).unwrap_or(0) * 10 + chars[i + 1].to_digit(10).unwrap_or(0)
    };
    let (n1, n2, n3) = (two(0), two(2), two(4));

    let (secs, nanos) = split_unix(receive_time);
    let resolved: Option<NaiveDateTime> = match kind {
        'h' => DateTime::<Utc>::from_timestamp(secs, nanos)
            .and_then(|t| t.with_hour(n1))
            .and_then(|t| t.with_minute(n2))
            .and_then(|t| t.with_second(n3))
            .and_then(|t| t.with_nanosecond(0))
            .map(|t| t.naive_utc()),
        'z' => DateTime::<Utc>::from_timestamp(secs, nanos)
            .and_then(|t| replace_dhm(t, n1, n2, n3))
            .map(|t| t.naive_utc()),
        _ => Local
            .timestamp_opt(secs, nanos)
            .single()
            .and_then(|t| replace_dhm(t, n1, n2, n3))
            .map(|t| t.naive_local()),
    };

    match resolved {
        Some(time) => facts.push(Fact::Timestamp { time }),
        None => errors.push(DecodeError::TimestampOutOfRange),
    }
}

/// Replace day/hour/minute on the anchor, zeroing seconds and subseconds.
fn replace_dhm<Tz: TimeZone>(
    anchor: DateTime<Tz>,
    day: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Tz>> {
    use chrono::Datelike;
    anchor
        .with_day(day)?
        .with_hour(hour)?
        .with_minute(minute)?
        .with_second(0)?
        .with_nanosecond(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
