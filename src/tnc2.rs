//! TNC2 envelope parsing: `SOURCE>DESTINATION[,VIA]*:PAYLOAD`.
//!
//! The entry point [`decode_line`] never fails: a line that doesn't match
//! the envelope grammar yields a degenerate message carrying the whole
//! line as payload and comment plus one error. Input is arbitrary bytes;
//! non-UTF-8 is decoded with replacement rather than rejected, since the
//! producers are RF demodulators and we don't get to choose what they
//! heard.
//!
//! Decoding is a pure function of `(line, receive_time)`: no shared state,
//! safe to call from any number of producer threads.

use crate::payload::decode_payload;
use crate::types::{AprsMessage, DecodeError};

/// Decode one received line into an [`AprsMessage`].
pub fn decode_line(line: &[u8], receive_time: f64) -> AprsMessage {
    parse_tnc2(&String::from_utf8_lossy(line), receive_time)
}

/// Decode an already-text line. Same contract as [`decode_line`].
pub fn parse_tnc2(line: &str, receive_time: f64) -> AprsMessage {
    let Some((source, destination, via, payload)) = split_envelope(line) else {
        return AprsMessage {
            receive_time,
            source: String::new(),
            destination: String::new(),
            via: Vec::new(),
            payload: line.to_string(),
            facts: Vec::new(),
            errors: vec![DecodeError::Envelope],
            comment: line.to_string(),
        };
    };

    let mut facts = Vec::new();
    let mut errors = Vec::new();
    let comment = decode_payload(&mut facts, &mut errors, &destination, &payload, receive_time);

    AprsMessage {
        receive_time,
        source,
        destination,
        via,
        payload,
        facts,
        errors,
        comment,
    }
}

/// Split a line into (source, destination, via, payload), or `None` when
/// the envelope grammar doesn't match. Address fields exclude `:` `>` `,`.
fn split_envelope(line: &str) -> Option<(String, String, Vec<String>, String)> {
    let (header, payload) = line.split_once(':')?;
    let (source, addresses) = header.split_once('>')?;
    if source.is_empty() || source.contains(',') || addresses.contains('>') {
        return None;
    }

    let mut parts = addresses.split(',');
    let destination = parts.next()?;
    if destination.is_empty() {
        return None;
    }
    let mut via = Vec::new();
    for part in parts {
        if part.is_empty() {
            return None;
        }
        via.push(part.to_string());
    }

    Some((
        source.to_string(),
        destination.to_string(),
        via,
        payload.to_string(),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
