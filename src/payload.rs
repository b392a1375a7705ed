//! Information-field dispatch on the APRS data type identifier.
//!
//! The leading payload byte selects a sub-format:
//! - `!` `=` position without timestamp (`=` implies messaging)
//! - `/` `@` position with 7-byte DHM/HMS timestamp (`@` implies messaging)
//! - `` ` `` `'` Mic-E (needs the envelope destination)
//! - `;` object report (may describe, or kill, a secondary entity)
//! - `<` station capabilities
//! - `>` status text
//! - `T` telemetry (1.0.1 format, parsed leniently)
//!
//! Sub-decoder failures append errors; decoding always terminates with a
//! comment string, never a hard failure.

use std::collections::BTreeMap;

use crate::mic_e::decode_mic_e;
use crate::position::decode_position_and_symbol;
use crate::timestamp::decode_timestamp;
use crate::types::{DecodeError, Fact};

/// Decode one information field. Returns the comment remainder.
pub fn decode_payload(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    destination: &str,
    payload: &str,
    receive_time: f64,
) -> String {
    let mut chars = payload.chars();
    let data_type = match chars.next() {
        Some(c) => c,
        None => {
            errors.push(DecodeError::EmptyPayload);
            return payload.to_string();
        }
    };
    let body = chars.as_str();

    match data_type {
        '!' | '=' => {
            facts.push(Fact::Messaging {
                supported: data_type == '=',
            });
            decode_position_and_symbol(facts, errors, body)
        }
        '/' | '@' => {
            facts.push(Fact::Messaging {
                supported: data_type == '@',
            });
            let body_chars: Vec<char> = body.chars().collect();
            if body_chars.len() < 7 {
                errors.push(DecodeError::TimestampedPositionTooShort);
                return payload.to_string();
            }
            let time_field: String = body_chars[0..7].iter().collect();
            let position_field: String = body_chars[7..].iter().collect();
            decode_timestamp(facts, errors, &time_field, receive_time);
            decode_position_and_symbol(facts, errors, &position_field)
        }
        '<' => {
            let mut capabilities = BTreeMap::new();
            for token in body.split(',') {
                let (key, value) = match token.split_once('=') {
                    Some((key, value)) => (key.to_string(), Some(value.to_string())),
                    None => (token.to_string(), None),
                };
                capabilities.insert(key, value);
            }
            facts.push(Fact::Capabilities(capabilities));
            String::new()
        }
        '>' => {
            facts.push(Fact::Status {
                text: body.to_string(),
            });
            String::new()
        }
        '`' | '\'' => decode_mic_e(facts, errors, destination, payload),
        ';' => decode_object(facts, errors, payload, receive_time),
        'T' => decode_telemetry(facts, errors, payload),
        _ => {
            errors.push(DecodeError::UnrecognizedDataType(data_type));
            payload.to_string()
        }
    }
}

/// Object report: 9-byte name, liveness marker, 7-byte timestamp, then a
/// position body whose facts describe the named object rather than the
/// transmitting station.
fn decode_object(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    payload: &str,
    receive_time: f64,
) -> String {
    let chars: Vec<char> = payload.chars().collect();
    // 1 identifier + 9 name + 1 liveness + 7 timestamp
    if chars.len() < 18 || !matches!(chars[10], '*' | '_') {
        errors.push(DecodeError::ObjectUnparseable);
        return payload.to_string();
    }

    let name: String = chars[1..10].iter().collect();
    let live = chars[10] == '*';
    let time_field: String = chars[11..18].iter().collect();
    let body: String = chars[18..].iter().collect();

    let mut object_facts = Vec::new();
    decode_timestamp(&mut object_facts, errors, &time_field, receive_time);
    let comment = decode_position_and_symbol(&mut object_facts, errors, &body);

    facts.push(Fact::ObjectItemReport {
        object: true,
        name,
        live,
        facts: object_facts,
    });
    comment
}

/// Telemetry 1.0.1: `T#seq,a1,a2,a3,a4,a5,dddddddd` with analog channels
/// parsed independently. Lenient about field widths and decimal points,
/// since real trackers take liberties; a bad channel costs one error, not
/// the packet.
fn decode_telemetry(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    payload: &str,
) -> String {
    let malformed = |errors: &mut Vec<DecodeError>| {
        errors.push(DecodeError::TelemetryMalformed(payload.to_string()));
        String::new()
    };

    let Some(rest) = payload.strip_prefix("T#") else {
        return malformed(errors);
    };
    let mut fields: Vec<&str> = rest.splitn(7, ',').collect();
    if fields.len() == 6 {
        // the comma after the sequence field is optional, so `T#MIC199,...`
        // glues the sequence to the first channel; peel off the longest
        // numeric suffix as the channel
        let first = fields[0];
        let glued = (0..first.len())
            .rev()
            .filter(|&i| first.is_char_boundary(i))
            .map(|i| (&first[..i], &first[i..]))
            .take_while(|(_, suffix)| suffix.parse::<f64>().is_ok())
            .last();
        match glued {
            Some((sequence, channel)) => {
                fields[0] = sequence;
                fields.insert(1, channel);
            }
            None => return malformed(errors),
        }
    }
    if fields.len() != 7 {
        return malformed(errors);
    }

    // last field: 8 binary digits, then comment
    let tail = fields[6];
    if tail.len() < 8 || !tail.as_bytes()[..8].iter().all(|b| *b == b'0' || *b == b'1') {
        return malformed(errors);
    }
    let comment = &tail[8..];

    // fields[0] is the sequence number (or "MIC"); not yet interpreted
    for (index, value_str) in fields[1..6].iter().enumerate() {
        let channel = index as u8 + 1;
        match value_str.parse::<f64>() {
            Ok(value) => facts.push(Fact::Telemetry { channel, value }),
            Err(_) => errors.push(DecodeError::TelemetryChannelUnparseable {
                channel,
                value: value_str.to_string(),
            }),
        }
    }
    comment.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
