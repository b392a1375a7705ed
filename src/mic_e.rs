//! Mic-E position decoding.
//!
//! Mic-E packs half the position into the AX.25 destination callsign: each
//! of the first six destination characters carries one latitude digit plus
//! message/hemisphere/longitude-offset bits, via a fixed decode table
//! (APRS 1.0.1 page 44). The information field then carries longitude,
//! speed and course as printable bytes offset by 28, two symbol bytes in
//! reversed order, and a type-code trailer with an optional base-91
//! altitude (pages 48 and 52).
//!
//! Structural mismatches (short payload, short or undecodable destination)
//! are per-branch errors with the raw text returned as comment.

use crate::base91;
use crate::position::parse_angle;
use crate::types::{DecodeError, Fact};

/// Per-character decode table entry for the destination address.
struct AddrDecode {
    lat_digit: char,
    #[allow(dead_code)] // standard message bits, not yet interpreted
    message_bit: u8,
    ns: char,
    lon_offset: i32,
    ew_sign: i32,
}

const fn entry(lat_digit: char, message_bit: u8, ns: char, lon_offset: i32, ew_sign: i32) -> AddrDecode {
    AddrDecode {
        lat_digit,
        message_bit,
        ns,
        lon_offset,
        ew_sign,
    }
}

/// APRS 1.0.1 page 44. Digits map to themselves (south, no offset);
/// `A`-`K` are custom-message digits with ambiguous hemisphere; `P`-`Z`
/// are standard-message digits, north, +100 longitude offset. `K`, `L`
/// and `Z` stand for an ambiguous (space) digit.
fn addr_decode(c: char) -> Option<AddrDecode> {
    Some(match c {
        '0'..='9' => entry(c, 0, 'S', 0, 1),
        'A'..='J' => entry((c as u8 - b'A' + b'0') as char, 1, ' ', 0, 0),
        'K' => entry(' ', 1, ' ', 0, 0),
        'L' => entry(' ', 0, 'S', 0, 1),
        'P'..='Y' => entry((c as u8 - b'P' + b'0') as char, 1, 'N', 100, -1),
        'Z' => entry(' ', 1, 'N', 100, -1),
        _ => return None,
    })
}

/// Decode a Mic-E information field against the envelope destination.
/// Returns the remaining comment text.
pub fn decode_mic_e(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    destination: &str,
    payload: &str,
) -> String {
    // 1 data-type byte + d/m/h + sp/dc/se + 2 symbol bytes
    let chars: Vec<char> = payload.chars().collect();
    if chars.len() < 9 {
        errors.push(DecodeError::MicEShortPayload);
        return payload.to_string();
    }
    let dest: Vec<char> = destination.chars().collect();
    if dest.len() < 6 {
        errors.push(DecodeError::MicEShortDestination);
        return payload.to_string();
    }

    let mut decoded = Vec::with_capacity(6);
    for &c in &dest[0..6] {
        match addr_decode(c) {
            Some(d) => decoded.push(d),
            None => {
                errors.push(DecodeError::MicEDestinationUnparseable(
                    destination.to_string(),
                ));
                return payload.to_string();
            }
        }
    }

    // Latitude digits come one per destination character; hemisphere from
    // position 3, longitude offset from 4, east/west sign from 5.
    let mut latitude_string: String = decoded[0..4].iter().map(|d| d.lat_digit).collect();
    latitude_string.push('.');
    latitude_string.extend(decoded[4..6].iter().map(|d| d.lat_digit));
    latitude_string.push(decoded[3].ns);
    let longitude_offset = decoded[4].lon_offset;
    let ew_sign = decoded[5].ew_sign;

    let (d28, m28, h28) = (chars[1], chars[2], chars[3]);
    let (sp28, dc28, se28) = (chars[4], chars[5], chars[6]);
    let symbol_rev = [chars[7], chars[8]];
    let trailer: String = chars[9..].iter().collect();

    // Longitude, APRS 1.0.1 page 48.
    let mut lon_d = d28 as i32 - 28 + longitude_offset;
    if (180..=189).contains(&lon_d) {
        lon_d -= 80;
    } else if (190..=199).contains(&lon_d) {
        lon_d -= 190;
    }
    let mut lon_m = m28 as i32 - 28;
    if lon_m >= 60 {
        lon_m -= 60;
    }
    let lon_s = h28 as i32 - 28;
    let longitude =
        ew_sign as f64 * (lon_d as f64 + (lon_m as f64 + lon_s as f64 / 100.0) / 60.0);

    match parse_angle(&latitude_string) {
        Some(latitude) => facts.push(Fact::Position {
            latitude,
            longitude,
        }),
        None => errors.push(DecodeError::MicELatitudeUnparseable(latitude_string)),
    }

    // Speed and course share a base-28 digit pair, APRS 1.0.1 page 52.
    let dc = dc28 as i32 - 28;
    let mut speed = (sp28 as i32 - 28) * 10 + dc / 10;
    let mut course = dc % 10 + (se28 as i32 - 28);
    if speed >= 800 {
        speed -= 800;
    }
    if course >= 400 {
        course -= 400;
    }
    facts.push(Fact::Velocity {
        speed_knots: speed as f64,
        course_degrees: course as f64,
    });

    // Symbol bytes arrive code-first, table-second.
    facts.push(Fact::Symbol {
        id: [symbol_rev[1], symbol_rev[0]].iter().collect(),
    });

    decode_type_trailer(facts, errors, &trailer)
}

/// Match the type-code trailer: one class byte, an optional 3-byte
/// `}`-terminated base-91 altitude (meters, offset 10000), then free text.
fn decode_type_trailer(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    trailer: &str,
) -> String {
    let chars: Vec<char> = trailer.chars().collect();
    if chars.is_empty() || !matches!(chars[0], ']' | ' ' | '>' | '`' | '\'') {
        errors.push(DecodeError::MicETrailerMismatch(trailer.to_string()));
        return trailer.to_string();
    }

    if chars.len() >= 5 && chars[4] == '}' {
        let altitude_digits: String = chars[1..4].iter().collect();
        facts.push(Fact::Altitude {
            value: (base91::decode(&altitude_digits) - 10000) as f64,
            feet_not_meters: false,
        });
        return chars[5..].iter().collect();
    }

    chars[1..].iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
