//! Position decoding: uncompressed and base-91 compressed formats, plus the
//! data extensions and comment-altitude scan that trail a position.
//!
//! Layouts handled:
//! - Uncompressed: `DDMM.hhN` + symbol table byte + `DDDMM.hhW` + symbol
//!   code byte + extension/comment. Spaces in the minutes field are an
//!   intentional imprecision encoding and read as `0`.
//! - Compressed: symbol table byte + 4-byte base91 latitude + 4-byte base91
//!   longitude + symbol code byte + compression bytes `c` `s` `t` + comment.
//!
//! All decoders append facts/errors and return the unconsumed remainder.

use crate::base91;
use crate::types::{DecodeError, Fact};

/// Decode a position body (everything after the data-type identifier and
/// optional timestamp). Returns the remaining comment text.
pub fn decode_position_and_symbol(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    data: &str,
) -> String {
    let chars: Vec<char> = data.chars().collect();

    // Uncompressed: distinguished by a leading latitude digit.
    if chars.len() >= 19 && chars[0].is_ascii_digit() {
        let lat: String = chars[0..8].iter().collect();
        let lon: String = chars[9..18].iter().collect();
        let symbol: String = [chars[8], chars[18]].iter().collect();
        let rest: String = chars[19..].iter().collect();

        match (parse_angle(&lat), parse_angle(&lon)) {
            (Some(latitude), Some(longitude)) => {
                facts.push(Fact::Position {
                    latitude,
                    longitude,
                });
            }
            _ => errors.push(DecodeError::AngleUnparseable(format!("{lat}, {lon}"))),
        }
        facts.push(Fact::Symbol {
            id: symbol.clone(),
        });

        let rest = decode_data_extension(facts, errors, &rest, &symbol);
        return decode_comment_altitude(facts, &rest);
    }

    // Compressed: fixed 13-byte layout.
    if chars.len() >= 13 {
        let lat_digits: String = chars[1..5].iter().collect();
        let lon_digits: String = chars[5..9].iter().collect();
        let symbol: String = [chars[0], chars[9]].iter().collect();
        let (c, s, t) = (chars[10], chars[11], chars[12]);
        let comment: String = chars[13..].iter().collect();

        facts.push(Fact::Position {
            latitude: 90.0 - base91::decode(&lat_digits) as f64 / 380926.0,
            longitude: -180.0 + base91::decode(&lon_digits) as f64 / 190463.0,
        });
        facts.push(Fact::Symbol { id: symbol });

        let comp_type = base91::decode(&t.to_string());
        let c_value = base91::decode(&c.to_string());
        if comp_type & 0b11000 == 0b10000 {
            // compressed altitude: cs is a 2-digit base91 exponent
            let cs: String = [c, s].iter().collect();
            facts.push(Fact::Altitude {
                value: 1.002f64.powi(base91::decode(&cs) as i32),
                feet_not_meters: true,
            });
        } else if c == ' ' {
            // no extra data
        } else if c == '{' {
            facts.push(Fact::RadioRange {
                miles: 1.08f64.powi(base91::decode(&s.to_string()) as i32),
            });
        } else if (0..=89).contains(&c_value) {
            facts.push(Fact::Velocity {
                speed_knots: 1.08f64.powi(base91::decode(&s.to_string()) as i32) - 1.0,
                course_degrees: (c_value * 4) as f64,
            });
        }
        return comment;
    }

    errors.push(DecodeError::PositionUnparseable);
    data.to_string()
}

/// Parse a fixed-layout angle string: 1-3 degree digits, `MM.hh` minutes
/// (spaces meaning zero), and a hemisphere letter. `S`/`W` are negative.
pub fn parse_angle(angle: &str) -> Option<f64> {
    let chars: Vec<char> = angle.chars().collect();
    if chars.len() < 7 {
        return None;
    }
    let sign = match chars[chars.len() - 1] {
        'N' | 'E' => 1.0,
        'S' | 'W' => -1.0,
        _ => return None,
    };

    let body = &chars[..chars.len() - 1];
    let (deg_part, min_part) = body.split_at(body.len() - 5);
    if deg_part.is_empty() || deg_part.len() > 3 || !deg_part.iter().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if min_part[2] != '.' {
        return None;
    }
    let mut minutes = String::with_capacity(5);
    for (i, &c) in min_part.iter().enumerate() {
        if i == 2 {
            minutes.push('.');
        } else if c == ' ' {
            minutes.push('0');
        } else if c.is_ascii_digit() {
            minutes.push(c);
        } else {
            return None;
        }
    }

    let degrees: f64 = deg_part.iter().collect::<String>().parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    Some(sign * (degrees + minutes / 60.0))
}

// ---------------------------------------------------------------------------
// Data extensions
// ---------------------------------------------------------------------------

/// Try the fixed 7-byte data extensions on a post-position remainder.
/// First match wins; no match passes the text through unchanged.
pub fn decode_data_extension(
    facts: &mut Vec<Fact>,
    errors: &mut Vec<DecodeError>,
    data: &str,
    symbol: &str,
) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() < 7 {
        return data.to_string();
    }
    let rest = || -> String { chars[7..].iter().collect() };

    // Course/speed: DDD/SSS. Symbol \l is an area object, which makes the
    // same digits ambiguous, so it is excluded here.
    if chars[0..3].iter().all(|c| c.is_ascii_digit())
        && chars[3] == '/'
        && chars[4..7].iter().all(|c| c.is_ascii_digit())
        && symbol != "\\l"
    {
        let course: String = chars[0..3].iter().collect();
        let speed: String = chars[4..7].iter().collect();
        facts.push(Fact::Velocity {
            speed_knots: speed.parse().unwrap_or(0.0),
            course_degrees: course.parse().unwrap_or(0.0),
        });
        return rest();
    }

    // PHGphgd: power/height/gain/directivity. Recognized but not decoded;
    // the match is consumed so it doesn't pollute the comment.
    if data.starts_with("PHG") && chars[3..7].iter().all(|c| c.is_ascii_digit()) {
        errors.push(DecodeError::ExtensionUnimplemented("PHG"));
        return rest();
    }

    if data.starts_with("RNG") && chars[3..7].iter().all(|c| c.is_ascii_digit()) {
        let miles: String = chars[3..7].iter().collect();
        facts.push(Fact::RadioRange {
            miles: miles.parse().unwrap_or(0.0),
        });
        return rest();
    }

    if data.starts_with("DFS") && chars[3..7].iter().all(|c| c.is_ascii_digit()) {
        errors.push(DecodeError::ExtensionUnimplemented("DFS"));
        return rest();
    }

    // Area object: Tyy/Cxx or Tyy1Cxx numeric pattern.
    if chars[0].is_ascii_digit()
        && chars[1].is_ascii_digit()
        && chars[2].is_ascii_digit()
        && (chars[3] == '/' || chars[3] == '1')
        && chars[4].is_ascii_digit()
        && chars[5].is_ascii_digit()
        && chars[6].is_ascii_digit()
    {
        errors.push(DecodeError::ExtensionUnimplemented("area object"));
        return rest();
    }

    data.to_string()
}

/// Scan a comment for a trailing `/A=NNNNNN` altitude (feet) and cut the
/// match out of the text.
pub fn decode_comment_altitude(facts: &mut Vec<Fact>, comment: &str) -> String {
    for (start, _) in comment.match_indices("/A=") {
        let digits = &comment.as_bytes()[start + 3..];
        if digits.len() >= 6 && digits[..6].iter().all(|b| b.is_ascii_digit()) {
            let value: f64 = comment[start + 3..start + 9].parse().unwrap_or(0.0);
            facts.push(Fact::Altitude {
                value,
                feet_not_meters: true,
            });
            let mut out = String::with_capacity(comment.len() - 9);
            out.push_str(&comment[..start]);
            out.push_str(&comment[start + 9..]);
            return out;
        }
    }
    comment.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn run(data: &str) -> (Vec<Fact>, Vec<DecodeError>, String) {
        let mut facts = Vec::new();
        let mut errors = Vec::new();
        let comment = decode_position_and_symbol(&mut facts, &mut errors, data);
        (facts, errors, comment)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_parse_angle_latitude() {
        assert_close(parse_angle("3746.42N").unwrap(), 37.0 + 46.42 / 60.0);
        assert_close(parse_angle("12226.00W").unwrap(), -(122.0 + 26.0 / 60.0));
    }

    #[test]
    fn test_parse_angle_spaces_read_as_zero() {
        // imprecision encoding: "341 .  N" means 34 degrees 10 minutes
        assert_close(parse_angle("341 .  N").unwrap(), 34.0 + 10.0 / 60.0);
    }

    #[test]
    fn test_parse_angle_rejects_garbage() {
        assert_eq!(parse_angle("^^^^^"), None);
        assert_eq!(parse_angle("3746.42X"), None);
        assert_eq!(parse_angle("ABCD.42N"), None);
    }

    #[test]
    fn test_uncompressed_position() {
        let (facts, errors, comment) = run("3746.42N112226.00W# {UIV32N}");
        assert_eq!(errors, vec![]);
        assert_eq!(comment, " {UIV32N}");
        match facts.as_slice() {
            [Fact::Position {
                latitude,
                longitude,
            }, Fact::Symbol { id: sym }] => {
                assert_close(*latitude, 37.0 + 46.42 / 60.0);
                assert_close(*longitude, -(122.0 + 26.0 / 60.0));
                assert_eq!(sym, "1#");
            }
            other => panic!("unexpected facts {other:?}"),
        }
    }

    #[test]
    fn test_uncompressed_with_phg_and_altitude() {
        let (facts, errors, comment) = run("3726.16NS12219.21W#PHG2436/A=002080");
        assert_eq!(errors, vec![DecodeError::ExtensionUnimplemented("PHG")]);
        assert_eq!(comment, "");
        assert!(facts.contains(&Fact::Symbol { id: "S#".into() }));
        assert!(facts.contains(&Fact::Altitude {
            value: 2080.0,
            feet_not_meters: true
        }));
    }

    #[test]
    fn test_uncompressed_course_speed_extension() {
        let (facts, errors, comment) =
            run("3755.50N/12205.43W_204/003g012t059r000p000P000h74b10084.DsVP");
        assert_eq!(errors, vec![]);
        assert_eq!(comment, "g012t059r000p000P000h74b10084.DsVP");
        assert!(facts.contains(&Fact::Velocity {
            speed_knots: 3.0,
            course_degrees: 204.0
        }));
    }

    #[test]
    fn test_compressed_position_velocity() {
        // APRS 1.0.1 page 40 example
        let (facts, errors, comment) = run("/5L!!<*e7>7P[");
        assert_eq!(errors, vec![]);
        assert_eq!(comment, "");
        match facts.as_slice() {
            [Fact::Position {
                latitude,
                longitude,
            }, Fact::Symbol { id: sym }, Fact::Velocity {
                speed_knots,
                course_degrees,
            }] => {
                assert_close(*latitude, 49.5);
                assert_close(*longitude, -72.75000393777269);
                assert_eq!(sym, "/>");
                assert_close(*speed_knots, 1.08f64.powi(47) - 1.0);
                assert_close(*course_degrees, 88.0);
            }
            other => panic!("unexpected facts {other:?}"),
        }
    }

    #[test]
    fn test_compressed_position_altitude() {
        let (facts, errors, _) = run("/!!!!!!!!>S]S");
        assert_eq!(errors, vec![]);
        match facts.as_slice() {
            [Fact::Position {
                latitude,
                longitude,
            }, Fact::Symbol { .. }, Fact::Altitude {
                value,
                feet_not_meters,
            }] => {
                assert_close(*latitude, 90.0);
                assert_close(*longitude, -180.0);
                assert!(*feet_not_meters);
                assert_close(*value, 1.002f64.powi(4610));
            }
            other => panic!("unexpected facts {other:?}"),
        }
    }

    #[test]
    fn test_compressed_position_radio_range() {
        let (facts, errors, comment) = run("/;XuS/_3{o{LCXASTIR-Linux");
        assert_eq!(errors, vec![]);
        assert_eq!(comment, "XASTIR-Linux");
        assert!(facts.iter().any(|f| match f {
            Fact::RadioRange { miles } => (miles - 1.08f64.powi(43)).abs() < 1e-9,
            _ => false,
        }));
    }

    #[test]
    fn test_compressed_no_extra_data_space() {
        let (facts, errors, comment) = run("/5L!!<*e7> s! rest");
        assert_eq!(errors, vec![]);
        assert_eq!(comment, " rest");
        assert_eq!(facts.len(), 2); // Position + Symbol only
    }

    #[test]
    fn test_too_short_is_unparseable() {
        let (facts, errors, comment) = run("^^^^^");
        assert_eq!(facts, vec![]);
        assert_eq!(errors, vec![DecodeError::PositionUnparseable]);
        assert_eq!(comment, "^^^^^");
    }

    #[test]
    fn test_bad_angle_still_yields_symbol() {
        // leading digit but unparseable angle: symbol and trailer survive
        let (facts, errors, _) = run("3xxx.xxN/12205.43W_204/003");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], DecodeError::AngleUnparseable(_)));
        assert!(facts.contains(&Fact::Symbol { id: "/_".into() }));
        assert!(!facts.iter().any(|f| matches!(f, Fact::Position { .. })));
    }

    #[test]
    fn test_compressed_bounds() {
        // all-extreme valid base91 inputs stay inside WGS84 bounds
        for digits in ["!!!!", "!!!{", "S]S]"] {
            let (facts, _, _) = run(&format!("/{digits}{digits}> s!"));
            match &facts[0] {
                Fact::Position {
                    latitude,
                    longitude,
                } => {
                    assert!((-90.0..=90.0).contains(latitude), "lat {latitude}");
                    assert!((-180.0..=180.0).contains(longitude), "lon {longitude}");
                }
                other => panic!("expected position, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rng_extension() {
        let mut facts = Vec::new();
        let mut errors = Vec::new();
        let rest = decode_data_extension(&mut facts, &mut errors, "RNG0050 tail", "/#");
        assert_eq!(rest, " tail");
        assert_eq!(
            facts,
            vec![Fact::RadioRange { miles: 50.0 }]
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_dfs_extension_consumed() {
        let mut facts = Vec::new();
        let mut errors = Vec::new();
        let rest = decode_data_extension(&mut facts, &mut errors, "DFS2436 tail", "/#");
        assert_eq!(rest, " tail");
        assert_eq!(facts, vec![]);
        assert_eq!(errors, vec![DecodeError::ExtensionUnimplemented("DFS")]);
    }

    #[test]
    fn test_area_object_symbol_not_course_speed() {
        let mut facts = Vec::new();
        let mut errors = Vec::new();
        decode_data_extension(&mut facts, &mut errors, "204/003", "\\l");
        assert_eq!(facts, vec![]);
        assert_eq!(
            errors,
            vec![DecodeError::ExtensionUnimplemented("area object")]
        );
    }

    #[test]
    fn test_short_extension_passes_through() {
        let mut facts = Vec::new();
        let mut errors = Vec::new();
        let rest = decode_data_extension(&mut facts, &mut errors, "abc", "/#");
        assert_eq!(rest, "abc");
        assert!(facts.is_empty() && errors.is_empty());
    }

    #[test]
    fn test_comment_altitude_cut_from_text() {
        let mut facts = Vec::new();
        let rest = decode_comment_altitude(&mut facts, "v077/000/A=001955/N6ZX, Kings Mt. Eme");
        assert_eq!(rest, "v077/000/N6ZX, Kings Mt. Eme");
        assert_eq!(
            facts,
            vec![Fact::Altitude {
                value: 1955.0,
                feet_not_meters: true
            }]
        );
    }

    #[test]
    fn test_comment_altitude_requires_six_digits() {
        let mut facts = Vec::new();
        let rest = decode_comment_altitude(&mut facts, "/A=123 more");
        assert_eq!(rest, "/A=123 more");
        assert!(facts.is_empty());
    }
}
