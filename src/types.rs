//! Shared types: the `Fact` model, decoded `AprsMessage`, and error enum.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Non-fatal decode problems, surfaced as data in [`AprsMessage::errors`].
///
/// Nothing in this crate aborts on one of these; each decode path records
/// what it couldn't understand and carries on. The `Display` text is what
/// external observability/UI layers show.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum DecodeError {
    #[error("could not parse TNC2 envelope")]
    Envelope,
    #[error("zero length information field")]
    EmptyPayload,
    #[error("position does not parse")]
    PositionUnparseable,
    #[error("lat/lon does not parse: {0:?}")]
    AngleUnparseable(String),
    #[error("position with timestamp is too short")]
    TimestampedPositionTooShort,
    #[error("DHM/HMS timestamp does not parse")]
    TimestampMalformed,
    #[error("DHM/HMS timestamp out of calendar range")]
    TimestampOutOfRange,
    #[error("Mic-E information field is too short")]
    MicEShortPayload,
    #[error("Mic-E destination address is too short")]
    MicEShortDestination,
    #[error("Mic-E destination address does not decode: {0:?}")]
    MicEDestinationUnparseable(String),
    #[error("Mic-E latitude does not parse: {0:?}")]
    MicELatitudeUnparseable(String),
    #[error("Mic-E contained non-type-code text: {0:?}")]
    MicETrailerMismatch(String),
    #[error("{0} parsing not implemented")]
    ExtensionUnimplemented(&'static str),
    #[error("object report did not parse")]
    ObjectUnparseable,
    #[error("telemetry did not parse: {0:?}")]
    TelemetryMalformed(String),
    #[error("telemetry channel {channel} did not parse: {value:?}")]
    TelemetryChannelUnparseable { channel: u8, value: String },
    #[error("unrecognized data type: {0:?}")]
    UnrecognizedDataType(char),
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// One decoded piece of information from an APRS packet.
///
/// A packet yields an ordered list of facts; the store merges them into
/// entity state in order, last-applied-wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Fact {
    /// WGS84 fix, degrees north / degrees east.
    Position { latitude: f64, longitude: f64 },
    /// Altitude with its on-air unit. Kept uncoerced so no precision is
    /// lost before the consumer picks a unit.
    Altitude { value: f64, feet_not_meters: bool },
    /// Ground track.
    Velocity { speed_knots: f64, course_degrees: f64 },
    /// Whether the station advertises APRS messaging capability.
    Messaging { supported: bool },
    /// Free-text status.
    Status { text: String },
    /// Map icon: symbol table identifier + symbol code, two characters.
    Symbol { id: String },
    /// Packet-claimed time, resolved against the receive time.
    Timestamp { time: NaiveDateTime },
    /// One analog telemetry channel (1-5).
    Telemetry { channel: u8, value: f64 },
    /// Station capability advert: token -> optional value.
    Capabilities(BTreeMap<String, Option<String>>),
    /// Report about a secondary entity distinct from the sender.
    ObjectItemReport {
        /// true = Object report, false = Item report.
        object: bool,
        name: String,
        live: bool,
        facts: Vec<Fact>,
    },
    /// Synthetic fact: retire the named entity immediately.
    KillObject,
    /// Claimed radio coverage radius.
    RadioRange { miles: f64 },
}

// ---------------------------------------------------------------------------
// Decoded message
// ---------------------------------------------------------------------------

/// Immutable decode result for one TNC2 line.
///
/// Always constructible: unparseable input yields a degenerate message with
/// the full line as comment and one error, never a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AprsMessage {
    /// Unix time when the line was received.
    pub receive_time: f64,
    /// AX.25 source address.
    pub source: String,
    /// AX.25 destination address.
    pub destination: String,
    /// Digipeater path, in order.
    pub via: Vec<String>,
    /// Raw information field.
    pub payload: String,
    /// Decoded facts, in payload order.
    pub facts: Vec<Fact>,
    /// Decode problems, in the order encountered.
    pub errors: Vec<DecodeError>,
    /// Human-readable text left over after decoding.
    pub comment: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
