//! aprs-core: Pure decode + tracking library for APRS TNC2 traffic.
//!
//! No async, no I/O, just algorithms. Producers (RF demodulators,
//! APRS-IS network readers) call [`decode_line`] with `(line,
//! receive_time)` pairs; decoding is pure and thread-safe. The resulting
//! [`AprsMessage`] is folded into a [`TelemetryStore`], which is
//! single-owner: feed it from one consumer loop over a channel.
//!
//! The decoder never fails hard. Real RF-decoded input is full of
//! malformed packets, so every decode path reports partial results plus
//! error strings instead of rejecting a line.

pub mod base91;
pub mod config;
pub mod mic_e;
pub mod payload;
pub mod position;
pub mod store;
pub mod timestamp;
pub mod tnc2;
pub mod types;

// Re-export commonly used types at crate root
pub use config::StoreConfig;
pub use store::{AprsStation, TelemetryItem, TelemetryStore, Track};
pub use tnc2::{decode_line, parse_tnc2};
pub use types::*;
