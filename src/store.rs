//! Per-station state folded from decoded messages.
//!
//! Pure logic: no I/O, no timers. The store owns every entity and is the
//! only writer; it is not internally synchronized, so all calls must come
//! from a single owner (typically one consumer task fed by a channel).
//! Expiry is a queryable predicate (`expiry_time`), not a timer: a driving
//! loop outside this crate sweeps with `prune_expired` on its own schedule.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::config::StoreConfig;
use crate::types::{AprsMessage, Fact};

const FEET_TO_METERS: f64 = 0.3048;
const KNOTS_TO_METERS_PER_SECOND: f64 = 1852.0 / 3600.0;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// One tracked quantity with the receive time it was last reported at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryItem {
    pub value: f64,
    pub timestamp: f64,
}

impl TelemetryItem {
    fn new(value: f64, timestamp: f64) -> Self {
        TelemetryItem { value, timestamp }
    }
}

/// Kinematic state of a station, each field independently timestamped.
/// Altitude is meters, horizontal speed m/s, track angle degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Track {
    pub latitude: Option<TelemetryItem>,
    pub longitude: Option<TelemetryItem>,
    pub altitude: Option<TelemetryItem>,
    pub h_speed: Option<TelemetryItem>,
    pub track_angle: Option<TelemetryItem>,
}

// ---------------------------------------------------------------------------
// Station entity
// ---------------------------------------------------------------------------

/// Mutable state for one tracked station or object.
///
/// Created by the store on first sight, mutated only by merging messages,
/// never destroyed from inside; callers sweep on `expiry_time()`.
#[derive(Debug, Clone, Serialize)]
pub struct AprsStation {
    object_id: String,
    last_heard_time: Option<f64>,
    track: Track,
    status: String,
    symbol: String,
    last_comment: String,
    last_parse_error: String,
    message_count: u64,
}

impl AprsStation {
    pub fn new(object_id: &str) -> Self {
        AprsStation {
            object_id: object_id.to_string(),
            last_heard_time: None,
            track: Track::default(),
            status: String::new(),
            symbol: String::new(),
            last_comment: String::new(),
            last_parse_error: String::new(),
            message_count: 0,
        }
    }

    /// Merge one message's facts into this entity, in order.
    pub fn receive(&mut self, message: &AprsMessage) {
        let t = message.receive_time;
        self.last_heard_time = Some(t);
        self.message_count += 1;

        for fact in &message.facts {
            match fact {
                // Kill by pretending the object is ancient.
                Fact::KillObject => self.last_heard_time = Some(0.0),
                Fact::Position {
                    latitude,
                    longitude,
                } => {
                    self.track.latitude = Some(TelemetryItem::new(*latitude, t));
                    self.track.longitude = Some(TelemetryItem::new(*longitude, t));
                }
                Fact::Altitude {
                    value,
                    feet_not_meters,
                } => {
                    let conversion = if *feet_not_meters { FEET_TO_METERS } else { 1.0 };
                    self.track.altitude = Some(TelemetryItem::new(value * conversion, t));
                }
                Fact::Velocity {
                    speed_knots,
                    course_degrees,
                } => {
                    self.track.h_speed =
                        Some(TelemetryItem::new(speed_knots * KNOTS_TO_METERS_PER_SECOND, t));
                    self.track.track_angle = Some(TelemetryItem::new(*course_degrees, t));
                }
                Fact::Status { text } => self.status = text.clone(),
                Fact::Symbol { id } => self.symbol = id.clone(),
                // Carried in the message but not folded into entity state.
                Fact::Messaging { .. }
                | Fact::Timestamp { .. }
                | Fact::Telemetry { .. }
                | Fact::Capabilities(_)
                | Fact::ObjectItemReport { .. }
                | Fact::RadioRange { .. } => {}
            }
        }

        self.last_comment = message.comment.clone();
        self.last_parse_error = if message.errors.is_empty() {
            String::new()
        } else {
            message
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };
    }

    /// Stations are always worth keeping until they expire.
    pub fn is_interesting(&self) -> bool {
        true
    }

    /// Unix time after which this entity is eviction-eligible.
    pub fn expiry_time(&self, unheard_timeout: f64) -> f64 {
        self.last_heard_time.unwrap_or(0.0) + unheard_timeout
    }

    pub fn last_heard_time(&self) -> Option<f64> {
        self.last_heard_time
    }

    /// AX.25 address or object name this entity is keyed by.
    pub fn address(&self) -> &str {
        &self.object_id
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// APRS symbol table identifier and symbol code.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_comment(&self) -> &str {
        &self.last_comment
    }

    pub fn last_parse_error(&self) -> &str {
        &self.last_parse_error
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Registry of tracked stations and objects, keyed by address/object name.
///
/// `receive` re-dispatches nested object/item reports as synthetic
/// messages through an explicit work queue, so one packet can update or
/// retire a secondary entity distinct from the transmitting station.
pub struct TelemetryStore {
    config: StoreConfig,
    objects: HashMap<String, AprsStation>,
    pub messages_received: u64,
    pub messages_with_errors: u64,
}

impl TelemetryStore {
    pub fn new(config: StoreConfig) -> Self {
        TelemetryStore {
            config,
            objects: HashMap::new(),
            messages_received: 0,
            messages_with_errors: 0,
        }
    }

    /// Fold one decoded message into the registry.
    pub fn receive(&mut self, message: &AprsMessage) {
        self.messages_received += 1;
        if !message.errors.is_empty() {
            self.messages_with_errors += 1;
        }

        // Breadth-first over nested reports; bounded queue instead of
        // recursion so pathological nesting can't blow the stack.
        let mut queue: VecDeque<AprsMessage> = VecDeque::new();
        queue.push_back(message.clone());

        while let Some(msg) = queue.pop_front() {
            self.objects
                .entry(msg.source.clone())
                .or_insert_with(|| AprsStation::new(&msg.source))
                .receive(&msg);

            for fact in &msg.facts {
                if let Fact::ObjectItemReport {
                    name, live, facts, ..
                } = fact
                {
                    let object_facts = if *live {
                        facts.clone()
                    } else {
                        vec![Fact::KillObject]
                    };
                    queue.push_back(AprsMessage {
                        receive_time: msg.receive_time,
                        source: name.clone(),
                        destination: String::new(),
                        via: Vec::new(),
                        payload: String::new(),
                        facts: object_facts,
                        errors: msg.errors.clone(),
                        comment: msg.comment.clone(),
                    });
                }
            }
        }
    }

    pub fn get(&self, object_id: &str) -> Option<&AprsStation> {
        self.objects.get(object_id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &AprsStation> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove entities whose expiry time has passed. Returns count removed.
    pub fn prune_expired(&mut self, now: f64) -> usize {
        let timeout = self.config.unheard_timeout;
        let before = self.objects.len();
        self.objects.retain(|_, st| st.expiry_time(timeout) > now);
        before - self.objects.len()
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        TelemetryStore::new(StoreConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
