//! # Registry Events
//!
//! Structured notifications for the three observable state changes: a
//! completed mint, a manifest content update, and a pause flip. The event
//! log is the registry's only durable audit trail — record stores can be
//! rebuilt from it, but not the other way around.
//!
//! Pause events are level-triggered, not edge-triggered: setting `paused`
//! to the value it already has still emits, because downstream consumers
//! key alerting off "the authority touched the switch", not off the
//! transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ember_protocol::address::Address;

/// A registry state-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// An object completed the mint pipeline.
    #[serde(rename = "object_minted")]
    ObjectMinted {
        config: Address,
        manifest: Address,
        mint: Address,
        recipient: Address,
        object_id: u64,
    },
    /// A holder rewrote a manifest's content fields.
    #[serde(rename = "manifest_updated")]
    ManifestUpdated {
        config: Address,
        manifest: Address,
        mint: Address,
        object_id: u64,
        is_active: bool,
    },
    /// The governance authority touched the pause switch.
    #[serde(rename = "pause_changed")]
    PauseChanged { config: Address, paused: bool },
}

/// One emitted event with its position and wall-clock timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log. Dense — no gaps.
    pub sequence: u64,
    /// Emission timestamp.
    pub at: DateTime<Utc>,
    /// The event payload.
    pub event: RegistryEvent,
}

/// Append-only event log.
///
/// Instruction execution appends tentatively and truncates back to the
/// pre-instruction length on rollback, so the log only ever contains
/// events from committed instructions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, assigning the next sequence number.
    pub fn emit(&mut self, event: RegistryEvent) -> &EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64,
            at: Utc::now(),
            event,
        };
        self.records.push(record);
        self.records.last().expect("just pushed")
    }

    /// Number of events emitted so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Events with `sequence >= since`, oldest first. The polling cursor
    /// the node's event endpoint uses.
    pub fn since(&self, since: u64) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().filter(move |r| r.sequence >= since)
    }

    /// Discards events from `len` onward. Rollback support — callers pass
    /// the length they observed before executing.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pause_event(paused: bool) -> RegistryEvent {
        RegistryEvent::PauseChanged {
            config: Address::from_bytes([1u8; 32]),
            paused,
        }
    }

    #[test]
    fn sequences_are_dense() {
        let mut log = EventLog::new();
        log.emit(pause_event(true));
        log.emit(pause_event(false));
        log.emit(pause_event(true));

        let seqs: Vec<u64> = log.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn since_filters_by_cursor() {
        let mut log = EventLog::new();
        log.emit(pause_event(true));
        log.emit(pause_event(false));
        log.emit(pause_event(true));

        assert_eq!(log.since(1).count(), 2);
        assert_eq!(log.since(3).count(), 0);
    }

    #[test]
    fn truncate_discards_tentative_events() {
        let mut log = EventLog::new();
        log.emit(pause_event(true));
        let mark = log.len();
        log.emit(pause_event(false));
        log.truncate(mark);

        assert_eq!(log.len(), 1);
        // The next emit reuses the rolled-back sequence number.
        let record = log.emit(pause_event(true)).clone();
        assert_eq!(record.sequence, 1);
    }

    #[test]
    fn events_serialize_with_type_tags() {
        let json = serde_json::to_string(&pause_event(true)).unwrap();
        assert!(json.contains("\"type\":\"pause_changed\""));
    }
}
