//! Run statistics tracking.
//!
//! Counters for the notable events of a batch run, printed at the end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::EventType;

/// Processing statistics tracker.
///
/// Every `EventType` is initialized to zero on creation. Counters are atomic so
/// the tracker can be shared by reference between the runner and the client.
pub struct ProcessingStats {
    events: HashMap<EventType, AtomicUsize>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in EventType::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        ProcessingStats { events }
    }

    /// Increment an event counter.
    pub fn increment(&self, event: EventType) {
        self.add(event, 1);
    }

    pub fn add(&self, event: EventType, amount: usize) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(amount, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                event
            );
        }
    }

    /// Get the count for an event type.
    pub fn get(&self, event: EventType) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
