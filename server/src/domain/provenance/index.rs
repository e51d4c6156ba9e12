//! Per-facility event lookup

use super::record_set::RecordSet;
use super::types::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Events whose destinations include the facility
    Incoming,
    /// Events whose sources include the facility
    Outgoing,
}

/// True when the event touches no facility other than `gln`
pub fn is_internal(event: &Event, gln: &str) -> bool {
    event.data.source_glns().all(|g| g == gln) && event.data.destination_glns().all(|g| g == gln)
}

impl RecordSet {
    /// Events of facility `gln` in the given direction, oldest first.
    ///
    /// Events with equal timestamps keep their event-map order.
    pub fn events_for(&self, gln: &str, direction: Direction, include_internal: bool) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events()
            .filter(|event| match direction {
                Direction::Incoming => event.data.destination_glns().any(|g| g == gln),
                Direction::Outgoing => event.data.source_glns().any(|g| g == gln),
            })
            .filter(|event| include_internal || !is_internal(event, gln))
            .collect();
        events.sort_by_key(|event| event.time());
        events
    }
}
