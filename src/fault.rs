use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

pub const FAULT_HISTORY_CAPACITY: usize = 16;

const_assert!(FAULT_HISTORY_CAPACITY > 0);
const_assert!(FAULT_HISTORY_CAPACITY <= u8::MAX as usize);

/// Fixed-size ring of timestamps (µs) at which a configuration check failed.
///
/// Once full, each new record overwrites the oldest slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultHistoryLog {
    slots: [u32; FAULT_HISTORY_CAPACITY],
    write_index: usize,
    recorded: u32,
}

impl FaultHistoryLog {
    pub fn new() -> Self {
        Self {
            slots: [0; FAULT_HISTORY_CAPACITY],
            write_index: 0,
            recorded: 0,
        }
    }

    pub fn record(&mut self, timestamp_us: u32) {
        self.slots[self.write_index] = timestamp_us;
        self.write_index = (self.write_index + 1) % FAULT_HISTORY_CAPACITY;
        self.recorded = self.recorded.saturating_add(1);

        debug_assert!(
            self.write_index < FAULT_HISTORY_CAPACITY,
            "Fault history index {} out of bounds",
            self.write_index
        );
    }

    /// Clear every slot and rewind the write index.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        (self.recorded as usize).min(FAULT_HISTORY_CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    /// Total records since the last reset, including overwritten ones.
    pub fn total_recorded(&self) -> u32 {
        self.recorded
    }

    /// Slot the next record will be written to.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Raw slot contents in storage order, not chronological order.
    pub fn slots(&self) -> &[u32; FAULT_HISTORY_CAPACITY] {
        &self.slots
    }

    /// Most recently recorded timestamp.
    pub fn latest(&self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let index = (self.write_index + FAULT_HISTORY_CAPACITY - 1) % FAULT_HISTORY_CAPACITY;
        Some(self.slots[index])
    }
}

impl Default for FaultHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
