//! Lock time tracking and slip detection
use std::collections::HashMap;

use gnss::prelude::SV;

#[derive(Debug, Default, Copy, Clone)]
struct LockEntry {
    /// Epoch (TOW ms) of the latest update
    tow_ms: u32,
    /// Highest lock time reported during that epoch
    max_ms: u64,
    /// Highest lock time reported during the previous epoch
    prev_ms: u64,
}

/// Lock time counters, per satellite and slot. The highest value of
/// each epoch is retained, so one epoch may span several blocks.
#[derive(Debug, Default, Clone)]
pub struct LockTable {
    entries: HashMap<(SV, usize), LockEntry>,
}

impl LockTable {
    /// Updates the lock time of this satellite slot.
    /// Returns true if it dropped below the previous epoch's value.
    pub fn update(&mut self, sv: SV, slot: usize, tow_ms: u32, lock_ms: u64) -> bool {
        let entry = self.entries.entry((sv, slot)).or_insert(LockEntry {
            tow_ms,
            max_ms: 0,
            prev_ms: 0,
        });

        if entry.tow_ms != tow_ms {
            entry.prev_ms = entry.max_ms;
            entry.max_ms = 0;
            entry.tow_ms = tow_ms;
        }

        entry.max_ms = entry.max_ms.max(lock_ms);
        lock_ms < entry.prev_ms
    }

    /// Tracking restarted on this satellite slot: next update
    /// is not compared to anything prior.
    pub fn reset(&mut self, sv: SV, slot: usize, tow_ms: u32) {
        self.entries.insert(
            (sv, slot),
            LockEntry {
                tow_ms,
                max_ms: 0,
                prev_ms: 0,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
