//! Meas3 compressed measurements.
//!
//! Full measurements are transmitted on reference epochs (TOW multiple of
//! the [ReferenceInterval]) and cached. Other epochs are encoded as small
//! offsets to the cached reference, projected by the pseudo range rate.
//! Doppler and fractional C/N0 are transmitted in companion blocks.
mod cache;
mod companion;
mod header;
mod ranges;
mod record;
mod table;

pub use header::ReferenceInterval;
pub use table::SignalTable;

pub(crate) use companion::{cn0_hires, doppler};
pub(crate) use ranges::ranges;

use cache::ReferenceCache;
use companion::AssignmentTable;

use crate::observation::LockTable;

/// Meas3 decoding state
#[derive(Debug, Default, Clone)]
pub(crate) struct Meas3State {
    /// Reference epochs
    cache: ReferenceCache,
    /// Slot assignments of the current epoch
    assignments: AssignmentTable,
    /// Lock times, updated on reference epochs only:
    /// delta records report slips through their reset bit.
    locks: LockTable,
}

impl Meas3State {
    pub fn clear(&mut self) {
        self.cache.clear();
        self.assignments.clear();
        self.locks.clear();
    }
}
