//! Reference epoch cache
use crate::{
    constellation::{ConstellationIndex, SatIndex},
    meas3::{header::ConstellationHeader, table::MAX_SIGNALS},
};

/// Full measurement of one signal, as of the reference epoch
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct SignalReference {
    /// Pseudo range [mm]
    pub pr_mm: i64,
    /// Carrier minus code [1E-3 cycles]
    pub cmc: Option<i64>,
    /// C/N0 [dB-Hz]
    pub cn0: i32,
    /// Lock time [ms]
    pub lock_ms: u64,
}

/// Reference epoch of one satellite
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct SatReference {
    /// Reference epoch TOW [ms]
    pub tow_ms: u32,
    /// Local index of the master signal
    pub master_index: usize,
    pub master: SignalReference,
    /// Local indexes of the slave signals
    pub slave_mask: u16,
    pub slaves: [Option<SignalReference>; MAX_SIGNALS],
    /// Pseudo range rate [64 mm/s]
    pub pr_rate: Option<i16>,
}

impl SatReference {
    pub fn new(tow_ms: u32, master_index: usize, master: SignalReference) -> Self {
        Self {
            tow_ms,
            master_index,
            master,
            slave_mask: 0,
            slaves: [None; MAX_SIGNALS],
            pr_rate: None,
        }
    }
}

/// Reference epochs of one constellation
#[derive(Debug, Clone)]
pub(crate) struct ConstellationCache {
    /// Latest constellation header
    pub header: Option<ConstellationHeader>,
    /// TOW [ms] of the reference epoch being gathered
    reference_tow: Option<u32>,
    sats: [Option<SatReference>; SatIndex::COUNT],
}

impl Default for ConstellationCache {
    fn default() -> Self {
        Self {
            header: None,
            reference_tow: None,
            sats: [None; SatIndex::COUNT],
        }
    }
}

impl ConstellationCache {
    /// Drops all satellite references, the header is preserved
    pub fn clear_references(&mut self) {
        self.reference_tow = None;
        self.sats = [None; SatIndex::COUNT];
    }

    /// Prepares for a block of the reference epoch at `tow_ms`.
    /// Previous references are dropped on the first block of that epoch only,
    /// so one reference epoch may span several blocks.
    pub fn begin_reference(&mut self, tow_ms: u32) {
        if self.reference_tow != Some(tow_ms) {
            self.clear_references();
            self.reference_tow = Some(tow_ms);
        }
    }

    pub fn store(&mut self, sat: SatIndex, reference: SatReference) {
        self.sats[sat.index()] = Some(reference);
    }

    /// Returns the reference of this satellite, if it belongs to
    /// the reference window starting at `window_start`.
    pub fn reference(&self, sat: SatIndex, window_start: u32) -> Option<&SatReference> {
        self.sats[sat.index()]
            .as_ref()
            .filter(|reference| reference.tow_ms == window_start)
    }
}

/// Reference epochs of all constellations
#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceCache {
    constellations: [ConstellationCache; ConstellationIndex::COUNT],
}

impl ReferenceCache {
    pub fn get(&self, constellation: ConstellationIndex) -> &ConstellationCache {
        &self.constellations[constellation.index()]
    }

    pub fn get_mut(&mut self, constellation: ConstellationIndex) -> &mut ConstellationCache {
        &mut self.constellations[constellation.index()]
    }

    pub fn clear(&mut self) {
        for cache in self.constellations.iter_mut() {
            cache.header = None;
            cache.clear_references();
        }
    }
}
