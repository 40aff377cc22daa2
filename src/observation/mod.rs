//! Decoded observations
use gnss::prelude::{Constellation, SV};
use hifitime::Epoch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::signal::{ObsCode, MAX_EXTRA_SLOTS, NB_FREQ_SLOTS};

mod buffer;
mod lli;
mod lock;

pub use lli::LliFlags;

pub(crate) use buffer::EpochBuffer;
pub(crate) use lock::LockTable;

/// Maximal number of slots per satellite: frequency slots, then extra slots
pub const MAX_SLOTS: usize = NB_FREQ_SLOTS + MAX_EXTRA_SLOTS;

/// Maximal number of satellites in one [ObservationEpoch]
pub const MAX_OBSERVATIONS: usize = 128;

/// [SlotObservation] is the measurement of one signal, stored
/// in one slot of an [ObservationRecord].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotObservation {
    /// Observation code. None means this slot is empty.
    pub code: Option<ObsCode>,
    /// Pseudo range [m]
    pub pseudo_range: Option<f64>,
    /// Carrier phase [cycles]
    pub phase: Option<f64>,
    /// Doppler shift [Hz]
    pub doppler: Option<f64>,
    /// Carrier to noise density ratio [dB-Hz]
    pub snr: Option<f64>,
    /// Lock time [ms]
    pub lock_time_ms: Option<u64>,
    /// Phase tracking flags
    pub lli: LliFlags,
}

impl SlotObservation {
    /// Returns true if this slot holds nothing
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
    }
}

/// [ObservationRecord] gathers all observations of one satellite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationRecord {
    /// [SV]
    pub sv: SV,
    /// Sampling instant, set as soon as one slot is decoded
    pub epoch: Option<Epoch>,
    /// Glonass frequency channel number
    pub glo_channel: Option<i8>,
    /// Frequency slots then extra slots
    pub slots: [SlotObservation; MAX_SLOTS],
}

impl ObservationRecord {
    pub fn new(sv: SV) -> Self {
        Self {
            sv,
            epoch: None,
            glo_channel: None,
            slots: [SlotObservation::default(); MAX_SLOTS],
        }
    }

    /// Returns true if this record may be published: satellite
    /// is resolved and the sampling instant is known.
    pub fn is_valid(&self) -> bool {
        self.epoch.is_some() && self.sv.prn != 0 && self.sv.constellation != Constellation::Mixed
    }

    /// Iterates non empty slots, with their index
    pub fn observed_slots(&self) -> impl Iterator<Item = (usize, &SlotObservation)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
    }

    /// Returns the slot that holds this [ObsCode], if any
    pub fn slot_by_code(&self, code: ObsCode) -> Option<&SlotObservation> {
        self.slots.iter().find(|slot| slot.code == Some(code))
    }
}

/// [ObservationEpoch] is the publication unit: all satellites
/// sampled at the same instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationEpoch {
    /// Sampling instant, in [hifitime::TimeScale::GPST]
    pub epoch: Epoch,
    /// One record per satellite, sorted by [SV]
    pub records: Vec<ObservationRecord>,
}

impl ObservationEpoch {
    /// Returns the record of this [SV]
    pub fn record(&self, sv: SV) -> Option<&ObservationRecord> {
        self.records.iter().find(|rec| rec.sv == sv)
    }
    /// Number of satellites
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
