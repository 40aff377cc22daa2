//! Observation epoch buffer
use std::collections::BTreeMap;

use gnss::prelude::SV;
use hifitime::Epoch;
use log::{debug, warn};

use crate::observation::{ObservationEpoch, ObservationRecord, MAX_OBSERVATIONS};

/// [EpochBuffer] accumulates per satellite records across
/// measurement blocks, until the end of epoch marker.
#[derive(Debug, Default, Clone)]
pub struct EpochBuffer {
    /// Epoch currently being gathered
    epoch: Option<Epoch>,
    records: BTreeMap<SV, ObservationRecord>,
}

impl EpochBuffer {
    /// Prepares the buffer for a measurement block sampled at this [Epoch].
    /// Scratch left by an epoch that never got terminated is discarded.
    pub fn begin(&mut self, epoch: Epoch) {
        if let Some(current) = self.epoch {
            if current != epoch && !self.records.is_empty() {
                debug!(
                    "{} - discarding {} unterminated records",
                    current,
                    self.records.len()
                );
                self.records.clear();
            }
        }
        self.epoch = Some(epoch);
    }

    /// Epoch currently being gathered
    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// Returns the record of this [SV], created on first access.
    /// Returns None once the buffer is full.
    pub fn record_mut(&mut self, sv: SV) -> Option<&mut ObservationRecord> {
        let len = self.records.len();
        if len >= MAX_OBSERVATIONS && !self.records.contains_key(&sv) {
            warn!("too many satellites: {} dropped", sv);
            return None;
        }
        Some(
            self.records
                .entry(sv)
                .or_insert_with(|| ObservationRecord::new(sv)),
        )
    }

    /// Returns the existing record of this [SV]
    pub fn get_mut(&mut self, sv: SV) -> Option<&mut ObservationRecord> {
        self.records.get_mut(&sv)
    }

    /// Publishes the gathered records. Unresolved records are dropped.
    /// Scratch is reset in any case. Returns None when nothing
    /// valid was gathered.
    pub fn flush(&mut self) -> Option<ObservationEpoch> {
        let epoch = self.epoch.take();
        let records = std::mem::take(&mut self.records)
            .into_values()
            .filter(|rec| rec.is_valid())
            .collect::<Vec<_>>();

        let epoch = epoch?;
        if records.is_empty() {
            debug!("{} - empty epoch", epoch);
            return None;
        }

        Some(ObservationEpoch { epoch, records })
    }

    /// Drops everything
    pub fn clear(&mut self) {
        self.epoch = None;
        self.records.clear();
    }
}
