//! Meas3Doppler and Meas3CN0HiRes decoding
use gnss::prelude::SV;
use log::debug;

use crate::{
    block::RawBlock,
    constants::Constants,
    decoder::{DecodeEvent, Session},
    utils::Reader,
    Error,
};

/// Where one signal of the main pass got stored
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct SignalAssignment {
    /// Observation slot, None when this signal was not stored
    pub slot: Option<usize>,
    /// Carrier frequency [Hz], when known
    pub frequency: Option<f64>,
}

/// Signals of one satellite, master first
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SatAssignment {
    pub sv: SV,
    pub signals: Vec<SignalAssignment>,
}

/// Slot assignments of the Meas3Ranges main pass, in transmission order.
/// Companion blocks address satellites and signals in that same order.
#[derive(Debug, Default, Clone)]
pub(crate) struct AssignmentTable {
    tow_ms: Option<u32>,
    sats: Vec<SatAssignment>,
    /// Main pass got interrupted: later blocks of this epoch
    /// can no longer be aligned.
    truncated: bool,
}

impl AssignmentTable {
    /// Prepares for a Meas3Ranges block. The table is rebuilt on
    /// every new epoch, and extended by blocks of the same epoch.
    pub fn begin(&mut self, tow_ms: u32) {
        if self.tow_ms != Some(tow_ms) {
            self.tow_ms = Some(tow_ms);
            self.sats.clear();
            self.truncated = false;
        }
    }

    pub fn push(&mut self, sat: SatAssignment) {
        if !self.truncated {
            self.sats.push(sat);
        }
    }

    pub fn truncate(&mut self) {
        self.truncated = true;
    }

    /// Returns the assignments built for this TOW
    fn assignments(&self, tow_ms: u32) -> Option<&[SatAssignment]> {
        if self.tow_ms == Some(tow_ms) {
            Some(&self.sats)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.tow_ms = None;
        self.sats.clear();
        self.truncated = false;
    }
}

/// Doppler [Hz] from pseudo range rate [1/64 mm/s]
fn rate_to_doppler(rate: i32, frequency: f64) -> f64 {
    let rate_m_s = rate as f64 / 64.0 / 1000.0;
    -rate_m_s * frequency / Constants::SPEED_OF_LIGHT_M_S
}

/// Applies a Meas3Doppler block to the main pass of the same epoch
pub(crate) fn doppler(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let assignments = match session.meas3.assignments.assignments(block.tow_ms) {
        Some(assignments) => assignments,
        None => {
            debug!("meas3-doppler: no matching main pass");
            return Ok(DecodeEvent::NoOp);
        },
    };

    let mut reader = Reader::new(&block.payload);

    for sat in assignments.iter() {
        let rate = match reader.read_i32() {
            Ok(rate) => rate,
            Err(_) => break,
        };
        if rate == i32::MIN {
            continue;
        }

        let master = match sat.signals.first() {
            Some(master) => master,
            None => continue,
        };

        let master_freq = match master.frequency {
            Some(freq) => freq,
            None => continue,
        };

        let master_doppler = rate_to_doppler(rate, master_freq);

        let record = match session.buffer.get_mut(sat.sv) {
            Some(record) => record,
            None => continue,
        };

        for (nth, signal) in sat.signals.iter().enumerate() {
            let doppler = if nth == 0 {
                Some(master_doppler)
            } else {
                signal.frequency.map(|freq| master_doppler * freq / master_freq)
            };
            if let Some(slot) = signal.slot.and_then(|slot| record.slots.get_mut(slot)) {
                slot.doppler = doppler;
            }
        }
    }

    Ok(DecodeEvent::NoOp)
}

/// Applies a Meas3CN0HiRes block to the main pass of the same epoch
pub(crate) fn cn0_hires(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let assignments = match session.meas3.assignments.assignments(block.tow_ms) {
        Some(assignments) => assignments,
        None => {
            debug!("meas3-cn0: no matching main pass");
            return Ok(DecodeEvent::NoOp);
        },
    };

    let nibbles = block
        .payload
        .iter()
        .flat_map(|byte| [byte & 0x0f, byte >> 4])
        .collect::<Vec<_>>();

    let mut nibbles = nibbles.iter();

    for sat in assignments.iter() {
        for signal in sat.signals.iter() {
            let nibble = match nibbles.next() {
                Some(nibble) => *nibble,
                None => return Ok(DecodeEvent::NoOp),
            };

            let slot = match signal.slot {
                Some(slot) => slot,
                None => continue,
            };

            if let Some(record) = session.buffer.get_mut(sat.sv) {
                if let Some(snr) = record.slots.get_mut(slot).and_then(|obs| obs.snr.as_mut()) {
                    *snr += nibble as f64 * 0.0625;
                }
            }
        }
    }

    Ok(DecodeEvent::NoOp)
}

#[cfg(test)]
mod test {
    use super::*;
    use gnss::prelude::Constellation;

    #[test]
    fn doppler_conversion() {
        // 64 m/s range rate on L1
        let doppler = rate_to_doppler(64 * 64_000, 1575.42E6);
        let expected = -64.0 * 1575.42E6 / Constants::SPEED_OF_LIGHT_M_S;
        assert!((doppler - expected).abs() < 1E-9);
        assert_eq!(rate_to_doppler(0, 1575.42E6), 0.0);
    }

    #[test]
    fn assignment_epochs() {
        let g01 = SV::new(Constellation::GPS, 1);
        let mut table = AssignmentTable::default();
        assert!(table.assignments(1000).is_none());

        table.begin(1000);
        table.push(SatAssignment {
            sv: g01,
            signals: vec![],
        });
        table.begin(1000);
        table.push(SatAssignment {
            sv: g01,
            signals: vec![],
        });
        assert_eq!(table.assignments(1000).unwrap().len(), 2);
        assert!(table.assignments(2000).is_none());

        table.truncate();
        table.push(SatAssignment {
            sv: g01,
            signals: vec![],
        });
        assert_eq!(table.assignments(1000).unwrap().len(), 2);

        table.begin(2000);
        assert!(table.assignments(2000).unwrap().is_empty());
    }
}
