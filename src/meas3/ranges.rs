//! Meas3Ranges decoding: reference epochs and delta records
use gnss::prelude::{Constellation, SV};
use log::debug;

use crate::{
    block::RawBlock,
    constellation::{ConstellationIndex, SatIndex},
    decoder::{DecodeEvent, Session},
    meas3::{
        cache::{SatReference, SignalReference},
        companion::{SatAssignment, SignalAssignment},
        header::{BlockHeader, ConstellationHeader, HeaderContent},
        record::{lock_time_ms, MasterRecord, SlaveRecord},
        table::MAX_SIGNALS,
    },
    observation::{LliFlags, SlotObservation},
    signal::{resolve_signal, SignalInfo},
    utils::Reader,
    Error,
};

/// Pseudo range base [mm]
fn pr_base_mm(constellation: Constellation, long_range: bool) -> i64 {
    match constellation {
        Constellation::GPS | Constellation::Glonass => 19_000_000_000,
        Constellation::Galileo => 22_000_000_000,
        Constellation::BeiDou if !long_range => 20_000_000_000,
        _ => 34_000_000_000,
    }
}

/// Pseudo range projection [mm] of a [64 mm/s] rate over `dt_ms`
pub(crate) fn projection_mm(pr_rate: Option<i16>, dt_ms: i64) -> i64 {
    match pr_rate {
        Some(rate) => rate as i64 * 64 * dt_ms / 1000,
        None => 0,
    }
}

/// Carrier phase [cycles] from pseudo range [mm] and carrier minus code [1E-3 cycles]
fn phase_cycles(pr_mm: i64, cmc: Option<i64>, wavelength: Option<f64>) -> Option<f64> {
    Some(pr_mm as f64 * 0.001 / wavelength? + cmc? as f64 * 0.001)
}

/// Carrier minus code [1E-3 cycles] of a carrier phase [cycles]
fn cmc_millicycles(pr_mm: i64, phase: Option<f64>, wavelength: Option<f64>) -> Option<i64> {
    let cmc = phase? - pr_mm as f64 * 0.001 / wavelength?;
    Some((cmc * 1000.0).round() as i64)
}

/// Decoded master signal
struct Master {
    index: usize,
    slave_mask: u16,
    pr_rate: Option<i16>,
    signal: SignalReference,
    lock_reset: bool,
}

impl Master {
    fn from_delta(
        reference: &SatReference,
        dt_ms: i64,
        pr_offset: i64,
        cmc_offset: i64,
        cn0_delta: i32,
        lock_reset: bool,
    ) -> Self {
        let projection = projection_mm(reference.pr_rate, dt_ms);
        let lock_ms = if lock_reset {
            0
        } else {
            reference.master.lock_ms + dt_ms as u64
        };
        Self {
            index: reference.master_index,
            slave_mask: reference.slave_mask,
            pr_rate: reference.pr_rate,
            signal: SignalReference {
                pr_mm: reference.master.pr_mm + projection + pr_offset,
                cmc: reference.master.cmc.map(|cmc| cmc + cmc_offset),
                cn0: reference.master.cn0 + cn0_delta,
                lock_ms,
            },
            lock_reset,
        }
    }
}

/// Constellation section decoding context
struct Context<'a> {
    constellation: ConstellationIndex,
    header: &'a ConstellationHeader,
    tow_ms: u32,
    boundary: bool,
    window_start: u32,
}

impl<'a> Context<'a> {
    /// Time elapsed since reference epoch [ms]
    fn dt_ms(&self) -> i64 {
        (self.tow_ms - self.window_start) as i64
    }
    fn signal(&self, index: usize) -> Option<SignalInfo> {
        self.header.table.signal(index)
    }
}

/// Stores one signal in the epoch buffer, returns its assignment
#[allow(clippy::too_many_arguments)]
fn store_signal(
    session: &mut Session,
    ctx: &Context,
    sv: SV,
    info: Option<SignalInfo>,
    glo_channel: Option<i8>,
    signal: &SignalReference,
    phase: Option<f64>,
    lock_reset: bool,
) -> SignalAssignment {
    let info = match info {
        Some(info) => info,
        None => {
            debug!("meas3: {} unknown signal", sv);
            return SignalAssignment::default();
        },
    };

    let frequency = info.frequency(glo_channel);

    let slot = match resolve_signal(info.constellation, info.number, &session.options) {
        Some((slot, _)) => slot,
        None => {
            debug!("meas3: {} signal #{} not stored", sv, info.number);
            return SignalAssignment {
                slot: None,
                frequency,
            };
        },
    };

    let mut lli = LliFlags::OK_OR_UNKNOWN;
    let locks = &mut session.meas3.locks;

    if ctx.boundary {
        // lock indexes of two reference epochs
        if locks.update(sv, slot, ctx.tow_ms, signal.lock_ms) {
            debug!("meas3: {} slot {} lock time decreased", sv, slot);
            lli |= LliFlags::LOCK_LOSS;
        }
    } else if lock_reset {
        debug!("meas3: {} slot {} lock reset", sv, slot);
        locks.reset(sv, slot, ctx.tow_ms);
        lli |= LliFlags::LOCK_LOSS;
    }

    let obs = SlotObservation {
        code: Some(info.code),
        pseudo_range: Some(signal.pr_mm as f64 * 0.001),
        phase,
        doppler: None,
        snr: Some(signal.cn0 as f64),
        lock_time_ms: Some(signal.lock_ms),
        lli,
    };

    session.store(sv, slot, obs, glo_channel);

    SignalAssignment {
        slot: Some(slot),
        frequency,
    }
}

/// Decodes the master and slave records of one satellite
fn decode_satellite(
    session: &mut Session,
    reader: &mut Reader,
    ctx: &Context,
    sat: SatIndex,
    glo_channel: Option<i8>,
) -> Result<(), Error> {
    let constellation = ctx.constellation.constellation();
    let sv = sat.to_sv(ctx.constellation);

    if let Some(k) = glo_channel {
        session.glonass.insert(sv, k);
    }
    let glo_channel = session.glonass.get(sv);

    let reference = session
        .meas3
        .cache
        .get(ctx.constellation)
        .reference(sat, ctx.window_start)
        .copied();

    let base_mm = pr_base_mm(constellation, ctx.header.long_range);

    let master = match MasterRecord::decode(reader)? {
        MasterRecord::Short {
            cmc,
            lock,
            cn0,
            signal,
            pr_lsb,
            pr_rate,
        } => Master {
            index: signal as usize,
            slave_mask: 0,
            pr_rate,
            signal: SignalReference {
                pr_mm: base_mm + pr_lsb as i64,
                cmc: (cmc != 0).then(|| cmc as i64 - 131_072),
                cn0: cn0 as i32 + 24,
                lock_ms: lock_time_ms(lock),
            },
            lock_reset: false,
        },
        MasterRecord::Long {
            cmc,
            lock,
            signal,
            pr_lsb,
            pr_msb,
            cn0,
            slave_mask,
            pr_rate,
        } => Master {
            index: signal as usize,
            slave_mask,
            pr_rate,
            signal: SignalReference {
                pr_mm: base_mm + ((pr_msb as i64) << 32 | pr_lsb as i64),
                cmc: (cmc != 0).then(|| cmc as i64 - 2_097_152),
                cn0: cn0 as i32 + 10,
                lock_ms: lock_time_ms(lock),
            },
            lock_reset: false,
        },
        MasterRecord::ShortDelta {
            pr_offset,
            cmc_offset,
            cn0_delta,
            lock_reset,
        } => {
            let reference = reference.as_ref().ok_or(Error::ReferenceMissing)?;
            Master::from_delta(
                reference,
                ctx.dt_ms(),
                pr_offset as i64 - 8_192,
                cmc_offset as i64 - 2_048,
                cn0_delta as i32 - 4,
                lock_reset,
            )
        },
        MasterRecord::LongDelta {
            pr_offset,
            cmc_offset,
            cn0_delta,
            lock_reset,
        } => {
            let reference = reference.as_ref().ok_or(Error::ReferenceMissing)?;
            Master::from_delta(
                reference,
                ctx.dt_ms(),
                pr_offset as i64 - 65_536,
                cmc_offset as i64 - 4_096,
                cn0_delta as i32 - 16,
                lock_reset,
            )
        },
    };

    let master_info = ctx.signal(master.index);
    let master_freq = master_info.and_then(|info| info.frequency(glo_channel));
    let master_lambda = master_info.and_then(|info| info.wavelength(glo_channel));
    let master_phase = phase_cycles(master.signal.pr_mm, master.signal.cmc, master_lambda);

    let mut assignment = SatAssignment {
        sv,
        signals: Vec::with_capacity(4),
    };

    assignment.signals.push(store_signal(
        session,
        ctx,
        sv,
        master_info,
        glo_channel,
        &master.signal,
        master_phase,
        master.lock_reset,
    ));

    let mut slaves = [None; MAX_SIGNALS];

    for index in 0..MAX_SIGNALS {
        if master.slave_mask & (1 << index) == 0 || index == master.index {
            continue;
        }

        let record = SlaveRecord::decode(reader)?;

        let info = ctx.signal(index);
        let freq = info.and_then(|info| info.frequency(glo_channel));
        let lambda = info.and_then(|info| info.wavelength(glo_channel));

        // master phase scaled to this carrier
        let scaled_phase = match (master_phase, master_freq, freq) {
            (Some(phase), Some(fm), Some(fs)) => Some(phase * fs / fm),
            _ => None,
        };

        let decoded = match record {
            SlaveRecord::Short {
                pr_offset,
                phase_offset,
                cn0,
                lock,
            } => {
                let pr_mm = master.signal.pr_mm + pr_offset as i64 - 8_192;
                let phase = if phase_offset == 0 {
                    None
                } else {
                    scaled_phase.map(|phase| phase + phase_offset as f64 * 0.001 - 65.536)
                };
                Some((
                    SignalReference {
                        pr_mm,
                        cmc: cmc_millicycles(pr_mm, phase, lambda),
                        cn0: cn0 as i32 + 24,
                        lock_ms: lock_time_ms(lock),
                    },
                    phase,
                    false,
                ))
            },
            SlaveRecord::Long {
                pr_offset,
                lock,
                cn0,
                phase_offset,
            } => {
                let pr_mm = master.signal.pr_mm + pr_offset as i64 - 131_072;
                let phase = if phase_offset == i32::MIN {
                    None
                } else {
                    scaled_phase.map(|phase| phase + phase_offset as f64 * 0.001)
                };
                Some((
                    SignalReference {
                        pr_mm,
                        cmc: cmc_millicycles(pr_mm, phase, lambda),
                        cn0: cn0 as i32 + 10,
                        lock_ms: lock_time_ms(lock),
                    },
                    phase,
                    false,
                ))
            },
            SlaveRecord::Delta {
                pr_offset,
                cmc_offset,
                cn0_delta,
                lock_reset,
            } => {
                // relative to both master and slave references
                match reference
                    .as_ref()
                    .and_then(|reference| Some((reference, reference.slaves[index]?)))
                {
                    Some((reference, slave_ref)) => {
                        let pr_mm = master.signal.pr_mm
                            + (slave_ref.pr_mm - reference.master.pr_mm)
                            + pr_offset as i64
                            - 4_096;
                        let cmc = slave_ref.cmc.map(|cmc| cmc + cmc_offset as i64 - 4_096);
                        let lock_ms = if lock_reset {
                            0
                        } else {
                            slave_ref.lock_ms + ctx.dt_ms() as u64
                        };
                        Some((
                            SignalReference {
                                pr_mm,
                                cmc,
                                cn0: slave_ref.cn0 + cn0_delta as i32 - 4,
                                lock_ms,
                            },
                            phase_cycles(pr_mm, cmc, lambda),
                            lock_reset,
                        ))
                    },
                    None => {
                        debug!("meas3: {} missing reference for signal {}", sv, index);
                        None
                    },
                }
            },
        };

        match decoded {
            Some((signal, phase, lock_reset)) => {
                assignment.signals.push(store_signal(
                    session,
                    ctx,
                    sv,
                    info,
                    glo_channel,
                    &signal,
                    phase,
                    lock_reset,
                ));
                slaves[index] = Some(signal);
            },
            None => {
                assignment.signals.push(SignalAssignment {
                    slot: None,
                    frequency: freq,
                });
            },
        }
    }

    session.meas3.assignments.push(assignment);

    if ctx.boundary {
        let mut reference = SatReference::new(ctx.tow_ms, master.index, master.signal);
        reference.slave_mask = master.slave_mask;
        reference.slaves = slaves;
        reference.pr_rate = master.pr_rate;
        session
            .meas3
            .cache
            .get_mut(ctx.constellation)
            .store(sat, reference);
    }

    Ok(())
}

/// Decodes a Meas3Ranges block into the epoch buffer
pub(crate) fn ranges(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let epoch = block.epoch()?;
    let tow_ms = block.tow_ms;

    let mut reader = Reader::new(&block.payload);
    let header = BlockHeader::decode(&mut reader)?;

    session.buffer.begin(epoch);
    session.meas3.assignments.begin(tow_ms);

    let boundary = header.interval.is_boundary(tow_ms);
    let window_start = header.interval.window_start(tow_ms);

    for constellation in header.constellations() {
        let cst_header = match ConstellationHeader::decode(&mut reader, constellation)? {
            HeaderContent::New(cst_header) => cst_header,
            HeaderContent::Unchanged => {
                match session.meas3.cache.get(constellation).header.clone() {
                    Some(cst_header) => cst_header,
                    None => {
                        debug!(
                            "meas3: {} - no previous header",
                            constellation.constellation()
                        );
                        session.meas3.assignments.truncate();
                        return Err(Error::ReferenceMissing);
                    },
                }
            },
        };

        let cache = session.meas3.cache.get_mut(constellation);
        if boundary {
            cache.begin_reference(tow_ms);
        }
        cache.header = Some(cst_header.clone());

        let ctx = Context {
            constellation,
            header: &cst_header,
            tow_ms,
            boundary,
            window_start,
        };

        for (sat, glo_channel) in cst_header.satellites() {
            match decode_satellite(session, &mut reader, &ctx, sat, glo_channel) {
                Ok(_) => {},
                Err(Error::ReferenceMissing) => {
                    // following records can't be delimited
                    debug!(
                        "meas3: {} - missing reference, dropping end of block",
                        sat.to_sv(constellation)
                    );
                    session.meas3.assignments.truncate();
                    return Ok(DecodeEvent::NoOp);
                },
                Err(e) => {
                    session.meas3.assignments.truncate();
                    return Err(e);
                },
            }
        }
    }

    Ok(DecodeEvent::NoOp)
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn rate_projection() {
        assert_eq!(projection_mm(None, 1000), 0);
        assert_eq!(projection_mm(Some(1000), 1000), 64_000);
        assert_eq!(projection_mm(Some(-1000), 1000), -64_000);
        // truncated toward zero
        assert_eq!(projection_mm(Some(1), 10), 0);
        assert_eq!(projection_mm(Some(-1), 20), -1);
        assert_eq!(projection_mm(Some(-1), 10), 0);
    }
    #[test]
    fn pseudo_range_bases() {
        assert_eq!(pr_base_mm(Constellation::GPS, false), 19_000_000_000);
        assert_eq!(pr_base_mm(Constellation::BeiDou, false), 20_000_000_000);
        assert_eq!(pr_base_mm(Constellation::BeiDou, true), 34_000_000_000);
        assert_eq!(pr_base_mm(Constellation::SBAS, false), 34_000_000_000);
    }
    #[test]
    fn carrier_minus_code() {
        let lambda = Some(0.2);
        let phase = phase_cycles(20_000, Some(-500), lambda).unwrap();
        assert!((phase - 99.5).abs() < 1E-9);
        assert_eq!(cmc_millicycles(20_000, Some(phase), lambda), Some(-500));
        assert_eq!(phase_cycles(20_000, None, lambda), None);
        assert_eq!(cmc_millicycles(20_000, None, lambda), None);
    }
}
