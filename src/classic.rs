//! MeasEpoch and MeasExtra decoding
use std::collections::HashMap;

use gnss::prelude::{Constellation, SV};
use log::{debug, error};

use crate::{
    block::RawBlock,
    constellation::sv_from_svid,
    decoder::{DecodeEvent, Session},
    observation::{LliFlags, LockTable, SlotObservation},
    signal::{resolve_signal, SignalInfo},
    utils::{Reader, Utils},
    Error,
};

/// Signal field value announcing an extended signal number
const EXTENDED_SIGNAL: u8 = 31;

const MIN_TYPE1_LEN: usize = 20;
const MIN_TYPE2_LEN: usize = 12;
const MIN_EXTRA_LEN: usize = 16;

/// Tracking channel to slot associations of the latest MeasEpoch,
/// so MeasExtra may refine them.
#[derive(Debug, Default, Clone)]
pub(crate) struct ClassicState {
    tow_ms: Option<u32>,
    channels: HashMap<(u8, u8), (SV, usize)>,
    /// Lock time counters
    locks: LockTable,
}

impl ClassicState {
    fn begin(&mut self, tow_ms: u32) {
        if self.tow_ms != Some(tow_ms) {
            self.channels.clear();
            self.tow_ms = Some(tow_ms);
        }
    }
    pub fn clear(&mut self) {
        self.tow_ms = None;
        self.channels.clear();
        self.locks.clear();
    }
}

/// Stores one observation, flagged when its lock time decreased
fn store(
    session: &mut Session,
    block: &RawBlock,
    sv: SV,
    slot: usize,
    mut obs: SlotObservation,
    glo_channel: Option<i8>,
) {
    if let Some(lock_ms) = obs.lock_time_ms {
        if session.classic.locks.update(sv, slot, block.tow_ms, lock_ms) {
            debug!("meas-epoch: {} slot {} lock time decreased", sv, slot);
            obs.lli |= LliFlags::LOCK_LOSS;
        }
    }
    session.store(sv, slot, obs, glo_channel);
}

/// Signal number, possibly extended through the info byte
fn signal_number(type_byte: u8, info: u8) -> u8 {
    let sig = Utils::bits(type_byte as u32, 0, 5) as u8;
    if sig == EXTENDED_SIGNAL {
        Utils::bits(info as u32, 3, 5) as u8 + 32
    } else {
        sig
    }
}

/// Antenna identifier
fn antenna_id(type_byte: u8) -> u8 {
    Utils::bits(type_byte as u32, 5, 3) as u8
}

/// SNR [dB-Hz]. Signals 1 and 2 (GPS P(Y)) are not offset.
fn snr(cn0: u8, signal: u8) -> Option<f64> {
    if cn0 == 255 {
        None
    } else if signal == 1 || signal == 2 {
        Some(cn0 as f64 * 0.25)
    } else {
        Some(cn0 as f64 * 0.25 + 10.0)
    }
}

/// Carrier phase [cycles] from pseudo range and carrier offset
fn carrier_phase(pr: Option<f64>, wavelength: Option<f64>, msb: i8, lsb: u16) -> Option<f64> {
    if msb == -128 && lsb == 0 {
        return None;
    }
    let offset = (msb as i64 * 65536 + lsb as i64) as f64 * 0.001;
    Some(pr? / wavelength? + offset)
}

/// Primary signal measurements, Type-2 sub-blocks refer to them
#[derive(Debug, Default, Copy, Clone)]
struct Primary {
    pseudo_range: Option<f64>,
    doppler: Option<f64>,
    frequency: Option<f64>,
}

/// Measurement context of one satellite
struct Satellite {
    sv: Option<SV>,
    glo_channel: Option<i8>,
    primary: Primary,
}

fn decode_type1(session: &mut Session, block: &RawBlock, buf: &[u8]) -> Result<Satellite, Error> {
    let chan = Utils::decode_u8(buf, 0)?;
    let type_byte = Utils::decode_u8(buf, 1)?;
    let svid = Utils::decode_u8(buf, 2)?;
    let misc = Utils::decode_u8(buf, 3)?;
    let code_lsb = Utils::decode_u32(buf, 4)?;
    let doppler = Utils::decode_i32(buf, 8)?;
    let carrier_lsb = Utils::decode_u16(buf, 12)?;
    let carrier_msb = Utils::decode_i8(buf, 14)?;
    let cn0 = Utils::decode_u8(buf, 15)?;
    let lock_time = Utils::decode_u16(buf, 16)?;
    let info = Utils::decode_u8(buf, 18)?;

    let number = signal_number(type_byte, info);
    let sv = sv_from_svid(svid);

    let mut glo_channel = None;
    if let Some(sv) = sv {
        if sv.constellation == Constellation::Glonass {
            if type_byte & 0x1f != EXTENDED_SIGNAL {
                let k = Utils::bits(info as u32, 3, 5) as i8 - 8;
                session.glonass.insert(sv, k);
            }
            glo_channel = session.glonass.get(sv);
        }
    }

    let code_msb = Utils::bits(misc as u32, 0, 4);
    let pseudo_range = if code_msb == 0x0f && code_lsb == u32::MAX {
        None
    } else {
        Some(((code_msb as u64) << 32 | code_lsb as u64) as f64 * 0.001)
    };

    let doppler = if doppler == i32::MIN {
        None
    } else {
        Some(doppler as f64 * 1.0E-4)
    };

    let frequency = SignalInfo::from_number(number).and_then(|sig| sig.frequency(glo_channel));
    let primary = Primary {
        pseudo_range,
        doppler,
        frequency,
    };

    let sv = match sv {
        Some(sv) => sv,
        None => {
            debug!("meas-epoch: unknown svid {}", svid);
            return Ok(Satellite {
                sv: None,
                glo_channel,
                primary,
            });
        },
    };

    match resolve_signal(sv.constellation, number, &session.options) {
        Some((slot, signal)) => {
            let wavelength = signal.wavelength(glo_channel);
            let mut lli = LliFlags::OK_OR_UNKNOWN;
            if info & 0x04 > 0 {
                lli |= LliFlags::HALF_CYCLE_SLIP;
            }
            let obs = SlotObservation {
                code: Some(signal.code),
                pseudo_range,
                phase: carrier_phase(pseudo_range, wavelength, carrier_msb, carrier_lsb),
                doppler,
                snr: snr(cn0, number),
                lock_time_ms: Some(lock_time as u64 * 1000),
                lli,
            };
            store(session, block, sv, slot, obs, glo_channel);
            session.classic.channels.insert((chan, number), (sv, slot));
        },
        None => {
            debug!("meas-epoch: {} signal #{} not stored", sv, number);
        },
    }

    Ok(Satellite {
        sv: Some(sv),
        glo_channel,
        primary,
    })
}

fn decode_type2(
    session: &mut Session,
    block: &RawBlock,
    chan: u8,
    satellite: &Satellite,
    buf: &[u8],
) -> Result<(), Error> {
    let type_byte = Utils::decode_u8(buf, 0)?;
    let lock_time = Utils::decode_u8(buf, 1)?;
    let cn0 = Utils::decode_u8(buf, 2)?;
    let offsets_msb = Utils::decode_u8(buf, 3)?;
    let carrier_msb = Utils::decode_i8(buf, 4)?;
    let info = Utils::decode_u8(buf, 5)?;
    let code_lsb = Utils::decode_u16(buf, 6)?;
    let carrier_lsb = Utils::decode_u16(buf, 8)?;
    let doppler_lsb = Utils::decode_u16(buf, 10)?;

    let sv = match satellite.sv {
        Some(sv) => sv,
        None => return Ok(()),
    };

    let number = signal_number(type_byte, info);
    let (slot, signal) = match resolve_signal(sv.constellation, number, &session.options) {
        Some(resolved) => resolved,
        None => {
            debug!("meas-epoch: {} signal #{} not stored", sv, number);
            return Ok(());
        },
    };

    // sign extended 3 and 5 bit fields
    let code_msb = ((offsets_msb << 5) as i8) >> 5;
    let doppler_msb = (offsets_msb as i8) >> 3;

    // sentinels: identical to primary
    let code_offset = if code_msb == -4 && code_lsb == 0 {
        0.0
    } else {
        (code_msb as i64 * 65536 + code_lsb as i64) as f64 * 0.001
    };
    let pseudo_range = satellite.primary.pseudo_range.map(|pr| pr + code_offset);

    let frequency = signal.frequency(satellite.glo_channel);

    let doppler_offset = if doppler_msb == -16 && doppler_lsb == 0 {
        0.0
    } else {
        (doppler_msb as i64 * 65536 + doppler_lsb as i64) as f64 * 1.0E-4
    };
    let doppler = match (satellite.primary.doppler, satellite.primary.frequency, frequency) {
        (Some(d1), Some(f1), Some(f2)) => Some(d1 * f2 / f1 + doppler_offset),
        _ => None,
    };

    let wavelength = signal.wavelength(satellite.glo_channel);
    let mut lli = LliFlags::OK_OR_UNKNOWN;
    if info & 0x04 > 0 {
        lli |= LliFlags::HALF_CYCLE_SLIP;
    }

    let obs = SlotObservation {
        code: Some(signal.code),
        pseudo_range,
        phase: carrier_phase(pseudo_range, wavelength, carrier_msb, carrier_lsb),
        doppler,
        snr: snr(cn0, number),
        lock_time_ms: Some(lock_time as u64 * 1000),
        lli,
    };

    store(session, block, sv, slot, obs, satellite.glo_channel);
    session.classic.channels.insert((chan, number), (sv, slot));
    Ok(())
}

/// Decodes a MeasEpoch block into the epoch buffer
pub(crate) fn meas_epoch(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let epoch = block.epoch()?;
    let mut reader = Reader::new(&block.payload);

    let n1 = reader.read_u8()?;
    let sb1_len = reader.read_u8()? as usize;
    let sb2_len = reader.read_u8()? as usize;
    let _common_flags = reader.read_u8()?;
    let _clk_jumps = reader.read_u8()?;
    let _reserved = reader.read_u8()?;

    if sb1_len < MIN_TYPE1_LEN || sb2_len < MIN_TYPE2_LEN {
        error!(
            "meas-epoch: invalid sub-block lengths {}/{}",
            sb1_len, sb2_len
        );
        return Err(Error::InvalidSubBlockLength);
    }

    session.buffer.begin(epoch);
    session.classic.begin(block.tow_ms);

    let antenna = session.options.antenna().id();

    for _ in 0..n1 {
        let type1 = match reader.read_bytes(sb1_len) {
            Ok(bytes) => bytes,
            Err(_) => {
                debug!("meas-epoch: truncated type-1 sub-block");
                break;
            },
        };

        let chan = type1[0];
        let n2 = type1[19] as usize;
        let type2_size = n2 * sb2_len;
        if reader.remaining() < type2_size {
            debug!("meas-epoch: truncated type-2 sub-blocks");
            break;
        }

        if antenna_id(type1[1]) != antenna {
            reader.skip(type2_size)?;
            continue;
        }

        let satellite = decode_type1(session, block, type1)?;

        for _ in 0..n2 {
            let type2 = reader.read_bytes(sb2_len)?;
            if antenna_id(type2[0]) != antenna {
                continue;
            }
            decode_type2(session, block, chan, &satellite, type2)?;
        }
    }

    Ok(DecodeEvent::NoOp)
}

/// Refines the latest MeasEpoch with MeasExtra content
pub(crate) fn meas_extra(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let mut reader = Reader::new(&block.payload);

    let n = reader.read_u8()?;
    let sb_len = reader.read_u8()? as usize;
    let _doppler_var_factor = reader.read_bytes(4)?;

    if sb_len < MIN_EXTRA_LEN {
        error!("meas-extra: invalid sub-block length {}", sb_len);
        return Err(Error::InvalidSubBlockLength);
    }

    if session.classic.tow_ms != Some(block.tow_ms) {
        debug!("meas-extra: no matching meas-epoch");
        return Ok(DecodeEvent::NoOp);
    }

    let antenna = session.options.antenna().id();

    for _ in 0..n {
        let sub = match reader.read_bytes(sb_len) {
            Ok(bytes) => bytes,
            Err(_) => break,
        };

        let chan = sub[0];
        let type_byte = sub[1];
        let misc = sub[15];

        if antenna_id(type_byte) != antenna {
            continue;
        }

        let number = if type_byte & 0x1f == EXTENDED_SIGNAL {
            Utils::bits(misc as u32, 3, 5) as u8 + 32
        } else {
            type_byte & 0x1f
        };

        let hires = Utils::bits(misc as u32, 0, 3) as f64 * 0.03125;

        if let Some((sv, slot)) = session.classic.channels.get(&(chan, number)).copied() {
            if let Some(record) = session.buffer.get_mut(sv) {
                if let Some(obs) = record.slots.get_mut(slot) {
                    if let Some(snr) = obs.snr.as_mut() {
                        *snr += hires;
                    }
                }
            }
        }
    }

    Ok(DecodeEvent::NoOp)
}
