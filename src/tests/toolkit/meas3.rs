//! Meas3 block builders
use super::{encode, pack};
use crate::prelude::BlockID;

/// Meas3Ranges block header
pub fn block_header(constellations: u16, interval: u8) -> Vec<u8> {
    let mut buf = vec![0, 0];
    buf.extend_from_slice(&constellations.to_le_bytes());
    buf.push(interval & 0x0f);
    buf.push(0);
    buf
}

/// Constellation header builder
#[derive(Debug, Default, Clone)]
pub struct ConstellationHeader {
    pub sat_mask: u64,
    pub glo_channels: Option<Vec<i8>>,
    pub long_range: bool,
    pub excluded: Option<u16>,
}

impl ConstellationHeader {
    pub fn new(sat_mask: u64) -> Self {
        Self {
            sat_mask,
            ..Default::default()
        }
    }
    pub fn with_glo_channels(&self, channels: &[i8]) -> Self {
        let mut s = self.clone();
        s.glo_channels = Some(channels.to_vec());
        s
    }
    pub fn with_long_range(&self) -> Self {
        let mut s = self.clone();
        s.long_range = true;
        s
    }
    pub fn with_excluded(&self, excluded: u16) -> Self {
        let mut s = self.clone();
        s.excluded = Some(excluded);
        s
    }
    pub fn encode(&self) -> Vec<u8> {
        let mask_len = ((64 - self.sat_mask.leading_zeros() as usize) + 7) / 8;
        let mask_len = mask_len.max(1);

        let bf1 = pack(&[
            (mask_len as u32 - 1, 0, 3),
            (self.glo_channels.is_some() as u32, 3, 1),
            (self.long_range as u32, 4, 1),
            (self.excluded.is_some() as u32, 5, 1),
        ]);

        let mut buf = vec![bf1 as u8];
        buf.extend_from_slice(&self.sat_mask.to_le_bytes()[..mask_len]);

        if let Some(channels) = &self.glo_channels {
            for pair in channels.chunks(2) {
                let lo = (pair[0] + 8) as u8;
                let hi = pair.get(1).map(|k| (k + 8) as u8).unwrap_or(0);
                buf.push(lo | (hi << 4));
            }
        }

        if let Some(excluded) = self.excluded {
            buf.extend_from_slice(&excluded.to_le_bytes());
        }
        buf
    }
}

/// Header unchanged marker
pub fn unchanged_header() -> Vec<u8> {
    vec![0x40]
}

pub fn master_short(
    cmc: u32,
    lock: u8,
    cn0: u8,
    signal: u8,
    pr_lsb: u32,
    pr_rate: Option<i16>,
) -> Vec<u8> {
    let bf1 = pack(&[
        (0, 0, 2),
        (cmc, 2, 18),
        (lock as u32, 20, 3),
        (cn0 as u32, 23, 5),
        (pr_rate.is_some() as u32, 28, 1),
        (signal as u32, 29, 3),
    ]);
    let mut buf = bf1.to_le_bytes().to_vec();
    buf.extend_from_slice(&pr_lsb.to_le_bytes());
    if let Some(rate) = pr_rate {
        buf.extend_from_slice(&rate.to_le_bytes());
    }
    buf
}

#[allow(clippy::too_many_arguments)]
pub fn master_long(
    cmc: u32,
    lock: u8,
    signal: u8,
    pr_lsb: u32,
    pr_msb: u8,
    cn0: u8,
    slave_mask: u16,
    pr_rate: Option<i16>,
) -> Vec<u8> {
    let bf1 = pack(&[
        (1, 0, 2),
        (cmc, 2, 22),
        (lock as u32, 24, 4),
        (signal as u32, 28, 4),
    ]);
    let continued = slave_mask >> 9 != 0;
    let bf2 = pack(&[
        (pr_msb as u32, 0, 4),
        (cn0 as u32, 4, 6),
        (pr_rate.is_some() as u32, 10, 1),
        (continued as u32, 11, 1),
        (slave_mask as u32, 12, 9),
    ]);
    let mut buf = bf1.to_le_bytes().to_vec();
    buf.extend_from_slice(&pr_lsb.to_le_bytes());
    buf.extend_from_slice(&bf2.to_le_bytes());
    if continued {
        buf.push((slave_mask >> 9) as u8 & 0x7f);
    }
    if let Some(rate) = pr_rate {
        buf.extend_from_slice(&rate.to_le_bytes());
    }
    buf
}

pub fn master_short_delta(pr_offset: u32, cmc_offset: u32, cn0_delta: u8, lock_reset: bool) -> Vec<u8> {
    pack(&[
        (2, 0, 2),
        (pr_offset, 2, 14),
        (cmc_offset, 16, 12),
        (cn0_delta as u32, 28, 3),
        (lock_reset as u32, 31, 1),
    ])
    .to_le_bytes()
    .to_vec()
}

pub fn master_long_delta(pr_offset: u32, cmc_offset: u32, cn0_delta: u8, lock_reset: bool) -> Vec<u8> {
    let bf1 = pack(&[(3, 0, 2), (pr_offset, 2, 17), (cmc_offset, 19, 13)]);
    let bf2 = pack(&[(cn0_delta as u32, 0, 5), (lock_reset as u32, 5, 1)]);
    let mut buf = bf1.to_le_bytes().to_vec();
    buf.push(bf2 as u8);
    buf
}

pub fn slave_short(pr_offset: u32, phase_offset: u32, cn0: u8, lock: u8) -> Vec<u8> {
    let bf1 = pack(&[(1, 0, 1), (pr_offset, 1, 14), (phase_offset, 15, 17)]);
    let bf2 = pack(&[(cn0 as u32, 0, 5), (lock as u32, 5, 3)]);
    let mut buf = bf1.to_le_bytes().to_vec();
    buf.push(bf2 as u8);
    buf
}

pub fn slave_long(pr_offset: u32, lock: u8, cn0: u8, phase_offset: i32) -> Vec<u8> {
    let bf1 = pack(&[
        (0, 0, 2),
        (pr_offset, 2, 18),
        (lock as u32, 20, 4),
        (cn0 as u32, 24, 6),
    ]);
    let mut buf = bf1.to_le_bytes().to_vec();
    buf.extend_from_slice(&phase_offset.to_le_bytes());
    buf
}

pub fn slave_delta(pr_offset: u32, cmc_offset: u32, cn0_delta: u8, lock_reset: bool) -> Vec<u8> {
    pack(&[
        (2, 0, 2),
        (pr_offset, 2, 13),
        (cmc_offset, 15, 13),
        (cn0_delta as u32, 28, 3),
        (lock_reset as u32, 31, 1),
    ])
    .to_le_bytes()
    .to_vec()
}

/// Encodes a Meas3Ranges block from its sections
pub fn ranges(tow_ms: u32, sections: &[Vec<u8>]) -> Vec<u8> {
    encode(BlockID::Meas3Ranges, tow_ms, &sections.concat())
}

/// Encodes a Meas3Doppler block, one rate per satellite [1/64 mm/s]
pub fn doppler(tow_ms: u32, rates: &[i32]) -> Vec<u8> {
    let payload = rates
        .iter()
        .flat_map(|rate| rate.to_le_bytes())
        .collect::<Vec<_>>();
    encode(BlockID::Meas3Doppler, tow_ms, &payload)
}

/// Encodes a Meas3CN0HiRes block, one nibble per signal
pub fn cn0_hires(tow_ms: u32, nibbles: &[u8]) -> Vec<u8> {
    let payload = nibbles
        .chunks(2)
        .map(|pair| (pair[0] & 0x0f) | (pair.get(1).copied().unwrap_or(0) << 4))
        .collect::<Vec<_>>();
    encode(BlockID::Meas3CN0HiRes, tow_ms, &payload)
}
