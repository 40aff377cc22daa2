//! Meas3Ranges block and constellation headers
use log::error;

use crate::{
    constellation::{ConstellationIndex, SatIndex},
    meas3::table::SignalTable,
    utils::{Reader, Utils},
    Error,
};

/// Reference intervals [ms], indexed by the 4 bit interval field
const INTERVALS_MS: [u32; 10] = [1, 500, 1000, 2000, 5000, 10000, 15000, 30000, 60000, 120000];

/// [ReferenceInterval] is the period of reference epochs,
/// when full measurements are transmitted.
/// ```
/// use sbf_rnx::prelude::*;
///
/// let interval = ReferenceInterval::from_index(4)
///     .unwrap();
///
/// assert_eq!(interval.millis(), 5000);
/// assert!(interval.is_boundary(10_000));
/// assert_eq!(interval.window_start(11_000), 10_000);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReferenceInterval(u32);

impl ReferenceInterval {
    /// Decodes the 4 bit interval field
    pub fn from_index(index: u8) -> Result<Self, Error> {
        match INTERVALS_MS.get(index as usize) {
            Some(ms) => Ok(Self(*ms)),
            None => {
                error!("meas3: reserved reference interval #{}", index);
                Err(Error::VersionError(index))
            },
        }
    }
    /// Interval duration [ms]
    pub fn millis(&self) -> u32 {
        self.0
    }
    /// Returns true when this TOW is a reference epoch
    pub fn is_boundary(&self, tow_ms: u32) -> bool {
        tow_ms % self.0 == 0
    }
    /// TOW of the reference epoch this TOW refers to
    pub fn window_start(&self, tow_ms: u32) -> u32 {
        tow_ms - tow_ms % self.0
    }
}

/// Meas3Ranges block header
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct BlockHeader {
    pub constellations: u16,
    pub interval: ReferenceInterval,
}

impl BlockHeader {
    /// Highest supported data format version
    const VERSION: u8 = 0;

    pub fn decode(reader: &mut Reader) -> Result<Self, Error> {
        let _common_flags = reader.read_u8()?;
        let _clk_jumps = reader.read_u8()?;
        let constellations = reader.read_u16()?;
        let misc = reader.read_u8()? as u32;
        let _reserved = reader.read_u8()?;

        let version = Utils::bits(misc, 4, 3) as u8;
        if version != Self::VERSION {
            error!("meas3: unsupported data format version {}", version);
            return Err(Error::VersionError(version));
        }

        if constellations >> ConstellationIndex::COUNT != 0 {
            error!("meas3: unknown constellations 0x{:04x}", constellations);
            return Err(Error::VersionError(version));
        }

        let interval = ReferenceInterval::from_index(Utils::bits(misc, 0, 4) as u8)?;

        Ok(Self {
            constellations,
            interval,
        })
    }

    /// Iterates the constellations this block describes
    pub fn constellations(&self) -> impl Iterator<Item = ConstellationIndex> + '_ {
        ConstellationIndex::all().filter(|c| self.constellations & (1 << c.index()) > 0)
    }
}

/// Constellation section header: satellites and signal table
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConstellationHeader {
    pub sat_mask: u64,
    /// Glonass frequency channel of each present satellite
    pub glo_channels: Vec<i8>,
    pub long_range: bool,
    pub table: SignalTable,
}

/// Result of a constellation header decoding
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HeaderContent {
    New(ConstellationHeader),
    /// Same header as the previous block
    Unchanged,
}

impl ConstellationHeader {
    pub fn decode(reader: &mut Reader, constellation: ConstellationIndex) -> Result<HeaderContent, Error> {
        let bf1 = reader.read_u8()? as u32;
        if Utils::bits(bf1, 6, 1) > 0 {
            return Ok(HeaderContent::Unchanged);
        }

        let mask_len = Utils::bits(bf1, 0, 3) as usize + 1;
        let mut sat_mask = 0_u64;
        for (i, byte) in reader.read_bytes(mask_len)?.iter().enumerate() {
            sat_mask |= (*byte as u64) << (8 * i);
        }

        let nb_sats = sat_mask.count_ones() as usize;

        let mut glo_channels = Vec::new();
        if Utils::bits(bf1, 3, 1) > 0 {
            let bytes = reader.read_bytes((nb_sats + 1) / 2)?;
            for i in 0..nb_sats {
                let nibble = (bytes[i / 2] >> (4 * (i % 2))) & 0x0f;
                glo_channels.push(nibble as i8 - 8);
            }
        }

        let long_range = Utils::bits(bf1, 4, 1) > 0;

        let excluded = if Utils::bits(bf1, 5, 1) > 0 {
            reader.read_u16()?
        } else {
            0
        };

        Ok(HeaderContent::New(Self {
            sat_mask,
            glo_channels,
            long_range,
            table: SignalTable::new(constellation.constellation(), excluded),
        }))
    }

    /// Iterates present satellites, with their Glonass channel
    pub fn satellites(&self) -> impl Iterator<Item = (SatIndex, Option<i8>)> + '_ {
        (0..SatIndex::COUNT as u8)
            .filter(|i| self.sat_mask & (1 << i) > 0)
            .filter_map(|i| SatIndex::new(i).ok())
            .enumerate()
            .map(|(nth, sat)| (sat, self.glo_channels.get(nth).copied()))
    }
}
