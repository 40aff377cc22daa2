//! Constellation and satellite identification
use std::collections::HashMap;

use gnss::prelude::{Constellation, SV};
use log::debug;

use crate::Error;

/// Range checked constellation index, as used by the Meas3 blocks:
/// 0: GPS, 1: Glonass, 2: Galileo, 3: BeiDou, 4: SBAS, 5: QZSS, 6: IRNSS
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstellationIndex(u8);

impl ConstellationIndex {
    /// Number of constellations a Meas3 block may describe
    pub const COUNT: usize = 7;

    pub fn new(index: u8) -> Result<Self, Error> {
        if (index as usize) < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(Error::SignalResolution)
        }
    }
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    pub fn constellation(&self) -> Constellation {
        match self.0 {
            0 => Constellation::GPS,
            1 => Constellation::Glonass,
            2 => Constellation::Galileo,
            3 => Constellation::BeiDou,
            4 => Constellation::SBAS,
            5 => Constellation::QZSS,
            _ => Constellation::IRNSS,
        }
    }
    /// Iterates all constellation indexes
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

/// Range checked satellite index, within one constellation [0, 64)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SatIndex(u8);

impl SatIndex {
    /// Satellites per constellation
    pub const COUNT: usize = 64;

    pub fn new(index: u8) -> Result<Self, Error> {
        if (index as usize) < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(Error::SignalResolution)
        }
    }
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    /// Converts to [SV]
    pub fn to_sv(&self, constellation: ConstellationIndex) -> SV {
        match constellation.constellation() {
            Constellation::SBAS => SV::new(Constellation::SBAS, self.0 + 20),
            c => SV::new(c, self.0 + 1),
        }
    }
}

/// Glonass frequency channel numbers, per slot
#[derive(Debug, Default, Clone)]
pub struct GlonassChannels {
    channels: HashMap<u8, i8>,
}

impl GlonassChannels {
    /// Valid channel numbers
    const RANGE: std::ops::RangeInclusive<i8> = -7..=6;

    /// Stores the channel number of this satellite. Out of range values are dropped.
    pub fn insert(&mut self, sv: SV, channel: i8) {
        if sv.constellation != Constellation::Glonass {
            return;
        }
        if Self::RANGE.contains(&channel) {
            if let Some(prev) = self.channels.insert(sv.prn, channel) {
                if prev != channel {
                    debug!("{} - frequency channel changed {} -> {}", sv, prev, channel);
                }
            }
        } else {
            debug!("{} - invalid frequency channel {}", sv, channel);
        }
    }
    /// Returns the channel number of this satellite, when known
    pub fn get(&self, sv: SV) -> Option<i8> {
        if sv.constellation == Constellation::Glonass {
            self.channels.get(&sv.prn).copied()
        } else {
            None
        }
    }
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

/// Converts an SBF SVID to [SV]. Returns None for L-band,
/// unknown GLONASS slots and reserved values.
pub fn sv_from_svid(svid: u8) -> Option<SV> {
    match svid {
        1..=37 => Some(SV::new(Constellation::GPS, svid)),
        38..=61 => Some(SV::new(Constellation::Glonass, svid - 37)),
        63..=68 => Some(SV::new(Constellation::Glonass, svid - 38)),
        71..=106 => Some(SV::new(Constellation::Galileo, svid - 70)),
        120..=140 => Some(SV::new(Constellation::SBAS, svid - 100)),
        141..=180 => Some(SV::new(Constellation::BeiDou, svid - 140)),
        181..=190 => Some(SV::new(Constellation::QZSS, svid - 180)),
        191..=197 => Some(SV::new(Constellation::IRNSS, svid - 190)),
        198..=215 => Some(SV::new(Constellation::SBAS, svid - 157)),
        216..=222 => Some(SV::new(Constellation::IRNSS, svid - 208)),
        223..=245 => Some(SV::new(Constellation::BeiDou, svid - 182)),
        _ => None,
    }
}
