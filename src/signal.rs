//! Signal numbers, observation codes and frequency slot resolution
use std::fmt;
use std::str::FromStr;

use gnss::prelude::Constellation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{constants::Constants, options::DecoderOptions};

/// Number of frequency slots (L1/E1/B1, L2/E5b/B2, L5/E5a/B2a..).
/// Extra slots follow, starting at this index.
pub const NB_FREQ_SLOTS: usize = 3;

/// Maximum number of extra slots
pub const MAX_EXTRA_SLOTS: usize = 3;

/// [ObsCode] is a two-character observation code, like "1C" or "2W":
/// carrier band then tracking attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObsCode {
    /// Carrier band, as a digit
    pub band: char,
    /// Tracking mode / channel attribute
    pub attribute: char,
}

impl ObsCode {
    pub const fn new(band: char, attribute: char) -> Self {
        Self { band, attribute }
    }
}

impl fmt::Display for ObsCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.band, self.attribute)
    }
}

impl FromStr for ObsCode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let band = chars.next().ok_or(())?;
        let attribute = chars.next().ok_or(())?;
        if chars.next().is_some() || !band.is_ascii_digit() || !attribute.is_ascii_alphabetic() {
            return Err(());
        }
        Ok(Self::new(band, attribute.to_ascii_uppercase()))
    }
}

/// [SignalInfo] describes one SBF signal number
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SignalInfo {
    /// SBF signal number
    pub number: u8,
    pub constellation: Constellation,
    pub code: ObsCode,
    /// Frequency slot this signal belongs to, if any
    pub band_slot: Option<usize>,
    /// True if this is the default choice for its frequency slot
    pub primary: bool,
    /// Position among the extra slots, when not placed on its band slot
    pub extra_offset: Option<usize>,
}

const fn primary(number: u8, constellation: Constellation, code: ObsCode, slot: usize) -> Option<SignalInfo> {
    Some(SignalInfo {
        number,
        constellation,
        code,
        band_slot: Some(slot),
        primary: true,
        extra_offset: None,
    })
}

const fn secondary(
    number: u8,
    constellation: Constellation,
    code: ObsCode,
    slot: Option<usize>,
    offset: usize,
) -> Option<SignalInfo> {
    Some(SignalInfo {
        number,
        constellation,
        code,
        band_slot: slot,
        primary: false,
        extra_offset: Some(offset),
    })
}

/// Signal numbers [0, 40)
pub const NB_SIGNALS: usize = 40;

const SIGNALS: [Option<SignalInfo>; NB_SIGNALS] = {
    use Constellation::*;
    [
        primary(0, GPS, ObsCode::new('1', 'C'), 0),
        secondary(1, GPS, ObsCode::new('1', 'W'), Some(0), 0),
        primary(2, GPS, ObsCode::new('2', 'W'), 1),
        secondary(3, GPS, ObsCode::new('2', 'L'), Some(1), 1),
        primary(4, GPS, ObsCode::new('5', 'Q'), 2),
        secondary(5, GPS, ObsCode::new('1', 'L'), Some(0), 2),
        primary(6, QZSS, ObsCode::new('1', 'C'), 0),
        primary(7, QZSS, ObsCode::new('2', 'L'), 1),
        primary(8, Glonass, ObsCode::new('1', 'C'), 0),
        secondary(9, Glonass, ObsCode::new('1', 'P'), Some(0), 0),
        secondary(10, Glonass, ObsCode::new('2', 'P'), Some(1), 1),
        primary(11, Glonass, ObsCode::new('2', 'C'), 1),
        primary(12, Glonass, ObsCode::new('3', 'Q'), 2),
        secondary(13, BeiDou, ObsCode::new('1', 'P'), None, 1),
        primary(14, BeiDou, ObsCode::new('5', 'P'), 2),
        primary(15, IRNSS, ObsCode::new('5', 'A'), 2),
        None,
        primary(17, Galileo, ObsCode::new('1', 'C'), 0),
        None,
        secondary(19, Galileo, ObsCode::new('6', 'C'), None, 1),
        primary(20, Galileo, ObsCode::new('5', 'Q'), 2),
        primary(21, Galileo, ObsCode::new('7', 'Q'), 1),
        secondary(22, Galileo, ObsCode::new('8', 'Q'), None, 0),
        // L-band
        None,
        primary(24, SBAS, ObsCode::new('1', 'C'), 0),
        primary(25, SBAS, ObsCode::new('5', 'I'), 2),
        primary(26, QZSS, ObsCode::new('5', 'Q'), 2),
        secondary(27, QZSS, ObsCode::new('6', 'L'), None, 1),
        primary(28, BeiDou, ObsCode::new('2', 'I'), 0),
        primary(29, BeiDou, ObsCode::new('7', 'I'), 1),
        secondary(30, BeiDou, ObsCode::new('6', 'I'), None, 0),
        // extended signal number marker
        None,
        secondary(32, QZSS, ObsCode::new('1', 'L'), Some(0), 0),
        secondary(33, QZSS, ObsCode::new('1', 'Z'), Some(0), 2),
        secondary(34, BeiDou, ObsCode::new('7', 'D'), Some(1), 2),
        None,
        None,
        None,
        None,
        None,
    ]
};

impl SignalInfo {
    /// Looks up a signal number. Reserved and unsupported numbers
    /// return None.
    pub fn from_number(number: u8) -> Option<Self> {
        SIGNALS.get(number as usize).copied().flatten()
    }

    /// Looks up a signal by [Constellation] and [ObsCode]
    pub fn find(constellation: Constellation, code: ObsCode) -> Option<Self> {
        SIGNALS
            .iter()
            .flatten()
            .find(|info| info.constellation == constellation && info.code == code)
            .copied()
    }

    /// Carrier frequency in Hz. Glonass FDMA signals require the
    /// frequency channel number.
    pub fn frequency(&self, glo_channel: Option<i8>) -> Option<f64> {
        carrier_frequency(self.constellation, self.code.band, glo_channel)
    }

    /// Carrier wavelength in meters
    pub fn wavelength(&self, glo_channel: Option<i8>) -> Option<f64> {
        let freq = self.frequency(glo_channel)?;
        Some(Constants::SPEED_OF_LIGHT_M_S / freq)
    }
}

/// Carrier frequency (Hz) of given band for given [Constellation]
pub fn carrier_frequency(
    constellation: Constellation,
    band: char,
    glo_channel: Option<i8>,
) -> Option<f64> {
    match constellation {
        Constellation::GPS | Constellation::QZSS | Constellation::SBAS => match band {
            '1' => Some(1575.42e6),
            '2' => Some(1227.60e6),
            '5' => Some(1176.45e6),
            '6' => Some(1278.75e6),
            _ => None,
        },
        Constellation::Glonass => match band {
            '1' => {
                let k = glo_channel? as f64;
                Some(Constants::GLO_G1_BASE_HZ + k * Constants::GLO_G1_STEP_HZ)
            },
            '2' => {
                let k = glo_channel? as f64;
                Some(Constants::GLO_G2_BASE_HZ + k * Constants::GLO_G2_STEP_HZ)
            },
            '3' => Some(1202.025e6),
            _ => None,
        },
        Constellation::Galileo => match band {
            '1' => Some(1575.42e6),
            '5' => Some(1176.45e6),
            '7' => Some(1207.14e6),
            '8' => Some(1191.795e6),
            '6' => Some(1278.75e6),
            _ => None,
        },
        Constellation::BeiDou => match band {
            '2' => Some(1561.098e6),
            '1' => Some(1575.42e6),
            '5' => Some(1176.45e6),
            '7' => Some(1207.14e6),
            '6' => Some(1268.52e6),
            _ => None,
        },
        Constellation::IRNSS => match band {
            '5' => Some(1176.45e6),
            _ => None,
        },
        _ => None,
    }
}

/// Resolves an SBF signal number to its observation slot.
/// Returns the slot index (frequency slots first, then extra slots)
/// and the signal description, or None when this signal is not stored:
/// unknown or reserved signal, constellation mismatch, or no room
/// left in the extra slots.
pub fn resolve_signal(
    constellation: Constellation,
    number: u8,
    options: &DecoderOptions,
) -> Option<(usize, SignalInfo)> {
    let info = SignalInfo::from_number(number)?;
    if info.constellation != constellation {
        return None;
    }

    let offset = match info.band_slot {
        Some(slot) => match options.preferred_code(constellation, slot) {
            Some(code) if code == info.code => return Some((slot, info)),
            Some(code) => {
                if info.primary {
                    // demoted primary takes the overriding code's place
                    SignalInfo::find(constellation, code)?.extra_offset?
                } else {
                    info.extra_offset?
                }
            },
            None => {
                if info.primary {
                    return Some((slot, info));
                }
                info.extra_offset?
            },
        },
        None => info.extra_offset?,
    };

    if offset < options.extra_slots() {
        Some((NB_FREQ_SLOTS + offset, info))
    } else {
        None
    }
}
