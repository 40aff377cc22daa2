//! Decoder options
use std::collections::HashMap;
use std::str::FromStr;

use gnss::prelude::Constellation;
use log::debug;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::signal::{ObsCode, SignalInfo, MAX_EXTRA_SLOTS};

/// Options parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("invalid extra slots count \"{0}\"")]
    ExtraSlots(String),
    #[error("{0} {1} can't be preferred on a frequency slot")]
    NotPreferable(Constellation, ObsCode),
}

/// Receiver antenna to decode measurements from
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Antenna {
    /// Main antenna
    #[default]
    Main,
    /// First auxiliary antenna
    Aux1,
    /// Second auxiliary antenna
    Aux2,
}

impl Antenna {
    /// Antenna identifier, as encoded in measurement blocks
    pub(crate) fn id(&self) -> u8 {
        match self {
            Self::Main => 0,
            Self::Aux1 => 1,
            Self::Aux2 => 2,
        }
    }
}

/// [DecoderOptions] customize the decoding session.
/// They are either built programmatically or parsed from
/// the usual receiver option string:
/// ```
/// use sbf_rnx::prelude::*;
/// use std::str::FromStr;
///
/// let options = DecoderOptions::from_str("-AUX1 -EL7Q -EXOBS=2")
///     .unwrap();
///
/// assert_eq!(options.antenna(), Antenna::Aux1);
/// assert_eq!(options.extra_slots(), 2);
///
/// let options = DecoderOptions::default()
///     .with_antenna(Antenna::Aux1)
///     .with_extra_slots(2);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecoderOptions {
    antenna: Antenna,
    all_ephemerides: bool,
    extra_slots: usize,
    preferred: HashMap<(Constellation, usize), ObsCode>,
}

impl DecoderOptions {
    /// Selects the receiver [Antenna]
    pub fn with_antenna(&self, antenna: Antenna) -> Self {
        let mut s = self.clone();
        s.antenna = antenna;
        s
    }
    /// Forward every ephemeris, including unchanged ones
    pub fn with_all_ephemerides(&self) -> Self {
        let mut s = self.clone();
        s.all_ephemerides = true;
        s
    }
    /// Sets the number of extra observation slots, bounded to 3
    pub fn with_extra_slots(&self, extra_slots: usize) -> Self {
        let mut s = self.clone();
        s.extra_slots = extra_slots.min(MAX_EXTRA_SLOTS);
        s
    }
    /// Prefers this [ObsCode] on its frequency slot.
    /// Codes that do not belong to a frequency slot are ignored.
    pub fn with_preferred_code(&self, constellation: Constellation, code: ObsCode) -> Self {
        let mut s = self.clone();
        if let Some(slot) = SignalInfo::find(constellation, code).and_then(|info| info.band_slot) {
            s.preferred.insert((constellation, slot), code);
        }
        s
    }

    pub fn antenna(&self) -> Antenna {
        self.antenna
    }
    pub fn all_ephemerides(&self) -> bool {
        self.all_ephemerides
    }
    pub fn extra_slots(&self) -> usize {
        self.extra_slots
    }
    /// Preferred code for this frequency slot, if any
    pub fn preferred_code(&self, constellation: Constellation, slot: usize) -> Option<ObsCode> {
        self.preferred.get(&(constellation, slot)).copied()
    }
}

fn constellation_letter(letter: char) -> Option<Constellation> {
    match letter {
        'G' => Some(Constellation::GPS),
        'R' => Some(Constellation::Glonass),
        'E' => Some(Constellation::Galileo),
        'C' => Some(Constellation::BeiDou),
        'S' => Some(Constellation::SBAS),
        'J' => Some(Constellation::QZSS),
        'I' => Some(Constellation::IRNSS),
        _ => None,
    }
}

/// Parses a "-<S>L<code>" token. Tokens of other shapes,
/// or with an unknown constellation or code, belong to other receivers.
fn priority_token(token: &str) -> Option<(Constellation, ObsCode)> {
    let chars = token.chars().collect::<Vec<_>>();
    if chars.len() != 5 || chars[0] != '-' || chars[2] != 'L' {
        return None;
    }
    let constellation = constellation_letter(chars[1])?;
    let code = ObsCode::from_str(&chars[3..].iter().collect::<String>()).ok()?;
    Some((constellation, code))
}

impl FromStr for DecoderOptions {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = Self::default();
        for token in s.split_ascii_whitespace() {
            if token == "-AUX1" {
                options.antenna = Antenna::Aux1;
            } else if token == "-AUX2" {
                options.antenna = Antenna::Aux2;
            } else if token == "-EPHALL" {
                options.all_ephemerides = true;
            } else if let Some(value) = token.strip_prefix("-EXOBS=") {
                let n = value
                    .parse::<usize>()
                    .map_err(|_| ParsingError::ExtraSlots(value.to_string()))?;
                if n > MAX_EXTRA_SLOTS {
                    return Err(ParsingError::ExtraSlots(value.to_string()));
                }
                options.extra_slots = n;
            } else if let Some((constellation, code)) = priority_token(token) {
                let slot = SignalInfo::find(constellation, code)
                    .and_then(|info| info.band_slot)
                    .ok_or(ParsingError::NotPreferable(constellation, code))?;
                options.preferred.insert((constellation, slot), code);
            } else {
                debug!("ignored option \"{}\"", token);
            }
        }
        Ok(options)
    }
}
