//! SBF: Septentrio Binary Format measurement decoding.
//!
//! This crate turns an SBF byte stream (serial port, TCP socket or file)
//! into per-satellite [ObservationEpoch]s ready for a positioning engine.
//! It handles:
//!  - block synchronization and CRC validation
//!  - classic MeasEpoch / MeasExtra measurement blocks
//!  - the Meas3 "reference epoch + delta" compressed measurement blocks
//!  - signal selection into frequency slots, with user priorities
//!  - navigation blocks forwarding
//!
//! ```
//! use sbf_rnx::prelude::{Decoder, DecodeEvent, DecoderOptions};
//! use std::str::FromStr;
//!
//! let options = DecoderOptions::from_str("-AUX1 -GL1W")
//!     .unwrap();
//!
//! let mut decoder = Decoder::new(options);
//!
//! // bytes read from your serial port, socket or file
//! let bytes = [0x24, 0x40, 0x00, 0x00];
//!
//! for event in decoder.push_bytes(&bytes) {
//!     match event {
//!         DecodeEvent::ObservationEpoch(epoch) => {
//!             // hand over to the navigation filter
//!         },
//!         DecodeEvent::NavigationMessage(msg) => {
//!             // hand over to the ephemeris decoders
//!         },
//!         _ => {},
//!     }
//! }
//! ```
extern crate gnss_rs as gnss;

use thiserror::Error;

mod block;
mod checksum;
mod classic;
mod constellation;
mod decoder;
mod meas3;
mod navigation;
mod observation;
mod options;
mod signal;
mod stream;
mod sync;

pub(crate) mod constants;
pub(crate) mod utils;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::block::{BlockID, RawBlock};
    pub use crate::checksum::Checksum;
    pub use crate::decoder::{DecodeEvent, Decoder};
    pub use crate::meas3::{ReferenceInterval, SignalTable};
    pub use crate::navigation::NavigationMessage;
    pub use crate::observation::{
        LliFlags, ObservationEpoch, ObservationRecord, SlotObservation, MAX_OBSERVATIONS,
        MAX_SLOTS,
    };
    pub use crate::options::{Antenna, DecoderOptions, ParsingError};
    pub use crate::signal::{resolve_signal, ObsCode, SignalInfo};
    pub use crate::stream::Stream;
    pub use crate::Error;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Epoch, TimeScale};
}

/// Errors raised while decoding an SBF stream.
/// None of them is fatal to the decoding session: the block
/// (or sub-record) is dropped and decoding resumes.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not enough bytes available")]
    NotEnoughBytes,
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("no SYNC marker found")]
    NoSyncByte,
    #[error("bad crc: expected 0x{expected:04X}, got 0x{found:04X}")]
    ChecksumError { expected: u16, found: u16 },
    #[error("invalid block length: {0}")]
    InvalidLength(u16),
    #[error("invalid time of week or week number")]
    TimeError,
    #[error("unsupported data format version: {0}")]
    VersionError(u8),
    #[error("invalid sub-block length")]
    InvalidSubBlockLength,
    #[error("unresolved signal")]
    SignalResolution,
    #[error("missing reference epoch")]
    ReferenceMissing,
}

impl Error {
    /// Returns true if this [Error] is related to the framing layer,
    /// in which case the entire block was discarded.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::NoSyncByte | Self::ChecksumError { .. } | Self::InvalidLength(_) | Self::TimeError
        )
    }
}
