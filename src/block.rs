//! SBF block framing
use hifitime::prelude::{Epoch, TimeScale};

use crate::{checksum::Checksum, constants::Constants, utils::Utils, Error};

/// [BlockID] is the block number, found in the 13 LSB of the ID field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlockID {
    /// Classic measurements: Type-1 and Type-2 sub-blocks
    MeasEpoch,
    /// Extra measurement information (high resolution CN0..)
    MeasExtra,
    /// End of measurement epoch marker
    EndOfMeas,
    /// Compressed measurements, main block
    Meas3Ranges,
    /// Compressed measurements, fractional C/N0
    Meas3CN0HiRes,
    /// Compressed measurements, Doppler
    Meas3Doppler,
    /// Compressed measurements, post processing flags
    Meas3PP,
    /// Compressed measurements, multipath corrections
    Meas3MP,
    /// GPS C/A navigation subframe
    GPSRawCA,
    /// GPS L2C navigation frame
    GPSRawL2C,
    /// GPS L5 navigation frame
    GPSRawL5,
    /// SBAS L1 navigation message
    GEORawL1,
    /// Galileo F/NAV navigation page
    GALRawFNAV,
    /// Galileo I/NAV navigation page
    GALRawINAV,
    /// Galileo C/NAV navigation page
    GALRawCNAV,
    /// GLONASS C/A navigation string
    GLORawCA,
    /// BeiDou navigation page
    BDSRaw,
    /// QZSS L1 C/A subframe
    QZSRawL1CA,
    /// NavIC/IRNSS subframe
    NAVICRaw,
    /// Decoded GPS ephemeris
    GPSNav,
    /// Decoded GPS almanac
    GPSAlm,
    /// GPS ionosphere model
    GPSIon,
    /// GPS-UTC parameters
    GPSUtc,
    /// Decoded GLONASS ephemeris
    GLONav,
    /// Decoded GLONASS almanac
    GLOAlm,
    /// GLONASS time parameters
    GLOTime,
    /// Decoded Galileo ephemeris
    GALNav,
    /// Decoded Galileo almanac
    GALAlm,
    /// Galileo ionosphere model
    GALIon,
    /// Galileo-UTC parameters
    GALUtc,
    /// GST-GPS time offset
    GALGstGps,
    /// Decoded BeiDou ephemeris
    BDSNav,
    /// BeiDou ionosphere model
    BDSIon,
    /// BeiDou-UTC parameters
    BDSUtc,
    /// Decoded QZSS ephemeris
    QZSNav,
    /// Decoded QZSS almanac
    QZSAlm,
    /// Any other block number
    Unknown(u16),
}

impl From<u16> for BlockID {
    fn from(val: u16) -> Self {
        match val & 0x1fff {
            4027 => Self::MeasEpoch,
            4000 => Self::MeasExtra,
            5922 => Self::EndOfMeas,
            4109 => Self::Meas3Ranges,
            4110 => Self::Meas3CN0HiRes,
            4111 => Self::Meas3Doppler,
            4112 => Self::Meas3PP,
            4113 => Self::Meas3MP,
            4017 => Self::GPSRawCA,
            4018 => Self::GPSRawL2C,
            4019 => Self::GPSRawL5,
            4020 => Self::GEORawL1,
            4022 => Self::GALRawFNAV,
            4023 => Self::GALRawINAV,
            4024 => Self::GALRawCNAV,
            4026 => Self::GLORawCA,
            4047 => Self::BDSRaw,
            4066 => Self::QZSRawL1CA,
            4093 => Self::NAVICRaw,
            5891 => Self::GPSNav,
            5892 => Self::GPSAlm,
            5893 => Self::GPSIon,
            5894 => Self::GPSUtc,
            4004 => Self::GLONav,
            4005 => Self::GLOAlm,
            4036 => Self::GLOTime,
            4002 => Self::GALNav,
            4003 => Self::GALAlm,
            4030 => Self::GALIon,
            4031 => Self::GALUtc,
            4032 => Self::GALGstGps,
            4081 => Self::BDSNav,
            4120 => Self::BDSIon,
            4121 => Self::BDSUtc,
            4095 => Self::QZSNav,
            4116 => Self::QZSAlm,
            n => Self::Unknown(n),
        }
    }
}

impl From<BlockID> for u16 {
    fn from(val: BlockID) -> u16 {
        match val {
            BlockID::MeasEpoch => 4027,
            BlockID::MeasExtra => 4000,
            BlockID::EndOfMeas => 5922,
            BlockID::Meas3Ranges => 4109,
            BlockID::Meas3CN0HiRes => 4110,
            BlockID::Meas3Doppler => 4111,
            BlockID::Meas3PP => 4112,
            BlockID::Meas3MP => 4113,
            BlockID::GPSRawCA => 4017,
            BlockID::GPSRawL2C => 4018,
            BlockID::GPSRawL5 => 4019,
            BlockID::GEORawL1 => 4020,
            BlockID::GALRawFNAV => 4022,
            BlockID::GALRawINAV => 4023,
            BlockID::GALRawCNAV => 4024,
            BlockID::GLORawCA => 4026,
            BlockID::BDSRaw => 4047,
            BlockID::QZSRawL1CA => 4066,
            BlockID::NAVICRaw => 4093,
            BlockID::GPSNav => 5891,
            BlockID::GPSAlm => 5892,
            BlockID::GPSIon => 5893,
            BlockID::GPSUtc => 5894,
            BlockID::GLONav => 4004,
            BlockID::GLOAlm => 4005,
            BlockID::GLOTime => 4036,
            BlockID::GALNav => 4002,
            BlockID::GALAlm => 4003,
            BlockID::GALIon => 4030,
            BlockID::GALUtc => 4031,
            BlockID::GALGstGps => 4032,
            BlockID::BDSNav => 4081,
            BlockID::BDSIon => 4120,
            BlockID::BDSUtc => 4121,
            BlockID::QZSNav => 4095,
            BlockID::QZSAlm => 4116,
            BlockID::Unknown(n) => n & 0x1fff,
        }
    }
}

impl BlockID {
    /// Returns true if this block is a navigation block,
    /// forwarded to the ephemeris decoders.
    pub fn is_navigation(&self) -> bool {
        self.is_raw_navigation() || self.is_decoded_navigation()
    }
    /// Raw navigation bits (subframes, pages, strings)
    pub fn is_raw_navigation(&self) -> bool {
        matches!(
            self,
            Self::GPSRawCA
                | Self::GPSRawL2C
                | Self::GPSRawL5
                | Self::GEORawL1
                | Self::GALRawFNAV
                | Self::GALRawINAV
                | Self::GALRawCNAV
                | Self::GLORawCA
                | Self::BDSRaw
                | Self::QZSRawL1CA
                | Self::NAVICRaw
        )
    }
    /// Receiver-decoded navigation content
    pub fn is_decoded_navigation(&self) -> bool {
        matches!(
            self,
            Self::GPSNav
                | Self::GPSAlm
                | Self::GPSIon
                | Self::GPSUtc
                | Self::GLONav
                | Self::GLOAlm
                | Self::GLOTime
                | Self::GALNav
                | Self::GALAlm
                | Self::GALIon
                | Self::GALUtc
                | Self::GALGstGps
                | Self::BDSNav
                | Self::BDSIon
                | Self::BDSUtc
                | Self::QZSNav
                | Self::QZSAlm
        )
    }
    /// Returns true if the first payload byte of this block is an SVID
    pub(crate) fn has_svid(&self) -> bool {
        self.is_raw_navigation()
            || matches!(
                self,
                Self::GPSNav
                    | Self::GPSAlm
                    | Self::GLONav
                    | Self::GLOAlm
                    | Self::GALNav
                    | Self::GALAlm
                    | Self::BDSNav
                    | Self::QZSNav
                    | Self::QZSAlm
            )
    }
}

/// [RawBlock] is one checksum-validated SBF block.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    /// [BlockID]
    pub id: BlockID,
    /// Block revision (3 MSB of the ID field)
    pub revision: u8,
    /// Time of week [ms], possibly invalid
    pub tow_ms: u32,
    /// Continuous GPS week number, possibly invalid
    pub week: u16,
    /// Payload, following the time tag
    pub payload: Vec<u8>,
}

impl RawBlock {
    /// Creates a new [RawBlock] ready to be encoded.
    pub fn new(id: BlockID, revision: u8, tow_ms: u32, week: u16, payload: &[u8]) -> Self {
        Self {
            id,
            revision: revision & 0x07,
            tow_ms,
            week,
            payload: payload.to_vec(),
        }
    }

    /// Verifies a length field. SBF blocks are always 4-byte aligned.
    pub(crate) fn validate_length(length: u16) -> Result<usize, Error> {
        let size = length as usize;
        if size < Constants::MIN_BLOCK_SIZE || size > Constants::MAX_BLOCK_SIZE || size % 4 != 0
        {
            Err(Error::InvalidLength(length))
        } else {
            Ok(size)
        }
    }

    /// [RawBlock] decoding attempt. Buffer must start with the SYNC bytes
    /// and contain the entire block.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < Constants::FRAME_HEADER_SIZE {
            return Err(Error::NotEnoughBytes);
        }
        if buf[0] != Constants::SYNC1 || buf[1] != Constants::SYNC2 {
            return Err(Error::NoSyncByte);
        }

        let length = Utils::decode_u16(buf, 6)?;
        let size = Self::validate_length(length)?;

        if buf.len() < size {
            return Err(Error::NotEnoughBytes);
        }

        let found = Utils::decode_u16(buf, 2)?;
        let expected = Checksum::calc(&buf[4..size]);
        if expected != found {
            return Err(Error::ChecksumError { expected, found });
        }

        let id = Utils::decode_u16(buf, 4)?;

        Ok(Self {
            id: BlockID::from(id),
            revision: (id >> 13) as u8,
            tow_ms: Utils::decode_u32(buf, 8)?,
            week: Utils::decode_u16(buf, 12)?,
            payload: buf[Constants::BLOCK_HEADER_SIZE..size].to_vec(),
        })
    }

    /// Total encoded size, padding included.
    pub fn encoding_size(&self) -> usize {
        let size = Constants::BLOCK_HEADER_SIZE + self.payload.len();
        (size.max(Constants::MIN_BLOCK_SIZE) + 3) / 4 * 4
    }

    /// Encodes this [RawBlock], padding the payload with zeros
    /// to the next 4-byte boundary.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let size = self.encoding_size();
        if size > Constants::MAX_BLOCK_SIZE {
            return Err(Error::InvalidLength(size.min(u16::MAX as usize) as u16));
        }

        let mut buf = vec![0_u8; size];
        buf[0] = Constants::SYNC1;
        buf[1] = Constants::SYNC2;

        let id = u16::from(self.id) | ((self.revision as u16 & 0x07) << 13);
        buf[4..6].copy_from_slice(&id.to_le_bytes());
        buf[6..8].copy_from_slice(&(size as u16).to_le_bytes());
        buf[8..12].copy_from_slice(&self.tow_ms.to_le_bytes());
        buf[12..14].copy_from_slice(&self.week.to_le_bytes());

        let end = Constants::BLOCK_HEADER_SIZE + self.payload.len();
        buf[Constants::BLOCK_HEADER_SIZE..end].copy_from_slice(&self.payload);

        let crc = Checksum::calc(&buf[4..]);
        buf[2..4].copy_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    /// Returns true if both time fields hold actual values.
    pub fn has_valid_time(&self) -> bool {
        self.tow_ms != Constants::TOW_DNU && self.week != Constants::WNC_DNU
    }

    /// Block time tag, expressed in [TimeScale::GPST].
    pub fn epoch(&self) -> Result<Epoch, Error> {
        if !self.has_valid_time() {
            return Err(Error::TimeError);
        }
        Ok(Epoch::from_time_of_week(
            self.week as u32,
            self.tow_ms as u64 * 1_000_000,
            TimeScale::GPST,
        ))
    }
}
