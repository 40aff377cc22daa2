//! SBF framing and physical constants

pub struct Constants {}

impl Constants {
    /// First SYNC byte: '$'
    pub const SYNC1: u8 = 0x24;

    /// Second SYNC byte: '@'
    pub const SYNC2: u8 = 0x40;

    /// SYNC + CRC + ID + Length
    pub const FRAME_HEADER_SIZE: usize = 8;

    /// Frame header + TOW + WNc
    pub const BLOCK_HEADER_SIZE: usize = 14;

    /// Smallest valid block (header + padding)
    pub const MIN_BLOCK_SIZE: usize = 16;

    /// Largest block we accept
    pub const MAX_BLOCK_SIZE: usize = 8192;

    /// Invalid (not available) TOW marker
    pub const TOW_DNU: u32 = 0xffffffff;

    /// Invalid (not available) WNc marker
    pub const WNC_DNU: u16 = 0xffff;

    /// Speed of light [m/s]
    pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

    /// GLONASS G1 base frequency [Hz]
    pub const GLO_G1_BASE_HZ: f64 = 1.602e9;

    /// GLONASS G1 channel spacing [Hz]
    pub const GLO_G1_STEP_HZ: f64 = 0.5625e6;

    /// GLONASS G2 base frequency [Hz]
    pub const GLO_G2_BASE_HZ: f64 = 1.246e9;

    /// GLONASS G2 channel spacing [Hz]
    pub const GLO_G2_STEP_HZ: f64 = 0.4375e6;
}
