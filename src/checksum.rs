//! SBF block checksum

// CRC16_TABLE, generated by build.rs
include!(concat!(env!("OUT_DIR"), "/crc16.rs"));

/// SBF [Checksum] calculator: CRC-16/CCITT (x^16 + x^12 + x^5 + 1),
/// zero initial value, no final XOR.
pub struct Checksum;

impl Checksum {
    /// Calculates the CRC of buffer content.
    /// For SBF blocks, the buffer starts at the ID field (after SYNC and CRC)
    /// and runs up to the end of the block.
    pub fn calc(buf: &[u8]) -> u16 {
        let mut crc = 0_u16;
        for byte in buf {
            let index = ((crc >> 8) as u8 ^ byte) as usize;
            crc = (crc << 8) ^ CRC16_TABLE[index];
        }
        crc
    }
}

#[cfg(test)]
mod test {
    use super::Checksum;
    #[test]
    fn crc16_ccitt() {
        assert_eq!(Checksum::calc(b"123456789"), 0x31C3);
        assert_eq!(Checksum::calc(&[]), 0);
        assert_ne!(Checksum::calc(&[0x01]), Checksum::calc(&[0x02]));
    }
}
