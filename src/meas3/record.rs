//! Meas3 master and slave records
use crate::{
    utils::{Reader, Utils},
    Error,
};

/// Master record encoding, in the 2 LSB of its first byte
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MasterKind {
    Short,
    Long,
    ShortDelta,
    LongDelta,
}

impl From<u8> for MasterKind {
    fn from(byte: u8) -> Self {
        match byte & 0x03 {
            0 => Self::Short,
            1 => Self::Long,
            2 => Self::ShortDelta,
            _ => Self::LongDelta,
        }
    }
}

/// Slave record encoding, in the 2 LSB of its first byte
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlaveKind {
    Short,
    Long,
    Delta,
}

impl From<u8> for SlaveKind {
    fn from(byte: u8) -> Self {
        match byte & 0x03 {
            0 => Self::Long,
            2 => Self::Delta,
            _ => Self::Short,
        }
    }
}

/// Raw master record fields
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MasterRecord {
    Short {
        cmc: u32,
        lock: u8,
        cn0: u8,
        signal: u8,
        pr_lsb: u32,
        pr_rate: Option<i16>,
    },
    Long {
        cmc: u32,
        lock: u8,
        signal: u8,
        pr_lsb: u32,
        pr_msb: u8,
        cn0: u8,
        slave_mask: u16,
        pr_rate: Option<i16>,
    },
    ShortDelta {
        pr_offset: u32,
        cmc_offset: u32,
        cn0_delta: u8,
        lock_reset: bool,
    },
    LongDelta {
        pr_offset: u32,
        cmc_offset: u32,
        cn0_delta: u8,
        lock_reset: bool,
    },
}

impl MasterRecord {
    /// Decodes the next master record
    pub fn decode(reader: &mut Reader) -> Result<Self, Error> {
        let kind = MasterKind::from(reader.peek_u8()?);
        match kind {
            MasterKind::Short => {
                let bf1 = reader.read_u32()?;
                let pr_lsb = reader.read_u32()?;
                let pr_rate = if Utils::bits(bf1, 28, 1) > 0 {
                    Some(reader.read_i16()?)
                } else {
                    None
                };
                Ok(Self::Short {
                    cmc: Utils::bits(bf1, 2, 18),
                    lock: Utils::bits(bf1, 20, 3) as u8,
                    cn0: Utils::bits(bf1, 23, 5) as u8,
                    signal: Utils::bits(bf1, 29, 3) as u8,
                    pr_lsb,
                    pr_rate,
                })
            },
            MasterKind::Long => {
                let bf1 = reader.read_u32()?;
                let pr_lsb = reader.read_u32()?;
                let bf2 = reader.read_u32()?;
                let mut slave_mask = Utils::bits(bf2, 12, 9) as u16;
                if Utils::bits(bf2, 11, 1) > 0 {
                    let cont = reader.read_u8()?;
                    slave_mask |= (Utils::bits(cont as u32, 0, 7) as u16) << 9;
                }
                let pr_rate = if Utils::bits(bf2, 10, 1) > 0 {
                    Some(reader.read_i16()?)
                } else {
                    None
                };
                Ok(Self::Long {
                    cmc: Utils::bits(bf1, 2, 22),
                    lock: Utils::bits(bf1, 24, 4) as u8,
                    signal: Utils::bits(bf1, 28, 4) as u8,
                    pr_lsb,
                    pr_msb: Utils::bits(bf2, 0, 4) as u8,
                    cn0: Utils::bits(bf2, 4, 6) as u8,
                    slave_mask,
                    pr_rate,
                })
            },
            MasterKind::ShortDelta => {
                let bf1 = reader.read_u32()?;
                Ok(Self::ShortDelta {
                    pr_offset: Utils::bits(bf1, 2, 14),
                    cmc_offset: Utils::bits(bf1, 16, 12),
                    cn0_delta: Utils::bits(bf1, 28, 3) as u8,
                    lock_reset: Utils::bits(bf1, 31, 1) > 0,
                })
            },
            MasterKind::LongDelta => {
                let bf1 = reader.read_u32()?;
                let bf2 = reader.read_u8()? as u32;
                Ok(Self::LongDelta {
                    pr_offset: Utils::bits(bf1, 2, 17),
                    cmc_offset: Utils::bits(bf1, 19, 13),
                    cn0_delta: Utils::bits(bf2, 0, 5) as u8,
                    lock_reset: Utils::bits(bf2, 5, 1) > 0,
                })
            },
        }
    }
}

/// Raw slave record fields
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SlaveRecord {
    Short {
        pr_offset: u32,
        phase_offset: u32,
        cn0: u8,
        lock: u8,
    },
    Long {
        pr_offset: u32,
        lock: u8,
        cn0: u8,
        phase_offset: i32,
    },
    Delta {
        pr_offset: u32,
        cmc_offset: u32,
        cn0_delta: u8,
        lock_reset: bool,
    },
}

impl SlaveRecord {
    /// Decodes the next slave record
    pub fn decode(reader: &mut Reader) -> Result<Self, Error> {
        let kind = SlaveKind::from(reader.peek_u8()?);
        match kind {
            SlaveKind::Short => {
                let bf1 = reader.read_u32()?;
                let bf2 = reader.read_u8()? as u32;
                Ok(Self::Short {
                    pr_offset: Utils::bits(bf1, 1, 14),
                    phase_offset: Utils::bits(bf1, 15, 17),
                    cn0: Utils::bits(bf2, 0, 5) as u8,
                    lock: Utils::bits(bf2, 5, 3) as u8,
                })
            },
            SlaveKind::Long => {
                let bf1 = reader.read_u32()?;
                let phase_offset = reader.read_i32()?;
                Ok(Self::Long {
                    pr_offset: Utils::bits(bf1, 2, 18),
                    lock: Utils::bits(bf1, 20, 4) as u8,
                    cn0: Utils::bits(bf1, 24, 6) as u8,
                    phase_offset,
                })
            },
            SlaveKind::Delta => {
                let bf1 = reader.read_u32()?;
                Ok(Self::Delta {
                    pr_offset: Utils::bits(bf1, 2, 13),
                    cmc_offset: Utils::bits(bf1, 15, 13),
                    cn0_delta: Utils::bits(bf1, 28, 3) as u8,
                    lock_reset: Utils::bits(bf1, 31, 1) > 0,
                })
            },
        }
    }
}

/// Lock time [ms] of a 3 or 4 bit lock index
pub fn lock_time_ms(index: u8) -> u64 {
    if index == 0 {
        0
    } else {
        1000_u64 << (index - 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn record_kinds() {
        assert_eq!(MasterKind::from(0x00), MasterKind::Short);
        assert_eq!(MasterKind::from(0xfd), MasterKind::Long);
        assert_eq!(MasterKind::from(0x02), MasterKind::ShortDelta);
        assert_eq!(MasterKind::from(0x03), MasterKind::LongDelta);
        assert_eq!(SlaveKind::from(0x01), SlaveKind::Short);
        assert_eq!(SlaveKind::from(0x03), SlaveKind::Short);
        assert_eq!(SlaveKind::from(0x00), SlaveKind::Long);
        assert_eq!(SlaveKind::from(0x02), SlaveKind::Delta);
    }

    #[test]
    fn master_short() {
        // cmc=131072, lock=2, cn0=20, rate present, signal=1
        let bf1: u32 = (131072 << 2) | (2 << 20) | (20 << 23) | (1 << 28) | (1 << 29);
        let mut buf = bf1.to_le_bytes().to_vec();
        buf.extend_from_slice(&500_000_000_u32.to_le_bytes());
        buf.extend_from_slice(&(-10_i16).to_le_bytes());

        let mut reader = Reader::new(&buf);
        let record = MasterRecord::decode(&mut reader).unwrap();
        assert_eq!(
            record,
            MasterRecord::Short {
                cmc: 131072,
                lock: 2,
                cn0: 20,
                signal: 1,
                pr_lsb: 500_000_000,
                pr_rate: Some(-10),
            }
        );
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn master_long_continuation() {
        let bf1: u32 = 1 | (1000 << 2) | (5 << 24) | (3 << 28);
        let bf2: u32 = 2 | (30 << 4) | (1 << 11) | (0b1_0000_0001 << 12);
        let mut buf = bf1.to_le_bytes().to_vec();
        buf.extend_from_slice(&123_u32.to_le_bytes());
        buf.extend_from_slice(&bf2.to_le_bytes());
        buf.push(0x41);

        let mut reader = Reader::new(&buf);
        let record = MasterRecord::decode(&mut reader).unwrap();
        match record {
            MasterRecord::Long {
                cmc,
                lock,
                signal,
                pr_msb,
                cn0,
                slave_mask,
                pr_rate,
                ..
            } => {
                assert_eq!(cmc, 1000);
                assert_eq!(lock, 5);
                assert_eq!(signal, 3);
                assert_eq!(pr_msb, 2);
                assert_eq!(cn0, 30);
                assert_eq!(slave_mask, 0b1000_0011_0000_0001);
                assert_eq!(pr_rate, None);
            },
            _ => panic!("invalid record"),
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_records() {
        let buf = [0x01, 0x00, 0x00];
        let mut reader = Reader::new(&buf);
        assert!(MasterRecord::decode(&mut reader).is_err());

        let buf = [0x01, 0x00, 0x00, 0x00];
        let mut reader = Reader::new(&buf);
        assert!(SlaveRecord::decode(&mut reader).is_err());
    }

    #[test]
    fn lock_indexes() {
        assert_eq!(lock_time_ms(0), 0);
        assert_eq!(lock_time_ms(1), 1000);
        assert_eq!(lock_time_ms(4), 8000);
        assert_eq!(lock_time_ms(15), 1000 << 14);
    }
}
