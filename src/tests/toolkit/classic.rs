//! MeasEpoch and MeasExtra builders
use super::encode;
use crate::prelude::BlockID;

/// Type-1 sub-block (20 bytes)
#[derive(Debug, Default, Clone)]
pub struct Type1 {
    pub chan: u8,
    pub signal: u8,
    pub antenna: u8,
    pub svid: u8,
    /// Pseudo range [mm]
    pub code_mm: u64,
    /// Doppler [1E-4 Hz]
    pub doppler: i32,
    pub carrier_msb: i8,
    pub carrier_lsb: u16,
    pub cn0: u8,
    /// Lock time [s]
    pub lock_time: u16,
    pub info: u8,
    pub type2: Vec<Type2>,
}

impl Type1 {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![
            self.chan,
            (self.signal & 0x1f) | (self.antenna << 5),
            self.svid,
            (self.code_mm >> 32) as u8 & 0x0f,
        ];
        buf.extend_from_slice(&(self.code_mm as u32).to_le_bytes());
        buf.extend_from_slice(&self.doppler.to_le_bytes());
        buf.extend_from_slice(&self.carrier_lsb.to_le_bytes());
        buf.push(self.carrier_msb as u8);
        buf.push(self.cn0);
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf.push(self.info);
        buf.push(self.type2.len() as u8);
        for type2 in self.type2.iter() {
            buf.extend_from_slice(&type2.encode());
        }
        buf
    }
}

/// Type-2 sub-block (12 bytes)
#[derive(Debug, Default, Clone)]
pub struct Type2 {
    pub signal: u8,
    pub antenna: u8,
    pub lock_time: u8,
    pub cn0: u8,
    /// 3 bit code offset MSB
    pub code_msb: i8,
    /// 5 bit doppler offset MSB
    pub doppler_msb: i8,
    pub carrier_msb: i8,
    pub info: u8,
    pub code_lsb: u16,
    pub carrier_lsb: u16,
    pub doppler_lsb: u16,
}

impl Type2 {
    pub fn encode(&self) -> Vec<u8> {
        let offsets_msb = (self.code_msb as u8 & 0x07) | ((self.doppler_msb as u8 & 0x1f) << 3);
        let mut buf = vec![
            (self.signal & 0x1f) | (self.antenna << 5),
            self.lock_time,
            self.cn0,
            offsets_msb,
            self.carrier_msb as u8,
            self.info,
        ];
        buf.extend_from_slice(&self.code_lsb.to_le_bytes());
        buf.extend_from_slice(&self.carrier_lsb.to_le_bytes());
        buf.extend_from_slice(&self.doppler_lsb.to_le_bytes());
        buf
    }
}

/// Encodes a MeasEpoch block
pub fn meas_epoch(tow_ms: u32, type1: &[Type1]) -> Vec<u8> {
    let mut payload = vec![type1.len() as u8, 20, 12, 0, 0, 0];
    for sub in type1.iter() {
        payload.extend_from_slice(&sub.encode());
    }
    encode(BlockID::MeasEpoch, tow_ms, &payload)
}

/// Encodes a MeasExtra block: (channel, signal, CN0 high resolution)
pub fn meas_extra(tow_ms: u32, channels: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut payload = vec![channels.len() as u8, 16, 0, 0, 0, 0];
    for (chan, signal, hires) in channels.iter() {
        let mut sub = [0_u8; 16];
        sub[0] = *chan;
        sub[1] = signal & 0x1f;
        sub[15] = hires & 0x07;
        payload.extend_from_slice(&sub);
    }
    encode(BlockID::MeasExtra, tow_ms, &payload)
}
