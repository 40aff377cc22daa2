use crate::Error;

pub struct Utils;

impl Utils {
    /// u8 decoding attempt at given offset
    pub fn decode_u8(buf: &[u8], offset: usize) -> Result<u8, Error> {
        buf.get(offset).copied().ok_or(Error::NotEnoughBytes)
    }
    /// i8 decoding attempt at given offset
    pub fn decode_i8(buf: &[u8], offset: usize) -> Result<i8, Error> {
        Ok(Self::decode_u8(buf, offset)? as i8)
    }
    /// Little endian u16 decoding attempt at given offset
    pub fn decode_u16(buf: &[u8], offset: usize) -> Result<u16, Error> {
        let bytes = Self::slice::<2>(buf, offset)?;
        Ok(u16::from_le_bytes(bytes))
    }
    /// Little endian i16 decoding attempt at given offset
    pub fn decode_i16(buf: &[u8], offset: usize) -> Result<i16, Error> {
        let bytes = Self::slice::<2>(buf, offset)?;
        Ok(i16::from_le_bytes(bytes))
    }
    /// Little endian u32 decoding attempt at given offset
    pub fn decode_u32(buf: &[u8], offset: usize) -> Result<u32, Error> {
        let bytes = Self::slice::<4>(buf, offset)?;
        Ok(u32::from_le_bytes(bytes))
    }
    /// Little endian i32 decoding attempt at given offset
    pub fn decode_i32(buf: &[u8], offset: usize) -> Result<i32, Error> {
        let bytes = Self::slice::<4>(buf, offset)?;
        Ok(i32::from_le_bytes(bytes))
    }
    fn slice<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], Error> {
        let end = offset.checked_add(N).ok_or(Error::NotEnoughBytes)?;
        let bytes = buf.get(offset..end).ok_or(Error::NotEnoughBytes)?;
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }
    /// Extracts bits [start, start + len) of a packed field.
    pub const fn bits(value: u32, start: u32, len: u32) -> u32 {
        if len >= 32 {
            value >> start
        } else {
            (value >> start) & ((1 << len) - 1)
        }
    }
}

/// Bounds checked little endian reader, moving forward
/// as fields are consumed.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    ptr: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, ptr: 0 }
    }
    /// Number of bytes left to consume
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.ptr)
    }
    /// Peeks next byte without consuming it
    pub fn peek_u8(&self) -> Result<u8, Error> {
        Utils::decode_u8(self.buf, self.ptr)
    }
    pub fn skip(&mut self, size: usize) -> Result<(), Error> {
        if self.remaining() < size {
            return Err(Error::NotEnoughBytes);
        }
        self.ptr += size;
        Ok(())
    }
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let value = Utils::decode_u8(self.buf, self.ptr)?;
        self.ptr += 1;
        Ok(value)
    }
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let value = Utils::decode_u16(self.buf, self.ptr)?;
        self.ptr += 2;
        Ok(value)
    }
    pub fn read_i16(&mut self) -> Result<i16, Error> {
        let value = Utils::decode_i16(self.buf, self.ptr)?;
        self.ptr += 2;
        Ok(value)
    }
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let value = Utils::decode_u32(self.buf, self.ptr)?;
        self.ptr += 4;
        Ok(value)
    }
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        let value = Utils::decode_i32(self.buf, self.ptr)?;
        self.ptr += 4;
        Ok(value)
    }
    pub fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < size {
            return Err(Error::NotEnoughBytes);
        }
        let bytes = &self.buf[self.ptr..self.ptr + size];
        self.ptr += size;
        Ok(bytes)
    }
}
