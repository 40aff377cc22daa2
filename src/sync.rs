//! Block synchronization
use std::collections::VecDeque;

use log::{debug, warn};

use crate::{block::RawBlock, constants::Constants, utils::Utils, Error};

/// [Synchronizer] locates SBF blocks in a byte stream.
/// Bytes are consumed one at a time. When a candidate block turns out to be
/// invalid, the bytes that followed its SYNC marker are scanned again,
/// so a valid block is never lost behind a false SYNC marker.
#[derive(Debug, Default, Clone)]
pub(crate) struct Synchronizer {
    /// Candidate block, starting with SYNC
    buffer: Vec<u8>,
    /// Expected block size, once the header is gathered
    size: Option<usize>,
    /// Bytes waiting to be scanned
    pending: VecDeque<u8>,
}

impl Synchronizer {
    /// Queues new bytes
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }

    /// Queues one byte
    pub fn push(&mut self, byte: u8) {
        self.pending.push_back(byte);
    }

    /// Returns true when queued bytes are waiting
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Scans the next queued byte. Returns a [RawBlock] when one got completed,
    /// an [Error] when the current candidate turned out invalid,
    /// None otherwise.
    pub fn step(&mut self) -> Option<Result<RawBlock, Error>> {
        let byte = self.pending.pop_front()?;
        self.consume(byte)
    }

    fn consume(&mut self, byte: u8) -> Option<Result<RawBlock, Error>> {
        match self.buffer.len() {
            0 => {
                if byte == Constants::SYNC1 {
                    self.buffer.push(byte);
                }
                None
            },
            1 => {
                self.buffer.clear();
                if byte == Constants::SYNC2 {
                    self.buffer.extend_from_slice(&[Constants::SYNC1, Constants::SYNC2]);
                } else if byte == Constants::SYNC1 {
                    self.buffer.push(byte);
                }
                None
            },
            _ => {
                self.buffer.push(byte);

                if self.buffer.len() == Constants::FRAME_HEADER_SIZE {
                    let length = match Utils::decode_u16(&self.buffer, 6) {
                        Ok(length) => length,
                        Err(e) => return Some(Err(e)),
                    };
                    match RawBlock::validate_length(length) {
                        Ok(size) => self.size = Some(size),
                        Err(e) => {
                            debug!("sync: invalid length {}", length);
                            self.rescan();
                            return Some(Err(e));
                        },
                    }
                }

                match self.size {
                    Some(size) if self.buffer.len() == size => match RawBlock::decode(&self.buffer) {
                        Ok(block) => {
                            self.buffer.clear();
                            self.size = None;
                            Some(Ok(block))
                        },
                        Err(e) => {
                            warn!("sync: {}", e);
                            self.rescan();
                            Some(Err(e))
                        },
                    },
                    _ => None,
                }
            },
        }
    }

    /// Drops the current candidate, its content (past the first SYNC byte)
    /// is queued for scanning again.
    fn rescan(&mut self) {
        let mut rescanned = self.buffer.drain(..).skip(1).collect::<VecDeque<_>>();
        rescanned.append(&mut self.pending);
        self.pending = rescanned;
        self.size = None;
    }

    /// Drops everything
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.size = None;
        self.pending.clear();
    }
}
