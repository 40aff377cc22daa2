//! Readable interface decoding
use std::collections::VecDeque;
use std::io::{Error as IoError, ErrorKind, Read};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

use crate::{
    decoder::{DecodeEvent, Decoder},
    options::DecoderOptions,
    Error,
};

enum Reader<R: Read> {
    Plain(R),
    #[cfg(feature = "flate2")]
    Compressed(GzDecoder<R>),
}

impl<R: Read> Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        match self {
            Self::Plain(r) => r.read(buf),
            #[cfg(feature = "flate2")]
            Self::Compressed(r) => r.read(buf),
        }
    }
}

/// [Stream] decodes all SBF blocks streamed on a readable interface,
/// for example a file.
/// ```
/// use sbf_rnx::prelude::*;
///
/// let block = RawBlock::new(BlockID::GPSNav, 0, 1000, 2300, &[1, 2, 3, 4]);
/// let bytes = block.encode().unwrap();
///
/// let stream = Stream::new(bytes.as_slice(), DecoderOptions::default());
///
/// for event in stream {
///     match event {
///         Ok(DecodeEvent::NavigationMessage(msg)) => {
///             assert_eq!(msg.payload[..4], [1, 2, 3, 4]);
///         },
///         Ok(_) => {},
///         Err(_) => {
///             // I/O error: end of stream
///         },
///     }
/// }
/// ```
pub struct Stream<R: Read> {
    reader: Reader<R>,
    decoder: Decoder,
    buffer: Vec<u8>,
    events: VecDeque<DecodeEvent>,
    eos: bool,
}

impl<R: Read> Stream<R> {
    const BUF_SIZE: usize = 4096;

    /// Creates a new [Stream] from [R] readable interface
    pub fn new(reader: R, options: DecoderOptions) -> Self {
        Self {
            reader: Reader::Plain(reader),
            decoder: Decoder::new(options),
            buffer: vec![0; Self::BUF_SIZE],
            events: VecDeque::new(),
            eos: false,
        }
    }

    #[cfg(feature = "flate2")]
    /// Creates a new [Stream] from [R] readable interface,
    /// that must stream Gzip encoded bytes.
    pub fn new_gzip(reader: R, options: DecoderOptions) -> Self {
        Self {
            reader: Reader::Compressed(GzDecoder::new(reader)),
            decoder: Decoder::new(options),
            buffer: vec![0; Self::BUF_SIZE],
            events: VecDeque::new(),
            eos: false,
        }
    }

    /// Inner [Decoder]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}

impl<R: Read> Iterator for Stream<R> {
    type Item = Result<DecodeEvent, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(Ok(event));
            }
            if self.eos {
                return None;
            }
            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.eos = true;
                },
                Ok(size) => {
                    let events = self.decoder.push_bytes(&self.buffer[..size]);
                    self.events.extend(events);
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => {
                    self.eos = true;
                    return Some(Err(Error::IoError(e)));
                },
            }
        }
    }
}
