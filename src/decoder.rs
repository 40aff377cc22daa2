//! SBF decoding session
use gnss::prelude::SV;
use log::{debug, error};

use crate::{
    block::{BlockID, RawBlock},
    classic::{self, ClassicState},
    constellation::GlonassChannels,
    meas3::{self, Meas3State},
    navigation::{self, NavigationFilter, NavigationMessage},
    observation::{EpochBuffer, ObservationEpoch, SlotObservation},
    options::DecoderOptions,
    sync::Synchronizer,
    Error,
};

/// [DecodeEvent] is the outcome of one decoding step
#[derive(Debug)]
pub enum DecodeEvent {
    /// Nothing to report: more bytes are needed
    NoOp,
    /// Valid block that we do not interpret (block number)
    Ignored(u16),
    /// Block discarded by the framing layer: bad SYNC, length,
    /// checksum or time tag.
    FramingError(Error),
    /// Valid block whose content could not be decoded
    BlockError(Error),
    /// One complete [ObservationEpoch]
    ObservationEpoch(ObservationEpoch),
    /// One [NavigationMessage] to forward
    NavigationMessage(NavigationMessage),
}

impl DecodeEvent {
    /// Returns true if this is a [DecodeEvent::NoOp]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Block handlers
type Handler = fn(&mut Session, &RawBlock) -> Result<DecodeEvent, Error>;

fn handler(id: BlockID) -> Option<Handler> {
    match id {
        BlockID::MeasEpoch => Some(classic::meas_epoch),
        BlockID::MeasExtra => Some(classic::meas_extra),
        BlockID::Meas3Ranges => Some(meas3::ranges),
        BlockID::Meas3Doppler => Some(meas3::doppler),
        BlockID::Meas3CN0HiRes => Some(meas3::cn0_hires),
        BlockID::EndOfMeas => Some(end_of_meas),
        id if id.is_navigation() => Some(navigation::navigation),
        _ => None,
    }
}

/// Publishes the gathered epoch
fn end_of_meas(session: &mut Session, _: &RawBlock) -> Result<DecodeEvent, Error> {
    match session.buffer.flush() {
        Some(epoch) => Ok(DecodeEvent::ObservationEpoch(epoch)),
        None => Ok(DecodeEvent::NoOp),
    }
}

/// Decoding state, shared by all block handlers
#[derive(Debug, Default, Clone)]
pub(crate) struct Session {
    pub options: DecoderOptions,
    pub buffer: EpochBuffer,
    pub glonass: GlonassChannels,
    pub classic: ClassicState,
    pub meas3: Meas3State,
    pub navigation: NavigationFilter,
}

impl Session {
    /// Stores one slot observation for this [SV] in the epoch buffer
    pub fn store(&mut self, sv: SV, slot: usize, obs: SlotObservation, glo_channel: Option<i8>) {
        let epoch = self.buffer.epoch();

        if let Some(record) = self.buffer.record_mut(sv) {
            if let Some(target) = record.slots.get_mut(slot) {
                *target = obs;
                record.epoch = epoch;
                if glo_channel.is_some() {
                    record.glo_channel = glo_channel;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.glonass.clear();
        self.classic.clear();
        self.meas3.clear();
        self.navigation.clear();
    }
}

/// SBF stream [Decoder]. Feed it with bytes, as they come,
/// and react to the [DecodeEvent]s.
/// ```
/// use sbf_rnx::prelude::*;
///
/// let mut decoder = Decoder::default();
///
/// let block = RawBlock::new(BlockID::EndOfMeas, 0, 1000, 2300, &[]);
/// let bytes = block.encode().unwrap();
///
/// // byte per byte
/// for byte in bytes.iter() {
///     match decoder.push_byte(*byte) {
///         DecodeEvent::NoOp => {},
///         DecodeEvent::FramingError(e) => {
///             // corrupt data
///         },
///         _ => {},
///     }
/// }
///
/// // or by chunks
/// let events = decoder.push_bytes(&bytes);
/// assert!(events.is_empty(), "nothing to publish");
/// ```
#[derive(Debug, Default, Clone)]
pub struct Decoder {
    sync: Synchronizer,
    session: Session,
}

impl Decoder {
    /// Creates a new [Decoder] with desired [DecoderOptions]
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            sync: Synchronizer::default(),
            session: Session {
                options,
                ..Default::default()
            },
        }
    }

    /// [DecoderOptions] in use
    pub fn options(&self) -> &DecoderOptions {
        &self.session.options
    }

    /// Feeds one byte. Returns the first [DecodeEvent] this byte completes.
    /// Bytes that need to be scanned again after a framing error are
    /// retrieved with [Decoder::poll].
    pub fn push_byte(&mut self, byte: u8) -> DecodeEvent {
        self.sync.push(byte);
        self.poll()
    }

    /// Feeds a chunk of bytes, returns all resulting events
    /// ([DecodeEvent::NoOp] omitted).
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        self.sync.extend(bytes);
        let mut events = Vec::new();
        loop {
            match self.poll() {
                DecodeEvent::NoOp => {
                    if !self.sync.has_pending() {
                        return events;
                    }
                },
                event => events.push(event),
            }
        }
    }

    /// Scans queued bytes until one [DecodeEvent] shows up
    /// or nothing is left to scan.
    pub fn poll(&mut self) -> DecodeEvent {
        while self.sync.has_pending() {
            match self.sync.step() {
                Some(Ok(block)) => {
                    let event = self.push_block(&block);
                    if !event.is_noop() {
                        return event;
                    }
                },
                Some(Err(e)) => return DecodeEvent::FramingError(e),
                None => {},
            }
        }
        DecodeEvent::NoOp
    }

    /// Decodes one complete [RawBlock]
    pub fn push_block(&mut self, block: &RawBlock) -> DecodeEvent {
        if !block.has_valid_time() {
            debug!("{:?} - invalid time tag", block.id);
            return DecodeEvent::FramingError(Error::TimeError);
        }

        let handler = match handler(block.id) {
            Some(handler) => handler,
            None => return DecodeEvent::Ignored(u16::from(block.id)),
        };

        match handler(&mut self.session, block) {
            Ok(event) => event,
            Err(e) => {
                error!("{:?} - {}", block.id, e);
                DecodeEvent::BlockError(e)
            },
        }
    }

    /// Restarts the session: reference epochs, lock times and
    /// pending bytes are dropped. Options are preserved.
    pub fn reset(&mut self) {
        self.sync.reset();
        self.session.reset();
    }
}
