//! Test toolkit: block builders and decoding helpers
use crate::prelude::{BlockID, DecodeEvent, Decoder, ObservationEpoch, RawBlock};

pub mod classic;
pub mod meas3;

/// GPS week used by all test blocks
pub const WEEK: u16 = 2300;

/// Initializes the logger once, so failing tests print the trace
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Packs (value, start bit, length) fields into one word
pub fn pack(fields: &[(u32, u32, u32)]) -> u32 {
    fields.iter().fold(0, |word, &(value, start, len)| {
        let mask = if len >= 32 { u32::MAX } else { (1 << len) - 1 };
        word | ((value & mask) << start)
    })
}

/// Encodes one block at this TOW
pub fn encode(id: BlockID, tow_ms: u32, payload: &[u8]) -> Vec<u8> {
    RawBlock::new(id, 0, tow_ms, WEEK, payload)
        .encode()
        .unwrap()
}

/// Encoded end of epoch marker
pub fn end_of_meas(tow_ms: u32) -> Vec<u8> {
    encode(BlockID::EndOfMeas, tow_ms, &[])
}

/// Feeds these encoded blocks, returns all events
pub fn decode_all(decoder: &mut Decoder, blocks: &[Vec<u8>]) -> Vec<DecodeEvent> {
    blocks
        .iter()
        .flat_map(|block| decoder.push_bytes(block))
        .collect()
}

/// Extracts the published observation epochs
pub fn observation_epochs(events: Vec<DecodeEvent>) -> Vec<ObservationEpoch> {
    events
        .into_iter()
        .filter_map(|event| match event {
            DecodeEvent::ObservationEpoch(epoch) => Some(epoch),
            _ => None,
        })
        .collect()
}

/// Feeds these blocks and expects exactly one epoch to be published
pub fn single_epoch(decoder: &mut Decoder, blocks: &[Vec<u8>]) -> ObservationEpoch {
    let events = decode_all(decoder, blocks);
    let mut epochs = observation_epochs(events);
    assert_eq!(epochs.len(), 1, "expecting a single epoch");
    epochs.remove(0)
}

/// Asserts two floating point values match within tolerance
pub fn assert_close(found: Option<f64>, expected: f64, tolerance: f64) {
    let found = found.unwrap_or_else(|| panic!("expecting {}, got nothing", expected));
    assert!(
        (found - expected).abs() < tolerance,
        "found {}, expecting {}",
        found,
        expected
    );
}
