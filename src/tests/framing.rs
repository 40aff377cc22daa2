use rand::Rng;

use crate::prelude::*;
use crate::tests::toolkit::{encode, end_of_meas, init_logger, WEEK};

fn navigation_messages(events: &[DecodeEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, DecodeEvent::NavigationMessage(_)))
        .count()
}

#[test]
fn checksum_error() {
    init_logger();
    let mut decoder = Decoder::default();

    let mut block = encode(BlockID::GPSNav, 1000, &[5, 1, 2, 3, 4, 5, 6, 7]);
    block[16] ^= 0x20;

    let events = decoder.push_bytes(&block);
    assert!(matches!(
        events.first(),
        Some(DecodeEvent::FramingError(Error::ChecksumError { .. }))
    ));
    assert_eq!(navigation_messages(&events), 0);

    // decoder recovers on the next block
    let block = encode(BlockID::GPSNav, 1000, &[5, 1, 2, 3, 4, 5, 6, 7]);
    let events = decoder.push_bytes(&block);
    assert_eq!(events.len(), 1);
    assert_eq!(navigation_messages(&events), 1);
}

#[test]
fn single_bit_errors() {
    init_logger();
    let block = encode(BlockID::GPSNav, 1000, &[5, 1, 2, 3, 4, 5, 6, 7]);

    // any bit past the length field: time tag and payload
    for byte in 8..block.len() {
        for bit in 0..8 {
            let mut corrupt = block.clone();
            corrupt[byte] ^= 1 << bit;

            let mut decoder = Decoder::default();
            let events = decoder.push_bytes(&corrupt);

            assert!(
                matches!(
                    events.first(),
                    Some(DecodeEvent::FramingError(Error::ChecksumError { .. }))
                ),
                "byte {} bit {}: {:?}",
                byte,
                bit,
                events
            );
            assert_eq!(navigation_messages(&events), 0);
        }
    }
}

#[test]
fn garbage_resync() {
    init_logger();
    let mut rng = rand::thread_rng();
    let mut decoder = Decoder::default();

    let mut bytes = (0..256).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
    bytes.extend_from_slice(&encode(BlockID::GPSRawCA, 1000, &[5; 40]));
    bytes.extend((0..64).map(|_| rng.gen::<u8>()));
    bytes.extend_from_slice(&encode(BlockID::GPSRawCA, 2000, &[5; 40]));

    // completes any false candidate
    bytes.extend_from_slice(&[0; 8192]);

    let events = decoder.push_bytes(&bytes);
    assert_eq!(navigation_messages(&events), 2, "events: {:?}", events);
}

#[test]
fn byte_per_byte() {
    init_logger();
    let mut decoder = Decoder::default();

    // false SYNC with an invalid length
    let mut bytes = vec![0x24, 0x24, 0x40, 0xaa, 0xbb, 0x00, 0x00, 0x13, 0x00];
    bytes.extend_from_slice(&encode(BlockID::GALNav, 1000, &[71, 0, 1, 2]));

    let mut events = Vec::new();
    for byte in bytes.iter() {
        let mut event = decoder.push_byte(*byte);
        while !event.is_noop() {
            events.push(event);
            event = decoder.poll();
        }
    }

    assert!(matches!(
        events.first(),
        Some(DecodeEvent::FramingError(Error::InvalidLength(0x13)))
    ));
    assert_eq!(navigation_messages(&events), 1);
    match events.last() {
        Some(DecodeEvent::NavigationMessage(msg)) => {
            assert_eq!(msg.block_id(), BlockID::GALNav);
            assert_eq!(msg.sv, Some(SV::new(Constellation::Galileo, 1)));
            assert_eq!(
                msg.epoch,
                Epoch::from_time_of_week(WEEK as u32, 1_000_000_000, TimeScale::GPST)
            );
        },
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn invalid_time_tag() {
    init_logger();
    let mut decoder = Decoder::default();

    let block = RawBlock::new(BlockID::GPSNav, 0, 0xffff_ffff, WEEK, &[5, 0, 0, 0])
        .encode()
        .unwrap();

    let events = decoder.push_bytes(&block);
    assert_eq!(events.len(), 1);
    match &events[0] {
        DecodeEvent::FramingError(e) => {
            assert!(e.is_framing());
            assert!(matches!(e, Error::TimeError));
        },
        event => panic!("unexpected event {:?}", event),
    }
}

#[test]
fn unknown_blocks() {
    init_logger();
    let mut decoder = Decoder::default();

    let mut bytes = encode(BlockID::Unknown(4007), 1000, &[0; 80]);
    bytes.extend_from_slice(&end_of_meas(1000));

    let events = decoder.push_bytes(&bytes);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], DecodeEvent::Ignored(4007)));
}

#[test]
fn reset() {
    init_logger();
    let mut decoder = Decoder::default();

    let block = encode(BlockID::GPSNav, 1000, &[5, 1, 2, 3]);

    // half a block, then reset
    decoder.push_bytes(&block[..10]);
    decoder.reset();

    let events = decoder.push_bytes(&block);
    assert_eq!(navigation_messages(&events), 1);

    // dedup memory is dropped as well
    decoder.reset();
    let events = decoder.push_bytes(&block);
    assert_eq!(navigation_messages(&events), 1);
}
