use std::str::FromStr;

use crate::prelude::*;
use crate::tests::toolkit::{
    assert_close, decode_all, encode, end_of_meas, init_logger,
    meas3::{block_header, master_short, ranges, ConstellationHeader},
    single_epoch,
};

fn messages(events: Vec<DecodeEvent>) -> Vec<NavigationMessage> {
    events
        .into_iter()
        .filter_map(|event| match event {
            DecodeEvent::NavigationMessage(msg) => Some(msg),
            _ => None,
        })
        .collect()
}

#[test]
fn decoded_ephemerides() {
    init_logger();
    let mut decoder = Decoder::default();

    let blocks = vec![
        encode(BlockID::GPSNav, 1000, &[5, 0, 1, 2, 3, 4]),
        encode(BlockID::GPSNav, 2000, &[5, 0, 1, 2, 3, 4]),
        encode(BlockID::GPSNav, 3000, &[6, 0, 1, 2, 3, 4]),
        encode(BlockID::GPSNav, 4000, &[5, 0, 1, 2, 3, 5]),
    ];

    let messages = messages(decode_all(&mut decoder, &blocks));
    assert_eq!(messages.len(), 3, "unchanged ephemeris forwarded twice");

    let svs = messages.iter().map(|msg| msg.sv).collect::<Vec<_>>();
    assert_eq!(
        svs,
        vec![
            Some(SV::new(Constellation::GPS, 5)),
            Some(SV::new(Constellation::GPS, 6)),
            Some(SV::new(Constellation::GPS, 5)),
        ]
    );

    for msg in messages.iter() {
        assert_eq!(msg.block_id(), BlockID::GPSNav);
        assert_eq!(msg.block_number, 5891);
        assert_eq!(msg.revision, 0);
    }
}

#[test]
fn all_ephemerides() {
    init_logger();
    let options = DecoderOptions::from_str("-EPHALL").unwrap();
    let mut decoder = Decoder::new(options);

    let blocks = vec![
        encode(BlockID::GALNav, 1000, &[71, 0, 1, 2]),
        encode(BlockID::GALNav, 2000, &[71, 0, 1, 2]),
    ];

    let messages = messages(decode_all(&mut decoder, &blocks));
    assert_eq!(messages.len(), 2);
}

#[test]
fn raw_navigation() {
    init_logger();
    let mut decoder = Decoder::default();

    let blocks = vec![
        encode(BlockID::GPSRawCA, 1000, &[5, 1, 0, 0, 0xaa, 0xbb]),
        encode(BlockID::GPSRawCA, 7000, &[5, 1, 0, 0, 0xaa, 0xbb]),
        encode(BlockID::GPSIon, 7000, &[0; 32]),
    ];

    let messages = messages(decode_all(&mut decoder, &blocks));
    assert_eq!(messages.len(), 3, "raw navigation is always forwarded");
    assert!(messages[2].sv.is_none());
    assert_eq!(messages[2].block_id(), BlockID::GPSIon);
}

#[test]
fn glonass_channel_from_ephemeris() {
    init_logger();
    let mut decoder = Decoder::default();

    let blocks = vec![encode(BlockID::GLONav, 1000, &[38, (-2_i8) as u8, 0, 0])];
    let messages = messages(decode_all(&mut decoder, &blocks));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sv, Some(SV::new(Constellation::Glonass, 1)));

    // Meas3 block without channel list
    let blocks = vec![
        ranges(
            10_000,
            &[
                block_header(0x02, 4),
                ConstellationHeader::new(0x01).encode(),
                master_short(131_072 + 250, 2, 20, 0, 200_000_000, None),
            ],
        ),
        end_of_meas(10_000),
    ];

    let epoch = single_epoch(&mut decoder, &blocks);
    let record = epoch.record(SV::new(Constellation::Glonass, 1)).unwrap();
    assert_eq!(record.glo_channel, Some(-2));

    let frequency = 1602.0E6 - 2.0 * 562.5E3;
    assert_close(
        record.slots[0].phase,
        19_200_000.0 * frequency / 299_792_458.0 + 0.25,
        1E-5,
    );
}
