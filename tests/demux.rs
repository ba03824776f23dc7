use ccsds_tm_demux::{Config, Demuxer, Output};

fn drain(demux: &mut Demuxer) -> Vec<Vec<u8>> {
    let mut packets = Vec::new();
    loop {
        match demux.consume(&[]) {
            Output::Packet(p) => packets.push(p),
            Output::NeedMore => break,
        }
    }
    packets
}

#[test]
fn scenario_7_prefix_mode_prepends_originating_frame_headers() {
    // secondary_header_length=2, OCF present, FECF present:
    // frame_length = 6 + 2 + 8(data field, see below) + 4 + 2 = 22
    let secondary_header_length = 2;
    let data_field_length = 8;
    let frame_length = 6 + secondary_header_length + data_field_length + 4 + 2;
    let config = Config::new(frame_length, secondary_header_length, true, true, true, false).unwrap();
    let mut demux = Demuxer::new(config);

    let mut frame_a = Vec::new();
    frame_a.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x00, 0x00]); // primary header, FHP=0, VCID=0
    frame_a.extend_from_slice(&[0xAA, 0xBB]); // secondary header
    frame_a.extend_from_slice(&[0x05, 0x06, 0x07, 0x08, 0x00, 0x02, 0xDA, 0xDA]); // data field
    frame_a.extend_from_slice(&[0, 0, 0, 0]); // OCF
    frame_a.extend_from_slice(&[0, 0]); // FECF

    let mut frame_b = Vec::new();
    frame_b.extend_from_slice(&[0x10, 0x02, 0x12, 0x13, 0x00, 0x01]); // FHP=1, VCID=0
    frame_b.extend_from_slice(&[0xCC, 0xDD]);
    frame_b.extend_from_slice(&[0xDA, 0x14, 0x15, 0x16, 0x17, 0x00, 0x00, 0xDA]);
    frame_b.extend_from_slice(&[0, 0, 0, 0]);
    frame_b.extend_from_slice(&[0, 0]);

    demux.consume(&frame_a);
    demux.consume(&frame_b);
    let packets = drain(&mut demux);

    assert_eq!(packets.len(), 2);
    let frame_headers_length = 6 + secondary_header_length;
    assert!(packets[0].len() >= frame_headers_length + 6);
    assert_eq!(&packets[0][..frame_headers_length], &frame_a[..frame_headers_length]);
    assert_eq!(
        &packets[0][frame_headers_length..],
        &[0x05, 0x06, 0x07, 0x08, 0x00, 0x02, 0xDA, 0xDA, 0xDA]
    );
}

#[test]
fn packets_across_all_virtual_channels_are_interleaved_in_ascending_order() {
    let frame_length = 13;
    let config = Config::new(frame_length, 0, false, false, false, false).unwrap();
    let mut demux = Demuxer::new(config);

    // One single-frame packet per VCID, fed in descending VCID order, each
    // filling its frame's 7-byte data field exactly.
    for vcid in (0..8u8).rev() {
        let mut frame = vec![0u8; 6];
        frame[1] = vcid << 1; // VCID occupies bits 4..6 of byte 1
        frame.extend_from_slice(&[vcid, 0, 0, 0, 0, 0, 0xDA]); // packet header + 1 payload byte
        demux.consume(&frame);
    }

    let packets = drain(&mut demux);
    assert_eq!(packets.len(), 8);
    for (vcid, pkt) in packets.iter().enumerate() {
        assert_eq!(pkt[0], vcid as u8, "expected ascending VCID emission order");
    }
}

#[test]
fn rejects_config_with_no_room_for_a_data_field() {
    assert!(Config::new(6, 0, true, true, false, false).is_err());
}
