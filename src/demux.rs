//! The stream accumulator and public `consume` protocol.

use tracing::trace;

use crate::config::Config;
use crate::frame::Frame;
use crate::reassembly::{self, VcStats, VirtualChannel, NUM_VIRTUAL_CHANNELS};

/// Result of a single [`Demuxer::consume`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A complete space packet, ready for delivery. May be prefixed with
    /// its originating frame's headers, see [`Config::prefix_packets`].
    Packet(Vec<u8>),
    /// No packet is ready; the caller should supply more bytes (or call
    /// again with an empty slice to continue draining).
    NeedMore,
}

/// Streaming CCSDS TM transfer frame to space packet demultiplexer.
///
/// Owns all protocol state: the raw-byte accumulator, the 8 per-VCID
/// reassembly state machines, and the [`Config`] fixed at construction.
/// Entirely synchronous and single-threaded; see the crate docs for the
/// concurrency model.
pub struct Demuxer {
    config: Config,
    accumulator: Vec<u8>,
    channels: [VirtualChannel; NUM_VIRTUAL_CHANNELS],
}

impl Demuxer {
    /// Construct a new demultiplexer for the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut demux = Demuxer {
            config,
            accumulator: Vec::new(),
            channels: Default::default(),
        };
        demux.reset();
        demux
    }

    /// Discard all buffered and in-progress state. Called implicitly by
    /// [`Demuxer::new`]; callers should invoke this directly when the host
    /// re-initializes the underlying byte stream (e.g. after a reconnect).
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.channels = Default::default();
    }

    /// Feed raw bytes into the demultiplexer and attempt to produce one
    /// packet.
    ///
    /// Only a single complete frame is consumed from the accumulator per
    /// call, even if more than one is buffered -- call repeatedly (with an
    /// empty slice) to drain a backlog.
    pub fn consume(&mut self, bytes: &[u8]) -> Output {
        self.accumulator.extend_from_slice(bytes);

        if self.accumulator.len() >= self.config.frame_length() {
            let remainder = self.accumulator.split_off(self.config.frame_length());
            let frame_bytes = std::mem::replace(&mut self.accumulator, remainder);
            let frame = Frame::parse(&frame_bytes, &self.config);
            trace!(vcid = frame.vcid, fhp = frame.fhp, "processing frame");
            reassembly::handle_frame(&mut self.channels, &frame, &self.config);
        }

        match reassembly::next_packet(&mut self.channels, &self.config) {
            Some(packet) => Output::Packet(packet),
            None => Output::NeedMore,
        }
    }

    /// Observational per-virtual-channel counters, indexed by VCID.
    /// Purely diagnostic -- never consulted by the protocol logic.
    #[must_use]
    pub fn vc_stats(&self) -> [VcStats; NUM_VIRTUAL_CHANNELS] {
        std::array::from_fn(|vcid| self.channels[vcid].stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(14, 0, false, false, false, false).unwrap()
    }

    #[test]
    fn needs_more_before_a_whole_frame_arrives() {
        let mut demux = Demuxer::new(config());
        assert_eq!(demux.consume(&[0u8; 5]), Output::NeedMore);
    }

    #[test]
    fn byte_by_byte_and_whole_stream_feeding_agree() {
        let frame_a = hex::decode("010203040000050607080002DADA").unwrap();
        let frame_b = hex::decode("100212130001DA141516170000DA").unwrap();
        let mut stream = frame_a.clone();
        stream.extend_from_slice(&frame_b);

        let mut whole = Demuxer::new(config());
        let mut whole_packets = Vec::new();
        match whole.consume(&stream) {
            Output::Packet(p) => whole_packets.push(p),
            Output::NeedMore => {}
        }
        loop {
            match whole.consume(&[]) {
                Output::Packet(p) => whole_packets.push(p),
                Output::NeedMore => break,
            }
        }

        let mut byte_by_byte = Demuxer::new(config());
        let mut bb_packets = Vec::new();
        for b in &stream {
            match byte_by_byte.consume(&[*b]) {
                Output::Packet(p) => bb_packets.push(p),
                Output::NeedMore => {}
            }
        }
        loop {
            match byte_by_byte.consume(&[]) {
                Output::Packet(p) => bb_packets.push(p),
                Output::NeedMore => break,
            }
        }

        assert_eq!(whole_packets, bb_packets);
        assert_eq!(whole_packets.len(), 2);
    }

    #[test]
    fn reset_discards_in_progress_state() {
        let mut demux = Demuxer::new(config());
        let partial_frame = hex::decode("010203040000050607080002DADA").unwrap();
        assert_eq!(demux.consume(&partial_frame), Output::NeedMore);
        demux.reset();
        assert!(demux.accumulator.is_empty());
        for vc in &demux.channels {
            assert!(format!("{vc:?}").contains("pending_bytes_left: 0"));
        }
    }

    #[test]
    fn packets_emitted_in_ascending_vcid_order() {
        // VCID occupies bits 12..15, i.e. bits 4..6 (from the MSB) of byte
        // index 1 -- set it by shifting the channel number left by one bit.
        let mut frame_vc1 = hex::decode("010203040000050607080000DA").unwrap();
        frame_vc1.resize(13, 0);
        frame_vc1[1] = 1 << 1; // vcid = 1
        let mut frame_vc0 = hex::decode("010203040000141516170000DA").unwrap();
        frame_vc0.resize(13, 0);
        frame_vc0[1] = 0 << 1; // vcid = 0

        let config = Config::new(13, 0, false, false, false, false).unwrap();
        let mut demux = Demuxer::new(config);
        demux.consume(&frame_vc1);
        let mut stream = Vec::new();
        stream.extend_from_slice(&frame_vc0);
        let first = demux.consume(&stream);
        match first {
            Output::Packet(p) => assert_eq!(p, hex::decode("141516170000DA").unwrap()),
            Output::NeedMore => panic!("expected a packet from vc0"),
        }
    }
}
