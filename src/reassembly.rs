//! Per-virtual-channel space packet reassembly.
//!
//! Each of the 8 virtual channels independently tracks a queue of
//! in-progress and completed packets plus a byte counter describing what
//! the last (possibly incomplete) entry still owes. This is the direct
//! analog of the cache/VcidTracker state this crate's lineage used for AOS
//! MPDU reassembly, reworked for plain FHP/length semantics with no
//! integrity decoding.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::frame::FHP_NO_PACKET_START;
use crate::packet;

/// Number of virtual channels a [`crate::Demuxer`] tracks.
pub const NUM_VIRTUAL_CHANNELS: usize = 8;

/// Purely observational counters for one virtual channel. Never consulted
/// by the protocol logic itself -- exposed for host-side monitoring only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VcStats {
    /// Packets delivered to the caller from this channel.
    pub packets_emitted: u64,
    /// Idle packets discarded by the emission-side filter.
    pub idle_discarded: u64,
}

/// Reassembly state for a single virtual channel.
///
/// See the module docs and [`VirtualChannel::handle_frame`] for the
/// precedence rules governing disagreement between a packet's declared
/// length and the next frame's First Header Pointer.
#[derive(Debug, Default)]
pub struct VirtualChannel {
    /// In-progress and completed packet buffers, in emission order. All
    /// but the last are complete and ready for delivery.
    packet_queue: VecDeque<Vec<u8>>,
    /// Bytes still owed to the tail entry of `packet_queue`. Zero iff the
    /// tail entry is complete (or the queue is empty).
    pending_bytes_left: usize,
    stats: VcStats,
}

enum ContinuationOutcome {
    /// The data field, starting at the FHP offset, begins a new packet
    /// (or sequence of packets) and should be handed to `store_packets`.
    StorePackets,
    /// Frame processing is finished; nothing left to store this frame.
    Done,
}

impl VirtualChannel {
    /// Whether this channel has no pending (incomplete) packet.
    fn has_pending(&self) -> bool {
        self.pending_bytes_left > 0 && !self.packet_queue.is_empty()
    }

    /// Process one frame's worth of data for this channel.
    ///
    /// `frame_headers` are copied into new packet entries when
    /// `config.prefix_packets()` is set; they are never retained across
    /// calls.
    pub fn handle_frame(&mut self, frame_headers: &[u8], data_field: &[u8], fhp: u16, config: &Config) {
        match self.handle_continuation(data_field, fhp, config) {
            ContinuationOutcome::StorePackets => {
                let start = usize::from(fhp);
                self.store_packets(frame_headers, &data_field[start..], config);
            }
            ContinuationOutcome::Done => {}
        }
    }

    fn handle_continuation(&mut self, data_field: &[u8], fhp: u16, config: &Config) -> ContinuationOutcome {
        let no_packet_start = fhp == FHP_NO_PACKET_START;

        if !self.has_pending() {
            if no_packet_start {
                trace!("no pending packet and no packet start in frame; discarding data field");
                return ContinuationOutcome::Done;
            }
            return ContinuationOutcome::StorePackets;
        }

        let mut continuation: &[u8] = if no_packet_start {
            data_field
        } else {
            &data_field[..usize::from(fhp)]
        };

        // Header completion: the tail entry may not yet have its 6-byte
        // primary header fully accumulated.
        let prefix_len = config.packet_prefix_length();
        let body_len = self
            .packet_queue
            .back()
            .expect("has_pending implies a non-empty queue")
            .len()
            - prefix_len;
        if body_len < packet::HEADER_LEN {
            let rest_of_header = self.pending_bytes_left;
            if continuation.len() < rest_of_header {
                self.packet_queue
                    .back_mut()
                    .expect("checked above")
                    .extend_from_slice(continuation);
                self.pending_bytes_left = 0;
                trace!("continuation too short to complete packet header; packet truncated");
                return ContinuationOutcome::Done;
            }
            let (header_bytes, rest) = continuation.split_at(rest_of_header);
            let tail = self.packet_queue.back_mut().expect("checked above");
            tail.extend_from_slice(header_bytes);
            let header_start = tail.len() - packet::HEADER_LEN;
            let plen = packet::packet_length(&tail[header_start..]);
            self.pending_bytes_left = plen - packet::HEADER_LEN;
            continuation = rest;
        }

        let tail = self
            .packet_queue
            .back_mut()
            .expect("has_pending implies a non-empty queue");

        if no_packet_start {
            if self.pending_bytes_left < continuation.len() {
                tail.extend_from_slice(&continuation[..self.pending_bytes_left]);
                self.pending_bytes_left = 0;
            } else {
                tail.extend_from_slice(continuation);
                self.pending_bytes_left -= continuation.len();
            }
            ContinuationOutcome::Done
        } else {
            use std::cmp::Ordering;
            match self.pending_bytes_left.cmp(&continuation.len()) {
                Ordering::Less => {
                    // Length wins: packet ends before FHP.
                    tail.extend_from_slice(&continuation[..self.pending_bytes_left]);
                    self.pending_bytes_left = 0;
                }
                Ordering::Greater => {
                    // FHP wins: packet is cut short.
                    warn!("FHP/length disagreement: truncating packet at FHP boundary");
                    tail.extend_from_slice(continuation);
                    self.pending_bytes_left = 0;
                }
                Ordering::Equal => {
                    tail.extend_from_slice(continuation);
                    self.pending_bytes_left = 0;
                }
            }
            ContinuationOutcome::StorePackets
        }
    }

    fn store_packets(&mut self, frame_headers: &[u8], mut data_field: &[u8], config: &Config) {
        while !data_field.is_empty() {
            let mut entry = Vec::new();
            if config.prefix_packets() {
                entry.extend_from_slice(frame_headers);
            }

            if data_field.len() < packet::HEADER_LEN {
                entry.extend_from_slice(data_field);
                self.pending_bytes_left = packet::HEADER_LEN - data_field.len();
                self.packet_queue.push_back(entry);
                return;
            }

            let plen = packet::packet_length(&data_field[..packet::HEADER_LEN]);
            if plen > data_field.len() {
                entry.extend_from_slice(data_field);
                self.pending_bytes_left = plen - data_field.len();
                self.packet_queue.push_back(entry);
                return;
            }

            entry.extend_from_slice(&data_field[..plen]);
            self.packet_queue.push_back(entry);
            self.pending_bytes_left = 0;
            data_field = &data_field[plen..];
        }
    }

    /// Pop the next deliverable packet for this channel, applying the
    /// idle-packet filter, or `None` if this channel has nothing ready.
    fn next_packet(&mut self, config: &Config) -> Option<Vec<u8>> {
        loop {
            if self.packet_queue.len() == 1 && self.pending_bytes_left > 0 {
                return None;
            }
            let pkt = self.packet_queue.pop_front()?;
            if config.include_idle_packets() {
                self.stats.packets_emitted += 1;
                return Some(pkt);
            }
            let prefix_len = config.packet_prefix_length();
            // A packet truncated during header completion (§4.4.c) may be
            // shorter than a full header; it has no APID to read, so it
            // can't be idle -- deliver it rather than index past the end.
            let has_full_header = pkt.len() >= prefix_len + packet::HEADER_LEN;
            if !has_full_header || !packet::is_idle(&pkt[prefix_len..prefix_len + packet::HEADER_LEN]) {
                self.stats.packets_emitted += 1;
                return Some(pkt);
            }
            self.stats.idle_discarded += 1;
            debug!("discarding idle packet");
        }
    }

    /// Observational counters for this channel. Never consulted by the
    /// reassembly logic itself.
    #[must_use]
    pub fn stats(&self) -> VcStats {
        self.stats
    }
}

/// Process one non-idle frame, dispatching it to the appropriate channel.
pub(crate) fn handle_frame(channels: &mut [VirtualChannel; NUM_VIRTUAL_CHANNELS], frame: &crate::frame::Frame, config: &Config) {
    if frame.is_idle() {
        trace!("discarding idle frame");
        return;
    }
    let vc = &mut channels[usize::from(frame.vcid)];
    vc.handle_frame(frame.headers, frame.data_field, frame.fhp, config);
}

/// Emission phase (§4.5): ascending VCID order, first channel with a
/// deliverable packet wins.
pub(crate) fn next_packet(channels: &mut [VirtualChannel; NUM_VIRTUAL_CHANNELS], config: &Config) -> Option<Vec<u8>> {
    for vc in channels.iter_mut() {
        if let Some(pkt) = vc.next_packet(config) {
            return Some(pkt);
        }
    }
    None
}
