//! Transfer frame primary header fields and region slicing.
//!
//! Adapted from the VCDU-header style of decoding used elsewhere in this
//! crate's lineage, but against the CCSDS TM primary header's FHP/VCID
//! layout rather than an AOS VCDU header.

use crate::bits::read_uint;
use crate::config::Config;

/// First Header Pointer value meaning "this frame carries no space-packet
/// data at all" -- the whole frame is idle fill.
pub const FHP_IDLE_FRAME: u16 = 0x7FE;

/// First Header Pointer value meaning "no packet header starts in this
/// frame's data field" -- the whole data field is continuation.
pub const FHP_NO_PACKET_START: u16 = 0x7FF;

/// A single decoded transfer frame: its primary header fields plus the
/// three regions (`headers`, `data_field`, trailer) derived from a
/// [`Config`].
///
/// Borrows from the original frame bytes; callers needing to retain the
/// header bytes past the frame's lifetime (for `prefix_packets`) should
/// copy `headers` into an owned `Vec<u8>`.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Raw First Header Pointer value, 0..=0x7FF.
    pub fhp: u16,
    /// Virtual Channel ID, 0..=7.
    pub vcid: u8,
    /// Primary header plus secondary header bytes, for prefixing.
    pub headers: &'a [u8],
    /// The frame's data field -- where space packets live.
    pub data_field: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Parse a frame of exactly `config.frame_length()` bytes.
    ///
    /// # Panics
    /// If `frame` is not exactly `config.frame_length()` bytes. The
    /// accumulator in [`crate::demux`] only ever hands this function
    /// whole, correctly-sized frames.
    #[must_use]
    pub fn parse(frame: &'a [u8], config: &Config) -> Self {
        assert_eq!(
            frame.len(),
            config.frame_length(),
            "frame must be exactly frame_length bytes"
        );

        // FHP: low 11 bits of bytes 4..6, i.e. bit offset 37, 11 bits wide.
        let fhp = read_uint(frame, 37, 11).expect("frame long enough to hold primary header") as u16;
        // VCID: 3 bits at bit offset 12.
        let vcid = read_uint(frame, 12, 3).expect("frame long enough to hold primary header") as u8;

        let headers_len = config.frame_headers_length();
        let data_len = config.frame_data_field_length();
        let headers = &frame[..headers_len];
        let data_field = &frame[headers_len..headers_len + data_len];

        Frame {
            fhp,
            vcid,
            headers,
            data_field,
        }
    }

    /// Whether this frame is pure idle fill (FHP = `0x7FE`).
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.fhp == FHP_IDLE_FRAME
    }

    /// Whether this frame's data field contains no packet start (FHP = `0x7FF`).
    #[must_use]
    pub fn has_no_packet_start(&self) -> bool {
        self.fhp == FHP_NO_PACKET_START
    }
}
