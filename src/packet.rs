//! Space packet primary header helpers.
//!
//! Packets are never fully parsed by this crate -- only the two fields
//! needed to reassemble and filter them: total length and APID.

use crate::bits::read_uint;

/// Number of bytes in a space packet primary header.
pub const HEADER_LEN: usize = 6;

/// APID value reserved for idle/fill packets (11 bits, all ones).
pub const IDLE_APID: u16 = 0x7FF;

/// Total packet length in bytes, computed from a complete 6-byte header.
///
/// `hdr` must be at least [`HEADER_LEN`] bytes; bytes beyond that are
/// ignored.
///
/// # Panics
/// If `hdr` is shorter than [`HEADER_LEN`] -- by the time this is called
/// the reassembler has already confirmed it holds a complete header; a
/// short header here is an internal invariant violation, not malformed
/// input.
#[must_use]
pub fn packet_length(hdr: &[u8]) -> usize {
    assert!(
        hdr.len() >= HEADER_LEN,
        "packet_length requires a complete 6-byte header"
    );
    let len_field = u16::from_be_bytes([hdr[4], hdr[5]]);
    HEADER_LEN + usize::from(len_field) + 1
}

/// 11-bit APID extracted from bits 5..16 of a complete packet header.
///
/// # Panics
/// If `hdr` is shorter than [`HEADER_LEN`].
#[must_use]
pub fn apid(hdr: &[u8]) -> u16 {
    assert!(hdr.len() >= HEADER_LEN, "apid requires a complete 6-byte header");
    read_uint(hdr, 5, 11).expect("6 bytes is enough for an 11-bit field at offset 5") as u16
}

/// Whether a complete packet header identifies an idle/fill packet.
#[must_use]
pub fn is_idle(hdr: &[u8]) -> bool {
    apid(hdr) == IDLE_APID
}
