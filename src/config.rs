use typed_builder::TypedBuilder;

use crate::error::{Error, Result};

/// Immutable configuration for a [`crate::Demuxer`], fixed at construction
/// time for the lifetime of the instance.
///
/// [`Config::new`] is the validating constructor matching the positional
/// parameters of the external interface. [`Config::builder`] is also
/// available for the common case of leaving `prefix_packets` and
/// `include_idle_packets` at their defaults; call [`Config::checked`] on
/// the result before use, since the builder itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct Config {
    /// Total size, in bytes, of a single fixed-length TM transfer frame.
    frame_length: usize,
    /// Length, in bytes, of the secondary header following the 6-byte
    /// primary header. Zero means absent.
    secondary_header_length: usize,
    /// Whether frames carry a 4-byte Operational Control Field trailer.
    has_ocf: bool,
    /// Whether frames carry a 2-byte Frame Error Control Field trailer.
    has_fecf: bool,
    /// When true, each emitted packet is prefixed with the primary +
    /// secondary header bytes of the frame in which the packet's first
    /// byte appeared.
    #[builder(default)]
    prefix_packets: bool,
    /// When true, packets with APID `0x7FF` (idle/fill) are delivered to
    /// the caller instead of being discarded.
    #[builder(default)]
    include_idle_packets: bool,
}

impl Config {
    /// Construct and validate from the positional fields described in the
    /// external interface.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if any derived value would be
    /// invalid -- see the field docs on [`Config`].
    pub fn new(
        frame_length: usize,
        secondary_header_length: usize,
        has_ocf: bool,
        has_fecf: bool,
        prefix_packets: bool,
        include_idle_packets: bool,
    ) -> Result<Self> {
        Self::builder()
            .frame_length(frame_length)
            .secondary_header_length(secondary_header_length)
            .has_ocf(has_ocf)
            .has_fecf(has_fecf)
            .prefix_packets(prefix_packets)
            .include_idle_packets(include_idle_packets)
            .build()
            .checked()
    }

    /// Validate the derived invariants documented on [`Config`], consuming
    /// and returning `self` on success.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if any derived value is invalid.
    pub fn checked(self) -> Result<Self> {
        if self.frame_headers_length() + self.frame_trailer_length() + 1 > self.frame_length {
            return Err(Error::InvalidConfig(format!(
                "frame_length {} too small for headers ({}) + trailer ({}) + 1 byte of data",
                self.frame_length,
                self.frame_headers_length(),
                self.frame_trailer_length()
            )));
        }
        if self.frame_data_field_length() < 1 {
            return Err(Error::InvalidConfig(
                "frame_data_field_length must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// Primary (6 bytes) plus secondary header length.
    #[must_use]
    pub fn frame_headers_length(&self) -> usize {
        6 + self.secondary_header_length
    }

    /// Total trailer length: OCF (4 bytes if present) + FECF (2 bytes if present).
    #[must_use]
    pub fn frame_trailer_length(&self) -> usize {
        usize::from(self.has_ocf) * 4 + usize::from(self.has_fecf) * 2
    }

    /// Size, in bytes, of the frame's data field.
    #[must_use]
    pub fn frame_data_field_length(&self) -> usize {
        self.frame_length - self.frame_headers_length() - self.frame_trailer_length()
    }

    /// Number of prefix bytes applied to each emitted packet, zero unless
    /// `prefix_packets` is enabled.
    #[must_use]
    pub fn packet_prefix_length(&self) -> usize {
        if self.prefix_packets {
            self.frame_headers_length()
        } else {
            0
        }
    }

    #[must_use]
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    #[must_use]
    pub fn prefix_packets(&self) -> bool {
        self.prefix_packets
    }

    #[must_use]
    pub fn include_idle_packets(&self) -> bool {
        self.include_idle_packets
    }
}
