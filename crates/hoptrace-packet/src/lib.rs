//! Packet wire format parsing and building for `hoptrace`.
//!
//! The following packets are supported:
//! - `ICMPv4` (`EchoRequest`, `EchoReply` and the common header of all other types)
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example builds the probe packet sent for the first hop and
//! checks that it carries a valid checksum:
//!
//! ```rust
//! use hoptrace_packet::checksum;
//! use hoptrace_packet::probe::build_probe;
//!
//! let probe = build_probe(0x1234, 1);
//! assert_eq!(19, probe.as_bytes().len());
//! assert_eq!(&probe.as_bytes()[8..], b"hiilikeksis");
//! assert!(checksum::verify(probe.as_bytes()));
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `ICMPv4` packets.
pub mod icmpv4;

/// The `ICMPv4` echo request probe sent for each hop.
pub mod probe;

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
