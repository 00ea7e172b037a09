use crate::checksum::icmp_probe_checksum;
use crate::icmpv4::echo_request::EchoRequestPacket;
use crate::icmpv4::{IcmpCode, IcmpType};

/// The fixed payload carried by every probe.
pub const PROBE_PAYLOAD: [u8; 11] = *b"hiilikeksis";

/// The size of a probe on the wire, header plus payload.
pub const PROBE_SIZE: usize = EchoRequestPacket::minimum_packet_size() + PROBE_PAYLOAD.len();

/// A fully built `ICMPv4` echo request probe.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ProbePacket {
    bytes: [u8; PROBE_SIZE],
}

impl ProbePacket {
    /// The wire bytes of the probe.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn identifier(&self) -> u16 {
        u16::from_be_bytes([self.bytes[4], self.bytes[5]])
    }

    #[must_use]
    pub const fn sequence(&self) -> u16 {
        u16::from_be_bytes([self.bytes[6], self.bytes[7]])
    }

    #[must_use]
    pub const fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.bytes[2], self.bytes[3]])
    }
}

/// Build the echo request probe for a given `identifier` and `sequence`.
///
/// The checksum is computed over the packet with a zeroed checksum field and
/// then written back in network byte order.
#[must_use]
pub fn build_probe(identifier: u16, sequence: u16) -> ProbePacket {
    let mut bytes = [0_u8; PROBE_SIZE];
    let Ok(mut packet) = EchoRequestPacket::new(&mut bytes) else {
        unreachable!("probe buffer is larger than the echo request header")
    };
    packet.set_icmp_type(IcmpType::EchoRequest);
    packet.set_icmp_code(IcmpCode(0));
    packet.set_identifier(identifier);
    packet.set_sequence(sequence);
    packet.set_payload(&PROBE_PAYLOAD);
    packet.set_checksum(0);
    let checksum = icmp_probe_checksum(packet.packet());
    packet.set_checksum(checksum);
    ProbePacket { bytes }
}
