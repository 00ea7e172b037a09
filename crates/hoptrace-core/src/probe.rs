use crate::constants::IPV4_HEADER_SIZE;
use hoptrace_packet::icmpv4::echo_reply::EchoReplyPacket;
use hoptrace_packet::icmpv4::{IcmpCode, IcmpPacket, IcmpTimeExceededCode, IcmpType};
use std::net::IpAddr;
use std::time::Duration;

/// The outcome of a single probe attempt.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProbeResult {
    /// A packet was received before the timeout.
    Reply(ProbeReply),
    /// Nothing was received before the timeout.
    TimedOut,
}

/// A packet received in response to a probe.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeReply {
    /// The time between sending the probe and receiving the reply.
    pub elapsed: Duration,
    /// The address of the responder, if the socket reported one.
    pub addr: Option<IpAddr>,
    /// What was received.
    pub kind: ReplyKind,
}

/// The type of a received reply.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReplyKind {
    /// An `EchoReply` from the target.
    EchoReply { identifier: u16, sequence: u16 },
    /// A `TimeExceeded` from an intermediate router.
    TimeExceeded { code: IcmpTimeExceededCode },
    /// Any other `ICMP` type.
    Other { icmp_type: IcmpType, code: IcmpCode },
    /// A packet too short to carry an `ICMP` header after the IPv4 header.
    Malformed { len: usize },
}

impl ReplyKind {
    /// Did the reply come from the target?
    #[must_use]
    pub const fn is_target(&self) -> bool {
        matches!(self, Self::EchoReply { .. })
    }

    /// Was the reply too short to decode?
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Classify a received packet.
///
/// The `ICMP` header is read from a fixed offset after a 20 byte IPv4 header
/// and the buffer length is validated first.
#[must_use]
pub fn parse_reply(buf: &[u8]) -> ReplyKind {
    let Some(icmp_buf) = buf.get(IPV4_HEADER_SIZE..) else {
        return ReplyKind::Malformed { len: buf.len() };
    };
    let Ok(icmp) = IcmpPacket::new_view(icmp_buf) else {
        return ReplyKind::Malformed { len: buf.len() };
    };
    match icmp.get_icmp_type() {
        IcmpType::EchoReply => match EchoReplyPacket::new_view(icmp_buf) {
            Ok(echo) => ReplyKind::EchoReply {
                identifier: echo.get_identifier(),
                sequence: echo.get_sequence(),
            },
            Err(_) => ReplyKind::Malformed { len: buf.len() },
        },
        IcmpType::TimeExceeded => ReplyKind::TimeExceeded {
            code: IcmpTimeExceededCode::from(icmp.get_icmp_code()),
        },
        icmp_type => ReplyKind::Other {
            icmp_type,
            code: icmp.get_icmp_code(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use test_case::test_case;

    const IPV4_HEADER: [u8; 20] = hex!(
        "
        45 00 00 2f 00 00 00 00 40 01 00 00 0a 00 00 01
        c0 a8 01 02
        "
    );

    fn with_ipv4_header(icmp: &[u8]) -> Vec<u8> {
        let mut buf = IPV4_HEADER.to_vec();
        buf.extend_from_slice(icmp);
        buf
    }

    #[test]
    fn test_parse_echo_reply() {
        let buf = with_ipv4_header(&hex!(
            "00 00 66 b4 12 34 00 01 68 69 69 6c 69 6b 65 6b 73 69 73"
        ));
        let kind = parse_reply(&buf);
        assert_eq!(
            ReplyKind::EchoReply {
                identifier: 0x1234,
                sequence: 1
            },
            kind
        );
        assert!(kind.is_target());
    }

    #[test]
    fn test_parse_time_exceeded() {
        let buf = with_ipv4_header(&hex!("0b 00 f4 ff 00 00 00 00"));
        let kind = parse_reply(&buf);
        assert_eq!(
            ReplyKind::TimeExceeded {
                code: IcmpTimeExceededCode::TtlExpired
            },
            kind
        );
        assert!(!kind.is_target());
    }

    #[test]
    fn test_parse_destination_unreachable() {
        let buf = with_ipv4_header(&hex!("03 03 fc fc 00 00 00 00"));
        let kind = parse_reply(&buf);
        assert_eq!(
            ReplyKind::Other {
                icmp_type: IcmpType::DestinationUnreachable,
                code: IcmpCode(3)
            },
            kind
        );
        assert!(!kind.is_target());
    }

    #[test_case(0; "empty")]
    #[test_case(19; "inside the ipv4 header")]
    #[test_case(20; "ipv4 header only")]
    #[test_case(27; "one byte short")]
    fn test_parse_short_buffer(len: usize) {
        let buf = vec![0_u8; len];
        let kind = parse_reply(&buf);
        assert_eq!(ReplyKind::Malformed { len }, kind);
        assert!(kind.is_malformed());
        assert!(!kind.is_target());
    }

    #[test]
    fn test_parse_minimum_echo_reply() {
        let mut buf = vec![0_u8; 28];
        buf[24..28].copy_from_slice(&[0x04, 0xd2, 0x00, 0x1e]);
        assert_eq!(
            ReplyKind::EchoReply {
                identifier: 1234,
                sequence: 30
            },
            parse_reply(&buf)
        );
    }
}
