use hoptrace_core::Hop;
use hoptrace_dns::{display_addr, Resolver};
use itertools::Itertools;
use std::time::Duration;

/// Shown in place of the round trip time of a probe that timed out.
const MISS_MARKER: &str = "*";

/// Shown in place of the responders when no probe of a hop was answered.
const NO_REPLY: &str = "Request timed out.";

/// Separates the time columns from the responders and each responder.
const SEPARATOR: &str = "   ";

/// Format a round trip time as whole milliseconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_millis(1) {
        String::from("<1 ms")
    } else {
        format!("{} ms", elapsed.as_millis())
    }
}

/// Format the report line of a completed hop.
pub fn format_hop<R: Resolver>(hop: &Hop, resolver: &R, resolve_names: bool) -> String {
    let times = hop
        .samples()
        .iter()
        .map(|sample| {
            let time = sample.map_or_else(|| String::from(MISS_MARKER), format_elapsed);
            format!("{time:<8}")
        })
        .collect::<String>();
    let mut line = format!("{:<5}{times}{SEPARATOR}", hop.ttl().0);
    let mut addrs = hop.addrs().peekable();
    if addrs.peek().is_none() {
        line.push_str(NO_REPLY);
    } else {
        let responders = addrs
            .map(|addr| display_addr(resolver, *addr, resolve_names))
            .join(SEPARATOR);
        line.push_str(&responders);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoptrace_core::{ProbeReply, ProbeResult, ReplyKind, TimeToLive};
    use hoptrace_dns::{DnsEntry, Error, ResolvedIpAddrs, Result};
    use hoptrace_packet::icmpv4::IcmpTimeExceededCode;
    use std::net::{IpAddr, Ipv4Addr};
    use test_case::test_case;

    const ROUTER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    struct NamedResolver;

    impl Resolver for NamedResolver {
        fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
            Err(Error::NoIpv4Address(hostname.as_ref().to_string()))
        }

        fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
            let addr = addr.into();
            if addr == ROUTER {
                DnsEntry::Resolved(addr, vec![String::from("gateway.lan")])
            } else {
                DnsEntry::NotFound(addr)
            }
        }
    }

    fn time_exceeded(elapsed: Duration, addr: IpAddr) -> ProbeResult {
        ProbeResult::Reply(ProbeReply {
            elapsed,
            addr: Some(addr),
            kind: ReplyKind::TimeExceeded {
                code: IcmpTimeExceededCode::TtlExpired,
            },
        })
    }

    fn hop(ttl: u8, results: &[ProbeResult]) -> Hop {
        let mut hop = Hop::new(TimeToLive(ttl));
        for result in results {
            hop.record(result);
        }
        hop
    }

    #[test_case(Duration::from_micros(400), "<1 ms"; "sub millisecond")]
    #[test_case(Duration::from_micros(999), "<1 ms"; "just under a millisecond")]
    #[test_case(Duration::from_millis(1), "1 ms"; "one millisecond")]
    #[test_case(Duration::from_micros(23_700), "23 ms"; "truncated not rounded")]
    #[test_case(Duration::from_millis(1500), "1500 ms"; "over a second")]
    fn test_format_elapsed(elapsed: Duration, expected: &str) {
        assert_eq!(expected, format_elapsed(elapsed));
    }

    #[test]
    fn test_format_hop_all_replied() {
        let ms = Duration::from_millis;
        let hop = hop(
            1,
            &[
                time_exceeded(ms(1), ROUTER),
                time_exceeded(ms(2), ROUTER),
                time_exceeded(Duration::from_micros(400), ROUTER),
            ],
        );
        assert_eq!(
            "1    1 ms    2 ms    <1 ms      gateway.lan [10.0.0.1]",
            format_hop(&hop, &NamedResolver, true)
        );
    }

    #[test]
    fn test_format_hop_no_resolve() {
        let ms = Duration::from_millis;
        let hop = hop(
            1,
            &[
                time_exceeded(ms(1), ROUTER),
                time_exceeded(ms(2), ROUTER),
                time_exceeded(ms(3), ROUTER),
            ],
        );
        assert_eq!(
            "1    1 ms    2 ms    3 ms       10.0.0.1",
            format_hop(&hop, &NamedResolver, false)
        );
    }

    #[test]
    fn test_format_hop_all_timed_out() {
        let hop = hop(
            7,
            &[ProbeResult::TimedOut, ProbeResult::TimedOut, ProbeResult::TimedOut],
        );
        assert_eq!(
            "7    *       *       *          Request timed out.",
            format_hop(&hop, &NamedResolver, true)
        );
    }

    #[test]
    fn test_format_hop_partial_with_multiple_responders() {
        let ms = Duration::from_millis;
        let hop = hop(
            12,
            &[
                time_exceeded(ms(10), OTHER),
                ProbeResult::TimedOut,
                time_exceeded(ms(12), ROUTER),
            ],
        );
        assert_eq!(
            "12   10 ms   *       12 ms      10.0.0.2   gateway.lan [10.0.0.1]",
            format_hop(&hop, &NamedResolver, true)
        );
    }

    #[test]
    fn test_format_hop_reply_without_address() {
        let hop = hop(
            3,
            &[
                ProbeResult::Reply(ProbeReply {
                    elapsed: Duration::from_millis(5),
                    addr: None,
                    kind: ReplyKind::Malformed { len: 4 },
                }),
                ProbeResult::TimedOut,
                ProbeResult::TimedOut,
            ],
        );
        assert_eq!(
            "3    5 ms    *       *          Request timed out.",
            format_hop(&hop, &NamedResolver, true)
        );
    }
}
