use crate::report;
use anyhow::Context;
use hoptrace_core::{Builder, CompletionReason, Config, Prober};
use hoptrace_dns::{Destination, Resolver};
use std::io::Write;
use std::net::IpAddr;
use std::ops::ControlFlow;
use std::time::Duration;

/// The settings of a single trace session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    /// The hostname or IPv4 address to trace.
    pub target: String,
    /// The ICMP identifier of every probe.
    pub trace_identifier: u16,
    pub max_hops: u8,
    /// How long to wait for the reply to each probe.
    pub timeout: Duration,
    /// Show responders as `name [addr]` rather than a bare address.
    pub resolve_names: bool,
}

/// Run a trace session and write the report to `out`.
///
/// Returns `None` when the target could not be resolved, in which case a
/// message is written and nothing is probed. The prober is created by
/// `make_prober` once the destination address is known.
pub fn run<R, P, F, W>(
    cfg: &SessionConfig,
    resolver: &R,
    make_prober: F,
    out: &mut W,
) -> anyhow::Result<Option<CompletionReason>>
where
    R: Resolver,
    P: Prober,
    F: FnOnce(&Config) -> P,
    W: Write,
{
    let destination = match Destination::resolve(resolver, &cfg.target) {
        Ok(destination) => destination,
        Err(err) => {
            tracing::debug!(host = %cfg.target, %err, "unable to resolve target");
            writeln!(out, "Unable to resolve target system name {}.", cfg.target)?;
            return Ok(None);
        }
    };
    let tracer = Builder::new(IpAddr::V4(destination.addr))
        .trace_identifier(cfg.trace_identifier)
        .max_ttl(cfg.max_hops)
        .read_timeout(cfg.timeout)
        .build()?;
    writeln!(
        out,
        "Tracing route to {} [{}]",
        destination.name, destination.addr
    )?;
    writeln!(out, "over a maximum of {} hops:", cfg.max_hops)?;
    writeln!(out)?;
    let mut prober = make_prober(tracer.config());
    let mut written = Ok(());
    let reason = tracer
        .run_with(&mut prober, |hop| {
            let line = report::format_hop(hop, resolver, cfg.resolve_names);
            written = writeln!(out, "{line}");
            if written.is_ok() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .with_context(|| format!("failed to trace route to {}", destination.addr))?;
    written.context("failed to write hop")?;
    writeln!(out)?;
    writeln!(out, "Trace complete.")?;
    Ok(Some(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoptrace_core::{Error, IoError, IoOperation, ProbeReply, ProbeResult, ReplyKind, TimeToLive};
    use hoptrace_dns::{DnsEntry, ResolvedIpAddrs};
    use hoptrace_packet::icmpv4::IcmpTimeExceededCode;
    use mockall::mock;
    use std::collections::HashMap;
    use std::io;
    use std::net::Ipv4Addr;

    mock! {
        ScriptedProber {}
        impl Prober for ScriptedProber {
            fn probe(&mut self, ttl: TimeToLive) -> hoptrace_core::Result<ProbeResult>;
        }
    }

    const TARGET: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
    const GATEWAY: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    #[derive(Default)]
    struct FakeResolver {
        forward: HashMap<String, IpAddr>,
        reverse: HashMap<IpAddr, String>,
    }

    impl FakeResolver {
        fn with_forward(mut self, hostname: &str, addr: Ipv4Addr) -> Self {
            self.forward.insert(hostname.to_string(), IpAddr::V4(addr));
            self
        }

        fn with_reverse(mut self, addr: Ipv4Addr, hostname: &str) -> Self {
            self.reverse.insert(IpAddr::V4(addr), hostname.to_string());
            self
        }
    }

    impl Resolver for FakeResolver {
        fn lookup(&self, hostname: impl AsRef<str>) -> hoptrace_dns::Result<ResolvedIpAddrs> {
            self.forward
                .get(hostname.as_ref())
                .map(|addr| ResolvedIpAddrs::new(vec![*addr]))
                .ok_or_else(|| hoptrace_dns::Error::LookupFailed("unknown host".into()))
        }

        fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
            let addr = addr.into();
            match self.reverse.get(&addr) {
                Some(hostname) => DnsEntry::Resolved(addr, vec![hostname.clone()]),
                None => DnsEntry::NotFound(addr),
            }
        }
    }

    fn session(target: &str, max_hops: u8, resolve_names: bool) -> SessionConfig {
        SessionConfig {
            target: target.to_string(),
            trace_identifier: 1234,
            max_hops,
            timeout: Duration::from_millis(10),
            resolve_names,
        }
    }

    fn reply(millis: u64, addr: Ipv4Addr, kind: ReplyKind) -> ProbeResult {
        ProbeResult::Reply(ProbeReply {
            elapsed: Duration::from_millis(millis),
            addr: Some(IpAddr::V4(addr)),
            kind,
        })
    }

    fn time_exceeded(millis: u64, addr: Ipv4Addr) -> ProbeResult {
        reply(
            millis,
            addr,
            ReplyKind::TimeExceeded {
                code: IcmpTimeExceededCode::TtlExpired,
            },
        )
    }

    fn echo_reply(millis: u64, ttl: TimeToLive) -> ProbeResult {
        reply(
            millis,
            TARGET,
            ReplyKind::EchoReply {
                identifier: 1234,
                sequence: u16::from(ttl.0),
            },
        )
    }

    /// A prober which replays `script` in order, checking the ttl of each probe.
    fn scripted(script: Vec<(u8, ProbeResult)>) -> MockScriptedProber {
        let mut prober = MockScriptedProber::new();
        let calls = script.len();
        let mut script = script.into_iter();
        prober.expect_probe().times(calls).returning(move |ttl| {
            let (expected_ttl, result) = script.next().unwrap();
            assert_eq!(TimeToLive(expected_ttl), ttl);
            Ok(result)
        });
        prober
    }

    fn run_to_string<P: Prober>(
        cfg: &SessionConfig,
        resolver: &FakeResolver,
        prober: P,
    ) -> anyhow::Result<(Option<CompletionReason>, String)> {
        let mut out = Vec::new();
        let reason = run(cfg, resolver, |_| prober, &mut out)?;
        Ok((reason, String::from_utf8(out)?))
    }

    #[test]
    fn test_trace_to_hostname() -> anyhow::Result<()> {
        let resolver = FakeResolver::default()
            .with_forward("example.com", TARGET)
            .with_reverse(GATEWAY, "gateway.lan")
            .with_reverse(TARGET, "example.net");
        let prober = scripted(vec![
            (1, time_exceeded(1, GATEWAY)),
            (1, reply(0, GATEWAY, ReplyKind::Malformed { len: 0 })),
            (1, time_exceeded(2, GATEWAY)),
            (2, ProbeResult::TimedOut),
            (2, ProbeResult::TimedOut),
            (2, ProbeResult::TimedOut),
            (3, echo_reply(23, TimeToLive(3))),
            (3, echo_reply(24, TimeToLive(3))),
            (3, echo_reply(25, TimeToLive(3))),
        ]);
        let (reason, output) = run_to_string(&session("example.com", 30, true), &resolver, prober)?;
        assert_eq!(Some(CompletionReason::TargetFound(TimeToLive(3))), reason);
        let expected = [
            "Tracing route to example.com [93.184.216.34]",
            "over a maximum of 30 hops:",
            "",
            "1    1 ms    <1 ms   2 ms       gateway.lan [10.0.0.1]",
            "2    *       *       *          Request timed out.",
            "3    23 ms   24 ms   25 ms      example.net [93.184.216.34]",
            "",
            "Trace complete.",
            "",
        ]
        .join("\n");
        pretty_assertions::assert_eq!(expected, output);
        Ok(())
    }

    #[test]
    fn test_trace_to_numeric_target_without_resolve() -> anyhow::Result<()> {
        let resolver = FakeResolver::default()
            .with_reverse(GATEWAY, "gateway.lan")
            .with_reverse(TARGET, "example.net");
        let prober = scripted(vec![
            (1, time_exceeded(3, GATEWAY)),
            (1, ProbeResult::TimedOut),
            (1, time_exceeded(4, GATEWAY)),
            (2, echo_reply(12, TimeToLive(2))),
            (2, echo_reply(11, TimeToLive(2))),
            (2, echo_reply(13, TimeToLive(2))),
        ]);
        let (reason, output) =
            run_to_string(&session("93.184.216.34", 30, false), &resolver, prober)?;
        assert_eq!(Some(CompletionReason::TargetFound(TimeToLive(2))), reason);
        let expected = [
            "Tracing route to example.net [93.184.216.34]",
            "over a maximum of 30 hops:",
            "",
            "1    3 ms    *       4 ms       10.0.0.1",
            "2    12 ms   11 ms   13 ms      93.184.216.34",
            "",
            "Trace complete.",
            "",
        ]
        .join("\n");
        pretty_assertions::assert_eq!(expected, output);
        Ok(())
    }

    #[test]
    fn test_numeric_target_without_reverse_name() -> anyhow::Result<()> {
        let target = Ipv4Addr::new(10, 1, 2, 3);
        let prober = scripted(vec![
            (1, reply(1, target, ReplyKind::EchoReply { identifier: 1234, sequence: 1 })),
            (1, reply(1, target, ReplyKind::EchoReply { identifier: 1234, sequence: 1 })),
            (1, reply(1, target, ReplyKind::EchoReply { identifier: 1234, sequence: 1 })),
        ]);
        let (_, output) = run_to_string(&session("10.1.2.3", 30, true), &FakeResolver::default(), prober)?;
        assert!(output.starts_with("Tracing route to 10.1.2.3 [10.1.2.3]\n"));
        Ok(())
    }

    #[test]
    fn test_silent_hop_then_single_reply() -> anyhow::Result<()> {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let prober = scripted(vec![
            (1, ProbeResult::TimedOut),
            (1, ProbeResult::TimedOut),
            (1, ProbeResult::TimedOut),
            (2, time_exceeded(2, GATEWAY)),
            (2, ProbeResult::TimedOut),
            (2, ProbeResult::TimedOut),
        ]);
        let (reason, output) = run_to_string(&session("example.com", 2, false), &resolver, prober)?;
        assert_eq!(Some(CompletionReason::MaxHopsReached), reason);
        let expected = [
            "Tracing route to example.com [93.184.216.34]",
            "over a maximum of 2 hops:",
            "",
            "1    *       *       *          Request timed out.",
            "2    2 ms    *       *          10.0.0.1",
            "",
            "Trace complete.",
            "",
        ]
        .join("\n");
        pretty_assertions::assert_eq!(expected, output);
        Ok(())
    }

    #[test]
    fn test_target_found_at_hop_five() -> anyhow::Result<()> {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let mut script = vec![];
        for ttl in 1..=4 {
            for _ in 0..3 {
                script.push((ttl, time_exceeded(5, Ipv4Addr::new(10, 0, 0, ttl))));
            }
        }
        script.push((5, ProbeResult::TimedOut));
        script.push((5, echo_reply(30, TimeToLive(5))));
        script.push((5, ProbeResult::TimedOut));
        let (reason, output) =
            run_to_string(&session("example.com", 30, true), &resolver, scripted(script))?;
        assert_eq!(Some(CompletionReason::TargetFound(TimeToLive(5))), reason);
        let hop_lines = output.lines().skip(3).take_while(|line| !line.is_empty());
        assert_eq!(5, hop_lines.count());
        assert!(output.contains("\n5    *       30 ms   *          93.184.216.34\n"));
        Ok(())
    }

    #[test]
    fn test_max_hops_reached() -> anyhow::Result<()> {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let mut prober = MockScriptedProber::new();
        prober
            .expect_probe()
            .times(90)
            .returning(|_| Ok(ProbeResult::TimedOut));
        let (reason, output) = run_to_string(&session("example.com", 30, true), &resolver, prober)?;
        assert_eq!(Some(CompletionReason::MaxHopsReached), reason);
        let hop_lines = output
            .lines()
            .skip(3)
            .take_while(|line| !line.is_empty())
            .collect::<Vec<_>>();
        assert_eq!(30, hop_lines.len());
        assert!(hop_lines
            .iter()
            .all(|line| line.ends_with("*       *       *          Request timed out.")));
        assert!(hop_lines[29].starts_with("30   "));
        assert!(output.ends_with("\nTrace complete.\n"));
        Ok(())
    }

    #[test]
    fn test_unresolvable_target() -> anyhow::Result<()> {
        let mut prober = MockScriptedProber::new();
        prober.expect_probe().never();
        let (reason, output) = run_to_string(
            &session("nowhere.invalid", 30, true),
            &FakeResolver::default(),
            prober,
        )?;
        assert_eq!(None, reason);
        assert_eq!("Unable to resolve target system name nowhere.invalid.\n", output);
        Ok(())
    }

    #[test]
    fn test_probe_failure_aborts_session() {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let mut prober = MockScriptedProber::new();
        prober.expect_probe().times(1).returning(|_| {
            Err(Error::ProbeFailed(IoError::Other(
                io::Error::from(io::ErrorKind::NetworkUnreachable),
                IoOperation::NewSocket,
            )))
        });
        let mut out = Vec::new();
        let err = run(
            &session("example.com", 30, true),
            &resolver,
            |_| prober,
            &mut out,
        )
        .unwrap_err();
        assert_eq!("failed to trace route to 93.184.216.34", err.to_string());
        let output = String::from_utf8(out).unwrap();
        assert!(!output.contains("Trace complete."));
    }

    /// A writer which fails with `BrokenPipe` once `limit` bytes are written.
    struct ClosedAfter {
        limit: usize,
        written: Vec<u8>,
    }

    impl Write for ClosedAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_output_stops_probing() {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let header = "Tracing route to example.com [93.184.216.34]\nover a maximum of 30 hops:\n\n";
        let mut out = ClosedAfter {
            limit: header.len(),
            written: Vec::new(),
        };
        let mut prober = MockScriptedProber::new();
        prober
            .expect_probe()
            .times(3)
            .returning(|_| Ok(ProbeResult::TimedOut));
        let err = run(
            &session("example.com", 30, true),
            &resolver,
            |_| prober,
            &mut out,
        )
        .unwrap_err();
        assert_eq!("failed to write hop", err.to_string());
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io::ErrorKind::BrokenPipe, io_err.kind());
        assert_eq!(header.as_bytes(), out.written.as_slice());
    }

    #[test]
    fn test_prober_receives_validated_config() -> anyhow::Result<()> {
        let resolver = FakeResolver::default().with_forward("example.com", TARGET);
        let mut out = Vec::new();
        run(
            &session("example.com", 1, true),
            &resolver,
            |config| {
                assert_eq!(TARGET, config.target_addr);
                assert_eq!(1234, config.trace_identifier.0);
                assert_eq!(1, config.max_ttl.0);
                assert_eq!(Duration::from_millis(10), config.read_timeout);
                let mut prober = MockScriptedProber::new();
                prober
                    .expect_probe()
                    .times(3)
                    .returning(|_| Ok(ProbeResult::TimedOut));
                prober
            },
            &mut out,
        )?;
        Ok(())
    }
}
