use crate::config::Config;
use crate::constants::MAX_PACKET_SIZE;
use crate::error::Result;
use crate::net::channel::ProbeChannel;
use crate::net::socket::Socket;
use crate::probe::{parse_reply, ProbeReply, ProbeResult};
use crate::types::{Sequence, TimeToLive, TraceId};
use hoptrace_packet::probe::build_probe;
use std::marker::PhantomData;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Send a single probe at a given hop-limit and wait for its outcome.
#[cfg_attr(test, mockall::automock)]
pub trait Prober {
    /// Probe once with the given `ttl`.
    ///
    /// A timeout is a [`ProbeResult::TimedOut`], only failures to open a
    /// channel, send a probe or wait on the socket are errors.
    fn probe(&mut self, ttl: TimeToLive) -> Result<ProbeResult>;
}

/// A [`Prober`] which opens a fresh [`ProbeChannel`] for every attempt.
#[derive(Debug)]
pub struct HopProber<S> {
    target_addr: Ipv4Addr,
    trace_identifier: TraceId,
    read_timeout: Duration,
    socket: PhantomData<S>,
}

impl<S: Socket> HopProber<S> {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            target_addr: config.target_addr,
            trace_identifier: config.trace_identifier,
            read_timeout: config.read_timeout,
            socket: PhantomData,
        }
    }
}

impl<S: Socket> Prober for HopProber<S> {
    #[instrument(skip(self), level = "trace")]
    fn probe(&mut self, ttl: TimeToLive) -> Result<ProbeResult> {
        let mut channel = ProbeChannel::<S>::open(ttl)?;
        let probe = build_probe(self.trace_identifier.0, Sequence::from(ttl).0);
        channel.send(&probe, self.target_addr)?;
        let sent = Instant::now();
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let result = match channel.recv(&mut buf, self.read_timeout)? {
            Some((bytes_read, addr)) => ProbeResult::Reply(ProbeReply {
                elapsed: sent.elapsed(),
                addr: addr.map(|addr| addr.ip()),
                kind: parse_reply(&buf[..bytes_read]),
            }),
            None => ProbeResult::TimedOut,
        };
        tracing::debug!(ttl = ttl.0, ?result);
        Ok(result)
    }
}
