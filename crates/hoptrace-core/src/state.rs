use crate::constants::PROBES_PER_HOP;
use crate::probe::ProbeResult;
use crate::types::TimeToLive;
use indexmap::IndexSet;
use std::net::IpAddr;
use std::time::Duration;

/// The probes of a single hop-limit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hop {
    /// The ttl of this hop.
    ttl: TimeToLive,
    /// The round trip time of each probe in send order, `None` for a timeout.
    samples: Vec<Option<Duration>>,
    /// The distinct addresses that responded for this hop.
    addrs: IndexSet<IpAddr>,
    /// Whether any probe was answered by the target.
    target_found: bool,
}

impl Hop {
    #[must_use]
    pub fn new(ttl: TimeToLive) -> Self {
        Self {
            ttl,
            samples: Vec::with_capacity(PROBES_PER_HOP),
            addrs: IndexSet::new(),
            target_found: false,
        }
    }

    /// Record the outcome of the next probe of this hop.
    pub fn record(&mut self, result: &ProbeResult) {
        match result {
            ProbeResult::Reply(reply) => {
                self.samples.push(Some(reply.elapsed));
                // a packet which could not be decoded contributes its time only
                if let Some(addr) = reply.addr.filter(|_| !reply.kind.is_malformed()) {
                    self.addrs.insert(addr);
                }
                self.target_found |= reply.kind.is_target();
            }
            ProbeResult::TimedOut => self.samples.push(None),
        }
    }

    /// The time-to-live of this hop.
    #[must_use]
    pub const fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    /// The round trip time of each probe, in the order the probes were sent.
    #[must_use]
    pub fn samples(&self) -> &[Option<Duration>] {
        &self.samples
    }

    /// The set of addresses that have responded for this time-to-live.
    pub fn addrs(&self) -> impl Iterator<Item = &IpAddr> {
        self.addrs.iter()
    }

    /// Did the target reply to any probe of this hop?
    #[must_use]
    pub const fn target_found(&self) -> bool {
        self.target_found
    }
}
