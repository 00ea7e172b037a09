use crate::constants::PROBES_PER_HOP;
use crate::types::{MaxHops, TraceId};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `max-hops`.
    pub const DEFAULT_MAX_HOPS: u8 = 30;

    /// The default value for `timeout`.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

    /// The default trace identifier.
    pub const DEFAULT_TRACE_IDENTIFIER: u16 = 0;
}

/// The configuration of a trace session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// The address probes are sent to.
    pub target_addr: Ipv4Addr,
    /// The identifier carried by every probe of this trace.
    pub trace_identifier: TraceId,
    /// The largest hop-limit probed.
    pub max_ttl: MaxHops,
    /// How long each probe waits for a reply.
    pub read_timeout: Duration,
    /// The number of sequential probes sent per hop.
    pub probes_per_hop: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
            trace_identifier: TraceId(defaults::DEFAULT_TRACE_IDENTIFIER),
            max_ttl: MaxHops(defaults::DEFAULT_MAX_HOPS),
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
            probes_per_hop: PROBES_PER_HOP,
        }
    }
}
