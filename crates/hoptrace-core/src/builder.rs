use crate::config::Config;
use crate::constants::MAX_TTL;
use crate::error::{Error, Result};
use crate::types::{MaxHops, TraceId};
use crate::Tracer;
use std::net::IpAddr;
use std::time::Duration;

/// Build a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::time::Duration;
/// use hoptrace_core::Builder;
///
/// let addr = std::net::IpAddr::from([1, 2, 3, 4]);
/// let tracer = Builder::new(addr)
///     .trace_identifier(std::process::id() as u16)
///     .max_ttl(16)
///     .read_timeout(Duration::from_millis(500))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Builder {
    target_addr: IpAddr,
    trace_identifier: TraceId,
    max_ttl: MaxHops,
    read_timeout: Duration,
}

impl Builder {
    /// Build a tracer builder for a given target.
    #[must_use]
    pub fn new(target_addr: IpAddr) -> Self {
        Self {
            target_addr,
            trace_identifier: Config::default().trace_identifier,
            max_ttl: Config::default().max_ttl,
            read_timeout: Config::default().read_timeout,
        }
    }

    /// Set the trace identifier.
    ///
    /// If not set then 0 will be used as the trace identifier.
    #[must_use]
    pub fn trace_identifier(self, trace_id: u16) -> Self {
        Self {
            trace_identifier: TraceId(trace_id),
            ..self
        }
    }

    /// Set the maximum number of hops probed.
    #[must_use]
    pub fn max_ttl(self, max_ttl: u8) -> Self {
        Self {
            max_ttl: MaxHops(max_ttl),
            ..self
        }
    }

    /// Set how long each probe waits for a reply.
    #[must_use]
    pub fn read_timeout(self, read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    /// Build the `Tracer`.
    pub fn build(self) -> Result<Tracer> {
        let IpAddr::V4(target_addr) = self.target_addr else {
            return Err(Error::BadConfig(format!(
                "target_addr {} is not an IPv4 address",
                self.target_addr
            )));
        };
        if self.max_ttl.0 == 0 || self.max_ttl.0 > MAX_TTL {
            return Err(Error::BadConfig(format!(
                "max_ttl {} must be between 1 and {MAX_TTL}",
                self.max_ttl.0
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::BadConfig(String::from(
                "read_timeout must be greater than zero",
            )));
        }
        Ok(Tracer::new(Config {
            target_addr,
            trace_identifier: self.trace_identifier,
            max_ttl: self.max_ttl,
            read_timeout: self.read_timeout,
            ..Config::default()
        }))
    }
}
