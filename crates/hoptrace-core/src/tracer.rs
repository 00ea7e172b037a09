use crate::config::Config;
use crate::error::Result;
use crate::net::SocketImpl;
use crate::prober::{HopProber, Prober};
use crate::state::Hop;
use crate::types::TimeToLive;
use std::ops::ControlFlow;
use tracing::instrument;

/// Why a trace ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompletionReason {
    /// The target replied at the given hop.
    TargetFound(TimeToLive),
    /// Every hop up to the maximum was probed without reaching the target.
    MaxHopsReached,
    /// The hop handler asked to stop after the given hop.
    Stopped(TimeToLive),
}

/// A traceroute implementation.
///
/// Hops are probed one at a time, from 1 up to the configured maximum, and
/// the probes of a hop are sent one after another.
#[derive(Debug, Clone)]
pub struct Tracer {
    config: Config,
}

impl Tracer {
    /// Create a `Tracer`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Tracer`].
    #[must_use]
    pub(crate) const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The validated configuration of this tracer.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Run the [`Tracer`] over raw sockets with a custom hop handler.
    ///
    /// This method will block until the target replies, the maximum number of
    /// hops has been probed or the trace fails. The provided function is
    /// called once for every hop, as soon as all probes of that hop are
    /// complete. Returning [`ControlFlow::Break`] from it ends the trace
    /// before any further probe is sent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::IpAddr;
    /// # use std::str::FromStr;
    /// # use std::ops::ControlFlow;
    /// use hoptrace_core::Builder;
    ///
    /// let addr = IpAddr::from_str("1.1.1.1")?;
    /// let tracer = Builder::new(addr).build()?;
    /// let reason = tracer.run(|hop| {
    ///     println!("{:?}", hop);
    ///     ControlFlow::Continue(())
    /// })?;
    /// println!("{reason:?}");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    pub fn run<F: FnMut(&Hop) -> ControlFlow<()>>(&self, func: F) -> Result<CompletionReason> {
        let mut prober = HopProber::<SocketImpl>::new(&self.config);
        self.run_with(&mut prober, func)
    }

    /// Run the [`Tracer`] with the given [`Prober`] and a custom hop handler.
    ///
    /// See [`Tracer::run`].
    #[instrument(skip_all, level = "debug")]
    pub fn run_with<P: Prober, F: FnMut(&Hop) -> ControlFlow<()>>(
        &self,
        prober: &mut P,
        mut func: F,
    ) -> Result<CompletionReason> {
        let max_ttl = TimeToLive::from(self.config.max_ttl);
        let mut ttl = TimeToLive(1);
        loop {
            let mut hop = Hop::new(ttl);
            for _ in 0..self.config.probes_per_hop {
                hop.record(&prober.probe(ttl)?);
            }
            tracing::debug!(ttl = ttl.0, samples = ?hop.samples(), target_found = hop.target_found());
            if func(&hop).is_break() {
                return Ok(CompletionReason::Stopped(ttl));
            }
            if hop.target_found() {
                return Ok(CompletionReason::TargetFound(ttl));
            }
            if ttl >= max_ttl {
                return Ok(CompletionReason::MaxHopsReached);
            }
            ttl += TimeToLive(1);
        }
    }
}
