//! The probing engine of `hoptrace`.
//!
//! This crate sends `ICMPv4` echo request probes with increasing time-to-live
//! values, one hop at a time and three probes per hop, and reports each hop
//! as soon as its probes complete.
//!
//! Every probe attempt opens its own pair of raw sockets which are closed
//! before the next attempt starts. A probe which receives nothing within the
//! read timeout is a [`ProbeResult::TimedOut`] and never an error.
//!
//! # Example
//!
//! The following example builds and runs a tracer with default configuration
//! and prints out each hop:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::IpAddr;
//! # use std::str::FromStr;
//! # use std::ops::ControlFlow;
//! use hoptrace_core::Builder;
//!
//! let addr = IpAddr::from_str("1.1.1.1")?;
//! Builder::new(addr).build()?.run(|hop| {
//!     println!("{:?}", hop);
//!     ControlFlow::Continue(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run`] - Run the tracer over raw sockets.
//! - [`Tracer::run_with`] - Run the tracer with a custom [`Prober`].
#![deny(unsafe_code)]

mod builder;
mod config;
mod constants;
mod error;
mod net;
mod probe;
mod prober;
mod state;
mod tracer;
mod types;

pub use builder::Builder;
pub use config::{defaults, Config};
pub use constants::{MAX_TTL, PROBES_PER_HOP};
pub use error::{Error, IoError, IoOperation, Result};
pub use net::channel::ProbeChannel;
pub use net::socket::Socket;
pub use net::SocketImpl;
pub use probe::{parse_reply, ProbeReply, ProbeResult, ReplyKind};
pub use prober::{HopProber, Prober};
pub use state::Hop;
pub use tracer::{CompletionReason, Tracer};
pub use types::{MaxHops, Sequence, TimeToLive, TraceId};
