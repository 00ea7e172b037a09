//! This crate provides a caching, forward and reverse DNS resolver and the
//! display rules `hoptrace` uses for the trace destination and for the
//! responders of each hop.
//!
//! A reverse DNS lookup of a given address is performed once and then served
//! from a cache unless:
//! - the previous lookup failed with `DnsEntry::Timeout(_)`
//! - the previous lookup is older than the configured time-to-live (TTL)
//!
//! Reverse lookup failures are never errors, a `DnsEntry` records what
//! happened and [`display_addr`] falls back to the bare address.
//!
//! # Example
//!
//! The following example resolves a destination and the display string of a
//! responder using the Cloudflare 1.1.1.1 public DNS service.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::{IpAddr, Ipv4Addr};
//! use hoptrace_dns::{display_addr, Builder, Destination, DnsResolver, ResolveMethod};
//!
//! let config = Builder::new()
//!     .resolve_method(ResolveMethod::Cloudflare)
//!     .build();
//! let resolver = DnsResolver::start(config)?;
//! let destination = Destination::resolve(&resolver, "example.com")?;
//! println!("Tracing route to {} [{}]", destination.name, destination.addr);
//! let hop = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));
//! println!("{}", display_addr(&resolver, hop, true));
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod cached_resolver;
mod config;
mod destination;
mod resolver;

pub use cached_resolver::{DnsResolver, ResolveMethod};
pub use config::{Builder, Config};
pub use destination::{display_addr, Destination};
pub use resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
