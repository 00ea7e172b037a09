use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use thiserror::Error;

/// A DNS resolver.
pub trait Resolver {
    /// Perform a blocking DNS hostname lookup and return the resolved IPv4 addresses.
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs>;

    /// Perform a blocking reverse DNS lookup of `IpAddr` and return a `DnsEntry`.
    ///
    /// This never fails, a lookup which did not succeed is described by the returned entry.
    #[must_use]
    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry;
}

/// A DNS resolver error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A DNS resolver error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("DNS lookup failed: {0}")]
    LookupFailed(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("no IPv4 address found for {0}")]
    NoIpv4Address(String),
}

/// The output of a successful DNS lookup.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedIpAddrs(pub(crate) Vec<IpAddr>);

impl ResolvedIpAddrs {
    /// Create from a list of addresses.
    #[must_use]
    pub const fn new(addrs: Vec<IpAddr>) -> Self {
        Self(addrs)
    }
}

impl IntoIterator for ResolvedIpAddrs {
    type Item = IpAddr;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The outcome of a reverse DNS lookup.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DnsEntry {
    /// The `IpAddr` resolved to one or more hostnames.
    Resolved(IpAddr, Vec<String>),
    /// The `IpAddr` has no reverse record.
    NotFound(IpAddr),
    /// The reverse DNS resolution of `IpAddr` failed.
    Failed(IpAddr),
    /// The reverse DNS resolution of `IpAddr` timed out.
    Timeout(IpAddr),
}

impl DnsEntry {
    /// The resolved hostnames.
    pub fn hostnames(&self) -> impl Iterator<Item = &'_ str> {
        let hosts = match self {
            Self::Resolved(_, hosts) => hosts.as_slice(),
            Self::NotFound(_) | Self::Failed(_) | Self::Timeout(_) => &[],
        };
        hosts.iter().map(String::as_str)
    }
}

impl Display for DnsEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(_, hosts) => write!(f, "{}", hosts.join(" ")),
            Self::NotFound(ip) => write!(f, "{ip}"),
            Self::Timeout(ip) => write!(f, "Timeout: {ip}"),
            Self::Failed(ip) => write!(f, "Failed: {ip}"),
        }
    }
}
