use crate::resolver::{Error, Resolver, Result};
use std::net::{IpAddr, Ipv4Addr};
use tracing::instrument;

/// The display string of a responder address.
///
/// This is `"<name> [<addr>]"` when `resolve_names` is set and the reverse
/// lookup found a name, otherwise the bare address.
#[must_use]
pub fn display_addr<R: Resolver>(resolver: &R, addr: IpAddr, resolve_names: bool) -> String {
    if !resolve_names {
        return addr.to_string();
    }
    let entry = resolver.reverse_lookup(addr);
    let hostname = entry.hostnames().next().map(ToString::to_string);
    hostname.map_or_else(
        || addr.to_string(),
        |hostname| format!("{hostname} [{addr}]"),
    )
}

/// A resolved trace destination.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Destination {
    /// The target as given by the user.
    pub target: String,
    /// The address probes are sent to.
    pub addr: Ipv4Addr,
    /// The name shown in the trace header.
    pub name: String,
}

impl Destination {
    /// Resolve a target hostname or dotted numeric address.
    ///
    /// A numeric target takes its name from a reverse lookup, falling back to
    /// the address itself. A hostname target is shown as given.
    #[instrument(skip(resolver), level = "debug")]
    pub fn resolve<R: Resolver>(resolver: &R, target: &str) -> Result<Self> {
        let target = target.trim();
        if let Ok(addr) = target.parse::<IpAddr>() {
            let IpAddr::V4(addr) = addr else {
                return Err(Error::NoIpv4Address(target.to_string()));
            };
            let name = display_addr(resolver, IpAddr::V4(addr), true);
            let name = match name.split_once(" [") {
                Some((hostname, _)) => hostname.to_string(),
                None => name,
            };
            return Ok(Self {
                target: target.to_string(),
                addr,
                name,
            });
        }
        let addr = resolver
            .lookup(target)?
            .into_iter()
            .find_map(|addr| match addr {
                IpAddr::V4(addr) => Some(addr),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| Error::NoIpv4Address(target.to_string()))?;
        tracing::debug!(%addr, "resolved destination");
        Ok(Self {
            target: target.to_string(),
            addr,
            name: target.to_string(),
        })
    }
}
