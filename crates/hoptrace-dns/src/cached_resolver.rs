use crate::config::Config;
use crate::resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::system_conf::read_system_conf;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::time::{Duration, SystemTime};
use tracing::instrument;

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResolveMethod {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

impl Display for ResolveMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Resolv => write!(f, "resolv"),
            Self::Google => write!(f, "google"),
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

/// A blocking, caching, forward and reverse DNS resolver.
///
/// Forward lookups always go to the configured backend. Reverse lookups are
/// cached per address for the configured TTL, timed out lookups are retried.
pub struct DnsResolver {
    config: Config,
    provider: DnsProvider,
    cache: ReverseCache,
}

enum DnsProvider {
    Hickory(Box<hickory_resolver::Resolver>),
    DnsLookup,
}

impl DnsResolver {
    /// Create and start a new `DnsResolver`.
    pub fn start(config: Config) -> std::io::Result<Self> {
        let provider = match config.resolve_method {
            ResolveMethod::System => DnsProvider::DnsLookup,
            ResolveMethod::Resolv => {
                let (resolver_cfg, options) = read_system_conf()?;
                hickory_provider(resolver_cfg, options, config.timeout)?
            }
            ResolveMethod::Google => hickory_provider(
                ResolverConfig::google(),
                ResolverOpts::default(),
                config.timeout,
            )?,
            ResolveMethod::Cloudflare => hickory_provider(
                ResolverConfig::cloudflare(),
                ResolverOpts::default(),
                config.timeout,
            )?,
        };
        tracing::debug!(method = %config.resolve_method, "started dns resolver");
        Ok(Self {
            config,
            provider,
            cache: ReverseCache::default(),
        })
    }

    /// Get the `Config`.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

fn hickory_provider(
    resolver_cfg: ResolverConfig,
    mut options: ResolverOpts,
    timeout: Duration,
) -> std::io::Result<DnsProvider> {
    options.timeout = timeout;
    options.ip_strategy = LookupIpStrategy::Ipv4Only;
    let resolver = hickory_resolver::Resolver::new(resolver_cfg, options)?;
    Ok(DnsProvider::Hickory(Box::new(resolver)))
}

impl Resolver for DnsResolver {
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
        lookup(&self.provider, hostname.as_ref())
    }

    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        let addr = addr.into();
        self.cache
            .get_or_resolve(addr, SystemTime::now(), self.config.ttl, || {
                reverse_lookup(&self.provider, addr)
            })
    }
}

#[instrument(skip(provider), level = "debug")]
fn lookup(provider: &DnsProvider, hostname: &str) -> Result<ResolvedIpAddrs> {
    let addrs = match provider {
        DnsProvider::Hickory(resolver) => resolver
            .lookup_ip(hostname)
            .map_err(|err| Error::LookupFailed(Box::new(err)))?
            .iter()
            .collect::<Vec<_>>(),
        DnsProvider::DnsLookup => dns_lookup::lookup_host(hostname)
            .map_err(|err| Error::LookupFailed(Box::new(err)))?
            .into_iter()
            .filter(IpAddr::is_ipv4)
            .collect::<Vec<_>>(),
    };
    Ok(ResolvedIpAddrs(addrs))
}

#[instrument(skip(provider), level = "debug")]
fn reverse_lookup(provider: &DnsProvider, addr: IpAddr) -> DnsEntry {
    match provider {
        // we can't distinguish between a missing record and a genuine error, and so we
        // assume all failures are `DnsEntry::NotFound`.
        DnsProvider::DnsLookup => match dns_lookup::lookup_addr(&addr) {
            Ok(hostname) => DnsEntry::Resolved(addr, vec![hostname]),
            Err(_) => DnsEntry::NotFound(addr),
        },
        DnsProvider::Hickory(resolver) => match resolver.reverse_lookup(addr) {
            Ok(names) => {
                let hostnames = names
                    .into_iter()
                    .map(|mut ptr| {
                        ptr.0.set_fqdn(false);
                        ptr.to_string()
                    })
                    .collect();
                DnsEntry::Resolved(addr, hostnames)
            }
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => DnsEntry::NotFound(addr),
                ResolveErrorKind::Timeout => DnsEntry::Timeout(addr),
                _ => DnsEntry::Failed(addr),
            },
        },
    }
}

/// A cache entry for a reverse DNS lookup.
#[derive(Debug, Clone)]
struct CacheEntry {
    entry: DnsEntry,
    timestamp: SystemTime,
}

impl CacheEntry {
    const fn new(entry: DnsEntry, timestamp: SystemTime) -> Self {
        Self { entry, timestamp }
    }

    fn is_fresh(&self, now: SystemTime, ttl: Duration) -> bool {
        match self.entry {
            DnsEntry::Timeout(_) => false,
            DnsEntry::Resolved(..) | DnsEntry::NotFound(_) | DnsEntry::Failed(_) => {
                now.duration_since(self.timestamp).unwrap_or_default() <= ttl
            }
        }
    }
}

/// Reverse lookup results keyed by address.
#[derive(Debug, Default)]
struct ReverseCache {
    entries: RwLock<HashMap<IpAddr, CacheEntry>>,
}

impl ReverseCache {
    fn get_or_resolve(
        &self,
        addr: IpAddr,
        now: SystemTime,
        ttl: Duration,
        resolve: impl FnOnce() -> DnsEntry,
    ) -> DnsEntry {
        if let Some(cached) = self.entries.read().get(&addr) {
            if cached.is_fresh(now, ttl) {
                return cached.entry.clone();
            }
        }
        let entry = resolve();
        self.entries
            .write()
            .insert(addr, CacheEntry::new(entry.clone(), now));
        entry
    }
}
