use crate::ResolveMethod;
use std::time::Duration;

/// A builder for DNS `Config`.
///
/// # Example
///
/// Build a DNS `Config` which uses the Google DNS service.
///
/// ```no_run
/// use hoptrace_dns::{Builder, ResolveMethod};
///
/// let config = Builder::new().resolve_method(ResolveMethod::Google).build();
/// ```
pub struct Builder {
    resolve_method: ResolveMethod,
    timeout: Duration,
    ttl: Duration,
}

impl Builder {
    /// Create a new `Builder`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolve_method: Config::default().resolve_method,
            timeout: Config::default().timeout,
            ttl: Config::default().ttl,
        }
    }

    /// Set the method to use for DNS resolution.
    #[must_use]
    pub const fn resolve_method(self, resolve_method: ResolveMethod) -> Self {
        Self {
            resolve_method,
            ..self
        }
    }

    /// Set the timeout for DNS resolution.
    #[must_use]
    pub const fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Set the time-to-live (TTL) for DNS cache entries.
    #[must_use]
    pub const fn ttl(self, ttl: Duration) -> Self {
        Self { ttl, ..self }
    }

    /// Build the DNS `Config`.
    #[must_use]
    pub const fn build(self) -> Config {
        Config {
            resolve_method: self.resolve_method,
            timeout: self.timeout,
            ttl: self.ttl,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the `DnsResolver`.
///
/// Forward lookups are always restricted to IPv4 addresses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// The method to use for DNS resolution.
    pub resolve_method: ResolveMethod,
    /// The timeout for DNS resolution.
    pub timeout: Duration,
    /// The time-to-live (TTL) for DNS cache entries.
    pub ttl: Duration,
}

impl Config {
    /// Create a `Config`.
    #[must_use]
    pub const fn new(resolve_method: ResolveMethod, timeout: Duration, ttl: Duration) -> Self {
        Self {
            resolve_method,
            timeout,
            ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolve_method: ResolveMethod::System,
            timeout: Duration::from_millis(5000),
            ttl: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        assert_eq!(Config::default(), Builder::new().build());
    }

    #[test]
    fn test_builder() {
        let config = Builder::new()
            .resolve_method(ResolveMethod::Cloudflare)
            .timeout(Duration::from_secs(2))
            .ttl(Duration::from_secs(10))
            .build();
        assert_eq!(
            Config::new(
                ResolveMethod::Cloudflare,
                Duration::from_secs(2),
                Duration::from_secs(10)
            ),
            config
        );
    }
}
