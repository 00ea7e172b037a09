use anyhow::anyhow;
use clap::ValueEnum;
use file::ConfigFile;
use hoptrace_core::{defaults, MAX_TTL};
use hoptrace_dns::ResolveMethod;
use serde::Deserialize;
use std::time::Duration;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DnsResolveMethodConfig {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

impl From<DnsResolveMethodConfig> for ResolveMethod {
    fn from(value: DnsResolveMethodConfig) -> Self {
        match value {
            DnsResolveMethodConfig::System => Self::System,
            DnsResolveMethodConfig::Resolv => Self::Resolv,
            DnsResolveMethodConfig::Google => Self::Google,
            DnsResolveMethodConfig::Cloudflare => Self::Cloudflare,
        }
    }
}

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Fully parsed and validated configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HoptraceConfig {
    pub target: String,
    pub max_hops: u8,
    pub timeout: Duration,
    pub resolve_names: bool,
    pub dns_resolve_method: ResolveMethod,
    pub dns_timeout: Duration,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl HoptraceConfig {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            file::read_config_file(cfg)?
        } else {
            file::read_default_config_file()?.unwrap_or_default()
        };
        Self::build_config(args, cfg_file)
    }

    fn build_config(args: Args, cfg_file: ConfigFile) -> anyhow::Result<Self> {
        let cfg_file_trace = cfg_file.trace.unwrap_or_default();
        let cfg_file_dns = cfg_file.dns.unwrap_or_default();
        let cfg_file_log = cfg_file.log.unwrap_or_default();
        let max_hops = cfg_layer(
            args.max_hops,
            cfg_file_trace.max_hops,
            defaults::DEFAULT_MAX_HOPS,
        );
        let timeout = cfg_layer(
            args.timeout,
            cfg_file_trace.timeout,
            defaults::DEFAULT_READ_TIMEOUT,
        );
        let resolve_names = cfg_layer(
            args.no_resolve.then_some(false),
            cfg_file_trace.resolve_names,
            constants::DEFAULT_RESOLVE_NAMES,
        );
        let dns_resolve_method = cfg_layer(
            args.dns_resolve_method,
            cfg_file_dns.dns_resolve_method,
            constants::DEFAULT_DNS_RESOLVE_METHOD,
        );
        let dns_timeout = cfg_layer(
            args.dns_timeout,
            cfg_file_dns.dns_timeout,
            constants::DEFAULT_DNS_TIMEOUT,
        );
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_log.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_log.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_log.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        validate_max_hops(max_hops)?;
        validate_timeout("timeout", timeout)?;
        validate_timeout("dns-timeout", dns_timeout)?;
        Ok(Self {
            target: args.target,
            max_hops,
            timeout,
            resolve_names,
            dns_resolve_method: ResolveMethod::from(dns_resolve_method),
            dns_timeout,
            verbose: args.verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for HoptraceConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_hops: defaults::DEFAULT_MAX_HOPS,
            timeout: defaults::DEFAULT_READ_TIMEOUT,
            resolve_names: constants::DEFAULT_RESOLVE_NAMES,
            dns_resolve_method: ResolveMethod::from(constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: constants::DEFAULT_DNS_TIMEOUT,
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

/// Validate `max_hops`.
fn validate_max_hops(max_hops: u8) -> anyhow::Result<()> {
    if (1..=MAX_TTL).contains(&max_hops) {
        Ok(())
    } else {
        Err(anyhow!(
            "max-hops ({max_hops}) must be in the range 1..{MAX_TTL}"
        ))
    }
}

/// Validate a timeout is non-zero.
fn validate_timeout(name: &str, timeout: Duration) -> anyhow::Result<()> {
    if timeout.is_zero() {
        Err(anyhow!("{name} ({timeout:?}) must be greater than zero"))
    } else {
        Ok(())
    }
}
