use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use anyhow::Context;
use hoptrace_core::defaults;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "hoptrace.toml";
const DEFAULT_HIDDEN_CONFIG_FILE: &str = ".hoptrace.toml";

/// Read the config from the current directory.
///
/// Returns the parsed `Some(ConfigFile)` if a `hoptrace.toml` or
/// `.hoptrace.toml` file exists, `None` otherwise. Only the first file found
/// is used.
pub fn read_default_config_file() -> anyhow::Result<Option<ConfigFile>> {
    if let Some(file) = read_file("", DEFAULT_CONFIG_FILE)? {
        Ok(Some(file))
    } else if let Some(file) = read_file("", DEFAULT_HIDDEN_CONFIG_FILE)? {
        Ok(Some(file))
    } else {
        Ok(None)
    }
}

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let contents = fs::read_to_string(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("invalid config file: {}", path.as_ref().display()))
}

fn read_file<P: AsRef<Path>>(dir: P, file: &str) -> anyhow::Result<Option<ConfigFile>> {
    let path = dir.as_ref().join(file);
    if path.exists() {
        Ok(Some(read_config_file(path)?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub trace: Option<ConfigTrace>,
    pub dns: Option<ConfigDns>,
    pub log: Option<ConfigLog>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            trace: Some(ConfigTrace::default()),
            dns: Some(ConfigDns::default()),
            log: Some(ConfigLog::default()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigTrace {
    pub max_hops: Option<u8>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub timeout: Option<Duration>,
    pub resolve_names: Option<bool>,
}

impl Default for ConfigTrace {
    fn default() -> Self {
        Self {
            max_hops: Some(defaults::DEFAULT_MAX_HOPS),
            timeout: Some(defaults::DEFAULT_READ_TIMEOUT),
            resolve_names: Some(super::constants::DEFAULT_RESOLVE_NAMES),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigDns {
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub dns_timeout: Option<Duration>,
}

impl Default for ConfigDns {
    fn default() -> Self {
        Self {
            dns_resolve_method: Some(super::constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: Some(super::constants::DEFAULT_DNS_TIMEOUT),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLog {
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigLog {
    fn default() -> Self {
        Self {
            log_format: Some(super::constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(super::constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(super::constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}

fn humantime_deser<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    humantime::parse_duration(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}
