use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use clap::Parser;
use std::time::Duration;

/// Trace the route ICMP echo requests take to a host
#[derive(Parser, Debug)]
#[command(name = "hoptrace", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The hostname or IPv4 address to trace
    pub target: String,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// Do not resolve hop addresses to hostnames
    #[arg(short = 'n', long)]
    pub no_resolve: bool,

    /// The maximum number of hops to search for the target [default: 30]
    #[arg(short = 'm', long)]
    pub max_hops: Option<u8>,

    /// The time to wait for each reply [default: 1s]
    #[arg(short = 'w', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// How to perform DNS queries [default: system]
    #[arg(value_enum, short = 'r', long)]
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,

    /// The maximum time to wait to perform DNS queries [default: 5s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_timeout: Option<Duration>,

    /// The debug log format [default: pretty]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: hoptrace=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
