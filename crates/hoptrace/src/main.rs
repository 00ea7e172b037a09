#![forbid(unsafe_code)]

use crate::config::{Args, HoptraceConfig};
use clap::Parser;
use hoptrace_privilege::Privilege;
use std::process;

mod app;
mod config;
mod report;
mod session;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let privilege = Privilege::acquire_privileges()?;
    let cfg = HoptraceConfig::from(args)?;
    app::run_hoptrace(&cfg, &privilege, trace_identifier(process::id()))
}

/// The ICMP identifier of every probe: the low 16 bits of the process id.
const fn trace_identifier(pid: u32) -> u16 {
    (pid & 0xFFFF) as u16
}
