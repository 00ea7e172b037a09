use crate::config::{HoptraceConfig, LogFormat, LogSpanEvents};
use crate::session::{self, SessionConfig};
use hoptrace_core::{HopProber, SocketImpl};
use hoptrace_dns::DnsResolver;
use hoptrace_privilege::Privilege;
use std::io;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the hoptrace application.
pub fn run_hoptrace(cfg: &HoptraceConfig, privilege: &Privilege, pid: u16) -> anyhow::Result<()> {
    configure_logging(cfg);
    privilege.ensure()?;
    let resolver = start_dns_resolver(cfg)?;
    let session_cfg = make_session_config(cfg, pid);
    let stdout = io::stdout();
    let reason = session::run(
        &session_cfg,
        &resolver,
        HopProber::<SocketImpl>::new,
        &mut stdout.lock(),
    )?;
    tracing::debug!(?reason, "session finished");
    Ok(())
}

/// Start the DNS resolver.
fn start_dns_resolver(cfg: &HoptraceConfig) -> anyhow::Result<DnsResolver> {
    Ok(DnsResolver::start(
        hoptrace_dns::Builder::new()
            .resolve_method(cfg.dns_resolve_method)
            .timeout(cfg.dns_timeout)
            .build(),
    )?)
}

fn make_session_config(cfg: &HoptraceConfig, pid: u16) -> SessionConfig {
    SessionConfig {
        target: cfg.target.clone(),
        trace_identifier: pid,
        max_hops: cfg.max_hops,
        timeout: cfg.timeout,
        resolve_names: cfg.resolve_names,
    }
}

/// Install a stderr subscriber when verbose logging is enabled.
fn configure_logging(cfg: &HoptraceConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_writer(io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_writer(io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_writer(io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .json()
                    .init();
            }
        }
    }
}
