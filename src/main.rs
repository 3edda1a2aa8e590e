//! await-ready
//!
//! Blocks until a TCP service accepts connections and, optionally, answers a
//! protocol handshake (HTTP, PostgreSQL, MySQL, Redis).
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags ─┐
//!   TOML file ─┼─▶ config ─▶ validation ─▶ PollParams
//!   target    ─┘                               │
//!                                              ▼
//!                 ┌──────────────── poll engine ────────────────┐
//!                 │  connector (IPv4 / IPv6) ─▶ probe (protocol) │
//!                 │        ▲                           │         │
//!                 │        └── retry context ◀── status┘         │
//!                 └──────────────────────────────────────────────┘
//!                                              │
//!                        output strategy ◀─────┴─────▶ exit code
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::time::Instant;

use await_ready::config::{load_config, validate_config, AwaitConfig};
use await_ready::exit_code::ExitCode;
use await_ready::observability::logging;
use await_ready::output::{create_output, OutputMode};
use await_ready::poll;
use await_ready::probe::Protocol;
use await_ready::target::parse_target;

#[derive(Parser, Debug)]
#[command(name = "await-ready")]
#[command(version, about = "Wait until a service is ready", long_about = None)]
struct Cli {
    /// Target to connect to (e.g. 3000, localhost:3000, postgresql://localhost:5432)
    target: Option<String>,

    /// The host to connect to [default: localhost]
    #[arg(long)]
    host: Option<String>,

    /// The port to connect to
    #[arg(short, long)]
    port: Option<u16>,

    /// The timeout in milliseconds (0 for infinite) [default: 10000]
    #[arg(long)]
    timeout: Option<u64>,

    /// The protocol to check: none, http, https, pg, postgresql, mysql, redis
    #[arg(long)]
    protocol: Option<Protocol>,

    /// The interval between rounds in milliseconds [default: 1000]
    #[arg(long)]
    interval: Option<u64>,

    /// Output mode: dots, spinner, sl or silent
    #[arg(long)]
    output: Option<OutputMode>,

    /// Suppress all output (shorthand for --output silent)
    #[arg(short, long)]
    silent: bool,

    /// Do not fail when the host does not resolve, wait for the DNS record
    #[arg(long)]
    wait_for_dns: bool,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Merge defaults, the config file and the command line, then validate.
fn build_config(cli: &Cli) -> Result<AwaitConfig, Vec<String>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| vec![format!("{}: {}", path.display(), e)])?,
        None => AwaitConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.target.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.target.port = Some(port);
    }
    if let Some(protocol) = cli.protocol {
        config.target.protocol = protocol;
    }
    if let Some(timeout) = cli.timeout {
        config.poll.timeout_ms = timeout;
    }
    if let Some(interval) = cli.interval {
        config.poll.interval_ms = interval;
    }
    if let Some(mode) = cli.output {
        config.output.mode = mode;
    }
    if cli.silent {
        config.output.mode = OutputMode::Silent;
    }
    if cli.wait_for_dns {
        config.poll.wait_for_dns = true;
    }

    if let Some(raw) = &cli.target {
        let target = parse_target(raw).map_err(|e| vec![e.to_string()])?;
        config.target.host = target.host;
        config.target.port = Some(target.port);
        if target.protocol != Protocol::None {
            config.target.protocol = target.protocol;
        }
        if target.path.is_some() {
            config.target.path = target.path;
        }
    }

    validate_config(&config)
        .map_err(|errors| errors.iter().map(ToString::to_string).collect::<Vec<_>>())?;
    Ok(config)
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            for error in errors {
                eprintln!("✖ {}", error);
            }
            return ExitCode::ValidationError.into();
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut params = config.poll_params();
    tracing::debug!(?params, "Configuration loaded");

    let output = Arc::new(Mutex::new(create_output(config.output.mode)));
    let sink = Arc::clone(&output);
    params.on_retry = Some(Arc::new(move |attempt: u32, elapsed: Duration| {
        if let Ok(mut out) = sink.lock() {
            out.on_retry(attempt, elapsed);
        }
    }));

    if let Ok(mut out) = output.lock() {
        out.on_start(&params.host, params.port);
    }

    let start = Instant::now();
    let status = poll::poll(&params).await;
    let elapsed = start.elapsed();

    if let Ok(mut out) = output.lock() {
        if status.is_connected() {
            out.on_success(&params.host, params.port, elapsed);
        } else {
            out.on_failure(status.message(), elapsed);
        }
    }

    ExitCode::from_status(&status).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "await-ready", "--host", "db", "-p", "5432", "--protocol", "pg", "--timeout", "0", "-s",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.target.host, "db");
        assert_eq!(config.target.port, Some(5432));
        assert_eq!(config.target.protocol, Protocol::Postgresql);
        assert_eq!(config.poll.timeout_ms, 0);
        assert_eq!(config.output.mode, OutputMode::Silent);
    }

    #[test]
    fn positional_target_wins() {
        let cli = Cli::try_parse_from(["await-ready", "--host", "ignored", "http://api:8080/ready"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.target.host, "api");
        assert_eq!(config.target.port, Some(8080));
        assert_eq!(config.target.protocol, Protocol::Http);
        assert_eq!(config.target.path.as_deref(), Some("/ready"));
    }

    #[test]
    fn protocol_flag_applies_to_bare_target() {
        let cli = Cli::try_parse_from(["await-ready", "--protocol", "redis", "6379"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.target.protocol, Protocol::Redis);
        assert_eq!(config.target.host, "localhost");
    }

    #[test]
    fn reports_missing_port_and_short_interval() {
        let cli = Cli::try_parse_from(["await-ready", "--interval", "5"]).unwrap();
        let errors = build_config(&cli).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn accepts_sl_output() {
        let cli = Cli::try_parse_from(["await-ready", "--output", "sl", "8080"]).unwrap();
        assert_eq!(build_config(&cli).unwrap().output.mode, OutputMode::Sl);
    }

    #[test]
    fn rejects_bad_target() {
        let cli = Cli::try_parse_from(["await-ready", "host:port:wtf"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
