//! Terminal host for the developer console.
//!
//! The crate is a thin layer over [`dev_console`]: [`cli`] parses arguments, [`config`] loads the
//! `[console]` options table, [`host_log`] forwards tracing events into the transcript, [`demo`]
//! provides a small object universe to run commands against, and [`session`] drives the console
//! one input line per frame.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod host_log;
pub mod session;

use std::io;

use dev_console::{DevConsole, InstancePool};
use tracing::{info, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::ReplConfig;
use crate::error::ReplResult;
use crate::host_log::{HostLogBuffer, HostLogLayer};
use crate::session::Session;

/// Stderr log filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "console_repl=info,dev_console=info";

/// Composes the host subscriber.
///
/// `filter` applies to the stderr output only; [`HostLogLayer`] sees every event and keeps its
/// own WARN+ cut, so host warnings reach the transcript whatever `RUST_LOG` says.
pub fn host_subscriber(
    filter: EnvFilter,
    logs: HostLogBuffer,
) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .with(HostLogLayer::new(logs))
}

/// Installs the global subscriber and returns the buffer fed by [`HostLogLayer`].
pub fn setup_tracing() -> HostLogBuffer {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let buffer = HostLogBuffer::default();
    host_subscriber(filter, buffer.clone()).init();
    buffer
}

/// Builds the console with demo commands and runs it against stdin/stdout.
pub fn run(config: ReplConfig, logs: HostLogBuffer) -> ReplResult<()> {
    let pool = InstancePool::default();
    let mut console = DevConsole::with_lookup(config.console, pool.clone());
    demo::register_demo(&console, &pool)?;
    let discovered = demo::discover(&console);
    info!(
        commands = console.registry().len(),
        discovered, "console ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    Session::new(&mut console, logs).run(stdin.lock(), &mut stdout)
}
