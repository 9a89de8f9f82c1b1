//! Log output for the `urandom-fast` binary.
//!
//! Random bytes go to stdout, so every log line is written to stderr. The
//! filter is read from `RUST_LOG` and defaults to `info`; set
//! `RUST_LOG=shardrand=debug` to see registry lifecycle and copy stalls.

use std::io;
use tracing_subscriber::{
    EnvFilter, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt,
};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    Ok(())
}
