#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig, GeneratorKind};
use shardrand::{
    Error, MonotonicClock, PseudoStream, Service, StreamState, ThreadRandom, WriterSink,
    Xoshiro256PlusPlus,
};
use std::{io, time::Instant};
use telemetry::init_telemetry;

// Using mimalloc: every read allocates and frees a scratch buffer.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    match config.generator {
        GeneratorKind::Xorshift128Plus => run::<StreamState>(&config),
        GeneratorKind::Xoshiro256PlusPlus => run::<Xoshiro256PlusPlus>(&config),
    }
}

fn run<S: PseudoStream>(config: &CliConfig) -> anyhow::Result<()> {
    let clock = MonotonicClock::new();
    let service = Service::<S>::init(config.service_config(), &ThreadRandom, &clock)?;
    let device = service.device();
    let mut sink = WriterSink::new(io::stdout().lock());

    let started = Instant::now();
    let mut written: u64 = 0;
    let outcome = loop {
        let len = match config.bytes {
            Some(total) if written >= total => break Ok(()),
            Some(total) => usize::try_from(total - written)
                .map_or(config.chunk_size, |remaining| remaining.min(config.chunk_size)),
            None => config.chunk_size,
        };

        match device.read(&mut sink, len, written) {
            Ok(delivered) => written += delivered as u64,
            Err(Error::CopyFault {
                delivered,
                kind: io::ErrorKind::BrokenPipe,
            }) => {
                written += delivered as u64;
                tracing::debug!("stdout closed by reader");
                break Ok(());
            }
            Err(err) => break Err(err),
        }
    };

    let flushed = match sink.flush() {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    };
    service.shutdown();

    outcome?;
    flushed?;

    let elapsed = started.elapsed();
    let mib_per_sec = written as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64().max(f64::EPSILON);
    tracing::info!(
        bytes = written,
        elapsed_ms = elapsed.as_millis() as u64,
        "wrote {written} bytes ({mib_per_sec:.1} MiB/s)"
    );

    Ok(())
}

fn log_startup_info(config: &CliConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting {} with full config: {:#?}", shardrand::DEVICE_NAME, config);
    } else {
        tracing::info!(
            "Starting {} with {} units ({:?})",
            shardrand::DEVICE_NAME,
            config.units,
            config.generator
        );
    }
}
