use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use shardrand::{Backoff, RetryPolicy, ServiceConfig};

/// Largest accepted `--chunk-size`. Each read allocates a scratch buffer of
/// this size rounded up to whole words.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Runtime configuration for the `urandom-fast` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first). The output is **not** cryptographically
/// secure.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "urandom-fast",
    version,
    about = "Stream fast, non-cryptographic pseudorandom bytes to stdout"
)]
pub struct CliArgs {
    /// Total number of bytes to write. `0` streams until stdout closes.
    ///
    /// Environment variable: `URANDOM_BYTES`
    #[arg(short = 'n', long, env = "URANDOM_BYTES", default_value_t = 1024 * 1024)]
    pub bytes: u64,

    /// Number of bytes requested from the device per read.
    ///
    /// Environment variable: `URANDOM_CHUNK_SIZE`
    #[arg(long, env = "URANDOM_CHUNK_SIZE", default_value_t = 64 * 1024)]
    pub chunk_size: usize,

    /// Number of execution units, one independent stream each. Defaults to
    /// the number of available CPUs.
    ///
    /// Environment variable: `URANDOM_UNITS`
    #[arg(long, env = "URANDOM_UNITS")]
    pub units: Option<usize>,

    /// Generator backing every unit's stream.
    ///
    /// Environment variable: `URANDOM_GENERATOR`
    #[arg(long, env = "URANDOM_GENERATOR", value_enum, default_value_t = GeneratorKind::Xorshift128Plus)]
    pub generator: GeneratorKind,

    /// Consecutive zero-progress writes tolerated before a read fails.
    ///
    /// Environment variable: `URANDOM_MAX_STALLS`
    #[arg(long, env = "URANDOM_MAX_STALLS", default_value_t = RetryPolicy::DEFAULT_MAX_STALLS)]
    pub max_stalls: u32,

    /// Wait strategy between zero-progress writes.
    ///
    /// Environment variable: `URANDOM_BACKOFF`
    #[arg(long, env = "URANDOM_BACKOFF", value_enum, default_value_t = BackoffKind::Yield)]
    pub backoff: BackoffKind,

    /// Sleep duration in microseconds when `--backoff sleep` is selected.
    ///
    /// Environment variable: `URANDOM_BACKOFF_SLEEP_US`
    #[arg(long, env = "URANDOM_BACKOFF_SLEEP_US", default_value_t = 100)]
    pub backoff_sleep_us: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// xorshift128+ (two-word state, default).
    #[value(name = "xorshift128plus")]
    Xorshift128Plus,
    /// xoshiro256++ (four-word state).
    #[value(name = "xoshiro256plusplus")]
    Xoshiro256PlusPlus,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    Spin,
    Yield,
    Sleep,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// `None` streams until the output closes.
    pub bytes: Option<u64>,
    pub chunk_size: usize,
    pub units: usize,
    pub generator: GeneratorKind,
    pub retry: RetryPolicy,
}

impl CliConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_units(self.units)
            .with_retry(self.retry)
    }
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let units = args.units.unwrap_or_else(num_cpus::get);
        if units == 0 {
            bail!("URANDOM_UNITS must be greater than 0");
        }

        if args.chunk_size == 0 {
            bail!("URANDOM_CHUNK_SIZE must be greater than 0");
        }

        if args.chunk_size > MAX_CHUNK_SIZE {
            bail!(
                "URANDOM_CHUNK_SIZE ({}) exceeds the maximum of {} bytes",
                args.chunk_size,
                MAX_CHUNK_SIZE
            );
        }

        let backoff = match args.backoff {
            BackoffKind::Spin => Backoff::Spin,
            BackoffKind::Yield => Backoff::Yield,
            BackoffKind::Sleep => {
                if args.backoff_sleep_us == 0 {
                    bail!("URANDOM_BACKOFF_SLEEP_US must be greater than 0 with sleep backoff");
                }
                Backoff::Sleep(Duration::from_micros(args.backoff_sleep_us))
            }
        };

        Ok(Self {
            bytes: (args.bytes != 0).then_some(args.bytes),
            chunk_size: args.chunk_size,
            units,
            generator: args.generator,
            retry: RetryPolicy::new(args.max_stalls, backoff),
        })
    }
}
