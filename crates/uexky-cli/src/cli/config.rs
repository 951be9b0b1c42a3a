use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, time::Duration};
use uexky::{GeneratorConfig, Uid};

/// Runtime configuration for the `uexky` binary.
///
/// Connection and lease settings are global so they can sit in the
/// environment while the subcommand changes per invocation.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "uexky",
    version,
    about = "Inspect and generate uexky identifiers"
)]
pub struct CliArgs {
    /// Directory of the sled database holding the worker-id counters.
    ///
    /// Environment variable: `UEXKY_DB_PATH`
    #[arg(long, env = "UEXKY_DB_PATH", default_value = "./uexky-data", global = true)]
    pub db_path: PathBuf,

    /// Counter shared by every generator that must not collide with this one.
    ///
    /// Environment variable: `UEXKY_WORKER_COHORT`
    #[arg(long, env = "UEXKY_WORKER_COHORT", default_value_t = String::from("uid"), global = true)]
    pub cohort: String,

    /// Seconds a leased worker id stays valid before it is renewed.
    ///
    /// Environment variable: `UEXKY_LEASE_TTL_SECS`
    #[arg(long, env = "UEXKY_LEASE_TTL_SECS", default_value_t = 3600, global = true)]
    pub lease_ttl_secs: u64,

    /// Upper bound, in seconds, of the random extension added to each lease.
    ///
    /// Environment variable: `UEXKY_LEASE_JITTER_SECS`
    #[arg(long, env = "UEXKY_LEASE_JITTER_SECS", default_value_t = 3600, global = true)]
    pub lease_jitter_secs: u64,

    /// Each second's sequence starts at a random value below this bound.
    ///
    /// Environment variable: `UEXKY_SEQUENCE_SEED_SPAN`
    #[arg(long, env = "UEXKY_SEQUENCE_SEED_SPAN", default_value_t = 64, global = true)]
    pub sequence_seed_span: u16,

    /// Lease acquisition attempts before giving up.
    ///
    /// Environment variable: `UEXKY_LEASE_ATTEMPTS`
    #[arg(long, env = "UEXKY_LEASE_ATTEMPTS", default_value_t = 3, global = true)]
    pub lease_attempts: u32,

    /// Log output format on stderr.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print both forms and every bit field of each identifier.
    Inspect {
        /// Display strings or decimal storage integers.
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Lease a worker id and print fresh identifiers.
    Generate {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Print a random token over the display alphabet.
    Token {
        #[arg(short, long, default_value_t = 24)]
        len: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub cohort: String,
    pub generator: GeneratorConfig,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.lease_ttl_secs == 0 {
            bail!("UEXKY_LEASE_TTL_SECS must be greater than 0");
        }

        if args.lease_attempts == 0 {
            bail!("UEXKY_LEASE_ATTEMPTS must be greater than 0");
        }

        if args.sequence_seed_span > Uid::max_sequence() + 1 {
            bail!(
                "UEXKY_SEQUENCE_SEED_SPAN must be at most {}",
                Uid::max_sequence() + 1
            );
        }

        if args.cohort.trim().is_empty() {
            bail!("UEXKY_WORKER_COHORT must not be empty");
        }

        match args.command {
            Command::Generate { count: 0 } => bail!("--count must be greater than 0"),
            Command::Token { len: 0 } => bail!("--len must be greater than 0"),
            _ => {}
        }

        Ok(Self {
            db_path: args.db_path,
            cohort: args.cohort,
            generator: GeneratorConfig {
                lease_ttl: Duration::from_secs(args.lease_ttl_secs),
                lease_jitter: Duration::from_secs(args.lease_jitter_secs),
                acquire_attempts: args.lease_attempts,
                sequence_seed_span: args.sequence_seed_span,
                ..GeneratorConfig::default()
            },
            log_format: args.log_format,
            command: args.command,
        })
    }
}
