use core::{net::Ipv4Addr, time::Duration};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use flakeuid::{Algorithm, MachineIdProvider, PrivateIpv4, UidConfig, config::parse_epoch};

/// Command-line and environment settings for the `flakeuid` binary.
///
/// Every flag falls back to an environment variable, which may itself come
/// from a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeuid",
    version,
    about = "Mint and inspect Snowflake/Sonyflake style identifiers"
)]
pub struct CliArgs {
    /// Id layout: `snowflake` (1 ms ticks, 10-bit machine id) or `sonyflake`
    /// (10 ms ticks, 16-bit machine id).
    ///
    /// Environment variable: `UID_ALGORITHM`
    #[arg(long, env = "UID_ALGORITHM", default_value_t = Algorithm::Snowflake)]
    pub algorithm: Algorithm,

    /// Reference instant, as RFC 3339 or integer Unix milliseconds. Defaults
    /// to the algorithm's canonical epoch.
    ///
    /// Environment variable: `UID_EPOCH`
    #[arg(long, env = "UID_EPOCH")]
    pub epoch: Option<String>,

    /// Machine id embedded in every identifier. Must be unique among live
    /// generators.
    ///
    /// Environment variable: `UID_MACHINE_ID`
    #[arg(long, env = "UID_MACHINE_ID")]
    pub machine_id: Option<u64>,

    /// Private IPv4 address whose low 16 bits become the machine id.
    ///
    /// Environment variable: `UID_MACHINE_IP`
    #[arg(long, env = "UID_MACHINE_IP")]
    pub machine_ip: Option<Ipv4Addr>,

    /// Longest wait, in milliseconds, for the clock to leave an exhausted
    /// tick before giving up.
    ///
    /// Environment variable: `UID_MAX_WAIT_MS`
    #[arg(long, env = "UID_MAX_WAIT_MS", default_value_t = 1000)]
    pub max_wait_ms: u64,

    /// Last tick persisted by a previous run. No id is issued until the
    /// clock is past it.
    ///
    /// Environment variable: `UID_RESUME_TICK`
    #[arg(long, env = "UID_RESUME_TICK")]
    pub resume_tick: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint identifiers and print them one per line.
    Generate {
        /// How many identifiers to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Threads sharing the generator.
        #[arg(short = 'w', long, default_value_t = 1)]
        workers: usize,
    },
    /// Print the fields of an identifier under the configured layout.
    Decompose {
        /// The identifier, in decimal.
        uid: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub uid: UidConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let epoch = match args.epoch.as_deref() {
            Some(raw) => parse_epoch(raw).context("UID_EPOCH is invalid")?,
            None => args.algorithm.default_epoch(),
        };

        let machine_id = match (args.machine_id, args.machine_ip) {
            (Some(_), Some(_)) => bail!("UID_MACHINE_ID and UID_MACHINE_IP are mutually exclusive"),
            (None, None) => bail!("one of UID_MACHINE_ID or UID_MACHINE_IP is required"),
            (Some(id), None) => id,
            (None, Some(ip)) => PrivateIpv4(ip)
                .machine_id()
                .context("UID_MACHINE_IP cannot be used as a machine id")?,
        };

        if let Command::Generate { workers: 0, .. } = args.command {
            bail!("--workers must be greater than 0");
        }

        let uid = UidConfig {
            algorithm: Some(args.algorithm),
            epoch: Some(epoch),
            machine_id: Some(machine_id),
            max_wait: Duration::from_millis(args.max_wait_ms),
            resume_tick: args.resume_tick,
        };

        Ok(Self {
            uid,
            command: args.command,
        })
    }
}
