use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use rimeid::SnowflakeId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Runtime configuration for the `rimeid-axum-server` binary.
///
/// All values are parsed from CLI arguments or environment variables. The
/// node ID has no default on purpose: embedding a uniqueness-critical value
/// implicitly invites collisions between instances deployed from the same
/// template.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rimeid-axum-server",
    version,
    about = "An HTTP service minting Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `ADDR`
    #[arg(long, env = "ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub addr: String,

    /// Node ID embedded into every ID this instance mints.
    ///
    /// Must be unique among concurrently running instances sharing an ID
    /// space, and within the 10-bit node field (0..=1023).
    ///
    /// Environment variable: `NODE_ID`
    #[arg(long, env = "NODE_ID")]
    pub node_id: u64,

    /// Epoch the timestamp field counts from, in milliseconds since
    /// 1970-01-01 UTC.
    ///
    /// Every instance sharing an ID space must use the same epoch; decoded
    /// timestamps are only meaningful against it. The default is
    /// 2015-01-01T00:00:00Z.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = 1_420_070_400_000)]
    pub epoch_ms: u64,

    /// Optional bound, in milliseconds, on the wait performed when a
    /// millisecond's sequence space is exhausted.
    ///
    /// Unset means the mint call waits for the clock to advance (at most a
    /// few milliseconds in practice).
    ///
    /// Environment variable: `WAIT_TIMEOUT_MS`
    #[arg(long, env = "WAIT_TIMEOUT_MS")]
    pub wait_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub node_id: u64,
    pub epoch: Duration,
    pub wait_timeout: Option<Duration>,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.node_id > SnowflakeId::max_node_id() {
            bail!(
                "NODE_ID ({}) exceeds the Snowflake node ID space (max = {})",
                args.node_id,
                SnowflakeId::max_node_id()
            );
        }

        let unix_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH")
            .as_millis() as u64;
        if args.epoch_ms > unix_now {
            bail!(
                "EPOCH_MS ({}) is in the future; timestamps would saturate at zero",
                args.epoch_ms
            );
        }

        Ok(Self {
            addr: args.addr,
            node_id: args.node_id,
            epoch: Duration::from_millis(args.epoch_ms),
            wait_timeout: args.wait_timeout_ms.map(Duration::from_millis),
        })
    }
}
