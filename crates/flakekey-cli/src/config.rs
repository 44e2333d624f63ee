use anyhow::bail;
use clap::Parser;
use flakekey::{Config, KEY_SEPARATOR};

/// Command-line and environment configuration for the `flakekey` binary.
///
/// Every value may come from a flag or from the environment (a `.env` file in
/// the working directory is loaded first). Identity overrides are optional;
/// without them the node ID comes from a hardware address and the process ID
/// from the OS.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakekey",
    version,
    about = "Mint compact, time-sortable primary keys"
)]
pub struct CliArgs {
    /// Node ID override. Only the low 10 bits are used.
    ///
    /// Environment variable: `FLAKEKEY_NODE_ID`
    #[arg(long, env = "FLAKEKEY_NODE_ID")]
    pub node_id: Option<u64>,

    /// Process ID override. Only the low 5 bits are used.
    ///
    /// Environment variable: `FLAKEKEY_PROCESS_ID`
    #[arg(long, env = "FLAKEKEY_PROCESS_ID")]
    pub process_id: Option<u64>,

    /// Prefix placed before the `_` separator of every minted key.
    ///
    /// Environment variable: `FLAKEKEY_PREFIX`
    #[arg(long, env = "FLAKEKEY_PREFIX", default_value_t = String::from("Exp"))]
    pub prefix: String,

    /// Number of keys to mint, one per line.
    ///
    /// Environment variable: `FLAKEKEY_COUNT`
    #[arg(short = 'n', long, env = "FLAKEKEY_COUNT", default_value_t = 1)]
    pub count: usize,

    /// Parse KEY and print its components instead of minting.
    #[arg(long, value_name = "KEY")]
    pub decode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Mint { prefix: String, count: usize },
    Decode { key: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub generator: Config,
    pub mode: Mode,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mode = match args.decode {
            Some(key) => Mode::Decode { key },
            None => {
                if args.count == 0 {
                    bail!("FLAKEKEY_COUNT must be greater than 0");
                }
                if args.prefix.contains(KEY_SEPARATOR) {
                    tracing::warn!(
                        prefix = %args.prefix,
                        "prefix contains the key separator; minted keys will not parse back"
                    );
                }
                Mode::Mint {
                    prefix: args.prefix,
                    count: args.count,
                }
            }
        };

        Ok(Self {
            generator: Config {
                node_id: args.node_id,
                process_id: args.process_id,
                ..Config::default()
            },
            mode,
        })
    }
}
