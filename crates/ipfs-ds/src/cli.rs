use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ipfs-ds",
    author,
    version,
    about = "Read and write values in a local IPFS repository datastore"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a datastore value by key
    Get(GetArgs),
    /// Put a datastore key-value pair
    Put(PutArgs),
    /// List available multibase encodings
    Bases(BasesArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// The IPFS repo with the datastore config (uses the IPFS_PATH environment variable by default)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct GetArgs {
    /// Datastore key to read
    #[arg(value_name = "KEY")]
    pub key: String,

    /// The multibase to encode the value with (e.g. base32)
    #[arg(short = 'b', long, value_name = "NAME")]
    pub base: Option<String>,

    #[command(flatten)]
    pub repo: RepoArgs,

    /// The key is encoded using multibase
    #[arg(long)]
    pub key_encoded: bool,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PutArgs {
    /// Datastore key to write
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Value to store
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// The value is encoded using multibase
    #[arg(long)]
    pub value_encoded: bool,

    #[command(flatten)]
    pub repo: RepoArgs,

    /// The key is encoded using multibase
    #[arg(long)]
    pub key_encoded: bool,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct BasesArgs {
    /// Also include the single letter prefixes in addition to the code
    #[arg(long)]
    pub prefix: bool,

    /// Also include numeric codes
    #[arg(long)]
    pub numeric: bool,
}
