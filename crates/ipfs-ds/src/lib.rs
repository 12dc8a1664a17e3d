//! Command-line access to a local IPFS repository datastore
//!
//! `ipfs-ds get` and `ipfs-ds put` read and write raw values by key, with
//! optional multibase decoding of keys and values. `ipfs-ds bases` lists
//! the multibase encodings those flags accept.

pub mod bases;
pub mod cli;
pub mod commands;
pub mod encoding;
pub mod error;

use std::io::Write;

pub use cli::{Args, Command};
pub use error::CliError;

/// Run one parsed invocation, writing command output to `out`
pub async fn run<W: Write>(args: Args, out: &mut W) -> Result<(), CliError> {
    match args.command {
        Command::Get(get) => commands::get(&get, out).await,
        Command::Put(put) => commands::put(&put).await,
        Command::Bases(bases) => commands::bases(&bases, out),
    }
}
