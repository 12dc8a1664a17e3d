use clap::Parser;
use ipfs_ds::Args;
use miette::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `IPFS_DS_LOG=debug`
const LOG_ENV: &str = "IPFS_DS_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .init();

    let args = Args::parse();
    ipfs_ds::run(args, &mut std::io::stdout()).await?;
    Ok(())
}
