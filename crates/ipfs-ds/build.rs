use clap::CommandFactory;
use clap_complete::{generate_to, shells};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    let mut cmd = cli::Args::command();

    // Man page
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;
    let mut man_buffer = Vec::new();
    Man::new(cmd.clone()).render(&mut man_buffer)?;
    fs::write(man_dir.join("ipfs-ds.1"), man_buffer)?;

    // Shell completions
    let comp_dir = out_dir.join("completions");
    generate_completions(&comp_dir, &mut cmd)?;

    Ok(())
}

fn generate_completions(comp_dir: &Path, cmd: &mut clap::Command) -> Result<()> {
    fs::create_dir_all(comp_dir)?;
    generate_to(shells::Bash, cmd, "ipfs-ds", comp_dir)?;
    generate_to(shells::Fish, cmd, "ipfs-ds", comp_dir)?;
    generate_to(shells::Zsh, cmd, "ipfs-ds", comp_dir)?;
    Ok(())
}
