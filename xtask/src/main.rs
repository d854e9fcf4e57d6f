use std::process::Command;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "codemerge development tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test suite with cargo nextest
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
    /// Review pending insta snapshots
    Snapshots,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Nextest { profile, release } => {
            let mut args = vec!["nextest", "run", "--workspace"];
            if let Some(profile) = profile.as_deref() {
                args.extend(["--profile", profile]);
            }
            if release {
                args.push("--release");
            }
            cargo(&args)
        }
        Commands::Lint => {
            cargo(&["fmt", "--all", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        }
        Commands::Snapshots => cargo(&["insta", "review", "--workspace"]),
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}
