//! slngen CLI - Visual Studio solution and project generator for FLINT

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slngen::ops::{self, GenerateOptions};

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slngen=debug")
    } else {
        EnvFilter::new("slngen=info")
    };

    // stdout is reserved for --list output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let opts = GenerateOptions {
        root: cli.root,
        vs_version: cli.vs_version,
        tests: cli.tests.then_some(true),
        profiles: cli.profiles.then_some(true),
        variant: cli.variant,
        progress: !cli.verbose,
    };

    if cli.list {
        let inventory = ops::list(&opts)?;
        let json =
            serde_json::to_string_pretty(&inventory).context("failed to serialize inventory")?;
        println!("{}", json);
        return Ok(());
    }

    let summary = ops::generate(&opts)?;
    eprintln!(
        "   Generated {} project(s) in {} solution(s) from {} file(s)",
        summary.projects.len(),
        summary.solutions.len(),
        summary.classified
    );

    Ok(())
}
