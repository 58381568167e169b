//! svg2jsx: Convert SVG files into React components.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;
use svg2jsx::BunRunner;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle bun version command
    if args.bun_version {
        match BunRunner::get_bun_version(Some(args.workspace.as_path())).await {
            Ok((version, path)) => {
                println!("bun {}", version);
                println!("path: {}", path);
                if let Some(cache_dir) = BunRunner::get_cache_dir() {
                    println!("cache: {}", cache_dir);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    match orchestrator::run(args).await {
        Ok(summary) => {
            if summary.should_fail() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays clean for generated components.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SVG2JSX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
