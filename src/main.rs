use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fieldcrm::cli::args::{Cli, Commands};
use fieldcrm::cli::commands;
use fieldcrm::config::Config;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "fieldcrm=warn",
        1 => "fieldcrm=debug",
        _ => "fieldcrm=trace",
    };

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::from_default_env().add_directive(level.parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = Config::load()?;
    config.general.color.apply();
    let format = cli.output.unwrap_or(config.general.default_output);
    tracing::debug!(?format, "starting");

    let output = match &cli.command {
        Commands::Filter(args) => commands::filter(args, format)?,
        Commands::Automation(args) => commands::automation(&args.command, format, &config)?,
        Commands::Template(args) => commands::template(&args.command, format, &config)?,
        Commands::Terms(args) => commands::terms(&args.command, format)?,
        Commands::Completions { shell, install } => commands::completions(*shell, *install)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
