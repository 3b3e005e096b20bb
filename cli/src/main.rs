use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(env_file) = &cli.env_file {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
        tracing::debug!("Loaded environment from {:?}", env_file);
    }

    let config = config::global::init_from_path(cli.config_dir.as_path());

    match cli.command {
        Commands::Summary(args) => commands::summary::run(&config, args),
        Commands::Show(args) => commands::show::run(&config, args),
        Commands::Repos(args) => commands::repos::run(&config, args),
        Commands::Repo(args) => commands::lookup::run_repo(&config, args),
        Commands::Agent(args) => commands::lookup::run_agent(&config, args),
        Commands::CheckEnv => commands::check_env::run(&config)
    }
}
