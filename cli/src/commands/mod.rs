pub mod check_env;
pub mod lookup;
pub mod repos;
pub mod show;
pub mod summary;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agent-platform-config",
    author,
    version,
    about = "Inspect the resolved agent platform configuration",
    long_about = "Loads platform.yml, repositories.yml and agents.yml from the configuration \
                  root, applies environment overrides, and prints the result.\nWithout any \
                  source the configuration is derived from environment variables."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "AGENT_PLATFORM_CONFIG_DIR",
        default_value = config::DEFAULT_CONFIG_PATH,
        help = "Configuration root directory"
    )]
    pub config_dir: PathBuf,

    #[arg(long, global = true, help = "Load environment variables from a dotenv file first")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show what was loaded and from where")]
    Summary(summary::SummaryArgs),

    #[command(about = "Show every resolved setting with its source")]
    Show(show::ShowArgs),

    #[command(about = "List known repositories")]
    Repos(repos::ReposArgs),

    #[command(about = "Show one repository")]
    Repo(lookup::LookupArgs),

    #[command(about = "Show one agent")]
    Agent(lookup::LookupArgs),

    #[command(about = "Check that the variables agents need at launch are set")]
    CheckEnv
}
