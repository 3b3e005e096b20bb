use crate::output;
use anyhow::Result;
use clap::Args;
use config::CentralizedConfig;

#[derive(Args)]
pub struct LookupArgs {
    #[arg(help = "Name to look up")]
    pub name: String
}

pub fn run_repo(config: &CentralizedConfig, args: LookupArgs) -> Result<()> {
    match config.get_repository_config(&args.name) {
        Some(repo) => println!("{}", serde_json::to_string_pretty(repo)?),
        None => output::warn(&format!("Repository '{}' not found", args.name))
    }
    Ok(())
}

pub fn run_agent(config: &CentralizedConfig, args: LookupArgs) -> Result<()> {
    match config.get_agent_config(&args.name) {
        Some(agent) => println!("{}", serde_json::to_string_pretty(agent)?),
        None => output::warn(&format!("Agent '{}' not found", args.name))
    }
    Ok(())
}
