use crate::output;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use config::CentralizedConfig;
use serde_json::json;

#[derive(Args)]
pub struct ReposArgs {
    #[arg(long, help = "Only list repositories agents may work on")]
    pub allowed: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(config: &CentralizedConfig, args: ReposArgs) -> Result<()> {
    let allowed = config.get_allowed_repositories();
    let repos: Vec<_> = config
        .get_all_repositories()
        .values()
        .filter(|repo| !args.allowed || allowed.contains(&repo.name))
        .collect();

    if args.json {
        let values: Vec<serde_json::Value> = repos
            .iter()
            .map(|repo| {
                json!({
                    "name": repo.name,
                    "type": repo.repo_type,
                    "port": repo.port,
                    "health_endpoint": repo.health_endpoint,
                    "allowed": allowed.contains(&repo.name)
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if repos.is_empty() {
        output::warn("No repositories configured");
        return Ok(());
    }

    output::header("Repositories");
    println!();
    for repo in repos {
        let marker = if allowed.contains(&repo.name) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<24} {:<10} {:<6} {}",
            marker, repo.name, repo.repo_type, repo.port, repo.health_endpoint
        );
    }
    println!();
    println!("{}", "* allowed for agents".dimmed());

    Ok(())
}
