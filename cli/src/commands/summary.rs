use crate::output;
use anyhow::Result;
use clap::Args;
use config::CentralizedConfig;

#[derive(Args)]
pub struct SummaryArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(config: &CentralizedConfig, args: SummaryArgs) -> Result<()> {
    let summary = config.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::header("Platform Configuration");
    println!();
    output::print_value("config path", &summary.config_path, None);
    output::print_value(
        "platform.yml loaded",
        &output::bool_str(summary.platform_config_loaded).to_string(),
        None
    );
    output::print_value(
        "multi-repo mode",
        &output::bool_str(summary.multi_repo_mode).to_string(),
        None
    );
    output::print_value("repositories", &summary.repositories_count.to_string(), None);
    output::print_value("agents", &summary.agents_count.to_string(), None);

    if !summary.repositories.is_empty() {
        println!();
        output::subheader("Repositories");
        for name in &summary.repositories {
            println!("  {name}");
        }
    }

    if !summary.agents.is_empty() {
        println!();
        output::subheader("Agents");
        for name in &summary.agents {
            println!("  {name}");
        }
    }

    if let Some(reason) = &summary.fallback_reason {
        println!();
        output::warn(&format!("Using environment fallback: {reason}"));
    }

    Ok(())
}
