use crate::output;
use anyhow::Result;
use clap::Args;
use config::CentralizedConfig;

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(config: &CentralizedConfig, args: ShowArgs) -> Result<()> {
    let entries = config.explain();

    if args.json {
        let values: Vec<serde_json::Value> = entries
            .iter()
            .map(|(key, value, source)| {
                serde_json::json!({
                    "key": key,
                    "value": value,
                    "source": source
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    output::header("Resolved Settings");
    println!();
    for (key, value, source) in &entries {
        output::print_value(key, value, Some(source));
    }

    Ok(())
}
