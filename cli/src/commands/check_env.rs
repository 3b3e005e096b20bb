use crate::output;
use anyhow::Result;
use config::CentralizedConfig;

pub fn run(config: &CentralizedConfig) -> Result<()> {
    let missing = config.missing_required_env();

    if missing.is_empty() {
        output::success("All required environment variables are set");
        return Ok(());
    }

    for key in &missing {
        output::error(&format!("{key} is not set"));
    }
    std::process::exit(1);
}
