//! The `quizdrill validate-config` command.

use anyhow::Result;

use quizdrill_client::ClientConfig;

pub fn execute(config: ClientConfig) -> Result<()> {
    println!("Configuration OK");
    println!("  base_url: {}", config.base_url);
    println!(
        "  api_token: {}",
        if config.api_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  timeout_secs: {}", config.timeout_secs);
    println!("  pass_threshold: {}", config.pass_threshold);
    Ok(())
}
