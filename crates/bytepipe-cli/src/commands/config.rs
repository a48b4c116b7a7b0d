//! Config command implementation.

use anyhow::{Context, Result};

use bytepipe_core::config::Config;

use super::ConfigAction;

/// Run the config command.
pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = super::load_config();
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            print!("{rendered}");
        }
        ConfigAction::Path => println!("{}", Config::config_path().display()),
    }
    Ok(())
}
