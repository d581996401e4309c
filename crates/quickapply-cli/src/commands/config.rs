use anyhow::Result;
use console::style;
use std::path::Path;

/// Validate the effective configuration and print it with secrets masked
pub fn execute(config_path: Option<&Path>, show_selectors: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    config.validate()?;

    let mut shown = serde_json::to_value(config.masked())?;
    if !show_selectors {
        if let Some(map) = shown.as_object_mut() {
            map.remove("selectors");
        }
    }

    println!("{}", style("Configuration is valid").green().bold());
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
