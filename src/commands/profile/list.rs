use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::config::Config;

pub async fn list_command() -> Result<()> {
    info!("Listing profiles");

    let config = Config::load()?;
    let names = config.list_profiles();

    if names.is_empty() {
        println!("No profiles configured. Use 'formsmith profile add' to add one.");
        return Ok(());
    }

    for name in names {
        let url = config.profiles.get(name).map(|p| p.url.as_str()).unwrap_or_default();
        if config.current_profile.as_deref() == Some(name) {
            println!("{} {} {}", "*".green().bold(), name.bold(), url.dimmed());
        } else {
            println!("  {} {}", name, url.dimmed());
        }
    }
    Ok(())
}
