use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::ui::prompt_remove_confirmation;

pub async fn remove_command(name: String, force: bool) -> Result<()> {
    info!("Removing profile: {}", name);

    let mut config = Config::load()?;

    if !config.profiles.contains_key(&name) {
        println!("Profile '{}' not found.", name);
        return Ok(());
    }

    if !force && !prompt_remove_confirmation(&format!("profile '{}'", name))? {
        println!("Operation cancelled.");
        return Ok(());
    }

    config.remove_profile(&name)?;

    println!("✓ Removed profile '{}'", name);
    Ok(())
}
