use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::ui::select_profile;

pub async fn select_command(name: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let name = match name {
        Some(name) => name,
        None => select_profile(&config.list_profiles(), config.current_profile.as_deref())?,
    };
    info!("Selecting profile: {}", name);

    config.set_current_profile(&name)?;

    println!("✓ Current profile: {}", name);
    Ok(())
}
