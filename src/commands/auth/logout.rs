use anyhow::Result;
use log::info;

use crate::config::Config;

pub async fn logout_command() -> Result<()> {
    info!("Signing out");

    let mut config = Config::load()?;
    match config.clear_session()? {
        Some(session) => println!("✓ Signed out {}", session.email),
        None => println!("Not signed in."),
    }
    Ok(())
}
