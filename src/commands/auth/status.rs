use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::config::Config;

pub async fn status_command() -> Result<()> {
    info!("Showing auth status");

    let config = Config::load()?;

    match config.get_current_profile() {
        Some((name, profile)) => println!("Profile:  {} ({})", name.bold(), profile.url),
        None => {
            println!("Profile:  {}", "none".yellow());
            println!("Use 'formsmith profile add' to configure a backend.");
            return Ok(());
        }
    }

    match &config.session {
        Some(session) if session.is_expired() => {
            println!("Session:  {} (expired, run 'formsmith auth login')", session.email.yellow());
        }
        Some(session) => {
            println!("Session:  {} <{}>", session.author().green(), session.email);
            if let Some(expires_at) = session.expires_at {
                println!("Expires:  {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        None => println!("Session:  {}", "not signed in".yellow()),
    }
    Ok(())
}
