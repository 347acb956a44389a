use anyhow::{Context, Result};
use log::info;

use crate::commands::rest_store;
use crate::config::Config;
use crate::ui::prompt_login;

pub async fn login_command(email: Option<String>, password: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    let (email, password) = prompt_login(email, password)?;
    info!("Signing in as {}", email);

    let store = rest_store(&config)?;
    let session = store
        .sign_in(&email, &password)
        .await
        .with_context(|| format!("Failed to sign in as {}", email))?;

    println!("✓ Signed in as {} ({})", session.author(), session.email);
    config.set_session(session)?;
    Ok(())
}
