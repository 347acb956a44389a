use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use super::synchronizer;
use crate::config::Config;

pub async fn list_command() -> Result<()> {
    let config = Config::load()?;
    let session = config
        .active_session()
        .context("Not signed in. Run 'formsmith auth login' first")?;
    info!("Listing templates of {}", session.email);

    let sync = synchronizer(&config)?;
    let templates = sync.list_templates(session).await?;

    if templates.is_empty() {
        println!("No templates yet. Create one with 'formsmith template new'.");
        return Ok(());
    }

    for template in templates {
        let created = template
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{:>8}  {}  {}", template.id.bold(), created.dimmed(), template.title);
    }
    Ok(())
}
