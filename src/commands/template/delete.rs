use anyhow::Result;
use log::info;

use super::synchronizer;
use crate::config::Config;
use crate::i18n::{Catalog, Localizer, MessageKey};
use crate::ui::prompt_remove_confirmation;

pub async fn delete_command(id: String, force: bool) -> Result<()> {
    info!("Deleting template {}", id);

    if !force && !prompt_remove_confirmation(&format!("template {} with all its answers", id))? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let config = Config::load()?;
    let sync = synchronizer(&config)?;
    sync.delete_template(&id).await?;

    let catalog = Catalog::new(config.settings.locale);
    println!("✓ {} ({})", catalog.message(MessageKey::TemplateDeleted), id);
    Ok(())
}
