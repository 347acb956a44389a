use anyhow::Result;
use log::info;
use std::path::PathBuf;

use super::{editor_for, synchronizer, write_draft};
use crate::config::Config;
use crate::editor::TemplateDraft;
use crate::ui::prompt_overwrite_confirmation;

pub async fn pull_command(id: String, file: PathBuf, force: bool) -> Result<()> {
    info!("Pulling template {} into {:?}", id, file);

    if file.exists() && !force && !prompt_overwrite_confirmation(&format!("Draft {:?}", file))? {
        println!("Cancelled.");
        return Ok(());
    }

    let config = Config::load()?;
    let sync = synchronizer(&config)?;
    let mut editor = editor_for(&config, TemplateDraft::new());

    editor.load(&sync, &id).await?;
    write_draft(&file, editor.draft())?;

    println!(
        "✓ Pulled '{}' ({} questions) into {:?}",
        editor.draft().title,
        editor.draft().questions.len(),
        file
    );
    Ok(())
}
