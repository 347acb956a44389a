use anyhow::Result;
use log::info;
use std::path::PathBuf;

use super::{editor_for, write_draft};
use crate::config::Config;
use crate::editor::{AccessType, TemplateDraft};
use crate::ui::prompt_overwrite_confirmation;

pub async fn new_command(title: String, description: String, public: bool, file: PathBuf, force: bool) -> Result<()> {
    info!("Creating draft '{}' in {:?}", title, file);

    if file.exists() && !force && !prompt_overwrite_confirmation(&format!("Draft {:?}", file))? {
        println!("Cancelled.");
        return Ok(());
    }

    let config = Config::load()?;
    let mut editor = editor_for(&config, TemplateDraft::new());
    editor.set_title(title);
    editor.set_description(description);
    if public {
        editor.set_access_type(AccessType::Public);
    }

    write_draft(&file, editor.draft())?;

    println!("✓ Created draft {:?}", file);
    Ok(())
}
