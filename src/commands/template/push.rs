use anyhow::Result;
use log::info;
use std::path::PathBuf;

use super::{editor_for, read_draft, synchronizer, write_draft};
use crate::config::Config;

pub async fn push_command(file: PathBuf) -> Result<()> {
    info!("Pushing draft {:?}", file);

    let config = Config::load()?;
    let sync = synchronizer(&config)?;
    let mut editor = editor_for(&config, read_draft(&file)?);

    let result = editor.save(&sync, config.active_session()).await;

    // keep the stored ids so the next push updates instead of inserting,
    // including those of a push that failed halfway
    write_draft(&file, editor.draft())?;
    let report = result?;

    if report.created {
        println!("  Template id: {}", report.template_id);
    } else if report.deleted_questions + report.deleted_options > 0 {
        println!(
            "  Removed {} questions and {} options from template {}",
            report.deleted_questions, report.deleted_options, report.template_id
        );
    }
    Ok(())
}
