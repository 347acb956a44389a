use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

use super::{editor_for, question_at, read_draft, write_draft};
use crate::config::Config;
use crate::editor::{DragEnd, QuestionType};

pub async fn add_question_command(
    kind: QuestionType,
    title: String,
    description: String,
    options: Vec<String>,
    file: PathBuf,
) -> Result<()> {
    info!("Adding {} question '{}' to {:?}", kind, title, file);

    let config = Config::load()?;
    let mut editor = editor_for(&config, read_draft(&file)?);

    // the editor has already warned about the per-type limit
    let Some(question) = editor.add_question(kind) else {
        return Ok(());
    };
    editor.set_question_title(&question, title);
    editor.set_question_description(&question, description);

    if !options.is_empty() && !kind.has_options() {
        warn!("Options given for a '{}' question are stored but not shown", kind);
    }
    for value in options {
        if let Some(option) = editor.add_option(&question) {
            editor.set_option_value(&question, &option, value);
        }
    }

    write_draft(&file, editor.draft())?;

    println!("✓ Added question {} ({})", editor.draft().questions.len(), kind);
    Ok(())
}

pub async fn add_option_command(question: usize, value: String, checked: bool, file: PathBuf) -> Result<()> {
    info!("Adding option '{}' to question {} in {:?}", value, question, file);

    let config = Config::load()?;
    let draft = read_draft(&file)?;
    let question_id = question_at(&draft, question)?;
    let mut editor = editor_for(&config, draft);

    if let Some(kind) = editor.draft().question(&question_id).map(|q| q.kind) {
        if !kind.has_options() {
            warn!("Question {} is a '{}' question; its options are not shown", question, kind);
        }
    }

    let Some(option) = editor.add_option(&question_id) else {
        anyhow::bail!("Question {} not found", question);
    };
    editor.set_option_value(&question_id, &option, value);
    if checked {
        editor.set_option_checked(&question_id, &option, true);
    }

    write_draft(&file, editor.draft())?;

    println!("✓ Added option to question {}", question);
    Ok(())
}

pub async fn move_question_command(from: usize, to: usize, file: PathBuf) -> Result<()> {
    info!("Moving question {} to {} in {:?}", from, to, file);

    let config = Config::load()?;
    let draft = read_draft(&file)?;
    let drag = DragEnd::new(question_at(&draft, from)?, Some(question_at(&draft, to)?));
    let mut editor = editor_for(&config, draft);

    if !editor.reorder_questions(&drag) {
        println!("Nothing to move.");
        return Ok(());
    }

    write_draft(&file, editor.draft())?;

    println!("✓ Moved question {} to position {}", from, to);
    Ok(())
}

pub async fn remove_question_command(question: usize, file: PathBuf) -> Result<()> {
    info!("Removing question {} from {:?}", question, file);

    let config = Config::load()?;
    let draft = read_draft(&file)?;
    let question_id = question_at(&draft, question)?;
    let mut editor = editor_for(&config, draft);

    editor.remove_question(&question_id);
    write_draft(&file, editor.draft())?;

    println!("✓ Removed question {}. It is deleted from the backend on the next push", question);
    Ok(())
}
