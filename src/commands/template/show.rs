use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::read_draft;

pub async fn show_command(file: PathBuf) -> Result<()> {
    let draft = read_draft(&file)?;

    let id = draft.id.as_deref().unwrap_or("not pushed yet");
    println!("{} [{}] ({})", draft.title.bold(), draft.access_type, id.dimmed());
    if !draft.description.is_empty() {
        println!("{}", draft.description);
    }

    for (index, question) in draft.questions.iter().enumerate() {
        println!("\n{}. {} {}", index + 1, question.title, format!("({})", question.kind).dimmed());
        if !question.description.is_empty() {
            println!("   {}", question.description.dimmed());
        }
        for option in &question.options {
            let mark = if option.checked { "[x]" } else { "[ ]" };
            println!("   {} {}", mark, option.value);
        }
    }
    Ok(())
}
