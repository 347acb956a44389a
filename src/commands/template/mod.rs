//! Template commands
//!
//! Drafts live in a local JSON file between commands; every edit goes
//! through a [`TemplateEditor`] so capacity warnings and localized notices
//! reach the terminal.

pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod pull;
pub mod push;
pub mod show;

pub use delete::delete_command;
pub use edit::{add_option_command, add_question_command, move_question_command, remove_question_command};
pub use list::list_command;
pub use new::new_command;
pub use pull::pull_command;
pub use push::push_command;
pub use show::show_command;

use crate::commands::rest_store;
use crate::config::Config;
use crate::editor::{RecordId, TemplateDraft, TemplateEditor};
use crate::i18n::Catalog;
use crate::notify::ConsoleNotifier;
use crate::sync::Synchronizer;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub(crate) fn read_draft(path: &Path) -> Result<TemplateDraft> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {:?}. Create one with 'formsmith template new'", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse draft {:?}", path))
}

pub(crate) fn write_draft(path: &Path, draft: &TemplateDraft) -> Result<()> {
    let content = serde_json::to_string_pretty(draft).context("Failed to serialize draft")?;
    fs::write(path, content).with_context(|| format!("Failed to write draft {:?}", path))
}

/// Editor configured from the user's settings
pub(crate) fn editor_for(config: &Config, draft: TemplateDraft) -> TemplateEditor {
    TemplateEditor::new()
        .with_draft(draft)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_localizer(Arc::new(Catalog::new(config.settings.locale)))
        .with_max_questions_per_type(config.settings.max_questions_per_type)
}

pub(crate) fn synchronizer(config: &Config) -> Result<Synchronizer> {
    Ok(Synchronizer::new(Arc::new(rest_store(config)?)))
}

/// Id of the question shown as `number` (1-based)
pub(crate) fn question_at(draft: &TemplateDraft, number: usize) -> Result<RecordId> {
    number
        .checked_sub(1)
        .and_then(|index| draft.questions.get(index))
        .map(|q| q.id.clone())
        .with_context(|| format!("No question {} (draft has {})", number, draft.questions.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{QuestionType, SequentialIds, IdGenerator, MAX_QUESTIONS_PER_TYPE};
    use tempfile::TempDir;

    #[test]
    fn test_draft_file_keeps_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("template.json");
        let ids = SequentialIds::new();

        let mut draft = TemplateDraft::new();
        draft.id = Some("12".to_string());
        draft.add_question(ids.next_id(), QuestionType::Radio, MAX_QUESTIONS_PER_TYPE).unwrap();
        draft.questions[0].id = RecordId::stored("40");

        write_draft(&path, &draft).unwrap();
        assert_eq!(read_draft(&path).unwrap(), draft);
    }

    #[test]
    fn test_question_numbers_are_one_based() {
        let mut draft = TemplateDraft::new();
        draft.add_question(RecordId::stored("a"), QuestionType::Text, MAX_QUESTIONS_PER_TYPE).unwrap();

        assert_eq!(question_at(&draft, 1).unwrap(), RecordId::stored("a"));
        assert!(question_at(&draft, 0).is_err());
        assert!(question_at(&draft, 2).is_err());
    }
}
