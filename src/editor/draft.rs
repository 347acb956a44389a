//! Template draft: the editable aggregate of a template and its questions
//!
//! All list mutations go through the functions in [`super::list`], so each
//! change replaces the affected list with a fresh `Vec` computed from the
//! current state. Operations addressing an unknown id return `false` and
//! leave the draft untouched.

use super::ids::{IdMapping, RecordId};
use super::list::{self, DragEnd};
use super::model::{AccessType, AnswerOption, Question, QuestionType};
use crate::store::TemplateRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of questions of one type in a template
pub const MAX_QUESTIONS_PER_TYPE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Adding another question of `kind` would exceed `limit`
    CapacityExceeded { kind: QuestionType, limit: usize },
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::CapacityExceeded { kind, limit } => {
                write!(f, "A template can hold at most {} '{}' questions", limit, kind)
            }
        }
    }
}

impl std::error::Error for DraftError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Store id, absent until the first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "accessType")]
    pub access_type: AccessType,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl TemplateDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn question(&self, id: &RecordId) -> Option<&Question> {
        list::find(&self.questions, id)
    }

    pub fn option(&self, question_id: &RecordId, option_id: &RecordId) -> Option<&AnswerOption> {
        self.question(question_id)
            .and_then(|q| list::find(&q.options, option_id))
    }

    pub fn count_of(&self, kind: QuestionType) -> usize {
        self.questions.iter().filter(|q| q.kind == kind).count()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_access_type(&mut self, access_type: AccessType) {
        self.access_type = access_type;
    }

    /// Append an empty question of `kind` unless `limit` questions of that kind exist
    pub fn add_question(&mut self, id: RecordId, kind: QuestionType, limit: usize) -> Result<(), DraftError> {
        if self.count_of(kind) >= limit {
            return Err(DraftError::CapacityExceeded { kind, limit });
        }
        self.questions = list::appended(&self.questions, Question::empty(id, kind));
        Ok(())
    }

    pub fn update_question<F>(&mut self, id: &RecordId, update: F) -> bool
    where
        F: FnOnce(&Question) -> Question,
    {
        if list::position(&self.questions, id).is_none() {
            return false;
        }
        self.questions = list::replace_with(&self.questions, id, update);
        true
    }

    pub fn set_question_title(&mut self, id: &RecordId, title: impl Into<String>) -> bool {
        let title = title.into();
        self.update_question(id, |q| Question { title, ..q.clone() })
    }

    pub fn set_question_description(&mut self, id: &RecordId, description: impl Into<String>) -> bool {
        let description = description.into();
        self.update_question(id, |q| Question { description, ..q.clone() })
    }

    /// Options are kept when switching away from a choice type
    pub fn set_question_type(&mut self, id: &RecordId, kind: QuestionType) -> bool {
        self.update_question(id, |q| Question { kind, ..q.clone() })
    }

    pub fn remove_question(&mut self, id: &RecordId) -> bool {
        if list::position(&self.questions, id).is_none() {
            return false;
        }
        self.questions = list::without(&self.questions, id);
        true
    }

    pub fn reorder_questions(&mut self, drag: &DragEnd) -> bool {
        match list::reorder(&self.questions, drag) {
            Some(questions) => {
                self.questions = questions;
                true
            }
            None => false,
        }
    }

    /// Single entry point for every option-list change.
    ///
    /// `change` sees the question's current options and returns the new
    /// list, or `None` when nothing changes.
    pub fn update_options<F>(&mut self, question_id: &RecordId, change: F) -> bool
    where
        F: FnOnce(&[AnswerOption]) -> Option<Vec<AnswerOption>>,
    {
        let Some(question) = self.question(question_id) else {
            return false;
        };
        let Some(options) = change(&question.options) else {
            return false;
        };
        self.update_question(question_id, |q| Question { options, ..q.clone() })
    }

    pub fn add_option(&mut self, question_id: &RecordId, option_id: RecordId) -> bool {
        self.update_options(question_id, |options| {
            Some(list::appended(options, AnswerOption::empty(option_id)))
        })
    }

    pub fn set_option_value(&mut self, question_id: &RecordId, option_id: &RecordId, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_options(question_id, |options| {
            list::position(options, option_id)?;
            Some(list::replace_with(options, option_id, |o| AnswerOption { value, ..o.clone() }))
        })
    }

    pub fn set_option_checked(&mut self, question_id: &RecordId, option_id: &RecordId, checked: bool) -> bool {
        self.update_options(question_id, |options| {
            list::position(options, option_id)?;
            Some(list::replace_with(options, option_id, |o| AnswerOption { checked, ..o.clone() }))
        })
    }

    pub fn remove_option(&mut self, question_id: &RecordId, option_id: &RecordId) -> bool {
        self.update_options(question_id, |options| {
            list::position(options, option_id)?;
            Some(list::without(options, option_id))
        })
    }

    pub fn reorder_options(&mut self, question_id: &RecordId, drag: &DragEnd) -> bool {
        self.update_options(question_id, |options| list::reorder(options, drag))
    }

    /// Replace draft ids with the store ids assigned by a save
    pub fn adopt_ids(&mut self, mapping: &IdMapping) {
        if let Some(template_id) = &mapping.template {
            self.id = Some(template_id.clone());
        }
        for question in &mut self.questions {
            question.id = mapping.resolve(&question.id);
            for option in &mut question.options {
                option.id = mapping.resolve(&option.id);
            }
        }
    }
}

impl From<TemplateRecord> for TemplateDraft {
    fn from(record: TemplateRecord) -> Self {
        Self {
            id: Some(record.id),
            title: record.title,
            description: record.description,
            access_type: record.access_type,
            questions: record
                .questions
                .into_iter()
                .map(|q| Question {
                    id: RecordId::Stored(q.id),
                    kind: q.kind,
                    title: q.title,
                    description: q.description,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| AnswerOption {
                            id: RecordId::Stored(o.id),
                            value: o.value,
                            checked: o.checked,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ids::{IdGenerator, SequentialIds};

    fn draft_with_radio(ids: &SequentialIds) -> (TemplateDraft, RecordId, Vec<RecordId>) {
        let mut draft = TemplateDraft::new();
        let question = ids.next_id();
        draft.add_question(question.clone(), QuestionType::Radio, MAX_QUESTIONS_PER_TYPE).unwrap();
        let options: Vec<_> = (0..3).map(|_| ids.next_id()).collect();
        for option in &options {
            assert!(draft.add_option(&question, option.clone()));
        }
        (draft, question, options)
    }

    #[test]
    fn test_field_setters() {
        let mut draft = TemplateDraft::new();
        draft.set_title("Survey");
        draft.set_description("About fruit");
        draft.set_access_type(AccessType::Public);

        assert_eq!(draft.title, "Survey");
        assert_eq!(draft.description, "About fruit");
        assert_eq!(draft.access_type, AccessType::Public);
        assert!(draft.is_new());
    }

    #[test]
    fn test_capacity_per_type() {
        let ids = SequentialIds::new();
        let mut draft = TemplateDraft::new();
        for _ in 0..MAX_QUESTIONS_PER_TYPE {
            draft.add_question(ids.next_id(), QuestionType::Text, MAX_QUESTIONS_PER_TYPE).unwrap();
        }

        let err = draft
            .add_question(ids.next_id(), QuestionType::Text, MAX_QUESTIONS_PER_TYPE)
            .unwrap_err();
        assert_eq!(err, DraftError::CapacityExceeded { kind: QuestionType::Text, limit: 4 });
        assert_eq!(draft.questions.len(), 4);

        // other types are unaffected
        draft.add_question(ids.next_id(), QuestionType::Radio, MAX_QUESTIONS_PER_TYPE).unwrap();
        assert_eq!(draft.questions.len(), 5);
    }

    #[test]
    fn test_option_updates_by_id() {
        let ids = SequentialIds::new();
        let (mut draft, question, options) = draft_with_radio(&ids);

        assert!(draft.set_option_value(&question, &options[1], "Banana"));
        assert!(draft.set_option_checked(&question, &options[1], true));

        let option = draft.option(&question, &options[1]).unwrap();
        assert_eq!(option.value, "Banana");
        assert!(option.checked);
    }

    #[test]
    fn test_unknown_ids_leave_draft_unchanged() {
        let ids = SequentialIds::new();
        let (mut draft, question, options) = draft_with_radio(&ids);
        let before = draft.clone();
        let stranger = ids.next_id();

        assert!(!draft.set_question_title(&stranger, "x"));
        assert!(!draft.set_option_value(&question, &stranger, "x"));
        assert!(!draft.set_option_value(&stranger, &options[0], "x"));
        assert!(!draft.remove_option(&question, &stranger));
        assert!(!draft.remove_question(&stranger));
        assert!(!draft.add_option(&stranger, ids.next_id()));
        assert!(!draft.reorder_options(&question, &DragEnd::new(options[0].clone(), Some(stranger))));

        assert_eq!(draft, before);
    }

    #[test]
    fn test_reorder_options_moves_only_target_question() {
        let ids = SequentialIds::new();
        let (mut draft, question, options) = draft_with_radio(&ids);

        let drag = DragEnd::new(options[2].clone(), Some(options[0].clone()));
        assert!(draft.reorder_options(&question, &drag));

        let order = list::keys(&draft.question(&question).unwrap().options);
        assert_eq!(order, vec![options[2].clone(), options[0].clone(), options[1].clone()]);
    }

    #[test]
    fn test_type_change_keeps_options() {
        let ids = SequentialIds::new();
        let (mut draft, question, _) = draft_with_radio(&ids);

        assert!(draft.set_question_type(&question, QuestionType::Text));
        let q = draft.question(&question).unwrap();
        assert_eq!(q.kind, QuestionType::Text);
        assert_eq!(q.options.len(), 3);
    }

    #[test]
    fn test_adopt_ids_rewrites_drafts() {
        let ids = SequentialIds::new();
        let (mut draft, question, options) = draft_with_radio(&ids);

        let mut mapping = IdMapping::default();
        mapping.template = Some("t1".to_string());
        mapping.record(&question, "q1");
        mapping.record(&options[0], "o1");

        draft.adopt_ids(&mapping);

        assert_eq!(draft.id.as_deref(), Some("t1"));
        let q = &draft.questions[0];
        assert_eq!(q.id, RecordId::stored("q1"));
        assert_eq!(q.options[0].id, RecordId::stored("o1"));
        // unmapped ids stay as they were
        assert_eq!(q.options[1].id, options[1]);
    }
}
