//! Row payloads and diffs computed from a draft before any store call

use crate::auth::Session;
use crate::editor::{AnswerOption, Question, RecordId, TemplateDraft};
use crate::store::{OptionFields, QuestionFields, TemplateFields};
use std::collections::HashSet;

/// Persisted ids that no longer appear in the draft, in persisted order
pub fn stale_ids<'a, I>(persisted: &[String], kept: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a RecordId>,
{
    let kept: HashSet<&str> = kept.into_iter().filter_map(RecordId::as_stored).collect();
    persisted
        .iter()
        .filter(|id| !kept.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Template columns; ownership is only stamped when `owner` is given
pub fn template_fields(draft: &TemplateDraft, owner: Option<&Session>) -> TemplateFields {
    TemplateFields {
        title: draft.title.clone(),
        description: draft.description.clone(),
        access_type: draft.access_type,
        author: owner.map(|session| session.author().to_string()),
        gmail: owner.map(|session| session.email.clone()),
    }
}

pub fn question_fields(question: &Question, position: usize) -> QuestionFields {
    QuestionFields {
        title: question.title.clone(),
        description: question.description.clone(),
        kind: question.kind,
        position: position_of(position),
    }
}

pub fn option_fields(option: &AnswerOption, position: usize) -> OptionFields {
    OptionFields {
        value: option.value.clone(),
        checked: option.checked,
        position: position_of(position),
    }
}

fn position_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
