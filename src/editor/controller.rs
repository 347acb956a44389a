//! Template editor
//!
//! Wraps a [`TemplateDraft`] with the collaborators the presentation
//! layer needs: an id generator for new items, change listeners and a
//! notifier for user-visible warnings. The synchronizer is passed to
//! [`TemplateEditor::save`] and [`TemplateEditor::load`] explicitly, like
//! the session. Each effective mutation emits exactly one [`EditorEvent`];
//! operations that change nothing emit none.

use super::draft::{TemplateDraft, MAX_QUESTIONS_PER_TYPE};
use super::ids::{IdGenerator, RecordId, UuidGenerator};
use super::list::{self, DragEnd};
use super::model::{AccessType, Question, QuestionType};
use crate::auth::Session;
use crate::i18n::{Catalog, Localizer, MessageKey};
use crate::notify::{LogNotifier, Notice, NoticeLevel, Notifier};
use crate::sync::{LoadError, SaveError, SaveReport, Synchronizer};
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    TitleChanged,
    DescriptionChanged,
    AccessTypeChanged(AccessType),
    QuestionAdded(RecordId),
    QuestionUpdated(RecordId),
    QuestionRemoved(RecordId),
    QuestionsReordered(Vec<RecordId>),
    OptionAdded { question: RecordId, option: RecordId },
    OptionUpdated { question: RecordId, option: RecordId },
    OptionRemoved { question: RecordId, option: RecordId },
    OptionsReordered { question: RecordId, order: Vec<RecordId> },
    /// The draft was replaced by a fetched template
    Loaded(String),
    /// A save finished and stored ids were adopted
    Saved(String),
}

pub type Listener = Box<dyn FnMut(&EditorEvent) + Send>;

pub struct TemplateEditor {
    draft: TemplateDraft,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn Notifier>,
    localizer: Arc<dyn Localizer>,
    listeners: Vec<Listener>,
    max_questions_per_type: usize,
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEditor {
    /// Editor over an empty draft
    pub fn new() -> Self {
        Self {
            draft: TemplateDraft::new(),
            ids: Arc::new(UuidGenerator),
            notifier: Arc::new(LogNotifier),
            localizer: Arc::new(Catalog::default()),
            listeners: Vec::new(),
            max_questions_per_type: MAX_QUESTIONS_PER_TYPE,
        }
    }

    pub fn with_draft(mut self, draft: TemplateDraft) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn with_max_questions_per_type(mut self, limit: usize) -> Self {
        self.max_questions_per_type = limit;
        self
    }

    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn draft(&self) -> &TemplateDraft {
        &self.draft
    }

    pub fn into_draft(self) -> TemplateDraft {
        self.draft
    }

    fn emit(&mut self, event: EditorEvent) {
        debug!("Editor event: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn notice(&self, level: NoticeLevel, key: MessageKey, detail: Option<String>) {
        let mut notice = Notice::new(level, key, self.localizer.message(key));
        notice.detail = detail;
        self.notifier.notify(notice);
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.draft.title == title {
            return false;
        }
        self.draft.set_title(title);
        self.emit(EditorEvent::TitleChanged);
        true
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        let description = description.into();
        if self.draft.description == description {
            return false;
        }
        self.draft.set_description(description);
        self.emit(EditorEvent::DescriptionChanged);
        true
    }

    pub fn set_access_type(&mut self, access_type: AccessType) -> bool {
        if self.draft.access_type == access_type {
            return false;
        }
        self.draft.set_access_type(access_type);
        self.emit(EditorEvent::AccessTypeChanged(access_type));
        true
    }

    /// Append an empty question; over the per-type limit a warning is raised instead
    pub fn add_question(&mut self, kind: QuestionType) -> Option<RecordId> {
        let id = self.ids.next_id();
        match self.draft.add_question(id.clone(), kind, self.max_questions_per_type) {
            Ok(()) => {
                self.emit(EditorEvent::QuestionAdded(id.clone()));
                Some(id)
            }
            Err(e) => {
                self.notice(NoticeLevel::Warning, MessageKey::MaximumQuestionsReached, Some(e.to_string()));
                None
            }
        }
    }

    fn question_changed(&mut self, id: &RecordId, changed: bool) -> bool {
        if changed {
            self.emit(EditorEvent::QuestionUpdated(id.clone()));
        }
        changed
    }

    pub fn set_question_title(&mut self, id: &RecordId, title: impl Into<String>) -> bool {
        let changed = self.draft.set_question_title(id, title);
        self.question_changed(id, changed)
    }

    pub fn set_question_description(&mut self, id: &RecordId, description: impl Into<String>) -> bool {
        let changed = self.draft.set_question_description(id, description);
        self.question_changed(id, changed)
    }

    pub fn set_question_type(&mut self, id: &RecordId, kind: QuestionType) -> bool {
        let changed = self.draft.set_question_type(id, kind);
        self.question_changed(id, changed)
    }

    /// Replace a question wholesale, keeping its id
    pub fn update_question<F>(&mut self, id: &RecordId, update: F) -> bool
    where
        F: FnOnce(&Question) -> Question,
    {
        let changed = self.draft.update_question(id, |q| Question {
            id: q.id.clone(),
            ..update(q)
        });
        self.question_changed(id, changed)
    }

    pub fn remove_question(&mut self, id: &RecordId) -> bool {
        if !self.draft.remove_question(id) {
            return false;
        }
        self.emit(EditorEvent::QuestionRemoved(id.clone()));
        true
    }

    /// Apply a finished drag over the question list
    pub fn reorder_questions(&mut self, drag: &DragEnd) -> bool {
        if !self.draft.reorder_questions(drag) {
            return false;
        }
        let order = list::keys(&self.draft.questions);
        self.emit(EditorEvent::QuestionsReordered(order));
        true
    }

    pub fn add_option(&mut self, question: &RecordId) -> Option<RecordId> {
        let option = self.ids.next_id();
        if !self.draft.add_option(question, option.clone()) {
            return None;
        }
        self.emit(EditorEvent::OptionAdded {
            question: question.clone(),
            option: option.clone(),
        });
        Some(option)
    }

    fn option_changed(&mut self, question: &RecordId, option: &RecordId, changed: bool) -> bool {
        if changed {
            self.emit(EditorEvent::OptionUpdated {
                question: question.clone(),
                option: option.clone(),
            });
        }
        changed
    }

    pub fn set_option_value(&mut self, question: &RecordId, option: &RecordId, value: impl Into<String>) -> bool {
        let changed = self.draft.set_option_value(question, option, value);
        self.option_changed(question, option, changed)
    }

    pub fn set_option_checked(&mut self, question: &RecordId, option: &RecordId, checked: bool) -> bool {
        let changed = self.draft.set_option_checked(question, option, checked);
        self.option_changed(question, option, changed)
    }

    pub fn remove_option(&mut self, question: &RecordId, option: &RecordId) -> bool {
        if !self.draft.remove_option(question, option) {
            return false;
        }
        self.emit(EditorEvent::OptionRemoved {
            question: question.clone(),
            option: option.clone(),
        });
        true
    }

    pub fn reorder_options(&mut self, question: &RecordId, drag: &DragEnd) -> bool {
        if !self.draft.reorder_options(question, drag) {
            return false;
        }
        let order = self
            .draft
            .question(question)
            .map(|q| list::keys(&q.options))
            .unwrap_or_default();
        self.emit(EditorEvent::OptionsReordered {
            question: question.clone(),
            order,
        });
        true
    }

    /// Replace the draft with a stored template
    ///
    /// On failure the current draft is kept and a notice is raised.
    pub async fn load(&mut self, sync: &Synchronizer, id: &str) -> Result<(), LoadError> {
        match sync.load(id).await {
            Ok(draft) => {
                self.draft = draft;
                self.emit(EditorEvent::Loaded(id.to_string()));
                Ok(())
            }
            Err(e) => {
                let key = match &e {
                    LoadError::NotFound(_) => MessageKey::TemplateNotFound,
                    LoadError::Store(_) => MessageKey::LoadFailed,
                };
                self.notice(NoticeLevel::Error, key, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Persist the draft and adopt the ids assigned by the store
    ///
    /// Failures are reported through the notifier as well as returned. Rows
    /// a failed save already wrote are adopted too, so the next save takes
    /// the update path.
    pub async fn save(&mut self, sync: &Synchronizer, session: Option<&Session>) -> Result<SaveReport, SaveError> {
        match sync.save(&self.draft, session).await {
            Ok(report) => {
                self.draft.adopt_ids(&report.ids);
                self.notice(NoticeLevel::Success, MessageKey::DataSaved, None);
                self.emit(EditorEvent::Saved(report.template_id.clone()));
                Ok(report)
            }
            Err(e) => {
                if let Some(saved) = e.saved_ids() {
                    self.draft.adopt_ids(saved);
                }
                let (level, key) = match &e {
                    SaveError::NotSignedIn => (NoticeLevel::Warning, MessageKey::SignInRequired),
                    SaveError::InFlight => (NoticeLevel::Warning, MessageKey::SaveInProgress),
                    SaveError::Store { .. } => (NoticeLevel::Error, MessageKey::SaveFailed),
                };
                self.notice(level, key, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Freeze the draft for read-only viewing
    pub fn submit(self) -> SubmittedTemplate {
        SubmittedTemplate { draft: self.draft }
    }
}

/// A template that can no longer be edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTemplate {
    draft: TemplateDraft,
}

impl SubmittedTemplate {
    pub fn id(&self) -> Option<&str> {
        self.draft.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }

    pub fn description(&self) -> &str {
        &self.draft.description
    }

    pub fn access_type(&self) -> AccessType {
        self.draft.access_type
    }

    pub fn questions(&self) -> &[Question] {
        &self.draft.questions
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::SequentialIds;
    use crate::notify::MemoryNotifier;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    fn editor() -> (TemplateEditor, Arc<MemoryNotifier>, Arc<Mutex<Vec<EditorEvent>>>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let mut editor = TemplateEditor::new()
            .with_id_generator(Arc::new(SequentialIds::new()))
            .with_notifier(notifier.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        editor.on_change(move |event| sink.lock().unwrap().push(event.clone()));
        (editor, notifier, events)
    }

    #[test]
    fn test_one_event_per_drag_and_none_for_noops() {
        let (mut editor, _, events) = editor();
        let a = editor.add_question(QuestionType::Text).unwrap();
        let b = editor.add_question(QuestionType::Text).unwrap();
        events.lock().unwrap().clear();

        assert!(!editor.reorder_questions(&DragEnd::new(a.clone(), Some(a.clone()))));
        assert!(!editor.reorder_questions(&DragEnd::new(a.clone(), None)));
        assert!(events.lock().unwrap().is_empty());

        assert!(editor.reorder_questions(&DragEnd::new(a.clone(), Some(b.clone()))));
        assert_eq!(
            *events.lock().unwrap(),
            vec![EditorEvent::QuestionsReordered(vec![b, a])]
        );
    }

    #[test]
    fn test_unchanged_title_emits_nothing() {
        let (mut editor, _, events) = editor();
        assert!(editor.set_title("Survey"));
        assert!(!editor.set_title("Survey"));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_capacity_warning() {
        let (mut editor, notifier, events) = editor();
        for _ in 0..4 {
            assert!(editor.add_question(QuestionType::Text).is_some());
        }
        events.lock().unwrap().clear();

        assert!(editor.add_question(QuestionType::Text).is_none());

        assert_eq!(editor.draft().questions.len(), 4);
        assert!(events.lock().unwrap().is_empty());
        let notice = notifier.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.key, MessageKey::MaximumQuestionsReached);
    }

    #[test]
    fn test_update_question_keeps_id() {
        let (mut editor, _, _) = editor();
        let id = editor.add_question(QuestionType::Radio).unwrap();

        assert!(editor.update_question(&id, |q| Question {
            id: RecordId::stored("hijack"),
            title: "Color?".to_string(),
            ..q.clone()
        }));

        let question = editor.draft().question(&id).unwrap();
        assert_eq!(question.title, "Color?");
    }

    #[tokio::test]
    async fn test_save_without_session_warns() {
        let (mut editor, notifier, _) = editor();
        let sync = Synchronizer::new(Arc::new(MemoryStore::new()));
        assert!(editor.save(&sync, None).await.is_err());
        assert_eq!(notifier.last().unwrap().key, MessageKey::SignInRequired);
    }

    #[tokio::test]
    async fn test_load_not_found_keeps_draft() {
        let (mut editor, notifier, _) = editor();
        editor.set_title("Unsaved");

        let sync = Synchronizer::new(Arc::new(MemoryStore::new()));
        assert!(matches!(editor.load(&sync, "missing").await, Err(LoadError::NotFound(_))));
        assert_eq!(editor.draft().title, "Unsaved");
        assert_eq!(notifier.last().unwrap().key, MessageKey::TemplateNotFound);
    }

    #[test]
    fn test_submit_is_read_only_view() {
        let (mut editor, _, _) = editor();
        editor.set_title("Final");
        editor.add_question(QuestionType::Number);

        let submitted = editor.submit();
        assert_eq!(submitted.title(), "Final");
        assert_eq!(submitted.questions().len(), 1);
        assert!(submitted.id().is_none());
    }
}
