//! Persistence synchronizer
//!
//! Turns a [`TemplateDraft`] into store calls. New drafts go through the
//! create path (template, then each question, then its options, strictly
//! in that order). Drafts with an id go through the update path: the
//! template row is updated, questions removed from the draft are deleted,
//! then every question is upserted concurrently and each one diffs and
//! upserts its own options once its upsert has succeeded.

use super::error::{LoadError, SaveError, SaveStage};
use super::plan;
use crate::auth::Session;
use crate::editor::{IdMapping, Question, TemplateDraft};
use crate::store::{TemplateStore, TemplateSummary};
use futures::future::try_join_all;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a successful save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub template_id: String,
    /// Whether the save inserted a new template
    pub created: bool,
    /// Store ids assigned to draft records
    pub ids: IdMapping,
    pub deleted_questions: usize,
    pub deleted_options: usize,
}

#[derive(Debug, Default)]
struct QuestionSync {
    ids: IdMapping,
    deleted_options: usize,
}

/// Clears the in-flight flag when the save finishes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn store_error(stage: SaveStage) -> impl FnOnce(anyhow::Error) -> SaveError {
    move |source| {
        error!("Store call failed while {}: {:#}", stage, source);
        SaveError::Store {
            stage,
            source,
            saved: IdMapping::default(),
        }
    }
}

pub struct Synchronizer {
    store: Arc<dyn TemplateStore>,
    in_flight: AtomicBool,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self {
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SaveError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SaveError::InFlight)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    /// Persist `draft`, inserting it when it has no id yet
    pub async fn save(&self, draft: &TemplateDraft, session: Option<&Session>) -> Result<SaveReport, SaveError> {
        let session = session.ok_or(SaveError::NotSignedIn)?;
        let _guard = self.begin()?;

        match &draft.id {
            None => self.create(draft, session).await,
            Some(id) => self.update(id, draft).await,
        }
    }

    async fn create(&self, draft: &TemplateDraft, owner: &Session) -> Result<SaveReport, SaveError> {
        info!("Creating template '{}' with {} questions", draft.title, draft.questions.len());

        let mut ids = IdMapping::default();
        match self.insert_rows(draft, owner, &mut ids).await {
            Ok(template_id) => {
                info!("Template {} created", template_id);
                Ok(SaveReport {
                    template_id,
                    created: true,
                    ids,
                    ..SaveReport::default()
                })
            }
            // rows already written travel with the error
            Err(e) => Err(e.with_saved(ids)),
        }
    }

    /// Insert template, questions and options in dependency order, recording ids as they arrive
    async fn insert_rows(&self, draft: &TemplateDraft, owner: &Session, ids: &mut IdMapping) -> Result<String, SaveError> {
        let template_id = self
            .store
            .create_template(&plan::template_fields(draft, Some(owner)))
            .await
            .map_err(store_error(SaveStage::CreateTemplate))?;
        debug!("Template created with id {}", template_id);
        ids.template = Some(template_id.clone());

        for (index, question) in draft.questions.iter().enumerate() {
            let question_id = self
                .store
                .create_question(&template_id, &plan::question_fields(question, index))
                .await
                .map_err(store_error(SaveStage::CreateQuestion(index)))?;
            ids.record(&question.id, question_id.clone());

            if question.options.is_empty() {
                continue;
            }

            let fields: Vec<_> = question
                .options
                .iter()
                .enumerate()
                .map(|(position, option)| plan::option_fields(option, position))
                .collect();
            let option_ids = self
                .store
                .create_options(&question_id, &fields)
                .await
                .map_err(store_error(SaveStage::CreateOptions(index)))?;
            for (option, option_id) in question.options.iter().zip(option_ids) {
                ids.record(&option.id, option_id);
            }
        }

        Ok(template_id)
    }

    async fn update(&self, template_id: &str, draft: &TemplateDraft) -> Result<SaveReport, SaveError> {
        info!("Updating template {} with {} questions", template_id, draft.questions.len());

        // ownership columns are left as they were on insert
        self.store
            .update_template(template_id, &plan::template_fields(draft, None))
            .await
            .map_err(store_error(SaveStage::UpdateTemplate))?;

        let persisted = self
            .store
            .list_question_ids(template_id)
            .await
            .map_err(store_error(SaveStage::ListQuestions))?;
        let removed = plan::stale_ids(&persisted, draft.questions.iter().map(|q| &q.id));
        if !removed.is_empty() {
            debug!("Deleting {} removed questions: {:?}", removed.len(), removed);
            self.store
                .delete_questions(&removed)
                .await
                .map_err(store_error(SaveStage::DeleteQuestions))?;
        }

        let synced = try_join_all(
            draft
                .questions
                .iter()
                .enumerate()
                .map(|(index, question)| self.sync_question(template_id, index, question)),
        )
        .await?;

        let mut report = SaveReport {
            template_id: template_id.to_string(),
            created: false,
            deleted_questions: removed.len(),
            ..SaveReport::default()
        };
        for question in synced {
            report.ids.extend(question.ids);
            report.deleted_options += question.deleted_options;
        }

        info!(
            "Template {} updated ({} questions removed, {} options removed)",
            template_id, report.deleted_questions, report.deleted_options
        );
        Ok(report)
    }

    /// Upsert one question, then bring its stored options in line with the draft
    async fn sync_question(&self, template_id: &str, index: usize, question: &Question) -> Result<QuestionSync, SaveError> {
        let mut sync = QuestionSync::default();

        let question_id = self
            .store
            .upsert_question(question.id.as_stored(), template_id, &plan::question_fields(question, index))
            .await
            .map_err(store_error(SaveStage::UpsertQuestion(index)))?;
        if question.id.as_stored() != Some(question_id.as_str()) {
            sync.ids.record(&question.id, question_id.clone());
        }

        let persisted = self
            .store
            .list_option_ids(&question_id)
            .await
            .map_err(store_error(SaveStage::ListOptions(index)))?;
        let to_delete = plan::stale_ids(&persisted, question.options.iter().map(|o| &o.id));
        if !to_delete.is_empty() {
            debug!("Question {}: deleting options {:?}", question_id, to_delete);
            self.store
                .delete_options(&to_delete)
                .await
                .map_err(store_error(SaveStage::DeleteOptions(index)))?;
            sync.deleted_options = to_delete.len();
        }

        for (position, option) in question.options.iter().enumerate() {
            let option_id = self
                .store
                .upsert_option(option.id.as_stored(), &question_id, &plan::option_fields(option, position))
                .await
                .map_err(store_error(SaveStage::UpsertOption(index)))?;
            if option.id.as_stored() != Some(option_id.as_str()) {
                sync.ids.record(&option.id, option_id);
            }
        }

        Ok(sync)
    }

    /// Fetch a stored template as an editable draft
    pub async fn load(&self, id: &str) -> Result<TemplateDraft, LoadError> {
        debug!("Loading template {}", id);
        match self.store.fetch_template(id).await {
            Ok(Some(record)) => Ok(TemplateDraft::from(record)),
            Ok(None) => Err(LoadError::NotFound(id.to_string())),
            Err(e) => {
                error!("Failed to load template {}: {:#}", id, e);
                Err(LoadError::Store(e))
            }
        }
    }

    pub async fn list_templates(&self, session: &Session) -> anyhow::Result<Vec<TemplateSummary>> {
        self.store.list_templates_by_owner(&session.email).await
    }

    pub async fn delete_template(&self, id: &str) -> anyhow::Result<()> {
        info!("Deleting template {}", id);
        self.store.delete_template(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{QuestionType, RecordId, SequentialIds, IdGenerator, MAX_QUESTIONS_PER_TYPE};
    use crate::store::{CallKind, MemoryStore};

    fn session() -> Session {
        Session::new("ann@example.com", Some("Ann".to_string()), "token")
    }

    fn setup() -> (Arc<MemoryStore>, Synchronizer) {
        let store = Arc::new(MemoryStore::new());
        let sync = Synchronizer::new(store.clone());
        (store, sync)
    }

    #[tokio::test]
    async fn test_save_without_session_touches_nothing() {
        let (store, sync) = setup();
        let err = sync.save(&TemplateDraft::new(), None).await.unwrap_err();

        assert!(matches!(err, SaveError::NotSignedIn));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_save_while_in_flight_is_rejected() {
        let (store, sync) = setup();
        let guard = sync.begin().unwrap();

        let err = sync.save(&TemplateDraft::new(), Some(&session())).await.unwrap_err();
        assert!(matches!(err, SaveError::InFlight));
        assert!(store.calls().is_empty());

        drop(guard);
        assert!(!sync.is_saving());
        assert!(sync.save(&TemplateDraft::new(), Some(&session())).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_stamps_owner() {
        let (store, sync) = setup();
        let report = sync.save(&TemplateDraft::new(), Some(&session())).await.unwrap();

        assert!(report.created);
        let template = &store.templates()[0];
        assert_eq!(template.id, report.template_id);
        assert_eq!(template.fields.author.as_deref(), Some("Ann"));
        assert_eq!(template.fields.gmail.as_deref(), Some("ann@example.com"));
    }

    #[tokio::test]
    async fn test_create_failure_names_question() {
        let (store, sync) = setup();
        let ids = SequentialIds::new();
        let mut draft = TemplateDraft::new();
        for _ in 0..3 {
            draft.add_question(ids.next_id(), QuestionType::Text, MAX_QUESTIONS_PER_TYPE).unwrap();
        }
        store.fail_on_nth(CallKind::CreateQuestion, 2);

        let err = sync.save(&draft, Some(&session())).await.unwrap_err();

        assert_eq!(err.stage(), Some(SaveStage::CreateQuestion(1)));
        // aborted: the third question was never attempted
        assert_eq!(store.calls_of(CallKind::CreateQuestion).len(), 1);
        assert!(!sync.is_saving());

        let saved = err.saved_ids().unwrap();
        assert_eq!(saved.template.as_deref(), Some(store.templates()[0].id.as_str()));
        assert_eq!(saved.records.len(), 1);
    }

    #[tokio::test]
    async fn test_create_failure_before_any_insert_saves_nothing() {
        let (store, sync) = setup();
        store.fail_on(CallKind::CreateTemplate);

        let err = sync.save(&TemplateDraft::new(), Some(&session())).await.unwrap_err();
        assert_eq!(err.stage(), Some(SaveStage::CreateTemplate));
        assert!(err.saved_ids().is_none());
    }

    #[tokio::test]
    async fn test_update_deletes_removed_questions() {
        let (store, sync) = setup();
        let ids = SequentialIds::new();
        let mut draft = TemplateDraft::new();
        let first = ids.next_id();
        draft.add_question(first.clone(), QuestionType::Text, MAX_QUESTIONS_PER_TYPE).unwrap();
        draft.add_question(ids.next_id(), QuestionType::Number, MAX_QUESTIONS_PER_TYPE).unwrap();

        let report = sync.save(&draft, Some(&session())).await.unwrap();
        draft.adopt_ids(&report.ids);
        let first = report.ids.resolve(&first);
        assert!(draft.remove_question(&first));

        let report = sync.save(&draft, Some(&session())).await.unwrap();

        assert!(!report.created);
        assert_eq!(report.deleted_questions, 1);
        assert_eq!(store.questions().len(), 1);
        assert_ne!(RecordId::stored(store.questions()[0].id.clone()), first);
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let (_, sync) = setup();
        assert!(matches!(sync.load("404").await, Err(LoadError::NotFound(id)) if id == "404"));
    }

    #[tokio::test]
    async fn test_load_store_failure() {
        let (store, sync) = setup();
        store.fail_on(CallKind::FetchTemplate);
        assert!(matches!(sync.load("1").await, Err(LoadError::Store(_))));
    }
}
