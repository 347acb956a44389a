use crate::editor::IdMapping;
use std::fmt;

/// Step of a save at which the store failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStage {
    CreateTemplate,
    /// Zero-based index of the question in the draft
    CreateQuestion(usize),
    CreateOptions(usize),
    UpdateTemplate,
    ListQuestions,
    DeleteQuestions,
    UpsertQuestion(usize),
    ListOptions(usize),
    DeleteOptions(usize),
    UpsertOption(usize),
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStage::CreateTemplate => write!(f, "creating template"),
            SaveStage::CreateQuestion(n) => write!(f, "creating question {}", n + 1),
            SaveStage::CreateOptions(n) => write!(f, "creating options of question {}", n + 1),
            SaveStage::UpdateTemplate => write!(f, "updating template"),
            SaveStage::ListQuestions => write!(f, "listing stored questions"),
            SaveStage::DeleteQuestions => write!(f, "deleting removed questions"),
            SaveStage::UpsertQuestion(n) => write!(f, "saving question {}", n + 1),
            SaveStage::ListOptions(n) => write!(f, "listing stored options of question {}", n + 1),
            SaveStage::DeleteOptions(n) => write!(f, "deleting removed options of question {}", n + 1),
            SaveStage::UpsertOption(n) => write!(f, "saving options of question {}", n + 1),
        }
    }
}

#[derive(Debug)]
pub enum SaveError {
    /// A store call failed; later steps were not attempted
    Store {
        stage: SaveStage,
        source: anyhow::Error,
        /// Rows written before the failure
        saved: IdMapping,
    },
    /// Another save through the same synchronizer is still running
    InFlight,
    /// New templates need an owner
    NotSignedIn,
}

impl SaveError {
    pub fn stage(&self) -> Option<SaveStage> {
        match self {
            SaveError::Store { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Ids the failed save had already written, if it got that far
    pub fn saved_ids(&self) -> Option<&IdMapping> {
        match self {
            SaveError::Store { saved, .. } if saved.template.is_some() || !saved.records.is_empty() => Some(saved),
            _ => None,
        }
    }

    pub(crate) fn with_saved(self, ids: IdMapping) -> Self {
        match self {
            SaveError::Store { stage, source, .. } => SaveError::Store { stage, source, saved: ids },
            other => other,
        }
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Store { stage, source, .. } => write!(f, "Save failed while {}: {:#}", stage, source),
            SaveError::InFlight => write!(f, "A save is already in progress"),
            SaveError::NotSignedIn => write!(f, "Sign in to save templates"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Store { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    NotFound(String),
    Store(anyhow::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(id) => write!(f, "Template {} not found", id),
            LoadError::Store(source) => write!(f, "Failed to load template: {:#}", source),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Store(source) => Some(&**source),
            LoadError::NotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_one_based_for_humans() {
        let err = SaveError::Store {
            stage: SaveStage::CreateQuestion(1),
            source: anyhow::anyhow!("constraint violation"),
            saved: IdMapping::default(),
        };
        assert_eq!(err.to_string(), "Save failed while creating question 2: constraint violation");
        assert_eq!(err.stage(), Some(SaveStage::CreateQuestion(1)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.saved_ids().is_none());

        let partial = IdMapping {
            template: Some("t1".to_string()),
            ..IdMapping::default()
        };
        let err = err.with_saved(partial.clone());
        assert_eq!(err.saved_ids(), Some(&partial));
        assert!(SaveError::InFlight.with_saved(partial).saved_ids().is_none());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(LoadError::NotFound("42".to_string()).to_string(), "Template 42 not found");
    }
}
