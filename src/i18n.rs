//! Typed message keys and their translations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => anyhow::bail!("Unsupported locale '{}'. Use en or ru", other),
        }
    }
}

/// Every user-facing message the library can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    DataSaved,
    SaveFailed,
    SaveInProgress,
    SignInRequired,
    MaximumQuestionsReached,
    TemplateNotFound,
    LoadFailed,
    TemplateDeleted,
}

pub trait Localizer: Send + Sync {
    fn message(&self, key: MessageKey) -> String;
}

/// Built-in catalog for the supported locales
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    locale: Locale,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn english(key: MessageKey) -> &'static str {
        match key {
            MessageKey::DataSaved => "Data saved successfully",
            MessageKey::SaveFailed => "Failed to save data",
            MessageKey::SaveInProgress => "Saving is already in progress",
            MessageKey::SignInRequired => "You must be logged in to save templates",
            MessageKey::MaximumQuestionsReached => "Maximum number of questions of this type reached",
            MessageKey::TemplateNotFound => "Template not found",
            MessageKey::LoadFailed => "Error finding template",
            MessageKey::TemplateDeleted => "Template deleted",
        }
    }

    fn russian(key: MessageKey) -> &'static str {
        match key {
            MessageKey::DataSaved => "Данные успешно сохранены",
            MessageKey::SaveFailed => "Не удалось сохранить данные",
            MessageKey::SaveInProgress => "Сохранение уже выполняется",
            MessageKey::SignInRequired => "Войдите, чтобы сохранять шаблоны",
            MessageKey::MaximumQuestionsReached => "Достигнуто максимальное количество вопросов этого типа",
            MessageKey::TemplateNotFound => "Шаблон не найден",
            MessageKey::LoadFailed => "Ошибка при поиске шаблона",
            MessageKey::TemplateDeleted => "Шаблон удалён",
        }
    }
}

impl Localizer for Catalog {
    fn message(&self, key: MessageKey) -> String {
        match self.locale {
            Locale::En => Self::english(key),
            Locale::Ru => Self::russian(key),
        }
        .to_string()
    }
}
