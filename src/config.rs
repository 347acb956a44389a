use crate::auth::{Session, StoreCredentials};
use crate::editor::MAX_QUESTIONS_PER_TYPE;
use crate::i18n::Locale;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the config file location
pub const CONFIG_PATH_VAR: &str = "FORMSMITH_CONFIG";

/// A named backend to push templates to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub url: String,
    pub api_key: String,
}

impl From<StoreCredentials> for Profile {
    fn from(credentials: StoreCredentials) -> Self {
        Self {
            url: credentials.url,
            api_key: credentials.api_key,
        }
    }
}

impl From<&Profile> for StoreCredentials {
    fn from(profile: &Profile) -> Self {
        StoreCredentials::new(profile.url.clone(), profile.api_key.clone())
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
    /// Session of the last `auth login`, cleared on logout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(skip)]
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_max_questions_per_type")]
    pub max_questions_per_type: usize,
    #[serde(default)]
    pub request_logging: bool,
    /// Backend tables have a `position` column for question and option order
    #[serde(default)]
    pub position_column: bool,
}

fn default_max_questions_per_type() -> usize {
    MAX_QUESTIONS_PER_TYPE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            max_questions_per_type: default_max_questions_per_type(),
            request_logging: false,
            position_column: false,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("formsmith")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".formsmith")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(Self::get_config_path()?)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self {
                path,
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.path = path;

        debug!("Loaded config with {} profiles", config.profiles.len());
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        debug!("Saving config to: {:?}", self.path);

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
                info!("Created config directory: {:?}", dir);
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn add_profile(&mut self, name: String, profile: Profile) -> Result<()> {
        info!("Adding profile: {}", name);
        self.profiles.insert(name.clone(), profile);

        if self.current_profile.is_none() {
            info!("Set {} as current profile", name);
            self.current_profile = Some(name);
        }

        self.save()
    }

    pub fn get_current_profile(&self) -> Option<(&str, &Profile)> {
        let name = self.current_profile.as_deref()?;
        self.profiles.get(name).map(|profile| (name, profile))
    }

    /// The current profile, or an error telling the user how to add one
    pub fn require_current_profile(&self) -> Result<(&str, &Profile)> {
        self.get_current_profile()
            .context("No profile selected. Run 'formsmith profile add' first")
    }

    pub fn set_current_profile(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            anyhow::bail!("Profile '{}' not found", name);
        }

        info!("Setting current profile to: {}", name);
        if self.current_profile.as_deref() != Some(name) && self.session.take().is_some() {
            warn!("Switched profile, clearing session");
        }
        self.current_profile = Some(name.to_string());
        self.save()
    }

    /// Profile names in alphabetical order
    pub fn list_profiles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn remove_profile(&mut self, name: &str) -> Result<()> {
        if self.profiles.remove(name).is_none() {
            anyhow::bail!("Profile '{}' not found", name);
        }
        info!("Removing profile: {}", name);

        if self.current_profile.as_deref() == Some(name) {
            warn!("Removed current profile, clearing current selection and session");
            self.current_profile = None;
            self.session = None;
        }

        self.save()
    }

    pub fn set_session(&mut self, session: Session) -> Result<()> {
        info!("Storing session for {}", session.email);
        self.session = Some(session);
        self.save()
    }

    pub fn clear_session(&mut self) -> Result<Option<Session>> {
        let previous = self.session.take();
        self.save()?;
        Ok(previous)
    }

    /// The stored session unless it has expired
    pub fn active_session(&self) -> Option<&Session> {
        self.session.as_ref().filter(|session| !session.is_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("nested").join("config.toml")).unwrap();
        (dir, config)
    }

    fn profile(url: &str) -> Profile {
        Profile {
            url: url.to_string(),
            api_key: "anon".to_string(),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (_dir, config) = temp_config();
        assert!(config.profiles.is_empty());
        assert_eq!(config.settings.max_questions_per_type, 4);
        assert_eq!(config.settings.locale, Locale::En);
    }

    #[test]
    fn test_first_profile_becomes_current_and_persists() {
        let (_dir, mut config) = temp_config();
        config.add_profile("prod".to_string(), profile("https://a.supabase.co")).unwrap();
        config.add_profile("dev".to_string(), profile("https://b.supabase.co")).unwrap();

        let reloaded = Config::load_from(config.path()).unwrap();
        assert_eq!(reloaded.current_profile.as_deref(), Some("prod"));
        assert_eq!(reloaded.list_profiles(), vec!["dev", "prod"]);
    }

    #[test]
    fn test_removing_current_profile_clears_session() {
        let (_dir, mut config) = temp_config();
        config.add_profile("prod".to_string(), profile("https://a.supabase.co")).unwrap();
        config.set_session(Session::new("ann@example.com", None, "jwt")).unwrap();

        config.remove_profile("prod").unwrap();

        assert!(config.current_profile.is_none());
        assert!(config.session.is_none());
        assert!(config.remove_profile("prod").is_err());
    }

    #[test]
    fn test_settings_parse_with_partial_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[settings]\nlocale = \"ru\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.locale, Locale::Ru);
        assert_eq!(config.settings.max_questions_per_type, 4);
        assert!(!config.settings.request_logging);
        assert!(!config.settings.position_column);
    }

    #[test]
    fn test_position_column_setting_round_trips() {
        let (_dir, mut config) = temp_config();
        config.settings.position_column = true;
        config.save().unwrap();

        let reloaded = Config::load_from(config.path()).unwrap();
        assert!(reloaded.settings.position_column);
    }
}
