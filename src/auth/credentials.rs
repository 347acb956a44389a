use anyhow::{Context, Result};
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub const URL_VAR: &str = "FORMSMITH_URL";
pub const API_KEY_VAR: &str = "FORMSMITH_API_KEY";

/// Project URL and public API key of a hosted backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub url: String,
    pub api_key: String,
}

impl StoreCredentials {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<StoreCredentials> {
        info!("Importing store credentials from environment variables");

        let url = std::env::var(URL_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", URL_VAR))?;
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", API_KEY_VAR))?;

        Ok(StoreCredentials { url, api_key })
    }

    /// Read credentials from a `.env` file without touching the process environment
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<StoreCredentials> {
        let path = path.as_ref();
        info!("Importing store credentials from .env file: {}", path.display());

        if !path.exists() {
            anyhow::bail!("Environment file not found: {}", path.display());
        }

        let vars: HashMap<String, String> = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to load .env file '{}'", path.display()))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to parse .env file '{}'", path.display()))?;

        let url = vars
            .get(URL_VAR)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} not found in .env file: {}", URL_VAR, path.display()))?;
        let api_key = vars
            .get(API_KEY_VAR)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} not found in .env file: {}", API_KEY_VAR, path.display()))?;

        Ok(StoreCredentials { url, api_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "FORMSMITH_URL=https://abc.supabase.co").unwrap();
        writeln!(file, "FORMSMITH_API_KEY=anon-key").unwrap();

        let credentials = StoreCredentials::from_env_file(file.path()).unwrap();
        assert_eq!(credentials, StoreCredentials::new("https://abc.supabase.co", "anon-key"));
    }

    #[test]
    fn test_from_env_file_missing_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "FORMSMITH_URL=https://abc.supabase.co").unwrap();

        let err = StoreCredentials::from_env_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("FORMSMITH_API_KEY"));
    }

    #[test]
    fn test_from_env_file_not_found() {
        assert!(StoreCredentials::from_env_file("/nonexistent/.env").is_err());
    }
}
