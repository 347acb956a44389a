use anyhow::Result;
use log::{info, warn};

use crate::auth::StoreCredentials;
use crate::config::{Config, Profile};
use crate::ui::{prompt_credentials, prompt_overwrite_confirmation, prompt_profile_name};

pub struct AddOptions {
    pub name: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub from_env: bool,
    pub from_env_file: Option<String>,
}

pub async fn add_command(options: AddOptions) -> Result<()> {
    info!("Adding profile");

    let mut config = Config::load()?;

    let (name, credentials) = if options.from_env {
        let name = options.name.unwrap_or_else(|| "from-env".to_string());
        (name, StoreCredentials::from_env()?)
    } else if let Some(path) = &options.from_env_file {
        let name = options.name.unwrap_or_else(|| "from-env-file".to_string());
        (name, StoreCredentials::from_env_file(path)?)
    } else if let (Some(url), Some(api_key)) = (&options.url, &options.api_key) {
        let name = options.name.unwrap_or_else(|| "default".to_string());
        (name, StoreCredentials::new(url.clone(), api_key.clone()))
    } else {
        info!("Starting interactive profile setup");
        let name = prompt_profile_name(options.name)?;

        if config.profiles.contains_key(&name) && !prompt_overwrite_confirmation(&format!("Profile '{}'", name))? {
            println!("Cancelled.");
            return Ok(());
        }

        (name, prompt_credentials(options.url, options.api_key)?)
    };

    if !credentials.url.starts_with("http://") && !credentials.url.starts_with("https://") {
        anyhow::bail!("Project URL must start with http:// or https://, got '{}'", credentials.url);
    }
    if config.profiles.contains_key(&name) {
        warn!("Profile '{}' already exists, overwriting", name);
    }

    config.add_profile(name.clone(), Profile::from(credentials))?;

    println!("✓ Added profile '{}'", name);
    if config.current_profile.as_deref() == Some(name.as_str()) {
        println!("  '{}' is now the current profile", name);
    }
    Ok(())
}
