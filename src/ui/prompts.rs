use anyhow::Result;
use dialoguer::{Input, Password, Select};
use crate::auth::StoreCredentials;

pub fn prompt_profile_name(default_name: Option<String>) -> Result<String> {
    if let Some(name) = default_name {
        Ok(name)
    } else {
        let name = Input::<String>::new()
            .with_prompt("Profile name (e.g., 'production', 'staging')")
            .interact()?;
        Ok(name)
    }
}

/// Arrow-key Yes/No selection
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

pub fn prompt_overwrite_confirmation(what: &str) -> Result<bool> {
    prompt_confirmation(&format!("{} already exists. Overwrite?", what), false)
}

pub fn prompt_remove_confirmation(what: &str) -> Result<bool> {
    prompt_confirmation(&format!("Remove {}?", what), false)
}

pub fn prompt_credentials(url: Option<String>, api_key: Option<String>) -> Result<StoreCredentials> {
    let url = match url {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("Project URL (e.g., https://yourproject.supabase.co)")
            .interact()?,
    };

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new().with_prompt("Public API key").interact()?,
    };

    Ok(StoreCredentials::new(url, api_key))
}

pub fn prompt_login(email: Option<String>, password: Option<String>) -> Result<(String, String)> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    Ok((email, password))
}

pub fn select_profile(names: &[&str], current: Option<&str>) -> Result<String> {
    if names.is_empty() {
        anyhow::bail!("No profiles configured. Run 'formsmith profile add' first");
    }

    let default_index = current
        .and_then(|current| names.iter().position(|name| *name == current))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Select profile")
        .items(names)
        .default(default_index)
        .interact()?;

    Ok(names[selection].to_string())
}
