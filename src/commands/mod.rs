pub mod auth;
pub mod profile;
pub mod template;

use crate::config::Config;
use crate::store::{CallLogConfig, CallLogger, RestStore};
use anyhow::Result;
use log::debug;

/// REST store for the current profile, acting as the stored session when there is one
pub fn rest_store(config: &Config) -> Result<RestStore> {
    let (name, profile) = config.require_current_profile()?;
    debug!("Using profile '{}' ({})", name, profile.url);

    let logger = CallLogger::new(CallLogConfig {
        request_logging: config.settings.request_logging,
        ..CallLogConfig::default()
    });
    let store = RestStore::new(profile.url.clone(), profile.api_key.clone())?
        .with_logger(logger)
        .with_position_column(config.settings.position_column);

    Ok(match config.active_session() {
        Some(session) => store.with_access_token(session.access_token.clone()),
        None => store,
    })
}
