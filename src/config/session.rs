// src/config/session.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{fs, path::PathBuf};

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("Could not determine the home directory")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file '{}'", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("Config file {:?} does not exist, creating defaults.", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok(config)
    }
}

pub fn save_session(session: &str) -> AppResult<()> {
    if session.is_empty() {
        return Ok(());
    }

    let config_path = get_config_path()?;
    let mut config = load_or_create_external_config()?;

    config.session = Some(session.to_string());

    let json_content = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, json_content).with_context(|| {
        format!("Failed to save the session cookie to '{}'", config_path.display())
    })?;

    info!("Session cookie saved to config file: {}", config_path.display());
    println!(
        "{} Session cookie saved to: {}",
        *crate::symbols::INFO,
        config_path.display()
    );

    Ok(())
}

pub fn load_session_from_config() -> Option<String> {
    load_or_create_external_config()
        .ok()
        .and_then(|config| config.session)
}

pub fn resolve_session(cli_session: Option<&str>) -> (Option<String>, String) {
    if let Some(session) = cli_session
        && !session.is_empty()
    {
        debug!("Using the session cookie from the command line");
        return (Some(session.to_string()), "command line argument".to_string());
    }
    if let Ok(session) = std::env::var(constants::SESSION_ENV_VAR)
        && !session.is_empty()
    {
        debug!("Using the session cookie from the {} environment variable", constants::SESSION_ENV_VAR);
        return (
            Some(session),
            format!("environment variable ({})", constants::SESSION_ENV_VAR),
        );
    }
    if let Some(session) = load_session_from_config()
        && !session.is_empty()
    {
        debug!("Using the session cookie from the local config file");
        return (Some(session), "local config file".to_string());
    }
    debug!("No session cookie found anywhere");
    (None, "not found".to_string())
}
