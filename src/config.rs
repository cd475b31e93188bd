// src/config.rs

pub mod session;

use self::session::load_or_create_external_config;
use crate::{constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_fetch_mb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        // Conservative defaults for the network section
        let network_config = NetworkConfig {
            connect_timeout_secs: Some(10),
            timeout_secs: Some(60),
            max_retries: Some(3),
            max_fetch_mb: Some(256),
        };
        Self { session: None, network: network_config }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_fetch_bytes: u64,
    pub session: Option<String>,
}

impl AppConfig {
    /// Network knobs come from the external config file; the session cookie
    /// is resolved separately (CLI → environment → config file) and passed in.
    pub fn new(session: Option<String>) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;

        Ok(Self {
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(60)),
            max_retries: external_config.network.max_retries.unwrap_or(3),
            max_fetch_bytes: external_config
                .network
                .max_fetch_mb
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(constants::DEFAULT_MAX_FETCH_BYTES),
            session,
        })
    }

    pub fn with_session(&self, session: Option<String>) -> Self {
        Self { session, ..self.clone() }
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            max_fetch_bytes: constants::DEFAULT_MAX_FETCH_BYTES,
            session: None,
        }
    }
}
