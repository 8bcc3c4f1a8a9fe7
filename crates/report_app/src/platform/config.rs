use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use report_engine::TransportSettings;
use report_logging::{report_info, report_warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "report_app.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub csrf_token: String,
    pub session_id: Option<String>,
    /// Direct printing enabled for this user.
    pub printing_enabled: bool,
    /// Direct printing enabled for the company; gates workstation lookup.
    pub company_enabled: bool,
    pub lang: Option<String>,
    pub tz: Option<String>,
    pub uid: Option<i64>,
    pub preferences_path: PathBuf,
    pub log_destination: LogDestination,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: transport.base_url,
            csrf_token: String::new(),
            session_id: None,
            printing_enabled: true,
            company_enabled: true,
            lang: None,
            tz: None,
            uid: None,
            preferences_path: PathBuf::from(".report_app_preferences.ron"),
            log_destination: LogDestination::Terminal,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: transport.request_timeout.as_secs(),
        }
    }
}

impl AppConfig {
    /// Reads the RON config at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                report_warn!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };

        let config: Self = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        report_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            session_id: self.session_id.clone(),
            ..TransportSettings::default()
        }
    }

    /// Initial user context sent with every request.
    pub fn user_context(&self) -> Map<String, Value> {
        let mut context = Map::new();
        if let Some(lang) = &self.lang {
            context.insert("lang".to_string(), json!(lang));
        }
        if let Some(tz) = &self.tz {
            context.insert("tz".to_string(), json!(tz));
        }
        if let Some(uid) = self.uid {
            context.insert("uid".to_string(), json!(uid));
        }
        context
    }
}
