use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix prepended to every `/api/...` path. Empty means same origin.
    #[serde(default)]
    pub api_base: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_unit")]
    pub pitch: f32,
    #[serde(default = "default_unit")]
    pub volume: f32,
    #[serde(default = "default_backup_timeout_ms")]
    pub backup_timeout_ms: u64,
    #[serde(default = "default_cancel_delay_ms")]
    pub cancel_delay_ms: u64,
}

fn default_page_size() -> u32 {
    24
}
fn default_page_size_options() -> Vec<u32> {
    vec![12, 24, 48, 96]
}
fn default_max_page_size() -> u32 {
    100
}
fn default_search_debounce_ms() -> u64 {
    300
}
fn default_min_query_len() -> usize {
    2
}
fn default_toast_ms() -> u64 {
    3000
}
fn default_rate() -> f32 {
    0.9
}
fn default_unit() -> f32 {
    1.0
}
fn default_backup_timeout_ms() -> u64 {
    5000
}
fn default_cancel_delay_ms() -> u64 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            max_page_size: default_max_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            min_query_len: default_min_query_len(),
            toast_ms: default_toast_ms(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            pitch: default_unit(),
            volume: default_unit(),
            backup_timeout_ms: default_backup_timeout_ms(),
            cancel_delay_ms: default_cancel_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// Builds the config from an optional JSON document and an optional API
    /// base override. A document that fails to parse falls back to defaults.
    pub fn load(json: Option<&str>, api_base: Option<&str>) -> Self {
        let mut config = match json.map(serde_json::from_str::<ClientConfig>) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring malformed client config");
                Self::default()
            }
            None => Self::default(),
        };
        if let Some(base) = api_base {
            config.api_base = base.to_owned();
        }
        config.api_base = config.api_base.trim_end_matches('/').to_owned();
        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            config.default_page_size = default_page_size().min(config.max_page_size.max(1));
        }
        config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}
