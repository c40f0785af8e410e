#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::http::RequestPolicy;
use crate::domain::model::{LatLng, TileLayer, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::utils::error::{PageError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Page configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub notifications: NotificationConfig,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub messages_path: String,
    pub availability_path: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8501".to_string(),
            messages_path: "/api/messages".to_string(),
            availability_path: "/api/availability".to_string(),
            timeout_seconds: None,
            retry_attempts: 0,
            retry_delay_ms: 500,
        }
    }
}

impl ApiConfig {
    pub fn messages_url(&self) -> String {
        join_url(&self.base_url, &self.messages_path)
    }

    pub fn availability_url(&self) -> String {
        join_url(&self.base_url, &self.availability_path)
    }

    pub fn request_policy(&self) -> RequestPolicy {
        RequestPolicy {
            timeout: self.timeout_seconds.map(Duration::from_secs),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        let tiles = TileLayer::default();
        Self {
            center_lat: DEFAULT_CENTER.lat,
            center_lng: DEFAULT_CENTER.lng,
            zoom: DEFAULT_ZOOM,
            tile_url: tiles.url_template,
            attribution: tiles.attribution,
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_lat, self.center_lng)
    }

    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self.tile_url.clone(),
            attribution: self.attribution.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub categories: Vec<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        let categories = [
            "Plumbing",
            "Electrical",
            "Carpentry",
            "Painting",
            "HVAC",
            "Landscaping",
            "General Maintenance",
            "Cleaning",
            "Moving",
            "Other",
        ];
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl PageConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PageError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_endpoint_path("api.messages_path", &self.api.messages_path)?;
        validation::validate_endpoint_path("api.availability_path", &self.api.availability_path)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        validation::validate_range("map.center_lat", self.map.center_lat, -90.0, 90.0)?;
        validation::validate_range("map.center_lng", self.map.center_lng, -180.0, 180.0)?;
        validation::validate_range("map.zoom", self.map.zoom, 0, 22)?;
        validation::validate_non_empty_string("map.tile_url", &self.map.tile_url)?;

        validation::validate_positive_number(
            "notifications.duration_ms",
            self.notifications.duration_ms,
            1,
        )?;

        if self.services.categories.is_empty() {
            return Err(PageError::MissingConfigError {
                field: "services.categories".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for PageConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
