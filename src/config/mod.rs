// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::imaging::{OutputFormat, DEFAULT_MAX_PIXELS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub overlay_cache: OverlayCacheConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// AWS client settings shared by the overlay fetcher and the face detector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region override (falls back to the SDK's default chain)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint (LocalStack, MinIO)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Use path-style S3 addressing (required by most S3-compatible stores)
    #[serde(default)]
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Quality for lossy encoders (JPEG, AVIF)
    #[serde(default = "default_quality")]
    pub default_quality: u8,

    /// Decoded inputs above this pixel count are rejected (image bomb protection)
    #[serde(default = "default_max_input_pixels")]
    pub max_input_pixels: u64,

    /// Format used when neither the request nor the source determines one
    #[serde(default = "default_fallback_format")]
    pub fallback_format: OutputFormat,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            default_quality: default_quality(),
            max_input_pixels: default_max_input_pixels(),
            fallback_format: default_fallback_format(),
        }
    }
}

fn default_quality() -> u8 {
    80
}

fn default_max_input_pixels() -> u64 {
    DEFAULT_MAX_PIXELS
}

fn default_fallback_format() -> OutputFormat {
    OutputFormat::Jpeg
}

/// In-memory cache for fetched overlay images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayCacheConfig {
    /// Maximum cached overlays; 0 disables the cache
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,

    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for OverlayCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_max_entries() -> u64 {
    100
}

fn default_ttl_seconds() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// When disabled, watermark edits are accepted but never composited
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.processing.default_quality) {
            return Err(format!(
                "processing.default_quality must be between 1 and 100, got {}",
                self.processing.default_quality
            ));
        }

        if self.processing.max_input_pixels == 0 {
            return Err("processing.max_input_pixels must be greater than 0".to_string());
        }

        if self.overlay_cache.max_entries > 0 && self.overlay_cache.ttl_seconds == 0 {
            return Err(
                "overlay_cache.ttl_seconds must be greater than 0 when caching is enabled"
                    .to_string(),
            );
        }

        match (&self.aws.access_key, &self.aws.secret_key) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(
                    "aws.access_key and aws.secret_key must be provided together".to_string(),
                )
            }
            _ => {}
        }

        if let Some(endpoint) = &self.aws.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "aws.endpoint '{}' must start with http:// or https://",
                    endpoint
                ));
            }
        }

        Ok(())
    }
}
