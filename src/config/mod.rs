// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Configuration management for tidydrive

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Drive provider settings
    #[serde(default)]
    pub drive: DriveConfig,

    /// Completion service settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Web server settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriveConfig {
    /// Base URL of the drive REST API
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,

    /// Base URL for multipart uploads
    #[serde(default = "default_drive_upload_base")]
    pub upload_base: String,

    /// OAuth access token; falls back to DRIVE_ACCESS_TOKEN
    #[serde(default)]
    pub access_token: Option<String>,

    /// Folder records requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard cap on listing pages, in case the provider keeps
    /// returning a continuation token
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_url")]
    pub api_url: String,

    /// API key; falls back to OPENAI_API_KEY. Placement is disabled
    /// entirely when neither is set.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Low randomness for categorical folder selection
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Directory of static UI assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

// Default value functions
fn default_drive_api_base() -> String { "https://www.googleapis.com/drive/v3".to_string() }
fn default_drive_upload_base() -> String { "https://www.googleapis.com/upload/drive/v3".to_string() }
fn default_page_size() -> u32 { 1000 }
fn default_max_pages() -> u32 { 5000 }
fn default_timeout() -> u64 { 30 }
fn default_completion_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f32 { 0.3 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_static_dir() -> String { "static".to_string() }

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_drive_api_base(),
            upload_base: default_drive_upload_base(),
            access_token: None,
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: default_completion_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            drive: DriveConfig::default(),
            completion: CompletionConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, then apply environment
    /// fallbacks for credentials the file omits
    pub fn load(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| crate::TidyDriveError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        if config.drive.access_token.is_none() {
            config.drive.access_token = std::env::var("DRIVE_ACCESS_TOKEN").ok();
        }
        if config.completion.api_key.is_none() {
            config.completion.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
