// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Error types for tidydrive

use thiserror::Error;

/// Result type alias for tidydrive operations
pub type Result<T> = std::result::Result<T, TidyDriveError>;

/// tidydrive error types
#[derive(Error, Debug)]
pub enum TidyDriveError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Folder listing failed: {0}")]
    Listing(String),

    #[error("Drive write failed: {0}")]
    Write(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),
}
