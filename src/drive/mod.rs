// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Drive provider data model and service seam

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A folder as reported by the provider's listing call.
///
/// Only the first declared parent is meaningful for hierarchy; the
/// provider may report zero or more.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl FolderRecord {
    /// First declared parent id, if any
    pub fn parent_id(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// A file (or folder) record returned by create/move/get calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

/// One page of a folder listing
#[derive(Debug, Clone, Default)]
pub struct FolderPage {
    pub records: Vec<FolderRecord>,
    pub next_page_token: Option<String>,
}

/// Operations the core needs from the storage provider.
///
/// Implementations are expected to restrict folder listings to
/// non-trashed, owned, folder-type entries.
#[async_trait]
pub trait DriveService: Send + Sync {
    /// Fetch one page of the full folder listing
    async fn list_folders(&self, page_token: Option<&str>) -> Result<FolderPage>;

    /// Store a file at the provider's default (root) location
    async fn create_file(&self, name: &str, mime_type: &str, content: Vec<u8>) -> Result<DriveFile>;

    /// Create a folder, optionally under a parent
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<DriveFile>;

    /// Re-parent a file: add one parent, remove the given ones
    async fn move_file(
        &self,
        file_id: &str,
        add_parent_id: &str,
        remove_parent_ids: &[String],
    ) -> Result<DriveFile>;

    /// Fetch a single record (used to read current parents before a move)
    async fn get_file(&self, file_id: &str) -> Result<DriveFile>;

    /// Full-text name search over non-trashed files
    async fn search_files(&self, query: &str) -> Result<Vec<DriveFile>>;

    /// Most recently modified non-folder file, if any
    async fn latest_file(&self) -> Result<Option<DriveFile>>;
}
