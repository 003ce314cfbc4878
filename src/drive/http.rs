// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! HTTP client for the drive provider's REST API

use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{DriveFile, DriveService, FolderPage, FolderRecord};
use crate::config::DriveConfig;
use crate::{Result, TidyDriveError};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const FILE_FIELDS: &str = "id,name,parents,mimeType,modifiedTime";

/// Drive REST API client
pub struct HttpDriveClient {
    client: Client,
    api_base: String,
    upload_base: String,
    access_token: Option<String>,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderListResponse {
    #[serde(default)]
    files: Vec<FolderRecord>,
    next_page_token: Option<String>,
}

impl HttpDriveClient {
    /// Create a new drive client from configuration
    pub fn new(config: &DriveConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            page_size: config.page_size,
        }
    }

    fn token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or(TidyDriveError::NotAuthenticated)
    }
}

#[async_trait::async_trait]
impl DriveService for HttpDriveClient {
    async fn list_folders(&self, page_token: Option<&str>) -> Result<FolderPage> {
        let token = self.token()?;
        let url = format!("{}/files", self.api_base);
        let filter = format!(
            "mimeType='{}' and trashed=false and 'me' in owners",
            FOLDER_MIME
        );

        let mut query = vec![
            ("q".to_string(), filter),
            ("fields".to_string(), "nextPageToken,files(id,name,parents)".to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(t) = page_token {
            query.push(("pageToken".to_string(), t.to_string()));
        }

        debug!("Listing folders, page_token={:?}", page_token);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TidyDriveError::NotAuthenticated);
        }
        if !response.status().is_success() {
            return Err(TidyDriveError::Listing(format!(
                "Provider returned status {}",
                response.status()
            )));
        }

        let body: FolderListResponse = response
            .json()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;

        Ok(FolderPage {
            records: body.files,
            next_page_token: body.next_page_token,
        })
    }

    async fn create_file(&self, name: &str, mime_type: &str, content: Vec<u8>) -> Result<DriveFile> {
        let token = self.token()?;
        let url = format!("{}/files?uploadType=multipart&fields={}", self.upload_base, FILE_FIELDS);

        let metadata = json!({ "name": name });
        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| TidyDriveError::Write(e.to_string()))?,
            )
            .part(
                "media",
                multipart::Part::bytes(content)
                    .mime_str(mime_type)
                    .map_err(|e| TidyDriveError::Write(e.to_string()))?,
            );

        debug!("Uploading file '{}' ({})", name, mime_type);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TidyDriveError::Write(e.to_string()))?;

        parse_write_response(response).await
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<DriveFile> {
        let token = self.token()?;
        let url = format!("{}/files?fields={}", self.api_base, FILE_FIELDS);

        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([parent]);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| TidyDriveError::Write(e.to_string()))?;

        parse_write_response(response).await
    }

    async fn move_file(
        &self,
        file_id: &str,
        add_parent_id: &str,
        remove_parent_ids: &[String],
    ) -> Result<DriveFile> {
        let token = self.token()?;
        let url = format!("{}/files/{}", self.api_base, file_id);

        let mut query = vec![
            ("addParents".to_string(), add_parent_id.to_string()),
            ("fields".to_string(), FILE_FIELDS.to_string()),
        ];
        if !remove_parent_ids.is_empty() {
            query.push(("removeParents".to_string(), remove_parent_ids.join(",")));
        }

        debug!("Moving file {} into {}", file_id, add_parent_id);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .query(&query)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| TidyDriveError::Write(e.to_string()))?;

        parse_write_response(response).await
    }

    async fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        let token = self.token()?;
        let url = format!("{}/files/{}", self.api_base, file_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TidyDriveError::NotAuthenticated);
        }
        if !response.status().is_success() {
            return Err(TidyDriveError::Listing(format!(
                "Provider returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))
    }

    async fn search_files(&self, query_text: &str) -> Result<Vec<DriveFile>> {
        let token = self.token()?;
        let url = format!("{}/files", self.api_base);

        // Single quotes in the query would break the provider's filter syntax
        let escaped = query_text.replace('\\', "\\\\").replace('\'', "\\'");
        let filter = format!("name contains '{}' and trashed=false", escaped);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", filter.as_str()),
                ("fields", "files(id,name,parents,mimeType,modifiedTime)"),
                ("pageSize", "50"),
            ])
            .send()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TidyDriveError::NotAuthenticated);
        }
        if !response.status().is_success() {
            return Err(TidyDriveError::Listing(format!(
                "Provider returned status {}",
                response.status()
            )));
        }

        let body: FileListResponse = response
            .json()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;
        Ok(body.files)
    }

    async fn latest_file(&self) -> Result<Option<DriveFile>> {
        let token = self.token()?;
        let url = format!("{}/files", self.api_base);
        let filter = format!("mimeType!='{}' and trashed=false", FOLDER_MIME);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", filter.as_str()),
                ("orderBy", "modifiedTime desc"),
                ("pageSize", "1"),
                ("fields", "files(id,name,parents,mimeType,modifiedTime)"),
            ])
            .send()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TidyDriveError::NotAuthenticated);
        }
        if !response.status().is_success() {
            return Err(TidyDriveError::Listing(format!(
                "Provider returned status {}",
                response.status()
            )));
        }

        let body: FileListResponse = response
            .json()
            .await
            .map_err(|e| TidyDriveError::Listing(e.to_string()))?;
        Ok(body.files.into_iter().next())
    }
}

async fn parse_write_response(response: reqwest::Response) -> Result<DriveFile> {
    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(TidyDriveError::NotAuthenticated);
    }
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TidyDriveError::Write(format!(
            "Provider returned status {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| TidyDriveError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;

    #[tokio::test]
    async fn missing_token_is_not_authenticated() {
        let client = HttpDriveClient::new(&DriveConfig::default());
        let err = client.list_folders(None).await.unwrap_err();
        assert!(matches!(err, TidyDriveError::NotAuthenticated));
    }

    #[test]
    fn base_urls_are_normalized() {
        let config = DriveConfig {
            api_base: "https://example.test/api/".to_string(),
            ..DriveConfig::default()
        };
        let client = HttpDriveClient::new(&config);
        assert_eq!(client.api_base, "https://example.test/api");
    }
}
