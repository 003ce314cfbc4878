// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Upload orchestration: store at the default location, then try to
//! place the file into a better folder

use tracing::{debug, warn};

use crate::drive::{DriveFile, DriveService};
use crate::placement::{PlacementDecision, PlacementResolver};
use crate::{Result, TidyDriveError};

/// One inbound file plus its optional placement hint
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: Vec<u8>,
    pub hint: Option<String>,
}

/// Result of one upload, including whether placement happened
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file: DriveFile,
    pub moved: bool,
    pub destination: Option<String>,
    pub message: String,
}

/// Store one item and try to place it.
///
/// A failing store is fatal for the item. Once stored, nothing undoes
/// it: resolver or move failures leave the file at the default location
/// and the upload still counts as a success.
pub async fn upload_and_place(
    drive: &dyn DriveService,
    resolver: &PlacementResolver,
    item: UploadItem,
) -> Result<UploadOutcome> {
    if item.name.trim().is_empty() {
        return Err(TidyDriveError::Validation("Upload has no file name".to_string()));
    }

    debug!("Storing '{}' ({} bytes)", item.name, item.size_bytes);
    let stored = drive
        .create_file(&item.name, &item.mime_type, item.content)
        .await?;

    let decision = resolver
        .resolve(drive, &item.name, item.hint.as_deref())
        .await;

    match decision {
        PlacementDecision::Matched(folder) => {
            let previous_parents = current_parents(drive, &stored).await;
            match drive
                .move_file(&stored.id, &folder.id, &previous_parents)
                .await
            {
                Ok(moved_file) => Ok(UploadOutcome {
                    message: format!("Uploaded and moved to '{}'", folder.name),
                    file: moved_file,
                    moved: true,
                    destination: Some(folder.name),
                }),
                Err(e) => {
                    warn!("Move after upload failed, file stays at root: {}", e);
                    Ok(UploadOutcome {
                        file: stored,
                        moved: false,
                        destination: None,
                        message: "Uploaded (placement move failed)".to_string(),
                    })
                }
            }
        }
        PlacementDecision::NoMatch => {
            let message = if item.hint.is_some() {
                "Uploaded (no matching folder found)".to_string()
            } else {
                "Uploaded".to_string()
            };
            Ok(UploadOutcome { file: stored, moved: false, destination: None, message })
        }
    }
}

/// Process a batch strictly sequentially, in submission order, so that
/// per-file progress stays deterministic and one slow item cannot
/// reorder its siblings
pub async fn upload_batch(
    drive: &dyn DriveService,
    resolver: &PlacementResolver,
    items: Vec<UploadItem>,
) -> Vec<Result<UploadOutcome>> {
    let mut outcomes = Vec::with_capacity(items.len());
    for item in items {
        outcomes.push(upload_and_place(drive, resolver, item).await);
    }
    outcomes
}

/// Parents to detach when moving; re-read from the provider when the
/// create response omitted them
async fn current_parents(drive: &dyn DriveService, stored: &DriveFile) -> Vec<String> {
    if !stored.parents.is_empty() {
        return stored.parents.clone();
    }
    match drive.get_file(&stored.id).await {
        Ok(fresh) => fresh.parents,
        Err(e) => {
            warn!("Could not read parents of {}: {}", stored.id, e);
            Vec::new()
        }
    }
}
