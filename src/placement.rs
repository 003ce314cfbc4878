// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! AI-assisted folder placement for uploaded files
//!
//! The resolver never fails: any error between the listing call and the
//! answer parsing degrades to `NoMatch` and the upload stays where it
//! landed.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::completion::Completer;
use crate::drive::{DriveService, FolderRecord};
use crate::tree::list_all_folders;

/// Outcome of one placement resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementDecision {
    Matched(FolderRecord),
    NoMatch,
}

/// Resolves which folder, if any, an uploaded file belongs in
pub struct PlacementResolver {
    completion: Option<Arc<dyn Completer>>,
    temperature: f32,
    max_pages: u32,
}

impl PlacementResolver {
    pub fn new(completion: Option<Arc<dyn Completer>>, temperature: f32, max_pages: u32) -> Self {
        Self { completion, temperature, max_pages }
    }

    /// Pick a destination folder for a file, or decline.
    ///
    /// Issues its own folder listing rather than reusing any tree built
    /// in the same request lifecycle, so it always sees fresh names.
    pub async fn resolve(
        &self,
        drive: &dyn DriveService,
        file_name: &str,
        hint: Option<&str>,
    ) -> PlacementDecision {
        let Some(completion) = &self.completion else {
            debug!("No completion credential configured, skipping placement");
            return PlacementDecision::NoMatch;
        };

        let candidates = match list_all_folders(drive, self.max_pages).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Placement listing failed, leaving file in place: {}", e);
                return PlacementDecision::NoMatch;
            }
        };

        if candidates.is_empty() {
            debug!("No folders exist, nothing to place into");
            return PlacementDecision::NoMatch;
        }

        let system = build_system_prompt(&candidates);
        let user = build_user_prompt(file_name, hint);

        let answer = match completion.complete(&system, &user, self.temperature).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Completion call failed, leaving file in place: {}", e);
                return PlacementDecision::NoMatch;
            }
        };

        let cleaned = clean_answer(&answer);
        if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("none") {
            debug!("Model declined to pick a folder for '{}'", file_name);
            return PlacementDecision::NoMatch;
        }

        match match_folder(&cleaned, &candidates) {
            Some(record) => {
                debug!("Placing '{}' into folder '{}'", file_name, record.name);
                PlacementDecision::Matched(record.clone())
            }
            None => {
                // The model sometimes invents a name that is not in the list
                warn!("Answer '{}' matches no folder, leaving file in place", cleaned);
                PlacementDecision::NoMatch
            }
        }
    }
}

/// System instruction enumerating every candidate folder name verbatim
fn build_system_prompt(candidates: &[FolderRecord]) -> String {
    let names: Vec<&str> = candidates.iter().map(|r| r.name.as_str()).collect();
    format!(
        "You are a filing assistant. The user's drive contains these folders: {}. \
         Pick the single folder that best fits the described file and answer with \
         exactly that folder name, nothing else. If no folder fits, answer NONE.",
        names.join(", ")
    )
}

/// User instruction carrying whatever file context is available
fn build_user_prompt(file_name: &str, hint: Option<&str>) -> String {
    let mut lines = Vec::new();

    if !file_name.is_empty() {
        lines.push(format!("File name: {}", file_name));
    }
    if let Some(ext) = extension_of(file_name) {
        lines.push(format!("Extension: {}", ext));
        lines.push(format!("File type: {}", file_type_label(&ext)));
    }
    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        lines.push(format!("Hint: {}", hint.trim()));
    }

    lines.push("Which folder should this file go into?".to_string());
    lines.join("\n")
}

/// Strip surrounding whitespace and quote characters from the answer
fn clean_answer(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// Case-insensitive exact-name match against the candidate list
fn match_folder<'a>(answer: &str, candidates: &'a [FolderRecord]) -> Option<&'a FolderRecord> {
    let wanted = answer.to_lowercase();
    candidates.iter().find(|r| r.name.to_lowercase() == wanted)
}

/// Lower-cased extension of a file name, if it has one
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Coarse file-type label used to enrich the placement prompt
pub fn file_type_label(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" | "bmp" | "tiff" | "svg" => "Image",
        "mp4" | "mkv" | "webm" | "avi" | "mov" => "Video",
        "mp3" | "wav" | "flac" | "ogg" | "m4a" => "Audio",
        "pdf" | "doc" | "docx" | "odt" | "rtf" => "Document",
        "xls" | "xlsx" | "csv" | "ods" => "Spreadsheet",
        "ppt" | "pptx" | "odp" => "Presentation",
        "txt" | "md" => "Text",
        "zip" | "tar" | "gz" | "7z" | "rar" => "Archive",
        "rs" | "py" | "js" | "ts" | "go" | "java" | "c" | "cpp" | "h" => "Code",
        _ => "File",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{ChatMessage, Completer};
    use crate::drive::{DriveFile, FolderPage};
    use crate::{Result, TidyDriveError};
    use async_trait::async_trait;

    struct FolderDrive {
        folders: Vec<FolderRecord>,
    }

    fn folder(id: &str, name: &str) -> FolderRecord {
        FolderRecord { id: id.to_string(), name: name.to_string(), parents: Vec::new() }
    }

    #[async_trait]
    impl DriveService for FolderDrive {
        async fn list_folders(&self, _: Option<&str>) -> Result<FolderPage> {
            Ok(FolderPage { records: self.folders.clone(), next_page_token: None })
        }
        async fn create_file(&self, _: &str, _: &str, _: Vec<u8>) -> Result<DriveFile> {
            unreachable!()
        }
        async fn create_folder(&self, _: &str, _: Option<&str>) -> Result<DriveFile> {
            unreachable!()
        }
        async fn move_file(&self, _: &str, _: &str, _: &[String]) -> Result<DriveFile> {
            unreachable!()
        }
        async fn get_file(&self, _: &str) -> Result<DriveFile> {
            unreachable!()
        }
        async fn search_files(&self, _: &str) -> Result<Vec<DriveFile>> {
            unreachable!()
        }
        async fn latest_file(&self) -> Result<Option<DriveFile>> {
            unreachable!()
        }
    }

    struct ScriptedCompleter {
        answer: Result<String>,
    }

    #[async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete_messages(&self, _: Vec<ChatMessage>, _: f32) -> Result<String> {
            match &self.answer {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(TidyDriveError::Completion("scripted failure".to_string())),
            }
        }
    }

    fn resolver(answer: Result<String>) -> PlacementResolver {
        PlacementResolver::new(Some(Arc::new(ScriptedCompleter { answer })), 0.3, 100)
    }

    #[tokio::test]
    async fn disabled_without_credential() {
        let resolver = PlacementResolver::new(None, 0.3, 100);
        let drive = FolderDrive { folders: vec![folder("1", "Finance")] };
        let decision = resolver.resolve(&drive, "report.pdf", Some("quarterly")).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[tokio::test]
    async fn empty_folder_list_is_no_match() {
        let resolver = resolver(Ok("Finance".to_string()));
        let drive = FolderDrive { folders: vec![] };
        let decision = resolver.resolve(&drive, "report.pdf", Some("quarterly")).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[tokio::test]
    async fn matching_answer_places_file() {
        let resolver = resolver(Ok("Finance".to_string()));
        let drive = FolderDrive {
            folders: vec![folder("1", "Finance"), folder("2", "Marketing")],
        };
        let decision = resolver.resolve(&drive, "report.pdf", Some("quarterly finance")).await;
        assert_eq!(decision, PlacementDecision::Matched(folder("1", "Finance")));
    }

    #[tokio::test]
    async fn none_answer_is_no_match() {
        let resolver = resolver(Ok("NONE".to_string()));
        let drive = FolderDrive { folders: vec![folder("1", "Photos")] };
        let decision = resolver.resolve(&drive, "photo.png", None).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[tokio::test]
    async fn quoted_lowercase_none_is_no_match() {
        let resolver = resolver(Ok("\"none\"".to_string()));
        let drive = FolderDrive { folders: vec![folder("1", "Photos")] };
        let decision = resolver.resolve(&drive, "photo.png", None).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[tokio::test]
    async fn hallucinated_name_is_no_match() {
        let resolver = resolver(Ok("Receipts".to_string()));
        let drive = FolderDrive { folders: vec![folder("1", "Finance")] };
        let decision = resolver.resolve(&drive, "receipt.pdf", None).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_no_match() {
        let resolver = resolver(Err(TidyDriveError::Completion("down".to_string())));
        let drive = FolderDrive { folders: vec![folder("1", "Finance")] };
        let decision = resolver.resolve(&drive, "report.pdf", Some("finance")).await;
        assert_eq!(decision, PlacementDecision::NoMatch);
    }

    #[test]
    fn matching_is_case_insensitive_but_exact() {
        let candidates = vec![folder("1", "invoices")];
        assert!(match_folder("Invoices", &candidates).is_some());
        // a near miss must not match
        assert!(match_folder("Invoice", &candidates).is_none());
    }

    #[test]
    fn quoted_answers_are_cleaned() {
        assert_eq!(clean_answer("  \"Finance\" "), "Finance");
        assert_eq!(clean_answer("'Tax Returns'"), "Tax Returns");
        assert_eq!(clean_answer("`Photos`"), "Photos");
        assert_eq!(clean_answer("   "), "");
    }

    #[test]
    fn system_prompt_lists_names_verbatim() {
        let prompt = build_system_prompt(&[folder("1", "Finance"), folder("2", "Tax 2025")]);
        assert!(prompt.contains("Finance, Tax 2025"));
        assert!(prompt.contains("NONE"));
    }

    #[test]
    fn user_prompt_includes_available_context() {
        let prompt = build_user_prompt("report.pdf", Some("quarterly finance"));
        assert!(prompt.contains("File name: report.pdf"));
        assert!(prompt.contains("Extension: pdf"));
        assert!(prompt.contains("File type: Document"));
        assert!(prompt.contains("Hint: quarterly finance"));

        let no_hint = build_user_prompt("photo.png", None);
        assert!(!no_hint.contains("Hint:"));
    }

    #[test]
    fn extension_handling() {
        assert_eq!(extension_of("report.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
    }

    #[test]
    fn file_type_labels() {
        assert_eq!(file_type_label("png"), "Image");
        assert_eq!(file_type_label("xlsx"), "Spreadsheet");
        assert_eq!(file_type_label("weird"), "File");
    }
}
