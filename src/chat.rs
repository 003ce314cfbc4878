// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Chat commands over the drive
//!
//! Intent detection is an explicit ordered rule list evaluated
//! first-match-wins: create-folder, then latest-file, then search, then
//! free-form completion. Latest must precede search so that "find my
//! latest file" is not swallowed by the search rule.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use crate::completion::{ChatMessage, Completer};
use crate::drive::DriveService;
use crate::{Result, TidyDriveError};

/// A recognized chat command, or free-form conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    CreateFolder { name: String },
    LatestFile,
    Search { query: String },
    Freeform,
}

static CREATE_FOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)create\s+(?:a\s+|new\s+)?folder(?:\s+(?:called|named))?\s+(.+)"#).unwrap()
});

static LATEST_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:latest|last|most\s+recent)\b.*\b(?:file|upload)\b").unwrap()
});

static SEARCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:search|find|look)\s+(?:for\s+|up\s+)?(.+)$").unwrap()
});

/// The ordered rule table; first match wins
const RULES: &[(&str, fn(&str) -> Option<ChatIntent>)] = &[
    ("create-folder", rule_create_folder),
    ("latest-file", rule_latest_file),
    ("search", rule_search),
];

fn rule_create_folder(text: &str) -> Option<ChatIntent> {
    CREATE_FOLDER.captures(text).map(|c| ChatIntent::CreateFolder {
        name: unquote(c.get(1).unwrap().as_str()),
    })
}

fn rule_latest_file(text: &str) -> Option<ChatIntent> {
    LATEST_FILE.is_match(text).then_some(ChatIntent::LatestFile)
}

fn rule_search(text: &str) -> Option<ChatIntent> {
    SEARCH.captures(text).map(|c| ChatIntent::Search {
        query: unquote(c.get(1).unwrap().as_str()),
    })
}

/// Classify one user message by running the rule table in order
pub fn detect_intent(text: &str) -> ChatIntent {
    let text = text.trim();

    for (name, rule) in RULES {
        if let Some(intent) = rule(text) {
            debug!("Chat intent rule '{}' matched", name);
            return intent;
        }
    }
    ChatIntent::Freeform
}

fn unquote(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Answer one chat request: dispatch drive commands, fall back to the
/// completion service for everything else
pub async fn handle_chat(
    drive: &dyn DriveService,
    completion: Option<&Arc<dyn Completer>>,
    messages: &[ChatMessage],
    drive_context: Option<&str>,
) -> Result<String> {
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .ok_or_else(|| TidyDriveError::Validation("Chat has no user message".to_string()))?;

    match detect_intent(&last_user.content) {
        ChatIntent::CreateFolder { name } => {
            if name.is_empty() {
                return Err(TidyDriveError::Validation("Folder name is empty".to_string()));
            }
            let folder = drive.create_folder(&name, None).await?;
            Ok(format!("Created folder '{}'", folder.name))
        }
        ChatIntent::LatestFile => match drive.latest_file().await? {
            Some(file) => Ok(format!("Your most recent file is '{}'", file.name)),
            None => Ok("You have no files yet".to_string()),
        },
        ChatIntent::Search { query } => {
            let items = drive.search_files(&query).await?;
            if items.is_empty() {
                Ok(format!("No files matching '{}'", query))
            } else {
                let names: Vec<&str> = items.iter().map(|f| f.name.as_str()).collect();
                Ok(format!("Found {}: {}", items.len(), names.join(", ")))
            }
        }
        ChatIntent::Freeform => {
            let Some(completion) = completion else {
                return Ok("AI chat is not configured".to_string());
            };

            let mut system = "You are a helpful assistant for the user's cloud drive.".to_string();
            if let Some(context) = drive_context {
                system.push_str("\nCurrent drive contents:\n");
                system.push_str(context);
            }

            let mut full = Vec::with_capacity(messages.len() + 1);
            full.push(ChatMessage { role: "system".to_string(), content: system });
            full.extend(messages.iter().cloned());

            completion.complete_messages(full, 0.7).await
        }
    }
}
