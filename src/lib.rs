// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! tidydrive: AI-assisted cloud drive organizer
//!
//! Uploads land at the drive's default location, then an LLM suggestion
//! picks the best-matching existing folder and the file is moved there.

pub mod chat;
pub mod completion;
pub mod config;
pub mod drive;
pub mod error;
pub mod placement;
pub mod tree;
pub mod upload;
pub mod web;

pub use config::AppConfig;
pub use error::{Result, TidyDriveError};
