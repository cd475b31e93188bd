// src/models.rs

use crate::error::AppError;
use crate::symbols;
use colored::{ColoredString, Colorize};

/// One content section of the course page. Identity is the title; the DOM id
/// is only used to find the section again when listing its activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub dom_id: String,
}

/// One activity row inside a section, as listed on the course page.
#[derive(Debug, Clone)]
pub struct Activity {
    pub label: String,
    pub url: String,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    PlainFile,
    WordDoc,
    Slides,
    Spreadsheet,
    PagedText,
    Folder,
    Video,
    Forum,
    Unknown,
}

impl ActivityKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ActivityKind::PlainFile => "file",
            ActivityKind::WordDoc => "document",
            ActivityKind::Slides => "presentation",
            ActivityKind::Spreadsheet => "spreadsheet",
            ActivityKind::PagedText => "paged text",
            ActivityKind::Folder => "folder",
            ActivityKind::Video => "video",
            ActivityKind::Forum => "forum",
            ActivityKind::Unknown => "unknown",
        }
    }
}

/// A concrete downloadable file produced by resolving an activity.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Result of one resolver invocation. `folder` names the nested archive
/// directory the artifacts belong under (folder activities only).
#[derive(Debug)]
pub struct Resolution {
    pub artifacts: Vec<ResolvedArtifact>,
    pub folder: Option<String>,
    pub status: ResolveStatus,
}

impl Resolution {
    pub fn resolved(artifacts: Vec<ResolvedArtifact>, folder: Option<String>) -> Self {
        Self { artifacts, folder, status: ResolveStatus::Resolved }
    }

    pub fn unsupported() -> Self {
        Self { artifacts: Vec::new(), folder: None, status: ResolveStatus::Unsupported }
    }

    pub fn nothing_found() -> Self {
        Self { artifacts: Vec::new(), folder: None, status: ResolveStatus::NothingFound }
    }

    /// A failed resolution keeps whatever artifacts landed before the failure.
    pub fn failed(artifacts: Vec<ResolvedArtifact>, folder: Option<String>) -> Self {
        Self { artifacts, folder, status: ResolveStatus::Failed }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ResolveStatus {
    Resolved,
    Unsupported,
    NothingFound,
    Failed,
}

impl ResolveStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            ResolveStatus::Resolved => (&symbols::OK, |s| s.green(), "resolved successfully"),
            ResolveStatus::Unsupported => {
                (&symbols::INFO, |s| s.cyan(), "activity type not supported, skipped")
            }
            ResolveStatus::NothingFound => {
                (&symbols::WARN, |s| s.yellow(), "no downloadable content found")
            }
            ResolveStatus::Failed => (&symbols::ERROR, |s| s.red(), "resolution failed"),
        }
    }
}

/// Maps an error to the short reason string the report groups by.
pub fn describe_failure(error: &AppError) -> String {
    match error {
        AppError::SessionInvalid => "authentication failed (session invalid)".to_string(),
        AppError::SessionMissing => "authentication required (no session cookie)".to_string(),
        AppError::Http { status, .. } => format!("server returned HTTP {status}"),
        AppError::BodyTooLarge { .. } => "response exceeded the size limit".to_string(),
        AppError::Network(err)
        | AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(err)) => {
            if err.is_timeout() {
                "connection timed out".to_string()
            } else if err.is_connect() {
                "could not connect to server".to_string()
            } else {
                "network request failed".to_string()
            }
        }
        AppError::NetworkMiddleware(_) => "network request failed".to_string(),
        other => other.to_string(),
    }
}
