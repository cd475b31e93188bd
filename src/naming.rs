// src/naming.rs

use crate::constants;
use crate::models::ActivityKind;
use crate::utils;

// Trailing marker words Moodle appends to activity labels as hidden
// accessibility text. Only one trailing token is ever stripped.
const KNOWN_SUFFIX_TOKENS: &[&str] = &["file", "folder", "url", "page", "book", "forum"];

/// Builds a clean `base.ext` file name from an activity label, its kind, and
/// the content type the server reported for the resolved bytes.
pub fn normalize(raw_label: &str, kind: ActivityKind, content_type: &str) -> String {
    let base = strip_suffix_token(raw_label.trim());
    let base = if base.is_empty() { constants::FALLBACK_FILE_STEM } else { base };
    let ext = extension_for(kind, content_type);
    utils::sanitize_filename(&format!("{base}.{ext}"))
}

fn strip_suffix_token(label: &str) -> &str {
    if let Some((rest, last)) = label.rsplit_once(char::is_whitespace) {
        if KNOWN_SUFFIX_TOKENS.contains(&last.to_lowercase().as_str()) {
            return rest.trim_end();
        }
    } else if KNOWN_SUFFIX_TOKENS.contains(&label.to_lowercase().as_str()) {
        return "";
    }
    label
}

// The kind decides the extension where it implies one; ambiguous kinds fall
// back to the reported content type, then to "bin".
fn extension_for(kind: ActivityKind, content_type: &str) -> String {
    match kind {
        ActivityKind::WordDoc => "docx".to_string(),
        ActivityKind::Slides => "pptx".to_string(),
        ActivityKind::Spreadsheet => "xlsx".to_string(),
        ActivityKind::PagedText | ActivityKind::PlainFile => "pdf".to_string(),
        ActivityKind::Video => "mp4".to_string(),
        ActivityKind::Folder | ActivityKind::Forum | ActivityKind::Unknown => {
            extension_from_content_type(content_type)
        }
    }
}

fn extension_from_content_type(content_type: &str) -> String {
    let ct = content_type.to_lowercase();
    if ct.contains("pdf") {
        "pdf".to_string()
    } else if ct.contains("wordprocessing") || ct.contains("msword") {
        "docx".to_string()
    } else if ct.contains("presentation") || ct.contains("powerpoint") {
        "pptx".to_string()
    } else if ct.contains("spreadsheet") || ct.contains("excel") {
        "xlsx".to_string()
    } else if let Some(subtype) = ct.strip_prefix("video/") {
        let subtype = subtype.split(';').next().unwrap_or("").trim();
        match subtype {
            "mp4" | "webm" | "ogg" => subtype.to_string(),
            "quicktime" => "mov".to_string(),
            _ => "mp4".to_string(),
        }
    } else {
        "bin".to_string()
    }
}
