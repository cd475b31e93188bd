// src/classify.rs

use crate::models::ActivityKind;

// Ordered signature table; first match wins. Signatures are substrings of the
// lowercased icon marker (icon URL plus alt text). Moodle module icons carry
// the module name in the path, file-type icons carry names like "pdf-24".
const SIGNATURES: &[(&[&str], ActivityKind)] = &[
    (&["folder"], ActivityKind::Folder),
    (&["forum", "discussion"], ActivityKind::Forum),
    (&["/mod/page", "/mod/book", "book", "page"], ActivityKind::PagedText),
    (&["video", "mpeg", "mp4", "quicktime", "avi"], ActivityKind::Video),
    (&["powerpoint", "presentation", "pptx"], ActivityKind::Slides),
    (&["word", "document", "docx"], ActivityKind::WordDoc),
    (&["spreadsheet", "excel", "xlsx", "calc"], ActivityKind::Spreadsheet),
    (&["pdf", "resource"], ActivityKind::PlainFile),
];

/// Maps an activity's icon marker to its kind. Total: any input, including
/// an empty marker, yields a kind; unrecognized markers are `Unknown`.
pub fn classify(marker: &str) -> ActivityKind {
    let marker = marker.to_lowercase();
    if marker.trim().is_empty() {
        return ActivityKind::Unknown;
    }
    for (signatures, kind) in SIGNATURES {
        if signatures.iter().any(|sig| marker.contains(sig)) {
            return *kind;
        }
    }
    ActivityKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_signatures() {
        assert_eq!(
            classify("https://moodle.example/theme/image.php/boost/folder/1629890704/icon Folder"),
            ActivityKind::Folder
        );
        assert_eq!(classify("theme/image.php/boost/forum/123/icon Forum"), ActivityKind::Forum);
        assert_eq!(classify("theme/image.php/boost/core/1/f/pdf-24 File"), ActivityKind::PlainFile);
        assert_eq!(classify("f/document-24 Word document"), ActivityKind::WordDoc);
        assert_eq!(classify("f/powerpoint-24"), ActivityKind::Slides);
        assert_eq!(classify("f/spreadsheet-24"), ActivityKind::Spreadsheet);
        assert_eq!(classify("f/mpeg-24 Video file"), ActivityKind::Video);
        assert_eq!(classify("/mod/book/icon"), ActivityKind::PagedText);
        assert_eq!(classify("theme/image.php/boost/page/99/icon"), ActivityKind::PagedText);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("F/PDF-24 FILE"), ActivityKind::PlainFile);
        assert_eq!(classify("FOLDER"), ActivityKind::Folder);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // A marker matching several rows takes the earliest one.
        assert_eq!(classify("folder full of pdf files"), ActivityKind::Folder);
    }

    #[test]
    fn test_classify_unknown_and_empty() {
        assert_eq!(classify("theme/image.php/boost/core/1/f/unknown-24"), ActivityKind::Unknown);
        assert_eq!(classify(""), ActivityKind::Unknown);
        assert_eq!(classify("   "), ActivityKind::Unknown);
    }
}
