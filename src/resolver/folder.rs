// src/resolver/folder.rs

use super::KindResolver;
use crate::{
    client::PageClient,
    constants::{self, selectors::folder},
    error::AppResult,
    models::{Activity, ActivityKind, Resolution, ResolvedArtifact},
    naming, utils,
};
use async_trait::async_trait;
use itertools::Itertools;
use log::{debug, warn};
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

static TREE_LINKS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(folder::TREE_LINKS).unwrap());
static MANAGER_LINKS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(folder::MANAGER_LINKS).unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(folder::HEADING).unwrap());

struct FolderListing {
    name: String,
    entries: Vec<FolderEntry>,
}

struct FolderEntry {
    url: Url,
    link_text: String,
}

/// Expands a folder activity into all files listed on its folder page. One
/// failing entry is skipped; the rest still land in the archive.
pub struct FolderResolver {
    client: Arc<PageClient>,
}

impl FolderResolver {
    pub fn new(client: Arc<PageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KindResolver for FolderResolver {
    async fn resolve(&self, activity: &Activity) -> AppResult<Resolution> {
        let fetched = self.client.fetch(&activity.url).await?;
        if !fetched.is_html() {
            warn!("Folder page for '{}' is not a document listing", activity.label);
            return Ok(Resolution::nothing_found());
        }

        let listing = parse_listing(&fetched.text(), &fetched.final_url, &activity.label);
        if listing.entries.is_empty() {
            debug!("Folder '{}' lists no files", listing.name);
            return Ok(Resolution::nothing_found());
        }
        debug!("Folder '{}' lists {} files", listing.name, listing.entries.len());

        let mut artifacts = Vec::new();
        for entry in &listing.entries {
            match self.client.fetch(entry.url.as_str()).await {
                Ok(file) => {
                    let name = entry_name(entry, &file.content_type);
                    artifacts.push(ResolvedArtifact {
                        name,
                        bytes: file.bytes,
                        content_type: file.content_type,
                    });
                }
                Err(e) => {
                    warn!("Skipping folder entry '{}': {}", entry.url, e);
                }
            }
        }

        if artifacts.is_empty() {
            Ok(Resolution::failed(artifacts, Some(listing.name)))
        } else {
            Ok(Resolution::resolved(artifacts, Some(listing.name)))
        }
    }
}

fn parse_listing(html: &str, base: &Url, activity_label: &str) -> FolderListing {
    let document = Html::parse_document(html);

    let name = document
        .select(&HEADING_SEL)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            let label = activity_label.trim();
            (!label.is_empty()).then(|| label.to_string())
        })
        .unwrap_or_else(|| constants::FALLBACK_FOLDER_NAME.to_string());

    let mut anchors: Vec<_> = document.select(&TREE_LINKS_SEL).collect();
    if anchors.is_empty() {
        anchors = document.select(&MANAGER_LINKS_SEL).collect();
    }

    let entries = anchors
        .into_iter()
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping folder link with unresolvable href '{}': {}", href, e);
                    return None;
                }
            };
            let link_text = a.text().collect::<String>().trim().to_string();
            Some(FolderEntry { url, link_text })
        })
        .unique_by(|entry| entry.url.to_string())
        .collect();

    FolderListing { name, entries }
}

// File name priority: the URL's last path segment when it looks like a file
// name, else the link text through the normalizer.
fn entry_name(entry: &FolderEntry, content_type: &str) -> String {
    if let Some(segment) = last_path_segment(&entry.url)
        && segment.contains('.')
    {
        return utils::sanitize_filename(&segment);
    }
    naming::normalize(&entry.link_text, ActivityKind::Folder, content_type)
}

fn last_path_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy().into_owned();
    (!decoded.is_empty()).then_some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_collects_tree_links() {
        let html = r#"
            <div id="region-main"><h2>Week 3 readings</h2>
              <div class="foldertree">
                <a href="/pluginfile.php/9/mod_folder/content/0/paper%20one.pdf">paper one.pdf</a>
                <a href="/pluginfile.php/9/mod_folder/content/0/paper_two.pdf">paper_two.pdf</a>
                <a href="/pluginfile.php/9/mod_folder/content/0/paper%20one.pdf">duplicate</a>
              </div>
            </div>"#;
        let base = Url::parse("https://moodle.example/mod/folder/view.php?id=30").unwrap();
        let listing = parse_listing(html, &base, "Readings Folder");
        assert_eq!(listing.name, "Week 3 readings");
        // The repeated URL collapses to one entry.
        assert_eq!(listing.entries.len(), 2);
    }

    #[test]
    fn test_parse_listing_falls_back_to_label_then_default() {
        let base = Url::parse("https://moodle.example/").unwrap();
        let html = r#"<div class="filemanager"><a href="/a.pdf">a.pdf</a></div>"#;
        assert_eq!(parse_listing(html, &base, "Lab materials").name, "Lab materials");
        assert_eq!(parse_listing(html, &base, "  ").name, "Folder");
    }

    #[test]
    fn test_entry_name_prefers_url_segment() {
        let entry = FolderEntry {
            url: Url::parse("https://moodle.example/pluginfile.php/9/content/0/paper%20one.pdf")
                .unwrap(),
            link_text: "paper one.pdf".to_string(),
        };
        assert_eq!(entry_name(&entry, "application/pdf"), "paper one.pdf");
    }

    #[test]
    fn test_entry_name_uses_link_text_when_segment_has_no_extension() {
        let entry = FolderEntry {
            url: Url::parse("https://moodle.example/pluginfile.php/9/content/0/download").unwrap(),
            link_text: "Field guide".to_string(),
        };
        assert_eq!(entry_name(&entry, "application/pdf"), "Field guide.pdf");
    }
}
