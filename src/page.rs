// src/page.rs

use crate::classify::classify;
use crate::constants::{self, selectors::course};
use crate::models::{Activity, Section};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::HEADER).unwrap());
static HEADER_INNER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::HEADER_INNER).unwrap());
static TOPICS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::TOPICS).unwrap());
static SECTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::SECTION).unwrap());
static SECTION_TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::SECTION_TITLE).unwrap());
static ACTIVITY_LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::ACTIVITY_LIST).unwrap());
static ACTIVITY_ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::ACTIVITY_ITEM).unwrap());
static ACTIVITY_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::ACTIVITY_LINK).unwrap());
static ACTIVITY_ICON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::ACTIVITY_ICON).unwrap());
static ACCESS_HIDE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(course::ACCESS_HIDE).unwrap());

/// One parsed course page plus the retained section lookup built by
/// `discover_sections`. Construct once per fetched page.
pub struct CoursePage {
    document: Html,
    base_url: Url,
    sections: Vec<Section>,
}

impl CoursePage {
    pub fn parse(html: &str, base_url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base_url,
            sections: Vec::new(),
        }
    }

    /// Course name from the page header, preferring the inner heading node.
    pub fn course_name(&self) -> String {
        let name = self
            .document
            .select(&HEADER_SEL)
            .next()
            .map(|header| {
                header
                    .select(&HEADER_INNER_SEL)
                    .next()
                    .map(|inner| inner.text().collect::<String>())
                    .unwrap_or_else(|| header.text().collect::<String>())
            })
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        if name.is_empty() {
            warn!("Course page carries no recognizable header, using the fallback name");
            constants::FALLBACK_COURSE_NAME.to_string()
        } else {
            name
        }
    }

    /// Scans the topics container and rebuilds the retained section list.
    /// Sections with empty titles are skipped; a duplicate title keeps the
    /// first occurrence. Returns the titles in document order.
    pub fn discover_sections(&mut self) -> Vec<String> {
        let mut sections: Vec<Section> = Vec::new();

        match self.document.select(&TOPICS_SEL).next() {
            Some(topics) => {
                for element in topics.select(&SECTION_SEL) {
                    let Some(dom_id) = element.value().attr("id") else { continue };
                    let title = element
                        .select(&SECTION_TITLE_SEL)
                        .next()
                        .map(|h| h.text().collect::<String>())
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    if title.is_empty() {
                        debug!("Skipping section '{}' with an empty title", dom_id);
                        continue;
                    }
                    if sections.iter().any(|s| s.title == title) {
                        warn!("Duplicate section title '{}', keeping the first occurrence", title);
                        continue;
                    }
                    sections.push(Section { title, dom_id: dom_id.to_string() });
                }
            }
            None => warn!("No topics container found on the course page"),
        }

        self.sections = sections;
        self.sections.iter().map(|s| s.title.clone()).collect()
    }

    /// Lists the activities of a named section. An unknown title or a
    /// section without an activity list yields an empty vec, never an error.
    pub fn activities(&self, section_title: &str) -> Vec<Activity> {
        let Some(section) = self.sections.iter().find(|s| s.title == section_title) else {
            warn!("Section '{}' is not part of the discovered set", section_title);
            return Vec::new();
        };
        let Some(element) = self.section_element(&section.dom_id) else {
            warn!("Section '{}' vanished from the document", section_title);
            return Vec::new();
        };
        let Some(list) = element.select(&ACTIVITY_LIST_SEL).next() else {
            debug!("Section '{}' has no activity list", section_title);
            return Vec::new();
        };

        let mut activities = Vec::new();
        for item in list.select(&ACTIVITY_ITEM_SEL) {
            let Some(link) = item.select(&ACTIVITY_LINK_SEL).next() else {
                debug!("Skipping an activity item without an entry link");
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                debug!("Skipping an activity link without an href");
                continue;
            };
            let url = match self.base_url.join(href) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping activity with unresolvable href '{}': {}", href, e);
                    continue;
                }
            };

            let label = visible_label(&link);
            let marker = icon_marker(&item);
            activities.push(Activity {
                label,
                url: url.to_string(),
                kind: classify(&marker),
            });
        }
        activities
    }

    fn section_element(&self, dom_id: &str) -> Option<ElementRef<'_>> {
        self.document
            .select(&SECTION_SEL)
            .find(|el| el.value().attr("id") == Some(dom_id))
    }
}

// Anchor text minus the hidden accessibility suffix Moodle appends for
// screen readers.
fn visible_label(link: &ElementRef) -> String {
    let full = link.text().collect::<String>().trim().to_string();
    let hidden = link
        .select(&ACCESS_HIDE_SEL)
        .next()
        .map(|e| e.text().collect::<String>())
        .unwrap_or_default();
    let hidden = hidden.trim();
    if !hidden.is_empty()
        && let Some(stripped) = full.strip_suffix(hidden)
    {
        let stripped = stripped.trim_end().to_string();
        if !stripped.is_empty() {
            return stripped;
        }
    }
    full
}

fn icon_marker(item: &ElementRef) -> String {
    item.select(&ACTIVITY_ICON_SEL)
        .next()
        .map(|img| {
            format!(
                "{} {}",
                img.value().attr("src").unwrap_or(""),
                img.value().attr("alt").unwrap_or("")
            )
        })
        .unwrap_or_default()
}
