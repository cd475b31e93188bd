// src/resolver/document.rs

use super::KindResolver;
use crate::{
    client::PageClient,
    constants::selectors::wrapper,
    error::AppResult,
    models::{Activity, Resolution, ResolvedArtifact},
    naming,
};
use async_trait::async_trait;
use log::{debug, warn};
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(wrapper::LINK).unwrap());
static OBJECT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(wrapper::OBJECT).unwrap());
static IFRAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(wrapper::IFRAME).unwrap());

/// Resolves document-like activities (files, office documents, paged text).
/// Moodle either serves the file directly or renders a small wrapper page
/// with the real link embedded; both shapes are handled.
pub struct DocumentResolver {
    client: Arc<PageClient>,
}

impl DocumentResolver {
    pub fn new(client: Arc<PageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KindResolver for DocumentResolver {
    async fn resolve(&self, activity: &Activity) -> AppResult<Resolution> {
        let fetched = self.client.fetch(&activity.url).await?;

        if !fetched.is_html() {
            // The server answered with the file itself.
            debug!("'{}' resolved directly ({})", activity.label, fetched.content_type);
            let name = naming::normalize(&activity.label, activity.kind, &fetched.content_type);
            return Ok(Resolution::resolved(
                vec![ResolvedArtifact {
                    name,
                    bytes: fetched.bytes,
                    content_type: fetched.content_type,
                }],
                None,
            ));
        }

        let Some(target) = find_embedded_link(&fetched.text(), &fetched.final_url) else {
            warn!("Wrapper page for '{}' carries no embedded file link", activity.label);
            return Ok(Resolution::nothing_found());
        };

        debug!("'{}' resolves through wrapper to {}", activity.label, target);
        let inner = self.client.fetch(target.as_str()).await?;
        let name = naming::normalize(&activity.label, activity.kind, &inner.content_type);
        Ok(Resolution::resolved(
            vec![ResolvedArtifact {
                name,
                bytes: inner.bytes,
                content_type: inner.content_type,
            }],
            None,
        ))
    }
}

// Probes the wrapper selectors in order and returns the first embedded link,
// resolved against the wrapper's final URL. Parsing stays inside this
// function so no document is held across an await.
fn find_embedded_link(html: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let candidate = document
        .select(&LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .or_else(|| {
            document
                .select(&OBJECT_SEL)
                .next()
                .and_then(|o| o.value().attr("data"))
        })
        .or_else(|| {
            document
                .select(&IFRAME_SEL)
                .next()
                .and_then(|f| f.value().attr("src"))
        })?;
    base.join(candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_embedded_link_prefers_workaround_anchor() {
        let html = r#"
            <div class="resourceworkaround">
              <a href="/pluginfile.php/1/mod_resource/content/1/syllabus.pdf">syllabus.pdf</a>
            </div>
            <iframe id="resourceobject" src="/other.pdf"></iframe>"#;
        let base = Url::parse("https://moodle.example/mod/resource/view.php?id=11").unwrap();
        let link = find_embedded_link(html, &base).unwrap();
        assert_eq!(
            link.as_str(),
            "https://moodle.example/pluginfile.php/1/mod_resource/content/1/syllabus.pdf"
        );
    }

    #[test]
    fn test_find_embedded_link_falls_back_to_object_and_iframe() {
        let base = Url::parse("https://moodle.example/").unwrap();
        let object = r#"<object id="resourceobject" data="/f.pdf"></object>"#;
        assert_eq!(find_embedded_link(object, &base).unwrap().path(), "/f.pdf");

        let iframe = r#"<iframe id="resourceobject" src="/g.pdf"></iframe>"#;
        assert_eq!(find_embedded_link(iframe, &base).unwrap().path(), "/g.pdf");
    }

    #[test]
    fn test_find_embedded_link_missing() {
        let base = Url::parse("https://moodle.example/").unwrap();
        assert!(find_embedded_link("<p>nothing here</p>", &base).is_none());
    }
}
