// src/resolver/video.rs

use super::KindResolver;
use crate::{
    client::{Fetched, PageClient},
    constants::selectors::video,
    error::AppResult,
    models::{Activity, ActivityKind, Resolution, ResolvedArtifact},
    naming,
};
use async_trait::async_trait;
use log::{debug, warn};
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

static SOURCE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(video::SOURCE).unwrap());
static DIRECT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(video::DIRECT).unwrap());
static EMBED_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(video::EMBED).unwrap());

enum PlayerProbe {
    Source(Url),
    Frame(Url),
    Missing,
}

/// Resolves a video activity to its media file: either served directly, or
/// through a native player on the activity page, or through one embedded
/// frame whose own page hosts the player. Never follows more than one frame.
pub struct VideoResolver {
    client: Arc<PageClient>,
}

impl VideoResolver {
    pub fn new(client: Arc<PageClient>) -> Self {
        Self { client }
    }

    fn media_artifact(&self, activity: &Activity, fetched: Fetched) -> Resolution {
        let name = naming::normalize(&activity.label, ActivityKind::Video, &fetched.content_type);
        Resolution::resolved(
            vec![ResolvedArtifact {
                name,
                bytes: fetched.bytes,
                content_type: fetched.content_type,
            }],
            None,
        )
    }
}

#[async_trait]
impl KindResolver for VideoResolver {
    async fn resolve(&self, activity: &Activity) -> AppResult<Resolution> {
        let fetched = self.client.fetch(&activity.url).await?;
        if !fetched.is_html() {
            debug!("'{}' is served as media directly", activity.label);
            return Ok(self.media_artifact(activity, fetched));
        }

        let source = match probe_player(&fetched.text(), &fetched.final_url) {
            PlayerProbe::Source(url) => url,
            PlayerProbe::Frame(frame_url) => {
                debug!("'{}' embeds a frame at {}", activity.label, frame_url);
                let inner = self.client.fetch(frame_url.as_str()).await?;
                if !inner.is_html() {
                    return Ok(self.media_artifact(activity, inner));
                }
                // Exactly one extra hop: a frame inside the frame is not followed.
                match probe_player(&inner.text(), &inner.final_url) {
                    PlayerProbe::Source(url) => url,
                    PlayerProbe::Frame(_) | PlayerProbe::Missing => {
                        warn!("No playable source found behind the frame for '{}'", activity.label);
                        return Ok(Resolution::nothing_found());
                    }
                }
            }
            PlayerProbe::Missing => {
                warn!("No player found on the page for '{}'", activity.label);
                return Ok(Resolution::nothing_found());
            }
        };

        debug!("'{}' resolves to media source {}", activity.label, source);
        let media = self.client.fetch(source.as_str()).await?;
        Ok(self.media_artifact(activity, media))
    }
}

fn probe_player(html: &str, base: &Url) -> PlayerProbe {
    let document = Html::parse_document(html);

    let native = document
        .select(&SOURCE_SEL)
        .next()
        .and_then(|s| s.value().attr("src"))
        .or_else(|| {
            document
                .select(&DIRECT_SEL)
                .next()
                .and_then(|v| v.value().attr("src"))
        });
    if let Some(src) = native
        && let Ok(url) = base.join(src)
    {
        return PlayerProbe::Source(url);
    }

    if let Some(src) = document
        .select(&EMBED_SEL)
        .next()
        .and_then(|f| f.value().attr("src"))
        && let Ok(url) = base.join(src)
    {
        return PlayerProbe::Frame(url);
    }

    PlayerProbe::Missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://moodle.example/mod/resource/view.php?id=44").unwrap()
    }

    #[test]
    fn test_probe_finds_native_source_element() {
        let html = r#"<video controls><source src="/media/lecture.mp4" type="video/mp4"></video>"#;
        match probe_player(html, &base()) {
            PlayerProbe::Source(url) => assert_eq!(url.path(), "/media/lecture.mp4"),
            _ => panic!("expected a native source"),
        }
    }

    #[test]
    fn test_probe_finds_video_src_attribute() {
        let html = r#"<video src="/media/clip.webm"></video>"#;
        match probe_player(html, &base()) {
            PlayerProbe::Source(url) => assert_eq!(url.path(), "/media/clip.webm"),
            _ => panic!("expected a native source"),
        }
    }

    #[test]
    fn test_probe_prefers_native_player_over_frame() {
        let html = r#"
            <iframe src="/embed/player"></iframe>
            <video><source src="/media/lecture.mp4"></video>"#;
        assert!(matches!(probe_player(html, &base()), PlayerProbe::Source(_)));
    }

    #[test]
    fn test_probe_reports_frame_when_no_native_player() {
        let html = r#"<iframe src="https://stream.example/embed/42"></iframe>"#;
        match probe_player(html, &base()) {
            PlayerProbe::Frame(url) => assert_eq!(url.as_str(), "https://stream.example/embed/42"),
            _ => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_probe_missing() {
        assert!(matches!(probe_player("<p>no media</p>", &base()), PlayerProbe::Missing));
    }
}
