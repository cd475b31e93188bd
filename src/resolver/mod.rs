// src/resolver/mod.rs

pub mod document;
pub mod folder;
pub mod video;

use crate::{
    client::PageClient,
    error::AppResult,
    models::{Activity, ActivityKind, Resolution},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves one activity into its downloadable artifacts. A per-activity
/// failure is an `Err` here; the caller decides that it never aborts the
/// surrounding section or run.
#[async_trait]
pub trait KindResolver: Send + Sync {
    async fn resolve(&self, activity: &Activity) -> AppResult<Resolution>;
}

/// Picks the resolver for an activity kind.
pub fn resolver_for(kind: ActivityKind, client: Arc<PageClient>) -> Box<dyn KindResolver> {
    match kind {
        ActivityKind::PlainFile
        | ActivityKind::WordDoc
        | ActivityKind::Slides
        | ActivityKind::Spreadsheet
        | ActivityKind::PagedText => Box::new(document::DocumentResolver::new(client)),
        ActivityKind::Folder => Box::new(folder::FolderResolver::new(client)),
        ActivityKind::Video => Box::new(video::VideoResolver::new(client)),
        ActivityKind::Forum | ActivityKind::Unknown => Box::new(UnsupportedResolver),
    }
}

/// Kinds with no downloadable representation. Touches the network zero times.
struct UnsupportedResolver;

#[async_trait]
impl KindResolver for UnsupportedResolver {
    async fn resolve(&self, _activity: &Activity) -> AppResult<Resolution> {
        Ok(Resolution::unsupported())
    }
}
