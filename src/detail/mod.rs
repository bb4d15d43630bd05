//! Detailed post content recovered from the host application's own state,
//! as opposed to what the markup shows.

pub mod article;
pub mod locator;
pub mod media;
pub mod normalize;
pub mod probe;

use crate::config::Config;
use crate::error::Result;
use crate::page::{Page, PageSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use locator::locate_raw_post;
pub use normalize::{normalize, ContentEncoding};

/// One post as recovered from page state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: String,
    pub author: String,
    pub author_name: String,
    pub date: Option<DateTime<Utc>>,
    pub text: String,
    pub images: Vec<String>,
    pub has_video: bool,
    pub video_url: Option<String>,
    pub url: String,
    /// Set for block-structured articles, whose media is all inline in `text`.
    pub is_long_form: bool,
    /// Article entities that degraded to plain text.
    #[serde(default)]
    pub unresolved_entities: usize,
}

/// Where detailed post data comes from.
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_post(&self, post_id: &str) -> Result<PostDetail>;
}

/// Runs inside the page context: locate the raw post and normalize it.
pub fn detail_from_page(snapshot: &PageSnapshot, post_id: &str, config: &Config) -> Result<PostDetail> {
    let page = Page::parse(snapshot);
    let raw = locate_raw_post(&page, post_id, config.state.max_depth)?;
    Ok(normalize(raw, &config.extract.site_origin))
}
