use crate::config::Config;
use crate::detail::DetailSource;
use crate::dom::RenderedExtractor;
use crate::error::{ExtractError, Result};
use crate::page::{Page, PageSnapshot};
use crate::reconcile::reconcile;
use crate::thread::Thread;

/// The final record of one extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub thread: Thread,
    /// Why the detailed fetch was skipped, when the thread is markup-only.
    pub degraded: Option<ExtractError>,
}

/// User-visible outcome of an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub success: bool,
    pub message: String,
}

impl Extraction {
    pub fn status(&self) -> Status {
        let count = self.thread.tweets.len();
        let message = match &self.degraded {
            None => format!("Extracted {} post(s) by @{}", count, self.thread.author),
            Some(err) => format!(
                "Extracted {} post(s) by @{} from page markup only: {}",
                count, self.thread.author, err
            ),
        };
        Status {
            success: true,
            message,
        }
    }
}

impl Status {
    pub fn failure(err: &ExtractError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
        }
    }
}

/// Markup-only thread skeleton.
pub fn extract_skeleton(snapshot: &PageSnapshot, config: &Config) -> Result<Thread> {
    let page = Page::parse(snapshot);
    let thread = RenderedExtractor::new(&config.extract).extract_thread(&page)?;
    if thread.anchor_id.is_empty() {
        return Err(ExtractError::NoPostId);
    }
    Ok(thread)
}

/// Extracts the thread on the page, enriching the anchor post with detailed
/// data from `source`. Detailed-fetch failures only degrade the result.
pub async fn extract(
    snapshot: &PageSnapshot,
    source: &dyn DetailSource,
    config: &Config,
) -> Result<Extraction> {
    let skeleton = extract_skeleton(snapshot, config)?;
    tracing::info!(
        author = %skeleton.author,
        anchor = %skeleton.anchor_id,
        posts = skeleton.tweets.len(),
        "thread skeleton extracted"
    );

    match source.fetch_post(&skeleton.anchor_id).await {
        Ok(detail) => {
            if detail.unresolved_entities > 0 {
                tracing::warn!(
                    count = detail.unresolved_entities,
                    "some article media kept as plain text"
                );
            }
            Ok(Extraction {
                thread: reconcile(skeleton, &detail),
                degraded: None,
            })
        }
        Err(err) => {
            tracing::warn!(error = %err, "detailed fetch failed, using page markup only");
            Ok(Extraction {
                thread: skeleton,
                degraded: Some(err),
            })
        }
    }
}
