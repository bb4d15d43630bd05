//! Thread extraction from rendered markup alone.

pub mod author;
pub mod tweet;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::page::{Page, Rect};
use crate::thread::Thread;
use std::collections::HashSet;

pub use author::author_of;
pub use tweet::extract_tweet;

/// Section headings of a page, flagged when they open a "discover more" area.
struct Sections {
    headings: Vec<(bool, Rect)>,
}

impl Sections {
    fn new(page: &Page<'_>, config: &ExtractConfig) -> Self {
        let headings = page
            .headings()
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let text: String = h.text().collect();
                Some((config.is_discover_heading(&text), page.heading_bounds(i)?))
            })
            .collect();
        Self { headings }
    }

    /// A post sits in a discover section when a discover heading ends above
    /// it and no other heading lies between the two.
    fn is_discover(&self, post: Rect) -> bool {
        self.headings
            .iter()
            .filter(|(discover, h)| *discover && h.bottom < post.top)
            .any(|(_, h)| {
                !self
                    .headings
                    .iter()
                    .any(|(_, other)| other.top > h.bottom && other.bottom < post.top)
            })
    }
}

pub struct RenderedExtractor<'c> {
    config: &'c ExtractConfig,
}

impl<'c> RenderedExtractor<'c> {
    pub fn new(config: &'c ExtractConfig) -> Self {
        Self { config }
    }

    /// Builds the thread skeleton for the post the user is looking at.
    pub fn extract_thread(&self, page: &Page<'_>) -> Result<Thread> {
        let sections = Sections::new(page, self.config);
        let excluded = |ordinal: usize| {
            page.post_bounds(ordinal)
                .is_some_and(|rect| sections.is_discover(rect))
        };

        let anchor = self
            .locate_anchor(page, &excluded)
            .ok_or(ExtractError::NoAnchorFound)?;
        let posts = page.posts();
        let author = posts
            .get(anchor)
            .and_then(|post| author_of(*post))
            .ok_or(ExtractError::NoAuthorFound)?;
        tracing::debug!(anchor, %author, "anchor post located");

        let mut seen = HashSet::new();
        let mut tweets = Vec::new();
        for (ordinal, post) in posts.iter().enumerate() {
            if excluded(ordinal) {
                continue;
            }
            if author_of(*post).as_deref() != Some(author.as_str()) {
                continue;
            }
            let tweet = extract_tweet(*post, self.config);
            if !tweet.id.is_empty() && seen.insert(tweet.id.clone()) {
                tweets.push(tweet);
            }
        }
        tracing::debug!(count = tweets.len(), "collected posts by author");

        Ok(Thread::from_tweets(author, tweets))
    }

    /// Ordinal of the anchor post: hovered, then straddling the viewport
    /// center, then first visible, then first outside discover sections.
    fn locate_anchor(&self, page: &Page<'_>, excluded: &dyn Fn(usize) -> bool) -> Option<usize> {
        let count = page.posts().len();

        if let Some(hovered) = page.hovered().filter(|h| *h < count) {
            if !excluded(hovered) {
                return Some(hovered);
            }
        }

        let main: Vec<usize> = (0..count).filter(|i| !excluded(*i)).collect();
        if main.is_empty() {
            return (count > 0).then_some(0);
        }

        if let Some(height) = page.viewport_height() {
            let center = height / 2.0;
            let bounds = |i: &usize| page.post_bounds(*i);

            let centered = main
                .iter()
                .find(|i| bounds(i).is_some_and(|r| r.top < center && r.bottom > center));
            if let Some(i) = centered {
                return Some(*i);
            }

            let visible = main
                .iter()
                .find(|i| bounds(i).is_some_and(|r| r.top >= 0.0 && r.top < height));
            if let Some(i) = visible {
                return Some(*i);
            }
        }

        main.first().copied()
    }
}
