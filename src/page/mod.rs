pub mod selectors;
pub mod state;

use crate::error::Result;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use state::StateTree;

/// Vertical bounds of a rendered node, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub height: f64,
}

/// Captured bounds, indexed by document order of post nodes and headings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub posts: Vec<Rect>,
    #[serde(default)]
    pub headings: Vec<Rect>,
}

/// Everything captured from a live page for one extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    pub html: String,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Ordinal of the post node under the pointer.
    #[serde(default)]
    pub hovered: Option<usize>,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub state: Option<StateTree>,
}

impl PageSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Snapshot of bare markup with no geometry or state.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }
}

/// A parsed view of a snapshot's markup plus its geometry.
pub struct Page<'s> {
    pub snapshot: &'s PageSnapshot,
    document: Html,
    post_bounds: Vec<Rect>,
    heading_bounds: Vec<Rect>,
}

impl<'s> Page<'s> {
    pub fn parse(snapshot: &'s PageSnapshot) -> Self {
        let document = Html::parse_document(&snapshot.html);
        let post_count = document.select(&selectors::POST).count();
        let heading_count = document.select(&selectors::HEADING).count();

        let (post_bounds, heading_bounds) = match &snapshot.layout {
            Some(layout)
                if layout.posts.len() == post_count && layout.headings.len() == heading_count =>
            {
                (layout.posts.clone(), layout.headings.clone())
            }
            layout => {
                if layout.is_some() {
                    tracing::debug!(
                        post_count,
                        heading_count,
                        "captured layout does not match markup, using document order"
                    );
                }
                document_order_bounds(&document)
            }
        };

        Self {
            snapshot,
            document,
            post_bounds,
            heading_bounds,
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn posts(&self) -> Vec<ElementRef<'_>> {
        self.document.select(&selectors::POST).collect()
    }

    pub fn headings(&self) -> Vec<ElementRef<'_>> {
        self.document.select(&selectors::HEADING).collect()
    }

    pub fn post_bounds(&self, ordinal: usize) -> Option<Rect> {
        self.post_bounds.get(ordinal).copied()
    }

    pub fn heading_bounds(&self, ordinal: usize) -> Option<Rect> {
        self.heading_bounds.get(ordinal).copied()
    }

    pub fn viewport_height(&self) -> Option<f64> {
        self.snapshot.viewport.map(|v| v.height)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.snapshot.hovered
    }

    pub fn state(&self) -> Option<&'s StateTree> {
        self.snapshot.state.as_ref()
    }

    /// Ordinal of the post node that is, or contains, `element`.
    pub fn post_ordinal_of(&self, element: ElementRef<'_>) -> Option<usize> {
        let post = closest(element, "article")?;
        self.posts().iter().position(|p| *p == post)
    }
}

/// Nearest inclusive ancestor with the given tag name.
pub fn closest<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    if element.value().name() == tag {
        return Some(element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

/// Lays posts and headings out as consecutive bands in document order.
fn document_order_bounds(document: &Html) -> (Vec<Rect>, Vec<Rect>) {
    let mut posts = Vec::new();
    let mut headings = Vec::new();
    let nodes = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap);

    for (index, element) in nodes.enumerate() {
        let top = index as f64 * 10.0;
        let rect = Rect {
            top,
            bottom: top + 5.0,
        };
        match element.value().name() {
            "article" => posts.push(rect),
            "h2" => headings.push(rect),
            _ => {}
        }
    }

    (posts, headings)
}
