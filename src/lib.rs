//! Extracts a post and its same-author thread from a rendered X/Twitter page
//! snapshot and normalizes it into a renderer-agnostic [`Thread`] record.
//!
//! Two sources feed the record: the rendered markup ([`dom`]) and the host
//! application's internal state, reached through the page context over a
//! message [`bridge`] ([`detail`]). [`reconcile`] merges the two.

pub mod bridge;
pub mod config;
pub mod detail;
pub mod dom;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod reconcile;
pub mod thread;

pub use bridge::{Bridge, PageContext};
pub use config::Config;
pub use detail::{DetailSource, PostDetail};
pub use error::{ExtractError, Result};
pub use page::PageSnapshot;
pub use pipeline::{extract, extract_skeleton, Extraction, Status};
pub use thread::{Card, Thread, Tweet};
