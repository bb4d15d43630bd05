//! Finds the host's raw object for one post: the rendered node that shows
//! it, that node's state handle, and the nearest ancestor state node
//! carrying a post payload.
//!
//! The state graph is undocumented and changes between host versions, so
//! every miss here is a reportable failure rather than a bug.

use crate::error::{ExtractError, Result};
use crate::page::state::{NodeId, StateGraph};
use crate::page::{selectors, Page};
use serde_json::Value;
use std::collections::HashSet;

/// Property under which the host passes a post to its components.
const PAYLOAD_KEY: &str = "tweet";

fn is_permalink_to(href: &str, post_id: &str) -> bool {
    let needle = format!("/status/{}", post_id);
    href.match_indices(&needle).any(|(at, _)| {
        matches!(
            href[at + needle.len()..].chars().next(),
            None | Some('/') | Some('?') | Some('#')
        )
    })
}

/// Ordinal of the rendered post node for `post_id`: the one holding its
/// permalink, else any post mentioning the id in a link, else the first.
pub fn locate_post_node(page: &Page<'_>, post_id: &str) -> Option<usize> {
    let permalink = page
        .document()
        .select(&selectors::LINK)
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| is_permalink_to(href, post_id))
        })
        .find_map(|a| page.post_ordinal_of(a));
    if permalink.is_some() {
        return permalink;
    }

    let posts = page.posts();
    let mentioned = posts.iter().position(|post| {
        post.select(&selectors::LINK)
            .filter_map(|a| a.value().attr("href"))
            .any(|href| href.contains(post_id))
    });
    if mentioned.is_some() {
        tracing::debug!(post_id, "no permalink match, using post that mentions the id");
        return mentioned;
    }

    if posts.is_empty() {
        None
    } else {
        tracing::debug!(post_id, "post id not found in markup, using first post");
        Some(0)
    }
}

fn payload_in(props: &Value) -> Option<&Value> {
    props
        .get(PAYLOAD_KEY)
        .or_else(|| props.get("props").and_then(|p| p.get(PAYLOAD_KEY)))
        .filter(|v| v.is_object())
}

/// First post payload on the way from `start` up to the root, looking at
/// no more than `max_depth` ancestors.
pub fn find_payload<G: StateGraph>(graph: &G, start: NodeId, max_depth: usize) -> Option<&Value> {
    let mut visited = HashSet::new();
    let mut current = Some(start);
    let mut depth = 0;

    while let Some(node) = current {
        if depth > max_depth || !visited.insert(node) {
            break;
        }
        if let Some(payload) = graph.props(node).and_then(payload_in) {
            tracing::debug!(node, depth, "post payload found in page state");
            return Some(payload);
        }
        current = graph.parent(node);
        depth += 1;
    }

    None
}

/// The host's raw object for `post_id`.
pub fn locate_raw_post<'s>(page: &Page<'s>, post_id: &str, max_depth: usize) -> Result<&'s Value> {
    let ordinal = locate_post_node(page, post_id).ok_or(ExtractError::NoAnchorFound)?;

    let missing = || ExtractError::StateHandleMissing {
        post_id: post_id.to_string(),
    };
    let state = page.state().ok_or_else(missing)?;
    let handle = state.handle_for(ordinal).ok_or_else(missing)?;

    find_payload(state, handle, max_depth).ok_or_else(|| ExtractError::PayloadNotFound {
        post_id: post_id.to_string(),
        depth: max_depth,
    })
}
