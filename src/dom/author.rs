use crate::page::{closest, selectors};
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static PROFILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([A-Za-z0-9_]+)$").expect("valid regex"));

/// Top-level site paths that look like handles but are not profiles.
const RESERVED_PATHS: &[&str] = &[
    "search",
    "hashtag",
    "i",
    "lists",
    "followers",
    "home",
    "explore",
    "notifications",
    "messages",
    "settings",
];

/// Handle from a profile-shaped path like `/jack`.
fn handle_from_path(href: &str) -> Option<&str> {
    PROFILE_PATH_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn profile_handle(href: &str) -> Option<&str> {
    handle_from_path(href).filter(|handle| !RESERVED_PATHS.contains(handle))
}

/// Link around the avatar image.
fn from_avatar(post: ElementRef<'_>) -> Option<String> {
    let img = post.select(&selectors::AVATAR_IMG).next()?;
    let link = img
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|e| *e != post)
        .find(|e| {
            e.value().name() == "a"
                && e.value().attr("href").is_some_and(|h| h.starts_with('/'))
        })?;
    handle_from_path(link.value().attr("href")?).map(String::from)
}

/// First profile link that renders a user-name span.
fn from_user_name_link(post: ElementRef<'_>) -> Option<String> {
    post.select(&selectors::ROLE_LINK)
        .filter(|link| link.select(&selectors::SPAN).next().is_some())
        .find_map(|link| profile_handle(link.value().attr("href")?).map(String::from))
}

fn from_any_profile_link(post: ElementRef<'_>) -> Option<String> {
    post.select(&selectors::SITE_LINK)
        .find_map(|link| profile_handle(link.value().attr("href")?).map(String::from))
}

/// Author handle of a rendered post, trying each link shape in order.
pub fn author_of(post: ElementRef<'_>) -> Option<String> {
    let post = closest(post, "article").unwrap_or(post);
    let strategies: [fn(ElementRef<'_>) -> Option<String>; 3] =
        [from_avatar, from_user_name_link, from_any_profile_link];
    strategies.iter().find_map(|strategy| strategy(post))
}
