use crate::config::ExtractConfig;
use crate::page::selectors;
use crate::thread::{base_url, parse_timestamp, Card, Tweet};
use regex::Regex;
use scraper::{ElementRef, Node};
use std::sync::LazyLock;

static STATUS_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([A-Za-z0-9_]+)/status/(\d+)").expect("valid regex"));

/// Media URLs inlined into a post's content while walking it.
#[derive(Debug, Default)]
struct Embedded(Vec<String>);

impl Embedded {
    fn insert(&mut self, url: String) {
        if !self.0.contains(&url) {
            self.0.push(url);
        }
    }

    fn has_base(&self, url: &str) -> bool {
        self.0.iter().any(|e| base_url(e) == base_url(url))
    }

    fn mentions(&self, fragment: &str) -> bool {
        self.0.iter().any(|e| e.contains(fragment))
    }
}

/// Request the large rendition of a media URL when it carries a query string.
pub fn upgrade_media_url(src: &str) -> String {
    if src.contains('?') {
        format!("{}?format=jpg&name=large", base_url(src))
    } else {
        src.to_string()
    }
}

/// Post id and canonical URL from the first status permalink in the post.
pub fn permalink(post: ElementRef<'_>, origin: &str) -> Option<(String, String)> {
    post.select(&selectors::STATUS_LINK).find_map(|link| {
        let href = link.value().attr("href")?;
        let caps = STATUS_PATH_RE.captures(href)?;
        let id = caps[2].to_string();
        let url = format!("{}/{}/status/{}", origin, &caps[1], id);
        Some((id, url))
    })
}

/// Converts one rendered post node into a tweet.
pub fn extract_tweet(post: ElementRef<'_>, config: &ExtractConfig) -> Tweet {
    let mut tweet = Tweet::default();
    let mut embedded = Embedded::default();

    if let Some(text) = post.select(&selectors::POST_TEXT).next() {
        tweet.content = content_text(text, config, &mut embedded);
    }

    if let Some(time) = post.select(&selectors::TIME).next() {
        let raw = match time.value().attr("datetime") {
            Some(datetime) => datetime.to_string(),
            None => time.text().collect(),
        };
        tweet.date = parse_timestamp(&raw);
    }

    if let Some((id, url)) = permalink(post, &config.site_origin) {
        tweet.id = id;
        tweet.url = url;
    }

    for img in post.select(&selectors::IMG) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if !src.contains(config.media_marker.as_str()) {
            continue;
        }
        let src = upgrade_media_url(src);
        if embedded.has_base(&src) || tweet.images.iter().any(|i| base_url(i) == base_url(&src)) {
            continue;
        }
        tweet.images.push(src);
    }

    let mut videos = post.select(&selectors::VIDEO).peekable();
    if videos.peek().is_some() {
        tweet.has_video = true;
        for poster in videos.filter_map(|v| v.value().attr("poster")) {
            let poster_base = base_url(poster);
            if tweet.images.iter().any(|i| i.contains(poster_base)) || embedded.mentions(poster_base)
            {
                continue;
            }
            tweet.images.push(poster.to_string());
        }
    }

    let embed = post
        .select(&selectors::IFRAME)
        .filter_map(|frame| frame.value().attr("src"))
        .find(|src| config.is_video_link(src));
    if let Some(src) = embed {
        tweet.has_video = true;
        tweet.video_url = Some(src.to_string());
    }

    if !tweet.has_video {
        if let Some(card) = post.select(&selectors::CARD).next() {
            apply_card(card, config, &mut tweet);
        }
    }

    tweet
}

/// A card linking to a video host marks the post as video; any other card
/// with both a link and an image is kept as a link preview.
fn apply_card(card: ElementRef<'_>, config: &ExtractConfig, tweet: &mut Tweet) {
    let video_link = card
        .select(&selectors::LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| config.is_video_link(href));
    if let Some(href) = video_link {
        tweet.has_video = true;
        tweet.video_url = Some(href.to_string());
        return;
    }

    let url = card
        .select(&selectors::LINK)
        .next()
        .and_then(|a| a.value().attr("href"));
    let image = card
        .select(&selectors::IMG)
        .next()
        .and_then(|img| img.value().attr("src"));
    if let (Some(url), Some(image)) = (url, image) {
        tweet.card = Some(Card {
            url: url.to_string(),
            image: image.to_string(),
        });
    }
}

/// Flattens a post's rendered text tree, depth first.
fn content_text(element: ElementRef<'_>, config: &ExtractConfig, embedded: &mut Embedded) -> String {
    let mut out = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                match child.value().name() {
                    "img" => {
                        let src = child.value().attr("src").unwrap_or("");
                        if src.contains(config.media_marker.as_str()) {
                            let src = upgrade_media_url(src);
                            out.push_str(&format!("\n\n![Image]({})\n\n", src));
                            embedded.insert(src);
                        } else {
                            // emoji
                            out.push_str(child.value().attr("alt").unwrap_or(""));
                        }
                    }
                    "a" => out.push_str(&link_text(child)),
                    "br" => out.push('\n'),
                    "span" | "div" => out.push_str(&content_text(child, config, embedded)),
                    _ => out.extend(child.text()),
                }
            }
            _ => {}
        }
    }

    out
}

fn is_short_link(href: &str) -> bool {
    href.starts_with("https://t.co/") || href.starts_with("http://t.co/")
}

fn link_text(link: ElementRef<'_>) -> String {
    let href = link.value().attr("href").unwrap_or("");
    let text: String = link.text().collect();

    if is_short_link(href) {
        let expanded = ["data-expanded-url", "title"]
            .iter()
            .filter_map(|attr| link.value().attr(attr))
            .find(|v| !v.is_empty())
            .unwrap_or(href);
        let truncated = text.contains('…') || text.ends_with("...");
        if !truncated && text.starts_with("http") {
            text
        } else {
            expanded.to_string()
        }
    } else if href.starts_with('/') {
        // mentions and hashtags stay as display text
        text
    } else if !href.is_empty() {
        href.to_string()
    } else {
        text
    }
}
