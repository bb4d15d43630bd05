use super::probe::{self, Strategy};
use serde_json::Value;

/// Photos, video previews and the chosen playable video of a post.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PostMedia {
    pub images: Vec<String>,
    pub has_video: bool,
    pub video_url: Option<String>,
}

/// Highest-bitrate MP4 variant; the first one wins ties.
fn best_mp4_variant(media: &Value) -> Option<String> {
    let mut best: Option<(u64, &str)> = None;
    for variant in probe::items(probe::at(media, &["video_info", "variants"])) {
        if probe::str_at(variant, &["content_type"]) != Some("video/mp4") {
            continue;
        }
        let (Some(bitrate), Some(url)) = (
            variant.get("bitrate").and_then(Value::as_u64),
            probe::str_at(variant, &["url"]),
        ) else {
            continue;
        };
        if best.map_or(true, |(top, _)| bitrate > top) {
            best = Some((bitrate, url));
        }
    }
    best.map(|(_, url)| url.to_string())
}

/// Classifies the media entities of a post's legacy record.
pub fn collect_media(legacy: &Value) -> PostMedia {
    let entities = probe::at(legacy, &["extended_entities", "media"])
        .or_else(|| probe::at(legacy, &["entities", "media"]));

    let mut media = PostMedia::default();
    for entity in probe::items(entities) {
        let preview = probe::str_at(entity, &["media_url_https"]);
        match probe::str_at(entity, &["type"]) {
            Some("photo") => {
                if let Some(url) = preview {
                    media.images.push(url.to_string());
                }
            }
            Some("video") | Some("animated_gif") => {
                media.has_video = true;
                if let Some(url) = preview {
                    media.images.push(url.to_string());
                }
                if let Some(url) = best_mp4_variant(entity) {
                    media.video_url = Some(url);
                }
            }
            _ => {}
        }
    }
    media
}

/// Handle and display name of a post's author.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PostAuthor {
    pub handle: String,
    pub name: String,
}

fn user_at(post: &Value, path: &[&str]) -> Option<PostAuthor> {
    let user = probe::at(post, path)?;
    let handle = probe::str_at(user, &["screen_name"])?;
    Some(PostAuthor {
        handle: handle.to_string(),
        name: probe::str_at(user, &["name"]).unwrap_or_default().to_string(),
    })
}

const AUTHOR_STRATEGIES: [Strategy<PostAuthor>; 3] = [
    |post| user_at(post, &["core", "user_results", "result", "legacy"]),
    |post| user_at(post, &["core", "user_results", "result", "core"]),
    |post| user_at(post, &["user"]),
];

pub fn post_author(post: &Value) -> Option<PostAuthor> {
    probe::first_of(post, &AUTHOR_STRATEGIES)
}
