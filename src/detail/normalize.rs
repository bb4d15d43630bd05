use super::article;
use super::media::{collect_media, post_author, PostMedia};
use super::probe::{self, Strategy};
use super::PostDetail;
use crate::thread::parse_timestamp;
use serde_json::Value;

/// The three ways a host post can carry its text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentEncoding<'a> {
    /// Block-structured long-form article.
    Article(&'a Value),
    /// Long-form note text.
    Note(&'a str),
    Plain(&'a str),
}

impl<'a> ContentEncoding<'a> {
    /// Picks the richest encoding present: article blocks, then note text,
    /// then the legacy text field.
    pub fn classify(post: &'a Value, legacy: &'a Value) -> Self {
        let article = post.get("article").or_else(|| legacy.get("article"));
        if let Some(article) = article {
            if probe::at(article, &["content_state", "blocks"]).is_some_and(Value::is_array) {
                return ContentEncoding::Article(article);
            }
        }

        let note = post.get("note_tweet").or_else(|| legacy.get("note_tweet"));
        if let Some(text) = note.and_then(|n| probe::str_at(n, &["note_tweet_results", "result", "text"])) {
            return ContentEncoding::Note(text);
        }

        let text = probe::str_at(legacy, &["full_text"])
            .or_else(|| probe::str_at(legacy, &["text"]))
            .unwrap_or("");
        ContentEncoding::Plain(text)
    }
}

/// Steps through visibility wrappers (`{ "__typename": ..., "tweet": {...} }`).
fn unwrap_post(post: &Value) -> &Value {
    match (probe::str_at(post, &["__typename"]), post.get("tweet")) {
        (Some(kind), Some(inner)) if kind != "Tweet" && inner.is_object() => inner,
        _ => post,
    }
}

const ID_STRATEGIES: [Strategy<String>; 3] = [
    |post| probe::id_at(post, &["legacy", "id_str"]),
    |post| probe::id_at(post, &["id_str"]),
    |post| probe::id_at(post, &["rest_id"]),
];

const DATE_STRATEGIES: [Strategy<String>; 2] = [
    |post| probe::str_at(post, &["legacy", "created_at"]).map(String::from),
    |post| probe::str_at(post, &["created_at"]).map(String::from),
];

/// Flattens a raw post object into text and media, whatever its encoding.
pub fn normalize(raw: &Value, site_origin: &str) -> PostDetail {
    let post = unwrap_post(raw);
    let legacy = post.get("legacy").filter(|l| l.is_object()).unwrap_or(post);

    let mut detail = PostDetail::default();

    match ContentEncoding::classify(post, legacy) {
        ContentEncoding::Article(article) => {
            let body = article::flatten(article);
            detail.text = body.text;
            detail.unresolved_entities = body.misses.len();
            detail.is_long_form = true;
        }
        ContentEncoding::Note(text) => {
            detail.text = text.to_string();
            apply_media(&mut detail, collect_media(legacy));
        }
        ContentEncoding::Plain(text) => {
            detail.text = text.to_string();
            apply_media(&mut detail, collect_media(legacy));
        }
    }

    if let Some(author) = post_author(post) {
        detail.author = author.handle;
        detail.author_name = author.name;
    }
    detail.id = probe::first_of(post, &ID_STRATEGIES).unwrap_or_default();
    detail.date = probe::first_of(post, &DATE_STRATEGIES).and_then(|d| parse_timestamp(&d));

    let handle = if detail.author.is_empty() {
        "i"
    } else {
        detail.author.as_str()
    };
    detail.url = format!("{}/{}/status/{}", site_origin, handle, detail.id);

    detail
}

fn apply_media(detail: &mut PostDetail, media: PostMedia) {
    detail.images = media.images;
    detail.has_video = media.has_video;
    detail.video_url = media.video_url;
}
