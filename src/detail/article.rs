//! Block-structured long-form articles.
//!
//! An article carries a list of text blocks, an entity map that inline ranges
//! point into, and a table of uploaded media. Flattening resolves every
//! entity to an inline image or a markdown link and joins the blocks in
//! document order. All media ends up inline; articles have no separate image
//! list.

use super::probe::{self, Strategy};
use crate::error::ExtractError;
use serde_json::Value;
use std::collections::HashMap;

/// Media id -> image URL, in insertion order so fuzzy lookups are stable.
#[derive(Debug, Default)]
pub struct MediaTable {
    entries: Vec<(String, String)>,
}

impl MediaTable {
    pub fn from_article(article: &Value) -> Self {
        let mut table = Self::default();

        for media in probe::items(article.get("media_entities")) {
            table.add_media(media, None);
        }
        if let Some(cover) = article.get("cover_media") {
            table.add_media(cover, Some("cover"));
        }

        table
    }

    /// Indexes one media entity by its long canonical id and by its short
    /// numeric id when present.
    fn add_media(&mut self, media: &Value, fallback_id: Option<&str>) {
        let Some(url) = probe::str_at(media, &["media_info", "original_img_url"]) else {
            return;
        };

        let long_id = probe::id_at(media, &["media_id_str"])
            .or_else(|| probe::id_at(media, &["id_str"]))
            .or_else(|| probe::id_at(media, &["id"]))
            .or_else(|| fallback_id.map(String::from));
        if let Some(id) = long_id {
            self.insert(id, url);
        }
        if let Some(short_id) = probe::id_at(media, &["media_id"]) {
            self.insert(short_id, url);
        }
    }

    pub fn insert(&mut self, id: String, url: &str) {
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = url.to_string(),
            None => self.entries.push((id, url.to_string())),
        }
    }

    /// Exact id lookup, then the first id that contains or is contained in
    /// `media_id`.
    pub fn resolve(&self, media_id: &str) -> Option<&str> {
        if let Some((_, url)) = self.entries.iter().find(|(k, _)| k == media_id) {
            return Some(url);
        }
        let (key, url) = self
            .entries
            .iter()
            .find(|(k, _)| k.contains(media_id) || media_id.contains(k.as_str()))?;
        tracing::debug!(media_id, matched = %key, "media resolved by partial id");
        Some(url)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What an entity key resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Image(String),
    Link(String),
}

const MEDIA_REF_STRATEGIES: [Strategy<String>; 4] = [
    |data| probe::id_at(data, &["mediaId"]),
    |data| probe::id_at(data, &["id"]),
    |data| probe::id_at(data, &["media_id"]),
    |data| {
        let first = probe::items(data.get("mediaItems")).into_iter().next()?;
        probe::id_at(first, &["mediaId"])
    },
];

const LINK_STRATEGIES: [Strategy<String>; 2] = [
    |data| probe::str_at(data, &["url"]).map(String::from),
    |data| probe::str_at(data, &["href"]).map(String::from),
];

/// Entity key -> resolved fragment for one article.
#[derive(Debug, Default)]
pub struct EntityMap {
    fragments: HashMap<String, Fragment>,
    misses: Vec<ExtractError>,
}

impl EntityMap {
    pub fn build(entity_map: Option<&Value>, media: &MediaTable) -> Self {
        let mut map = Self::default();

        let entries: Vec<(String, &Value)> = match entity_map {
            Some(Value::Object(obj)) => obj.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Some(Value::Array(list)) => list
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        for (key, wrapper) in entries {
            // either {key, value: entity} or the entity itself
            let entity = wrapper.get("value").filter(|v| v.is_object()).unwrap_or(wrapper);
            let entity_key = probe::id_at(wrapper, &["key"]).unwrap_or(key);
            map.add(entity_key, entity, media);
        }

        map
    }

    fn add(&mut self, key: String, entity: &Value, media: &MediaTable) {
        let kind = probe::str_at(entity, &["type"])
            .unwrap_or_default()
            .to_ascii_uppercase();
        let data = entity.get("data").unwrap_or(&Value::Null);

        match kind.as_str() {
            "IMAGE" | "MEDIA" => {
                let Some(media_id) = probe::first_of(data, &MEDIA_REF_STRATEGIES) else {
                    tracing::debug!(entity_key = %key, "media entity without a media id");
                    return;
                };
                match media.resolve(&media_id) {
                    Some(url) => {
                        self.fragments.insert(key, Fragment::Image(url.to_string()));
                    }
                    None => {
                        tracing::warn!(entity_key = %key, %media_id, "unresolved article media");
                        self.misses.push(ExtractError::EntityResolutionMiss {
                            entity_key: key,
                            media_id,
                        });
                    }
                }
            }
            "LINK" => {
                if let Some(url) = probe::first_of(data, &LINK_STRATEGIES) {
                    self.fragments.insert(key, Fragment::Link(url));
                }
            }
            _ => {}
        }
    }

    pub fn get(&self, key: &str) -> Option<&Fragment> {
        self.fragments.get(key)
    }

    pub fn misses(&self) -> &[ExtractError] {
        &self.misses
    }
}

#[derive(Debug, Clone, Copy)]
struct Range<'a> {
    offset: usize,
    length: usize,
    key: Option<&'a Value>,
}

fn entity_ranges(block: &Value) -> Vec<Range<'_>> {
    let mut ranges: Vec<Range<'_>> = probe::items(block.get("entityRanges"))
        .into_iter()
        .map(|r| Range {
            offset: r.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize,
            length: r.get("length").and_then(Value::as_u64).unwrap_or(0) as usize,
            key: r.get("key"),
        })
        .collect();
    ranges.sort_by_key(|r| r.offset);
    ranges
}

/// Block text indexed the way range offsets count: UTF-16 code units.
struct Utf16Text(Vec<u16>);

impl Utf16Text {
    fn new(text: &str) -> Self {
        Self(text.encode_utf16().collect())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.0.len());
        let start = start.min(end);
        String::from_utf16_lossy(&self.0[start..end])
    }
}

fn image_ref(url: &str) -> String {
    format!("![Image]({})", url)
}

/// A flattened article.
#[derive(Debug, Default)]
pub struct ArticleBody {
    pub text: String,
    /// Media URLs placed inline, in order.
    pub inlined: Vec<String>,
    pub misses: Vec<ExtractError>,
}

/// Flattens an article that carries `content_state.blocks`.
pub fn flatten(article: &Value) -> ArticleBody {
    let media = MediaTable::from_article(article);
    let entities = EntityMap::build(probe::at(article, &["content_state", "entityMap"]), &media);
    let blocks = probe::items(probe::at(article, &["content_state", "blocks"]));

    let mut inlined = Vec::new();
    let mut parts: Vec<String> = Vec::new();

    for block in &blocks {
        let kind = probe::str_at(block, &["type"]).unwrap_or("unstyled");
        let ranges = entity_ranges(block);
        let resolve = |range: &Range<'_>| range.key.and_then(probe::as_id).and_then(|k| entities.get(&k));

        if kind == "atomic" {
            for range in &ranges {
                if let Some(Fragment::Image(url)) = resolve(range) {
                    parts.push(image_ref(url));
                    inlined.push(url.clone());
                }
            }
            continue;
        }

        let raw = probe::str_at(block, &["text"]).unwrap_or("");
        if raw.trim().is_empty() && ranges.is_empty() {
            continue;
        }

        let text = Utf16Text::new(raw);
        let mut out = String::new();
        let mut last = 0;
        for range in &ranges {
            if range.offset > last {
                out.push_str(&text.slice(last, range.offset));
            }
            let end = range.offset.saturating_add(range.length);
            let covered = text.slice(range.offset, end);
            match resolve(range) {
                Some(Fragment::Image(url)) => {
                    out.push_str(&format!("\n\n{}\n\n", image_ref(url)));
                    inlined.push(url.clone());
                }
                Some(Fragment::Link(url)) => out.push_str(&format!("[{}]({})", covered, url)),
                None => out.push_str(&covered),
            }
            last = end;
        }
        if last < text.len() {
            out.push_str(&text.slice(last, text.len()));
        }

        let out = out.trim();
        if !out.is_empty() {
            parts.push(out.to_string());
        }
    }

    let title = probe::str_at(article, &["title"])
        .map(|t| format!("# {}\n\n", t))
        .unwrap_or_default();

    tracing::debug!(
        blocks = blocks.len(),
        parts = parts.len(),
        images = inlined.len(),
        media_known = !media.is_empty(),
        "article flattened"
    );

    ArticleBody {
        text: title + &parts.join("\n\n"),
        inlined,
        misses: entities.misses().to_vec(),
    }
}
