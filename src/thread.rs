use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static INLINE_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[Image\]\(([^)]*)\)").expect("valid regex"));

/// A link-preview card attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub url: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
    pub url: String,
    pub images: Vec<String>,
    pub has_video: bool,
    /// May stay `None` while `has_video` is set: the video was seen but no
    /// playable URL could be resolved.
    pub video_url: Option<String>,
    pub card: Option<Card>,
}

/// Same-author posts extracted together, earliest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub author: String,
    pub url: String,
    pub anchor_id: String,
    pub date: Option<DateTime<Utc>>,
    pub is_thread: bool,
    pub tweets: Vec<Tweet>,
}

impl Thread {
    /// Builds a thread from collected posts, ordering them by date and
    /// mirroring the earliest post into the thread-level fields.
    pub fn from_tweets(author: String, mut tweets: Vec<Tweet>) -> Self {
        sort_by_date(&mut tweets);

        let (url, anchor_id, date) = match tweets.first() {
            Some(first) => (first.url.clone(), first.id.clone(), first.date),
            None => (String::new(), String::new(), None),
        };

        Self {
            author,
            url,
            anchor_id,
            date,
            is_thread: tweets.len() > 1,
            tweets,
        }
    }
}

/// Stable ascending sort; undated posts go last.
pub fn sort_by_date(tweets: &mut [Tweet]) {
    tweets.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Parses a rendered `datetime` attribute (RFC 3339) or a raw post's
/// `created_at` (`Wed Oct 10 20:19:24 +0000 2018`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

/// URL without its query string, used to compare media variants.
pub fn base_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Inline image references (`![Image](url)`) embedded in `content`.
pub fn inline_images(content: &str) -> Vec<&str> {
    INLINE_IMAGE_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tweet(id: &str, date: Option<DateTime<Utc>>) -> Tweet {
        Tweet {
            id: id.to_string(),
            url: format!("https://x.com/alice/status/{}", id),
            date,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_tweets_orders_and_mirrors_first() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let thread = Thread::from_tweets(
            "alice".to_string(),
            vec![tweet("2", Some(late)), tweet("1", Some(early))],
        );

        assert!(thread.is_thread);
        assert_eq!(thread.anchor_id, "1");
        assert_eq!(thread.url, "https://x.com/alice/status/1");
        assert_eq!(thread.date, Some(early));
        assert_eq!(thread.tweets[1].id, "2");
    }

    #[test]
    fn test_undated_posts_sort_last() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut tweets = vec![tweet("a", None), tweet("b", Some(date))];
        sort_by_date(&mut tweets);
        assert_eq!(tweets[0].id, "b");
    }

    #[test]
    fn test_single_post_is_not_a_thread() {
        let thread = Thread::from_tweets("alice".to_string(), vec![tweet("1", None)]);
        assert!(!thread.is_thread);
    }

    #[test]
    fn test_serializes_camel_case() {
        let thread = Thread::from_tweets("alice".to_string(), vec![tweet("1", None)]);
        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json["anchorId"], "1");
        assert_eq!(json["isThread"], false);
        assert_eq!(json["tweets"][0]["hasVideo"], false);
        assert!(json["tweets"][0]["videoUrl"].is_null());
    }

    #[test]
    fn test_inline_images() {
        let content = "a\n\n![Image](https://pbs.twimg.com/media/x?name=large)\n\nb ![Image](u2)";
        assert_eq!(
            inline_images(content),
            vec!["https://pbs.twimg.com/media/x?name=large", "u2"]
        );
        assert!(inline_images("no images").is_empty());
        assert!(inline_images("![Image](unterminated").is_empty());
        assert!(inline_images("[link](https://a) ![Alt](b)").is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap();
        assert_eq!(parse_timestamp("2018-10-10T20:19:24.000Z"), Some(expected));
        assert_eq!(parse_timestamp("Wed Oct 10 20:19:24 +0000 2018"), Some(expected));
        assert_eq!(parse_timestamp("3h"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("https://a/b?x=1"), "https://a/b");
        assert_eq!(base_url("https://a/b"), "https://a/b");
    }
}
