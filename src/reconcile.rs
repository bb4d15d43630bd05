use crate::detail::PostDetail;
use crate::thread::{base_url, inline_images, Thread, Tweet};

/// Merges detailed data for the anchor post into the markup skeleton.
///
/// Only the post whose id matches `detail` changes. Thread-level author and
/// date prefer the detailed values when present, and only when that post is
/// part of the thread.
pub fn reconcile(mut skeleton: Thread, detail: &PostDetail) -> Thread {
    match skeleton.tweets.iter_mut().find(|t| t.id == detail.id) {
        Some(tweet) => {
            merge_tweet(tweet, detail);
            if !detail.author.is_empty() {
                skeleton.author = detail.author.clone();
            }
            if detail.date.is_some() {
                skeleton.date = detail.date;
            }
        }
        None => tracing::debug!(post_id = %detail.id, "detailed post not in skeleton"),
    }

    skeleton
}

fn merge_tweet(tweet: &mut Tweet, detail: &PostDetail) {
    if !detail.text.is_empty() {
        tweet.content = detail.text.clone();
    }

    if detail.is_long_form {
        tweet.images.clear();
    } else if !detail.images.is_empty() {
        tweet.images = dedupe_images(&detail.images, &tweet.content);
    }

    tweet.has_video = detail.has_video;
    tweet.video_url = detail.video_url.clone();
}

/// Drops repeated media (same URL ignoring query) and media already inline
/// in `content`.
fn dedupe_images(images: &[String], content: &str) -> Vec<String> {
    let inline: Vec<&str> = inline_images(content).into_iter().map(base_url).collect();
    let mut kept: Vec<String> = Vec::new();
    for image in images {
        let base = base_url(image);
        if inline.contains(&base) || kept.iter().any(|k| base_url(k) == base) {
            continue;
        }
        kept.push(image.clone());
    }
    kept
}
