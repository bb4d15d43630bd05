use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use x2md::thread::{base_url, inline_images};
use x2md::{Bridge, Config, ExtractError, PageSnapshot};

fn post_html(author: &str, id: &str, date: &str, body: &str) -> String {
    format!(
        r#"<article>
            <a href="/{author}" role="link"><div><img src="https://pbs.twimg.com/profile_images/1/{author}.jpg"></div></a>
            <a href="/{author}" role="link"><span>{author}</span></a>
            <a href="/{author}/status/{id}"><time datetime="{date}">t</time></a>
            <div data-testid="tweetText">{body}</div>
        </article>"#
    )
}

fn page_html() -> String {
    [
        post_html(
            "alice",
            "102",
            "2024-02-01T10:02:00.000Z",
            r#"<span>part three</span><img src="https://pbs.twimg.com/media/C?format=png&amp;name=small">"#,
        ),
        post_html("alice", "100", "2024-02-01T10:00:00.000Z", "<span>part one, trunc…</span>"),
        post_html("bob", "150", "2024-02-01T10:01:30.000Z", "<span>nice thread</span>"),
        post_html("alice", "101", "2024-02-01T10:01:00.000Z", "<span>part two</span>"),
        "<h2>Discover more</h2>".to_string(),
        post_html("alice", "900", "2023-01-01T00:00:00.000Z", "<span>older, recommended</span>"),
    ]
    .concat()
}

fn snapshot(anchor_payload: Value) -> PageSnapshot {
    let raw = json!({
        "url": "https://x.com/alice/status/100",
        "html": page_html(),
        "state": {
            "nodes": [
                { "id": 1, "return": 2, "memoizedProps": { "children": [] } },
                { "id": 2, "return": 3, "memoizedProps": null },
                { "id": 3, "return": null, "memoizedProps": { "props": { "tweet": anchor_payload } } }
            ],
            "handles": { "1": 1 }
        }
    });
    PageSnapshot::from_json(&raw.to_string()).unwrap()
}

fn video_payload() -> Value {
    json!({
        "rest_id": "100",
        "core": { "user_results": { "result": { "legacy": { "screen_name": "alice", "name": "Alice" } } } },
        "note_tweet": { "note_tweet_results": { "result": { "text": "part one, in full" } } },
        "legacy": {
            "id_str": "100",
            "created_at": "Thu Feb 01 10:00:00 +0000 2024",
            "full_text": "part one, trunc…",
            "extended_entities": { "media": [{
                "type": "video",
                "media_url_https": "https://pbs.twimg.com/ext_tw_video_thumb/100/pu/img/v.jpg",
                "video_info": { "variants": [
                    { "content_type": "video/mp4", "bitrate": 256000, "url": "https://video.twimg.com/low.mp4" },
                    { "content_type": "video/mp4", "bitrate": 2176000, "url": "https://video.twimg.com/high.mp4" }
                ]}
            }]}
        }
    })
}

fn bridge(timeout_ms: u64) -> Bridge {
    Bridge::new(&Config::default().bridge).with_timeout(Duration::from_millis(timeout_ms))
}

fn assert_thread_invariants(thread: &x2md::Thread) {
    let dates: Vec<_> = thread.tweets.iter().map(|t| t.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let ids: HashSet<&str> = thread.tweets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), thread.tweets.len());
    assert_eq!(thread.is_thread, thread.tweets.len() > 1);

    for tweet in &thread.tweets {
        for inline in inline_images(&tweet.content) {
            assert!(tweet.images.iter().all(|i| base_url(i) != base_url(inline)));
        }
    }
}

#[tokio::test]
async fn thread_is_enriched_from_page_state() {
    let config = Config::default();
    let snapshot = snapshot(video_payload());
    let bridge = bridge(2000);
    let _page = bridge.attach_page(snapshot.clone(), config.clone());

    let extraction = x2md::extract(&snapshot, &bridge, &config).await.unwrap();
    assert!(extraction.degraded.is_none());

    let thread = &extraction.thread;
    assert_thread_invariants(thread);
    assert_eq!(thread.author, "alice");
    assert_eq!(thread.anchor_id, "100");
    assert_eq!(thread.url, "https://x.com/alice/status/100");

    let ids: Vec<&str> = thread.tweets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["100", "101", "102"]);

    let anchor = &thread.tweets[0];
    assert_eq!(anchor.content, "part one, in full");
    assert!(anchor.has_video);
    assert_eq!(anchor.video_url.as_deref(), Some("https://video.twimg.com/high.mp4"));
    assert_eq!(
        anchor.images,
        vec!["https://pbs.twimg.com/ext_tw_video_thumb/100/pu/img/v.jpg"]
    );

    let last = &thread.tweets[2];
    assert!(last.content.contains("![Image](https://pbs.twimg.com/media/C?format=jpg&name=large)"));
    assert!(last.images.is_empty());
    assert!(!last.has_video);
}

#[tokio::test]
async fn article_media_stays_inline() {
    let payload = json!({
        "rest_id": "100",
        "core": { "user_results": { "result": { "legacy": { "screen_name": "alice", "name": "Alice" } } } },
        "legacy": { "id_str": "100", "full_text": "https://t.co/article" },
        "article": {
            "title": "On Threads",
            "media_entities": [{
                "media_id_str": "1700000000000000777",
                "media_id": "777",
                "media_info": { "original_img_url": "https://pbs.twimg.com/media/ART.jpg" }
            }],
            "content_state": {
                "entityMap": {
                    "0": { "type": "MEDIA", "data": { "mediaItems": [{ "mediaId": "777" }] } },
                    "1": { "type": "MEDIA", "data": { "mediaId": "2345" } }
                },
                "blocks": [
                    { "type": "unstyled", "text": "Opening.", "entityRanges": [] },
                    { "type": "atomic", "text": " ", "entityRanges": [{ "offset": 0, "length": 1, "key": 0 }] },
                    { "type": "unstyled", "text": "Missing [img] here.", "entityRanges": [{ "offset": 8, "length": 5, "key": 1 }] }
                ]
            }
        }
    });
    let config = Config::default();
    let snapshot = snapshot(payload);
    let bridge = bridge(2000);
    let _page = bridge.attach_page(snapshot.clone(), config.clone());

    let thread = x2md::extract(&snapshot, &bridge, &config).await.unwrap().thread;
    assert_thread_invariants(&thread);

    let anchor = &thread.tweets[0];
    assert_eq!(
        anchor.content,
        "# On Threads\n\nOpening.\n\n![Image](https://pbs.twimg.com/media/ART.jpg)\n\nMissing [img] here."
    );
    assert!(anchor.images.is_empty());
}

#[tokio::test]
async fn silent_page_times_out_to_skeleton() {
    let config = Config::default();
    let snapshot = snapshot(video_payload());
    let bridge = bridge(100);

    let extraction = x2md::extract(&snapshot, &bridge, &config).await.unwrap();
    assert_eq!(
        extraction.degraded,
        Some(ExtractError::FetchTimeout {
            post_id: "100".to_string(),
            timeout_ms: 100
        })
    );
    assert_thread_invariants(&extraction.thread);
    assert_eq!(extraction.thread.tweets.len(), 3);
    assert_eq!(extraction.thread.tweets[0].content, "part one, trunc…");
    assert!(!extraction.thread.tweets[0].has_video);
}

#[tokio::test]
async fn missing_state_falls_back_to_skeleton() {
    let config = Config::default();
    let snapshot = PageSnapshot::from_html(page_html());
    let bridge = bridge(2000);
    let _page = bridge.attach_page(snapshot.clone(), config.clone());

    let extraction = x2md::extract(&snapshot, &bridge, &config).await.unwrap();
    assert!(matches!(
        extraction.degraded,
        Some(ExtractError::StateHandleMissing { .. })
    ));
    assert_eq!(extraction.thread.tweets.len(), 3);
}

#[test]
fn skeleton_is_idempotent() {
    let snapshot = snapshot(video_payload());
    let config = Config::default();
    let first = x2md::extract_skeleton(&snapshot, &config).unwrap();
    let second = x2md::extract_skeleton(&snapshot, &config).unwrap();
    assert_eq!(first, second);
    assert!(first.tweets.iter().all(|t| t.id != "900"));
}
