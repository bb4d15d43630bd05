use scraper::Selector;
use std::sync::LazyLock;

fn parse(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

pub static POST: LazyLock<Selector> = LazyLock::new(|| parse("article"));
pub static HEADING: LazyLock<Selector> = LazyLock::new(|| parse("h2"));
pub static LINK: LazyLock<Selector> = LazyLock::new(|| parse("a"));
pub static IMG: LazyLock<Selector> = LazyLock::new(|| parse("img"));
pub static SPAN: LazyLock<Selector> = LazyLock::new(|| parse("span"));
pub static TIME: LazyLock<Selector> = LazyLock::new(|| parse("time"));
pub static VIDEO: LazyLock<Selector> = LazyLock::new(|| parse("video"));
pub static IFRAME: LazyLock<Selector> = LazyLock::new(|| parse("iframe[src]"));
pub static POST_TEXT: LazyLock<Selector> =
    LazyLock::new(|| parse(r#"[data-testid="tweetText"]"#));
pub static CARD: LazyLock<Selector> = LazyLock::new(|| parse(r#"[data-testid="card.wrapper"]"#));
pub static AVATAR_IMG: LazyLock<Selector> = LazyLock::new(|| {
    parse(r#"a[href^="/"][role="link"] img[src*="profile_images"]"#)
});
pub static ROLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| parse(r#"a[href^="/"][role="link"]"#));
pub static SITE_LINK: LazyLock<Selector> = LazyLock::new(|| parse(r#"a[href^="/"]"#));
pub static STATUS_LINK: LazyLock<Selector> = LazyLock::new(|| parse(r#"a[href*="/status/"]"#));
