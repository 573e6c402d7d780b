use std::sync::Arc;
use std::time::{Duration, Instant};

use feedloom::app::FeedloomError;
use feedloom::fetcher::memory::MemoryFetcher;
use feedloom::fetcher::parallel::ParallelFetcher;
use feedloom::normalizer::Normalizer;

const TECH_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Tech Daily</title>
    <link>https://tech.example.com</link>
    <description>Technology news</description>
    <item>
      <title>Winter release</title>
      <link>https://tech.example.com/winter</link>
      <guid>tech-winter</guid>
      <pubDate>Mon, 01 Jan 2024 08:00:00 GMT</pubDate>
      <description>&lt;p&gt;Cold &lt;b&gt;news&lt;/b&gt;&lt;/p&gt;</description>
    </item>
    <item>
      <title>Undated note</title>
      <link>https://tech.example.com/note</link>
      <guid>tech-note</guid>
    </item>
  </channel>
</rss>"#;

const SCIENCE_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Science Weekly</title>
  <id>urn:uuid:science</id>
  <updated>2024-06-01T12:00:00Z</updated>
  <link href="https://science.example.com/"/>
  <entry>
    <title>Summer discovery</title>
    <id>science-summer</id>
    <link href="https://science.example.com/summer"/>
    <author><name>Grace</name></author>
    <published>2024-06-01T12:00:00Z</published>
    <updated>2024-06-01T12:00:00Z</updated>
    <summary>Warm results</summary>
  </entry>
</feed>"#;

const TECH_URL: &str = "https://tech.example.com/rss";
const SCIENCE_URL: &str = "https://science.example.com/atom";
const BROKEN_URL: &str = "https://broken.example.com/rss";

fn aggregator(fetcher: MemoryFetcher) -> (Arc<MemoryFetcher>, ParallelFetcher) {
    let fetcher = Arc::new(fetcher);
    (
        fetcher.clone(),
        ParallelFetcher::new(fetcher, Normalizer::new()),
    )
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

#[tokio::test]
async fn failing_feed_is_dropped_and_others_survive() {
    let (_, parallel) = aggregator(
        MemoryFetcher::new()
            .with_body(TECH_URL, TECH_RSS)
            .with_body(SCIENCE_URL, SCIENCE_ATOM),
    );

    let single = parallel.fetch_feed(BROKEN_URL).await.unwrap_err();
    assert!(single.to_string().contains("404"));

    let aggregated = parallel
        .fetch_all(&urls(&[TECH_URL, BROKEN_URL, SCIENCE_URL]))
        .await
        .unwrap();

    let feed_urls: Vec<&str> = aggregated.feeds.iter().map(|f| f.url.as_str()).collect();
    assert_eq!(feed_urls, vec![TECH_URL, SCIENCE_URL]);
    assert_eq!(aggregated.items.len(), 3);
    assert!(aggregated
        .items
        .iter()
        .all(|a| !a.link.contains("broken.example.com")));
}

#[tokio::test]
async fn empty_url_list_is_rejected_before_fetching() {
    let (fetcher, parallel) = aggregator(MemoryFetcher::new().with_body(TECH_URL, TECH_RSS));

    let err = parallel.fetch_all(&[]).await.unwrap_err();

    assert!(matches!(err, FeedloomError::InvalidInput(_)));
    assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test]
async fn items_sorted_newest_first_with_undated_last() {
    let (_, parallel) = aggregator(
        MemoryFetcher::new()
            .with_body(TECH_URL, TECH_RSS)
            .with_body(SCIENCE_URL, SCIENCE_ATOM),
    );

    let aggregated = parallel
        .fetch_all(&urls(&[TECH_URL, SCIENCE_URL]))
        .await
        .unwrap();

    let guids: Vec<&str> = aggregated.items.iter().map(|a| a.guid.as_str()).collect();
    assert_eq!(guids, vec!["science-summer", "tech-winter", "tech-note"]);
    assert!(aggregated.items[2].pub_date.is_none());
}

#[tokio::test]
async fn slow_feeds_are_fetched_in_one_wave() {
    let delay = Duration::from_millis(400);
    let feed_urls: Vec<String> = (0..12)
        .map(|i| format!("https://slow{i}.example.com/rss"))
        .collect();
    let mut fetcher = MemoryFetcher::new();
    for url in &feed_urls {
        fetcher = fetcher.with_body(url, TECH_RSS).with_delay(url, delay);
    }
    let (fetcher, parallel) = aggregator(fetcher);

    let started = Instant::now();
    let aggregated = parallel.fetch_all(&feed_urls).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(aggregated.feeds.len(), 12);
    assert_eq!(fetcher.request_count(), 12);
    assert!(elapsed < delay * 2, "took {elapsed:?}");
}

#[tokio::test]
async fn shared_item_appears_once_across_feeds() {
    let mirror = TECH_RSS.replace("Tech Daily", "Tech Mirror");
    let mirror_url = "https://mirror.example.com/rss";
    let (_, parallel) = aggregator(
        MemoryFetcher::new()
            .with_body(TECH_URL, TECH_RSS)
            .with_body(mirror_url, mirror),
    );

    let aggregated = parallel
        .fetch_all(&urls(&[TECH_URL, mirror_url]))
        .await
        .unwrap();

    let guids: Vec<&str> = aggregated.items.iter().map(|a| a.guid.as_str()).collect();
    assert_eq!(guids, vec!["tech-winter", "tech-note"]);
    assert_eq!(aggregated.feeds.len(), 2);
    assert!(aggregated
        .items
        .iter()
        .all(|a| a.feed_name.as_deref() == Some("Tech Daily")));
}

#[tokio::test]
async fn normalized_articles_carry_feed_metadata() {
    let (_, parallel) = aggregator(MemoryFetcher::new().with_body(TECH_URL, TECH_RSS));

    let parsed = parallel.fetch_feed(TECH_URL).await.unwrap();

    assert_eq!(parsed.feed.title, "Tech Daily");
    assert_eq!(parsed.feed.link, "https://tech.example.com");
    let winter = &parsed.items[0];
    assert_eq!(winter.title, "Winter release");
    assert_eq!(winter.slug, "winter-release");
    assert_eq!(winter.author, "Tech Daily");
    assert_eq!(winter.content.summary, "Cold news");
    assert_eq!(winter.feed_name.as_deref(), Some("Tech Daily"));
}

#[tokio::test]
async fn atom_entry_author_is_kept() {
    let (_, parallel) = aggregator(MemoryFetcher::new().with_body(SCIENCE_URL, SCIENCE_ATOM));

    let parsed = parallel.fetch_feed(SCIENCE_URL).await.unwrap();

    assert_eq!(parsed.items[0].author, "Grace");
    assert_eq!(parsed.items[0].link, "https://science.example.com/summer");
}
