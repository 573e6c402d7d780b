//! Feed parsing and normalization.
//!
//! feed-rs turns RSS 0.9x/1.0/2.0, Atom and JSON Feed into one model; each
//! entry is then flattened into an [`ItemShape`] and every [`Article`] field
//! is resolved by its own function with its own fallback order.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, FeedType};
use feed_rs::parser;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::app::{FeedloomError, Result};
use crate::config::FeedConfig;
use crate::domain::{Article, ArticleContent, Attachments, Enclosure, FeedDescriptor, ParsedFeed};
use crate::text::{decode_entities, first_image_src, shorten_text, slugify, tag_attributes};

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown";
const DEFAULT_CATEGORY: &str = "general";

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").unwrap());
static ENCLOSURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<enclosure\b[^>]*>").unwrap());

/// A media reference attached to an item (enclosure or `media:content`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRef {
    pub url: String,
    pub mime_type: Option<String>,
}

impl MediaRef {
    fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}

/// Flat view of one feed item with every optional field the resolvers look at.
#[derive(Debug, Clone, Default)]
pub struct ItemShape {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub creator: Option<String>,
    pub categories: Vec<String>,
    /// Full HTML body (`content:encoded`, Atom `content`).
    pub encoded: Option<String>,
    /// Description or summary, often HTML too.
    pub summary: Option<String>,
    /// Native enclosures: RSS `<enclosure>` and Atom `rel="enclosure"` links.
    pub enclosures: Vec<MediaRef>,
    /// Podcast/iTunes images and media thumbnails.
    pub thumbnails: Vec<String>,
    /// `media:content` URLs, typed or not.
    pub media: Vec<MediaRef>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Native `<enclosure>` tags of every RSS `<item>`, in document order.
///
/// feed-rs files enclosures and `media:content` under the same media object,
/// so the item markup is the only place they can be told apart.
fn rss_enclosures(body: &[u8]) -> Vec<Vec<MediaRef>> {
    let xml = String::from_utf8_lossy(body);
    ITEM_RE
        .captures_iter(&xml)
        .map(|item| {
            ENCLOSURE_RE
                .find_iter(&item[1])
                .filter_map(|tag| {
                    let attrs = tag_attributes(tag.as_str());
                    let url = non_empty(decode_entities(attrs.get("url")?))?;
                    Some(MediaRef {
                        url: Url::parse(&url).map(String::from).unwrap_or(url),
                        mime_type: attrs
                            .get("type")
                            .and_then(|t| non_empty(decode_entities(t))),
                    })
                })
                .collect()
        })
        .collect()
}

impl ItemShape {
    /// Flatten a feed-rs entry. `native_enclosures` are the item's RSS
    /// `<enclosure>` tags; their copies inside `entry.media` are skipped.
    pub fn from_entry(entry: Entry, native_enclosures: Vec<MediaRef>) -> Self {
        let mut enclosures: Vec<MediaRef> = entry
            .links
            .iter()
            .filter(|l| l.rel.as_deref() == Some("enclosure"))
            .map(|l| MediaRef {
                url: l.href.clone(),
                mime_type: l.media_type.clone(),
            })
            .collect();
        enclosures.extend(native_enclosures);

        let mut media = Vec::new();
        let mut thumbnails = Vec::new();
        for object in &entry.media {
            for content in &object.content {
                let Some(url) = &content.url else {
                    continue;
                };
                if enclosures.iter().any(|e| e.url == url.as_str()) {
                    continue;
                }
                media.push(MediaRef {
                    url: url.to_string(),
                    mime_type: content.content_type.as_ref().map(|m| m.to_string()),
                });
            }
            thumbnails.extend(object.thumbnails.iter().map(|t| t.image.uri.clone()));
        }

        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() != Some("enclosure"))
            .map(|l| l.href.clone());

        Self {
            id: non_empty(entry.id),
            title: entry.title.and_then(|t| non_empty(t.content)),
            link,
            creator: entry
                .authors
                .into_iter()
                .find_map(|a| non_empty(a.name)),
            categories: entry
                .categories
                .into_iter()
                .filter_map(|c| non_empty(c.term))
                .collect(),
            encoded: entry.content.and_then(|c| c.body).and_then(non_empty),
            summary: entry.summary.and_then(|s| non_empty(s.content)),
            enclosures,
            thumbnails,
            media,
            published: entry.published,
            updated: entry.updated,
        }
    }

    /// Full HTML body: encoded content first, then summary.
    pub fn body(&self) -> &str {
        self.encoded
            .as_deref()
            .or(self.summary.as_deref())
            .unwrap_or("")
    }

    /// `guid` → link → `{feed_url}-{millis}-{index}`.
    pub fn resolve_guid(&self, feed_url: &str, index: usize, now: DateTime<Utc>) -> String {
        self.id
            .clone()
            .or_else(|| self.link.clone())
            .unwrap_or_else(|| format!("{}-{}-{}", feed_url, now.timestamp_millis(), index))
    }

    /// Item creator → feed title → `"Unknown"`.
    pub fn resolve_author(&self, feed_title: &str) -> String {
        if let Some(creator) = &self.creator {
            return decode_entities(creator);
        }
        if !feed_title.is_empty() {
            return feed_title.to_string();
        }
        UNKNOWN_AUTHOR.to_string()
    }

    /// Publication instant, falling back to the update instant.
    ///
    /// Dates feed-rs could not parse never reach this point, so they stay absent.
    pub fn resolve_pub_date(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }

    /// Article image, first match wins:
    /// image-typed enclosure, podcast image, media content, first `<img>` in the body.
    pub fn resolve_image(&self) -> Option<String> {
        if let Some(enclosure) = self.enclosures.iter().find(|e| e.is_image()) {
            return Some(enclosure.url.clone());
        }
        if let Some(thumbnail) = self.thumbnails.first() {
            return Some(thumbnail.clone());
        }
        if let Some(media) = self.media.first() {
            return Some(media.url.clone());
        }
        first_image_src(self.body())
    }

    pub fn resolve_enclosure(&self) -> Enclosure {
        self.enclosures
            .first()
            .map(|e| Enclosure {
                link: Some(e.url.clone()),
                mime_type: e.mime_type.clone(),
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    default_language: String,
    summary_length: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_config(&FeedConfig::default())
    }

    pub fn with_config(config: &FeedConfig) -> Self {
        Self {
            default_language: config.default_language.clone(),
            summary_length: config.summary_length,
        }
    }

    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<ParsedFeed> {
        // Entries without an id keep it empty so the link fallback applies.
        let feed = parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build()
            .parse(body)
            .map_err(|e| FeedloomError::FeedParse(e.to_string()))?;

        let title = feed.title.map(|t| t.content.trim().to_string()).unwrap_or_default();
        let description = feed
            .description
            .map(|d| d.content.trim().to_string())
            .unwrap_or_default();
        let link = feed
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_else(|| feed_url.to_string());
        let language = feed
            .language
            .and_then(non_empty)
            .unwrap_or_else(|| self.default_language.clone());

        let mut native = match feed.feed_type {
            FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2 => rss_enclosures(body),
            _ => Vec::new(),
        };
        if !native.is_empty() && native.len() != feed.entries.len() {
            debug!(url = %feed_url, "Item markup does not line up with parsed entries");
            native.clear();
        }
        let mut native = native.into_iter();

        let now = Utc::now();
        let items = feed
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let shape = ItemShape::from_entry(entry, native.next().unwrap_or_default());
                self.to_article(&shape, feed_url, &title, &language, index, now)
            })
            .collect();

        Ok(ParsedFeed {
            feed: FeedDescriptor {
                url: feed_url.to_string(),
                title,
                description,
                link,
            },
            items,
        })
    }

    pub fn to_article(
        &self,
        shape: &ItemShape,
        feed_url: &str,
        feed_title: &str,
        language: &str,
        index: usize,
        now: DateTime<Utc>,
    ) -> Article {
        let title = shape.title.clone().unwrap_or_else(|| UNTITLED.to_string());
        let body = shape.body().to_string();

        Article {
            guid: shape.resolve_guid(feed_url, index, now),
            slug: slugify(&title),
            title,
            link: shape.link.clone().unwrap_or_default(),
            author: shape.resolve_author(feed_title),
            pub_date: shape.resolve_pub_date(),
            scheduled_publication_time: None,
            timezone: None,
            published: true,
            language: language.to_string(),
            category: shape
                .categories
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            enclosure: shape.resolve_enclosure(),
            tags: shape.categories.clone(),
            content: ArticleContent {
                summary: shorten_text(&body, self.summary_length),
                body,
            },
            attachements: Attachments {
                article_img: shape.resolve_image(),
                creator_avatar: None,
            },
            feed_name: (!feed_title.is_empty()).then(|| feed_title.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com/</link>
    <description>A test feed</description>
    <item>
      <title>Caf&#233; du Monde!</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <category>Food</category>
      <category>Paris</category>
      <description>Short teaser</description>
      <content:encoded><![CDATA[<p>Full <b>body</b></p><img src="https://example.com/body.jpg">]]></content:encoded>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
      <pubDate>not a date at all</pubDate>
      <description>This is item 2</description>
      <enclosure url="https://example.com/cover.png" length="1234" type="image/png"/>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <subtitle>An Atom test feed</subtitle>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <author><name>Jane Doe</name></author>
    <updated>2024-01-01T00:00:00Z</updated>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;

    fn shape() -> ItemShape {
        ItemShape {
            encoded: Some(r#"<p><img src="https://example.com/body.jpg"></p>"#.into()),
            ..ItemShape::default()
        }
    }

    #[test]
    fn test_parse_rss() {
        let parsed = Normalizer::new()
            .normalize("https://example.com/feed.xml", RSS_SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(parsed.feed.title, "Test Feed");
        assert_eq!(parsed.feed.description, "A test feed");
        assert_eq!(parsed.feed.url, "https://example.com/feed.xml");
        assert_eq!(parsed.items.len(), 2);

        let first = &parsed.items[0];
        assert_eq!(first.guid, "item-1");
        assert_eq!(first.title, "Café du Monde!");
        assert_eq!(first.slug, "cafe-du-monde");
        assert_eq!(first.link, "https://example.com/item1");
        assert_eq!(first.author, "Test Feed");
        assert_eq!(first.category, "Food");
        assert_eq!(first.tags, vec!["Food".to_string(), "Paris".to_string()]);
        assert_eq!(first.content.summary, "Full body");
        assert_eq!(
            first.attachements.article_img.as_deref(),
            Some("https://example.com/body.jpg")
        );
        assert_eq!(
            first.pub_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(first.language, "fr");
        assert!(first.published);
        assert_eq!(first.feed_name.as_deref(), Some("Test Feed"));
    }

    #[test]
    fn test_invalid_date_is_absent() {
        let parsed = Normalizer::new()
            .normalize("https://example.com/feed.xml", RSS_SAMPLE.as_bytes())
            .unwrap();
        assert_eq!(parsed.items[1].pub_date, None);
    }

    #[test]
    fn test_image_enclosure() {
        let parsed = Normalizer::new()
            .normalize("https://example.com/feed.xml", RSS_SAMPLE.as_bytes())
            .unwrap();
        let second = &parsed.items[1];
        assert_eq!(
            second.attachements.article_img.as_deref(),
            Some("https://example.com/cover.png")
        );
        assert_eq!(
            second.enclosure.link.as_deref(),
            Some("https://example.com/cover.png")
        );
        assert_eq!(second.enclosure.mime_type.as_deref(), Some("image/png"));
        assert_eq!(second.category, "general");
        assert!(second.tags.is_empty());
    }

    #[test]
    fn test_parse_atom() {
        let parsed = Normalizer::new()
            .normalize("https://example.com/feed.atom", ATOM_SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(parsed.feed.title, "Atom Test Feed");
        assert_eq!(parsed.feed.link, "https://example.com/feed.atom");
        assert_eq!(parsed.items.len(), 1);
        let entry = &parsed.items[0];
        assert_eq!(entry.title, "Atom Entry 1");
        assert_eq!(entry.guid, "atom-entry-1");
        assert_eq!(entry.link, "https://example.com/atom1");
        assert_eq!(entry.author, "Jane Doe");
        assert!(entry.pub_date.is_some());
    }

    #[test]
    fn test_rejects_non_feed() {
        let err = Normalizer::new()
            .normalize("https://example.com/", b"<html><body>nope</body></html>")
            .unwrap_err();
        assert!(matches!(err, FeedloomError::FeedParse(_)));
    }

    #[test]
    fn test_configured_language() {
        let config = FeedConfig {
            default_language: "en".into(),
            ..FeedConfig::default()
        };
        let parsed = Normalizer::with_config(&config)
            .normalize("https://example.com/feed.atom", ATOM_SAMPLE.as_bytes())
            .unwrap();
        assert_eq!(parsed.items[0].language, "en");
    }

    #[test]
    fn test_image_priority_enclosure_first() {
        let mut s = shape();
        s.media.push(MediaRef {
            url: "https://example.com/media.jpg".into(),
            mime_type: None,
        });
        s.thumbnails.push("https://example.com/itunes.jpg".into());
        s.enclosures.push(MediaRef {
            url: "https://example.com/episode.mp3".into(),
            mime_type: Some("audio/mpeg".into()),
        });
        s.enclosures.push(MediaRef {
            url: "https://example.com/cover.jpg".into(),
            mime_type: Some("image/jpeg".into()),
        });
        assert_eq!(s.resolve_image().as_deref(), Some("https://example.com/cover.jpg"));
    }

    #[test]
    fn test_image_priority_thumbnail_before_media() {
        let mut s = shape();
        s.media.push(MediaRef {
            url: "https://example.com/media.jpg".into(),
            mime_type: None,
        });
        s.thumbnails.push("https://example.com/itunes.jpg".into());
        assert_eq!(s.resolve_image().as_deref(), Some("https://example.com/itunes.jpg"));

        s.thumbnails.clear();
        assert_eq!(s.resolve_image().as_deref(), Some("https://example.com/media.jpg"));
    }

    #[test]
    fn test_image_from_body_prefers_encoded() {
        let mut s = shape();
        s.summary = Some(r#"<img src="https://example.com/summary.jpg">"#.into());
        assert_eq!(s.resolve_image().as_deref(), Some("https://example.com/body.jpg"));

        s.encoded = None;
        assert_eq!(s.resolve_image().as_deref(), Some("https://example.com/summary.jpg"));

        s.summary = None;
        assert_eq!(s.resolve_image(), None);
    }

    #[test]
    fn test_guid_fallbacks() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut s = ItemShape::default();
        assert_eq!(
            s.resolve_guid("https://example.com/feed.xml", 3, now),
            format!("https://example.com/feed.xml-{}-3", now.timestamp_millis())
        );

        s.link = Some("https://example.com/a".into());
        assert_eq!(s.resolve_guid("https://example.com/feed.xml", 3, now), "https://example.com/a");

        s.id = Some("guid-a".into());
        assert_eq!(s.resolve_guid("https://example.com/feed.xml", 3, now), "guid-a");
    }

    #[test]
    fn test_missing_guid_uses_link_then_synthetic_key() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>No Ids</title>
    <link>https://e.com/</link>
    <description>d</description>
    <item><title>Linked</title><link>https://e.com/a</link></item>
    <item><title>Bare</title></item>
  </channel>
</rss>"#;
        let parsed = Normalizer::new()
            .normalize("https://e.com/feed.xml", xml.as_bytes())
            .unwrap();

        assert_eq!(parsed.items[0].guid, "https://e.com/a");
        let bare = &parsed.items[1].guid;
        assert!(bare.starts_with("https://e.com/feed.xml-"));
        assert!(bare.ends_with("-1"));
    }

    #[test]
    fn test_podcast_image_beats_typed_media_content() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Podcast</title>
    <link>https://e.com/</link>
    <description>d</description>
    <item>
      <title>Episode 1</title>
      <link>https://e.com/ep1</link>
      <guid>ep-1</guid>
      <enclosure url="https://e.com/ep1.mp3" length="100" type="audio/mpeg"/>
      <itunes:image href="https://e.com/itunes.jpg"/>
      <media:content url="https://e.com/media.jpg" type="image/jpeg"/>
    </item>
  </channel>
</rss>"#;
        let parsed = Normalizer::new()
            .normalize("https://e.com/feed.xml", xml.as_bytes())
            .unwrap();
        let episode = &parsed.items[0];

        assert_eq!(
            episode.attachements.article_img.as_deref(),
            Some("https://e.com/itunes.jpg")
        );
        assert_eq!(episode.enclosure.link.as_deref(), Some("https://e.com/ep1.mp3"));
        assert_eq!(episode.enclosure.mime_type.as_deref(), Some("audio/mpeg"));
    }

    #[test]
    fn test_media_content_is_not_an_enclosure() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Photos</title>
    <link>https://e.com/</link>
    <description>d</description>
    <item>
      <title>Shot</title>
      <guid>shot</guid>
      <media:content url="https://e.com/shot.jpg" type="image/jpeg"/>
    </item>
  </channel>
</rss>"#;
        let parsed = Normalizer::new()
            .normalize("https://e.com/feed.xml", xml.as_bytes())
            .unwrap();

        assert_eq!(parsed.items[0].enclosure, Enclosure::default());
        assert_eq!(
            parsed.items[0].attachements.article_img.as_deref(),
            Some("https://e.com/shot.jpg")
        );
    }

    #[test]
    fn test_escaped_markup_in_title_stays_literal() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Less &amp;lt; More</title>
    <link>https://e.com/</link>
    <description>d</description>
    <item><title>Use &amp;lt;b&amp;gt; tags</title><guid>b</guid></item>
  </channel>
</rss>"#;
        let parsed = Normalizer::new()
            .normalize("https://e.com/feed.xml", xml.as_bytes())
            .unwrap();

        assert_eq!(parsed.feed.title, "Less &lt; More");
        assert_eq!(parsed.items[0].title, "Use &lt;b&gt; tags");
    }

    #[test]
    fn test_author_fallbacks() {
        let mut s = ItemShape::default();
        assert_eq!(s.resolve_author(""), "Unknown");
        assert_eq!(s.resolve_author("Feed Title"), "Feed Title");
        s.creator = Some("Ana &amp; Bo".into());
        assert_eq!(s.resolve_author("Feed Title"), "Ana & Bo");
    }

    #[test]
    fn test_pub_date_falls_back_to_updated() {
        let updated = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let s = ItemShape {
            updated: Some(updated),
            ..ItemShape::default()
        };
        assert_eq!(s.resolve_pub_date(), Some(updated));
    }

    #[test]
    fn test_untitled_item() {
        let article = Normalizer::new().to_article(
            &ItemShape::default(),
            "https://example.com/feed.xml",
            "",
            "fr",
            0,
            Utc::now(),
        );
        assert_eq!(article.title, "Untitled");
        assert_eq!(article.slug, "untitled");
        assert_eq!(article.author, "Unknown");
        assert_eq!(article.content.summary, "");
        assert_eq!(article.feed_name, None);
    }
}
