//! npm registry RSS feed parser
//!
//! Extracts package announcements from the registry feed. Each `<item>` block
//! is matched independently, so one malformed block never affects its
//! neighbours.
//!
//! Format example:
//! ```text
//! <item>
//!   <title><![CDATA[left-pad]]></title>
//!   <link>https://www.npmjs.com/package/left-pad</link>
//!   <pubDate>Mon, 19 Oct 2026 10:00:00 GMT</pubDate>
//!   <description><![CDATA[String left pad]]></description>
//!   <dc:creator><![CDATA[someone]]></dc:creator>
//! </item>
//! ```

use regex::{Captures, Regex};
use tracing::warn;

use crate::parser::timestamp::parse_instant;
use crate::parser::types::FeedItem;

/// Parser for the registry RSS feed
pub struct FeedItemExtractor {
    /// Regex for a whole `<item>...</item>` block
    item_re: Regex,
    /// Regex for `<title>`, CDATA-wrapped or plain
    title_re: Regex,
    /// Regex for `<link>`
    link_re: Regex,
    /// Regex for `<pubDate>`
    pub_date_re: Regex,
    /// Regex for `<description>`, CDATA-wrapped or plain
    description_re: Regex,
    /// Regex for `<dc:creator>`, CDATA-wrapped or plain
    creator_re: Regex,
}

impl FeedItemExtractor {
    pub fn new() -> Self {
        Self {
            item_re: Regex::new(r"(?s)<item>(.*?)</item>").unwrap(),
            title_re: Regex::new(r"<title>(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))</title>").unwrap(),
            link_re: Regex::new(r"<link>(.*?)</link>").unwrap(),
            pub_date_re: Regex::new(r"<pubDate>(.*?)</pubDate>").unwrap(),
            description_re: Regex::new(
                r"<description>(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))</description>",
            )
            .unwrap(),
            creator_re: Regex::new(r"<dc:creator>(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))</dc:creator>")
                .unwrap(),
        }
    }

    /// Lazily extract feed items in document order.
    ///
    /// Blocks missing a title, a link or a parseable publish date are
    /// skipped and logged.
    pub fn extract<'a>(&'a self, document: &'a str) -> impl Iterator<Item = FeedItem> + 'a {
        self.item_re
            .captures_iter(document)
            .filter_map(move |caps| caps.get(1).and_then(|block| self.parse_item(block.as_str())))
    }

    fn parse_item(&self, block: &str) -> Option<FeedItem> {
        let name = capture_text(&self.title_re, block).filter(|s| !s.is_empty());
        let link = capture_text(&self.link_re, block).filter(|s| !s.is_empty());
        let raw_date = capture_text(&self.pub_date_re, block);
        let published_at = raw_date.as_deref().and_then(parse_instant);

        let (Some(name), Some(link), Some(published_at)) = (name, link, published_at) else {
            warn!(
                "Failed to parse feed item (pubDate: {:?}): {}",
                raw_date,
                block.trim()
            );
            return None;
        };

        Some(FeedItem {
            name,
            link,
            published_at,
            description: capture_text(&self.description_re, block).unwrap_or_default(),
            creator: capture_text(&self.creator_re, block).unwrap_or_default(),
        })
    }
}

impl Default for FeedItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First matching capture group, trimmed
fn capture_text(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps: Captures<'_>| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().trim().to_string())
}
