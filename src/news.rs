use std::io::Cursor;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{self, ClientConfig, FetchError};
use crate::model::Article;

pub const SEARCH_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_SOURCE: &str = "Google News";
pub const DEFAULT_LIMIT: usize = 30;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    Pc,
    Fortnite,
    Roblox,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 3] = [
        NewsCategory::Pc,
        NewsCategory::Fortnite,
        NewsCategory::Roblox,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            NewsCategory::Pc => "pc gaming",
            NewsCategory::Fortnite => "fortnite",
            NewsCategory::Roblox => "roblox",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NewsCategory::Pc => "PC News",
            NewsCategory::Fortnite => "Fortnite",
            NewsCategory::Roblox => "Roblox",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "pc" | "pc news" => Some(NewsCategory::Pc),
            "fortnite" => Some(NewsCategory::Fortnite),
            "roblox" => Some(NewsCategory::Roblox),
            _ => None,
        }
    }
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    search_url: Url,
    limit: usize,
}

impl Client {
    pub fn new(config: &ClientConfig, search_url: &str, limit: usize) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("news client user agent required");
        }

        Ok(Client {
            http: config.http()?,
            user_agent: config.user_agent.clone(),
            search_url: Url::parse(search_url)?,
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        })
    }

    pub fn search_url(&self, category: NewsCategory) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("{} game", category.keyword()))
            .append_pair("hl", "en-US")
            .append_pair("gl", "US")
            .append_pair("ceid", "US:en");
        url
    }

    pub fn articles(&self, category: NewsCategory) -> Result<Vec<Article>, FetchError> {
        let url = self.search_url(category);
        let body = fetch::get_bytes(&self.http, &self.user_agent, url)?;
        parse_feed(&body, self.limit)
    }
}

/// Reads at most `limit` items from an RSS document.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<Article>, FetchError> {
    let channel = rss::Channel::read_from(Cursor::new(body)).map_err(FetchError::Feed)?;
    Ok(channel
        .items()
        .iter()
        .take(limit)
        .map(|item| Article {
            title: item.title().map(plain_text),
            source: item
                .source()
                .and_then(|source| source.title())
                .map(plain_text)
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            link: item.link().map(|link| link.trim().to_string()),
            summary: item.description().map(plain_text).unwrap_or_default(),
        })
        .collect())
}

/// Drops markup, decodes the common entities and collapses whitespace.
pub fn plain_text(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::serve;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"pc gaming game" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>New GPU announced - Tech Weekly</title>
      <link>https://news.example.com/gpu</link>
      <description>&lt;a href="https://news.example.com/gpu"&gt;New GPU announced&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Tech Weekly&lt;/font&gt;</description>
      <source url="https://techweekly.example.com">Tech Weekly</source>
    </item>
    <item>
      <title>Patch notes</title>
      <link>https://news.example.com/patch</link>
    </item>
    <item>
      <title>Third story</title>
      <link>https://news.example.com/third</link>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn search_url_encodes_category_keyword() {
        let client = Client::new(&ClientConfig::default(), SEARCH_URL, DEFAULT_LIMIT).unwrap();
        assert_eq!(
            client.search_url(NewsCategory::Pc).as_str(),
            "https://news.google.com/rss/search?q=pc+gaming+game&hl=en-US&gl=US&ceid=US%3Aen"
        );
    }

    #[test]
    fn parses_items_with_source_fallback() {
        let articles = parse_feed(FEED.as_bytes(), DEFAULT_LIMIT).unwrap();
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].source, "Tech Weekly");
        assert_eq!(articles[0].summary, "New GPU announced Tech Weekly");
        assert_eq!(
            articles[0].link.as_deref(),
            Some("https://news.example.com/gpu")
        );
        assert_eq!(articles[1].source, DEFAULT_SOURCE);
        assert_eq!(articles[1].summary, "");
    }

    #[test]
    fn limit_caps_entries() {
        let articles = parse_feed(FEED.as_bytes(), 2).unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[test]
    fn garbage_is_a_feed_error() {
        let err = parse_feed(b"<html><body>nope</body></html>", DEFAULT_LIMIT).unwrap_err();
        assert!(matches!(err, FetchError::Feed(_)));
    }

    #[test]
    fn fetches_feed_over_http() {
        let server = serve(vec![(200, "application/rss+xml", FEED.to_string())]);
        let client = Client::new(
            &ClientConfig::default(),
            &format!("{}/rss/search", server.base),
            DEFAULT_LIMIT,
        )
        .unwrap();
        let articles = client.articles(NewsCategory::Roblox).unwrap();
        assert_eq!(articles.len(), 3);
        let path = server.requests.recv().unwrap();
        assert!(path.starts_with("/rss/search?q=roblox+game&"), "path was {path}");
    }

    #[test]
    fn plain_text_strips_markup_and_entities() {
        assert_eq!(
            plain_text("<b>Fish</b>&nbsp;&amp;&nbsp;<i>chips</i>\n  &quot;now&quot;"),
            "Fish & chips \"now\""
        );
    }
}
