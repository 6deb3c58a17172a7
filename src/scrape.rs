//! Publication metadata scraped from the article's web page.

use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::date::{self, DateParts};

static DATE_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.list-group-item.date-published").expect("selector"));
static CITATION_KEYWORDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="citation_keywords"]"#).expect("selector"));
static KEYWORD_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,]\s*").expect("keyword split"));

/// What the article page yields: the published date and the keyword list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub published: DateParts,
    pub keywords: Vec<String>,
}

fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(10)))
        .timeout_global(Some(Duration::from_secs(30)))
        .build();
    ureq::Agent::new_with_config(config)
}

/// Fetch the article page and extract its metadata. Callers treat any `Err`
/// as a soft failure and fall back to the source XML's own publication date.
pub fn fetch_page_metadata(url: &str) -> Result<PageMetadata> {
    let body: String = agent()
        .get(url)
        .header(
            "User-Agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.10 Safari/605.1.1",
        )
        .call()
        .with_context(|| format!("failed to fetch {url}"))?
        .body_mut()
        .read_to_string()
        .context("failed to read article page body")?;
    Ok(parse_page_metadata(&body))
}

/// Extract metadata from already-fetched HTML.
pub fn parse_page_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let published = document
        .select(&DATE_PUBLISHED)
        .next()
        .map(|element| {
            let text: String = element.text().map(str::trim).collect();
            date::parse_date(text.replace("Published:", "").trim())
        })
        .unwrap_or_else(DateParts::null);

    let mut keywords = Vec::new();
    for element in document.select(&CITATION_KEYWORDS) {
        let content = element.value().attr("content").unwrap_or("");
        for keyword in KEYWORD_SPLIT.split(content) {
            let keyword = keyword.trim();
            if !keyword.is_empty() {
                keywords.push(keyword.to_string());
            }
        }
    }

    PageMetadata {
        published,
        keywords,
    }
}
