//! Received/accepted date extraction from PDF page text.

use anyhow::{Context, Result};
use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::{self, DateParts};

/// A date in either "Month day[,] year" or "day Month[,] year" form, with
/// full or abbreviated month names.
const COMBINED_DATE: &str =
    r"(?:[A-Za-z]{3,9}\s+\d{1,2},?\s*\d{4}|\d{1,2}\s+[A-Za-z]{3,9},?\s*\d{4})";

/// Received/accepted pair patterns tried in order per page.
///
/// NOTE: Ordering is important here, as it signifies priority. Covers the
/// colon/dash, plain whitespace, "on ...; on ...", pipe-separated (with an
/// optional Revised field), and semicolon-separated layouts seen in the
/// journals' PDFs.
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)Received\s*[:\-]?\s*({COMBINED_DATE}),\s*Accepted\s*[:\-]?\s*({COMBINED_DATE})"),
        format!(r"(?i)Received\s+({COMBINED_DATE})\s+Accepted\s+({COMBINED_DATE})"),
        format!(r"(?i)Received\s+on\s+({COMBINED_DATE})\s*;\s*Accepted\s+on\s+({COMBINED_DATE})"),
        format!(
            r"(?i)Received[:\-]?\s*({COMBINED_DATE})\s*\|\s*(?:Revised[:\-]?\s*{COMBINED_DATE}\s*\|\s*)?Accepted[:\-]?\s*({COMBINED_DATE})"
        ),
        format!(r"(?i)Received\s*[:\-]?\s*({COMBINED_DATE})\s*;\s*Accepted\s*[:\-]?\s*({COMBINED_DATE})"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("history pattern"))
    .collect()
});

/// The article's submission history as found in the PDF.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryDates {
    pub received: DateParts,
    pub accepted: DateParts,
}

impl HistoryDates {
    pub fn null() -> Self {
        HistoryDates::default()
    }
}

/// Scan the PDF for a received/accepted date pair.
///
/// Pages are visited in document order; the pattern list is tried exhaustively
/// per page, and the first page with any match ends the scan. An unreadable
/// document, or one with no match on any page, degrades to the all-null pair
/// with a warning rather than an error.
pub fn extract_history(pdf_bytes: &[u8]) -> HistoryDates {
    match scan_pages(pdf_bytes) {
        Ok(Some(found)) => found,
        Ok(None) => {
            log::warn!("no received/accepted dates found in PDF");
            HistoryDates::null()
        }
        Err(e) => {
            log::warn!("could not extract history from PDF: {e:#}");
            HistoryDates::null()
        }
    }
}

fn scan_pages(pdf_bytes: &[u8]) -> Result<Option<HistoryDates>> {
    let doc = Document::load_mem(pdf_bytes).context("failed to open PDF")?;
    for &page_number in doc.get_pages().keys() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("skipping page {page_number}: {e}");
                continue;
            }
        };
        if let Some(found) = find_in_text(&text) {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Match the pattern list against one page's text, first match wins.
pub fn find_in_text(text: &str) -> Option<HistoryDates> {
    PATTERNS.iter().find_map(|pattern| {
        pattern.captures(text).map(|caps| HistoryDates {
            received: date::parse_date(caps.get(1).map_or("", |m| m.as_str()).trim()),
            accepted: date::parse_date(caps.get(2).map_or("", |m| m.as_str()).trim()),
        })
    })
}
