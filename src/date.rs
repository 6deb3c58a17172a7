use chrono::{Datelike, NaiveDate};

/// Sentinel used throughout the output tree for absent or unresolved values.
pub const NULL: &str = "null";

/// Date formats tried in order.
///
/// NOTE: Ordering is important here, as it signifies priority. The first format
/// that parses the input wins; the rest are never consulted.
static FORMATS: &[&str] = &["%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"];

/// A calendar date broken into display strings: four-digit year, zero-padded
/// month and day. Each field independently carries the `"null"` sentinel when
/// the date could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl DateParts {
    pub fn null() -> Self {
        DateParts {
            year: NULL.to_string(),
            month: NULL.to_string(),
            day: NULL.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.year == NULL && self.month == NULL && self.day == NULL
    }
}

impl Default for DateParts {
    fn default() -> Self {
        DateParts::null()
    }
}

/// Normalise a free-text date into `DateParts`, trying each supported format
/// in priority order. Total over its input: anything unparseable collapses to
/// the sentinel triple rather than an error.
pub fn parse_date(input: &str) -> DateParts {
    let input = input.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .map(|d| DateParts {
            year: d.format("%Y").to_string(),
            month: format!("{:02}", d.month()),
            day: format!("{:02}", d.day()),
        })
        .unwrap_or_else(DateParts::null)
}
