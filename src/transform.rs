//! Source-XML parsing and assembly of the restructured article tree.

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::{DateParts, NULL};
use crate::history::{self, HistoryDates};
use crate::journal;
use crate::scrape::{self, PageMetadata};
use crate::xml::{self, Element};

/// The fields read from the uploaded source XML. Parsed once, read-only for
/// the rest of the transformation.
#[derive(Clone, Debug)]
pub struct SourceArticle {
    pub journal_title: String,
    pub issn: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
    pub abstract_text: Option<String>,
    pub author_list: Option<Element>,
    pub epublish_date: Option<Element>,
    pub pub_date: Option<DateParts>,
}

impl SourceArticle {
    /// Parse and validate the source document. Missing `Article`, journal
    /// title, or ISSN are hard errors; everything else is optional here and
    /// defaults to the sentinel at assembly time.
    pub fn parse(source_xml: &str) -> Result<Self> {
        let doc =
            roxmltree::Document::parse(source_xml).context("input XML is not well-formed")?;
        let article = doc
            .descendants()
            .find(|n| n.has_tag_name("Article"))
            .context("no Article element found in the input XML")?;

        let journal = article.children().find(|n| n.has_tag_name("Journal"));
        let journal_title = journal
            .and_then(|j| j.children().find(|n| n.has_tag_name("JournalTitle")))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string());
        let issn = journal
            .and_then(|j| j.children().find(|n| n.has_tag_name("Issn")))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string());
        let (Some(journal_title), Some(issn)) = (journal_title, issn) else {
            bail!("Journal title or ISSN not found");
        };

        let doi = article
            .descendants()
            .find(|n| n.has_tag_name("ELocationID") && n.attribute("EIdType") == Some("doi"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string());

        let title = article
            .children()
            .find(|n| n.has_tag_name("ArticleTitle"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string());

        let abstract_text = article
            .children()
            .find(|n| n.has_tag_name("Abstract"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string());

        let author_list = article
            .children()
            .find(|n| n.has_tag_name("AuthorList"))
            .map(Element::from_node);

        let epublish_date = find_pub_date(article, "epublish").map(Element::from_node);
        let pub_date = find_pub_date(article, "pub").map(|n| DateParts {
            year: child_text(n, "Year"),
            month: child_text(n, "Month"),
            day: child_text(n, "Day"),
        });

        Ok(SourceArticle {
            journal_title,
            issn,
            doi,
            title,
            volume: descendant_text(article, "Volume"),
            issue: descendant_text(article, "Issue"),
            first_page: descendant_text(article, "FirstPage"),
            last_page: descendant_text(article, "LastPage"),
            abstract_text,
            author_list,
            epublish_date,
            pub_date,
        })
    }
}

fn find_pub_date<'a>(
    article: roxmltree::Node<'a, 'a>,
    status: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    article
        .descendants()
        .find(|n| n.has_tag_name("PubDate") && n.attribute("PubStatus") == Some(status))
}

fn descendant_text(article: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    article
        .descendants()
        .find(|n| n.has_tag_name(name))
        .map(|n| n.text().unwrap_or("").trim().to_string())
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> String {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| NULL.to_string())
}

/// The transformation's two string outputs.
#[derive(Debug)]
pub struct TransformOutput {
    pub xml: String,
    pub filename: String,
}

/// Run the whole pipeline: validate the source XML, scrape the article page,
/// scan the PDF for history dates, assemble and serialise the output tree,
/// and derive the output filename.
///
/// Only the validation steps are fatal; scrape and PDF failures degrade to
/// sentinel values with a warning.
pub fn transform(
    pdf_bytes: &[u8],
    source_xml: &str,
    article_url: &str,
    pdf_link: Option<&str>,
) -> Result<TransformOutput> {
    let source = SourceArticle::parse(source_xml)?;
    let shortcode = journal::shortcode(&source.journal_title)?;

    let page = match scrape::fetch_page_metadata(article_url) {
        Ok(page) => page,
        Err(e) => {
            log::warn!("could not scrape article page: {e:#}");
            PageMetadata::default()
        }
    };
    // Scrape came up empty: fall back to the source's own PubStatus="pub" date.
    let published = if page.published.is_null() {
        source.pub_date.clone().unwrap_or_else(DateParts::null)
    } else {
        page.published.clone()
    };

    let history = history::extract_history(pdf_bytes);

    let mut root = build_tree(
        &source,
        shortcode,
        &published,
        &page.keywords,
        &history,
        article_url,
        pdf_link,
    );
    xml::indent(&mut root);
    let xml = root.to_xml_string()?;
    let filename = output_filename(article_url, &source, &published);
    Ok(TransformOutput { xml, filename })
}

fn or_null(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NULL.to_string())
}

fn build_tree(
    source: &SourceArticle,
    shortcode: &str,
    published: &DateParts,
    keywords: &[String],
    history: &HistoryDates,
    article_url: &str,
    pdf_link: Option<&str>,
) -> Element {
    let mut article = Element::new("Article");

    let mut journal_meta = Element::new("Journal-meta");
    for (id_type, value) in [
        ("pmc", shortcode.to_lowercase()),
        ("pubmed", source.journal_title.clone()),
        ("publisher", shortcode.to_string()),
    ] {
        journal_meta.push(Element::with_text("journal-id", value).attr("journal-id-type", id_type));
    }
    journal_meta.push(Element::with_text("Issn", source.issn.clone()));
    let mut publisher = Element::new("Publisher");
    publisher.push(Element::with_text(
        "PublisherName",
        "MMU Press, Multimedia University",
    ));
    journal_meta.push(publisher);
    journal_meta.push(Element::with_text("JournalTitle", source.journal_title.clone()));
    article.push(journal_meta);

    let mut meta = Element::new("article-meta");

    let volume = or_null(&source.volume);
    let issue = or_null(&source.issue);
    let first_page = or_null(&source.first_page);
    let last_page = or_null(&source.last_page);

    meta.push(Element::with_text("article-id", or_null(&source.doi)).attr("pub-id-type", "doi"));
    meta.push(
        Element::with_text("article-id", custom_article_id(shortcode, &volume, &issue, &first_page))
            .attr("pub-id-type", "other"),
    );

    meta.push(Element::with_text("ArticleTitle", or_null(&source.title)));
    meta.push(
        source
            .author_list
            .clone()
            .unwrap_or_else(|| Element::new("AuthorList")),
    );

    if let Some(epublish) = &source.epublish_date {
        meta.push(epublish.clone());
    }
    for status in ["pub", "cover"] {
        let mut pub_date = Element::new("PubDate").attr("PubStatus", status);
        pub_date.push(Element::with_text("Year", published.year.clone()));
        pub_date.push(Element::with_text("Month", published.month.clone()));
        pub_date.push(Element::with_text("Day", published.day.clone()));
        meta.push(pub_date);
    }

    let mut keywords_el = Element::new("Keywords");
    for keyword in keywords {
        let mut keyword_el = Element::new("Keyword");
        keyword_el.push(Element::with_text("italic", keyword.clone()));
        keywords_el.push(keyword_el);
    }
    meta.push(keywords_el);

    for (tag, value) in [
        ("Volume", &volume),
        ("Issue", &issue),
        ("FirstPage", &first_page),
        ("LastPage", &last_page),
    ] {
        meta.push(Element::with_text(tag, value.clone()));
    }
    meta.push(Element::with_text(
        "PageCount",
        page_count(&source.first_page, &source.last_page),
    ));

    let mut history_el = Element::new("History");
    for (status, date) in [("received", &history.received), ("accepted", &history.accepted)] {
        let mut pub_date = Element::new("PubDate").attr("PubStatus", status);
        pub_date.push(Element::with_text("Year", date.year.clone()));
        pub_date.push(Element::with_text("Month", date.month.clone()));
        pub_date.push(Element::with_text("Day", date.day.clone()));
        history_el.push(pub_date);
    }
    meta.push(history_el);

    let mut abstract_el = Element::new("abstract");
    abstract_el.push(Element::with_text("p", or_null(&source.abstract_text)));
    meta.push(abstract_el);

    meta.push(Element::with_text(
        "pdf-link",
        pdf_link.filter(|l| !l.is_empty()).unwrap_or(NULL),
    ));
    meta.push(Element::with_text(
        "full_text_url",
        if article_url.is_empty() { NULL } else { article_url },
    ));
    meta.push(Element::with_text("Language", "eng"));

    article.push(meta);
    article
}

/// `{firstLetterOfShortcodeLowercase}{Shortcode}.v{volume}.i{issue}.pg{firstPage}`
fn custom_article_id(shortcode: &str, volume: &str, issue: &str, first_page: &str) -> String {
    format!(
        "{}{}.v{}.i{}.pg{}",
        shortcode[..1].to_lowercase(),
        shortcode,
        volume,
        issue,
        first_page
    )
}

/// Page count is `max(0, last - first + 1)`; missing pages count as 0, and a
/// non-numeric page absorbs the arithmetic failure into the sentinel.
fn page_count(first_page: &Option<String>, last_page: &Option<String>) -> String {
    let first = first_page.clone().unwrap_or_else(|| "0".to_string());
    let last = last_page.clone().unwrap_or_else(|| "0".to_string());
    match (first.parse::<i64>(), last.parse::<i64>()) {
        (Ok(first), Ok(last)) => (last - first + 1).max(0).to_string(),
        _ => NULL.to_string(),
    }
}

static URL_NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit run"));

/// `{lastDoiDigit}_{lastUrlNumber}_Vol.{vol}_No.{issue}_{year}.xml`, with "0"
/// when the DOI's last character is not a digit, "-" when the URL carries no
/// digits, and the published year (post-fallback) which may be "null".
pub fn output_filename(article_url: &str, source: &SourceArticle, published: &DateParts) -> String {
    let last_doi_digit = source
        .doi
        .as_deref()
        .and_then(|doi| doi.chars().last())
        .filter(char::is_ascii_digit)
        .map(String::from)
        .unwrap_or_else(|| "0".to_string());
    let last_url_number = URL_NUMBERS
        .find_iter(article_url)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());
    let volume = source.volume.clone().unwrap_or_else(|| "-".to_string());
    let issue = source.issue.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "{last_doi_digit}_{last_url_number}_Vol.{volume}_No.{issue}_{year}.xml",
        year = published.year
    )
}
