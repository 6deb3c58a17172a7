//! Splicing the generated fragment into a template's front section.

use anyhow::{Context, Result, bail};

use crate::xml::Element;

const FRONT_OPEN: &str = "<front>";
const FRONT_CLOSE: &str = "</front>";

/// Rebuild a `front` wrapper around the fragment's `Journal-meta` and
/// `article-meta` subtrees and splice its serialisation over the template's
/// literal `<front>...</front>` span.
///
/// The replacement is a plain text substitution, not an XML-aware merge; the
/// template outside the replaced span is passed through byte for byte.
pub fn combine_with_template(processed_xml: &str, template: &str) -> Result<String> {
    let front = build_front(processed_xml)?;
    let markup = front.to_xml_string()?;

    let Some(open) = template.find(FRONT_OPEN) else {
        bail!("template does not contain <front> tags");
    };
    let Some(close) = template.find(FRONT_CLOSE) else {
        bail!("template does not contain <front> tags");
    };

    Ok(format!(
        "{}{}{}",
        &template[..open],
        markup,
        &template[close + FRONT_CLOSE.len()..]
    ))
}

/// Wrap the fragment's metadata subtrees in `front`/`Article`, deep-copying
/// with synthetic indentation: base level 3, two spaces per level.
fn build_front(processed_xml: &str) -> Result<Element> {
    let doc =
        roxmltree::Document::parse(processed_xml).context("generated XML is not well-formed")?;
    let processed = Element::from_node(doc.root_element());

    let mut front = Element::new("front");
    front.text = Some("\n  ".to_string());
    let mut article = Element::new("Article");
    article.text = Some("\n    ".to_string());

    if let Some(journal_meta) = processed.find("Journal-meta") {
        let mut copied = Element::new("Journal-meta");
        copied.text = Some("\n      ".to_string());
        copy_children(journal_meta, &mut copied, 3);
        if let Some(last) = copied.children.last_mut() {
            last.tail = Some("\n    ".to_string());
        }
        copied.tail = Some("\n    ".to_string());
        article.push(copied);
    }

    if let Some(article_meta) = processed.find("article-meta") {
        let mut copied = Element::new("article-meta");
        copied.text = Some("\n      ".to_string());
        copy_children(article_meta, &mut copied, 3);
        if let Some(last) = copied.children.last_mut() {
            last.tail = Some("\n    ".to_string());
        }
        copied.tail = Some("\n  ".to_string());
        article.push(copied);
    }

    article.tail = Some("\n".to_string());
    front.push(article);
    Ok(front)
}

/// Deep-copy `source`'s element children into `target`, reproducing
/// attributes and rebuilding indentation at each nesting level.
fn copy_children(source: &Element, target: &mut Element, level: usize) {
    let pad = "  ".repeat(level);
    for child in &source.children {
        let mut copied = Element::new(child.name.clone());
        if let Some(text) = &child.text
            && !text.is_empty()
        {
            copied.text = Some(text.clone());
        }
        copied.attrs = child.attrs.clone();
        copied.tail = Some(format!("\n{pad}"));
        if !child.children.is_empty() {
            copied.text = Some(format!("\n{pad}  "));
            copy_children(child, &mut copied, level + 1);
            if let Some(last) = copied.children.last_mut() {
                last.tail = Some(format!("\n{pad}"));
            }
        }
        target.push(copied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"<Article>
  <Journal-meta>
    <journal-id journal-id-type="pmc">jiwe</journal-id>
    <Issn>2821-370X</Issn>
  </Journal-meta>
  <article-meta>
    <article-id pub-id-type="doi">10.33093/jiwe.2024.3.2.1</article-id>
    <History>
      <PubDate PubStatus="received">
        <Year>2024</Year>
      </PubDate>
    </History>
  </article-meta>
</Article>"#;

    #[test]
    fn missing_front_markers_is_a_hard_error() {
        for template in [
            "<article><body>no front here</body></article>",
            "<article><front>only opened</article>",
            "<article></front>only closed</article>",
        ] {
            let err = combine_with_template(FRAGMENT, template).unwrap_err();
            assert!(err.to_string().contains("<front> tags"), "{template}");
        }
    }

    #[test]
    fn splices_between_markers_leaving_the_rest_untouched() {
        let template =
            "<?xml version=\"1.0\"?>\n<article>\n<front>old</front>\n<body>kept</body>\n</article>";
        let combined = combine_with_template(FRAGMENT, template).unwrap();
        assert!(combined.starts_with("<?xml version=\"1.0\"?>\n<article>\n<front>"));
        assert!(combined.ends_with("\n<body>kept</body>\n</article>"));
        assert!(!combined.contains("old"));
    }

    #[test]
    fn wrapper_nests_article_and_metadata_subtrees() {
        let template = "<front></front>";
        let combined = combine_with_template(FRAGMENT, template).unwrap();
        assert!(combined.starts_with("<front>\n  <Article>\n    <Journal-meta>"));
        assert!(combined.contains(
            "\n      <journal-id journal-id-type=\"pmc\">jiwe</journal-id>"
        ));
        assert!(combined.contains("\n      <article-id pub-id-type=\"doi\">"));
        // Nested levels gain one indent step per level.
        assert!(combined.contains("\n      <History>\n        <PubDate PubStatus=\"received\">\n          <Year>2024</Year>\n        </PubDate>\n      </History>"));
        assert!(combined.ends_with("</article-meta>\n  </Article>\n</front>"));
    }

    #[test]
    fn fragment_without_metadata_yields_bare_wrapper() {
        let combined = combine_with_template("<Article/>", "<front>x</front>").unwrap();
        assert_eq!(combined, "<front>\n  <Article>\n    </Article>\n</front>");
    }
}
