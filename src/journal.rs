use anyhow::{Result, bail};

/// Static mapping from full journal title to its shortcode.
///
/// The table is fixed for the life of the process; an unknown title is a hard
/// validation error and aborts the transformation.
static SHORTCODES: &[(&str, &str)] = &[
    ("Journal of Informatics and Web Engineering", "JIWE"),
    (
        "Journal of Engineering Technology and Applied Physics",
        "JETAK",
    ),
    ("Asian Journal of Law and Policy", "AJLP"),
    ("International Journal of Creative Multimedia", "IJCM"),
    ("Journal of Management, Finance and Accounting", "IJOMFA"),
    ("Journal on Robotics, Automation and Sciences", "IJORAS"),
    (
        "Issues and Perspectives in Business and Social Sciences",
        "IPBSS",
    ),
    ("Journal of Communication, Language and Culture", "JCLC"),
];

pub fn shortcode(title: &str) -> Result<&'static str> {
    match SHORTCODES.iter().find(|(full, _)| *full == title) {
        Some(&(_, code)) => Ok(code),
        None => bail!("journal title '{title}' has no registered shortcode"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_title_resolves() {
        assert_eq!(
            shortcode("Journal of Informatics and Web Engineering").unwrap(),
            "JIWE"
        );
        assert_eq!(
            shortcode("Journal of Communication, Language and Culture").unwrap(),
            "JCLC"
        );
    }

    #[test]
    fn unknown_title_is_an_error() {
        let err = shortcode("Journal of Unknown Studies").unwrap_err();
        assert!(err.to_string().contains("no registered shortcode"));
    }

    #[test]
    fn lookup_is_exact_not_fuzzy() {
        assert!(shortcode("journal of informatics and web engineering").is_err());
        assert!(shortcode(" Journal of Informatics and Web Engineering").is_err());
    }
}
