use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SOURCE_XML: &str = r#"<ArticleSet>
  <Article>
    <Journal>
      <JournalTitle>Journal of Informatics and Web Engineering</JournalTitle>
      <Issn>2821-370X</Issn>
    </Journal>
    <ArticleTitle>A Study of Things</ArticleTitle>
    <AuthorList>
      <Author><FirstName>Ada</FirstName><LastName>Lovelace</LastName></Author>
    </AuthorList>
    <Abstract>We studied the things.</Abstract>
    <Volume>3</Volume>
    <Issue>2</Issue>
    <FirstPage>10</FirstPage>
    <LastPage>15</LastPage>
    <ELocationID EIdType="doi">10.33093/jiwe.2024.3.2.1</ELocationID>
    <PubDate PubStatus="pub">
      <Year>2024</Year>
      <Month>06</Month>
      <Day>01</Day>
    </PubDate>
  </Article>
</ArticleSet>"#;

// The article URL points at a closed loopback port and the PDF is not a real
// PDF: both failures must degrade to sentinels, not abort the run.
#[test]
fn generate_completes_offline_with_sentinels() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let pdf_path = dir.path().join("article.pdf");
    let xml_path = dir.path().join("article.xml");
    fs::write(&pdf_path, b"not a pdf")?;
    fs::write(&xml_path, SOURCE_XML)?;

    let mut cmd = Command::cargo_bin("jatsfront")?;
    cmd.env("NO_COLOR", "1");
    let output = cmd
        .arg("generate")
        .arg("--pdf")
        .arg(&pdf_path)
        .arg("--xml")
        .arg(&xml_path)
        .arg("--url")
        .arg("http://127.0.0.1:9/jiwe/article/view/123")
        .arg("--out-dir")
        .arg(dir.path())
        .output()?;
    assert!(output.status.success(), "stderr=\n{}", String::from_utf8_lossy(&output.stderr));

    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(stderr.contains("✓"), "stderr missing success marker:\n{stderr}");

    // Year comes from the PubStatus="pub" fallback once the scrape fails.
    let generated = dir.path().join("1_123_Vol.3_No.2_2024.xml");
    assert!(generated.exists(), "expected {}", generated.display());
    let xml = fs::read_to_string(&generated)?;
    assert!(xml.starts_with("<Article>"));
    assert!(xml.contains("jJIWE.v3.i2.pg10"));
    assert!(xml.contains("<PageCount>6</PageCount>"));
    assert!(xml.contains(r#"<PubDate PubStatus="received">"#));
    assert!(xml.contains("<Year>null</Year>"));
    assert!(xml.contains("<FirstName>Ada</FirstName>"));
    Ok(())
}

#[test]
fn generate_rejects_unknown_journal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let pdf_path = dir.path().join("article.pdf");
    let xml_path = dir.path().join("article.xml");
    fs::write(&pdf_path, b"not a pdf")?;
    fs::write(
        &xml_path,
        "<Article><Journal><JournalTitle>Journal of Unknown Studies</JournalTitle><Issn>0000-0000</Issn></Journal></Article>",
    )?;

    let mut cmd = Command::cargo_bin("jatsfront")?;
    cmd.env("NO_COLOR", "1");
    cmd.arg("generate")
        .arg("--pdf")
        .arg(&pdf_path)
        .arg("--xml")
        .arg(&xml_path)
        .arg("--url")
        .arg("http://127.0.0.1:9/a/1")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no registered shortcode"));
    Ok(())
}

#[test]
fn generate_rejects_xml_without_article() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let pdf_path = dir.path().join("article.pdf");
    let xml_path = dir.path().join("article.xml");
    fs::write(&pdf_path, b"not a pdf")?;
    fs::write(&xml_path, "<ArticleSet></ArticleSet>")?;

    let mut cmd = Command::cargo_bin("jatsfront")?;
    cmd.env("NO_COLOR", "1");
    cmd.arg("generate")
        .arg("--pdf")
        .arg(&pdf_path)
        .arg("--xml")
        .arg(&xml_path)
        .arg("--url")
        .arg("http://127.0.0.1:9/a/1")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Article element"));
    Ok(())
}
