use std::fs;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;

use crate::cli::{Cli, Command};

mod cli;
mod date;
mod history;
mod journal;
mod scrape;
mod template;
mod transform;
mod xml;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();
    match args.command {
        Command::Generate {
            pdf,
            xml,
            url,
            pdf_link,
            out_dir,
        } => {
            let pdf_bytes =
                fs::read(&pdf).with_context(|| format!("failed to read {}", pdf.display()))?;
            let source_xml = fs::read_to_string(&xml)
                .with_context(|| format!("failed to read {}", xml.display()))?;

            let spinner = ProgressBar::new_spinner().with_message("processing article");
            spinner.enable_steady_tick(Duration::from_millis(100));
            let result = transform::transform(&pdf_bytes, &source_xml, &url, pdf_link.as_deref());
            spinner.finish_and_clear();
            let output = result?;

            let path = out_dir.join(&output.filename);
            fs::write(&path, &output.xml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} wrote {}", "✓".green(), path.display());
        }
        Command::Combine {
            fragment,
            template,
            output,
        } => {
            let fragment_xml = fs::read_to_string(&fragment)
                .with_context(|| format!("failed to read {}", fragment.display()))?;
            let template_xml = fs::read_to_string(&template)
                .with_context(|| format!("failed to read {}", template.display()))?;
            let combined = template::combine_with_template(&fragment_xml, &template_xml)?;
            fs::write(&output, combined)
                .with_context(|| format!("failed to write {}", output.display()))?;
            eprintln!("{} wrote {}", "✓".green(), output.display());
        }
    }
    Ok(())
}
