use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the restructured article XML from a PDF, source XML and article URL
    Generate {
        /// Path to the article PDF
        #[arg(long, value_name = "FILE")]
        pdf: PathBuf,
        /// Path to the source XML metadata file
        #[arg(long, value_name = "FILE")]
        xml: PathBuf,
        /// URL of the article web page
        #[arg(long, value_name = "URL")]
        url: String,
        /// Direct URL to the PDF file
        #[arg(long, value_name = "URL")]
        pdf_link: Option<String>,
        /// Directory the generated file is written into
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Splice a generated fragment into a template's front section
    Combine {
        /// Path to the generated article XML fragment
        #[arg(long, value_name = "FILE")]
        fragment: PathBuf,
        /// Path to the template XML containing <front> markers
        #[arg(long, value_name = "FILE")]
        template: PathBuf,
        /// Where to write the combined document
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}
