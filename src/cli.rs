use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::portal::SearchForm;

/// Export public course-section listings from the course search portal.
#[derive(Debug, Parser)]
#[command(name = "coursesearch", version)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Compact, human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every subject offered in a term and write one export file
    Harvest {
        /// Term code, e.g. 202601
        #[arg(long)]
        term: String,
        /// Campus code; defaults to the configured campus
        #[arg(long)]
        campus: Option<String>,
        /// Only harvest these subject codes (repeatable)
        #[arg(long = "subject", value_name = "CODE")]
        subjects: Vec<String>,
        /// Export path; `.tsv` selects tab-separated output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the subject codes offered in a term
    Subjects {
        #[arg(long)]
        term: String,
    },
    /// Run a single search and export its results
    Search(SearchArgs),
}

#[derive(Debug, clap::Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub term: String,
    /// Subject codes to include (repeatable); omit to search all subjects
    #[arg(long = "subject", value_name = "CODE")]
    pub subjects: Vec<String>,
    #[arg(long)]
    pub campus: Option<String>,
    #[arg(long)]
    pub crn: Option<String>,
    #[arg(long)]
    pub instructor: Option<String>,
    #[arg(long)]
    pub keyword: Option<String>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SearchArgs {
    pub fn to_form(&self, default_campus: &str) -> SearchForm {
        SearchForm {
            subjects: self.subjects.clone(),
            campus: self
                .campus
                .clone()
                .unwrap_or_else(|| default_campus.to_string()),
            crn: self.crn.clone().unwrap_or_default(),
            instructor: self.instructor.clone().unwrap_or_default(),
            keyword: self.keyword.clone().unwrap_or_default(),
            ..SearchForm::new(self.term.as_str())
        }
    }
}
