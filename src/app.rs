use crate::cli::{Command, SearchArgs};
use crate::config::Config;
use crate::export::{COURSE_COLUMNS, ExportSink};
use crate::harvest::{HarvestOptions, Harvester};
use crate::portal::{PortalClient, discover_subjects};
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Main application struct: configuration plus the portal client every command shares.
pub struct App {
    config: Config,
    client: PortalClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let client = PortalClient::from_config(&config).context("Failed to create portal client")?;

        info!(
            portal = config.portal_url.as_str(),
            campus = config.campus.as_str(),
            batch_size = config.batch_size,
            batch_delay = crate::utils::fmt_duration(config.batch_delay),
            "portal client configured"
        );
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        Ok(Self { config, client })
    }

    /// Run a single command to completion.
    pub async fn run(&self, command: Command) -> ExitCode {
        let result = match command {
            Command::Harvest {
                term,
                campus,
                subjects,
                output,
            } => self.harvest(&term, campus, subjects, output).await,
            Command::Subjects { term } => self.list_subjects(&term).await,
            Command::Search(args) => self.search(&args).await,
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = ?e, "Command failed");
                ExitCode::FAILURE
            }
        }
    }

    async fn harvest(
        &self,
        term: &str,
        campus: Option<String>,
        subjects: Vec<String>,
        output: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        let mut options = HarvestOptions::from_config(&self.config);
        if let Some(campus) = campus {
            options.campus = campus;
        }
        options.subjects = subjects;

        let report = Harvester::new(&self.client, options)
            .run(term)
            .await
            .with_context(|| format!("Failed to discover subjects for term {term}"))?;

        for failure in &report.failures {
            warn!(
                subject = failure.subject.as_str(),
                error = failure.error.as_str(),
                "Subject missing from export"
            );
        }

        let sink = ExportSink::new(output.unwrap_or_else(|| self.config.output.clone()));
        let written = sink.write(&COURSE_COLUMNS, &report.records)?;
        info!(
            path = %sink.path().display(),
            records = written,
            subjects = report.subjects_attempted,
            failed = report.failures.len(),
            "Export written"
        );
        Ok(())
    }

    async fn list_subjects(&self, term: &str) -> anyhow::Result<()> {
        let subjects = discover_subjects(&self.client, term)
            .await
            .with_context(|| format!("Failed to fetch subjects for term {term}"))?;

        let mut stdout = std::io::stdout().lock();
        for subject in &subjects {
            writeln!(stdout, "{}\t{}", subject.code, subject.description)?;
        }
        Ok(())
    }

    async fn search(&self, args: &SearchArgs) -> anyhow::Result<()> {
        let form = args.to_form(&self.config.campus);
        let courses = Harvester::new(&self.client, HarvestOptions::from_config(&self.config))
            .search(&form)
            .await
            .context("Course search failed")?;

        let sink = ExportSink::new(
            args.output
                .clone()
                .unwrap_or_else(|| self.config.output.clone()),
        );
        let written = sink.write(&COURSE_COLUMNS, &courses)?;
        info!(path = %sink.path().display(), records = written, "Export written");
        Ok(())
    }
}
