//! Sequential term harvest: discover subjects, search each one, collect records.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::portal::{
    CourseMeeting, PortalError, SearchForm, SubjectOption, Transport, discover_subjects,
    parse_courses,
};
use crate::utils::{fmt_duration, log_if_slow};

/// Searches slower than this are logged as warnings.
const SLOW_SEARCH_THRESHOLD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub campus: String,
    /// Subjects searched back-to-back before `batch_delay`. Zero is treated as one.
    pub batch_size: usize,
    /// Pause between batches, to go easy on the portal. Not a retry mechanism.
    pub batch_delay: Duration,
    /// Restrict the harvest to these subject codes. Empty means every discovered subject.
    pub subjects: Vec<String>,
}

impl HarvestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            campus: config.campus.clone(),
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
            subjects: Vec::new(),
        }
    }
}

/// A subject whose search failed; it contributed no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFailure {
    pub subject: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct HarvestReport {
    /// Records from every successful subject, in subject order.
    pub records: Vec<CourseMeeting>,
    pub subjects_attempted: usize,
    pub failures: Vec<SubjectFailure>,
}

pub struct Harvester<'a, T: ?Sized> {
    transport: &'a T,
    options: HarvestOptions,
}

impl<'a, T: Transport + ?Sized> Harvester<'a, T> {
    pub fn new(transport: &'a T, options: HarvestOptions) -> Self {
        Self { transport, options }
    }

    /// Harvest every (selected) subject of a term.
    ///
    /// Only subject discovery can fail the run; a failing subject search is
    /// logged, recorded in the report, and skipped.
    pub async fn run(&self, term_code: &str) -> Result<HarvestReport, PortalError> {
        let start = Instant::now();
        let subjects = self.select_subjects(discover_subjects(self.transport, term_code).await?);

        let batch_size = self.options.batch_size.max(1);
        let batch_count = subjects.len().div_ceil(batch_size);
        let mut report = HarvestReport::default();

        if subjects.is_empty() {
            warn!(term = term_code, "No subjects to harvest");
        }

        for (batch_index, batch) in subjects.chunks(batch_size).enumerate() {
            debug!(
                batch = batch_index + 1,
                batches = batch_count,
                size = batch.len(),
                "Starting batch"
            );

            for subject in batch {
                report.subjects_attempted += 1;
                match self.harvest_subject(term_code, &subject.code).await {
                    Ok(courses) => {
                        info!(
                            subject = subject.code.as_str(),
                            count = courses.len(),
                            "Fetched courses"
                        );
                        report.records.extend(courses);
                    }
                    Err(e) => {
                        warn!(
                            subject = subject.code.as_str(),
                            error = %e,
                            "Failed to fetch courses, skipping"
                        );
                        report.failures.push(SubjectFailure {
                            subject: subject.code.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            if batch_index + 1 < batch_count && !self.options.batch_delay.is_zero() {
                info!(
                    delay = fmt_duration(self.options.batch_delay),
                    completed = batch_index + 1,
                    batches = batch_count,
                    "Waiting before next batch"
                );
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        info!(
            term = term_code,
            subjects = report.subjects_attempted,
            records = report.records.len(),
            failed = report.failures.len(),
            duration = fmt_duration(start.elapsed()),
            "Harvest complete"
        );
        Ok(report)
    }

    /// Run one ad-hoc search. Subjects are read from the results page itself.
    pub async fn search(&self, form: &SearchForm) -> Result<Vec<CourseMeeting>, PortalError> {
        let start = Instant::now();
        let body = self.transport.submit_search(form).await?;
        log_if_slow(start, SLOW_SEARCH_THRESHOLD, "course search");

        let courses = parse_courses(&body, None);
        info!(count = courses.len(), "Search complete");
        Ok(courses)
    }

    async fn harvest_subject(
        &self,
        term_code: &str,
        subject: &str,
    ) -> Result<Vec<CourseMeeting>, PortalError> {
        let form = SearchForm::for_subject(term_code, subject, &self.options.campus);
        let start = Instant::now();
        let body = self.transport.submit_search(&form).await?;
        log_if_slow(start, SLOW_SEARCH_THRESHOLD, "course search");

        Ok(parse_courses(&body, Some(subject)))
    }

    /// Apply the subject filter, keeping discovery order.
    fn select_subjects(&self, discovered: Vec<SubjectOption>) -> Vec<SubjectOption> {
        if self.options.subjects.is_empty() {
            return discovered;
        }

        for wanted in &self.options.subjects {
            if !discovered
                .iter()
                .any(|s| s.code.eq_ignore_ascii_case(wanted))
            {
                warn!(subject = wanted.as_str(), "Requested subject not offered this term");
            }
        }

        discovered
            .into_iter()
            .filter(|s| {
                self.options
                    .subjects
                    .iter()
                    .any(|wanted| s.code.eq_ignore_ascii_case(wanted))
            })
            .collect()
    }
}
