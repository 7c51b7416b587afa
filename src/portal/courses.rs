//! Course results page extraction.
//!
//! The results page is a single `#results-table`. Each body row is one course
//! section; its schedule cell embeds one `table.table-course-days` per meeting
//! pattern, each followed by a `span.break` holding the time range:
//!
//! ```text
//! <td>                                   (schedule column)
//!   <table class="table-course-days">
//!     <tr><td class="day active">M</td><td class="day">T</td>...</tr>
//!   </table>
//!   <span class="break">9:30 am - 10:45 am</span>
//!   ...one table/span pair per pattern
//! </td>
//! ```
//!
//! Extraction is best-effort: anything missing becomes an empty string, and a
//! page that doesn't look like a results page yields no records.

use html_scraper::Html;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use crate::document::{Node, Query};

static RESULTS_TABLE: LazyLock<Query> = LazyLock::new(|| Query::parse("#results-table"));
static TABLE_BODY: LazyLock<Query> = LazyLock::new(|| Query::parse("tbody"));
static ROW: LazyLock<Query> = LazyLock::new(|| Query::parse("tr"));
static CELL: LazyLock<Query> = LazyLock::new(|| Query::parse("td"));
static MEETING_TABLE: LazyLock<Query> =
    LazyLock::new(|| Query::parse("table.table-course-days"));
static DAY_CELL: LazyLock<Query> = LazyLock::new(|| Query::parse("td.day"));
static TIME_FRAGMENT: LazyLock<Query> = LazyLock::new(|| Query::parse("span.break"));
static EMPHASIS: LazyLock<Query> = LazyLock::new(|| Query::parse("strong"));

/// "(enrolled / capacity)"
static SEATS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\s*/\s*(\d+)\)").unwrap());

/// Cell positions within a results row.
mod column {
    pub const CRN: usize = 0;
    pub const SUBJECT: usize = 1;
    pub const TITLE: usize = 2;
    pub const HOURS: usize = 3;
    pub const INSTRUCTOR: usize = 4;
    pub const SCHEDULE: usize = 9;
    pub const LOCATION: usize = 12;
    pub const SEATS: usize = 15;
}

/// One meeting pattern of one course section.
///
/// A section that meets on two different day/time patterns produces two
/// records sharing every non-meeting field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseMeeting {
    /// Kept as text; CRNs can carry leading zeros.
    pub crn: String,
    pub subject: String,
    pub title: String,
    /// Opaque; may be a range like "1-3".
    pub hours: String,
    pub instructor: String,
    /// Active day codes in weekly order, e.g. "MWF". Empty for TBA/online.
    pub days: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    /// `capacity - enrolled`, or empty when the cell had no "(x / y)" pair.
    pub seats_available: String,
}

impl CourseMeeting {
    /// Look up a field by its export column title.
    pub fn field(&self, column: &str) -> Option<&str> {
        let value = match column {
            "CRN" => &self.crn,
            "Subject" => &self.subject,
            "Title" => &self.title,
            "Hours" => &self.hours,
            "Instructor" => &self.instructor,
            "Days" => &self.days,
            "Start Time" => &self.start_time,
            "End Time" => &self.end_time,
            "Location" => &self.location,
            "Seats Available" => &self.seats_available,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Parse a raw results page. See [`extract_courses`].
pub fn parse_courses(html: &str, subject_hint: Option<&str>) -> Vec<CourseMeeting> {
    let document = Html::parse_document(html);
    extract_courses(&document.root_element(), subject_hint)
}

/// Flatten every section row of a results page into meeting records.
///
/// When `subject_hint` is given it is used as every record's subject;
/// otherwise the subject is read from the row's own subject column.
pub fn extract_courses<N: Node>(root: &N, subject_hint: Option<&str>) -> Vec<CourseMeeting> {
    let Some(table) = root.find_first(&RESULTS_TABLE) else {
        trace!("No results table on page");
        return Vec::new();
    };

    let mut courses = Vec::new();
    for body in table.children_matching(&TABLE_BODY) {
        for row in body.children_matching(&ROW) {
            let cells = row.children_matching(&CELL);
            if cells.is_empty() {
                continue;
            }
            extract_section(&cells, subject_hint, &mut courses);
        }
    }
    courses
}

/// Per-section fields shared by all of the section's meeting records.
fn extract_section<N: Node>(
    cells: &[N],
    subject_hint: Option<&str>,
    out: &mut Vec<CourseMeeting>,
) {
    let cell_text = |index: usize| {
        cells
            .get(index)
            .map(|cell| cell.text_content().trim().to_string())
            .unwrap_or_default()
    };

    let crn = cell_text(column::CRN);
    let subject = match subject_hint {
        Some(code) => code.to_string(),
        None => cell_text(column::SUBJECT),
    };
    let title = cell_text(column::TITLE);
    let hours = cell_text(column::HOURS);
    let instructor = cells
        .get(column::INSTRUCTOR)
        .map(|cell| normalize_whitespace(&cell.text_content()))
        .unwrap_or_default();
    let seats_available = cells
        .get(column::SEATS)
        .map(|cell| seats_available(&cell.text_content()))
        .unwrap_or_default();
    let location = cells
        .get(column::LOCATION)
        .map(location_text)
        .unwrap_or_default();

    let patterns = cells
        .get(column::SCHEDULE)
        .map(meeting_patterns)
        .unwrap_or_default();

    // Sections without day tables (TBA, some fully online) produce no records.
    if patterns.is_empty() {
        trace!(crn = crn.as_str(), "Section has no meeting patterns, skipping");
        return;
    }

    for pattern in patterns {
        let (start_time, end_time) = pattern
            .time
            .as_deref()
            .map(split_time_range)
            .unwrap_or_default();

        out.push(CourseMeeting {
            crn: crn.clone(),
            subject: subject.clone(),
            title: title.clone(),
            hours: hours.clone(),
            instructor: instructor.clone(),
            days: pattern.days,
            start_time,
            end_time,
            location: location.clone(),
            seats_available: seats_available.clone(),
        });
    }
}

#[derive(Debug)]
struct MeetingPattern {
    days: String,
    time: Option<String>,
}

/// Walk the schedule cell in document order, opening a pattern at each day
/// table and attaching the first time fragment that follows it.
fn meeting_patterns<N: Node>(schedule: &N) -> Vec<MeetingPattern> {
    let mut patterns: Vec<MeetingPattern> = Vec::new();

    for node in schedule.descendants() {
        if node.matches(&MEETING_TABLE) {
            patterns.push(MeetingPattern {
                days: active_days(&node),
                time: None,
            });
        } else if node.matches(&TIME_FRAGMENT)
            && let Some(current) = patterns.last_mut()
            && current.time.is_none()
        {
            current.time = Some(node.text_content());
        }
    }

    patterns
}

/// Concatenate the codes of day cells flagged `active`, in the table's order.
fn active_days<N: Node>(meeting_table: &N) -> String {
    meeting_table
        .find(&DAY_CELL)
        .iter()
        .filter(|cell| cell.has_class("active"))
        .map(|cell| cell.text_content().trim().to_string())
        .collect()
}

/// Prefer the emphasized room text; fall back to the whole cell.
fn location_text<N: Node>(cell: &N) -> String {
    let emphasized = cell
        .find_first(&EMPHASIS)
        .map(|strong| strong.text_content().trim().to_string())
        .unwrap_or_default();

    if emphasized.is_empty() {
        cell.text_content().trim().to_string()
    } else {
        emphasized
    }
}

/// Split "9:30 am - 10:45 am" on the first hyphen.
///
/// Text without a hyphen (e.g. "TBA") yields two empty strings.
fn split_time_range(text: &str) -> (String, String) {
    match text.trim().split_once('-') {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (String::new(), String::new()),
    }
}

/// Seats left from an "(enrolled / capacity)" fragment.
///
/// Over-enrolled sections report "0". Returns an empty string when no pair is present.
fn seats_available(text: &str) -> String {
    SEATS_RE
        .captures(text)
        .and_then(|caps| {
            let enrolled: u32 = caps[1].parse().ok()?;
            let capacity: u32 = caps[2].parse().ok()?;
            Some(capacity.saturating_sub(enrolled).to_string())
        })
        .unwrap_or_default()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
