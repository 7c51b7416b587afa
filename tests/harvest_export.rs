//! End-to-end harvest against a scripted portal: subject discovery, per-subject
//! searches (one of which fails), extraction, and the final export file.

use async_trait::async_trait;
use coursesearch::export::{COURSE_COLUMNS, ExportSink};
use coursesearch::harvest::{HarvestOptions, Harvester};
use coursesearch::portal::{PortalError, SearchForm, Transport};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Subject page plus one canned results page per subject code.
/// Subjects without a page answer with HTTP 500.
struct ScriptedPortal {
    subject_page: String,
    results: HashMap<String, String>,
}

#[async_trait]
impl Transport for ScriptedPortal {
    async fn fetch_subject_page(&self, term_code: &str) -> Result<String, PortalError> {
        assert_eq!(term_code, "202601");
        Ok(self.subject_page.clone())
    }

    async fn submit_search(&self, form: &SearchForm) -> Result<String, PortalError> {
        let subject = form.subjects.first().cloned().unwrap_or_default();
        self.results
            .get(&subject)
            .cloned()
            .ok_or_else(|| PortalError::BadStatus {
                status: 500,
                url: format!("https://portal.test/search/?subject={subject}"),
            })
    }
}

fn meeting(active: &str, time: &str) -> String {
    let days: String = ['M', 'T', 'W', 'R', 'F']
        .iter()
        .map(|day| {
            let class = if active.contains(*day) { "day active" } else { "day" };
            format!(r#"<td class="{class}">{day}</td>"#)
        })
        .collect();
    format!(
        r#"<div><table class="table-course-days"><tr>{days}</tr></table><span class="break">{time}</span></div>"#
    )
}

fn row(crn: &str, title: &str, schedule: &str, seats: &str) -> String {
    let mut cells = vec![
        crn.to_string(),
        "IGNORED".to_string(),
        title.to_string(),
        "3".to_string(),
        "Smith,\n   Jane".to_string(),
    ];
    cells.extend(["", "", "", ""].map(String::from));
    cells.push(schedule.to_string());
    cells.extend(["", ""].map(String::from));
    cells.push("<strong>CMB 2071</strong> Center for Art".to_string());
    cells.extend(["", ""].map(String::from));
    cells.push(seats.to_string());

    let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
    format!("<tr>{tds}</tr>")
}

fn results_page(rows: &[String]) -> String {
    format!(
        r#"<html><body><table id="results-table"><thead><tr><th>CRN</th></tr></thead><tbody>{}</tbody></table></body></html>"#,
        rows.concat()
    )
}

fn portal() -> ScriptedPortal {
    let subject_page = r#"<html><body><form>
        <select id="form-search-subject">
            <option value="">-- Select --</option>
            <option value="ART">Art</option>
            <option value="BIOL">Biology</option>
            <option value="CHEM">Chemistry</option>
        </select></form></body></html>"#
        .to_string();

    let mut results = HashMap::new();
    results.insert(
        "ART".to_string(),
        results_page(&[
            row("80001", "Drawing I", &meeting("MWF", "9:00 am - 9:50 am"), "(12 / 30)"),
            row(
                "80002",
                "Ceramics",
                &format!(
                    "{}{}",
                    meeting("TR", "9:30 am - 10:45 am"),
                    meeting("W", "6:00 pm - 8:45 pm")
                ),
                "(20 / 20)",
            ),
            row("80003", "Independent Study", "TBA", "(1 / 5)"),
        ]),
    );
    results.insert(
        "CHEM".to_string(),
        results_page(&[row(
            "01234",
            "Principles of Chemistry",
            &meeting("TR", "1:00 pm - 2:15 pm"),
            "",
        )]),
    );

    ScriptedPortal {
        subject_page,
        results,
    }
}

fn options() -> HarvestOptions {
    HarvestOptions {
        campus: "10".to_string(),
        batch_size: 2,
        batch_delay: Duration::from_millis(1),
        subjects: Vec::new(),
    }
}

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("coursesearch_e2e_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

#[tokio::test]
async fn harvest_collects_records_and_skips_failed_subject() {
    let portal = portal();
    let report = Harvester::new(&portal, options())
        .run("202601")
        .await
        .unwrap();

    assert_eq!(report.subjects_attempted, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].subject, "BIOL");
    assert!(report.failures[0].error.contains("500"));

    // ART: 1 + 2 (+0 for the TBA section), CHEM: 1
    assert_eq!(report.records.len(), 4);

    let crns: Vec<_> = report.records.iter().map(|r| r.crn.as_str()).collect();
    assert_eq!(crns, vec!["80001", "80002", "80002", "01234"]);

    // Subject comes from the harvest, not the row's own column
    assert!(report.records[..3].iter().all(|r| r.subject == "ART"));
    assert_eq!(report.records[3].subject, "CHEM");

    let (b1, b2) = (&report.records[1], &report.records[2]);
    assert_eq!(b1.title, b2.title);
    assert_eq!(b1.instructor, "Smith, Jane");
    assert_eq!(b1.instructor, b2.instructor);
    assert_eq!(b1.seats_available, "0");
    assert_eq!(b1.seats_available, b2.seats_available);
    assert_eq!((b1.days.as_str(), b2.days.as_str()), ("TR", "W"));
    assert_eq!(b2.start_time, "6:00 pm");
    assert_eq!(b2.end_time, "8:45 pm");
    assert_eq!(b1.location, "CMB 2071");

    assert_eq!(report.records[3].seats_available, "");
}

#[tokio::test]
async fn harvest_export_round_trip_to_file() {
    let portal = portal();
    let report = Harvester::new(&portal, options())
        .run("202601")
        .await
        .unwrap();

    let dir = tmp_path("export");
    let sink = ExportSink::new(dir.join("courses.csv"));
    let written = sink.write(&COURSE_COLUMNS, &report.records).unwrap();
    assert_eq!(written, 4);

    let contents = fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "CRN,Subject,Title,Hours,Instructor,Days,Start Time,End Time,Location,Seats Available"
    );
    assert_eq!(
        lines[1],
        "80001,ART,Drawing I,3,\"Smith, Jane\",MWF,9:00 am,9:50 am,CMB 2071,18"
    );
    // Leading zero survives
    assert!(lines[4].starts_with("01234,CHEM,"));

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn harvest_with_subject_filter() {
    let portal = portal();
    let mut opts = options();
    opts.subjects = vec!["chem".to_string()];
    let report = Harvester::new(&portal, opts).run("202601").await.unwrap();

    assert_eq!(report.subjects_attempted, 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].subject, "CHEM");
}
