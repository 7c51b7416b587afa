//! Subject discovery from the portal's search page.

use html_scraper::Html;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::document::{Node, Query};
use crate::portal::client::Transport;
use crate::portal::errors::PortalError;

static SUBJECT_SELECT: LazyLock<Query> = LazyLock::new(|| Query::parse("#form-search-subject"));
static OPTION: LazyLock<Query> = LazyLock::new(|| Query::parse("option"));

/// One entry from the subject selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOption {
    /// Subject code, e.g. "ART"
    pub code: String,
    /// Display label, e.g. "Art"
    pub description: String,
}

/// Read the subject options for a term, in the order the portal lists them.
pub async fn discover_subjects<T: Transport + ?Sized>(
    transport: &T,
    term_code: &str,
) -> Result<Vec<SubjectOption>, PortalError> {
    let body = transport.fetch_subject_page(term_code).await?;
    let subjects = parse_subjects_html(&body);
    info!(term = term_code, count = subjects.len(), "Discovered subjects");
    Ok(subjects)
}

pub fn parse_subjects_html(html: &str) -> Vec<SubjectOption> {
    let document = Html::parse_document(html);
    parse_subjects(&document.root_element())
}

/// Collect `<option>`s of the subject `<select>`.
///
/// Options without a value (the "choose one" placeholder) are skipped. A page
/// without the selector yields an empty list.
pub fn parse_subjects<N: Node>(root: &N) -> Vec<SubjectOption> {
    let Some(select) = root.find_first(&SUBJECT_SELECT) else {
        debug!("Subject selector not found");
        return Vec::new();
    };

    select
        .find(&OPTION)
        .into_iter()
        .filter_map(|option| {
            let code = option.attribute("value")?.trim();
            if code.is_empty() {
                return None;
            }
            Some(SubjectOption {
                code: code.to_string(),
                description: option.text_content().trim().to_string(),
            })
        })
        .collect()
}
