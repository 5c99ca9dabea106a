//! Row → [`IssueRecord`] conversion.
//!
//! A row whose `url` ends in `/issues/<n>` (n > 0) becomes an update of issue
//! `n`; every other row becomes a new issue.

use crate::error::{CifttError, Result};
use crate::issue::{IssueFields, IssueRecord, IssueState, NewIssue, StateReason, UpdatedIssue};
use crate::table::{Row, TITLE_COLUMN};
use regex::Regex;
use std::sync::OnceLock;

pub const URL_COLUMN: &str = "url";

static ISSUE_URL_RE: OnceLock<Regex> = OnceLock::new();

fn issue_url_re() -> &'static Regex {
    ISSUE_URL_RE.get_or_init(|| Regex::new(r"/issues/(\d+)$").unwrap())
}

/// Issue number referenced by `url`, if it has the `.../issues/<digits>` shape.
///
/// `Ok(None)` for no match or a zero number; `Err` when the digits overflow.
pub fn extract_issue_number(url: &str) -> std::result::Result<Option<u64>, String> {
    let Some(caps) = issue_url_re().captures(url.trim()) else {
        return Ok(None);
    };
    let number: u64 = caps[1]
        .parse()
        .map_err(|_| format!("issue number in '{url}' is out of range"))?;
    Ok((number > 0).then_some(number))
}

/// Split a comma-separated cell into trimmed, non-empty, de-duplicated tokens.
/// Returns `None` rather than an empty list.
pub fn split_list(value: Option<&str>) -> Option<Vec<String>> {
    let mut items: Vec<String> = Vec::new();
    for token in value?.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !items.iter().any(|existing| existing == token) {
            items.push(token.to_string());
        }
    }
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

pub fn transform_row(row: &Row) -> Result<IssueRecord> {
    let position = row.position();
    let issue_number = match row.get(URL_COLUMN) {
        Some(url) => extract_issue_number(url).map_err(|cause| CifttError::row(position, cause))?,
        None => None,
    };

    let title = row.get(TITLE_COLUMN).map(str::to_string);
    let fields = IssueFields {
        body: row
            .get("description")
            .or_else(|| row.get("body"))
            .map(str::to_string),
        labels: split_list(row.get("labels")),
        assignees: split_list(row.get("assignees")),
    };

    match issue_number {
        Some(issue_number) => {
            let state = row
                .get("state")
                .map(str::parse::<IssueState>)
                .transpose()
                .map_err(|cause| CifttError::row(position, cause))?;
            let state_reason = row
                .get("state_reason")
                .map(str::parse::<StateReason>)
                .transpose()
                .map_err(|cause| CifttError::row(position, cause))?;
            Ok(IssueRecord::Update(UpdatedIssue {
                issue_number,
                title,
                fields,
                state,
                state_reason,
            }))
        }
        None => {
            let title =
                title.ok_or_else(|| CifttError::row(position, "missing required 'title' value"))?;
            if row.get("state").is_some() || row.get("state_reason").is_some() {
                tracing::debug!(row = position, "ignoring state columns on a new issue");
            }
            Ok(IssueRecord::New(NewIssue { title, fields }))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
