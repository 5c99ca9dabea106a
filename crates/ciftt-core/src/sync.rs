//! Table → tracker synchronization.
//!
//! Rows are processed strictly in order. A transform or API failure is
//! recorded against its row and the sweep continues; only errors raised
//! before the sweep (loading, argument parsing, client setup) abort a run.

use crate::client::IssueTracker;
use crate::error::{CifttError, Result};
use crate::issue::{Issue, IssueRecord};
use crate::repo::RepoRef;
use crate::table::{Row, Table};
use crate::transform::transform_row;
use serde::Serialize;
use std::fmt;

pub enum Mode<'a> {
    /// Transform every row and report the intended action without calling the tracker.
    DryRun,
    Live(&'a dyn IssueTracker),
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    WouldCreate {
        title: String,
    },
    WouldUpdate {
        number: u64,
        title: Option<String>,
    },
    Created {
        number: u64,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Updated {
        number: u64,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Failed {
        reason: String,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::WouldCreate { title } => write!(f, "would create: {title}"),
            Outcome::WouldUpdate {
                number,
                title: Some(title),
            } => write!(f, "would update #{number}: {title}"),
            Outcome::WouldUpdate {
                number,
                title: None,
            } => write!(f, "would update #{number}"),
            Outcome::Created { number, title, .. } => write!(f, "created #{number}: {title}"),
            Outcome::Updated { number, title, .. } => write!(f, "updated #{number}: {title}"),
            Outcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.outcome)
    }
}

// ---------------------------------------------------------------------------
// SyncReport
// ---------------------------------------------------------------------------

/// Per-action totals. Dry-run intents count towards `created` and `updated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub counts: Counts,
    pub outcomes: Vec<RowOutcome>,
}

impl SyncReport {
    fn record(&mut self, row_outcome: RowOutcome) {
        match row_outcome.outcome {
            Outcome::Created { .. } | Outcome::WouldCreate { .. } => self.counts.created += 1,
            Outcome::Updated { .. } | Outcome::WouldUpdate { .. } => self.counts.updated += 1,
            Outcome::Failed { .. } => self.counts.failed += 1,
        }
        self.outcomes.push(row_outcome);
    }

    pub fn created(&self) -> usize {
        self.counts.created
    }

    pub fn updated(&self) -> usize {
        self.counts.updated
    }

    pub fn failed(&self) -> usize {
        self.counts.failed
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
    }

    /// "2 created, 1 updated, 0 failed", or "2 to create, 1 to update, 0 failed" in a dry run.
    pub fn summary(&self) -> String {
        let (created, updated) = if self.dry_run {
            ("to create", "to update")
        } else {
            ("created", "updated")
        };
        format!(
            "{} {created}, {} {updated}, {} failed",
            self.counts.created, self.counts.updated, self.counts.failed
        )
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Sync every row of `table` into `repo`. `on_row` sees each outcome as soon
/// as its row is done, so callers can report progress during rate-limit waits.
pub fn sync_table(
    table: &Table,
    repo: &RepoRef,
    mode: Mode<'_>,
    mut on_row: impl FnMut(&RowOutcome),
) -> SyncReport {
    let mut report = SyncReport {
        dry_run: matches!(mode, Mode::DryRun),
        counts: Counts::default(),
        outcomes: Vec::with_capacity(table.len()),
    };

    for row in table.rows() {
        let outcome = match process_row(row, repo, &mode) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug_assert!(e.is_row_scoped(), "setup error raised inside a row: {e}");
                tracing::warn!(row = row.position(), error = %e, "row failed");
                Outcome::Failed {
                    reason: failure_reason(e),
                }
            }
        };
        let row_outcome = RowOutcome {
            row: row.position(),
            outcome,
        };
        on_row(&row_outcome);
        report.record(row_outcome);
    }

    tracing::debug!(summary = %report.summary(), "sync finished");
    report
}

fn process_row(row: &Row, repo: &RepoRef, mode: &Mode<'_>) -> Result<Outcome> {
    let record = transform_row(row)?;
    tracing::debug!(row = row.position(), issue_number = ?record.issue_number(), "dispatching row");

    match (mode, record) {
        (Mode::DryRun, IssueRecord::New(issue)) => Ok(Outcome::WouldCreate { title: issue.title }),
        (Mode::DryRun, IssueRecord::Update(issue)) => Ok(Outcome::WouldUpdate {
            number: issue.issue_number,
            title: issue.title,
        }),
        (Mode::Live(tracker), IssueRecord::New(issue)) => {
            let Issue {
                number,
                title,
                html_url,
                ..
            } = tracker.create_issue(repo, &issue)?;
            Ok(Outcome::Created {
                number,
                title,
                url: html_url,
            })
        }
        (Mode::Live(tracker), IssueRecord::Update(issue)) => {
            let Issue {
                number,
                title,
                html_url,
                ..
            } = tracker.update_issue(repo, issue.issue_number, &issue)?;
            Ok(Outcome::Updated {
                number,
                title,
                url: html_url,
            })
        }
    }
}

/// Row errors already carry their position; strip it so the report does not repeat it.
fn failure_reason(e: CifttError) -> String {
    match e {
        CifttError::Row { cause, .. } => cause,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
