use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// IssueState / StateReason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            _ => Err(format!("invalid state '{s}': expected open or closed")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    Completed,
    NotPlanned,
    Reopened,
}

impl StateReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StateReason::Completed => "completed",
            StateReason::NotPlanned => "not_planned",
            StateReason::Reopened => "reopened",
        }
    }
}

impl fmt::Display for StateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StateReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(StateReason::Completed),
            "not_planned" => Ok(StateReason::NotPlanned),
            "reopened" => Ok(StateReason::Reopened),
            _ => Err(format!(
                "invalid state_reason '{s}': expected completed, not_planned or reopened"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Fields shared by both payloads. `None` means "leave unchanged" and is
/// omitted from the request body; lists are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

/// Body of `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(flatten)]
    pub fields: IssueFields,
}

/// Body of `PATCH /repos/{owner}/{repo}/issues/{issue_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedIssue {
    #[serde(skip)]
    pub issue_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: IssueFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<StateReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRecord {
    New(NewIssue),
    Update(UpdatedIssue),
}

impl IssueRecord {
    pub fn title(&self) -> Option<&str> {
        match self {
            IssueRecord::New(issue) => Some(&issue.title),
            IssueRecord::Update(issue) => issue.title.as_deref(),
        }
    }

    pub fn fields(&self) -> &IssueFields {
        match self {
            IssueRecord::New(issue) => &issue.fields,
            IssueRecord::Update(issue) => &issue.fields,
        }
    }

    pub fn issue_number(&self) -> Option<u64> {
        match self {
            IssueRecord::New(_) => None,
            IssueRecord::Update(issue) => Some(issue.issue_number),
        }
    }
}

/// An issue as returned by the tracker after create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
