use crate::error::{CifttError, Result};
use serde::Serialize;
use std::fmt;

/// A repository reference in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || CifttError::InvalidRepo(s.to_string());
        let (owner, name) = s.split_once('/').ok_or_else(invalid)?;
        let valid = |part: &str| !part.is_empty() && !part.contains(['/', ' ', '\t', '\n']);
        if !valid(owner) || !valid(name) {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn issues_endpoint(&self) -> String {
        format!("repos/{}/{}/issues", self.owner, self.name)
    }

    pub fn issue_endpoint(&self, issue_number: u64) -> String {
        format!("{}/{issue_number}", self.issues_endpoint())
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoRef {
    type Err = CifttError;

    fn from_str(s: &str) -> Result<Self> {
        RepoRef::parse(s)
    }
}
