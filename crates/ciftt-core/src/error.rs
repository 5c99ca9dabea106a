use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CifttError {
    #[error("failed to load table '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("table is missing required 'title' column")]
    MissingTitleColumn,

    #[error("empty title values found in rows: {rows:?}")]
    BlankTitles { rows: Vec<usize> },

    #[error("repository must be in format 'owner/repo', got '{0}'")]
    InvalidRepo(String),

    #[error("invalid delimiter '{0}': expected a single character or 'tab'")]
    InvalidDelimiter(String),

    #[error("GITHUB_TOKEN is not set: export it or add it to a .env file")]
    MissingToken,

    #[error("failed to initialize GitHub client: {0}")]
    ClientInit(String),

    #[error("row {position}: {cause}")]
    Row { position: usize, cause: String },

    #[error("GitHub API {method} {endpoint} failed with status {status}: {body}")]
    Api {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CifttError {
    pub fn row(position: usize, cause: impl Into<String>) -> Self {
        CifttError::Row {
            position,
            cause: cause.into(),
        }
    }

    /// Errors that belong to a single row and must not abort the run.
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            CifttError::Row { .. }
                | CifttError::Api { .. }
                | CifttError::Http(_)
                | CifttError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CifttError>;
