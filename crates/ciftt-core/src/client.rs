//! GitHub issues client.
//!
//! Every request goes through one [`RateLimiter`] shared by create and
//! update. Non-2xx responses become [`CifttError::Api`]; nothing is retried.

use crate::error::{CifttError, Result};
use crate::issue::{Issue, NewIssue, UpdatedIssue};
use crate::rate_limit::RateLimiter;
use crate::repo::RepoRef;
use crate::settings::{Secret, Settings};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::Serialize;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// The two tracker operations the sync driver needs.
pub trait IssueTracker {
    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue>;

    fn update_issue(&self, repo: &RepoRef, issue_number: u64, issue: &UpdatedIssue)
        -> Result<Issue>;
}

#[derive(Debug)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    limiter: RateLimiter,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_limiter(settings, RateLimiter::default())
    }

    pub fn with_limiter(settings: &Settings, limiter: RateLimiter) -> Result<Self> {
        let http = Client::builder()
            .default_headers(default_headers(&settings.token)?)
            .build()
            .map_err(|e| CifttError::ClientInit(e.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn request<B: Serialize>(&self, method: Method, endpoint: &str, body: &B) -> Result<Issue> {
        self.limiter.acquire();

        let url = format!("{}/{endpoint}", self.base_url);
        let response = self.http.request(method.clone(), &url).json(body).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(
                method = %method,
                endpoint,
                status = status.as_u16(),
                body = %body,
                "GitHub API request failed"
            );
            return Err(CifttError::Api {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl IssueTracker for GitHubClient {
    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        let created = self.request(Method::POST, &repo.issues_endpoint(), issue)?;
        tracing::info!(repo = %repo, number = created.number, "created issue");
        Ok(created)
    }

    fn update_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        issue: &UpdatedIssue,
    ) -> Result<Issue> {
        let updated = self.request(Method::PATCH, &repo.issue_endpoint(issue_number), issue)?;
        tracing::info!(repo = %repo, number = updated.number, "updated issue");
        Ok(updated)
    }
}

fn default_headers(token: &Secret) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ciftt/", env!("CARGO_PKG_VERSION"))),
    );
    let mut auth = HeaderValue::from_str(&format!("token {}", token.expose()))
        .map_err(|_| CifttError::ClientInit("token contains invalid header characters".into()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
