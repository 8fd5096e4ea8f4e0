use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error: {0}")]
    Error(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Sentinel shown in place of contributor fields when no contributor is known.
pub const UNAVAILABLE: &str = "Unavailable";

/// Result of a single API request.
///
/// A request never errors past the client boundary; every failure mode ends up
/// reified in [`ApiFailure`].
#[derive(Debug)]
pub enum RequestOutcome<T> {
    Success(T),
    Failure(ApiFailure),
}

/// A failed API request.
///
/// Which fields are populated depends on how far the request got: a response
/// with a bad status keeps the status and a best-effort copy of the body,
/// while a request that produced no response at all keeps only the error.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub error: Option<Error>,
}

impl ApiFailure {
    pub fn from_status(status: u16, body: Option<String>) -> Self {
        ApiFailure {
            status: Some(status),
            body,
            error: None,
        }
    }

    pub fn from_error<ERR: Into<anyhow::Error>>(error: ERR) -> Self {
        ApiFailure {
            status: None,
            body: None,
            error: Some(Error::Other(error.into())),
        }
    }

    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }

    /// Structured form of the failure body, parsed on demand.
    ///
    /// `None` when no body was kept or the body is not the documented error
    /// shape. Never fails.
    pub fn failure_body(&self) -> Option<FailureBody> {
        let body = self.body.as_ref()?;
        serde_json::from_str(body).ok()
    }
}

impl Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, &self.error) {
            (Some(status), _) => f.write_fmt(format_args!("status {}", status)),
            (None, Some(error)) => f.write_fmt(format_args!("{}", error)),
            (None, None) => f.write_str("request failed"),
        }
    }
}

/// Error body returned by the API alongside non-200 statuses.
#[derive(Deserialize, Debug, PartialEq, Eq)]
pub struct FailureBody {
    pub message: String,
    pub documentation_url: String,
}

/// One repository as returned by the search API, owner flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub owner_name: Option<String>,
    pub owner_url: Option<String>,
    pub full_name: String,
    pub description: Option<String>,
    pub contributors_url: String,
    pub stars: u32,
    pub html_url: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub login: String,
    pub url: String,
    pub contributions: u64,
}

impl Contributor {
    pub fn new<STR: Into<String>>(login: STR, url: STR, contributions: u64) -> Self {
        Contributor {
            login: login.into(),
            url: url.into(),
            contributions,
        }
    }
}

/// One row of the board: a repository joined with its top contributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRepository {
    pub id: u64,
    pub name: String,
    pub owner_name: Option<String>,
    pub owner_url: Option<String>,
    pub full_name: String,
    pub description: Option<String>,
    pub contributors_url: String,
    pub stars: u32,
    pub html_url: String,
    pub language: Option<String>,
    pub contributor_login: String,
    pub contributor_url: String,
    pub contributions: u64,
}

impl AggregatedRepository {
    /// Left join of a repository with its top contributor, if any.
    pub fn join(summary: RepositorySummary, contributor: Option<Contributor>) -> Self {
        let (contributor_login, contributor_url, contributions) = match contributor {
            Some(contributor) => (contributor.login, contributor.url, contributor.contributions),
            None => (UNAVAILABLE.to_string(), UNAVAILABLE.to_string(), 0),
        };
        AggregatedRepository {
            id: summary.id,
            name: summary.name,
            owner_name: summary.owner_name,
            owner_url: summary.owner_url,
            full_name: summary.full_name,
            description: summary.description,
            contributors_url: summary.contributors_url,
            stars: summary.stars,
            html_url: summary.html_url,
            language: summary.language,
            contributor_login,
            contributor_url,
            contributions,
        }
    }
}

impl Display for AggregatedRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "repo: {}\tstars: {}\ttop contributor: {}\tcontributions: {}",
            self.full_name, self.stars, self.contributor_login, self.contributions
        ))
    }
}

#[async_trait]
pub trait Client: Send + Sync {
    /// Fetches the most starred repositories, one page of `per_page` results.
    async fn fetch_top_repositories(&self, per_page: u32, use_auth: bool) -> RequestOutcome<Vec<RepositorySummary>>;

    /// Fetches the top contributor of `repo`, at most one result.
    async fn fetch_top_contributor(&self, repo: &RepositorySummary, use_auth: bool)
        -> RequestOutcome<Vec<Contributor>>;
}

/// Tests

#[cfg(test)]
fn summary(id: u64, full_name: &str) -> RepositorySummary {
    RepositorySummary {
        id,
        name: full_name.split('/').last().unwrap().to_string(),
        owner_name: Some(full_name.split('/').next().unwrap().to_string()),
        owner_url: Some(format!("https://github.com/{}", full_name)),
        full_name: full_name.to_string(),
        description: None,
        contributors_url: format!("https://api.github.com/repos/{}/contributors", full_name),
        stars: 100,
        html_url: format!("https://github.com/{}", full_name),
        language: Some("Rust".to_string()),
    }
}

#[test]
fn failure_body_parse_test() {
    let body = r#"{"message": "Bad credentials", "documentation_url": "https://docs.github.com/rest"}"#;
    let failure = ApiFailure::from_status(401, Some(body.to_string()));
    let parsed = failure.failure_body().unwrap();
    assert_eq!(parsed.message, "Bad credentials");
    assert_eq!(parsed.documentation_url, "https://docs.github.com/rest");
}

#[test]
fn failure_body_ignores_unknown_fields_test() {
    let body = r#"{"message": "rate limited", "documentation_url": "https://docs.github.com", "status": "403"}"#;
    let failure = ApiFailure::from_status(403, Some(body.to_string()));
    assert_eq!(failure.failure_body().unwrap().message, "rate limited");
}

#[test]
fn failure_body_not_json_test() {
    let failure = ApiFailure::from_status(500, Some("Internal Server Error".to_string()));
    assert_eq!(failure.failure_body(), None);
}

#[test]
fn failure_body_incomplete_test() {
    let failure = ApiFailure::from_status(403, Some(r#"{"message": "no documentation link"}"#.to_string()));
    assert_eq!(failure.failure_body(), None);
}

#[test]
fn failure_body_absent_test() {
    let failure = ApiFailure::from_status(502, None);
    assert_eq!(failure.failure_body(), None);
    let failure = ApiFailure::from_error(anyhow::anyhow!("connection refused"));
    assert_eq!(failure.failure_body(), None);
}

#[test]
fn join_with_contributor_test() {
    let contributor = Contributor::new("octocat", "https://api.github.com/users/octocat", 42);
    let joined = AggregatedRepository::join(summary(1, "octocat/hello"), Some(contributor));
    assert_eq!(joined.full_name, "octocat/hello");
    assert_eq!(joined.contributor_login, "octocat");
    assert_eq!(joined.contributor_url, "https://api.github.com/users/octocat");
    assert_eq!(joined.contributions, 42);
}

#[test]
fn join_without_contributor_test() {
    let joined = AggregatedRepository::join(summary(1, "octocat/hello"), None);
    assert_eq!(joined.contributor_login, UNAVAILABLE);
    assert_eq!(joined.contributor_url, UNAVAILABLE);
    assert_eq!(joined.contributions, 0);
}

#[test]
fn is_status_test() {
    let failure = ApiFailure::from_status(403, None);
    assert!(failure.is_status(403));
    assert!(!failure.is_status(401));
    assert!(!ApiFailure::from_error(anyhow::anyhow!("timed out")).is_status(403));
}
