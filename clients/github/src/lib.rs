use async_trait::async_trait;
use log::debug;
use log::error;
use popularity_board::api;
use popularity_board::api::ApiFailure;
use popularity_board::api::Contributor;
use popularity_board::api::RepositorySummary;
use popularity_board::api::RequestOutcome;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::SecretString;

mod builder;
mod payload;

pub use builder::GithubClientBuilder;

pub struct GithubClient {
    client: Client,
    github_url: String,
    token: Option<SecretString>,
}

impl GithubClient {
    /// True when a credential was configured at build time.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Issues one GET and returns the body of a 200 response. Everything else
    /// comes back as an [`ApiFailure`], nothing is raised past this point.
    async fn dispatch(&self, url: &str, query: &[(&str, String)], use_auth: bool) -> Result<String, ApiFailure> {
        let mut request = self.client.get(url).query(query);
        if use_auth {
            if let Some(token) = &self.token {
                request = request.bearer_auth(token.expose_secret());
            }
        }
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("Request to {} failed: {}", url, err);
                return Err(ApiFailure::from_error(err));
            }
        };
        let status = response.status().as_u16();
        if status != 200 {
            error!("Request to {} returned status {}", url, status);
            // Best effort, a failure body is optional.
            let body = response.text().await.ok();
            if let Some(body) = &body {
                debug!("Failure body: {}", body);
            }
            return Err(ApiFailure::from_status(status, body));
        }
        response.text().await.map_err(|err| {
            error!("Failed to read response of {}: {}", url, err);
            ApiFailure::from_error(err)
        })
    }
}

#[async_trait]
impl api::Client for GithubClient {
    async fn fetch_top_repositories(&self, per_page: u32, use_auth: bool) -> RequestOutcome<Vec<RepositorySummary>> {
        let request_url = format!("{}/search/repositories", self.github_url);
        let query = [
            ("q", "stars:>1".to_string()),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", per_page.to_string()),
        ];
        let body = match self.dispatch(&request_url, &query, use_auth).await {
            Ok(body) => body,
            Err(failure) => return RequestOutcome::Failure(failure),
        };
        match serde_json::from_str::<payload::SearchRepos>(&body) {
            Ok(repos) => {
                debug!("Found {} repositories", repos.items.len());
                let summaries = repos.items.into_iter().map(RepositorySummary::from).collect();
                RequestOutcome::Success(summaries)
            }
            Err(err) => {
                error!("Failed to decode search response: {}", err);
                RequestOutcome::Failure(ApiFailure::from_error(err))
            }
        }
    }

    async fn fetch_top_contributor(
        &self,
        repo: &RepositorySummary,
        use_auth: bool,
    ) -> RequestOutcome<Vec<Contributor>> {
        let query = [("per_page", "1".to_string())];
        match self.dispatch(&repo.contributors_url, &query, use_auth).await {
            Ok(body) => RequestOutcome::Success(payload::contributors_or_empty(&body)),
            Err(failure) => RequestOutcome::Failure(failure),
        }
    }
}
