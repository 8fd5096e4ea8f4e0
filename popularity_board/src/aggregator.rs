use crate::api::{AggregatedRepository, ApiFailure, Client, Contributor, RepositorySummary, RequestOutcome};
use derive_more::Constructor;
use futures::{stream, StreamExt};
use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of joining one page of repositories with their top contributors.
#[derive(Debug, Constructor)]
pub struct Aggregation {
    pub repos: Vec<AggregatedRepository>,
    pub failure: Option<ApiFailure>,
    pub use_auth: bool,
}

#[derive(Constructor)]
pub struct Aggregator<CLIENT: Client> {
    client: Arc<CLIENT>,
    max_contrib_requests: usize,
}

impl<CLIENT: Client> Aggregator<CLIENT> {
    /// Fetches the top contributor of every repository, at most
    /// `max_contrib_requests` requests in flight, and joins the results.
    ///
    /// Rows keep the order of `summaries` regardless of response order. A 401
    /// response drops the credential for the remaining requests of the batch,
    /// a 403 response is kept for display; the last 403 in input order wins.
    pub async fn aggregate(&self, summaries: Vec<RepositorySummary>, use_auth: bool) -> Aggregation {
        let auth_flag = AtomicBool::new(use_auth);
        let auth = &auth_flag;
        let client = self.client.as_ref();
        let mut outcomes: Vec<(usize, RepositorySummary, RequestOutcome<Vec<Contributor>>)> =
            stream::iter(summaries.into_iter().enumerate())
                .map(|(index, summary)| async move {
                    let outcome = client
                        .fetch_top_contributor(&summary, auth.load(Ordering::Relaxed))
                        .await;
                    if let RequestOutcome::Failure(failure) = &outcome {
                        if failure.is_status(401) {
                            auth.store(false, Ordering::Relaxed);
                        }
                    }
                    (index, summary, outcome)
                })
                .buffer_unordered(self.max_contrib_requests)
                .collect()
                .await;
        outcomes.sort_unstable_by_key(|(index, _, _)| *index);
        let mut repos = Vec::with_capacity(outcomes.len());
        let mut surfaced = None;
        for (_, summary, outcome) in outcomes {
            match outcome {
                RequestOutcome::Success(contributors) => {
                    let top = contributors.into_iter().next();
                    repos.push(AggregatedRepository::join(summary, top));
                }
                RequestOutcome::Failure(failure) if failure.is_status(401) => {
                    error!("Credential rejected fetching contributor of {}: {}", summary.full_name, failure);
                }
                RequestOutcome::Failure(failure) if failure.is_status(403) => {
                    error!("Rate limited fetching contributor of {}: {}", summary.full_name, failure);
                    surfaced = Some(failure);
                }
                RequestOutcome::Failure(failure) => {
                    error!("Failed to get top contributor of {}: {}", summary.full_name, failure);
                }
            }
        }
        Aggregation::new(repos, surfaced, auth_flag.into_inner())
    }
}

/// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Scripted {
        Contributors(Vec<Contributor>),
        Status(u16),
        Transport,
        Slow(Vec<Contributor>),
    }

    #[derive(Default)]
    struct ScriptedClient {
        scripted: HashMap<String, Scripted>,
        auth_flags: Mutex<Vec<bool>>,
    }

    impl ScriptedClient {
        fn with(mut self, full_name: &str, scripted: Scripted) -> Self {
            self.scripted.insert(full_name.to_string(), scripted);
            self
        }
    }

    #[async_trait]
    impl Client for ScriptedClient {
        async fn fetch_top_repositories(&self, _per_page: u32, _use_auth: bool) -> RequestOutcome<Vec<RepositorySummary>> {
            unimplemented!("aggregation never fetches repositories")
        }

        async fn fetch_top_contributor(
            &self,
            repo: &RepositorySummary,
            use_auth: bool,
        ) -> RequestOutcome<Vec<Contributor>> {
            self.auth_flags.lock().unwrap().push(use_auth);
            match self.scripted.get(&repo.full_name) {
                Some(Scripted::Contributors(contributors)) => RequestOutcome::Success(contributors.clone()),
                Some(Scripted::Slow(contributors)) => {
                    for _ in 0..3 {
                        tokio::task::yield_now().await;
                    }
                    RequestOutcome::Success(contributors.clone())
                }
                Some(Scripted::Status(status)) => {
                    RequestOutcome::Failure(ApiFailure::from_status(*status, Some(format!("body of {}", repo.full_name))))
                }
                Some(Scripted::Transport) => {
                    RequestOutcome::Failure(ApiFailure::from_error(anyhow::anyhow!("connection reset")))
                }
                None => RequestOutcome::Success(Vec::new()),
            }
        }
    }

    fn summary(full_name: &str) -> RepositorySummary {
        RepositorySummary {
            id: 1,
            name: full_name.split('/').last().unwrap().to_string(),
            owner_name: None,
            owner_url: None,
            full_name: full_name.to_string(),
            description: None,
            contributors_url: format!("https://api.github.com/repos/{}/contributors", full_name),
            stars: 10,
            html_url: format!("https://github.com/{}", full_name),
            language: None,
        }
    }

    fn full_names(aggregation: &Aggregation) -> Vec<&str> {
        aggregation.repos.iter().map(|repo| repo.full_name.as_str()).collect()
    }

    #[tokio::test]
    async fn rows_keep_input_order_test() {
        let client = ScriptedClient::default()
            .with("a/a", Scripted::Slow(vec![Contributor::new("first", "url", 9)]))
            .with("b/b", Scripted::Contributors(vec![Contributor::new("second", "url", 8)]))
            .with("c/c", Scripted::Contributors(vec![Contributor::new("third", "url", 7)]));
        let aggregator = Aggregator::new(Arc::new(client), 3);
        let aggregation = aggregator
            .aggregate(vec![summary("a/a"), summary("b/b"), summary("c/c")], true)
            .await;
        assert_eq!(full_names(&aggregation), vec!["a/a", "b/b", "c/c"]);
        assert!(aggregation.failure.is_none());
        assert!(aggregation.use_auth);
    }

    #[tokio::test]
    async fn no_contributors_keeps_row_with_placeholders_test() {
        let aggregator = Aggregator::new(Arc::new(ScriptedClient::default()), 2);
        let aggregation = aggregator.aggregate(vec![summary("a/a")], false).await;
        assert_eq!(aggregation.repos.len(), 1);
        assert_eq!(aggregation.repos[0].contributor_login, crate::api::UNAVAILABLE);
        assert_eq!(aggregation.repos[0].contributor_url, crate::api::UNAVAILABLE);
        assert_eq!(aggregation.repos[0].contributions, 0);
    }

    #[tokio::test]
    async fn unauthorized_drops_credential_for_rest_of_batch_test() {
        let client = Arc::new(
            ScriptedClient::default()
                .with("a/a", Scripted::Status(401))
                .with("b/b", Scripted::Contributors(vec![Contributor::new("dev", "url", 5)]))
                .with("c/c", Scripted::Contributors(vec![Contributor::new("dev", "url", 4)])),
        );
        let aggregator = Aggregator::new(Arc::clone(&client), 1);
        let aggregation = aggregator
            .aggregate(vec![summary("a/a"), summary("b/b"), summary("c/c")], true)
            .await;
        assert_eq!(*client.auth_flags.lock().unwrap(), vec![true, false, false]);
        assert!(!aggregation.use_auth);
        assert!(aggregation.failure.is_none());
        assert_eq!(full_names(&aggregation), vec!["b/b", "c/c"]);
    }

    #[tokio::test]
    async fn last_rate_limit_in_input_order_wins_test() {
        let client = ScriptedClient::default()
            .with("a/a", Scripted::Status(403))
            .with("b/b", Scripted::Contributors(vec![Contributor::new("dev", "url", 5)]))
            .with("c/c", Scripted::Status(403));
        let aggregator = Aggregator::new(Arc::new(client), 1);
        let aggregation = aggregator
            .aggregate(vec![summary("a/a"), summary("b/b"), summary("c/c")], true)
            .await;
        assert_eq!(full_names(&aggregation), vec!["b/b"]);
        assert!(aggregation.use_auth);
        let failure = aggregation.failure.unwrap();
        assert!(failure.is_status(403));
        assert_eq!(failure.body, Some("body of c/c".to_string()));
    }

    #[tokio::test]
    async fn transport_failure_drops_row_silently_test() {
        let client = ScriptedClient::default()
            .with("a/a", Scripted::Transport)
            .with("b/b", Scripted::Contributors(vec![Contributor::new("dev", "url", 5)]));
        let aggregator = Aggregator::new(Arc::new(client), 2);
        let aggregation = aggregator.aggregate(vec![summary("a/a"), summary("b/b")], true).await;
        assert_eq!(full_names(&aggregation), vec!["b/b"]);
        assert!(aggregation.failure.is_none());
        assert!(aggregation.use_auth);
    }

    #[tokio::test]
    async fn empty_page_test() {
        let aggregator = Aggregator::new(Arc::new(ScriptedClient::default()), 4);
        let aggregation = aggregator.aggregate(Vec::new(), true).await;
        assert!(aggregation.repos.is_empty());
        assert!(aggregation.failure.is_none());
        assert!(aggregation.use_auth);
    }
}
