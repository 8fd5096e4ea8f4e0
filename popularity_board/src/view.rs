use crate::aggregator::Aggregator;
use crate::api::{AggregatedRepository, ApiFailure, Client, RequestOutcome};
use log::error;
use std::sync::{Arc, Mutex};
use strum_macros::{Display, EnumString};

/// Number of repositories requested per refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PageSize {
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "10")]
    Ten,
    #[strum(serialize = "100")]
    Hundred,
}

impl PageSize {
    pub fn per_page(self) -> u32 {
        match self {
            PageSize::Two => 2,
            PageSize::Ten => 10,
            PageSize::Hundred => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Requesting,
}

#[derive(Debug)]
struct ViewState {
    status: RequestStatus,
    repos: Vec<AggregatedRepository>,
    failure: Option<Arc<ApiFailure>>,
    page_size: PageSize,
    use_auth: bool,
}

/// Holds the visible state of the board: request status, current rows and the
/// surfaced failure, if any. Rows and failure may coexist after a partially
/// failed refresh.
pub struct Board<CLIENT: Client> {
    client: Arc<CLIENT>,
    aggregator: Aggregator<CLIENT>,
    state: Mutex<ViewState>,
}

impl<CLIENT: Client> Board<CLIENT> {
    pub fn new(client: CLIENT, page_size: PageSize, use_auth: bool, max_contrib_requests: usize) -> Self {
        let client = Arc::new(client);
        let aggregator = Aggregator::new(Arc::clone(&client), max_contrib_requests);
        Board {
            client,
            aggregator,
            state: Mutex::new(ViewState {
                status: RequestStatus::Idle,
                repos: Vec::new(),
                failure: None,
                page_size,
                use_auth,
            }),
        }
    }

    /// Runs one fetch-and-aggregate round, replacing the board contents.
    ///
    /// Returns `false` without side effects when a round is already running.
    /// Previous rows and failure are cleared on entry, so observers see either
    /// the finished round or an empty requesting board, never a mix.
    pub async fn refresh(&self) -> bool {
        let (page_size, use_auth) = {
            let mut state = self.state.lock().unwrap();
            if state.status == RequestStatus::Requesting {
                return false;
            }
            state.status = RequestStatus::Requesting;
            state.repos = Vec::new();
            state.failure = None;
            (state.page_size, state.use_auth)
        };
        let outcome = self
            .client
            .fetch_top_repositories(page_size.per_page(), use_auth)
            .await;
        let (repos, failure, use_auth) = match outcome {
            RequestOutcome::Success(summaries) => {
                let aggregation = self.aggregator.aggregate(summaries, use_auth).await;
                (aggregation.repos, aggregation.failure, aggregation.use_auth)
            }
            RequestOutcome::Failure(failure) => {
                error!("Failed to get top repositories: {}", failure);
                // A 401 drops the credential for future rounds but the failure
                // that reported it is still shown.
                let use_auth = use_auth && !failure.is_status(401);
                (Vec::new(), Some(failure), use_auth)
            }
        };
        let mut state = self.state.lock().unwrap();
        state.status = RequestStatus::Idle;
        state.repos = repos;
        state.failure = failure.map(Arc::new);
        state.use_auth = use_auth;
        true
    }

    pub fn status(&self) -> RequestStatus {
        self.state.lock().unwrap().status
    }

    pub fn repos(&self) -> Vec<AggregatedRepository> {
        self.state.lock().unwrap().repos.clone()
    }

    pub fn failure(&self) -> Option<Arc<ApiFailure>> {
        self.state.lock().unwrap().failure.clone()
    }

    pub fn page_size(&self) -> PageSize {
        self.state.lock().unwrap().page_size
    }

    /// Takes effect on the next refresh; a running round keeps the size it
    /// started with.
    pub fn set_page_size(&self, page_size: PageSize) {
        self.state.lock().unwrap().page_size = page_size;
    }

    pub fn auth_enabled(&self) -> bool {
        self.state.lock().unwrap().use_auth
    }
}

/// Tests
