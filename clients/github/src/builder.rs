use crate::GithubClient;
use log::debug;
use popularity_board::api::Result;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use secrecy::SecretString;

const GITHUB_URL: &str = "https://api.github.com";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const API_VERSION_HEADER: &str = "x-github-api-version";
const USER_AGENT: &str = "popularity-board";

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
    token: Option<SecretString>,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let builder = Self {
            client_builder: ClientBuilder::default(),
            github_url: GITHUB_URL.to_string(),
            headers: HeaderMap::default(),
            token: None,
        };
        // Static header values, cannot fail to parse.
        builder
            .try_with_header(header::USER_AGENT, USER_AGENT)
            .unwrap()
            .try_with_header(header::ACCEPT, GITHUB_MEDIA_TYPE)
            .unwrap()
            .try_with_header(HeaderName::from_static(API_VERSION_HEADER), GITHUB_API_VERSION)
            .unwrap()
    }
}

impl GithubClientBuilder {
    /// Stores the credential sent as a bearer header by authenticated
    /// requests. Blank tokens are ignored, requests then go out
    /// unauthenticated.
    pub fn with_token(mut self, token: SecretString) -> GithubClientBuilder {
        if token.expose_secret().trim().is_empty() {
            debug!("Ignoring blank API token");
            return self;
        }
        self.token = Some(token);
        self
    }

    pub fn try_with_user_agent<STR: AsRef<str>>(self, user_agent: STR) -> Result<GithubClientBuilder> {
        Ok(self.try_with_header(header::USER_AGENT, user_agent)?)
    }

    pub fn with_github_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.github_url = url.as_ref().to_string();
        self
    }

    fn try_with_header(mut self, key: HeaderName, val: impl AsRef<str>) -> anyhow::Result<GithubClientBuilder> {
        let val = HeaderValue::from_str(val.as_ref())?;
        self.headers.insert(key, val);
        Ok(self)
    }

    pub fn build(self) -> Result<GithubClient> {
        let client = self
            .client_builder
            .default_headers(self.headers)
            .build()
            .map_err(anyhow::Error::from)?;
        Ok(GithubClient {
            client,
            github_url: self.github_url,
            token: self.token,
        })
    }
}
