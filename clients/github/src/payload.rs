use log::debug;
use popularity_board::api;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct SearchRepos {
    pub items: Vec<Repo>,
}

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub owner: Option<RepoOwner>,
    pub full_name: String,
    pub description: Option<String>,
    pub contributors_url: String,
    pub stargazers_count: u32,
    pub html_url: String,
    pub language: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RepoOwner {
    pub login: String,
    pub html_url: String,
}

impl From<Repo> for api::RepositorySummary {
    fn from(repo: Repo) -> Self {
        let (owner_name, owner_url) = match repo.owner {
            Some(owner) => (Some(owner.login), Some(owner.html_url)),
            None => (None, None),
        };
        api::RepositorySummary {
            id: repo.id,
            name: repo.name,
            owner_name,
            owner_url,
            full_name: repo.full_name,
            description: repo.description,
            contributors_url: repo.contributors_url,
            stars: repo.stargazers_count,
            html_url: repo.html_url,
            language: repo.language,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Contributor {
    pub login: String,
    pub url: String,
    pub contributions: u64,
}

impl From<Contributor> for api::Contributor {
    fn from(contributor: Contributor) -> Self {
        api::Contributor::new(contributor.login, contributor.url, contributor.contributions)
    }
}

/// Contributor bodies that fail to decode count as "no contributors", not as
/// failed requests.
pub fn contributors_or_empty(raw: &str) -> Vec<api::Contributor> {
    match serde_json::from_str::<Vec<Contributor>>(raw) {
        Ok(contributors) => contributors.into_iter().map(api::Contributor::from).collect(),
        Err(err) => {
            debug!("Undecodable contributors body: {}", err);
            Vec::new()
        }
    }
}

/// Tests

#[test]
fn search_repos_parse_test() {
    let body = r#"{
        "total_count": 2,
        "incomplete_results": false,
        "items": [
            {
                "id": 1,
                "name": "hello",
                "owner": {
                    "login": "octocat",
                    "html_url": "https://github.com/octocat"
                },
                "full_name": "octocat/hello",
                "description": "Example project",
                "contributors_url": "https://api.github.com/repos/octocat/hello/contributors",
                "stargazers_count": 99,
                "html_url": "https://github.com/octocat/hello",
                "language": "Rust",
                "watchers_count": 99
            },
            {
                "id": 2,
                "name": "anon",
                "owner": null,
                "full_name": "ghost/anon",
                "description": null,
                "contributors_url": "https://api.github.com/repos/ghost/anon/contributors",
                "stargazers_count": 7,
                "html_url": "https://github.com/ghost/anon",
                "language": null
            }
        ]
    }"#;
    let repos: SearchRepos = serde_json::from_str(body).unwrap();
    let summaries: Vec<api::RepositorySummary> = repos.items.into_iter().map(api::RepositorySummary::from).collect();
    assert_eq!(summaries[0].full_name, "octocat/hello");
    assert_eq!(summaries[0].owner_name, Some("octocat".to_string()));
    assert_eq!(summaries[0].owner_url, Some("https://github.com/octocat".to_string()));
    assert_eq!(summaries[0].stars, 99);
    assert_eq!(summaries[0].language, Some("Rust".to_string()));
    assert_eq!(summaries[1].owner_name, None);
    assert_eq!(summaries[1].owner_url, None);
    assert_eq!(summaries[1].description, None);
}

#[test]
fn contributors_parse_test() {
    let body = r#"[{
        "login": "octocat",
        "url": "https://api.github.com/users/octocat",
        "contributions": 12,
        "type": "User"
    }]"#;
    let contributors = contributors_or_empty(body);
    assert_eq!(
        contributors,
        vec![api::Contributor::new("octocat", "https://api.github.com/users/octocat", 12)]
    );
}

#[test]
fn contributors_empty_array_test() {
    assert!(contributors_or_empty("[]").is_empty());
}

#[test]
fn contributors_undecodable_test() {
    assert!(contributors_or_empty("<!DOCTYPE html>").is_empty());
    assert!(contributors_or_empty(r#"{"message": "Moved Permanently"}"#).is_empty());
}
