use github_client::GithubClient;
use github_client::GithubClientBuilder;
use log::debug;
use popularity_board::api::Result;
use popularity_board::view::Board;

pub mod args;

pub use args::Args;

pub fn build_board(args: Args) -> Result<Board<GithubClient>> {
    debug!("Repository API URL: {}", args.api_url);
    let mut client = GithubClientBuilder::default().with_github_url(args.api_url);
    if let Some(token) = args.api_token {
        client = client.with_token(token);
    }
    let client = client.build()?;

    let use_auth = client.has_token();
    Ok(Board::new(client, args.page_size, use_auth, args.max_contrib_req as usize))
}
