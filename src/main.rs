use clap::Parser;
use dotenv::dotenv;
use popularity_board::api::Error;
use popularity_board_app::Args;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let board = popularity_board_app::build_board(args)?;
    board.refresh().await;

    if let Some(failure) = board.failure() {
        eprintln!("Error: {}", failure);
        if let Some(body) = failure.failure_body() {
            eprintln!("{} ({})", body.message, body.documentation_url);
        }
        return Ok(());
    }

    for repo in board.repos() {
        println!("{}", repo);
    }

    Ok(())
}
