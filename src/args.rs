use clap::Parser;
use popularity_board::view::PageSize;
use secrecy::SecretString;
use std::{fmt::Display, str::FromStr};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Number of repositories on the board: 2, 10 or 100
    #[clap(short, long, env, default_value = "10")]
    pub page_size: PageSize,

    /// API OAuth access token
    #[clap(short, long, env)]
    pub api_token: Option<SecretString>,

    /// Repository API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Maximal parallel repository contributors requests
    #[clap(long, env, default_value_t = 10, parse(try_from_str=max_contrib_req_in_range))]
    pub max_contrib_req: u32,
}

fn max_contrib_req_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, u32::MAX, "max_contrib_req".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
