use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use gh_traffic::ansi::{RED, RESET};
use gh_traffic::config;
use gh_traffic::github::GithubClient;
use gh_traffic::history::HistoryStore;
use gh_traffic::report::TrafficReport;

#[derive(Parser)]
#[command(
    name = "gh-traffic",
    about = "Displays recent traffic statistics for a GitHub repository"
)]
struct Args {
    /// GitHub user/org name
    #[arg(short, long)]
    user: String,

    /// GitHub repository name
    #[arg(short, long)]
    repo: String,

    /// GitHub authorization token (falls back to GITHUB_TOKEN, then the
    /// config file)
    #[arg(short, long)]
    token: Option<String>,

    /// Number of days to display
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=14))]
    days: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger - writes to gh-traffic.log in the current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("gh-traffic.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("gh-traffic starting for {}/{}", args.user, args.repo);

    let file_config = match config::load_config() {
        Ok(config) => config,
        Err(e) => return fail(&e.to_string()),
    };
    let Some(token) = config::resolve_token(args.token.as_deref(), &file_config) else {
        return fail("no GitHub token: pass --token, set GITHUB_TOKEN, or add it to the config file");
    };
    let days = config::resolve_days(args.days, &file_config);

    let store = match HistoryStore::open(&args.user, &args.repo) {
        Ok(store) => store,
        Err(e) => return fail(&format!("could not open history directory: {e}")),
    };

    let client = GithubClient::new(token, None);
    let report = TrafficReport::new(client, args.user, args.repo, days, store);
    match report.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{RED}Error: {message}{RESET}");
    log::error!("{message}");
    ExitCode::FAILURE
}
