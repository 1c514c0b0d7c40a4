//! Octoview CLI - terminal viewer for GitHub profiles.

mod config;
mod render;

use clap::Parser;
use console::{style, Term};
use octoview::view::{view, FilterCriteria, LanguageFilter, SortKey};
use octoview::{CancelScope, FetchError, GitHubClient, ProfileStore};
use tracing_subscriber::EnvFilter;

use crate::render::OutputFormat;

#[derive(Parser)]
#[command(name = "octoview")]
#[command(version)]
#[command(about = "View a GitHub user's profile and repositories")]
#[command(
    long_about = "Octoview fetches a GitHub user's profile and repository list and renders \
them in the terminal, with search, language and sort filters and paginated output."
)]
#[command(after_long_help = r#"EXAMPLES
    View a profile:
        $ octoview octocat

    Only TypeScript repositories, sorted by stars:
        $ octoview octocat --language TypeScript --sort stars

    Search by name, description or topic:
        $ octoview octocat --search http

    Second page, as JSON:
        $ octoview octocat --page 2 --output json

CONFIGURATION
    Octoview reads configuration from:
      1. ~/.config/octoview/config.toml (or $XDG_CONFIG_HOME/octoview/config.toml)
      2. ./octoview.toml
      3. Environment variables (OCTOVIEW_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    OCTOVIEW_GITHUB_TOKEN     GitHub personal access token (raises rate limits)
    OCTOVIEW_GITHUB_API_URL   API base URL (default: https://api.github.com)
"#)]
struct Cli {
    /// GitHub username to view
    handle: String,

    /// Filter repositories by name, description or topic
    #[arg(short, long, default_value = "")]
    search: String,

    /// Keep only repositories in this language ("all" keeps everything)
    #[arg(short, long, default_value = "all")]
    language: LanguageFilter,

    /// Sort order: updated, stars, forks or name
    #[arg(long, default_value = "updated")]
    sort: SortKey,

    /// Page to display (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("octoview=info,octoview_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let config = config::Config::load();

    let mut client = GitHubClient::new(config.github_token())?;
    if let Some(api_url) = config.github_api_url() {
        client = client.with_api_url(api_url);
    }
    let store = ProfileStore::new(client);

    // Ctrl+C cancels the in-flight fetches; the fetch calls below then
    // resolve with a cancellation error.
    let scope = CancelScope::new();
    let cancel = scope.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling in-flight requests");
            scope.cancel();
        }
    });

    let (profile, repos) = tokio::join!(
        store.user(&cli.handle, &cancel),
        store.repositories(&cli.handle, &cancel),
    );

    let profile = match profile {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            eprintln!("{}", style("No username given.").red());
            std::process::exit(2);
        }
        Err(err) => fail(&err),
    };
    let repos = match repos {
        Ok(repos) => repos.map(|r| r.to_vec()).unwrap_or_default(),
        Err(err) => fail(&err),
    };

    // Order matters: the search/language/sort setters reset the page.
    let mut criteria = FilterCriteria::default();
    criteria.set_search(cli.search);
    criteria.set_language(cli.language);
    criteria.set_sort(cli.sort);
    criteria.set_page(cli.page);

    let page = view(&repos, &criteria);

    match cli.output {
        OutputFormat::Table => {
            render::print_profile(&profile);
            println!();
            render::print_repo_page(&page, criteria.page);
        }
        OutputFormat::Json => render::print_json(&profile, &page, criteria.page)?,
    }

    Ok(())
}

fn fail(err: &FetchError) -> ! {
    // A cancelled fetch means the user hit Ctrl+C; exit quietly.
    if err.is_cancelled() {
        std::process::exit(130);
    }
    eprintln!("{}", style(render::error_message(err)).red());
    std::process::exit(1);
}
