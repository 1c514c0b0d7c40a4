//! Terminal rendering for profiles and repository pages.

use chrono::Utc;
use clap::ValueEnum;
use console::style;
use octoview::view::RepoView;
use octoview::{FetchError, Repository, UserProfile};
use serde::Serialize;

/// Output format for the profile view.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as formatted text and a table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One repository row in the table output.
#[derive(Debug, Clone, Serialize, tabled::Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Forks")]
    pub forks: u64,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl RepoRow {
    pub(crate) fn from_repository(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            description: repo
                .description
                .clone()
                .map(|d| truncate(&d, 60))
                .unwrap_or_default(),
            language: repo.language.clone().unwrap_or_else(|| "-".to_string()),
            stars: repo.stars,
            forks: repo.forks,
            updated: repo.updated_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Print the profile header block.
pub(crate) fn print_profile(profile: &UserProfile) {
    println!(
        "{} {}",
        style(&profile.name).bold().cyan(),
        style(format!("(@{})", profile.login)).dim()
    );
    if let Some(bio) = &profile.bio {
        println!("{bio}");
    }

    let mut facts = Vec::new();
    if let Some(location) = &profile.location {
        facts.push(location.clone());
    }
    if let Some(company) = &profile.company {
        facts.push(company.clone());
    }
    if let Some(blog) = &profile.blog {
        facts.push(blog.clone());
    }
    if let Some(twitter) = &profile.twitter {
        facts.push(format!("@{twitter}"));
    }
    if !facts.is_empty() {
        println!("{}", style(facts.join(" | ")).dim());
    }

    println!(
        "{} repos | {} followers | {} following | joined {}",
        style(profile.public_repos).bold(),
        style(profile.followers).bold(),
        style(profile.following).bold(),
        profile.created_at.format("%B %Y")
    );
    println!("{}", style(&profile.html_url).underlined().blue());
}

/// Print one page of repositories as a table with a pagination footer.
pub(crate) fn print_repo_page(view: &RepoView, page: usize) {
    if view.total_count == 0 {
        println!("{}", style("No repositories match the current filters.").dim());
        return;
    }

    let rows: Vec<RepoRow> = view.page_items.iter().map(RepoRow::from_repository).collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");

    println!(
        "{}",
        style(format!(
            "page {page} of {} ({} repositories)",
            view.total_pages, view.total_count
        ))
        .dim()
    );
}

/// JSON document covering the profile and the current page.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    profile: &'a UserProfile,
    repositories: Vec<&'a Repository>,
    total_count: usize,
    total_pages: usize,
    page: usize,
    available_languages: &'a [String],
}

pub(crate) fn print_json(
    profile: &UserProfile,
    view: &RepoView,
    page: usize,
) -> serde_json::Result<()> {
    let doc = JsonOutput {
        profile,
        repositories: view.page_items.iter().collect(),
        total_count: view.total_count,
        total_pages: view.total_pages,
        page,
        available_languages: &view.available_languages,
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Human-readable message for a failed fetch.
pub(crate) fn error_message(err: &FetchError) -> String {
    match err {
        FetchError::RateLimited { reset_at } => {
            let wait = err
                .wait_until_reset(Utc::now())
                .map(|d| d.num_seconds())
                .unwrap_or(0);
            format!(
                "GitHub rate limit exceeded; resets at {} (in {wait}s)",
                reset_at.format("%H:%M:%S UTC")
            )
        }
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}
