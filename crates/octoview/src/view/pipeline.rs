//! The filter, sort and paginate pipeline.

use crate::model::Repository;

use super::criteria::{FilterCriteria, LanguageFilter, SortKey, ALL_LANGUAGES};

/// Number of repositories per page.
pub const PAGE_SIZE: usize = 12;

/// One computed slice of the repository list.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoView {
    /// The repositories on the requested page, in sorted order.
    pub page_items: Vec<Repository>,
    /// Size of the filtered set across all pages.
    pub total_count: usize,
    /// Number of pages for the filtered set. 0 when nothing matches.
    pub total_pages: usize,
    /// Distinct languages of the unfiltered set, sorted, with the "all"
    /// sentinel prepended. Independent of the active filters so the
    /// language picker never loses options.
    pub available_languages: Vec<String>,
}

/// Compute the visible slice of `repos` under `criteria`.
///
/// Pure and side-effect free: the same inputs always produce the same
/// view, and `repos` is never mutated.
pub fn view(repos: &[Repository], criteria: &FilterCriteria) -> RepoView {
    let available_languages = available_languages(repos);

    let needle = criteria.search.trim().to_lowercase();
    let mut filtered: Vec<&Repository> = repos
        .iter()
        .filter(|repo| matches_search(repo, &needle))
        .filter(|repo| matches_language(repo, &criteria.language))
        .collect();

    sort(&mut filtered, criteria.sort);

    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(PAGE_SIZE);
    let page = criteria.page.max(1);

    let page_items = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    RepoView {
        page_items,
        total_count,
        total_pages,
        available_languages,
    }
}

/// Case-insensitive match against name, description and topics. A blank
/// search matches everything.
fn matches_search(repo: &Repository, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if repo.name.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(description) = &repo.description {
        if description.to_lowercase().contains(needle) {
            return true;
        }
    }
    repo.topics
        .iter()
        .any(|topic| topic.to_lowercase().contains(needle))
}

/// Exact language match. Repositories without a detected language only
/// pass the "all" filter.
fn matches_language(repo: &Repository, filter: &LanguageFilter) -> bool {
    match filter {
        LanguageFilter::All => true,
        LanguageFilter::Language(wanted) => repo.language.as_deref() == Some(wanted.as_str()),
    }
}

/// Stable sort under `key`, with upstream id ascending as the tiebreaker
/// so equal-keyed repositories keep a deterministic order.
fn sort(repos: &mut [&Repository], key: SortKey) {
    match key {
        SortKey::Updated => {
            repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        }
        SortKey::Stars => {
            repos.sort_by(|a, b| b.stars.cmp(&a.stars).then(a.id.cmp(&b.id)));
        }
        SortKey::Forks => {
            repos.sort_by(|a, b| b.forks.cmp(&a.forks).then(a.id.cmp(&b.id)));
        }
        SortKey::Name => {
            repos.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.id.cmp(&b.id))
            });
        }
    }
}

fn available_languages(repos: &[Repository]) -> Vec<String> {
    let mut languages: Vec<String> = repos
        .iter()
        .filter_map(|repo| repo.language.clone())
        .collect();
    languages.sort();
    languages.dedup();
    languages.insert(0, ALL_LANGUAGES.to_string());
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn repo(id: i64, name: &str) -> Repository {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Repository {
            id,
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            description: None,
            html_url: format!("https://github.com/octocat/{name}"),
            stars: 0,
            forks: 0,
            language: None,
            updated_at: base + Duration::days(id),
            topics: Vec::new(),
        }
    }

    fn names(view: &RepoView) -> Vec<&str> {
        view.page_items.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn default_criteria_sort_by_updated_desc() {
        let repos = vec![repo(1, "old"), repo(3, "new"), repo(2, "mid")];
        let view = view(&repos, &FilterCriteria::default());
        assert_eq!(names(&view), vec!["new", "mid", "old"]);
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn search_matches_name_description_and_topics_case_insensitively() {
        let mut by_name = repo(1, "HttpServer");
        by_name.description = Some("a server".to_string());
        let mut by_description = repo(2, "gizmo");
        by_description.description = Some("tiny HTTP toolkit".to_string());
        let mut by_topic = repo(3, "widget");
        by_topic.topics = vec!["http".to_string()];
        let unrelated = repo(4, "paint");

        let repos = vec![by_name, by_description, by_topic, unrelated];
        let mut criteria = FilterCriteria::default();
        criteria.set_search("HTTP");

        let view = view(&repos, &criteria);
        assert_eq!(view.total_count, 3);
        assert!(names(&view).iter().all(|n| *n != "paint"));
    }

    #[test]
    fn blank_search_matches_everything() {
        let repos = vec![repo(1, "a"), repo(2, "b")];
        let mut criteria = FilterCriteria::default();
        criteria.set_search("   ");
        assert_eq!(view(&repos, &criteria).total_count, 2);
    }

    #[test]
    fn language_filter_is_exact_and_excludes_languageless_repos() {
        let mut rust = repo(1, "rusty");
        rust.language = Some("Rust".to_string());
        let mut ts = repo(2, "webby");
        ts.language = Some("TypeScript".to_string());
        let none = repo(3, "plain");

        let repos = vec![rust, ts, none];
        let mut criteria = FilterCriteria::default();
        criteria.set_language(LanguageFilter::Language("Rust".to_string()));

        let view = view(&repos, &criteria);
        assert_eq!(names(&view), vec!["rusty"]);
    }

    #[test]
    fn name_sort_is_case_insensitive_with_id_tiebreaker() {
        let repos = vec![repo(1, "b"), repo(2, "a"), repo(3, "B")];
        let mut criteria = FilterCriteria::default();
        criteria.set_sort(SortKey::Name);

        // "b" (id 1) sorts before "B" (id 3) because the keys compare equal.
        assert_eq!(names(&view(&repos, &criteria)), vec!["a", "b", "B"]);
    }

    #[test]
    fn star_sort_is_descending() {
        let mut a = repo(1, "a");
        a.stars = 5;
        let mut b = repo(2, "b");
        b.stars = 50;
        let mut c = repo(3, "c");
        c.stars = 50;

        let mut criteria = FilterCriteria::default();
        criteria.set_sort(SortKey::Stars);
        assert_eq!(names(&view(&[a, b, c], &criteria)), vec!["b", "c", "a"]);
    }

    #[test]
    fn pagination_slices_after_filter_and_sort() {
        let repos: Vec<Repository> = (1..=15).map(|i| repo(i, &format!("repo{i}"))).collect();

        let mut criteria = FilterCriteria::default();
        let page1 = view(&repos, &criteria);
        assert_eq!(page1.page_items.len(), PAGE_SIZE);
        assert_eq!(page1.total_count, 15);
        assert_eq!(page1.total_pages, 2);

        criteria.set_page(2);
        let page2 = view(&repos, &criteria);
        assert_eq!(page2.page_items.len(), 3);
        // Updated-desc puts the newest first, so page 2 holds the oldest.
        assert_eq!(names(&page2), vec!["repo3", "repo2", "repo1"]);
    }

    #[test]
    fn out_of_range_page_is_empty_but_counts_are_kept() {
        let repos: Vec<Repository> = (1..=3).map(|i| repo(i, &format!("repo{i}"))).collect();
        let mut criteria = FilterCriteria::default();
        criteria.set_page(9);

        let view = view(&repos, &criteria);
        assert!(view.page_items.is_empty());
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn empty_filtered_set_has_zero_pages() {
        let repos = vec![repo(1, "a")];
        let mut criteria = FilterCriteria::default();
        criteria.set_search("no-such-repo");

        let view = view(&repos, &criteria);
        assert_eq!(view.total_count, 0);
        assert_eq!(view.total_pages, 0);
        assert!(view.page_items.is_empty());
    }

    #[test]
    fn available_languages_ignore_active_filters() {
        let mut rust = repo(1, "rusty");
        rust.language = Some("Rust".to_string());
        let mut go = repo(2, "gopher");
        go.language = Some("Go".to_string());
        let mut rust2 = repo(3, "oxidized");
        rust2.language = Some("Rust".to_string());

        let mut criteria = FilterCriteria::default();
        criteria.set_search("gopher");

        let view = view(&[rust, go, rust2], &criteria);
        assert_eq!(view.total_count, 1);
        assert_eq!(view.available_languages, vec!["all", "Go", "Rust"]);
    }
}
