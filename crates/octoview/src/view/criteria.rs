//! UI-selected filter, sort and pagination criteria.

use std::fmt;
use std::str::FromStr;

/// Sentinel accepted by [`LanguageFilter::from_str`] to keep all languages.
pub const ALL_LANGUAGES: &str = "all";

/// Sort order for the repository list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Last-updated timestamp, newest first. The upstream default.
    #[default]
    Updated,
    /// Star count, highest first.
    Stars,
    /// Fork count, highest first.
    Forks,
    /// Name, case-insensitive ascending.
    Name,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Updated => "updated",
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Name => "name",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated" => Ok(SortKey::Updated),
            "stars" => Ok(SortKey::Stars),
            "forks" => Ok(SortKey::Forks),
            "name" => Ok(SortKey::Name),
            other => Err(format!(
                "unknown sort key '{other}' (expected updated, stars, forks or name)"
            )),
        }
    }
}

/// Language selection: a specific language or the "all" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageFilter {
    /// Keep every repository, including ones without a detected language.
    #[default]
    All,
    /// Keep repositories whose language matches exactly.
    Language(String),
}

impl LanguageFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, LanguageFilter::All)
    }
}

impl fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageFilter::All => f.write_str(ALL_LANGUAGES),
            LanguageFilter::Language(lang) => f.write_str(lang),
        }
    }
}

impl FromStr for LanguageFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL_LANGUAGES) {
            Ok(LanguageFilter::All)
        } else {
            Ok(LanguageFilter::Language(s.to_string()))
        }
    }
}

/// The full set of criteria driving the visible repository slice.
///
/// The page number is UI-controlled state: the setters for search, language
/// and sort reset it to 1, since any of those changes invalidates the
/// current position.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub language: LanguageFilter,
    pub sort: SortKey,
    /// 1-based page number.
    pub page: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            language: LanguageFilter::All,
            sort: SortKey::Updated,
            page: 1,
        }
    }
}

impl FilterCriteria {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_language(&mut self, language: LanguageFilter) {
        self.language = language;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_round_trips_through_str() {
        for key in [SortKey::Updated, SortKey::Stars, SortKey::Forks, SortKey::Name] {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("velocity".parse::<SortKey>().is_err());
    }

    #[test]
    fn language_filter_recognizes_the_all_sentinel() {
        assert_eq!("all".parse::<LanguageFilter>().unwrap(), LanguageFilter::All);
        assert_eq!("ALL".parse::<LanguageFilter>().unwrap(), LanguageFilter::All);
        assert_eq!(
            "Rust".parse::<LanguageFilter>().unwrap(),
            LanguageFilter::Language("Rust".to_string())
        );
    }

    #[test]
    fn criteria_setters_reset_the_page() {
        let mut criteria = FilterCriteria::default();
        criteria.set_page(4);
        assert_eq!(criteria.page, 4);

        criteria.set_search("cli");
        assert_eq!(criteria.page, 1);

        criteria.set_page(3);
        criteria.set_language(LanguageFilter::Language("Rust".to_string()));
        assert_eq!(criteria.page, 1);

        criteria.set_page(2);
        criteria.set_sort(SortKey::Stars);
        assert_eq!(criteria.page, 1);
    }

    #[test]
    fn set_page_clamps_to_one() {
        let mut criteria = FilterCriteria::default();
        criteria.set_page(0);
        assert_eq!(criteria.page, 1);
    }
}
