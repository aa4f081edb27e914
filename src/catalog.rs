//! Static word catalog.
//!
//! The catalog is loaded once at startup and never mutated. Lookups are by
//! slug; the list view filters by term with [`WordCatalog::search`].

use serde::{Deserialize, Serialize};

/// Default number of words per list page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A single entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// URL-safe identifier used in routes.
    pub slug: String,
    /// The English term shown to the learner.
    pub term: String,
}

impl Word {
    pub fn new(slug: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            term: term.into(),
        }
    }
}

const BUILTIN_TERMS: &[&str] = &[
    "accept",
    "accounting",
    "affordable",
    "approve",
    "approximately",
    "author",
    "bonus",
    "bid",
    "branch",
    "brochure",
];

/// One page of catalog search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPage {
    pub words: Vec<Word>,
    /// 1-based page number after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Number of words matching the query across all pages.
    pub total: usize,
}

/// Ordered, immutable list of words.
#[derive(Debug, Clone)]
pub struct WordCatalog {
    words: Vec<Word>,
}

impl WordCatalog {
    /// The built-in TOEIC word list.
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_TERMS.iter().map(|t| Word::new(*t, *t)).collect(),
        }
    }

    /// Build a catalog from an explicit list. Later duplicates of a slug are dropped.
    pub fn from_words(words: Vec<Word>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let words = words
            .into_iter()
            .filter(|w| seen.insert(w.slug.clone()))
            .collect();
        Self { words }
    }

    pub fn all(&self) -> &[Word] {
        &self.words
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Filter by case-insensitive substring on the term and return one page.
    ///
    /// `page` is 1-based and clamped into `[1, total_pages]`; there is always
    /// at least one (possibly empty) page.
    pub fn search(&self, query: &str, page: usize, page_size: usize) -> WordPage {
        let q = query.trim().to_lowercase();
        let matches: Vec<&Word> = if q.is_empty() {
            self.words.iter().collect()
        } else {
            self.words
                .iter()
                .filter(|w| w.term.to_lowercase().contains(&q))
                .collect()
        };

        let page_size = page_size.max(1);
        let total = matches.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;

        WordPage {
            words: matches
                .into_iter()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect(),
            page,
            total_pages,
            total,
        }
    }
}

impl Default for WordCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
