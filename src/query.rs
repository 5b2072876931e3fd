//! Filtered and sorted views over the journal.
//!
//! Pure functions of (collection, criteria). Nothing is cached: the view is
//! rebuilt from the full collection on every call.

use crate::draft::merge_date_time;
use crate::journal_entry::{Category, JournalEntry, Mood, ParseVariantError};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    /// All -> Personal -> ... -> Goals -> All
    pub fn next(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(Category::ALL[0]),
            CategoryFilter::Only(c) if c == Category::ALL[Category::ALL.len() - 1] => {
                CategoryFilter::All
            }
            CategoryFilter::Only(c) => CategoryFilter::Only(c.next()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodFilter {
    #[default]
    Any,
    Only(Mood),
}

impl MoodFilter {
    /// An entry without a mood only passes `Any`.
    pub fn matches(self, mood: Option<Mood>) -> bool {
        match self {
            MoodFilter::Any => true,
            MoodFilter::Only(m) => mood == Some(m),
        }
    }

    pub fn next(self) -> Self {
        let current = match self {
            MoodFilter::Any => None,
            MoodFilter::Only(m) => Some(m),
        };
        Mood::cycle(current).map_or(MoodFilter::Any, MoodFilter::Only)
    }
}

impl fmt::Display for MoodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoodFilter::Any => f.write_str("any"),
            MoodFilter::Only(m) => write!(f, "{m}"),
        }
    }
}

impl FromStr for MoodFilter {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("any") {
            Ok(MoodFilter::Any)
        } else {
            s.parse().map(MoodFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAlphabetical,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::NewestFirst => SortKey::OldestFirst,
            SortKey::OldestFirst => SortKey::TitleAlphabetical,
            SortKey::TitleAlphabetical => SortKey::NewestFirst,
        }
    }

    fn compare(self, a: &JournalEntry, b: &JournalEntry) -> Ordering {
        match self {
            SortKey::NewestFirst => b.date.cmp(&a.date),
            SortKey::OldestFirst => a.date.cmp(&b.date),
            SortKey::TitleAlphabetical => compare_titles(&a.title, &b.title),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::NewestFirst => "Newest first",
            SortKey::OldestFirst => "Oldest first",
            SortKey::TitleAlphabetical => "Title A-Z",
        })
    }
}

impl FromStr for SortKey {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest-first" => Ok(SortKey::NewestFirst),
            "oldest-first" => Ok(SortKey::OldestFirst),
            "title-alphabetical" => Ok(SortKey::TitleAlphabetical),
            other => Err(ParseVariantError {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

/// Case-folded order first so "apple" sits next to "Apple"; the raw string
/// breaks ties to keep the order total.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub search: String,
    pub category: CategoryFilter,
    pub mood: MoodFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: SortKey,
}

impl Criteria {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.category != CategoryFilter::All
            || self.mood != MoodFilter::Any
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    /// Day bounds are taken in the local time zone.
    pub fn apply<'a>(&self, entries: &'a [JournalEntry]) -> Vec<&'a JournalEntry> {
        self.apply_in(entries, &Local)
    }

    pub fn apply_in<'a, Tz: TimeZone>(
        &self,
        entries: &'a [JournalEntry],
        tz: &Tz,
    ) -> Vec<&'a JournalEntry> {
        let needle = self.search.to_lowercase();
        let from = self.date_from.map(|d| start_of_day(d, tz));
        // Exclusive: the first instant after `date_to` ends.
        let until = self
            .date_to
            .and_then(|d| d.succ_opt())
            .map(|d| start_of_day(d, tz));

        let mut view: Vec<&JournalEntry> = entries
            .iter()
            .filter(|e| needle.is_empty() || matches_search(e, &needle))
            .filter(|e| self.category.matches(e.category))
            .filter(|e| self.mood.matches(e.mood))
            .filter(|e| from.map_or(true, |from| e.date >= from))
            .filter(|e| until.map_or(true, |until| e.date < until))
            .collect();
        view.sort_by(|a, b| self.sort.compare(a, b));
        view
    }
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    merge_date_time(date, NaiveTime::MIN, tz)
}

fn matches_search(entry: &JournalEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || entry.content.to_lowercase().contains(needle)
        || entry.tags.iter().any(|t| t.to_lowercase().contains(needle))
}
