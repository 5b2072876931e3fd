use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Work,
    Travel,
    Ideas,
    Memories,
    Goals,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Personal,
        Category::Work,
        Category::Travel,
        Category::Ideas,
        Category::Memories,
        Category::Goals,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Travel => "travel",
            Category::Ideas => "ideas",
            Category::Memories => "memories",
            Category::Goals => "goals",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Travel => "Travel",
            Category::Ideas => "Ideas",
            Category::Memories => "Memories",
            Category::Goals => "Goals",
        }
    }

    /// Badge color as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Category::Personal => (0x3B, 0x82, 0xF6),
            Category::Work => (0x10, 0xB9, 0x81),
            Category::Travel => (0xF5, 0x9E, 0x0B),
            Category::Ideas => (0x8B, 0x5C, 0xF6),
            Category::Memories => (0xEC, 0x48, 0x99),
            Category::Goals => (0xEF, 0x44, 0x44),
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVariantError {
                kind: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Tired,
    Confused,
    Excited,
    Angry,
    Calm,
    Celebrating,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Tired,
        Mood::Confused,
        Mood::Excited,
        Mood::Angry,
        Mood::Calm,
        Mood::Celebrating,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Tired => "tired",
            Mood::Confused => "confused",
            Mood::Excited => "excited",
            Mood::Angry => "angry",
            Mood::Calm => "calm",
            Mood::Celebrating => "celebrating",
        }
    }

    /// Cycles through the moods, then back to "no mood".
    pub fn cycle(current: Option<Mood>) -> Option<Mood> {
        match current {
            None => Some(Self::ALL[0]),
            Some(m) => {
                let i = Self::ALL.iter().position(|x| *x == m).unwrap_or(0);
                Self::ALL.get(i + 1).copied()
            }
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mood {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVariantError {
                kind: "mood",
                value: s.to_string(),
            })
    }
}

/// A locally picked image. Only the URI is interpreted; whatever else the
/// picker reported is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub uri: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        ImageRef {
            uri: uri.into(),
            metadata: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    pub date: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_mood"
    )]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl JournalEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: DateTime<Utc>) -> Self {
        JournalEntry {
            id: String::new(),
            title: title.into(),
            content: content.into(),
            category: Category::default(),
            date,
            mood: None,
            tags: Vec::new(),
            image: None,
        }
    }

    /// Returns false when the input normalizes to nothing or is already present.
    pub fn add_tag(&mut self, input: &str) -> bool {
        add_tag(&mut self.tags, input)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// `"  #Travel "` -> `Some("Travel")`, `"#"` -> `None`.
pub fn normalize_tag(input: &str) -> Option<String> {
    let tag = input.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

pub(crate) fn add_tag(tags: &mut Vec<String>, input: &str) -> bool {
    match normalize_tag(input) {
        Some(tag) if !tags.contains(&tag) => {
            tags.push(tag);
            true
        }
        _ => false,
    }
}

fn lenient_category<'de, D: Deserializer<'de>>(d: D) -> Result<Category, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(raw
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn lenient_mood<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Mood>, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(raw.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn tag_input_is_normalized_and_deduplicated() {
        let mut entry = JournalEntry::new("Paris trip", "", sample_date());
        assert!(entry.add_tag("#Travel"));
        assert_eq!(entry.tags, vec!["Travel"]);
        assert!(!entry.add_tag("Travel"));
        assert!(!entry.add_tag("  ##Travel "));
        assert!(entry.add_tag("travel"));
        assert!(!entry.add_tag("#"));
        assert_eq!(entry.tags, vec!["Travel", "travel"]);

        assert!(entry.remove_tag("Travel"));
        assert!(!entry.remove_tag("Travel"));
        assert_eq!(entry.tags, vec!["travel"]);
    }

    #[test]
    fn reads_records_written_by_the_mobile_app() {
        let raw = r#"{
            "id": "1709285400000",
            "title": "Paris trip",
            "content": "Louvre",
            "category": "travel",
            "date": "2024-03-01T09:30:00.000Z",
            "mood": "excited",
            "tags": ["art"],
            "image": {"uri": "file:///tmp/a.jpg", "width": 640, "fileName": "a.jpg"}
        }"#;
        let entry: JournalEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.category, Category::Travel);
        assert_eq!(entry.mood, Some(Mood::Excited));
        assert_eq!(entry.date, sample_date());

        let image = entry.image.as_ref().unwrap();
        assert_eq!(image.uri, "file:///tmp/a.jpg");
        assert_eq!(image.metadata["width"], 640);

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["image"]["fileName"], "a.jpg");
        assert_eq!(back["category"], "travel");
    }

    #[test]
    fn unknown_or_missing_enums_fall_back() {
        let raw = r#"{"id":"x","date":"2024-03-01T09:30:00Z","category":"hobbies","mood":"sleepy"}"#;
        let entry: JournalEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.category, Category::Personal);
        assert_eq!(entry.mood, None);
        assert!(entry.title.is_empty());
        assert!(entry.tags.is_empty());

        let raw = r#"{"id":"y","date":"2024-03-01T09:30:00Z"}"#;
        let entry: JournalEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.category, Category::Personal);
        assert!(serde_json::to_value(&entry).unwrap().get("mood").is_none());
    }

    #[test]
    fn mood_cycle_wraps_through_none() {
        assert_eq!(Mood::cycle(None), Some(Mood::Happy));
        assert_eq!(Mood::cycle(Some(Mood::Happy)), Some(Mood::Sad));
        assert_eq!(Mood::cycle(Some(Mood::Celebrating)), None);
        assert_eq!(Category::Goals.next(), Category::Personal);
        assert_eq!("Work".parse::<Category>(), Ok(Category::Work));
        assert!("all".parse::<Category>().is_err());
    }
}
