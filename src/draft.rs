//! The value edited by the entry form.
//!
//! Date and time of day are edited separately and only merged into one
//! instant when the draft is turned into an entry.

use crate::journal_entry::{self, Category, ImageRef, JournalEntry, Mood};
use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveTime, ParseResult, TimeDelta, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    /// Set when the draft was opened from an existing entry.
    pub editing_id: Option<String>,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub mood: Option<Mood>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tags: Vec<String>,
    pub image: Option<ImageRef>,
    pub tag_input: String,
}

impl DraftEntry {
    pub fn new<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        DraftEntry {
            editing_id: None,
            title: String::new(),
            content: String::new(),
            category: Category::default(),
            mood: None,
            date: now.date_naive(),
            time: truncate_to_minute(now.time()),
            tags: Vec::new(),
            image: None,
            tag_input: String::new(),
        }
    }

    pub fn from_entry<Tz: TimeZone>(entry: &JournalEntry, tz: &Tz) -> Self {
        let local = entry.date.with_timezone(tz);
        DraftEntry {
            editing_id: Some(entry.id.clone()),
            title: entry.title.clone(),
            content: entry.content.clone(),
            category: entry.category,
            mood: entry.mood,
            date: local.date_naive(),
            time: truncate_to_minute(local.time()),
            tags: entry.tags.clone(),
            image: entry.image.clone(),
            tag_input: String::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn set_date_str(&mut self, input: &str) -> ParseResult<()> {
        self.date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)?;
        Ok(())
    }

    pub fn set_time_str(&mut self, input: &str) -> ParseResult<()> {
        self.time = NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)?;
        Ok(())
    }

    pub fn set_image_uri(&mut self, uri: &str) {
        let uri = uri.trim();
        self.image = if uri.is_empty() {
            None
        } else {
            match self.image.take() {
                Some(mut image) => {
                    image.uri = uri.to_string();
                    Some(image)
                }
                None => Some(ImageRef::new(uri)),
            }
        };
    }

    /// Moves the tag buffer into the tag list. The buffer is cleared either way.
    pub fn commit_tag_input(&mut self) -> bool {
        let input = std::mem::take(&mut self.tag_input);
        journal_entry::add_tag(&mut self.tags, &input)
    }

    pub fn merged_instant<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        merge_date_time(self.date, self.time, tz)
    }

    /// The entry to hand to the store, plus the id being edited if any.
    /// The entry's own id is left empty; the store decides it.
    pub fn into_entry<Tz: TimeZone>(mut self, tz: &Tz) -> (JournalEntry, Option<String>) {
        if !self.tag_input.trim().is_empty() {
            self.commit_tag_input();
        }
        let date = self.merged_instant(tz);
        let entry = JournalEntry {
            id: String::new(),
            title: self.title,
            content: self.content,
            category: self.category,
            date,
            mood: self.mood,
            tags: self.tags,
            image: self.image,
        };
        (entry, self.editing_id)
    }
}

/// Year/month/day from `date`, hour/minute from `time`, seconds zeroed.
///
/// Ambiguous wall-clock times resolve to the earlier instant. Times that fall
/// in a DST gap are pushed forward by an hour.
pub fn merge_date_time<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(truncate_to_minute(time));
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};

    /// UTC+1 in winter and UTC+2 in summer, switching on the 2024 EU dates:
    /// 02:00 jumps to 03:00 on March 31 and 03:00 falls back to 02:00 on
    /// October 27.
    #[derive(Debug, Clone, Copy)]
    struct CentralEuropean;

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn winter() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(7200).unwrap()
    }

    impl TimeZone for CentralEuropean {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            CentralEuropean
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let spring = at(3, 31, 2, 0);
            let fall = at(10, 27, 2, 0);
            let hour = TimeDelta::hours(1);
            if *local < spring {
                LocalResult::Single(winter())
            } else if *local < spring + hour {
                LocalResult::None
            } else if *local < fall {
                LocalResult::Single(summer())
            } else if *local < fall + hour {
                LocalResult::Ambiguous(summer(), winter())
            } else {
                LocalResult::Single(winter())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc >= at(3, 31, 1, 0) && *utc < at(10, 27, 1, 0) {
                summer()
            } else {
                winter()
            }
        }
    }

    #[test]
    fn repeated_autumn_hour_resolves_to_earlier_instant() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let merged = merge_date_time(date, time, &CentralEuropean);
        assert_eq!(merged, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn skipped_spring_hour_moves_forward() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let merged = merge_date_time(date, time, &CentralEuropean);
        assert_eq!(merged, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());

        let before = merge_date_time(date, NaiveTime::from_hms_opt(1, 59, 0).unwrap(), &CentralEuropean);
        assert_eq!(before, Utc.with_ymd_and_hms(2024, 3, 31, 0, 59, 0).unwrap());
    }

    #[test]
    fn merge_takes_day_from_date_and_clock_from_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let time = NaiveTime::from_hms_opt(18, 45, 59).unwrap();
        let merged = merge_date_time(date, time, &Utc);
        assert_eq!(merged, Utc.with_ymd_and_hms(2024, 3, 1, 18, 45, 0).unwrap());

        let paris = FixedOffset::east_opt(3600).unwrap();
        let merged = merge_date_time(date, time, &paris);
        assert_eq!(merged, Utc.with_ymd_and_hms(2024, 3, 1, 17, 45, 0).unwrap());
    }

    #[test]
    fn editing_an_entry_keeps_its_id_and_fields() {
        let mut entry = JournalEntry::new(
            "Work review",
            "Q2 goals",
            Utc.with_ymd_and_hms(2024, 5, 10, 8, 15, 0).unwrap(),
        );
        entry.id = "abc".into();
        entry.category = Category::Work;
        entry.mood = Some(Mood::Tired);

        let mut draft = DraftEntry::from_entry(&entry, &Utc);
        assert!(draft.is_editing());
        draft.set_time_str("09:05").unwrap();
        draft.tag_input = "#review".into();

        let (saved, editing_id) = draft.into_entry(&Utc);
        assert_eq!(editing_id.as_deref(), Some("abc"));
        assert_eq!(saved.date, Utc.with_ymd_and_hms(2024, 5, 10, 9, 5, 0).unwrap());
        assert_eq!(saved.tags, vec!["review"]);
        assert_eq!(saved.category, Category::Work);
        assert_eq!(saved.mood, Some(Mood::Tired));
    }

    #[test]
    fn bad_date_input_leaves_draft_untouched() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 30).unwrap();
        let mut draft = DraftEntry::new(now);
        assert_eq!(draft.time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(draft.set_date_str("2024-13-40").is_err());
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        draft.set_date_str("2024-02-29").unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn image_uri_edit_keeps_picker_metadata() {
        let mut draft = DraftEntry::new(Utc::now());
        let mut image = ImageRef::new("file:///a.jpg");
        image.metadata.insert("width".into(), 640.into());
        draft.image = Some(image);

        draft.set_image_uri("file:///b.jpg");
        let image = draft.image.as_ref().unwrap();
        assert_eq!(image.uri, "file:///b.jpg");
        assert_eq!(image.metadata["width"], 640);

        draft.set_image_uri("  ");
        assert!(draft.image.is_none());
    }
}
