use crate::config::Config;
use crate::draft::{DraftEntry, DATE_FORMAT, TIME_FORMAT};
use crate::favorites::{Article, FavoritesStore, ARTICLES};
use crate::journal_entry::{JournalEntry, Mood};
use crate::journal_store::JournalStore;
use crate::kv_store::KeyValueStore;
use crate::query::Criteria;
use crate::settings::{SettingKey, Settings, SettingsStore};
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Articles,
    Journal,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Articles, Tab::Journal, Tab::Settings];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Articles => "Articles",
            Tab::Journal => "Journal",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn offset(self, delta: isize) -> Tab {
        let len = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    SavedArticles { selected: usize },
    ArticleDetail(&'static Article),
    ConfirmDelete { id: String, title: String },
    ConfirmReset,
    Message { title: String, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    DateFrom,
    DateTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Content,
    Category,
    Mood,
    Date,
    Time,
    Tags,
    Image,
}

impl EditorField {
    pub const ALL: [EditorField; 8] = [
        EditorField::Title,
        EditorField::Content,
        EditorField::Category,
        EditorField::Mood,
        EditorField::Date,
        EditorField::Time,
        EditorField::Tags,
        EditorField::Image,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditorField::Title => "Title",
            EditorField::Content => "Content",
            EditorField::Category => "Category",
            EditorField::Mood => "Mood",
            EditorField::Date => "Date (YYYY-MM-DD)",
            EditorField::Time => "Time (HH:MM)",
            EditorField::Tags => "Tags (Enter adds)",
            EditorField::Image => "Image URI",
        }
    }

    fn step(self, delta: isize) -> EditorField {
        let len = Self::ALL.len() as isize;
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ALL[(i + delta).rem_euclid(len) as usize]
    }
}

/// The entry form. Date, time and image are kept as raw text until save.
#[derive(Debug, Clone)]
pub struct Editor {
    pub draft: DraftEntry,
    pub field: EditorField,
    pub date_text: String,
    pub time_text: String,
    pub image_text: String,
    pub error: Option<String>,
}

impl Editor {
    fn new(draft: DraftEntry) -> Self {
        Editor {
            date_text: draft.date.format(DATE_FORMAT).to_string(),
            time_text: draft.time.format(TIME_FORMAT).to_string(),
            image_text: draft
                .image
                .as_ref()
                .map(|i| i.uri.clone())
                .unwrap_or_default(),
            draft,
            field: EditorField::Title,
            error: None,
        }
    }

    fn text_slot(&mut self) -> Option<&mut String> {
        match self.field {
            EditorField::Title => Some(&mut self.draft.title),
            EditorField::Content => Some(&mut self.draft.content),
            EditorField::Date => Some(&mut self.date_text),
            EditorField::Time => Some(&mut self.time_text),
            EditorField::Tags => Some(&mut self.draft.tag_input),
            EditorField::Image => Some(&mut self.image_text),
            EditorField::Category | EditorField::Mood => None,
        }
    }

    fn cycle_choice(&mut self) {
        match self.field {
            EditorField::Category => self.draft.category = self.draft.category.next(),
            EditorField::Mood => self.draft.mood = Mood::cycle(self.draft.mood),
            _ => {}
        }
    }

    /// Pushes the text fields into the draft, reporting the first bad one.
    fn finish(mut self) -> Result<DraftEntry, (Self, String)> {
        if let Err(e) = self.draft.set_date_str(&self.date_text) {
            return Err((self, format!("Invalid date: {e}")));
        }
        if let Err(e) = self.draft.set_time_str(&self.time_text) {
            return Err((self, format!("Invalid time: {e}")));
        }
        let uri = self.image_text.clone();
        self.draft.set_image_uri(&uri);
        Ok(self.draft)
    }
}

pub const SETTINGS_ROWS: usize = SettingKey::ALL.len() + 1;

pub struct App<S> {
    pub tab: Tab,
    journal: JournalStore<S>,
    favorites: FavoritesStore<S>,
    settings: SettingsStore<S>,
    pub criteria: Criteria,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub editor: Option<Editor>,
    pub popup: Option<Popup>,
    pub article_selected: usize,
    pub journal_selected: usize,
    pub settings_selected: usize,
    pub should_quit: bool,
}

impl<S: KeyValueStore + Clone> App<S> {
    pub fn new(storage: S, config: &Config) -> Self {
        App {
            tab: Tab::Journal,
            journal: JournalStore::new(storage.clone()),
            favorites: FavoritesStore::new(storage.clone()),
            settings: SettingsStore::new(storage),
            criteria: Criteria {
                sort: config.default_sort,
                ..Criteria::default()
            },
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            editor: None,
            popup: None,
            article_selected: 0,
            journal_selected: 0,
            settings_selected: 0,
            should_quit: false,
        }
    }
}

impl<S: KeyValueStore> App<S> {
    pub async fn init(&mut self) {
        self.favorites.load().await;
        self.settings.load().await;
        self.journal.load().await;
    }

    pub fn visible_entries(&self) -> Vec<&JournalEntry> {
        self.criteria.apply(self.journal.entries())
    }

    pub fn total_entries(&self) -> usize {
        self.journal.entries().len()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn saved_articles(&self) -> Vec<&'static Article> {
        self.favorites.saved()
    }

    pub fn settings(&self) -> Settings {
        self.settings.settings()
    }

    async fn switch_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        debug!(tab = tab.title(), "tab focused");
        self.tab = tab;
        if tab == Tab::Journal {
            self.journal.load().await;
            self.clamp_journal_selection();
        }
    }

    fn clamp_journal_selection(&mut self) {
        let len = self.visible_entries().len();
        self.journal_selected = self.journal_selected.min(len.saturating_sub(1));
    }

    fn show_error(&mut self, body: &str) {
        self.popup = Some(Popup::Message {
            title: "Error".to_string(),
            body: body.to_string(),
        });
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if self.popup.is_some() {
            self.handle_popup_key(key).await;
        } else if self.editor.is_some() {
            self.handle_editor_key(key).await;
        } else if self.input_mode != InputMode::Normal {
            self.handle_input_key(key);
        } else {
            self.handle_normal_key(key).await;
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.switch_tab(self.tab.offset(1)).await,
            KeyCode::BackTab => self.switch_tab(self.tab.offset(-1)).await,
            KeyCode::Char('1') => self.switch_tab(Tab::Articles).await,
            KeyCode::Char('2') => self.switch_tab(Tab::Journal).await,
            KeyCode::Char('3') => self.switch_tab(Tab::Settings).await,
            _ => match self.tab {
                Tab::Articles => self.handle_articles_key(key).await,
                Tab::Journal => self.handle_journal_key(key),
                Tab::Settings => self.handle_settings_key(key).await,
            },
        }
    }

    async fn handle_articles_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.article_selected = self.article_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.article_selected + 1 < ARTICLES.len() {
                    self.article_selected += 1;
                }
            }
            KeyCode::Char('f') => {
                let id = ARTICLES[self.article_selected].id;
                self.favorites.toggle(id).await;
            }
            KeyCode::Char('s') => self.popup = Some(Popup::SavedArticles { selected: 0 }),
            KeyCode::Enter => {
                self.popup = Some(Popup::ArticleDetail(&ARTICLES[self.article_selected]))
            }
            _ => {}
        }
    }

    fn handle_journal_key(&mut self, key: KeyEvent) {
        let visible = self.visible_entries().len();
        match key.code {
            KeyCode::Up => self.journal_selected = self.journal_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.journal_selected + 1 < visible {
                    self.journal_selected += 1;
                }
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.input_buffer = self.criteria.search.clone();
            }
            KeyCode::Char('[') => {
                self.input_mode = InputMode::DateFrom;
                self.input_buffer = format_date(self.criteria.date_from);
            }
            KeyCode::Char(']') => {
                self.input_mode = InputMode::DateTo;
                self.input_buffer = format_date(self.criteria.date_to);
            }
            KeyCode::Char('c') => self.criteria.category = self.criteria.category.next(),
            KeyCode::Char('m') => self.criteria.mood = self.criteria.mood.next(),
            KeyCode::Char('o') => self.criteria.sort = self.criteria.sort.next(),
            KeyCode::Char('x') => {
                self.criteria = Criteria {
                    sort: self.criteria.sort,
                    ..Criteria::default()
                }
            }
            KeyCode::Char('n') => self.editor = Some(Editor::new(DraftEntry::new(Local::now()))),
            KeyCode::Enter => {
                let draft = self
                    .visible_entries()
                    .get(self.journal_selected)
                    .map(|e| DraftEntry::from_entry(e, &Local));
                if let Some(draft) = draft {
                    self.editor = Some(Editor::new(draft));
                }
            }
            KeyCode::Char('d') => {
                let target = self
                    .visible_entries()
                    .get(self.journal_selected)
                    .map(|e| (e.id.clone(), e.title.clone()));
                if let Some((id, title)) = target {
                    self.popup = Some(Popup::ConfirmDelete { id, title });
                }
            }
            _ => {}
        }
        self.clamp_journal_selection();
    }

    async fn handle_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.settings_selected = self.settings_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.settings_selected + 1 < SETTINGS_ROWS {
                    self.settings_selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => match SettingKey::ALL.get(self.settings_selected) {
                Some(setting) => {
                    self.settings.toggle(*setting).await;
                }
                None => self.popup = Some(Popup::ConfirmReset),
            },
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.input_mode == InputMode::Search {
                    self.criteria.search.clear();
                }
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => self.commit_input(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
        if self.input_mode == InputMode::Search {
            self.criteria.search = self.input_buffer.clone();
        }
        self.clamp_journal_selection();
    }

    fn commit_input(&mut self) {
        let raw = std::mem::take(&mut self.input_buffer);
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        if mode == InputMode::Search {
            // already applied keystroke by keystroke
            return;
        }

        let parsed = if raw.trim().is_empty() {
            Ok(None)
        } else {
            NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map(Some)
        };
        match (mode, parsed) {
            (InputMode::DateFrom, Ok(date)) => self.criteria.date_from = date,
            (InputMode::DateTo, Ok(date)) => self.criteria.date_to = date,
            (_, Err(e)) => {
                warn!(input = %raw, error = %e, "bad date filter");
                self.show_error(&format!("Invalid date `{raw}`, expected YYYY-MM-DD"));
            }
            _ => {}
        }
    }

    async fn handle_editor_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.save_editor().await,
            KeyCode::Esc => {
                self.editor = None;
                return;
            }
            _ => {}
        }

        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => editor.field = editor.field.step(1),
            KeyCode::BackTab | KeyCode::Up => editor.field = editor.field.step(-1),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if matches!(editor.field, EditorField::Category | EditorField::Mood) =>
            {
                editor.cycle_choice()
            }
            KeyCode::Enter => match editor.field {
                EditorField::Content => editor.draft.content.push('\n'),
                EditorField::Tags => {
                    editor.draft.commit_tag_input();
                }
                _ => editor.field = editor.field.step(1),
            },
            KeyCode::Backspace => {
                if editor.field == EditorField::Tags && editor.draft.tag_input.is_empty() {
                    editor.draft.tags.pop();
                } else if let Some(text) = editor.text_slot() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = editor.text_slot() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    async fn save_editor(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let draft = match editor.finish() {
            Ok(draft) => draft,
            Err((mut editor, message)) => {
                editor.error = Some(message);
                self.editor = Some(editor);
                return;
            }
        };

        let (entry, editing_id) = draft.clone().into_entry(&Local);
        match self.journal.save(entry, editing_id.as_deref()).await {
            Ok(_) => {
                if editing_id.is_none() {
                    self.journal_selected = 0;
                }
                self.clamp_journal_selection();
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                let mut editor = Editor::new(draft);
                editor.error = Some(e.to_string());
                self.editor = Some(editor);
                self.show_error("Failed to save journal entry");
            }
        }
    }

    async fn handle_popup_key(&mut self, key: KeyEvent) {
        let Some(popup) = self.popup.take() else {
            return;
        };
        match popup {
            Popup::ConfirmDelete { id, title } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if let Err(e) = self.journal.delete(&id).await {
                        warn!(error = %e, "delete failed");
                        self.show_error("Failed to delete entry");
                    }
                    self.clamp_journal_selection();
                }
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.popup = Some(Popup::ConfirmDelete { id, title }),
            },
            Popup::ConfirmReset => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.reset_all_data().await,
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.popup = Some(Popup::ConfirmReset),
            },
            Popup::SavedArticles { selected } => {
                let saved = self.favorites.saved();
                match key.code {
                    KeyCode::Esc | KeyCode::Char('s') => {}
                    KeyCode::Up => {
                        self.popup = Some(Popup::SavedArticles {
                            selected: selected.saturating_sub(1),
                        })
                    }
                    KeyCode::Down => {
                        let selected = (selected + 1).min(saved.len().saturating_sub(1));
                        self.popup = Some(Popup::SavedArticles { selected });
                    }
                    KeyCode::Enter => {
                        self.popup = match saved.get(selected) {
                            Some(article) => Some(Popup::ArticleDetail(*article)),
                            None => Some(Popup::SavedArticles { selected }),
                        }
                    }
                    _ => self.popup = Some(Popup::SavedArticles { selected }),
                }
            }
            Popup::ArticleDetail(article) => {
                if key.code == KeyCode::Char('f') {
                    self.favorites.toggle(article.id).await;
                    self.popup = Some(Popup::ArticleDetail(article));
                }
            }
            Popup::Message { .. } => {}
        }
    }

    async fn reset_all_data(&mut self) {
        let result = self.settings.reset_all_data().await;
        if result.is_ok() {
            self.favorites.clear();
        } else {
            self.favorites.load().await;
            self.settings.load().await;
        }
        self.journal.load().await;
        self.clamp_journal_selection();
        self.popup = Some(match result {
            Ok(()) => Popup::Message {
                title: "Success".to_string(),
                body: "All data has been reset successfully!".to_string(),
            },
            Err(_) => Popup::Message {
                title: "Error".to_string(),
                body: "Failed to reset data. Please try again.".to_string(),
            },
        });
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
