use crate::app::{App, Editor, EditorField, InputMode, Popup, Tab, SETTINGS_ROWS};
use crate::favorites::ARTICLES;
use crate::journal_entry::JournalEntry;
use crate::kv_store::KeyValueStore;
use crate::settings::SettingKey;
use chrono::Local;
use color_eyre::Result;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::UnicodeWidthChar;

const GOLD: Color = Color::Rgb(0xD4, 0xAF, 0x37);
const BEIGE: Color = Color::Rgb(0xF5, 0xF5, 0xDC);
const MAX_CARD_TAGS: usize = 3;

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display<S: KeyValueStore>(&mut self, app: &App<S>) -> Result<()> {
        self.terminal.draw(|f| draw(f, app))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        // Nothing useful can be done if the terminal refuses to restore.
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(app.tab.title())
        .style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    match app.tab {
        Tab::Articles => draw_articles(f, app, chunks[1]),
        Tab::Journal => draw_journal(f, app, chunks[1]),
        Tab::Settings => draw_settings(f, app, chunks[1]),
    }

    draw_tab_bar(f, app.tab, chunks[2]);

    let controls = Paragraph::new(controls_line(app))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls, chunks[3]);

    if let Some(editor) = &app.editor {
        draw_editor(f, editor);
    }
    if let Some(popup) = &app.popup {
        draw_popup(f, app, popup);
    }
}

fn draw_tab_bar(f: &mut Frame, active: Tab, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(active.index())
        .style(Style::default().fg(BEIGE))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(GOLD)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn key_hint(key: &str, action: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {action}  ")),
    ]
}

fn controls_line<S: KeyValueStore>(app: &App<S>) -> Line<'static> {
    let hints: &[(&str, &str)] = if app.popup.is_some() {
        &[("Esc", "close"), ("y/n", "confirm"), ("Enter", "open")]
    } else if app.editor.is_some() {
        &[
            ("Tab", "next field"),
            ("←/→", "choose"),
            ("Ctrl-S", "save"),
            ("Esc", "cancel"),
        ]
    } else if app.input_mode != InputMode::Normal {
        &[("Enter", "apply"), ("Esc", "cancel")]
    } else {
        match app.tab {
            Tab::Articles => &[
                ("f", "bookmark"),
                ("s", "saved"),
                ("Enter", "read"),
                ("Tab", "switch"),
                ("q", "quit"),
            ],
            Tab::Journal => &[
                ("n", "new"),
                ("Enter", "edit"),
                ("d", "delete"),
                ("/", "search"),
                ("c", "category"),
                ("m", "mood"),
                ("[ ]", "dates"),
                ("o", "sort"),
                ("x", "clear"),
                ("q", "quit"),
            ],
            Tab::Settings => &[("Enter", "toggle"), ("Tab", "switch"), ("q", "quit")],
        }
    };
    Line::from(
        hints
            .iter()
            .flat_map(|(k, a)| key_hint(k, a))
            .collect::<Vec<_>>(),
    )
}

fn draw_articles<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let items: Vec<ListItem> = ARTICLES
        .iter()
        .map(|a| {
            let mark = if app.is_favorite(a.id) { "★" } else { "☆" };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{mark} "), Style::default().fg(GOLD)),
                    Span::styled(
                        a.title,
                        Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", a.subtitle),
                    Style::default().fg(BEIGE),
                )),
            ])
        })
        .collect();

    let title = format!("Articles ({} saved)", app.saved_articles().len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(app.article_selected)),
    );
}

fn draw_journal<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let c = &app.criteria;
    let search = if app.input_mode == InputMode::Search {
        format!("{}|", app.input_buffer)
    } else {
        c.search.clone()
    };
    let date_field = |mode: InputMode, value: Option<chrono::NaiveDate>| {
        if app.input_mode == mode {
            format!("{}|", app.input_buffer)
        } else {
            value.map_or_else(|| "-".to_string(), |d| d.to_string())
        }
    };
    let filters = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(GOLD)),
        Span::raw(format!("{search}  ")),
        Span::styled("Category: ", Style::default().fg(GOLD)),
        Span::raw(format!("{}  ", c.category)),
        Span::styled("Mood: ", Style::default().fg(GOLD)),
        Span::raw(format!("{}  ", c.mood)),
        Span::styled("From: ", Style::default().fg(GOLD)),
        Span::raw(format!("{}  ", date_field(InputMode::DateFrom, c.date_from))),
        Span::styled("To: ", Style::default().fg(GOLD)),
        Span::raw(format!("{}  ", date_field(InputMode::DateTo, c.date_to))),
        Span::styled("Sort: ", Style::default().fg(GOLD)),
        Span::raw(c.sort.to_string()),
    ]);
    f.render_widget(
        Paragraph::new(filters).block(Block::default().borders(Borders::ALL).title("My Journal")),
        chunks[0],
    );

    let visible = app.visible_entries();
    if visible.is_empty() {
        let lines = if app.total_entries() == 0 {
            vec![
                Line::from(Span::styled("No entries yet", Style::default().fg(GOLD))),
                Line::from("Press n to add your first entry"),
            ]
        } else {
            vec![Line::from(Span::styled(
                "No matching entries",
                Style::default().fg(GOLD),
            ))]
        };
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Entries")),
            chunks[1],
        );
        return;
    }

    let width = chunks[1].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = visible.iter().map(|e| entry_card(e, width)).collect();
    let title = format!("Entries ({}/{})", visible.len(), app.total_entries());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        chunks[1],
        &mut ListState::default().with_selected(Some(app.journal_selected)),
    );
}

fn entry_card(entry: &JournalEntry, width: usize) -> ListItem<'static> {
    let (r, g, b) = entry.category.color();
    let date = entry.date.with_timezone(&Local).format("%b %d, %Y %H:%M");
    let mut header = vec![
        Span::raw(format!("[{date}] ")),
        Span::styled(
            truncate(&entry.title, width / 2),
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", entry.category.name()),
            Style::default().fg(Color::Rgb(r, g, b)),
        ),
    ];
    if let Some(mood) = entry.mood {
        header.push(Span::raw(format!(" ({mood})")));
    }
    if entry.image.is_some() {
        header.push(Span::raw(" [img]"));
    }

    let mut lines = vec![
        Line::from(header),
        Line::from(Span::styled(
            truncate(entry.content.lines().next().unwrap_or(""), width),
            Style::default().fg(BEIGE),
        )),
    ];
    if !entry.tags.is_empty() {
        let tags: Vec<String> = entry
            .tags
            .iter()
            .take(MAX_CARD_TAGS)
            .map(|t| format!("#{t}"))
            .collect();
        lines.push(Line::from(Span::styled(
            tags.join(" "),
            Style::default().fg(Color::Rgb(0xC9, 0xA2, 0x27)),
        )));
    }
    ListItem::new(lines)
}

fn draw_settings<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let settings = app.settings();
    let mut items: Vec<ListItem> = SettingKey::ALL
        .iter()
        .map(|k| {
            let (label, color) = if settings.get(*k) {
                ("ON ", Color::Green)
            } else {
                ("OFF", Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", k.label()), Style::default().fg(BEIGE)),
                Span::styled(format!("[{label}]"), Style::default().fg(color)),
            ]))
        })
        .collect();
    items.push(ListItem::new(Line::from(Span::styled(
        "Reset Data",
        Style::default().fg(Color::Red),
    ))));
    debug_assert_eq!(items.len(), SETTINGS_ROWS);

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(app.settings_selected)),
    );
}

fn draw_editor(f: &mut Frame, editor: &Editor) {
    let area = centered_rect(80, 85, f.area());
    f.render_widget(Clear, area);

    let title = if editor.draft.is_editing() {
        "Edit Entry"
    } else {
        "New Entry"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(GOLD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);
    let pair = |area: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    };

    let draft = &editor.draft;
    let tags_value = {
        let mut shown: Vec<String> = draft.tags.iter().map(|t| format!("#{t}")).collect();
        shown.push(draft.tag_input.clone());
        shown.join(" ")
    };
    let mood_value = draft.mood.map_or_else(|| "none".to_string(), |m| m.to_string());

    render_field(f, editor, EditorField::Title, &draft.title, rows[0]);
    render_field(f, editor, EditorField::Content, &draft.content, rows[1]);
    let choice_row = pair(rows[2]);
    render_field(
        f,
        editor,
        EditorField::Category,
        &format!("< {} >", draft.category.name()),
        choice_row[0],
    );
    render_field(
        f,
        editor,
        EditorField::Mood,
        &format!("< {mood_value} >"),
        choice_row[1],
    );
    let when_row = pair(rows[3]);
    render_field(f, editor, EditorField::Date, &editor.date_text, when_row[0]);
    render_field(f, editor, EditorField::Time, &editor.time_text, when_row[1]);
    render_field(f, editor, EditorField::Tags, &tags_value, rows[4]);
    render_field(f, editor, EditorField::Image, &editor.image_text, rows[5]);

    if let Some(error) = &editor.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            rows[6],
        );
    }
}

fn render_field(f: &mut Frame, editor: &Editor, field: EditorField, value: &str, area: Rect) {
    let focused = editor.field == field;
    let text = if focused && !matches!(field, EditorField::Category | EditorField::Mood) {
        format!("{value}|")
    } else {
        value.to_string()
    };
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(field.label())
                .border_style(border),
        ),
        area,
    );
}

fn draw_popup<S: KeyValueStore>(f: &mut Frame, app: &App<S>, popup: &Popup) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    match popup {
        Popup::SavedArticles { selected } => {
            let saved = app.saved_articles();
            let block = Block::default().borders(Borders::ALL).title("Saved Articles");
            if saved.is_empty() {
                f.render_widget(
                    Paragraph::new("No saved articles")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(BEIGE))
                        .block(block),
                    area,
                );
                return;
            }
            let items: Vec<ListItem> = saved
                .iter()
                .map(|a| {
                    ListItem::new(vec![
                        Line::from(Span::styled(a.title, Style::default().fg(GOLD))),
                        Line::from(Span::styled(a.subtitle, Style::default().fg(BEIGE))),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");
            f.render_stateful_widget(
                list,
                area,
                &mut ListState::default().with_selected(Some(*selected)),
            );
        }
        Popup::ArticleDetail(article) => {
            let mark = if app.is_favorite(article.id) {
                "Bookmarked (f to remove)"
            } else {
                "Not bookmarked (f to add)"
            };
            let lines = vec![
                Line::from(Span::styled(
                    article.title,
                    Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(article.subtitle, Style::default().fg(BEIGE))),
                Line::from(""),
                Line::from(mark),
            ];
            f.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Article")),
                area,
            );
        }
        Popup::ConfirmDelete { title, .. } => {
            let body = format!(
                "Are you sure you want to delete \"{}\"?\n\ny: Delete   n: Cancel",
                truncate(title, 40)
            );
            render_message(f, area, "Delete Entry", &body, Color::Red);
        }
        Popup::ConfirmReset => render_message(
            f,
            area,
            "Reset Data",
            "Are you sure you want to reset all data? This will clear all progress, \
             favorites, journal entries and settings.\n\ny: Reset   n: Cancel",
            Color::Red,
        ),
        Popup::Message { title, body } => {
            render_message(f, area, title, &format!("{body}\n\nPress any key"), GOLD)
        }
    }
}

fn render_message(f: &mut Frame, area: Rect, title: &str, body: &str, color: Color) {
    f.render_widget(
        Paragraph::new(body.to_string())
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .border_style(Style::default().fg(color)),
            ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Cuts `s` to at most `max_width` terminal columns, marking the cut with `…`.
fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            let rest: usize = s
                .chars()
                .skip(out.chars().count())
                .map(|c| c.width().unwrap_or(0))
                .sum();
            if width + rest <= max_width {
                out.extend(s.chars().skip(out.chars().count()));
            } else {
                out.push('…');
            }
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::kv_store::MemoryStore;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    #[test]
    fn articles_block_counts_saved_out_of_full_catalog() {
        let app = App::new(Arc::new(MemoryStore::new()), &Config::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal
            .draw(|f| draw_articles(f, &app, f.area()))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Articles (0 saved)"));
        assert!(!screen.contains("Saved Articles"));
        assert!(screen.contains("Hatshepsut"));
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("Paris trip", 20), "Paris trip");
        assert_eq!(truncate("Paris trip", 10), "Paris trip");
        assert_eq!(truncate("Paris trip", 6), "Paris…");
        assert_eq!(truncate("日本語のメモ", 5), "日本…");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn truncate_to_nothing_leaves_no_marker() {
        assert_eq!(truncate("Paris trip", 0), "");
        assert_eq!(truncate("Paris trip", 1), "…");
    }
}
