use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::highlight_substring;

use super::format::{format_id, format_name, spinner_frame};
use super::Component;
use crate::action::Action;
use crate::state::{grid_columns, grid_rows, AppState, ItemState, Summary};

pub const ERROR_MARKER: &str = "\u{26a0} error";
/// Shown before the types of a resolved card that has artwork to open.
pub const IMAGE_MARKER: &str = "\u{25a3}";

const CARD_BORDER: Color = Color::Rgb(70, 80, 100);
const CARD_CURSOR: Color = Color::Rgb(228, 176, 88);
const TEXT_DIM: Color = Color::Rgb(150, 160, 175);

pub struct CardGridProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Responsive grid of catalog cards. Keeps the cursor row scrolled into view.
#[derive(Default)]
pub struct CardGrid {
    scroll_row: usize,
}

impl CardGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    fn follow_cursor(&mut self, cursor: usize, columns: usize, rows: usize, total: usize) {
        let cursor_row = cursor / columns;
        if cursor_row < self.scroll_row {
            self.scroll_row = cursor_row;
        } else if cursor_row >= self.scroll_row + rows {
            self.scroll_row = cursor_row + 1 - rows;
        }
        let total_rows = total.div_ceil(columns);
        self.scroll_row = self.scroll_row.min(total_rows.saturating_sub(rows));
    }
}

impl Component<Action> for CardGrid {
    type Props<'a> = CardGridProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    Some(Action::CursorMove { cols: -1, rows: 0 })
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    Some(Action::CursorMove { cols: 1, rows: 0 })
                }
                KeyCode::Up | KeyCode::Char('k') => Some(Action::CursorMove { cols: 0, rows: -1 }),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::CursorMove { cols: 0, rows: 1 }),
                KeyCode::PageUp => Some(Action::CursorPage(-1)),
                KeyCode::PageDown => Some(Action::CursorPage(1)),
                KeyCode::Char('g') | KeyCode::Home => Some(Action::CursorJumpTop),
                KeyCode::Char('G') | KeyCode::End => Some(Action::CursorJumpBottom),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let state = props.state;
                    (!state.filtered.is_empty()).then_some(Action::ItemActivate(state.cursor))
                }
                KeyCode::Char('/') => Some(Action::SearchStart),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            EventKind::Scroll { delta, .. } => Some(Action::CursorMove {
                cols: 0,
                rows: *delta as i16,
            }),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let total = state.filtered.len();
        if total == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        let columns = grid_columns(area.width);
        let rows = grid_rows(area.height);
        self.follow_cursor(state.cursor, columns, rows, total);

        let card_width = area.width / columns as u16;
        let card_height = area.height / rows as u16;
        let first = self.scroll_row * columns;
        let last = (first + columns * rows).min(total);

        for index in first..last {
            let Some(entry) = state.visible_entry(index) else {
                continue;
            };
            let slot = index - first;
            let card_area = Rect {
                x: area.x + (slot % columns) as u16 * card_width,
                y: area.y + (slot / columns) as u16 * card_height,
                width: card_width,
                height: card_height,
            };
            let is_cursor = props.is_focused && index == state.cursor;
            render_card(frame, card_area, state, entry, is_cursor);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, state: &AppState, entry: &Summary, is_cursor: bool) {
    let border_style = if is_cursor {
        Style::default().fg(CARD_CURSOR).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(CARD_BORDER)
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    if let Some(id) = entry.id() {
        block = block.title(Span::styled(
            format!(" {} ", format_id(id)),
            Style::default().fg(TEXT_DIM),
        ));
    }

    let name_style = Style::default().add_modifier(Modifier::BOLD);
    let highlight = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let mut lines = vec![highlight_substring(
        &format_name(&entry.name),
        &state.search.query,
        name_style,
        highlight,
    )];
    lines.push(item_status_line(state.item(&entry.name), state.tick));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn item_status_line(item: Option<&ItemState>, tick: u64) -> Line<'static> {
    match item {
        Some(DataResource::Loading) | None => Line::from(Span::styled(
            format!("{} loading", spinner_frame(tick)),
            Style::default().fg(TEXT_DIM),
        )),
        Some(DataResource::Failed(_)) => Line::from(Span::styled(
            ERROR_MARKER,
            Style::default().fg(Color::Red),
        )),
        Some(DataResource::Loaded(detail)) => {
            let mut spans = Vec::new();
            if detail.artwork_url().is_some() {
                spans.push(Span::styled(IMAGE_MARKER, Style::default().fg(CARD_CURSOR)));
                spans.push(Span::raw(" "));
            }
            for (idx, type_name) in detail.types.iter().enumerate() {
                if idx > 0 {
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled(
                    format_name(type_name),
                    Style::default().fg(Color::Cyan),
                ));
            }
            Line::from(spans)
        }
        Some(DataResource::Empty) => Line::default(),
    }
}
