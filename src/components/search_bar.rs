use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_dispatch::EventKind;

use super::Component;
use crate::action::Action;

const PLACEHOLDER: &str = "Search Pokémon...";

pub struct SearchBarProps<'a> {
    pub query: &'a str,
    pub is_focused: bool,
}

/// Single-line search term editor shown in the header
#[derive(Default)]
pub struct SearchBar;

impl Component<Action> for SearchBar {
    type Props<'a> = SearchBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }
        let EventKind::Key(key) = event else {
            return None;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match key.code {
            KeyCode::Esc => Some(Action::SearchCancel),
            KeyCode::Enter => Some(Action::SearchSubmit),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(ch) => Some(Action::SearchInput(ch)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let accent = if props.is_focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let mut spans = vec![Span::styled(
            "/ ",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )];
        if props.query.is_empty() && !props.is_focused {
            spans.push(Span::styled(
                PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        } else {
            spans.push(Span::raw(props.query.to_string()));
            if props.is_focused {
                spans.push(Span::styled(
                    "_",
                    Style::default().fg(accent).add_modifier(Modifier::SLOW_BLINK),
                ));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
