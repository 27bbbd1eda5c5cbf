use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use super::format::spinner_frame;
use super::{CardGrid, CardGridProps, Component, SearchBar, SearchBarProps};
use crate::action::Action;
use crate::state::{AppState, FOOTER_ROWS, HEADER_ROWS};

const TITLE: &str = "POKÉDEX";
const ACCENT: Color = Color::Rgb(228, 176, 88);
const TEXT_DIM: Color = Color::Rgb(150, 160, 175);

pub struct CatalogViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Header with title, count and search bar; card grid or status panel; footer
pub struct CatalogView {
    grid: CardGrid,
    search: SearchBar,
    status_bar: StatusBar,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            grid: CardGrid::new(),
            search: SearchBar,
            status_bar: StatusBar::new(),
        }
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for CatalogView {
    type Props<'a> = CatalogViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let state = props.state;
        if state.search.active {
            let props = SearchBarProps {
                query: &state.search.query,
                is_focused: true,
            };
            return self.search.handle_event(event, props).into_iter().collect();
        }
        let props = CardGridProps {
            state,
            is_focused: true,
        };
        self.grid.handle_event(event, props).into_iter().collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(1),
            Constraint::Length(FOOTER_ROWS),
        ])
        .split(area);

        self.render_header(frame, chunks[0], state);

        let body = chunks[1];
        if let Some(error) = state.catalog.error() {
            render_error_panel(frame, body, error);
        } else if !state.catalog.is_loaded() {
            render_centered(
                frame,
                body,
                Line::from(Span::styled(
                    format!("{} Loading Pokédex...", spinner_frame(state.tick)),
                    Style::default().fg(ACCENT),
                )),
            );
        } else if state.filtered.is_empty() {
            let message = if state.summaries().is_empty() {
                "The catalog is empty".to_string()
            } else {
                format!("No Pokémon match \"{}\"", state.search.query)
            };
            render_centered(
                frame,
                body,
                Line::from(Span::styled(message, Style::default().fg(TEXT_DIM))),
            );
        } else {
            let props = CardGridProps {
                state,
                is_focused: props.is_focused && !state.search.active,
            };
            self.grid.render(frame, body, props);
        }

        self.render_footer(frame, chunks[2], state);
    }
}

impl CatalogView {
    fn render_header(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(TEXT_DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let count = if state.catalog.is_loaded() {
            format!("  {} of {}", state.filtered.len(), state.summaries().len())
        } else {
            String::new()
        };
        let title = Line::from(vec![
            Span::styled(TITLE, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(count, Style::default().fg(TEXT_DIM)),
        ]);
        let columns = Layout::horizontal([
            Constraint::Length(title.width() as u16 + 3),
            Constraint::Min(10),
        ])
        .split(inner);
        frame.render_widget(Paragraph::new(title), columns[0]);

        let props = SearchBarProps {
            query: &state.search.query,
            is_focused: state.search.active,
        };
        self.search.render(frame, columns[1], props);
    }

    fn render_footer(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let hints = if state.search.active {
            vec![
                StatusBarHint::new("Enter", "keep"),
                StatusBarHint::new("Esc", "clear"),
                StatusBarHint::new("Bksp", "delete"),
            ]
        } else if state.overlay_open() {
            vec![StatusBarHint::new("Esc", "close")]
        } else {
            vec![
                StatusBarHint::new("←↓↑→", "move"),
                StatusBarHint::new("Enter", "details"),
                StatusBarHint::new("/", "search"),
                StatusBarHint::new("q", "quit"),
            ]
        };

        let totals = format!(
            "{} shown  {} loading  {} failed",
            state.filtered.len(),
            state.loading_count(),
            state.failed_count()
        );
        let totals_items = [StatusBarItem::span(Span::styled(
            totals,
            Style::default().fg(ACCENT),
        ))];

        let style = StatusBarStyle {
            base: BaseStyle {
                border: Some(BorderStyle {
                    borders: Borders::ALL,
                    style: Style::default().fg(TEXT_DIM),
                    focused_style: None,
                }),
                padding: Padding::xy(1, 0),
                bg: None,
                fg: None,
            },
            text: Style::default().fg(TEXT_DIM),
            hint_key: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            hint_label: Style::default().fg(TEXT_DIM),
            separator: Style::default().fg(TEXT_DIM),
        };
        let props = StatusBarProps {
            left: StatusBarSection::hints(&hints).with_separator("  "),
            center: StatusBarSection::empty(),
            right: StatusBarSection::items(&totals_items),
            style,
            is_focused: false,
        };
        Component::<Action>::render(&mut self.status_bar, frame, area, props);
    }
}

fn render_error_panel(frame: &mut Frame, area: Rect, error: &str) {
    let [panel] = Layout::vertical([Constraint::Length(7)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::horizontal([Constraint::Max(60)])
        .flex(Flex::Center)
        .areas(panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");
    let text = vec![
        Line::from(Span::styled(
            "\u{26a0} Failed to load the Pokédex",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(error.to_string()),
        Line::from(Span::styled("Press q to quit", Style::default().fg(TEXT_DIM))),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        panel,
    );
}

fn render_centered(frame: &mut Frame, area: Rect, line: Line<'static>) {
    let [row] = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Summary;
    use tui_dispatch::testing::*;
    use tui_dispatch::DataResource;

    fn render(state: &AppState) -> String {
        let mut render = RenderHarness::new(80, 24);
        let mut view = CatalogView::new();
        render.render_to_string_plain(|frame| {
            let props = CatalogViewProps {
                state,
                is_focused: true,
            };
            view.render(frame, frame.area(), props);
        })
    }

    #[test]
    fn test_render_loading_panel() {
        let state = AppState {
            catalog: DataResource::Loading,
            ..Default::default()
        };
        let output = render(&state);
        assert!(output.contains("Loading Pokédex..."));
        assert!(output.contains("POKÉDEX"));
    }

    #[test]
    fn test_render_no_results() {
        let mut state = AppState {
            catalog: DataResource::Loaded(vec![Summary::new(
                "bulbasaur",
                "https://pokeapi.co/api/v2/pokemon/1/",
            )]),
            ..Default::default()
        };
        state.search.query = "zzz".into();
        state.rebuild_filtered();

        let output = render(&state);
        assert!(output.contains("No Pokémon match \"zzz\""));
        assert!(output.contains("0 of 1"));
    }

    #[test]
    fn test_search_active_routes_keys_to_search_bar() {
        let mut state = AppState::default();
        state.search.active = true;
        let mut view = CatalogView::new();
        let actions: Vec<_> = view
            .handle_event(
                &EventKind::Key(key("q")),
                CatalogViewProps {
                    state: &state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::SearchInput('q'));

        state.search.active = false;
        let actions: Vec<_> = view
            .handle_event(
                &EventKind::Key(key("q")),
                CatalogViewProps {
                    state: &state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::Quit);
    }
}
