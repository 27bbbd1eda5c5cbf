use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, Paragraph},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    centered_rect, BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding,
};

use super::format::{
    format_base_experience, format_height, format_id, format_name, format_stat_name,
    format_weight, spinner_frame, stat_bar_fill,
};
use super::Component;
use crate::action::Action;
use crate::sprite::{Sprite, SpriteView};
use crate::state::{Detail, Selection, SpriteSlot};

const PANEL_BG: Color = Color::Rgb(24, 28, 38);
const ACCENT: Color = Color::Rgb(228, 176, 88);
const TEXT_DIM: Color = Color::Rgb(150, 160, 175);
const BAR_WIDTH: u16 = 16;

pub struct DetailOverlayProps<'a> {
    pub selection: &'a Selection,
    /// Full terminal area; locates the panel for backdrop clicks.
    pub area: Rect,
    pub tick: u64,
    pub is_focused: bool,
}

/// Modal panel with the full record of the selected card
pub struct DetailOverlay {
    modal: Modal,
}

impl Default for DetailOverlay {
    fn default() -> Self {
        Self {
            modal: Modal::new(),
        }
    }
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Area of the content panel inside the full terminal area.
pub fn overlay_area(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(76);
    let height = area.height.saturating_sub(2).min(24);
    centered_rect(width, height, area)
}

fn overlay_close() -> Action {
    Action::OverlayClose
}

fn overlay_style() -> ModalStyle {
    ModalStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT)),
            }),
            padding: Padding::xy(2, 1),
            bg: Some(PANEL_BG),
            fg: None,
        },
        ..Default::default()
    }
}

fn overlay_behavior() -> ModalBehavior {
    ModalBehavior {
        close_on_esc: true,
        close_on_backdrop: true,
    }
}

impl Component<Action> for DetailOverlay {
    type Props<'a> = DetailOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        if let EventKind::Key(key) = event {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('x') | KeyCode::Enter | KeyCode::Backspace
            ) {
                return vec![Action::OverlayClose];
            }
        }

        // Backdrop clicks go through the modal.
        let mut noop_render = |_frame: &mut Frame, _area: Rect| {};
        let modal_props = ModalProps {
            is_open: true,
            is_focused: true,
            area: overlay_area(props.area),
            style: overlay_style(),
            behavior: overlay_behavior(),
            on_close: overlay_close,
            render_content: &mut noop_render,
        };
        self.modal
            .handle_event(event, modal_props)
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 24 || area.height < 10 {
            return;
        }
        let selection = props.selection;
        let tick = props.tick;
        let mut draw = |frame: &mut Frame, inner: Rect| {
            render_content(frame, inner, selection, tick);
        };
        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: overlay_area(area),
                style: overlay_style(),
                behavior: overlay_behavior(),
                on_close: overlay_close,
                render_content: &mut draw,
            },
        );
    }
}

fn render_content(frame: &mut Frame, area: Rect, selection: &Selection, tick: u64) {
    let detail = &selection.detail;
    let rows = Layout::vertical([
        Constraint::Length(2), // Title + types
        Constraint::Min(4),    // Body
        Constraint::Length(1), // Hints
    ])
    .split(area);

    frame.render_widget(Paragraph::new(title_lines(detail)), rows[0]);

    let columns = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .spacing(2)
        .split(rows[1]);
    render_images(frame, columns[0], selection, tick);
    frame.render_widget(Paragraph::new(info_lines(detail)), columns[1]);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Esc / x / Enter: close",
        Style::default().fg(TEXT_DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, rows[2]);
}

fn title_lines(detail: &Detail) -> Vec<Line<'static>> {
    let title = Line::from(vec![
        Span::styled(
            format_name(&detail.name),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format_id(detail.id), Style::default().fg(TEXT_DIM)),
    ]);
    let mut types = Vec::new();
    for (idx, type_name) in detail.types.iter().enumerate() {
        if idx > 0 {
            types.push(Span::raw(" "));
        }
        types.push(Span::styled(
            format!("[{}]", format_name(type_name)),
            Style::default().fg(Color::Cyan),
        ));
    }
    vec![title, Line::from(types)]
}

fn info_lines(detail: &Detail) -> Vec<Line<'static>> {
    let label = Style::default().fg(TEXT_DIM);
    let heading = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Height    ", label),
            Span::raw(format_height(detail.height)),
        ]),
        Line::from(vec![
            Span::styled("Weight    ", label),
            Span::raw(format_weight(detail.weight)),
        ]),
        Line::from(vec![
            Span::styled("Base exp  ", label),
            Span::raw(format_base_experience(detail.base_experience)),
        ]),
        Line::default(),
        Line::from(Span::styled("Stats", heading)),
    ];
    for stat in &detail.stats {
        let filled = stat_bar_fill(stat.base_stat, BAR_WIDTH);
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", format_stat_name(&stat.name)), label),
            Span::raw(format!("{:>3} ", stat.base_stat)),
            Span::styled("█".repeat(filled as usize), Style::default().fg(Color::Green)),
            Span::styled(
                "░".repeat((BAR_WIDTH - filled) as usize),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Abilities", heading)));
    for ability in &detail.abilities {
        let mut spans = vec![Span::raw(format_name(&ability.name))];
        if ability.is_hidden {
            spans.push(Span::styled(" (hidden)", label));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_images(frame: &mut Frame, area: Rect, selection: &Selection, tick: u64) {
    let rows = Layout::vertical([
        Constraint::Min(4),    // Artwork
        Constraint::Length(1), // Variant labels
        Constraint::Length(6), // Normal + shiny
    ])
    .split(area);
    render_sprite(frame, rows[0], selection.sprite(SpriteSlot::Artwork), tick);

    let variants = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[2]);
    let labels = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[1]);
    let label_style = Style::default().fg(TEXT_DIM);
    for (slot, label, label_area, sprite_area) in [
        (SpriteSlot::Normal, "Normal", labels[0], variants[0]),
        (SpriteSlot::Shiny, "Shiny", labels[1], variants[1]),
    ] {
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)).alignment(Alignment::Center),
            label_area,
        );
        render_sprite(frame, sprite_area, selection.sprite(slot), tick);
    }
}

fn render_sprite(frame: &mut Frame, area: Rect, sprite: &DataResource<Sprite>, tick: u64) {
    let placeholder = match sprite {
        DataResource::Loaded(sprite) => {
            frame.render_widget(SpriteView::new(sprite), area);
            return;
        }
        DataResource::Loading => format!("{} loading", spinner_frame(tick)),
        DataResource::Failed(_) => "unavailable".to_string(),
        DataResource::Empty => "no image".to_string(),
    };
    let vertical = Layout::vertical([Constraint::Length(1)])
        .flex(ratatui::layout::Flex::Center)
        .split(area);
    frame.render_widget(
        Paragraph::new(Span::styled(placeholder, Style::default().fg(TEXT_DIM)))
            .alignment(Alignment::Center),
        vertical[0],
    );
}
