use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, HandlerResponse};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::pager::PAGE_SIZES;
use crate::sprite;
use crate::sprite_backend;
use crate::state::{AppState, CardSlot, View};

const BG_BASE: Color = Color::Rgb(14, 16, 26);
const BG_PANEL: Color = Color::Rgb(24, 28, 44);
const BG_HIGHLIGHT: Color = Color::Rgb(46, 72, 118);
const TEXT_MAIN: Color = Color::Rgb(236, 238, 244);
const TEXT_DIM: Color = Color::Rgb(158, 170, 196);
const ACCENT_RED: Color = Color::Rgb(226, 106, 106);
const ACCENT_YELLOW: Color = Color::Rgb(240, 198, 100);
const CELL_ASPECT: f32 = 2.0;
const CARD_HEIGHT: u16 = 4;

pub struct TypedexUi {
    type_list: SelectList,
    status_bar: StatusBar,
}

impl TypedexUi {
    pub fn new() -> Self {
        Self {
            type_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        match state.view {
            View::Types => render_types(frame, layout[1], state, &mut self.type_list),
            View::Entries => render_entries(frame, layout[1], state),
            View::Detail => render_detail(frame, layout[1], state),
        }
        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_types_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        match event {
            EventKind::Key(key) if key.code == crossterm::event::KeyCode::Enter => {
                return handler_response(vec![Action::TypeOpen]);
            }
            EventKind::Scroll { delta, .. } => {
                return handler_response(vec![Action::SelectionMove(*delta as i16)]);
            }
            _ => {}
        }
        let items = type_items(state);
        if items.is_empty() {
            return HandlerResponse::ignored();
        }
        let props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: state.type_selected.min(items.len().saturating_sub(1)),
            is_focused: true,
            style: type_list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::TypeSelect,
            render_item: &|item| item.clone(),
        };
        let actions: Vec<_> = self.type_list.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }

    pub fn handle_entries_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Char('k') => {
                    vec![Action::SelectionMove(-1)]
                }
                crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j') => {
                    vec![Action::SelectionMove(1)]
                }
                crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                    vec![Action::PagePrev]
                }
                crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                    vec![Action::PageNext]
                }
                crossterm::event::KeyCode::Char('[') => vec![Action::PageSizePrev],
                crossterm::event::KeyCode::Char(']') => vec![Action::PageSizeNext],
                // Direct selector: 1..4 pick from the fixed size set.
                crossterm::event::KeyCode::Char(ch @ '1'..='4') => {
                    let index = ch as usize - '1' as usize;
                    vec![Action::PageSizeSet(PAGE_SIZES[index])]
                }
                crossterm::event::KeyCode::Enter => vec![Action::CardOpen],
                crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Backspace => {
                    vec![Action::GoBack]
                }
                _ => vec![],
            },
            EventKind::Scroll { delta, .. } => vec![Action::SelectionMove(*delta as i16)],
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Char('p') => vec![Action::PlayCry],
                crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Backspace => {
                    vec![Action::GoBack]
                }
                _ => vec![],
            },
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
                crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
                crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
                crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
                _ => vec![],
            },
            _ => vec![],
        };
        handler_response(actions)
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled("TYPES", title_style)];
    if state.view != View::Types {
        let type_name = state.current_type.as_deref().unwrap_or("?");
        spans.push(Span::raw(" › "));
        spans.push(Span::styled(
            type_name.to_ascii_uppercase(),
            Style::default().fg(ACCENT_YELLOW),
        ));
    }
    if state.view == View::Detail {
        let name = state.detail_request.as_deref().unwrap_or("?");
        spans.push(Span::raw(" › "));
        spans.push(Span::styled(
            format_name(name),
            Style::default().fg(TEXT_MAIN),
        ));
    }

    if state.view == View::Entries {
        spans.push(Span::raw("  |  "));
        spans.push(nav_symbol("‹", state.pager.has_prev()));
        spans.push(Span::styled(
            format!(
                " page {:02}/{:02} ",
                state.pager.page_index(),
                state.pager.total_pages()
            ),
            Style::default().fg(ACCENT_YELLOW),
        ));
        spans.push(nav_symbol("›", state.pager.has_next()));
        spans.push(Span::styled(
            format!("  {}/page", state.pager.page_size()),
            Style::default().fg(TEXT_DIM),
        ));
    }

    if let Some(search) = state.active_search() {
        let display = if search.active {
            format!("/{}_", search.query)
        } else if search.query.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", search.query)
        };
        spans.push(Span::raw("  |  Search: "));
        spans.push(Span::styled(display, Style::default().fg(ACCENT_RED)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .title("TYPEDEX");
    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn nav_symbol(symbol: &str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    Span::styled(symbol.to_string(), style)
}

pub fn render_types(frame: &mut Frame, area: Rect, state: &AppState, type_list: &mut SelectList) {
    sprite_backend::clear_overlay();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("TYPES")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = type_items(state);
    if items.is_empty() {
        let message = if state.types.is_empty() {
            ""
        } else {
            "No matching types."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.type_selected.min(items.len().saturating_sub(1)),
        is_focused: state.view == View::Types && !state.search_active(),
        style: type_list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::TypeSelect,
        render_item: &|item| item.clone(),
    };
    type_list.render(frame, inner, props);
}

pub fn render_entries(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(area);

    render_card_grid(frame, layout[0], state);
    render_preview(frame, layout[1], state);
}

fn render_card_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .current_type
        .as_deref()
        .map(|name| name.to_ascii_uppercase())
        .unwrap_or_else(|| "ENTRIES".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.pager.is_empty() {
        frame.render_widget(
            Paragraph::new("No entries.").style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let visible = state.visible_card_indices();
    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new("No matches on this page.").style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let cols = visible.len().div_ceil(rows).max(1);
    let col_rects = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
        .split(inner);

    for (position, slot_index) in visible.iter().enumerate() {
        let Some(card) = state.cards.get(*slot_index) else {
            continue;
        };
        let col = position / rows;
        let row = position % rows;
        let Some(col_rect) = col_rects.get(col) else {
            continue;
        };
        let card_rect = Rect {
            x: col_rect.x,
            y: col_rect.y.saturating_add(row as u16 * CARD_HEIGHT),
            width: col_rect.width,
            height: CARD_HEIGHT,
        };
        if card_rect.y + card_rect.height > inner.y + inner.height {
            continue;
        }
        render_card(frame, card_rect, card, position == state.card_selected);
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &CardSlot, selected: bool) {
    let border = if selected {
        Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let bg = if selected { BG_HIGHLIGHT } else { BG_PANEL };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let name_line = Line::from(Span::styled(
        format_name(&card.entry.name),
        Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
    ));
    // The body stays empty until this card's own request resolves.
    let body_line = if card.failed {
        Line::from(Span::styled("[unavailable]", Style::default().fg(TEXT_DIM)))
    } else if let Some(record) = &card.record {
        Line::from(Span::styled(
            format!("HT {:>3}  WT {:>4}", record.height, record.weight),
            Style::default().fg(TEXT_DIM),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(Text::from(vec![name_line, body_line])), inner);
}

fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("PREVIEW")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(card) = state.selected_card() else {
        sprite_backend::clear_overlay();
        frame.render_widget(
            Paragraph::new("[select an entry]")
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    };

    let label_area = Rect {
        x: inner.x,
        y: inner.y.saturating_add(inner.height.saturating_sub(1)),
        width: inner.width,
        height: inner.height.min(1),
    };
    let sprite_area = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height.saturating_sub(1),
    };
    render_sprite_panel(frame, sprite_area, state, card.record.is_some());
    frame.render_widget(
        Paragraph::new(format_name(&card.entry.name))
            .alignment(Alignment::Center)
            .style(Style::default().fg(ACCENT_YELLOW)),
        label_area,
    );
}

pub fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .detail_request
        .as_deref()
        .map(format_name)
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    render_sprite_panel(frame, layout[0], state, state.detail.is_some());
    render_detail_stats(frame, layout[1], state);
}

fn render_sprite_panel(frame: &mut Frame, area: Rect, state: &AppState, record_loaded: bool) {
    if let Some(sprite_data) = state.current_sprite() {
        let (cols, rows) = sprite_fit(sprite_data, area.width, area.height);
        if let Ok(sequence) = sprite::kitty_sequence(sprite_data, cols, rows) {
            let offset_x = area.x.saturating_add(area.width.saturating_sub(cols) / 2);
            let offset_y = area.y.saturating_add(area.height.saturating_sub(rows) / 2);
            sprite_backend::set_overlay(offset_x, offset_y, sequence);
        } else {
            sprite_backend::clear_overlay();
        }
        return;
    }

    sprite_backend::clear_overlay();
    let content = if record_loaded && state.sprite.is_none() && !state.sprite_loading {
        "[no sprite]"
    } else {
        ""
    };
    frame.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(TEXT_DIM)),
        area,
    );
}

fn render_detail_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("STATS")
        .style(Style::default().fg(TEXT_MAIN));
    let text = match &state.detail {
        Some(record) => detail_rows(record),
        None => Text::from(""),
    };
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn detail_rows(record: &crate::state::EntryRecord) -> Text<'static> {
    // HP/Attack/Defense come from the first three positions of the stats
    // array; the upstream API has always ordered them that way.
    let mut lines: Vec<Line> = [("HP", 0usize), ("Attack", 1), ("Defense", 2)]
        .iter()
        .map(|(label, index)| match record.stats.get(*index) {
            Some(value) => stat_line(label, *value),
            None => Line::from(format!("{label:<8}   ?")),
        })
        .collect();
    lines.push(plain_line("Height", record.height));
    lines.push(plain_line("Weight", record.weight));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "p  play cry",
        Style::default().fg(TEXT_DIM),
    )));
    Text::from(lines)
}

fn stat_line(label: &str, value: u16) -> Line<'static> {
    let bar_len = (value as usize / 10).clamp(1, 20);
    let bar = "#".repeat(bar_len);
    Line::from(vec![
        Span::raw(format!("{label:<8}{value:>4} ")),
        Span::styled(bar, Style::default().fg(ACCENT_RED)),
    ])
}

fn plain_line(label: &str, value: u16) -> Line<'static> {
    Line::from(format!("{label:<8}{value:>4}"))
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_default();
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status, Style::default().fg(ACCENT_YELLOW));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_RED)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_RED)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search_active() {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, vec![StatusBarHint::new("q", "Quit")]);
    }

    let left = match state.view {
        View::Types => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("/", "Search"),
        ],
        View::Entries => vec![
            StatusBarHint::new("j/k", "Select"),
            StatusBarHint::new("h/l", "Page"),
            StatusBarHint::new("[ ] 1-4", "Page size"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("/", "Search"),
            StatusBarHint::new("Esc", "Back"),
        ],
        View::Detail => vec![
            StatusBarHint::new("p", "Cry"),
            StatusBarHint::new("Esc", "Back"),
        ],
    };
    let center = vec![StatusBarHint::new("q", "Quit")];
    (left, center)
}

fn type_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .filtered_type_indices()
        .into_iter()
        .filter_map(|index| state.types.get(index))
        .map(|type_ref| Line::from(format_name(&type_ref.name)))
        .collect()
}

fn type_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn sprite_fit(sprite: &sprite::SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let image_ratio = sprite.width as f32 / sprite.height as f32;
    let max_cols_f = max_cols as f32;
    let max_rows_f = max_rows as f32;
    let cols_for_max_rows = image_ratio * max_rows_f * CELL_ASPECT;
    if cols_for_max_rows <= max_cols_f {
        let cols = cols_for_max_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows.max(1));
    }
    let rows_for_max_cols = max_cols_f / (image_ratio * CELL_ASPECT);
    let rows = rows_for_max_cols.max(1.0).round() as u16;
    (max_cols.max(1), rows.min(max_rows).max(1))
}
