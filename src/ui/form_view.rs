use crate::app::{App, FieldMode, FormField};
use crate::form::Phase;
use crate::model::LOADING_VALUE;
use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const LABEL_WIDTH: usize = 18;

pub struct FormView<'a, S> {
    pub app: &'a App<S>,
}

impl<'a, S: crate::store::KeyValueStore> Widget for FormView<'a, S> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg_style = Style::default().bg(theme::APP_BG);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                buf[(x, y)].set_style(bg_style);
            }
        }

        let outer = Block::default()
            .title(" rdm-connect ")
            .title_style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACTIVE_BORDER));
        let inner = outer.inner(area);
        outer.render(area, buf);

        if inner.height < 4 || inner.width < 20 {
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // fields
                Constraint::Length(1), // status
                Constraint::Length(1), // footer
            ])
            .split(inner);

        render_fields(buf, layout[0], self.app);
        render_status(buf, layout[1], self.app);
        render_footer(buf, layout[2], self.app);
    }
}

fn render_fields<S: crate::store::KeyValueStore>(buf: &mut Buf, area: Rect, app: &App<S>) {
    let max_w = area.width.saturating_sub(LABEL_WIDTH as u16 + 4) as usize;

    for (i, field) in FormField::ALL.iter().enumerate() {
        let y = area.y + (i as u16) * 2;
        if y >= area.bottom() {
            break;
        }

        let is_selected = i == app.cursor;
        let bg = if is_selected { theme::SELECTED_BG } else { theme::APP_BG };

        let label = Span::styled(
            format!("{:<width$}", field.label(), width = LABEL_WIDTH),
            Style::default().fg(theme::DIM_TEXT).bg(bg),
        );

        let value = match (&app.field_mode, is_selected) {
            (FieldMode::Editing(text), true) => Span::styled(
                format!("{}\u{258c}", shown_value(*field, text)),
                Style::default().fg(theme::FILTER_COLOR).bg(bg),
            ),
            _ => value_span(app, *field, bg, max_w),
        };

        let line = Line::from(vec![label, value]);
        if is_selected {
            for cx in area.x..area.right() {
                buf[(cx, y)].set_style(Style::default().bg(bg));
            }
        }
        buf.set_line(area.x + 2, y, &line, area.width.saturating_sub(4));
    }
}

fn shown_value(field: FormField, text: &str) -> String {
    if field.is_secret() {
        super::mask_secret(text)
    } else {
        text.to_string()
    }
}

fn value_span<S: crate::store::KeyValueStore>(
    app: &App<S>,
    field: FormField,
    bg: ratatui::style::Color,
    max_w: usize,
) -> Span<'static> {
    let dropdown = matches!(field, FormField::RepoType | FormField::Branch);
    let placeholder = app
        .form
        .repo_type
        .map(|t| app.form.placeholder_for(t).to_string());

    match app.field_value(field) {
        Some(v) if !v.is_empty() && v != LOADING_VALUE => {
            let dim = placeholder.as_deref() == Some(v.as_str());
            let mut text = super::truncate_with_ellipsis(&shown_value(field, &v), max_w);
            if dropdown {
                text.push_str(" \u{25be}");
            }
            let fg = if dim { theme::DIM_TEXT } else { theme::ACCENT };
            Span::styled(text, Style::default().fg(fg).bg(bg))
        }
        _ => {
            let hint = if dropdown { "(select) \u{25be}" } else { "(empty)" };
            Span::styled(hint, Style::default().fg(theme::DIM_TEXT).bg(bg))
        }
    }
}

fn render_status<S: crate::store::KeyValueStore>(buf: &mut Buf, area: Rect, app: &App<S>) {
    let mut spans = Vec::new();
    if app.form.creating_new_dataset() {
        spans.push(Span::styled(
            " creating dataset\u{2026} ",
            Style::default().fg(theme::WARN_FG).bg(theme::STATUS_BG),
        ));
    }
    if app.form.branch_lookup_pending() {
        spans.push(Span::styled(
            " loading branches\u{2026} ",
            Style::default().fg(theme::WARN_FG).bg(theme::STATUS_BG),
        ));
    }
    if app.form.doi_lookup_pending() {
        spans.push(Span::styled(
            " loading DOIs\u{2026} ",
            Style::default().fg(theme::WARN_FG).bg(theme::STATUS_BG),
        ));
    }
    if app.form.phase() == Phase::Navigating {
        spans.push(Span::styled(
            " connected ",
            Style::default().fg(theme::OK_FG).bg(theme::STATUS_BG),
        ));
    }
    for x in area.x..area.right() {
        buf[(x, area.y)].set_style(Style::default().bg(theme::STATUS_BG));
    }
    buf.set_line(area.x, area.y, &Line::from(spans), area.width);
}

fn render_footer<S: crate::store::KeyValueStore>(buf: &mut Buf, area: Rect, app: &App<S>) {
    let hints = match app.field_mode {
        FieldMode::Navigate => "  Enter: edit/select  o: list DOIs  n: new dataset  q: quit",
        FieldMode::Editing(_) => "  Enter: confirm  Esc: cancel",
        FieldMode::Picking { .. } => "  j/k: move  Enter: choose  Esc: close",
    };
    let line = Line::from(vec![
        Span::styled(
            " c: connect",
            Style::default()
                .fg(theme::ACCENT)
                .bg(theme::APP_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(hints, Style::default().fg(theme::DIM_TEXT).bg(theme::APP_BG)),
    ]);
    buf.set_line(area.x, area.y, &line, area.width);
}
