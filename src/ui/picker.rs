use crate::model::OptionItem;
use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// Dropdown list opened over the form.
pub struct Picker<'a> {
    pub title: &'a str,
    pub items: &'a [OptionItem],
    pub cursor: usize,
    pub loading: bool,
}

impl<'a> Widget for Picker<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let popup = super::centered_rect(60, 60, area);
        Clear.render(popup, buf);

        let title = if self.loading {
            format!(" {} (fetching\u{2026}) ", self.title)
        } else {
            format!(" {} ", self.title)
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACTIVE_BORDER));
        let inner = block.inner(popup);
        block.render(popup, buf);

        if inner.height == 0 || inner.width < 4 {
            return;
        }

        if self.items.is_empty() {
            let line = Line::from(Span::styled(
                "No options found",
                Style::default().fg(theme::DIM_TEXT),
            ));
            buf.set_line(inner.x + 1, inner.y, &line, inner.width - 1);
            return;
        }

        let visible = inner.height as usize;
        let scroll = self.cursor.saturating_sub(visible.saturating_sub(1));
        let max_w = inner.width.saturating_sub(2) as usize;

        for (row, (i, item)) in self.items.iter().enumerate().skip(scroll).take(visible).enumerate() {
            let y = inner.y + row as u16;
            let selected = i == self.cursor;
            let style = if item.is_loading() {
                Style::default().fg(theme::DIM_TEXT)
            } else if selected {
                Style::default()
                    .fg(theme::FILTER_COLOR)
                    .bg(theme::SELECTED_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if selected {
                for x in inner.x..inner.right() {
                    buf[(x, y)].set_style(Style::default().bg(theme::SELECTED_BG));
                }
            }
            let label = super::truncate_with_ellipsis(&item.label, max_w);
            buf.set_line(inner.x + 1, y, &Line::from(Span::styled(label, style)), inner.width - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_text(items: &[OptionItem], cursor: usize) -> String {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buf::empty(area);
        Picker {
            title: "Branch",
            items,
            cursor,
            loading: false,
        }
        .render(area, &mut buf);
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn lists_labels() {
        let items = vec![OptionItem::new("main", "main"), OptionItem::new("develop", "develop")];
        let text = screen_text(&items, 1);
        assert!(text.contains("main"));
        assert!(text.contains("develop"));
    }

    #[test]
    fn empty_list_says_so() {
        assert!(screen_text(&[], 0).contains("No options found"));
    }
}
