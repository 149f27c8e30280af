use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyLevel {
    Error,
    Info,
}

impl NotifyLevel {
    pub fn ttl_secs(&self) -> u64 {
        match self {
            NotifyLevel::Error => 30,
            NotifyLevel::Info => 5,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotifyLevel::Error => theme::ERROR_FG,
            NotifyLevel::Info => theme::OK_FG,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
    pub created: std::time::Instant,
}

/// Bottom-right message box. Multi-line messages (the missing-field list)
/// grow the box upwards.
pub struct Toast<'a> {
    pub notification: &'a Notification,
}

impl<'a> Widget for Toast<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let lines: Vec<&str> = self.notification.message.lines().collect();
        let text_w = lines
            .iter()
            .map(|l| UnicodeWidthStr::width(*l))
            .max()
            .unwrap_or(0);
        let box_w = text_w.saturating_add(4).min(area.width as usize) as u16;
        let box_h = (lines.len() as u16).saturating_add(2);

        if area.width < box_w || area.height < box_h.saturating_add(1) {
            return;
        }

        let x = area.right().saturating_sub(box_w.saturating_add(1));
        let y = area.bottom().saturating_sub(box_h + 1);
        let toast_area = Rect::new(x, y, box_w, box_h);

        Clear.render(toast_area, buf);

        let color = self.notification.level.color();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(toast_area);
        block.render(toast_area, buf);

        if inner.width == 0 {
            return;
        }

        for (i, text) in lines.iter().enumerate() {
            let row = inner.y + i as u16;
            if row >= inner.bottom() {
                break;
            }
            let shown = super::truncate_with_ellipsis(text, inner.width as usize);
            let line = Line::from(Span::styled(shown, Style::default().fg(color)));
            buf.set_line(inner.x, row, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(message: &str, w: u16, h: u16) -> Buf {
        let notification = Notification {
            message: message.to_string(),
            level: NotifyLevel::Error,
            created: std::time::Instant::now(),
        };
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buf::empty(area);
        Toast {
            notification: &notification,
        }
        .render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buf, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn shows_every_line_of_a_multi_line_message() {
        let buf = render("missing:\n- Owner\n- Branch", 40, 10);
        let all: String = (0..10).map(|y| row_text(&buf, y)).collect();
        assert!(all.contains("missing:"));
        assert!(all.contains("- Owner"));
        assert!(all.contains("- Branch"));
    }

    #[test]
    fn too_small_area_renders_nothing() {
        let buf = render("hello", 40, 2);
        assert!(row_text(&buf, 0).trim().is_empty());
    }
}
