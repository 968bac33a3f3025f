pub mod layout;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};

use crate::deck::PageContent;
use crate::overlay::Overlay;
use crate::util::{seconds_left, truncate_to_width};
use layout::{OverlayLayout, CLOSE_LABEL};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const ACTIVE_DOT: &str = "●";
const IDLE_DOT: &str = "○";

/// The host page the overlay is drawn over.
pub struct PageView<'a> {
    pub page: &'a PageContent,
    pub footer: Option<String>,
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let inner = Rect::new(
            area.x + HORIZONTAL_MARGIN.min(area.width / 2),
            area.y + VERTICAL_MARGIN.min(area.height / 2),
            area.width.saturating_sub(HORIZONTAL_MARGIN * 2),
            area.height.saturating_sub(VERTICAL_MARGIN * 2),
        );

        let mut lines = vec![
            Line::from(Span::styled(self.page.title.clone(), bold_style.fg(Color::Cyan))),
            Line::from(""),
        ];
        lines.extend(self.page.body.iter().map(|l| Line::from(l.as_str())));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if let Some(footer) = self.footer {
            if area.height > 0 {
                let row = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
                Paragraph::new(Span::styled(footer, dim_style))
                    .alignment(Alignment::Center)
                    .render(row, buf);
            }
        }
    }
}

impl Widget for &Overlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible() {
            return;
        }
        let Some(slide) = self.current_slide() else {
            return;
        };

        let count = self.slides().len();
        let index = self.current_slide_index();
        let layout = OverlayLayout::new(area, count);

        // scrim
        buf.set_style(area, Style::default().add_modifier(Modifier::DIM));

        Clear.render(layout.card, buf);
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {}/{} ", index + 1, count))
            .render(layout.card, buf);

        buf.set_string(
            layout.close.x,
            layout.close.y,
            CLOSE_LABEL,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        );

        let width = layout.slide.width as usize;
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                slide.alt_text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(caption) = &slide.caption {
            lines.push(Line::from(Span::styled(
                caption.clone(),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            truncate_to_width(&slide.source_ref, width),
            Style::default().add_modifier(Modifier::DIM),
        )));
        if let Some(href) = &slide.href {
            lines.push(Line::from(Span::styled(
                truncate_to_width(&format!("⏎ {href}"), width),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout.slide, buf);

        for (i, dot) in layout.indicators.iter().enumerate() {
            let (symbol, style) = if i == index {
                (ACTIVE_DOT, Style::default().fg(Color::Yellow))
            } else {
                (IDLE_DOT, Style::default().add_modifier(Modifier::DIM))
            };
            buf.set_string(dot.x, dot.y, symbol, style);
        }

        let fraction = self.progress_fraction().clamp(0.0, 1.0);
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
            .ratio(fraction)
            .label(format!("{}s", seconds_left(fraction, self.total_secs())))
            .render(layout.progress, buf);
    }
}
