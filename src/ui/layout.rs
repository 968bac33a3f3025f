use ratatui::layout::Rect;

/// Share of the screen the slide card takes, in tenths.
const CARD_TENTHS: u16 = 7;
const MIN_CARD_WIDTH: u16 = 24;
const MIN_CARD_HEIGHT: u16 = 8;
pub const CLOSE_LABEL: &str = "[x]";

/// Where every interactive part of the overlay sits for a given screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    pub card: Rect,
    pub close: Rect,
    pub slide: Rect,
    pub indicators: Vec<Rect>,
    pub progress: Rect,
}

/// What a click at a screen cell lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Close,
    Indicator(usize),
    Card,
    Scrim,
}

impl OverlayLayout {
    pub fn new(screen: Rect, slide_count: usize) -> Self {
        let width = scaled(screen.width).max(MIN_CARD_WIDTH).min(screen.width);
        let height = scaled(screen.height).max(MIN_CARD_HEIGHT).min(screen.height);
        let card = Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        );

        let close_width = CLOSE_LABEL.len() as u16;
        let close = Rect::new(
            (card.x + card.width).saturating_sub(close_width + 2).max(card.x),
            card.y,
            close_width.min(card.width),
            card.height.min(1),
        );

        let inner = Rect::new(
            card.x + 1,
            card.y + 1,
            card.width.saturating_sub(2),
            card.height.saturating_sub(2),
        );
        let bottom = inner.y + inner.height;
        let progress = Rect::new(
            inner.x,
            bottom.saturating_sub(1).max(inner.y),
            inner.width,
            inner.height.min(1),
        );
        let indicator_row = bottom.saturating_sub(2).max(inner.y);
        let slide = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(2));

        Self {
            card,
            close,
            slide,
            indicators: indicator_cells(inner.x, inner.width, indicator_row, slide_count),
            progress,
        }
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Hit {
        if contains(self.close, column, row) {
            return Hit::Close;
        }
        if let Some(i) = self.indicators.iter().position(|r| contains(*r, column, row)) {
            return Hit::Indicator(i);
        }
        if contains(self.card, column, row) {
            Hit::Card
        } else {
            Hit::Scrim
        }
    }
}

fn scaled(v: u16) -> u16 {
    (v as u32 * CARD_TENTHS as u32 / 10) as u16
}

/// One cell per dot with a one-cell gap, centered; dots that do not fit are
/// dropped.
fn indicator_cells(x: u16, width: u16, row: u16, count: usize) -> Vec<Rect> {
    if count < 2 || width == 0 {
        return vec![];
    }
    let fits = ((width as usize + 1) / 2).min(count);
    let span = (fits * 2 - 1) as u16;
    let start = x + (width - span) / 2;
    (0..fits as u16)
        .map(|i| Rect::new(start + i * 2, row, 1, 1))
        .collect()
}

fn contains(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_is_centered() {
        let l = OverlayLayout::new(Rect::new(0, 0, 80, 24), 3);
        assert_eq!(l.card, Rect::new(12, 4, 56, 16));
        assert_eq!(l.close, Rect::new(63, 4, 3, 1));
        assert_eq!(l.progress, Rect::new(13, 18, 54, 1));
        assert_eq!(l.slide, Rect::new(13, 5, 54, 12));
        assert_eq!(
            l.indicators,
            vec![Rect::new(37, 17, 1, 1), Rect::new(39, 17, 1, 1), Rect::new(41, 17, 1, 1)]
        );
    }

    #[test]
    fn hit_testing() {
        let l = OverlayLayout::new(Rect::new(0, 0, 80, 24), 3);
        assert_eq!(l.hit_test(64, 4), Hit::Close);
        assert_eq!(l.hit_test(39, 17), Hit::Indicator(1));
        assert_eq!(l.hit_test(38, 17), Hit::Card);
        assert_eq!(l.hit_test(20, 10), Hit::Card);
        assert_eq!(l.hit_test(0, 0), Hit::Scrim);
        assert_eq!(l.hit_test(79, 23), Hit::Scrim);
        assert_eq!(l.hit_test(12, 4), Hit::Card);
        assert_eq!(l.hit_test(11, 4), Hit::Scrim);
    }

    #[test]
    fn single_slide_has_no_indicators() {
        let l = OverlayLayout::new(Rect::new(0, 0, 80, 24), 1);
        assert!(l.indicators.is_empty());
    }

    #[test]
    fn tiny_screen_fills_it() {
        let l = OverlayLayout::new(Rect::new(0, 0, 10, 4), 2);
        assert_eq!(l.card, Rect::new(0, 0, 10, 4));
        assert!(l.indicators.len() <= 2);
        assert_eq!(l.hit_test(1, 1), Hit::Card);
    }

    #[test]
    fn too_many_dots_are_truncated() {
        let l = OverlayLayout::new(Rect::new(0, 0, 30, 20), 50);
        // card 24 wide, inner 22: 11 dots fit
        assert_eq!(l.indicators.len(), 11);
        let last = l.indicators.last().unwrap();
        assert!(last.x < l.card.x + l.card.width - 1);
    }
}
