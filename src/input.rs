use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::overlay::OverlayInput;
use crate::ui::layout::{Hit, OverlayLayout};

/// What the host loop should do with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Overlay(OverlayInput),
    OpenLink,
    Quit,
    Nothing,
}

pub fn key_intent(key: KeyEvent, overlay_visible: bool) -> Intent {
    if key.kind == KeyEventKind::Release {
        return Intent::Nothing;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Intent::Quit;
    }

    if !overlay_visible {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Intent::Quit,
            _ => Intent::Nothing,
        };
    }

    match key.code {
        KeyCode::Esc => Intent::Overlay(OverlayInput::Escape),
        KeyCode::Left => Intent::Overlay(OverlayInput::PrevSlide),
        KeyCode::Right => Intent::Overlay(OverlayInput::NextSlide),
        KeyCode::Enter => Intent::OpenLink,
        KeyCode::Char('q') => Intent::Quit,
        KeyCode::Char(c @ '1'..='9') => {
            Intent::Overlay(OverlayInput::Indicator(c as usize - '1' as usize))
        }
        _ => Intent::Nothing,
    }
}

/// Left clicks only. Clicks on the card body itself do nothing.
pub fn mouse_input(mouse: MouseEvent, layout: &OverlayLayout) -> Option<OverlayInput> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    match layout.hit_test(mouse.column, mouse.row) {
        Hit::Close => Some(OverlayInput::CloseControl),
        Hit::Indicator(i) => Some(OverlayInput::Indicator(i)),
        Hit::Scrim => Some(OverlayInput::Scrim),
        Hit::Card => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn escape_closes_when_visible_and_quits_otherwise() {
        assert_eq!(key_intent(press(KeyCode::Esc), true), Intent::Overlay(OverlayInput::Escape));
        assert_eq!(key_intent(press(KeyCode::Esc), false), Intent::Quit);
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(
            key_intent(press(KeyCode::Left), true),
            Intent::Overlay(OverlayInput::PrevSlide)
        );
        assert_eq!(
            key_intent(press(KeyCode::Right), true),
            Intent::Overlay(OverlayInput::NextSlide)
        );
        assert_eq!(
            key_intent(press(KeyCode::Char('3')), true),
            Intent::Overlay(OverlayInput::Indicator(2))
        );
        assert_eq!(key_intent(press(KeyCode::Char('0')), true), Intent::Nothing);
        assert_eq!(key_intent(press(KeyCode::Left), false), Intent::Nothing);
        assert_eq!(key_intent(press(KeyCode::Enter), true), Intent::OpenLink);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_intent(key, true), Intent::Quit);
        assert_eq!(key_intent(key, false), Intent::Quit);
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Esc);
        key.kind = KeyEventKind::Release;
        assert_eq!(key_intent(key, true), Intent::Nothing);
    }

    #[test]
    fn clicks_map_through_layout() {
        let layout = OverlayLayout::new(Rect::new(0, 0, 80, 24), 3);
        assert_eq!(mouse_input(click(64, 4), &layout), Some(OverlayInput::CloseControl));
        assert_eq!(mouse_input(click(41, 17), &layout), Some(OverlayInput::Indicator(2)));
        assert_eq!(mouse_input(click(2, 2), &layout), Some(OverlayInput::Scrim));
        assert_eq!(mouse_input(click(30, 10), &layout), None);

        let mut right = click(2, 2);
        right.kind = MouseEventKind::Down(MouseButton::Right);
        assert_eq!(mouse_input(right, &layout), None);
    }
}
