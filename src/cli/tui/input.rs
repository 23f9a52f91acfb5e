//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{Action, InputMode};

/// Convert a crossterm key event to an Action.
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match mode {
        InputMode::Browse => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Tab => Some(Action::NextProject),
            KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
            KeyCode::Char('f') => Some(Action::ChooseFile),
            KeyCode::Char('u') => Some(Action::Upload),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
            KeyCode::Char('o') | KeyCode::Enter => Some(Action::Open),
            _ => None,
        },
        InputMode::Text => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Accept),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        InputMode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Confirm),
            _ => Some(Action::Deny),
        },
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, mode: InputMode) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, mode),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn browse_keys() {
        let m = InputMode::Browse;
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), m), Some(Action::Quit));
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), m), Some(Action::Down));
        assert_eq!(handle_key_event(key(KeyCode::Tab), m), Some(Action::NextProject));
        assert_eq!(handle_key_event(key(KeyCode::Char('d')), m), Some(Action::Delete));
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), m), None);
    }

    #[test]
    fn text_mode_captures_letters() {
        let m = InputMode::Text;
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), m), Some(Action::Input('q')));
        assert_eq!(handle_key_event(key(KeyCode::Enter), m), Some(Action::Accept));
        assert_eq!(handle_key_event(key(KeyCode::Esc), m), Some(Action::Cancel));
    }

    #[test]
    fn only_y_confirms() {
        let m = InputMode::Confirm;
        assert_eq!(handle_key_event(key(KeyCode::Char('y')), m), Some(Action::Confirm));
        assert_eq!(handle_key_event(key(KeyCode::Char('n')), m), Some(Action::Deny));
        assert_eq!(handle_key_event(key(KeyCode::Enter), m), Some(Action::Deny));
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for m in [InputMode::Browse, InputMode::Text, InputMode::Confirm] {
            assert_eq!(handle_key_event(ctrl_c, m), Some(Action::Quit));
        }
    }
}
