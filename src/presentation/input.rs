use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Notice => Self::handle_notice_mode(app, key),
        }
    }

    /// Mouse input only drives the signature surface.
    pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
        if !matches!(app.mode, AppMode::Normal) {
            return;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => app.pointer_down(event.column, event.row),
            MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(event.column, event.row),
            MouseEventKind::Up(MouseButton::Left) => app.pointer_up(),
            _ => {}
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => {
                    app.next();
                    return;
                }
                KeyCode::Char('p') => {
                    app.previous();
                    return;
                }
                KeyCode::Char('s') => {
                    app.submit();
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => app.focus_previous(),
            KeyCode::Enter => app.activate(),
            KeyCode::Char(' ') => app.toggle_focused(),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.finish_editing();
            }
            KeyCode::Esc => {
                app.cancel_editing();
            }
            KeyCode::Backspace => {
                if let Some(c) = app.input[..app.cursor_position].chars().next_back() {
                    app.cursor_position -= c.len_utf8();
                    app.input.remove(app.cursor_position);
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.input.len() {
                    app.input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                if let Some(c) = app.input[..app.cursor_position].chars().next_back() {
                    app.cursor_position -= c.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(c) = app.input[app.cursor_position..].chars().next() {
                    app.cursor_position += c.len_utf8();
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.input.len();
            }
            KeyCode::Char(c) => {
                app.input.insert(app.cursor_position, c);
                app.cursor_position += c.len_utf8();
            }
            _ => {}
        }
    }

    fn handle_notice_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notice();
        }
    }
}
