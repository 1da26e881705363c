use crate::app::{App, ModalState};
use crate::models::Selection;
use crossterm::event::{KeyCode, KeyEvent};

/// Handles keyboard events and updates application state accordingly
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if app.modal_state != ModalState::None {
        handle_modal_keys(app, key)
    } else if app.is_searching {
        handle_search_mode_keys(app, key)
    } else {
        handle_normal_mode_keys(app, key)
    }
}

/// Handles key events when a modal is open
fn handle_modal_keys(app: &mut App, key: KeyEvent) {
    match app.modal_state {
        ModalState::UpdateConfirmation => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_update(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_update(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        },
        // pip is running; nothing to do until it returns
        ModalState::Updating | ModalState::None => {}
    }
}

/// Handles key events in normal navigation mode
fn handle_normal_mode_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.previous(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Home => app.first(),
        KeyCode::End => app.go_to_last(),
        KeyCode::Tab => app.next_category(),
        KeyCode::BackTab => app.previous_category(),
        KeyCode::Char('1') => app.select_category(Selection::All),
        KeyCode::Char('2') => app.select_category(Selection::UpToDate),
        KeyCode::Char('3') => app.select_category(Selection::Outdated),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('c') => app.toggle_case_sensitive(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_selected_webpage(),
        KeyCode::Char('u') => app.update_selected_package(),
        KeyCode::Char('r') => app.refresh_packages(),
        _ => {}
    }
}

/// Handles key events in search mode
fn handle_search_mode_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.end_search(),
        KeyCode::Backspace => app.remove_search_char(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.previous(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Tab => app.next_category(),
        KeyCode::BackTab => app.previous_category(),
        KeyCode::Char(c) if !c.is_control() => app.add_search_char(c),
        _ => {}
    }
}
