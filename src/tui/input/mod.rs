mod form;
mod navigate;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use form::handle_form;
use navigate::handle_navigate;
use search::handle_search;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);

    // Global bindings, active in every mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('d') => {
                app.toggle_theme();
                return;
            }
            _ => {}
        }
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Search => handle_search(app, key),
        Mode::Form => handle_form(app, key),
    }
}

/// Terminals disagree on whether Shift+x arrives as `X` or `x` with SHIFT;
/// fold both into the uppercase char.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

/// A key that types `c` into a text field (no Ctrl/Alt held)
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ThemeName};
    use crate::ops::filter::{CategoryFilter, StatusFilter};
    use crate::tui::app::{FormField, REJECTED_MESSAGE};
    use crate::tui::render::test_helpers::{app_with_tasks, sample_tasks};
    use pretty_assertions::assert_eq;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn shift_letters_normalize_to_uppercase() {
        let key = normalize_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('X'));
    }

    #[test]
    fn navigate_moves_and_toggles() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, 2);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.cursor, 1);

        let id = app.selected_id().unwrap();
        let before = app.store.get(id).unwrap().completed;
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.store.get(id).unwrap().completed, !before);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.get(id).unwrap().completed, before);
    }

    #[test]
    fn status_filter_keys() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.query.status, StatusFilter::Active);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.query.status, StatusFilter::Completed);
        assert_eq!(app.visible().tasks.len(), 1);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.query.status, StatusFilter::All);
    }

    #[test]
    fn category_filter_keys() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.query.category, CategoryFilter::Only(Category::Work));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::SHIFT),
        );
        assert_eq!(app.query.category, CategoryFilter::All);
        press(&mut app, KeyCode::Char('C'));
        assert_eq!(app.query.category, CategoryFilter::Only(Category::Other));
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Search);
        type_str(&mut app, "MILK");
        assert_eq!(app.query.search, "MILK");
        assert_eq!(app.visible().tasks.len(), 1);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.query.search, "MIL");

        // q is text while searching
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.query.search, "");
    }

    #[test]
    fn search_enter_keeps_term() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.query.search, "milk");
    }

    #[test]
    fn add_form_flow() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, Mode::Form);
        type_str(&mut app, "Call mom");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.form.focus, FormField::Category);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.form.category, Some(Category::Personal));
        press(&mut app, KeyCode::Tab);
        // Letters are ignored in the date field
        type_str(&mut app, "x2025-03-04");
        assert_eq!(app.form.due_date, "2025-03-04");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.tasks()[0].category, Category::Personal);
    }

    #[test]
    fn add_form_rejects_and_stays_open() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "ab");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.toast.as_ref().unwrap().message, REJECTED_MESSAGE);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.store.is_empty());
    }

    #[test]
    fn form_text_editing() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "buy oat milk");
        ctrl(&mut app, 'w');
        assert_eq!(app.form.text, "buy oat ");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.form.text, "buy oat");
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.form.focus, FormField::DueDate);
    }

    #[test]
    fn ctrl_d_toggles_theme_in_any_mode() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        press(&mut app, KeyCode::Char('a'));
        ctrl(&mut app, 'd');
        assert_eq!(app.theme.name, ThemeName::Dark);
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.form.text, "");
    }

    #[test]
    fn clear_completed_and_quit() {
        let (mut app, _tmp) = app_with_tasks(sample_tasks());
        press(&mut app, KeyCode::Char('X'));
        assert_eq!(app.store.len(), 2);
        press(&mut app, KeyCode::Esc);
        assert!(app.toast.is_none());
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.store.len(), 1);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
