use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};
use crate::util::unicode::{pop_grapheme, pop_word};

use super::{is_ctrl, typed_char};

/// Search line input. The filter applies on every keystroke.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.query.search.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Backspace => pop_grapheme(&mut app.query.search),
        _ if is_ctrl(&key, 'w') => pop_word(&mut app.query.search),
        _ if is_ctrl(&key, 'u') => app.query.search.clear(),
        _ => {
            if let Some(c) = typed_char(&key) {
                app.query.search.push(c);
            }
        }
    }
    app.cursor = 0;
    app.scroll_offset = 0;
    app.clamp_cursor();
}
