use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::filter::StatusFilter;
use crate::tui::app::{App, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.dismiss_toast(),

        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.move_cursor(isize::MAX / 2),

        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('X') => app.clear_completed(),
        KeyCode::Char('a') => app.open_form(),
        KeyCode::Char('/') => app.mode = Mode::Search,

        KeyCode::Tab => set_status(app, app.query.status.next()),
        KeyCode::Char('1') => set_status(app, StatusFilter::All),
        KeyCode::Char('2') => set_status(app, StatusFilter::Active),
        KeyCode::Char('3') => set_status(app, StatusFilter::Completed),

        KeyCode::Char('c') => {
            app.query.category = app.query.category.next();
            app.clamp_cursor();
        }
        KeyCode::Char('C') => {
            app.query.category = app.query.category.prev();
            app.clamp_cursor();
        }
        _ => {}
    }
}

fn set_status(app: &mut App, status: StatusFilter) {
    app.query.status = status;
    app.clamp_cursor();
}
