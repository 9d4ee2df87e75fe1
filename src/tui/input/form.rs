use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Category;
use crate::tui::app::{App, FormField};
use crate::util::unicode::{pop_grapheme, pop_word};

use super::{is_ctrl, typed_char};

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_form();
            return;
        }
        KeyCode::Enter => {
            app.submit_form();
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.form.focus = app.form.focus.next();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.focus = app.form.focus.prev();
            return;
        }
        _ => {}
    }

    let form = &mut app.form;
    match form.focus {
        FormField::Category => match key.code {
            KeyCode::Left | KeyCode::Char('h') => form.cycle_category(-1),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => form.cycle_category(1),
            KeyCode::Backspace => form.category = None,
            KeyCode::Char(c) => {
                // Jump by first letter: w p s o; `e` for health since `h` steps back
                let pick = match c.to_ascii_lowercase() {
                    'w' => Some(Category::Work),
                    'p' => Some(Category::Personal),
                    's' => Some(Category::Shopping),
                    'e' => Some(Category::Health),
                    'o' => Some(Category::Other),
                    _ => None,
                };
                if pick.is_some() {
                    form.category = pick;
                }
            }
            _ => {}
        },
        FormField::Text | FormField::DueDate => {
            let field = if form.focus == FormField::Text {
                &mut form.text
            } else {
                &mut form.due_date
            };
            if key.code == KeyCode::Backspace {
                pop_grapheme(field);
            } else if is_ctrl(&key, 'w') {
                pop_word(field);
            } else if is_ctrl(&key, 'u') {
                field.clear();
            } else if let Some(c) = typed_char(&key) {
                let accept = match form.focus {
                    FormField::DueDate => c.is_ascii_digit() || c == '-',
                    _ => true,
                };
                if accept {
                    field.push(c);
                }
            }
        }
    }
}
