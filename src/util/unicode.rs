use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to at most `max_cells` terminal cells, ending in `…` when cut.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = UnicodeWidthStr::width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Remove the last grapheme cluster (what a user sees as one character).
pub fn pop_grapheme(s: &mut String) {
    if let Some((idx, _)) = s.grapheme_indices(true).next_back() {
        s.truncate(idx);
    }
}

/// Remove the last word plus any whitespace after it (Ctrl+W / Alt+Backspace).
pub fn pop_word(s: &mut String) {
    let trimmed = s.trim_end().len();
    s.truncate(trimmed);
    match s.unicode_word_indices().next_back() {
        Some((idx, _)) => s.truncate(idx),
        None => s.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_mixed_text() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_fits_untouched() {
        assert_eq!(truncate_to_width("Buy milk", 8), "Buy milk");
        assert_eq!(truncate_to_width("Buy milk", 20), "Buy milk");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Buy milk", 5), "Buy \u{2026}");
        assert_eq!(truncate_to_width("Buy milk", 1), "\u{2026}");
        assert_eq!(truncate_to_width("Buy milk", 0), "");
    }

    #[test]
    fn truncate_does_not_split_wide_chars() {
        // Budget of 4 cells fits one 2-cell char plus the ellipsis
        assert_eq!(truncate_to_width("日本語", 4), "日\u{2026}");
    }

    #[test]
    fn pop_grapheme_handles_combining_marks() {
        let mut s = String::from("cafe\u{0301}");
        pop_grapheme(&mut s);
        assert_eq!(s, "caf");
        let mut empty = String::new();
        pop_grapheme(&mut empty);
        assert_eq!(empty, "");
    }

    #[test]
    fn pop_word_removes_trailing_word() {
        let mut s = String::from("buy oat milk  ");
        pop_word(&mut s);
        assert_eq!(s, "buy oat ");
        pop_word(&mut s);
        assert_eq!(s, "buy ");
        pop_word(&mut s);
        assert_eq!(s, "");
    }
}
