use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::{Category, ThemeName, UiConfig};

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    pub highlight: Color,
    pub selection_bg: Color,
    pub success: Color,
    pub error: Color,
    /// Due dates in the past on open tasks
    pub overdue: Color,
    pub category_colors: HashMap<Category, Color>,
}

fn default_category_colors() -> HashMap<Category, Color> {
    HashMap::from([
        (Category::Work, Color::Rgb(0xA8, 0x55, 0xF7)),
        (Category::Personal, Color::Rgb(0x22, 0xC5, 0x5E)),
        (Category::Shopping, Color::Rgb(0xEA, 0xB3, 0x08)),
        (Category::Health, Color::Rgb(0xEF, 0x44, 0x44)),
        (Category::Other, Color::Rgb(0x6B, 0x72, 0x80)),
    ])
}

impl Theme {
    pub fn light() -> Self {
        Theme {
            name: ThemeName::Light,
            background: Color::Rgb(0xF8, 0xFA, 0xFC),
            text: Color::Rgb(0x37, 0x41, 0x51),
            text_bright: Color::Rgb(0x11, 0x18, 0x27),
            dim: Color::Rgb(0x9C, 0xA3, 0xAF),
            highlight: Color::Rgb(0x3B, 0x82, 0xF6),
            selection_bg: Color::Rgb(0xDB, 0xEA, 0xFE),
            success: Color::Rgb(0x22, 0xC5, 0x5E),
            error: Color::Rgb(0xEF, 0x44, 0x44),
            overdue: Color::Rgb(0xB9, 0x1C, 0x1C),
            category_colors: default_category_colors(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: ThemeName::Dark,
            background: Color::Rgb(0x11, 0x18, 0x27),
            text: Color::Rgb(0xD1, 0xD5, 0xDB),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            dim: Color::Rgb(0x6B, 0x72, 0x80),
            highlight: Color::Rgb(0x25, 0x63, 0xEB),
            selection_bg: Color::Rgb(0x37, 0x41, 0x51),
            success: Color::Rgb(0x22, 0xC5, 0x5E),
            error: Color::Rgb(0xDC, 0x26, 0x26),
            overdue: Color::Rgb(0xFC, 0xA5, 0xA5),
            category_colors: default_category_colors(),
        }
    }

    /// Base palette for `name` with the `[ui.colors]` and
    /// `[ui.category_colors]` overrides applied
    pub fn from_config(name: ThemeName, ui: &UiConfig) -> Self {
        let mut theme = match name {
            ThemeName::Light => Theme::light(),
            ThemeName::Dark => Theme::dark(),
        };

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "dim" => theme.dim = color,
                "highlight" => theme.highlight = color,
                "selection_bg" => theme.selection_bg = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                "overdue" => theme.overdue = color,
                _ => {}
            }
        }

        for (key, value) in &ui.category_colors {
            if let (Some(category), Some(color)) =
                (Category::parse_category(key), parse_hex_color(value))
            {
                theme.category_colors.insert(category, color);
            }
        }

        theme
    }

    pub fn category_color(&self, category: Category) -> Color {
        self.category_colors
            .get(&category)
            .copied()
            .unwrap_or(self.text)
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
