use iced::font::Weight;
use iced::{Color, Font};

use crate::models::RowColor;

pub const WINDOW_WIDTH: f32 = 1200.0;
pub const WINDOW_HEIGHT: f32 = 600.0;

/// Backdrop behind both panels.
pub const WINDOW_BACKGROUND: Color = Color::from_rgb8(0x1e, 0x1e, 0x2f);

/// Failure line at the top of the report panel.
pub const ERROR: Color = Color::from_rgb8(0xff, 0x52, 0x52);

/// The report panel is monospaced throughout.
pub const TEXT: Font = Font::MONOSPACE;
pub const TEXT_BOLD: Font = Font {
    weight: Weight::Bold,
    ..Font::MONOSPACE
};
pub const TEXT_SIZE: f32 = 14.0;

/// Widget color for a row background tag.
pub fn background(color: RowColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::from_rgb8(r, g, b)
}

/// Contrasting text color for a row background tag. Pastel cells take
/// the neutral dark, everything else takes white.
pub fn text_on(color: RowColor) -> Color {
    if color.is_light() {
        background(RowColor::Slate)
    } else {
        Color::WHITE
    }
}
