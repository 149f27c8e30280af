use ratatui::style::Color;

pub const APP_BG: Color = Color::Rgb(25, 25, 38);
pub const SELECTED_BG: Color = Color::Rgb(50, 50, 80);
pub const STATUS_BG: Color = Color::Rgb(30, 30, 40);
pub const ACCENT: Color = Color::Rgb(140, 115, 200);
pub const FILTER_COLOR: Color = Color::Cyan;
pub const DIM_TEXT: Color = Color::Rgb(100, 100, 120);
pub const ACTIVE_BORDER: Color = Color::Rgb(120, 120, 180);
pub const ERROR_FG: Color = Color::LightRed;
pub const WARN_FG: Color = Color::Yellow;
pub const OK_FG: Color = Color::Green;
