pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const GREEN: &str = "\x1b[32m";

/// Color for the label and parenthesised reset text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextColor {
    Default,
    White,
    #[default]
    LightGrey,
    MidGrey,
    DarkGrey,
}

impl TextColor {
    /// Unknown names fall back to light grey.
    pub fn from_name(name: &str) -> Self {
        match name {
            "default" => TextColor::Default,
            "white" => TextColor::White,
            "light-grey" => TextColor::LightGrey,
            "mid-grey" => TextColor::MidGrey,
            "dark-grey" => TextColor::DarkGrey,
            _ => TextColor::LightGrey,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            TextColor::Default => RESET,
            TextColor::White => "\x1b[97m",
            TextColor::LightGrey => "\x1b[37m",
            // Terminals have a single bright-black; dark grey shares it.
            TextColor::MidGrey | TextColor::DarkGrey => "\x1b[90m",
        }
    }
}

/// Severity color for a utilization percentage.
pub fn color_for(utilization: f64) -> &'static str {
    if utilization >= 90.0 {
        RED
    } else if utilization >= 70.0 {
        YELLOW
    } else {
        GREEN
    }
}
