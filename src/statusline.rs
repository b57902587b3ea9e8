use chrono::{DateTime, Local, TimeZone, Timelike, Utc};

use crate::models::{UsageData, UsageSection};
use crate::theme::{self, TextColor};

/// Printed in place of any value that cannot be determined.
pub const PLACEHOLDER: &str = "N/A";

pub const BAR_LENGTH: usize = 10;
const BAR_FILLED: char = '\u{2588}';
const BAR_EMPTY: char = '\u{2591}';
const MAX_OVERFILL: usize = 10;

const DEFAULT_SESSION_LABEL: &str = "Session";
const DEFAULT_WEEK_LABEL: &str = "Week";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    Session,
    Week,
    #[default]
    Both,
}

/// How a window's reset instant is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetStyle {
    /// Time remaining, `"3h 12m"` or `"2d 5h"`.
    #[default]
    Countdown,
    /// Local wall clock, `"2:05pm"`.
    Clock12,
    /// Local wall clock, `"14:05"`.
    Clock24,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayOptions {
    pub mode: DisplayMode,
    pub session_label: String,
    pub week_label: String,
    pub text_color: TextColor,
    pub show_bars: bool,
    pub reset_style: ResetStyle,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Both,
            session_label: DEFAULT_SESSION_LABEL.to_string(),
            week_label: DEFAULT_WEEK_LABEL.to_string(),
            text_color: TextColor::default(),
            show_bars: true,
            reset_style: ResetStyle::Countdown,
        }
    }
}

/// Assign custom labels, in order, to the windows the mode displays.
/// Windows without a custom label keep their default.
pub fn resolve_labels(mode: DisplayMode, labels: &[String]) -> (String, String) {
    let mut session = DEFAULT_SESSION_LABEL.to_string();
    let mut week = DEFAULT_WEEK_LABEL.to_string();
    let mut custom = labels.iter().cloned();

    match mode {
        DisplayMode::Session => session = custom.next().unwrap_or(session),
        DisplayMode::Week => week = custom.next().unwrap_or(week),
        DisplayMode::Both => {
            session = custom.next().unwrap_or(session);
            week = custom.next().unwrap_or(week);
        }
    }
    (session, week)
}

/// Filled cells are `round(utilization / 100 * length)`. Out-of-range input
/// is not clamped to `length`, so an over-limit window over-fills, up to
/// `MAX_OVERFILL` times the bar length.
pub fn progress_bar(utilization: f64, length: usize) -> String {
    // `as` saturates, so negative and NaN input fill nothing.
    let filled = ((utilization / 100.0 * length as f64).round() as usize)
        .min(length.saturating_mul(MAX_OVERFILL));
    let empty = length.saturating_sub(filled);

    std::iter::repeat(BAR_FILLED)
        .take(filled)
        .chain(std::iter::repeat(BAR_EMPTY).take(empty))
        .collect()
}

/// Round to one decimal with ties away from zero, as the percentage is shown.
fn display_percentage(utilization: f64) -> f64 {
    (utilization * 10.0).round() / 10.0
}

pub fn format_reset(
    resets_at: Option<DateTime<Utc>>,
    style: ResetStyle,
    include_weekday: bool,
    now: DateTime<Utc>,
) -> String {
    let Some(reset) = resets_at else {
        return PLACEHOLDER.to_string();
    };
    if reset <= now {
        return "soon".to_string();
    }

    match style {
        ResetStyle::Countdown => format_countdown(reset - now),
        ResetStyle::Clock12 => format_clock(&reset.with_timezone(&Local), false, include_weekday),
        ResetStyle::Clock24 => format_clock(&reset.with_timezone(&Local), true, include_weekday),
    }
}

fn format_countdown(remaining: chrono::Duration) -> String {
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;

    if hours > 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else {
        format!("{hours}h {minutes}m")
    }
}

fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>, use_24h: bool, include_weekday: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let time = if use_24h {
        format!("{:02}:{:02}", at.hour(), at.minute())
    } else {
        let (pm, hour) = at.hour12();
        format!("{hour}:{:02}{}", at.minute(), if pm { "pm" } else { "am" })
    };

    if include_weekday {
        format!("{} {time}", at.format("%a"))
    } else {
        time
    }
}

fn render_window(
    label: &str,
    section: Option<&UsageSection>,
    include_weekday: bool,
    options: &DisplayOptions,
    now: DateTime<Utc>,
) -> String {
    let text = options.text_color.code();
    // Color and bar follow the value as displayed, so "70.0%" is never green.
    let utilization = section.and_then(|s| s.utilization).map(display_percentage);
    let color = utilization.map_or(theme::GREEN, theme::color_for);
    let value = utilization.map_or_else(|| PLACEHOLDER.to_string(), |u| format!("{u:.1}"));
    let bar = if options.show_bars {
        format!("{color}{} ", progress_bar(utilization.unwrap_or(0.0), BAR_LENGTH))
    } else {
        String::new()
    };
    let reset = format_reset(
        section.and_then(|s| s.resets_at),
        options.reset_style,
        include_weekday,
        now,
    );

    format!("{text}{label}: {bar}{color}{value}%{text} ({reset})")
}

/// Build the full colorized status line for the selected windows.
pub fn render_line(data: &UsageData, options: &DisplayOptions, now: DateTime<Utc>) -> String {
    let session = || {
        render_window(&options.session_label, data.session.as_ref(), false, options, now)
    };
    let week = || render_window(&options.week_label, data.weekly.as_ref(), true, options, now);

    let mut line = match options.mode {
        DisplayMode::Session => session(),
        DisplayMode::Week => week(),
        DisplayMode::Both => format!("{} | {}", session(), week()),
    };
    line.push_str(theme::RESET);
    line
}
