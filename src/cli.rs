use std::ffi::{OsStr, OsString};

use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::poller::{API_URL, DEFAULT_TIMEOUT_MS};
use crate::statusline::{self, DisplayMode, DisplayOptions, ResetStyle};
use crate::theme::TextColor;

const MODE_FLAGS: [(&str, DisplayMode); 3] = [
    ("session", DisplayMode::Session),
    ("week", DisplayMode::Week),
    ("both", DisplayMode::Both),
];

/// Claude subscription usage as a single status-line segment.
///
/// Prints `N/A` instead of failing when credentials or the usage endpoint
/// are unavailable.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Show only the five-hour session window
    #[arg(long, action = ArgAction::Count)]
    #[allow(dead_code)]
    session: u8,

    /// Show only the seven-day window
    #[arg(long, action = ArgAction::Count)]
    #[allow(dead_code)]
    week: u8,

    /// Show both windows (default)
    #[arg(long, action = ArgAction::Count)]
    #[allow(dead_code)]
    both: u8,

    /// Set from the first mode flag on the command line.
    #[arg(skip)]
    pub mode: DisplayMode,

    /// Custom labels for the displayed windows, in order
    #[arg(value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Label color: default, white, light-grey, mid-grey or dark-grey
    #[arg(long, value_name = "NAME", action = ArgAction::Append)]
    pub text_color: Vec<String>,

    /// Hide the progress bars
    #[arg(long, overrides_with = "no_bars")]
    pub no_bars: bool,

    /// Show reset times as a 12-hour clock instead of a countdown
    #[arg(long, overrides_with = "clock")]
    pub clock: bool,

    /// Show reset times as a 24-hour clock
    #[arg(long = "24h", overrides_with = "clock_24h")]
    pub clock_24h: bool,

    /// Write diagnostics to stderr
    #[arg(long, overrides_with = "debug")]
    pub debug: bool,

    /// Request timeout in milliseconds
    #[arg(
        long,
        value_name = "MS",
        env = "CLAUDE_USAGE_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        overrides_with = "timeout"
    )]
    pub timeout: u64,

    #[arg(
        long,
        value_name = "URL",
        env = "CLAUDE_USAGE_API_URL",
        default_value = API_URL,
        hide = true,
        overrides_with = "api_url"
    )]
    pub api_url: String,
}

/// Parse result plus the unrecognised `--` flags that were dropped.
#[derive(Debug)]
pub struct Parsed {
    pub cli: Cli,
    pub ignored: Vec<String>,
}

impl Cli {
    /// Parse like a status-line segment should: unknown long flags are
    /// dropped, repeated flags are accepted and the first mode flag wins.
    pub fn try_parse_lenient<I, T>(args: I) -> Result<Parsed, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut command = Cli::command();
        command.build();
        let known: Vec<String> = command
            .get_arguments()
            .filter_map(|arg| arg.get_long())
            .map(str::to_owned)
            .collect();

        let mut ignored = Vec::new();
        let args: Vec<OsString> = args
            .into_iter()
            .map(Into::into)
            .filter(|arg| match long_flag_name(arg) {
                Some(name) if !known.iter().any(|k| k == name) => {
                    ignored.push(arg.to_string_lossy().into_owned());
                    false
                }
                _ => true,
            })
            .collect();

        let matches = command.try_get_matches_from_mut(args)?;
        let mut cli = Cli::from_arg_matches(&matches)?;
        cli.mode = first_mode(&matches);
        Ok(Parsed { cli, ignored })
    }

    pub fn reset_style(&self) -> ResetStyle {
        if self.clock_24h {
            ResetStyle::Clock24
        } else if self.clock {
            ResetStyle::Clock12
        } else {
            ResetStyle::Countdown
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        let (session_label, week_label) = statusline::resolve_labels(self.mode, &self.labels);
        DisplayOptions {
            mode: self.mode,
            session_label,
            week_label,
            text_color: self
                .text_color
                .first()
                .map(|name| TextColor::from_name(name))
                .unwrap_or_default(),
            show_bars: !self.no_bars,
            reset_style: self.reset_style(),
        }
    }
}

/// Name of a `--name` or `--name=value` argument. A bare `--` has none.
fn long_flag_name(arg: &OsStr) -> Option<&str> {
    let rest = arg.to_str()?.strip_prefix("--")?;
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    (!name.is_empty()).then_some(name)
}

fn first_mode(matches: &ArgMatches) -> DisplayMode {
    MODE_FLAGS
        .into_iter()
        .filter(|(id, _)| matches.value_source(id) == Some(ValueSource::CommandLine))
        .filter_map(|(id, mode)| matches.index_of(id).map(|index| (index, mode)))
        .min_by_key(|(index, _)| *index)
        .map_or(DisplayMode::Both, |(_, mode)| mode)
}
