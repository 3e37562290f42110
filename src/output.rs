//! # Output Styling
//!
//! Terminal output for the `pbxpatch` binary: whether to use color and
//! emoji, and the status markers printed in front of each reported line.
//!
//! Color is controlled by `--color=always|never|auto`. In `auto` mode it is
//! disabled by `NO_COLOR` (any value), `CLICOLOR=0`, `TERM=dumb`, or a
//! non-TTY stdout (unless `CLICOLOR_FORCE` is set to a non-zero value).

use std::env;

use console::style;

/// Output configuration for colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Configuration from the `--color` flag value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// `text` in bold when colors are on.
    pub fn heading(&self, text: &str) -> String {
        if self.use_color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// `text` dimmed when colors are on.
    pub fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// The emoji when colors are enabled, the plain alternative otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Outcome marker printed before a reported line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Unchanged,
    DryRun,
    Failed,
}

impl Status {
    pub fn marker(self, config: &OutputConfig) -> String {
        let (emoji_str, plain) = match self {
            Status::Ok => ("✅", "[OK]"),
            Status::Unchanged => ("ℹ️ ", "[SKIP]"),
            Status::DryRun => ("🔍", "[DRY-RUN]"),
            Status::Failed => ("❌", "[FAIL]"),
        };
        let marker = emoji(config, emoji_str, plain);
        if !config.use_color {
            return marker.to_string();
        }
        match self {
            Status::Failed => style(marker).red().to_string(),
            _ => marker.to_string(),
        }
    }

    /// `marker message` on one line.
    pub fn line(self, config: &OutputConfig, message: impl std::fmt::Display) -> String {
        format!("{} {}", self.marker(config), message)
    }
}
