//! Configuration management for the calendar webhook Lambda.

use std::env;

use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Attendee count above which only the number of attendees is shown.
pub const DEFAULT_MAX_LISTED_ATTENDEES: usize = 5;

pub const DEFAULT_HEADING: &str = "### Upcoming Event";

/// Formatter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Attendee lists longer than this collapse to a count
    pub max_listed_attendees: usize,
    /// Zone used to render Start Time / End Time
    pub display_timezone: Tz,
    /// First line of every rendered block
    pub heading: String,
    /// Reject malformed events instead of rendering placeholders
    pub strict_validation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_listed_attendees: DEFAULT_MAX_LISTED_ATTENDEES,
            display_timezone: Tz::UTC,
            heading: DEFAULT_HEADING.to_string(),
            strict_validation: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_listed_attendees = match lookup("MAX_LISTED_ATTENDEES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("MAX_LISTED_ATTENDEES must be a non-negative integer: {}", e))
            })?,
            None => defaults.max_listed_attendees,
        };

        let display_timezone = match lookup("DISPLAY_TIMEZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|e| Error::Config(format!("DISPLAY_TIMEZONE is not a known zone: {}", e)))?,
            None => defaults.display_timezone,
        };

        let heading = lookup("MESSAGE_HEADING").unwrap_or(defaults.heading);

        let strict_validation = match lookup("STRICT_EVENT_VALIDATION") {
            Some(raw) => parse_flag(&raw)?,
            None => defaults.strict_validation,
        };

        Ok(Self {
            max_listed_attendees,
            display_timezone,
            heading,
            strict_validation,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "STRICT_EVENT_VALIDATION must be a boolean, got '{}'",
            other
        ))),
    }
}
