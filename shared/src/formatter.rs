//! Renders calendar events into chat-ready text blocks.
//!
//! The block is assembled from an ordered table of line renderers. Each
//! renderer decides whether its line applies to the event and, if so, returns
//! the rendered line without the trailing newline.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{non_empty, Event, EventTime, FormattedMessage, IncomingRequest};

const INVALID_DATE: &str = "Invalid Date";
const NOT_A_NUMBER: &str = "NaN";
const UNDEFINED: &str = "undefined";

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Human-readable timestamp layout, e.g. `Mon Jan 01 2024 10:00:00 GMT+0000 (UTC)`.
const DISPLAY_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z (%Z)";

/// Date-times without a UTC offset.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

type LineRenderer = fn(&RenderContext<'_>) -> Option<String>;

/// Lines of the block, in output order.
const LINES: &[LineRenderer] = &[
    heading_line,
    summary_line,
    start_time_line,
    end_time_line,
    duration_line,
    due_in_line,
    attendees_line,
    calendar_link_line,
    meet_link_line,
    location_line,
    description_line,
];

/// Formats calendar events using a configured clock and display settings.
#[derive(Clone)]
pub struct EventFormatter {
    config: Config,
    clock: Arc<dyn Clock>,
}

impl EventFormatter {
    pub fn new(config: Config, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Arc::new(clock),
        }
    }

    /// Formatter reading wall-clock time.
    pub fn with_system_clock(config: Config) -> Self {
        Self::new(config, SystemClock)
    }

    /// Render the event. Never fails: missing or unparseable fields degrade to
    /// placeholder text (`undefined`, `Invalid Date`, `NaN`).
    pub fn format(&self, event: &Event) -> FormattedMessage {
        let ctx = RenderContext::new(event, &self.config, self.clock.now());

        let mut text = String::new();
        for render in LINES {
            if let Some(line) = render(&ctx) {
                text.push_str(&line);
                text.push('\n');
            }
        }
        text.push('\n');

        debug!(length = text.len(), "Rendered event block");
        FormattedMessage::new(text)
    }

    /// Validate then render; malformed events are rejected.
    pub fn format_strict(&self, event: &Event) -> Result<FormattedMessage> {
        validate(event)?;
        Ok(self.format(event))
    }

    /// Render the event carried by a webhook request, honouring strict mode.
    pub fn format_request(&self, request: &IncomingRequest) -> Result<FormattedMessage> {
        let event = &request.request.content;
        if self.config.strict_validation {
            self.format_strict(event)
        } else {
            Ok(self.format(event))
        }
    }
}

/// Check that the fields the block depends on are present and parseable.
pub fn validate(event: &Event) -> Result<()> {
    if non_empty(&event.summary).is_none() {
        return Err(Error::MalformedEvent("summary is missing".to_string()));
    }
    check_timestamp("start", event.start.as_ref())?;
    check_timestamp("end", event.end.as_ref())?;
    if non_empty(&event.html_link).is_none() {
        return Err(Error::MalformedEvent("htmlLink is missing".to_string()));
    }
    Ok(())
}

fn check_timestamp(field: &str, time: Option<&EventTime>) -> Result<()> {
    match time.and_then(|t| t.raw().map(|raw| (t, raw))) {
        None => Err(Error::MalformedEvent(format!("{}.dateTime is missing", field))),
        Some((time, raw)) if parse_event_time(time).is_none() => Err(Error::MalformedEvent(
            format!("{}.dateTime '{}' is not a valid timestamp", field, raw),
        )),
        Some(_) => Ok(()),
    }
}

/// Resolve an event boundary to an instant.
///
/// Offset-less date-times are read in the boundary's `timeZone`, falling back
/// to UTC when it is absent or not a known IANA zone.
pub fn parse_event_time(time: &EventTime) -> Option<DateTime<Utc>> {
    let zone = time
        .time_zone
        .as_deref()
        .and_then(|name| name.trim().parse::<Tz>().ok())
        .unwrap_or(Tz::UTC);
    parse_timestamp(time.raw()?, zone)
}

/// Parse an RFC 3339 date-time, a local date-time in `zone`, or a bare
/// `YYYY-MM-DD` date as midnight UTC.
pub fn parse_timestamp(raw: &str, zone: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(local) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        // Nonexistent local times (DST gaps) have no instant.
        return zone
            .from_local_datetime(&local)
            .earliest()
            .map(|resolved| resolved.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Everything a line renderer needs, with timestamps parsed once.
struct RenderContext<'a> {
    event: &'a Event,
    config: &'a Config,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl<'a> RenderContext<'a> {
    fn new(event: &'a Event, config: &'a Config, now: DateTime<Utc>) -> Self {
        Self {
            event,
            config,
            start: parse_logged("start", event.start.as_ref()),
            end: parse_logged("end", event.end.as_ref()),
            now,
        }
    }

    fn display_time(&self, instant: Option<DateTime<Utc>>) -> String {
        match instant {
            Some(instant) => instant
                .with_timezone(&self.config.display_timezone)
                .format(DISPLAY_FORMAT)
                .to_string(),
            None => INVALID_DATE.to_string(),
        }
    }
}

fn parse_logged(field: &str, time: Option<&EventTime>) -> Option<DateTime<Utc>> {
    let parsed = time.and_then(parse_event_time);
    if parsed.is_none() {
        let raw = time.and_then(EventTime::raw);
        warn!(field, value = ?raw, "Event timestamp missing or unparseable");
    }
    parsed
}

fn heading_line(ctx: &RenderContext<'_>) -> Option<String> {
    Some(ctx.config.heading.clone()).filter(|h| !h.is_empty())
}

fn summary_line(ctx: &RenderContext<'_>) -> Option<String> {
    Some(format!(
        "*Summary:* {}",
        ctx.event.summary.as_deref().unwrap_or(UNDEFINED)
    ))
}

fn start_time_line(ctx: &RenderContext<'_>) -> Option<String> {
    Some(format!("*Start Time:* {}", ctx.display_time(ctx.start)))
}

fn end_time_line(ctx: &RenderContext<'_>) -> Option<String> {
    Some(format!("*End Time:* {}", ctx.display_time(ctx.end)))
}

fn duration_line(ctx: &RenderContext<'_>) -> Option<String> {
    let minutes = match (ctx.start, ctx.end) {
        (Some(start), Some(end)) => {
            let millis = end.timestamp_millis() - start.timestamp_millis();
            (millis as f64 / MILLIS_PER_MINUTE as f64).to_string()
        }
        _ => NOT_A_NUMBER.to_string(),
    };
    Some(format!("*Duration:* {} minutes", minutes))
}

fn due_in_line(ctx: &RenderContext<'_>) -> Option<String> {
    let minutes = match ctx.start {
        Some(start) => (start.timestamp_millis() - ctx.now.timestamp_millis())
            .div_euclid(MILLIS_PER_MINUTE)
            .to_string(),
        None => NOT_A_NUMBER.to_string(),
    };
    Some(format!("*Due In:* {} minutes", minutes))
}

fn attendees_line(ctx: &RenderContext<'_>) -> Option<String> {
    let attendees = ctx.event.attendees.as_ref()?;
    if attendees.len() > ctx.config.max_listed_attendees {
        return Some(format!("*Attendees:* {} attendees", attendees.len()));
    }
    let names = attendees
        .iter()
        .map(|a| a.label().unwrap_or(UNDEFINED))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("*Attendees:* {}", names))
}

fn calendar_link_line(ctx: &RenderContext<'_>) -> Option<String> {
    Some(format!(
        "*Calendar Link:* {}",
        ctx.event.html_link.as_deref().unwrap_or(UNDEFINED)
    ))
}

fn meet_link_line(ctx: &RenderContext<'_>) -> Option<String> {
    non_empty(&ctx.event.hangout_link).map(|link| format!("*Meet Link:* {}", link))
}

fn location_line(ctx: &RenderContext<'_>) -> Option<String> {
    non_empty(&ctx.event.location).map(|location| format!("*Location:* {}", location))
}

fn description_line(ctx: &RenderContext<'_>) -> Option<String> {
    non_empty(&ctx.event.description).map(|description| format!("*Description:* {}", description))
}
