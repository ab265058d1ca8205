//! Shared library for the calendar notifier Lambda functions.
//!
//! This crate turns calendar webhook payloads into chat-ready text blocks and
//! provides the configuration, clock and error types the Lambdas share.

pub mod clock;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use formatter::{parse_event_time, parse_timestamp, validate, EventFormatter};
pub use models::{Attendee, Event, EventTime, FormattedMessage, IncomingRequest, MessageContent, RequestBody};
