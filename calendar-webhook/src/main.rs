//! Calendar Webhook Lambda - Formats incoming calendar events for chat channels.
//!
//! The integration host invokes this Lambda with `{ "request": { "content": <event> } }`
//! and posts the returned `{ "content": { "text": ... } }` to its channel.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{Config, EventFormatter, FormattedMessage, IncomingRequest};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    formatter: EventFormatter,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        info!(
            max_listed_attendees = config.max_listed_attendees,
            display_timezone = %config.display_timezone,
            strict_validation = config.strict_validation,
            "Loaded formatter configuration"
        );

        Ok(Self {
            formatter: EventFormatter::with_system_clock(config),
        })
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<IncomingRequest>,
) -> Result<FormattedMessage, Error> {
    let (request, context) = event.into_parts();
    let calendar_event = &request.request.content;

    info!(
        request_id = %context.request_id,
        summary = calendar_event.summary.as_deref().unwrap_or_default(),
        attendees = calendar_event.attendees.as_ref().map_or(0, Vec::len),
        "Formatting calendar event"
    );

    match state.formatter.format_request(&request) {
        Ok(message) => Ok(message),
        Err(e) => {
            if e.is_client_error() {
                warn!(request_id = %context.request_id, error = %e, "Rejected calendar event");
            } else {
                error!(request_id = %context.request_id, error = %e, "Failed to format calendar event");
            }
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new()?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lambda_runtime::Context;
    use serde_json::json;
    use shared::FixedClock;

    fn state(config: Config) -> Arc<AppState> {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 58, 1).unwrap();
        Arc::new(AppState {
            formatter: EventFormatter::new(config, FixedClock(now)),
        })
    }

    fn invocation(payload: serde_json::Value) -> LambdaEvent<IncomingRequest> {
        let request: IncomingRequest = serde_json::from_value(payload).unwrap();
        LambdaEvent::new(request, Context::default())
    }

    #[tokio::test]
    async fn test_handler_formats_webhook_payload() {
        let payload = json!({
            "request": {
                "content": {
                    "summary": "Standup",
                    "start": { "dateTime": "2024-01-01T10:00:00Z" },
                    "end": { "dateTime": "2024-01-01T10:30:00Z" },
                    "htmlLink": "http://cal/1",
                    "hangoutLink": "https://meet.google.com/abc-defg-hij",
                    "attendees": [
                        { "email": "alice@example.com", "displayName": "Alice" },
                        { "email": "bob@example.com" }
                    ]
                }
            }
        });

        let message = handler(state(Config::default()), invocation(payload))
            .await
            .unwrap();
        let value = serde_json::to_value(&message).unwrap();
        let text = value["content"]["text"].as_str().unwrap();

        assert_eq!(
            text,
            "### Upcoming Event\n\
             *Summary:* Standup\n\
             *Start Time:* Mon Jan 01 2024 10:00:00 GMT+0000 (UTC)\n\
             *End Time:* Mon Jan 01 2024 10:30:00 GMT+0000 (UTC)\n\
             *Duration:* 30 minutes\n\
             *Due In:* 1 minutes\n\
             *Attendees:* Alice, bob@example.com\n\
             *Calendar Link:* http://cal/1\n\
             *Meet Link:* https://meet.google.com/abc-defg-hij\n\
             \n"
        );
    }

    #[tokio::test]
    async fn test_handler_degrades_malformed_payload_by_default() {
        let message = handler(state(Config::default()), invocation(json!({ "request": {} })))
            .await
            .unwrap();
        assert!(message.text().contains("*Start Time:* Invalid Date\n"));
        assert!(message.text().contains("*Calendar Link:* undefined\n"));
    }

    #[tokio::test]
    async fn test_handler_rejects_malformed_payload_in_strict_mode() {
        let config = Config {
            strict_validation: true,
            ..Config::default()
        };
        let payload = json!({
            "request": {
                "content": {
                    "summary": "Standup",
                    "start": { "dateTime": "soon" },
                    "end": { "dateTime": "2024-01-01T10:30:00Z" },
                    "htmlLink": "http://cal/1"
                }
            }
        });

        let err = handler(state(config), invocation(payload)).await.unwrap_err();
        assert!(err.to_string().contains("start.dateTime 'soon'"));
    }
}
