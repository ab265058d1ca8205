//! Wire models for the calendar webhook payload and the rendered message.

use serde::{Deserialize, Serialize};

/// Envelope the integration host invokes us with: `{ "request": { "content": <Event> } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingRequest {
    #[serde(default)]
    pub request: RequestBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: Event,
}

/// Calendar event as delivered by the calendar webhook.
///
/// Every field is optional on the wire so that a partial payload still
/// deserializes; missing values surface as placeholder text when rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub summary: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub attendees: Option<Vec<Attendee>>,
    pub html_link: Option<String>,
    pub hangout_link: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Start or end of an event. Timed events carry `dateTime`, all-day events carry `date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attendee {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl EventTime {
    /// Raw timestamp text, preferring `dateTime` over `date`.
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

impl Attendee {
    /// Name shown in the attendee list: display name if set, otherwise email
    /// (even when empty).
    pub fn label(&self) -> Option<&str> {
        non_empty(&self.display_name).or(self.email.as_deref())
    }
}

/// Rendered notification: `{ "content": { "text": <string> } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
}

impl FormattedMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: MessageContent { text: text.into() },
        }
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// Treat empty strings the same as absent values.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_incoming_request() {
        let payload = json!({
            "request": {
                "content": {
                    "summary": "Standup",
                    "start": { "dateTime": "2024-01-01T10:00:00Z" },
                    "end": { "dateTime": "2024-01-01T10:30:00Z", "timeZone": "UTC" },
                    "htmlLink": "http://cal/1",
                    "hangoutLink": "https://meet.google.com/abc",
                    "attendees": [
                        { "email": "a@example.com", "displayName": "Alice" },
                        { "email": "b@example.com", "responseStatus": "accepted" }
                    ],
                    "kind": "calendar#event"
                }
            }
        });

        let request: IncomingRequest = serde_json::from_value(payload).unwrap();
        let event = request.request.content;
        assert_eq!(event.summary.as_deref(), Some("Standup"));
        assert_eq!(event.start.as_ref().and_then(EventTime::raw), Some("2024-01-01T10:00:00Z"));
        assert_eq!(event.end.as_ref().unwrap().time_zone.as_deref(), Some("UTC"));
        assert_eq!(event.html_link.as_deref(), Some("http://cal/1"));
        assert_eq!(event.hangout_link.as_deref(), Some("https://meet.google.com/abc"));
        assert!(event.location.is_none());

        let attendees = event.attendees.unwrap();
        assert_eq!(attendees[0].label(), Some("Alice"));
        assert_eq!(attendees[1].label(), Some("b@example.com"));
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let request: IncomingRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.request.content.summary.is_none());
        assert!(request.request.content.start.is_none());
    }

    #[test]
    fn test_all_day_event_falls_back_to_date() {
        let time: EventTime = serde_json::from_value(json!({ "date": "2024-03-05" })).unwrap();
        assert_eq!(time.raw(), Some("2024-03-05"));
    }

    #[test]
    fn test_empty_display_name_falls_back_to_email() {
        let attendee = Attendee {
            display_name: Some(String::new()),
            email: Some("c@example.com".to_string()),
        };
        assert_eq!(attendee.label(), Some("c@example.com"));

        let attendee = Attendee {
            display_name: Some(String::new()),
            email: Some(String::new()),
        };
        assert_eq!(attendee.label(), Some(""));

        assert_eq!(Attendee::default().label(), None);
    }

    #[test]
    fn test_serialize_formatted_message() {
        let message = FormattedMessage::new("hello\n");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({ "content": { "text": "hello\n" } }));
    }
}
