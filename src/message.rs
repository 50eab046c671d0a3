//! The message of a log entry and how it is rendered into a Loki log line.
use crate::LokiError;
use serde_json::{Map, Value};

/// Additional fields which are merged into the log line (not into the labels).
pub type Extras = Map<String, Value>;

/// The message of a single log entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A plain text message
    Text(String),
    /// A structured message which is rendered as a JSON object
    Structured(Map<String, Value>),
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(fields: Map<String, Value>) -> Self {
        Message::Structured(fields)
    }
}

impl TryFrom<Value> for Message {
    type Error = LokiError;

    /// Convert a JSON value into a message. Only strings and objects are accepted.
    ///
    /// # Example
    /// ```
    /// use loki_logger_rs::Message;
    /// use serde_json::json;
    ///
    /// let message = Message::try_from(json!({"error": "Database error", "code": 500})).unwrap();
    /// assert!(matches!(message, Message::Structured(_)));
    /// ```
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Message::Text(text)),
            Value::Object(fields) => Ok(Message::Structured(fields)),
            other => Err(LokiError::configuration(format!(
                "a message must be a string or a JSON object, got `{}`",
                other
            ))),
        }
    }
}

/// Render `message` and the optional `extras` into the line which is sent to Loki.
///
/// - a text message without extras is used as it is (it is *not* JSON quoted)
/// - a text message with extras becomes `{"message": <text>, ...extras}`
/// - a structured message becomes its own JSON object with the extras merged in
///
/// If an extra uses the same key as the message content (including `"message"` for text
/// messages), the extra wins.
pub fn format_line(message: &Message, extras: Option<&Extras>) -> String {
    let extras = extras.filter(|extras| !extras.is_empty());

    let mut fields = match (message, extras) {
        (Message::Text(text), None) => return text.clone(),
        (Message::Text(text), Some(_)) => {
            let mut fields = Map::new();
            fields.insert("message".to_string(), Value::String(text.clone()));
            fields
        }
        (Message::Structured(fields), _) => fields.clone(),
    };

    if let Some(extras) = extras {
        fields.extend(
            extras
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }

    Value::Object(fields).to_string()
}

#[cfg(test)]
mod tests {
    use crate::message::{format_line, Extras, Message};
    use crate::LokiError;
    use serde_json::{json, Value};

    fn extras(value: Value) -> Extras {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("extras have to be a JSON object"),
        }
    }

    #[test]
    fn a_plain_message_is_used_unchanged() {
        let line = format_line(&Message::from("Test log message"), None);
        assert_eq!(line, "Test log message");
    }

    #[test]
    fn a_plain_message_with_empty_extras_is_used_unchanged() {
        let line = format_line(&Message::from("say \"hi\""), Some(&Extras::new()));
        assert_eq!(line, "say \"hi\"");
    }

    #[test]
    fn a_plain_message_with_extras_becomes_a_json_object() {
        let extras = extras(json!({"user_id": "123"}));

        let line = format_line(&Message::from("hello"), Some(&extras));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, json!({"message": "hello", "user_id": "123"}));
    }

    #[test]
    fn extras_win_over_the_message_text() {
        let extras = extras(json!({"message": "replaced"}));

        let line = format_line(&Message::from("original"), Some(&extras));

        assert_eq!(line, r#"{"message":"replaced"}"#);
    }

    #[test]
    fn a_structured_message_is_rendered_as_json() {
        let message = Message::try_from(json!({"error": "Database error", "code": 500})).unwrap();

        let line = format_line(&message, None);

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, json!({"error": "Database error", "code": 500}));
    }

    #[test]
    fn extras_override_overlapping_keys_of_a_structured_message() {
        let message = Message::try_from(json!({"code": 500, "service": "db"})).unwrap();
        let extras = extras(json!({"code": 503, "request_id": "abc-def"}));

        let line = format_line(&message, Some(&extras));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            parsed,
            json!({"code": 503, "service": "db", "request_id": "abc-def"})
        );
    }

    #[test]
    fn formatting_is_deterministic() {
        let message = Message::try_from(json!({"b": 1, "a": [1, 2, 3]})).unwrap();
        let extras = extras(json!({"z": null, "c": {"nested": true}}));

        assert_eq!(
            format_line(&message, Some(&extras)),
            format_line(&message.clone(), Some(&extras.clone()))
        );
    }

    #[test]
    fn only_strings_and_objects_are_messages() {
        assert_eq!(
            Message::try_from(json!("text")).unwrap(),
            Message::Text("text".to_string())
        );
        assert!(matches!(
            Message::try_from(json!(42)),
            Err(LokiError::Configuration(_))
        ));
        assert!(matches!(
            Message::try_from(json!(["a", "b"])),
            Err(LokiError::Configuration(_))
        ));
    }
}
