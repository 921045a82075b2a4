//! The unified result of a dispatch.

use serde_json::Value;

use crate::error::CtlError;

/// Result of every dispatch-level operation.
///
/// Produced by a command handler or the request executor and consumed exactly
/// once by the execution driver.
pub type Outcome = Result<Output, CtlError>;

/// Renderable success value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Output {
    /// Nothing to print.
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// A JSON document returned by the admin API.
    Json(Value),
}

impl Output {
    /// Interpret a response body.
    ///
    /// An empty body is [`Output::Empty`], valid JSON is [`Output::Json`] and
    /// anything else is kept as text.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        serde_json::from_str(trimmed).map_or_else(|_| Self::Text(body.to_string()), Self::Json)
    }

    /// Whether there is nothing to print.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The value as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(text) => Value::String(text.clone()),
            Self::Json(value) => value.clone(),
        }
    }

    /// The JSON document, if this is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_body_classifies() {
        assert_eq!(Output::from_body(""), Output::Empty);
        assert_eq!(Output::from_body("  \n"), Output::Empty);
        assert_eq!(
            Output::from_body(r#"{"data": []}"#),
            Output::Json(json!({"data": []}))
        );
        assert_eq!(Output::from_body("OK"), Output::Text("OK".into()));
    }

    #[test]
    fn to_json() {
        assert_eq!(Output::Empty.to_json(), Value::Null);
        assert_eq!(Output::from("hi".to_string()).to_json(), json!("hi"));
    }
}
