//! Display payloads: the renderer-agnostic shape of a rich message.
//!
//! The core never talks to the platform's embed builder directly. It
//! produces a [`Payload`] and hands it to the gateway, which maps it onto
//! whatever the platform's rich-message format is. This keeps render
//! logic a pure function the tests can assert on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accent colors used across the bot's messages.
pub mod colors {
    /// Errors and rejections.
    pub const ERROR: u32 = 0xff0000;
    /// Confirmations and completed actions.
    pub const SUCCESS: u32 = 0x00ff00;
    /// Informational and instructional messages.
    pub const INFO: u32 = 0x3498db;
}

/// One titled section of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub value: String,
    /// Render next to the previous field rather than on its own row.
    pub inline: bool,
}

/// A rich message ready for the gateway to post or edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default)]
    pub fields: Vec<PayloadField>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Payload {
    /// Starts a payload with a title and accent color.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            color,
            fields: Vec::new(),
            footer: None,
            timestamp: None,
        }
    }

    /// Sets the body text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Appends a titled section.
    pub fn field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(PayloadField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Sets the footer line.
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    /// Stamps the payload with a display timestamp.
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Looks up a field by exact name. Test helper for render assertions.
    pub fn field_named(&self, name: &str) -> Option<&PayloadField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_builder_accumulates_fields_in_order() {
        let payload = Payload::new("title", colors::INFO)
            .description("body")
            .field("first", "a", true)
            .field("second", "b", false)
            .footer("foot");

        assert_eq!(payload.title, "title");
        assert_eq!(payload.description, "body");
        assert_eq!(payload.fields.len(), 2);
        assert_eq!(payload.fields[0].name, "first");
        assert!(payload.fields[0].inline);
        assert_eq!(payload.fields[1].name, "second");
        assert_eq!(payload.footer.as_deref(), Some("foot"));
    }

    #[test]
    fn test_payload_field_named_finds_exact_match() {
        let payload =
            Payload::new("t", colors::SUCCESS).field("👥 В КАНАЛЕ (2)", "x", true);
        assert!(payload.field_named("👥 В КАНАЛЕ (2)").is_some());
        assert!(payload.field_named("👥 В КАНАЛЕ").is_none());
    }

    #[test]
    fn test_payload_optional_parts_default_to_none() {
        let json = r#"{"title":"t","description":"d","color":255}"#;
        let payload: Payload = serde_json::from_str(json).unwrap();
        assert!(payload.fields.is_empty());
        assert!(payload.footer.is_none());
        assert!(payload.timestamp.is_none());
    }
}
