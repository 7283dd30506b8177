use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// PLATFORM LIMITS
// ==============================================================================

pub const MAX_REPLY_BUTTONS: usize = 3;
pub const MAX_LIST_ROWS: usize = 10;
pub const MAX_ROW_TITLE_CHARS: usize = 24;
pub const MAX_ROW_DESCRIPTION_CHARS: usize = 72;

/// Shortens `text` to at most `max` characters, ending in an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

// ==============================================================================
// OUTBOUND MESSAGES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveKind {
    Button,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: ButtonReply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListRow {
    pub fn new(id: impl Into<String>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: truncate(title, MAX_ROW_TITLE_CHARS),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(truncate(description, MAX_ROW_DESCRIPTION_CHARS));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<ListRow>,
}

impl ListSection {
    pub fn new(title: &str, rows: Vec<ListRow>) -> Self {
        Self {
            title: Some(title.to_string()),
            rows,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractiveAction {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ReplyButton>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<ListSection>,
}

/// Reply-button or list message as accepted by the Cloud API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveMessage {
    #[serde(rename = "type")]
    pub kind: InteractiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<MessageHeader>,
    pub body: TextContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<TextContent>,
    pub action: InteractiveAction,
}

impl InteractiveMessage {
    pub fn buttons(body: &str, buttons: Vec<ButtonReply>) -> Self {
        Self {
            kind: InteractiveKind::Button,
            header: None,
            body: TextContent { text: body.to_string() },
            footer: None,
            action: InteractiveAction {
                buttons: buttons
                    .into_iter()
                    .map(|reply| ReplyButton {
                        kind: "reply".to_string(),
                        reply,
                    })
                    .collect(),
                ..Default::default()
            },
        }
    }

    pub fn list(body: &str, button_label: &str, sections: Vec<ListSection>) -> Self {
        Self {
            kind: InteractiveKind::List,
            header: None,
            body: TextContent { text: body.to_string() },
            footer: None,
            action: InteractiveAction {
                button: Some(button_label.to_string()),
                sections,
                ..Default::default()
            },
        }
    }

    pub fn with_header(mut self, text: &str) -> Self {
        self.header = Some(MessageHeader {
            kind: "text".to_string(),
            text: text.to_string(),
        });
        self
    }

    pub fn with_footer(mut self, text: &str) -> Self {
        self.footer = Some(TextContent { text: text.to_string() });
        self
    }

    pub fn rows(&self) -> impl Iterator<Item = &ListRow> {
        self.action.sections.iter().flat_map(|section| section.rows.iter())
    }

    /// Checks the message against the platform's button and row limits.
    pub fn validate(&self) -> Result<(), String> {
        match self.kind {
            InteractiveKind::Button => {
                let count = self.action.buttons.len();
                if count == 0 || count > MAX_REPLY_BUTTONS {
                    return Err(format!(
                        "button message needs 1 to {} buttons, got {}",
                        MAX_REPLY_BUTTONS, count
                    ));
                }
            }
            InteractiveKind::List => {
                let count = self.rows().count();
                if count == 0 || count > MAX_LIST_ROWS {
                    return Err(format!(
                        "list message needs 1 to {} rows, got {}",
                        MAX_LIST_ROWS, count
                    ));
                }
                if self.action.button.as_deref().map_or(true, str::is_empty) {
                    return Err("list message needs a button label".to_string());
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveMessage>,
}

impl OutboundMessage {
    pub fn text(to: String, body: &str) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "text",
            text: Some(TextBody { body: body.to_string() }),
            interactive: None,
        }
    }

    pub fn interactive(to: String, message: InteractiveMessage) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "interactive",
            text: None,
            interactive: Some(message),
        }
    }
}

// ==============================================================================
// INBOUND WEBHOOK PAYLOAD
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

impl WebhookPayload {
    fn message_values(&self) -> impl Iterator<Item = &WebhookValue> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter(|change| change.field == "messages")
            .map(|change| &change.value)
    }

    /// User messages in delivery order. Changes for other fields are skipped.
    pub fn messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.message_values().flat_map(|value| value.messages.iter())
    }

    pub fn statuses(&self) -> impl Iterator<Item = &DeliveryStatus> {
        self.message_values().flat_map(|value| value.statuses.iter())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<DeliveryStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMetadata {
    #[serde(default)]
    pub display_phone_number: String,
    #[serde(default)]
    pub phone_number_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub profile: Option<ContactProfile>,
    #[serde(default)]
    pub wa_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactProfile {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<InteractiveReply>,
    #[serde(default)]
    pub button: Option<TemplateButton>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveReply {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub list_reply: Option<ListReply>,
    #[serde(default)]
    pub button_reply: Option<ButtonReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListReply {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Quick-reply button pressed on a template message.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateButton {
    #[serde(alias = "id", default)]
    pub payload: String,
    #[serde(alias = "title", default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub errors: Vec<StatusError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
}

// ==============================================================================
// STATUS REPORTING
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub enabled: bool,
    pub last_message_sent: Option<DateTime<Utc>>,
    pub message_count_today: u64,
    pub total_messages_sent: u64,
    pub active_sessions: usize,
}
