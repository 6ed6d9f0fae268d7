//! Typed events surfaced by the external voice-dialogue session.
//!
//! Only `user_message` and `assistant_message` carry conversation content;
//! the remaining variants exist so the full SDK stream deserializes cleanly
//! and can be ignored by name.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum VoiceEvent {
    #[serde(rename = "user_message")]
    UserMessage(DialogueEvent),
    #[serde(rename = "assistant_message")]
    AssistantMessage(DialogueEvent),
    #[serde(rename = "assistant_end")]
    AssistantEnd(AssistantEndEvent),
    #[serde(rename = "user_interruption")]
    UserInterruption(UserInterruptionEvent),
    #[serde(rename = "chat_metadata")]
    ChatMetadata(ChatMetadataEvent),
    #[serde(rename = "error")]
    Error(VoiceErrorEvent),
}

/// A dialogue turn event carrying `{ role, content }`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DialogueEvent {
    message: DialogueMessage,
}

impl DialogueEvent {
    pub fn new(message: DialogueMessage) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &DialogueMessage {
        &self.message
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DialogueMessage {
    role: DialogueRole,
    content: String,
}

impl DialogueMessage {
    pub fn new(role: DialogueRole, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> DialogueRole {
        self.role.clone()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DialogueRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AssistantEndEvent {}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UserInterruptionEvent {}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ChatMetadataEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_group_id: Option<String>,
}

impl ChatMetadataEvent {
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn chat_group_id(&self) -> Option<&str> {
        self.chat_group_id.as_deref()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VoiceErrorEvent {
    message: String,
}

impl VoiceErrorEvent {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
