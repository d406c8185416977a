//! Typed views over the free-form `data` record.
//!
//! Every absent or mistyped field falls back to an empty value, so building a
//! view never fails. The raw record stays the source of truth for storage and export.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::EntryKind;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionPayload {
    pub instruction: String,
    pub input: Option<String>,
    pub output: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Chat(ChatPayload),
    Instruction(InstructionPayload),
}

impl Payload {
    pub fn from_value(kind: EntryKind, data: &Value) -> Self {
        match kind {
            EntryKind::Chat => Payload::Chat(ChatPayload::from_value(data)),
            EntryKind::Instruction => Payload::Instruction(InstructionPayload::from_value(data)),
        }
    }
}

impl Message {
    pub fn from_value(v: &Value) -> Self {
        Self {
            role: str_field(v, "role"),
            content: str_field(v, "content"),
        }
    }
}

impl ChatPayload {
    /// Missing or non-array `messages` => empty conversation.
    pub fn from_value(data: &Value) -> Self {
        let messages = data
            .get("messages")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(Message::from_value).collect())
            .unwrap_or_default();
        Self { messages }
    }
}

impl InstructionPayload {
    pub fn from_value(data: &Value) -> Self {
        Self {
            instruction: str_field(data, "instruction"),
            input: data.get("input").and_then(Value::as_str).map(str::to_string),
            output: str_field(data, "output"),
        }
    }
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
