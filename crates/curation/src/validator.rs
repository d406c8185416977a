use serde_json::Value;

use crate::{ChatPayload, EntryKind, InstructionPayload, Payload, ValidationResult};

const EMPTY_MESSAGE_PENALTY: i32 = 20;
const NO_SYSTEM_PENALTY: i32 = 5;
const REPEATED_ROLE_PENALTY: i32 = 5;
const SHORT_ASSISTANT_PENALTY: i32 = 5;
const SHORT_ASSISTANT_LEN: usize = 15;

const EMPTY_FIELD_PENALTY: i32 = 30;
const SHORT_INSTRUCTION_PENALTY: i32 = 10;
const SHORT_INSTRUCTION_LEN: usize = 10;
const NO_DIRECTIVE_PENALTY: i32 = 5;
const SHORT_OUTPUT_PENALTY: i32 = 10;
const SHORT_OUTPUT_LEN: usize = 25;

const DIRECTIVE_WORDS: &[&str] = &[
    "explain", "describe", "what", "why", "how", "when", "list", "summarize", "analyze",
];

/// Penalties accumulate per check; the score is clamped once at the end.
#[derive(Default)]
struct Tally {
    penalty: i32,
    issues: Vec<String>,
    warnings: Vec<String>,
}

impl Tally {
    fn issue(&mut self, penalty: i32, msg: String) {
        self.penalty += penalty;
        self.issues.push(msg);
    }

    fn warn(&mut self, penalty: i32, msg: String) {
        self.penalty += penalty;
        self.warnings.push(msg);
    }

    fn finish(self) -> ValidationResult {
        let score = (100 - self.penalty).clamp(0, 100) as u8;
        ValidationResult {
            quality_score: score,
            passes: self.issues.is_empty(),
            issues: self.issues,
            warnings: self.warnings,
        }
    }
}

/// Score a raw submission. Unrecognized `kind` tags get a perfect result;
/// callers that want strict typing must reject them before this point.
pub fn validate_entry(kind: &str, data: &Value) -> ValidationResult {
    match kind.parse::<EntryKind>() {
        Ok(kind) => validate(&Payload::from_value(kind, data)),
        Err(_) => ValidationResult::perfect(),
    }
}

pub fn validate(payload: &Payload) -> ValidationResult {
    let mut t = Tally::default();
    match payload {
        Payload::Chat(chat) => check_chat(chat, &mut t),
        Payload::Instruction(ins) => check_instruction(ins, &mut t),
    }
    t.finish()
}

fn check_chat(chat: &ChatPayload, t: &mut Tally) {
    let msgs = &chat.messages;

    for (i, m) in msgs.iter().enumerate() {
        if m.content.trim().is_empty() {
            let role = if m.role.is_empty() { "unknown" } else { m.role.as_str() };
            t.issue(
                EMPTY_MESSAGE_PENALTY,
                format!("Message {} ({role}) has empty content", i + 1),
            );
        }
    }

    if !msgs.iter().any(|m| m.role == "system") {
        t.warn(
            NO_SYSTEM_PENALTY,
            "No system message found. Consider adding one for better context.".to_string(),
        );
    }

    // system repeats are fine
    for (i, pair) in msgs.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.role == prev.role && matches!(cur.role.as_str(), "user" | "assistant") {
            let role = &cur.role;
            t.warn(
                REPEATED_ROLE_PENALTY,
                format!(
                    "Message {} ({role}) follows another {role} message. Consider alternating roles.",
                    i + 2
                ),
            );
        }
    }

    for (i, m) in msgs.iter().enumerate() {
        if m.role == "assistant" && char_len(&m.content) < SHORT_ASSISTANT_LEN {
            t.warn(
                SHORT_ASSISTANT_PENALTY,
                format!(
                    "Assistant message {} is very short. Consider providing more detailed responses.",
                    i + 1
                ),
            );
        }
    }
}

fn check_instruction(ins: &InstructionPayload, t: &mut Tally) {
    let instruction = ins.instruction.trim();
    let output = ins.output.trim();

    if instruction.is_empty() {
        t.issue(EMPTY_FIELD_PENALTY, "Instruction field is empty".to_string());
    }
    if output.is_empty() {
        t.issue(EMPTY_FIELD_PENALTY, "Output field is empty".to_string());
    }

    if instruction.chars().count() < SHORT_INSTRUCTION_LEN {
        t.warn(
            SHORT_INSTRUCTION_PENALTY,
            "Instruction is very short. Consider being more specific.".to_string(),
        );
    }

    if !ins.instruction.is_empty() && !has_directive(&ins.instruction) {
        t.warn(
            NO_DIRECTIVE_PENALTY,
            "Instruction may lack a clear directive. Consider using action verbs.".to_string(),
        );
    }

    if !ins.output.is_empty() && output.chars().count() < SHORT_OUTPUT_LEN {
        t.warn(
            SHORT_OUTPUT_PENALTY,
            "Output is very short. Consider providing more thorough responses.".to_string(),
        );
    }
}

fn has_directive(text: &str) -> bool {
    let lower = text.to_lowercase();
    DIRECTIVE_WORDS.iter().any(|w| lower.contains(w))
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}
