#![forbid(unsafe_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use mc_classify::looks_like_math_with_limits;
use mc_eval::{EvalLimits, calculator_help, evaluate_with_limits};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("system clock is before UNIX_EPOCH")]
    ClockSkew,
    #[error(transparent)]
    Export(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStyle {
    #[default]
    Friendly,
    Professional,
    Humorous,
    Concise,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Per-user personalization carried into every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub display_name: String,
    pub chat_style: ChatStyle,
    pub topics_of_interest: Vec<String>,
    pub response_length: ResponseLength,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            display_name: "there".to_owned(),
            chat_style: ChatStyle::default(),
            topics_of_interest: Vec::new(),
            response_length: ResponseLength::default(),
        }
    }
}

impl UserContext {
    #[must_use]
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    fn name(&self) -> &str {
        if self.display_name.is_empty() {
            "there"
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Calculation,
    CalculationFailed,
    Help,
    Greeting,
    Farewell,
    SmallTalk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

/// Stateless chat-turn responder.
///
/// Routing order mirrors the original frontend: try the calculator path
/// first (classifier verdict, then evaluation), then the keyword
/// responder. The engine holds only the evaluation limits; every call is
/// independent and reentrant.
#[derive(Debug, Clone, Default)]
pub struct ChatEngine {
    limits: EvalLimits,
}

impl ChatEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: EvalLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &EvalLimits {
        &self.limits
    }

    pub fn respond(&self, message: &str, context: &UserContext) -> Reply {
        let trimmed = message.trim();

        if looks_like_math_with_limits(trimmed, &self.limits) {
            match evaluate_with_limits(trimmed, &self.limits) {
                Ok(result) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(expression = trimmed, result = result.as_str(), "calculated");
                    return Reply {
                        kind: ReplyKind::Calculation,
                        text: format!("the answer is: **{result}**"),
                    };
                }
                Err(error) => {
                    // The kind is for the log only; users get one
                    // uniform could-not-compute reply.
                    #[cfg(feature = "tracing")]
                    tracing::warn!(kind = ?error.kind(), "calculator rejected expression");
                    #[cfg(not(feature = "tracing"))]
                    let _ = &error;
                    return Reply {
                        kind: ReplyKind::CalculationFailed,
                        text: format!(
                            "Sorry {}, I couldn't work that one out. \
                             Ask me for \"math help\" to see what I can calculate.",
                            context.name()
                        ),
                    };
                }
            }
        }

        self.keyword_reply(trimmed, context)
    }

    fn keyword_reply(&self, message: &str, context: &UserContext) -> Reply {
        let name = context.name();
        let lowered = message.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |w: &str| words.contains(&w);

        if has_word("help") && (has_word("math") || has_word("calc") || has_word("calculator")) {
            return Reply {
                kind: ReplyKind::Help,
                text: calculator_help().to_owned(),
            };
        }
        if has_word("hello") || has_word("hi") || has_word("hey") {
            return Reply {
                kind: ReplyKind::Greeting,
                text: format!("Hello {name}! How can I help you today?"),
            };
        }
        if has_word("bye") || has_word("goodbye") || lowered.contains("see you") {
            return Reply {
                kind: ReplyKind::Farewell,
                text: format!("Goodbye {name}! It was great chatting with you."),
            };
        }
        if has_word("help") {
            return Reply {
                kind: ReplyKind::Help,
                text: format!(
                    "I'm here to help, {name}! Ask me anything, or send a math \
                     expression like 2 + 2 and I'll calculate it."
                ),
            };
        }

        let generic = [
            format!(
                "Thanks for your message, {name}! Send me a math expression and \
                 I'll calculate it on the spot."
            ),
            format!(
                "I hear you, {name}. I'm best with numbers — try something like \
                 sqrt(144) or 2^10."
            ),
            self.topical_reply(name, context),
        ];
        let index = (fnv1a(message.as_bytes()) % generic.len() as u64) as usize;
        Reply {
            kind: ReplyKind::SmallTalk,
            text: generic[index].clone(),
        }
    }

    fn topical_reply(&self, name: &str, context: &UserContext) -> String {
        match context.topics_of_interest.first() {
            Some(topic) => format!(
                "Interesting, {name}! Since you like {topic}, maybe there's a \
                 number in it for me to crunch."
            ),
            None => format!("Interesting, {name}! I'm listening."),
        }
    }
}

/// FNV-1a over the message bytes. The original rotated its generic
/// replies with the host language's string hash; FNV keeps the rotation
/// stable across processes.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp_unix_ms: u64,
    pub user_message: String,
    pub bot_response: String,
}

/// In-memory record of one user's conversation, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    user: String,
    entries: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
struct TranscriptExport<'a> {
    user: &'a str,
    exported_at_unix_ms: u64,
    chat_history: &'a [TranscriptEntry],
}

impl Transcript {
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn record(&mut self, user_message: &str, bot_response: &str) -> Result<(), ChatError> {
        self.entries.push(TranscriptEntry {
            timestamp_unix_ms: now_unix_ms()?,
            user_message: user_message.to_owned(),
            bot_response: bot_response.to_owned(),
        });
        Ok(())
    }

    /// Serialize the conversation in chronological order, with the user
    /// and export timestamp alongside, as the original JSON export did.
    pub fn export_json(&self) -> Result<String, ChatError> {
        let export = TranscriptExport {
            user: &self.user,
            exported_at_unix_ms: now_unix_ms()?,
            chat_history: &self.entries,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

fn now_unix_ms() -> Result<u64, ChatError> {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| ChatError::ClockSkew)?
        .as_millis();
    Ok(ms as u64)
}
